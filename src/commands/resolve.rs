//! Resolve command - map gene mentions to HGNC identifiers

use anyhow::Result;
use colored::Colorize;

use genelink::normalize::{MatchMethod, Resolution};
use genelink::pipeline::Workspace;

pub fn run(ws: &Workspace, mentions: &[String], json: bool) -> Result<()> {
    let normalizer = ws.load_normalizer()?;
    let results = normalizer.resolve_all(mentions.iter().map(String::as_str));

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        print_resolution(result);
    }

    Ok(())
}

fn print_resolution(r: &Resolution) {
    let method = match r.method {
        MatchMethod::Exact => r.method.as_str().green(),
        MatchMethod::Alias => r.method.as_str().cyan(),
        MatchMethod::Fuzzy => r.method.as_str().yellow(),
        MatchMethod::None => r.method.as_str().red(),
    };

    match (&r.identifier, &r.candidate) {
        (Some(id), _) => println!("{} [{}] {}", r.mention.bold(), method, id),
        (None, Some((symbol, score))) => println!(
            "{} [{}] candidate {} ({}%)",
            r.mention.bold(),
            method,
            symbol.cyan(),
            score
        ),
        (None, None) => println!("{} [{}]", r.mention.bold(), method),
    }
}
