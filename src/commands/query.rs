//! Query command - ranked passages for free text

use anyhow::{Context, Result};
use colored::Colorize;

use genelink::pipeline::Workspace;
use genelink::search::QueryHit;

pub fn run(ws: &Workspace, query: &str, k: Option<usize>, json: bool) -> Result<()> {
    let k = k.unwrap_or(ws.paths.config.retrieval.default_k);

    let retriever = ws
        .load_retriever(ws.embedder()?)
        .context("Failed to load passage index (run `genelink index` first)")?;
    let hits = retriever.query(query, k)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        hits.len(),
        query.cyan()
    );
    println!();
    print_hits(&hits);

    Ok(())
}

pub fn print_hits(hits: &[QueryHit]) {
    for (i, hit) in hits.iter().enumerate() {
        let score_str = format!("{:.2}", hit.score);
        let score_colored = if hit.score > 0.8 {
            score_str.green()
        } else if hit.score > 0.5 {
            score_str.yellow()
        } else {
            score_str.dimmed()
        };

        println!(
            "{}. [{}] passage #{}",
            (i + 1).to_string().bold(),
            score_colored,
            hit.index
        );

        // Truncate for display (char-aware for Unicode)
        let display_text = if hit.text.chars().count() > 200 {
            format!("{}...", hit.text.chars().take(200).collect::<String>())
        } else {
            hit.text.clone()
        };
        println!("   {}", display_text.dimmed());
        println!();
    }
}
