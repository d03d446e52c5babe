//! Evidence command - retrieval + novelty bundle for one gene/disease pair

use anyhow::{Context, Result};
use colored::Colorize;

use genelink::pipeline::{Pipeline, Workspace};
use genelink::search::RetrieverHandle;

use super::query::print_hits;

pub fn run(
    ws: &Workspace,
    gene: &str,
    disease: &str,
    k: Option<usize>,
    save: bool,
    json: bool,
) -> Result<()> {
    let k = k.unwrap_or(ws.paths.config.retrieval.default_k);

    let retriever = ws
        .load_retriever(ws.embedder()?)
        .context("Failed to load passage index (run `genelink index` first)")?;
    let pipeline = Pipeline::new(RetrieverHandle::new(retriever), ws.load_scorer()?);

    let report = pipeline.evidence(gene, disease, k)?;
    let saved_to = if save {
        Some(report.save(&ws.paths.resolved.outputs)?)
    } else {
        None
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} / {}  novelty {:.1}",
        "→".dimmed(),
        gene.cyan().bold(),
        disease.cyan().bold(),
        report.novelty_score
    );
    println!();
    print_hits(&report.evidence);

    if let Some(path) = saved_to {
        println!("{} Saved results to {}", "✓".green(), path.display());
    }

    Ok(())
}
