//! Novelty command - is a gene/disease pair already in the knowledge base

use anyhow::Result;
use colored::Colorize;

use genelink::pipeline::Workspace;

pub fn run(ws: &Workspace, gene: &str, disease: &str, json: bool) -> Result<()> {
    let scorer = ws.load_scorer()?;
    let score = scorer.score(gene, disease);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "gene": gene,
                "disease": disease,
                "novelty_score": score,
                "degraded": scorer.is_degraded(),
            })
        );
        return Ok(());
    }

    if scorer.is_degraded() {
        println!(
            "{} Knowledge base not found; every pair is reported as novel",
            "!".yellow()
        );
    }

    let verdict = if scorer.is_known(gene, disease) {
        "known".yellow()
    } else {
        "novel".green()
    };
    println!(
        "{} / {}: {} (score {:.1})",
        gene.cyan(),
        disease.cyan(),
        verdict,
        score
    );

    Ok(())
}
