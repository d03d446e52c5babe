//! Normalize command - resolve gene mentions in NER predictions

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use genelink::normalize::DocumentNormalizer;
use genelink::pipeline::Workspace;

pub fn run(
    ws: &Workspace,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let input = input.unwrap_or_else(|| ws.paths.resolved.ner_predictions.clone());
    let output = output.unwrap_or_else(|| ws.paths.resolved.normalized_entities.clone());

    if !input.exists() {
        anyhow::bail!(
            "NER predictions not found at {}. Run the entity tagger first.",
            input.display()
        );
    }

    let normalizer = ws.load_normalizer()?;
    let stats = DocumentNormalizer::new(&normalizer, &ws.paths.config.normalization)
        .normalize_file(&input, &output)
        .with_context(|| format!("Failed to normalize {}", input.display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "documents": stats.documents,
                "mentions": stats.mentions,
                "exact": stats.exact,
                "alias": stats.alias,
                "fuzzy": stats.fuzzy,
                "none": stats.unresolved,
                "output": output.display().to_string(),
            })
        );
    } else {
        println!(
            "{} Normalized {} mentions across {} documents",
            "✓".green().bold(),
            stats.mentions.to_string().cyan(),
            stats.documents
        );
        println!(
            "  {} exact {} | alias {} | fuzzy {} | none {}",
            "→".dimmed(),
            stats.exact,
            stats.alias,
            stats.fuzzy,
            stats.unresolved
        );
        println!("  {} Saved to: {}", "→".dimmed(), output.display());
    }

    Ok(())
}
