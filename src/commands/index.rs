//! Index command - Build passage retrieval index

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::time::Instant;

use genelink::pipeline::Workspace;
use genelink::search::IndexMeta;

pub fn run(ws: &Workspace, status_only: bool, rebuild: bool, json: bool) -> Result<()> {
    let index_dir = &ws.paths.resolved.index_dir;

    if status_only {
        return show_status(index_dir, json);
    }

    if !rebuild && IndexMeta::load(index_dir).is_ok() {
        if !json {
            println!(
                "{} Index already exists. Use {} to rebuild.",
                "!".yellow().bold(),
                "--rebuild".cyan()
            );
        }
        return show_status(index_dir, json);
    }

    if !json {
        println!(
            "{} Building passage index from {}...",
            "→".dimmed(),
            ws.paths.resolved.passages.display()
        );
    }

    let start = Instant::now();
    let embedder = ws.embedder()?;
    let retriever = ws
        .build_retriever(embedder)
        .with_context(|| format!("Failed to build index in {}", index_dir.display()))?;
    let duration_ms = start.elapsed().as_millis();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "indexed": retriever.len(),
                "embedder": retriever.meta().embedder,
                "dimension": retriever.meta().dimension,
                "duration_ms": duration_ms,
            })
        );
    } else {
        println!();
        println!(
            "{} Indexed {} passages in {:.2}s",
            "✓".green().bold(),
            retriever.len().to_string().cyan(),
            duration_ms as f64 / 1000.0
        );
        println!(
            "  {} Embedder: {} ({}d)",
            "→".dimmed(),
            retriever.meta().embedder,
            retriever.meta().dimension
        );
        println!("  {} Index saved to: {}", "→".dimmed(), index_dir.display());
    }

    Ok(())
}

/// Show index status
fn show_status(index_dir: &Path, json: bool) -> Result<()> {
    let meta = match IndexMeta::load(index_dir) {
        Ok(meta) => meta,
        Err(_) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "exists": false,
                        "error": "Index not found"
                    })
                );
            } else {
                println!(
                    "{} Index not found. Run {} first.",
                    "!".yellow().bold(),
                    "genelink index".cyan()
                );
            }
            return Ok(());
        }
    };

    let file_size = std::fs::metadata(index_dir.join(genelink::search::engine::INDEX_FILE))
        .map(|m| m.len())
        .unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "exists": true,
                "passage_count": meta.passage_count,
                "embedder": meta.embedder,
                "dimension": meta.dimension,
                "built_at": meta.built_at,
                "file_size_bytes": file_size,
            })
        );
    } else {
        println!("{}", "Index Status".bold());
        println!();
        println!(
            "  {} {} passages indexed",
            "→".dimmed(),
            meta.passage_count.to_string().cyan()
        );
        println!(
            "  {} Embedder: {} ({}d)",
            "→".dimmed(),
            meta.embedder,
            meta.dimension
        );
        println!(
            "  {} Size: {:.2} KB",
            "→".dimmed(),
            file_size as f64 / 1024.0
        );
        let dt = chrono::DateTime::from_timestamp(meta.built_at, 0)
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        println!("  {} Built: {}", "→".dimmed(), dt);
    }

    Ok(())
}
