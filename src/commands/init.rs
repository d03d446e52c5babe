//! Project initialization

use anyhow::Result;
use colored::*;

use genelink::core::config::{Config, CONFIG_FILE};
use genelink::core::paths::get_project_root;

pub fn run() -> Result<()> {
    let root = get_project_root();
    let config_path = root.join(CONFIG_FILE);

    println!("{}", "genelink Configuration Generator".bold());
    println!("{}", "=".repeat(50));
    println!();

    let existed = config_path.exists();
    let config = if existed {
        println!("{} Loading existing config...", "→".blue());
        Config::load(&root)
    } else {
        Config::default()
    };

    config.save(&root)?;

    if existed {
        println!("{} Updated {}", "✓".green(), config_path.display());
    } else {
        println!("{} Created {}", "✓".green(), config_path.display());
    }

    let paths = config.resolve_paths(&root);
    println!();
    println!("{}", "Data files:".cyan());
    for (label, path) in [
        ("passages", &paths.passages),
        ("hgnc", &paths.hgnc),
        ("knowledge_base", &paths.knowledge_base),
        ("ner_predictions", &paths.ner_predictions),
    ] {
        let marker = if path.exists() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {}: {}", marker, label, path.display());
    }
    println!();
    println!(
        "  embedding: {:?} ({})",
        config.embedding.mode, config.embedding.model_id
    );
    println!("  index: {}", paths.index_dir.display());
    println!();
    println!(
        "{}",
        "Edit .genelink.json to customize paths, embedding model, and labels.".dimmed()
    );
    println!();

    Ok(())
}
