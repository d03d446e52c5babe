mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use genelink::core::paths::ProjectPaths;
use genelink::pipeline::Workspace;

#[derive(Parser)]
#[command(name = "genelink")]
#[command(about = "Evidence retrieval, gene symbol normalization and novelty scoring", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or refresh .genelink.json in the project root
    Init,

    // ===== Retrieval =====
    /// Build the passage retrieval index
    Index {
        #[arg(long, help = "Show index status only")]
        status: bool,
        #[arg(long, help = "Force rebuild index")]
        rebuild: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Retrieve passages most similar to a query
    Query {
        query: String,
        #[arg(short, long, help = "Number of passages (default from config)")]
        k: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== Normalization =====
    /// Resolve gene/protein mentions to HGNC identifiers
    Resolve {
        #[arg(required = true)]
        mentions: Vec<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Normalize gene mentions in an NER predictions JSONL file
    Normalize {
        #[arg(long, help = "Input JSONL (default from config)")]
        input: Option<PathBuf>,
        #[arg(long, help = "Output JSONL (default from config)")]
        output: Option<PathBuf>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== Validation =====
    /// Novelty score of a gene/disease pair against the knowledge base
    Novelty {
        gene: String,
        disease: String,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Retrieve evidence and novelty for a gene/disease pair
    Evidence {
        gene: String,
        disease: String,
        #[arg(short, long, help = "Number of passages (default from config)")]
        k: Option<usize>,
        #[arg(long, help = "Save report under the outputs directory")]
        save: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genelink=info")))
        .init();

    let cli = Cli::parse();
    let ws = Workspace::new(ProjectPaths::new());

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Index {
            status,
            rebuild,
            json,
        } => commands::index::run(&ws, status, rebuild, json),
        Commands::Query { query, k, json } => commands::query::run(&ws, &query, k, json),
        Commands::Resolve { mentions, json } => commands::resolve::run(&ws, &mentions, json),
        Commands::Normalize {
            input,
            output,
            json,
        } => commands::normalize::run(&ws, input, output, json),
        Commands::Novelty {
            gene,
            disease,
            json,
        } => commands::novelty::run(&ws, &gene, &disease, json),
        Commands::Evidence {
            gene,
            disease,
            k,
            save,
            json,
        } => commands::evidence::run(&ws, &gene, &disease, k, save, json),
    }
}
