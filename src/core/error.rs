//! Error types shared by the retrieval, normalization and novelty modules

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot build an index from zero passages")]
    EmptyInput,

    #[error("{kind} not found at {}", path.display())]
    MissingReferenceData { kind: &'static str, path: PathBuf },

    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("k must be at least 1")]
    InvalidTopK,

    #[error("passage list has {passages} entries but index holds {vectors} vectors")]
    IndexMismatch { passages: usize, vectors: usize },

    #[error("index was built with embedder '{expected}', got '{actual}'")]
    EmbedderMismatch { expected: String, actual: String },

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("index encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("table error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn missing(kind: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::MissingReferenceData {
            kind,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
