//! genelink: evidence retrieval, gene symbol normalization and novelty
//! scoring for gene/disease hypothesis generation.

pub mod core;
pub mod normalize;
pub mod novelty;
pub mod pipeline;
pub mod search;

pub use crate::core::error::{Error, Result};
