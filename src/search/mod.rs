//! Passage retrieval
//!
//! Passages are embedded once at build time into a flat inner-product index;
//! queries are embedded with the same model and scored against every row.

pub mod embedder;
pub mod engine;
pub mod index;

pub use embedder::{create_embedder, Embedder, HashingEmbedder, Model2VecEmbedder};
pub use engine::{IndexMeta, QueryHit, Retriever, RetrieverHandle};
pub use index::{normalize_l2, FlatIndex};
