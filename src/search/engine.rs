//! Retriever - pairs the passage store, its index and the embedder that built it
//!
//! On disk a retriever is a directory holding:
//! - index.bin: flat inner-product index (bincode serialized)
//! - passages.json: passage texts, one per index row
//! - meta.json: embedder name, dimension, passage count, build time

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::embedder::Embedder;
use super::index::FlatIndex;
use crate::core::error::{Error, Result};
use crate::core::passage::PassageStore;
use crate::core::paths::{replace_dir_atomic, write_atomic};

pub const INDEX_FILE: &str = "index.bin";
pub const PASSAGES_FILE: &str = "passages.json";
pub const META_FILE: &str = "meta.json";

/// One ranked passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub score: f32,
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta {
    pub embedder: String,
    pub dimension: usize,
    pub passage_count: usize,
    pub built_at: i64,
    pub version: u32,
}

impl IndexMeta {
    pub fn load(dir: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(dir.join(META_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub struct Retriever {
    passages: PassageStore,
    index: FlatIndex,
    embedder: Arc<dyn Embedder>,
    meta: IndexMeta,
}

impl Retriever {
    pub fn build(
        passages: PassageStore,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
    ) -> Result<Self> {
        let index = FlatIndex::build(&passages, embedder.as_ref(), batch_size)?;

        let meta = IndexMeta {
            embedder: embedder.name().to_string(),
            dimension: index.dimension(),
            passage_count: passages.len(),
            built_at: chrono::Utc::now().timestamp(),
            version: 1,
        };

        Ok(Self {
            passages,
            index,
            embedder,
            meta,
        })
    }

    /// Load a saved retriever. `embedder` must be the one it was built with.
    pub fn load(dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if !dir.join(INDEX_FILE).exists() {
            return Err(Error::missing("passage index", dir.join(INDEX_FILE)));
        }

        let meta = IndexMeta::load(dir)?;
        let index = FlatIndex::load(&dir.join(INDEX_FILE))?;
        let passages = PassageStore::load_list(&dir.join(PASSAGES_FILE))?;

        if meta.embedder != embedder.name() {
            return Err(Error::EmbedderMismatch {
                expected: meta.embedder,
                actual: embedder.name().to_string(),
            });
        }
        if index.dimension() != embedder.dimension() {
            return Err(Error::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            });
        }
        if meta.passage_count != index.len() {
            return Err(Error::IndexMismatch {
                passages: meta.passage_count,
                vectors: index.len(),
            });
        }
        if passages.len() != index.len() {
            return Err(Error::IndexMismatch {
                passages: passages.len(),
                vectors: index.len(),
            });
        }

        tracing::info!(
            passages = passages.len(),
            embedder = %meta.embedder,
            "Loaded passage index from {}",
            dir.display()
        );

        Ok(Self {
            passages,
            index,
            embedder,
            meta,
        })
    }

    /// Persist to `dir`.
    ///
    /// All three files are written to a staging directory that replaces
    /// `dir` only once complete; a failed save leaves the old index intact.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let index_bytes = self.index.to_bytes()?;
        let meta_json = serde_json::to_string_pretty(&self.meta)?;

        replace_dir_atomic(dir, |staging| -> Result<()> {
            write_atomic(&staging.join(INDEX_FILE), &index_bytes)?;
            self.passages.save_list(&staging.join(PASSAGES_FILE))?;
            write_atomic(&staging.join(META_FILE), meta_json.as_bytes())?;
            Ok(())
        })?;

        tracing::debug!(passages = self.passages.len(), "Saved passage index to {}", dir.display());
        Ok(())
    }

    /// Top-k passages for `text`, highest cosine similarity first.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<QueryHit>> {
        let query_embedding = self.embedder.embed(text)?;
        let hits = self.index.search(&query_embedding, k)?;

        Ok(hits
            .into_iter()
            .filter_map(|(index, score)| {
                let passage = self.passages.get(index)?;
                Some(QueryHit {
                    score,
                    index,
                    text: passage.text.clone(),
                })
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn passages(&self) -> &PassageStore {
        &self.passages
    }
}

/// Shared handle for concurrent readers.
///
/// Readers take a snapshot `Arc`; a rebuild swaps in a new retriever and
/// never mutates the one readers hold.
#[derive(Clone)]
pub struct RetrieverHandle {
    inner: Arc<RwLock<Arc<Retriever>>>,
}

impl RetrieverHandle {
    pub fn new(retriever: Retriever) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(retriever))),
        }
    }

    pub fn snapshot(&self) -> Arc<Retriever> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the current retriever, returning the previous one.
    pub fn swap(&self, retriever: Retriever) -> Arc<Retriever> {
        std::mem::replace(&mut *self.inner.write(), Arc::new(retriever))
    }

    pub fn query(&self, text: &str, k: usize) -> Result<Vec<QueryHit>> {
        self.snapshot().query(text, k)
    }
}
