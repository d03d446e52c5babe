//! Flat inner-product index over L2-normalized passage embeddings
//!
//! Row `i` of the matrix is the embedding of passage `i`. Search is exact:
//! every row is scored against the query, so results are the true top-k.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

use super::embedder::Embedder;
use crate::core::error::{Error, Result};
use crate::core::passage::PassageStore;
use crate::core::paths::write_atomic;

const INDEX_FORMAT_VERSION: u32 = 1;

/// Scale `vector` to unit length in place. Zero vectors are left as-is.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    version: u32,
    dimension: usize,
    /// Row-major `len x dimension` matrix
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build from raw embeddings (normalized here). All rows must share a length.
    pub fn from_embeddings(embeddings: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = match embeddings.first() {
            Some(first) => first.len(),
            None => return Err(Error::EmptyInput),
        };

        let mut data = Vec::with_capacity(embeddings.len() * dimension);
        for mut row in embeddings {
            if row.len() != dimension {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            normalize_l2(&mut row);
            data.extend_from_slice(&row);
        }

        Ok(Self {
            version: INDEX_FORMAT_VERSION,
            dimension,
            data,
        })
    }

    /// Embed every passage and index the results.
    ///
    /// Passages are embedded in parallel batches of `batch_size`; row order
    /// always follows passage order.
    pub fn build(
        passages: &PassageStore,
        embedder: &dyn Embedder,
        batch_size: usize,
    ) -> Result<Self> {
        if passages.is_empty() {
            return Err(Error::EmptyInput);
        }

        let texts = passages.texts();
        let batches: Vec<Vec<Vec<f32>>> = texts
            .par_chunks(batch_size.max(1))
            .map(|chunk| embedder.embed_batch(chunk))
            .collect::<anyhow::Result<_>>()?;

        let embeddings: Vec<Vec<f32>> = batches.into_iter().flatten().collect();
        if embeddings.len() != texts.len() {
            return Err(Error::IndexMismatch {
                passages: texts.len(),
                vectors: embeddings.len(),
            });
        }

        let index = Self::from_embeddings(embeddings)?;
        tracing::info!(
            passages = index.len(),
            dimension = index.dimension,
            embedder = embedder.name(),
            "Built passage index"
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dimension..(i + 1) * self.dimension]
    }

    /// Exact top-k by inner product against an already-embedded query.
    ///
    /// Returns `(row, score)` by descending score, ties by ascending row.
    /// `k` larger than the index is clamped.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if k == 0 {
            return Err(Error::InvalidTopK);
        }
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut query = query.to_vec();
        normalize_l2(&mut query);

        let mut scored: Vec<(usize, f32)> = (0..self.len())
            .map(|i| {
                let score: f32 = self.row(i).iter().zip(&query).map(|(a, b)| a * b).sum();
                // -0.0 and 0.0 must tie under total_cmp
                (i, if score == 0.0 { 0.0 } else { score })
            })
            .collect();

        scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(k.min(self.len()));

        Ok(scored)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let index: Self = bincode::deserialize(bytes)?;
        if index.dimension == 0 || index.data.len() % index.dimension != 0 {
            return Err(Error::DimensionMismatch {
                expected: index.dimension,
                actual: index.data.len(),
            });
        }
        Ok(index)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
