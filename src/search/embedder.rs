//! Embedder trait and implementations for passage retrieval
//!
//! Provides abstraction over different embedding models:
//! - HashingEmbedder: feature hashing over words and character trigrams
//!   (built-in, no model file)
//! - Model2VecEmbedder: pretrained static embeddings (requires model download)

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use model2vec::Model2Vec;
use regex::Regex;
use std::path::Path;

use crate::core::config::{EmbeddingConfig, EmbeddingMode};

/// Embedding model abstraction
///
/// An index must be queried with the same embedder that built it.
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Get embedding dimension
    fn dimension(&self) -> usize;

    /// Get model name/identifier
    fn name(&self) -> &str;
}

// ============================================================================
// Hashing Embedder
// ============================================================================

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();
}

const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic bag-of-features embedder
pub struct HashingEmbedder {
    dimension: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            name: format!("hashing-{}", dimension),
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dimension];
        let lowered = text.to_lowercase();

        for token in TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()) {
            self.add_feature(&mut vector, token, 1.0);

            let padded: Vec<char> = format!("#{}#", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, &trigram, TRIGRAM_WEIGHT);
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ *b as u64).wrapping_mul(PRIME))
}

// ============================================================================
// Model2Vec Embedder
// ============================================================================

/// Model2Vec based embedder
pub struct Model2VecEmbedder {
    model: Model2Vec,
    dimension: usize,
    name: String,
}

impl Model2VecEmbedder {
    /// Load model from local path
    pub fn from_path(path: &Path) -> Result<Self> {
        let model = Model2Vec::from_pretrained(path.to_string_lossy().as_ref(), None, None)
            .with_context(|| format!("Failed to load Model2Vec from: {}", path.display()))?;

        Self::with_model(model, &path.to_string_lossy())
    }

    /// Load model from HuggingFace Hub
    pub fn from_pretrained(model_id: &str) -> Result<Self> {
        let model = Model2Vec::from_pretrained(model_id, None, None)
            .with_context(|| format!("Failed to load Model2Vec: {}", model_id))?;

        Self::with_model(model, model_id)
    }

    fn with_model(model: Model2Vec, source: &str) -> Result<Self> {
        // Probe once so the dimension reflects the loaded weights.
        let probe = model.encode(&["probe"]).context("Failed to encode probe text")?;
        let dimension = probe.ncols();
        let short_name = source
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(source);

        Ok(Self {
            model,
            dimension,
            name: format!("model2vec-{}-{}", short_name, dimension),
        })
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text];
        let embeddings = self.model.encode(&texts).context("Failed to encode text")?;
        Ok(embeddings.row(0).to_vec())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.model.encode(texts).context("Failed to encode texts")?;
        Ok(embeddings.rows().into_iter().map(|r| r.to_vec()).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create embedder based on configuration
///
/// `model_path` is the resolved local model directory, if any.
pub fn create_embedder(
    config: &EmbeddingConfig,
    model_path: Option<&Path>,
) -> Result<Box<dyn Embedder>> {
    match config.mode {
        EmbeddingMode::Hashing => Ok(Box::new(HashingEmbedder::new(config.dimension))),
        EmbeddingMode::Model2vec => {
            let embedder = match model_path {
                Some(path) => Model2VecEmbedder::from_path(path)?,
                None => Model2VecEmbedder::from_pretrained(&config.model_id)?,
            };
            Ok(Box::new(embedder))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot / (na * nb)
    }

    #[test]
    fn test_hashing_embedder() {
        let embedder = HashingEmbedder::new(128);

        let emb = embedder.embed("BRCA1 breast cancer").unwrap();
        assert_eq!(emb.len(), 128);
        assert_eq!(embedder.name(), "hashing-128");
        assert!(emb.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn test_hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("DNA repair pathway").unwrap();
        let b = embedder.embed("DNA repair pathway").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hashing_embedder_similarity() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed("BRCA1 DNA repair").unwrap();
        let related = embedder.embed("BRCA1 is required for DNA double-strand break repair").unwrap();
        let unrelated = embedder.embed("Insulin secretion in pancreatic islets").unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[test]
    fn test_embed_batch_preserves_order() {
        let embedder = HashingEmbedder::new(64);
        let batch = embedder.embed_batch(&["alpha", "beta"]).unwrap();
        assert_eq!(batch[0], embedder.embed("alpha").unwrap());
        assert_eq!(batch[1], embedder.embed("beta").unwrap());
    }

    #[test]
    fn test_create_embedder_hashing() {
        let config = EmbeddingConfig::default();
        let embedder = create_embedder(&config, None).unwrap();

        assert_eq!(embedder.dimension(), 384);
        assert_eq!(embedder.name(), "hashing-384");
    }

    #[test]
    #[ignore] // Requires model download
    fn test_model2vec_embedder() {
        let embedder = Model2VecEmbedder::from_pretrained("minishlab/potion-base-8M").unwrap();
        let emb = embedder.embed("BRCA1 breast cancer").unwrap();
        assert_eq!(emb.len(), embedder.dimension());
    }
}
