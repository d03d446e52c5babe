//! genelink configuration module
//!
//! Config is read from `.genelink.json` in the project root. Every field has
//! a default, so a missing or partial file is valid. Relative paths are
//! resolved against the project root.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".genelink.json";
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub normalization: NormalizationConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Data file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_passages")]
    pub passages: String,

    #[serde(default = "default_passage_list", rename = "passageList")]
    pub passage_list: String,

    #[serde(default = "default_index_dir", rename = "indexDir")]
    pub index_dir: String,

    #[serde(default = "default_hgnc")]
    pub hgnc: String,

    #[serde(default = "default_knowledge_base", rename = "knowledgeBase")]
    pub knowledge_base: String,

    #[serde(default = "default_ner_predictions", rename = "nerPredictions")]
    pub ner_predictions: String,

    #[serde(default = "default_normalized_entities", rename = "normalizedEntities")]
    pub normalized_entities: String,

    #[serde(default = "default_outputs")]
    pub outputs: String,
}

fn default_passages() -> String {
    "data/processed/passages.jsonl".to_string()
}

fn default_passage_list() -> String {
    "data/processed/passages_list.json".to_string()
}

fn default_index_dir() -> String {
    "models/index".to_string()
}

fn default_hgnc() -> String {
    "data/raw/databases/hgnc_complete_set.txt".to_string()
}

fn default_knowledge_base() -> String {
    "data/raw/databases/disgenet_curated.tsv".to_string()
}

fn default_ner_predictions() -> String {
    "data/processed/ner_predictions.jsonl".to_string()
}

fn default_normalized_entities() -> String {
    "data/processed/normalized_entities.jsonl".to_string()
}

fn default_outputs() -> String {
    "outputs".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            passages: default_passages(),
            passage_list: default_passage_list(),
            index_dir: default_index_dir(),
            hgnc: default_hgnc(),
            knowledge_base: default_knowledge_base(),
            ner_predictions: default_ner_predictions(),
            normalized_entities: default_normalized_entities(),
            outputs: default_outputs(),
        }
    }
}

/// Which embedder backs the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Built-in feature hashing, no model file
    #[default]
    Hashing,
    Model2vec,
}

/// Default Model2Vec model ID
pub const DEFAULT_MODEL2VEC_MODEL: &str = "minishlab/potion-base-8M";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub mode: EmbeddingMode,

    #[serde(default = "default_model_id", rename = "modelId")]
    pub model_id: String,

    /// Local model directory; takes priority over `model_id`
    #[serde(default, rename = "modelPath")]
    pub model_path: Option<String>,

    /// Output dimension of the hashing embedder
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    #[serde(default = "default_batch_size", rename = "batchSize")]
    pub batch_size: usize,
}

fn default_model_id() -> String {
    DEFAULT_MODEL2VEC_MODEL.to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_batch_size() -> usize {
    64
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::default(),
            model_id: default_model_id(),
            model_path: None,
            dimension: default_dimension(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_k", rename = "defaultK")]
    pub default_k: usize,
}

fn default_k() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// NER labels (case-insensitive) treated as gene/protein mentions
    #[serde(default = "default_gene_labels", rename = "geneLabels")]
    pub gene_labels: Vec<String>,

    /// Fuzzy candidates scoring below this (0-100) resolve to `none`
    #[serde(default = "default_min_fuzzy_score", rename = "minFuzzyScore")]
    pub min_fuzzy_score: u8,
}

fn default_gene_labels() -> Vec<String> {
    vec![
        "gene".to_string(),
        "protein".to_string(),
        "gene_name".to_string(),
        "protein_name".to_string(),
    ]
}

fn default_min_fuzzy_score() -> u8 {
    1
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            gene_labels: default_gene_labels(),
            min_fuzzy_score: default_min_fuzzy_score(),
        }
    }
}

impl NormalizationConfig {
    pub fn is_gene_label(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.gene_labels.iter().any(|l| l.to_lowercase() == label)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            paths: PathsConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            normalization: NormalizationConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(config) => {
                    if config.version > CONFIG_VERSION {
                        tracing::warn!(
                            "Config version {} is newer than supported version {}",
                            config.version,
                            CONFIG_VERSION
                        );
                    }
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}. Using defaults.", CONFIG_FILE, e);
                }
            }
        }

        Self::default()
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(root.join(CONFIG_FILE), content)?;
        Ok(())
    }

    /// Get resolved paths based on project root
    pub fn resolve_paths(&self, root: &Path) -> ResolvedPaths {
        let resolve = |p: &str| {
            let path = Path::new(p);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        };

        ResolvedPaths {
            root: root.to_path_buf(),
            passages: resolve(&self.paths.passages),
            passage_list: resolve(&self.paths.passage_list),
            index_dir: resolve(&self.paths.index_dir),
            hgnc: resolve(&self.paths.hgnc),
            knowledge_base: resolve(&self.paths.knowledge_base),
            ner_predictions: resolve(&self.paths.ner_predictions),
            normalized_entities: resolve(&self.paths.normalized_entities),
            outputs: resolve(&self.paths.outputs),
            model_path: self.embedding.model_path.as_deref().map(resolve),
        }
    }
}

/// Resolved absolute paths for a project
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub passages: PathBuf,
    pub passage_list: PathBuf,
    pub index_dir: PathBuf,
    pub hgnc: PathBuf,
    pub knowledge_base: PathBuf,
    pub ner_predictions: PathBuf,
    pub normalized_entities: PathBuf,
    pub outputs: PathBuf,
    pub model_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.retrieval.default_k, 5);
        assert_eq!(config.embedding.mode, EmbeddingMode::Hashing);
        assert_eq!(config.normalization.gene_labels.len(), 4);
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{"embedding": {"mode": "model2vec", "modelPath": "models/potion"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.embedding.mode, EmbeddingMode::Model2vec);
        assert_eq!(config.embedding.model_path.as_deref(), Some("models/potion"));
        assert_eq!(config.embedding.batch_size, 64);
        assert_eq!(config.paths.outputs, "outputs");
    }

    #[test]
    fn test_keys_are_camel_case() {
        let json = r#"{
            "paths": {"indexDir": "idx", "knowledgeBase": "kb.tsv", "passageList": "list.json"},
            "retrieval": {"defaultK": 9},
            "normalization": {"geneLabels": ["gene"], "minFuzzyScore": 80}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.paths.index_dir, "idx");
        assert_eq!(config.paths.knowledge_base, "kb.tsv");
        assert_eq!(config.paths.passage_list, "list.json");
        assert_eq!(config.retrieval.default_k, 9);
        assert_eq!(config.normalization.gene_labels, vec!["gene".to_string()]);
        assert_eq!(config.normalization.min_fuzzy_score, 80);

        let saved = serde_json::to_value(Config::default()).unwrap();
        assert!(saved["normalization"].get("minFuzzyScore").is_some());
        assert!(saved["paths"].get("nerPredictions").is_some());
    }

    #[test]
    fn test_gene_labels_case_insensitive() {
        let config = NormalizationConfig::default();
        assert!(config.is_gene_label("Gene"));
        assert!(config.is_gene_label("PROTEIN_NAME"));
        assert!(!config.is_gene_label("Disease_disorder"));
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = Config::default();
        config.paths.outputs = "/tmp/absolute".to_string();
        let paths = config.resolve_paths(Path::new("/project"));
        assert_eq!(paths.hgnc, Path::new("/project/data/raw/databases/hgnc_complete_set.txt"));
        assert_eq!(paths.outputs, Path::new("/tmp/absolute"));
        assert!(paths.model_path.is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.paths.index_dir, "models/index");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.retrieval.default_k = 12;
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path());
        assert_eq!(loaded.retrieval.default_k, 12);
    }
}
