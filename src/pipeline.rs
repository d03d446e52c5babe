//! Pipeline wiring
//!
//! `Workspace` turns project configuration into the components; nothing is
//! loaded implicitly, so callers (and tests) choose which pieces to build and
//! can substitute their own embedder or tagger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::passage::PassageStore;
use crate::core::paths::{write_atomic, ProjectPaths};
use crate::normalize::{SymbolCatalog, SymbolNormalizer};
use crate::novelty::NoveltyScorer;
use crate::search::{create_embedder, Embedder, QueryHit, Retriever, RetrieverHandle};

pub struct Workspace {
    pub paths: ProjectPaths,
}

impl Workspace {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    pub fn open(root: &Path) -> Self {
        Self::new(ProjectPaths::from_root(root.to_path_buf()))
    }

    pub fn embedder(&self) -> anyhow::Result<Arc<dyn Embedder>> {
        let embedder = create_embedder(
            &self.paths.config.embedding,
            self.paths.resolved.model_path.as_deref(),
        )?;
        Ok(Arc::from(embedder))
    }

    /// Embed the passage JSONL, then save index and passage list.
    pub fn build_retriever(&self, embedder: Arc<dyn Embedder>) -> Result<Retriever> {
        let resolved = &self.paths.resolved;
        let passages = PassageStore::from_jsonl(&resolved.passages)?;

        let retriever =
            Retriever::build(passages, embedder, self.paths.config.embedding.batch_size)?;
        retriever.save(&resolved.index_dir)?;
        retriever.passages().save_list(&resolved.passage_list)?;

        Ok(retriever)
    }

    pub fn load_retriever(&self, embedder: Arc<dyn Embedder>) -> Result<Retriever> {
        Retriever::load(&self.paths.resolved.index_dir, embedder)
    }

    /// Fails with `MissingReferenceData` when the HGNC table is absent.
    pub fn load_normalizer(&self) -> Result<SymbolNormalizer> {
        let catalog = SymbolCatalog::from_tsv(&self.paths.resolved.hgnc)?;
        Ok(SymbolNormalizer::new(catalog)
            .with_min_fuzzy_score(self.paths.config.normalization.min_fuzzy_score))
    }

    /// Degrades to score-everything-novel when the table is absent.
    pub fn load_scorer(&self) -> Result<NoveltyScorer> {
        NoveltyScorer::load(&self.paths.resolved.knowledge_base)
    }
}

/// Retrieved evidence and novelty for one gene/disease pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceReport {
    pub gene: String,
    pub disease: String,
    pub novelty_score: f64,
    pub evidence: Vec<QueryHit>,
    pub created_at: DateTime<Utc>,
}

impl EvidenceReport {
    /// `<gene>_<disease>.json` with spaces and path separators replaced by `_`
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", file_stem(&self.gene), file_stem(&self.disease))
    }

    /// Write to `dir/<gene>_<disease>.json`, returning the path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        write_atomic(&path, serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(path)
    }
}

fn file_stem(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

pub struct Pipeline {
    retriever: RetrieverHandle,
    scorer: NoveltyScorer,
}

impl Pipeline {
    pub fn new(retriever: RetrieverHandle, scorer: NoveltyScorer) -> Self {
        Self { retriever, scorer }
    }

    pub fn retriever(&self) -> &RetrieverHandle {
        &self.retriever
    }

    pub fn scorer(&self) -> &NoveltyScorer {
        &self.scorer
    }

    pub fn evidence(&self, gene: &str, disease: &str, k: usize) -> Result<EvidenceReport> {
        let query = format!("{} {}", gene, disease);
        let evidence = self.retriever.query(&query, k)?;
        let novelty_score = self.scorer.score(gene, disease);

        tracing::debug!(gene, disease, hits = evidence.len(), novelty_score, "Collected evidence");

        Ok(EvidenceReport {
            gene: gene.to_string(),
            disease: disease.to_string(),
            novelty_score,
            evidence,
            created_at: Utc::now(),
        })
    }
}
