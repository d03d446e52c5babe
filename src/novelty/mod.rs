//! Novelty scoring against a curated gene-disease association table
//!
//! A pair is known when some row's gene symbol equals the query gene
//! (case-insensitive) and the row's disease name contains the query disease
//! (case-insensitive substring). Known pairs score 0.0, everything else 1.0.
//!
//! Without a knowledge base every pair scores 1.0. This is a deliberate
//! fallback so hypothesis runs keep going when the table is not installed.

use std::path::Path;

use crate::core::error::{Error, Result};

const GENE_COL: &str = "geneSymbol";
const DISEASE_COL: &str = "diseaseName";

pub const NOVEL: f64 = 1.0;
pub const KNOWN: f64 = 0.0;

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    /// (upper-cased gene, lower-cased disease name)
    associations: Vec<(String, String)>,
}

impl KnowledgeBase {
    pub fn from_pairs<I, G, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (G, D)>,
        G: AsRef<str>,
        D: AsRef<str>,
    {
        Self {
            associations: pairs
                .into_iter()
                .map(|(g, d)| (g.as_ref().to_uppercase(), d.as_ref().to_lowercase()))
                .collect(),
        }
    }

    /// Load a tab-separated association table with `geneSymbol` and
    /// `diseaseName` columns.
    pub fn from_tsv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing("association knowledge base", path));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn {
                    path: path.to_path_buf(),
                    column: name,
                })
        };
        let gene_idx = column(GENE_COL)?;
        let disease_idx = column(DISEASE_COL)?;

        let mut pairs = Vec::new();
        for record in reader.records() {
            let record = record?;
            let gene = record.get(gene_idx).unwrap_or("");
            let disease = record.get(disease_idx).unwrap_or("");
            if gene.is_empty() || disease.is_empty() {
                continue;
            }
            pairs.push((gene.to_string(), disease.to_string()));
        }

        let kb = Self::from_pairs(pairs);
        tracing::info!(
            associations = kb.len(),
            "Loaded knowledge base from {}",
            path.display()
        );
        Ok(kb)
    }

    pub fn contains(&self, gene_symbol: &str, disease_name: &str) -> bool {
        let gene = gene_symbol.to_uppercase();
        let disease = disease_name.to_lowercase();

        self.associations
            .iter()
            .any(|(g, d)| *g == gene && d.contains(&disease))
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }
}

pub struct NoveltyScorer {
    knowledge_base: Option<KnowledgeBase>,
}

impl NoveltyScorer {
    pub fn new(knowledge_base: KnowledgeBase) -> Self {
        Self {
            knowledge_base: Some(knowledge_base),
        }
    }

    /// Scorer with no knowledge base: every pair is novel.
    pub fn degraded() -> Self {
        Self {
            knowledge_base: None,
        }
    }

    /// Load the table at `path`; a missing file yields a degraded scorer.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load(path: &Path) -> Result<Self> {
        match KnowledgeBase::from_tsv(path) {
            Ok(kb) => Ok(Self::new(kb)),
            Err(Error::MissingReferenceData { path, .. }) => {
                tracing::warn!(
                    "Knowledge base not found at {}; novelty checks disabled, all pairs score {}",
                    path.display(),
                    NOVEL
                );
                Ok(Self::degraded())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.knowledge_base.is_none()
    }

    pub fn is_known(&self, gene_symbol: &str, disease_name: &str) -> bool {
        self.knowledge_base
            .as_ref()
            .is_some_and(|kb| kb.contains(gene_symbol, disease_name))
    }

    pub fn score(&self, gene_symbol: &str, disease_name: &str) -> f64 {
        if self.is_known(gene_symbol, disease_name) {
            KNOWN
        } else {
            NOVEL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scorer() -> NoveltyScorer {
        NoveltyScorer::new(KnowledgeBase::from_pairs([
            ("BRCA1", "Breast Cancer"),
            ("BRCA1", "Hereditary breast and ovarian cancer syndrome"),
            ("TP53", "Li-Fraumeni Syndrome"),
        ]))
    }

    #[test]
    fn test_known_pair() {
        assert_eq!(scorer().score("BRCA1", "breast cancer"), 0.0);
    }

    #[test]
    fn test_unknown_pair() {
        assert_eq!(scorer().score("XYZ1", "some rare disease"), 1.0);
    }

    #[test]
    fn test_gene_case_insensitive() {
        assert_eq!(scorer().score("brca1", "BREAST CANCER"), 0.0);
    }

    #[test]
    fn test_disease_substring() {
        assert_eq!(scorer().score("BRCA1", "ovarian cancer"), 0.0);
        assert_eq!(scorer().score("TP53", "fraumeni"), 0.0);
        // Gene must match on the same row as the disease
        assert_eq!(scorer().score("TP53", "breast cancer"), 1.0);
    }

    #[test]
    fn test_gene_must_match_exactly() {
        assert_eq!(scorer().score("BRCA", "breast cancer"), 1.0);
    }

    #[test]
    fn test_degraded_mode() {
        let scorer = NoveltyScorer::degraded();
        assert!(scorer.is_degraded());
        assert_eq!(scorer.score("BRCA1", "breast cancer"), 1.0);
        assert_eq!(scorer.score("XYZ1", "anything"), 1.0);
    }

    #[test]
    fn test_load_missing_file_degrades() {
        let dir = TempDir::new().unwrap();
        let scorer = NoveltyScorer::load(&dir.path().join("disgenet_curated.tsv")).unwrap();
        assert!(scorer.is_degraded());
        assert_eq!(scorer.score("BRCA1", "breast cancer"), 1.0);
    }

    #[test]
    fn test_load_from_tsv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("disgenet_curated.tsv");
        fs::write(
            &path,
            "geneId\tgeneSymbol\tdiseaseId\tdiseaseName\tscore\n\
             672\tBRCA1\tC0006142\tMalignant neoplasm of breast\t0.9\n\
             7157\tTP53\tC0085390\tLi-Fraumeni Syndrome\t0.8\n",
        )
        .unwrap();

        let scorer = NoveltyScorer::load(&path).unwrap();
        assert!(!scorer.is_degraded());
        assert_eq!(scorer.score("BRCA1", "neoplasm of breast"), 0.0);
        assert_eq!(scorer.score("BRCA1", "breast cancer"), 1.0);
    }

    #[test]
    fn test_load_missing_column_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.tsv");
        fs::write(&path, "gene\tdisease\nBRCA1\tbreast cancer\n").unwrap();

        assert!(matches!(
            NoveltyScorer::load(&path),
            Err(Error::MissingColumn { column: "geneSymbol", .. })
        ));
    }
}
