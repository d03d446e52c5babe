//! Batch normalization of tagged documents
//!
//! Input is JSONL where each document has an `entities` array from the NER
//! tagger. Output is the same documents, each with a `normalized_genes`
//! array appended. Unknown document fields pass through untouched.

use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::resolver::{Mention, Resolution, SymbolNormalizer};
use crate::core::config::NormalizationConfig;
use crate::core::error::Result;
use crate::core::paths::write_atomic;

/// Named-entity tagger collaborator: text -> ordered mention spans
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> anyhow::Result<Vec<Mention>>;
}

#[derive(Debug, Default, Clone)]
pub struct NormalizeStats {
    pub documents: usize,
    pub mentions: usize,
    pub exact: usize,
    pub alias: usize,
    pub fuzzy: usize,
    pub unresolved: usize,
}

impl NormalizeStats {
    fn record(&mut self, resolutions: &[Resolution]) {
        use super::resolver::MatchMethod;

        self.documents += 1;
        for r in resolutions {
            self.mentions += 1;
            match r.method {
                MatchMethod::Exact => self.exact += 1,
                MatchMethod::Alias => self.alias += 1,
                MatchMethod::Fuzzy => self.fuzzy += 1,
                MatchMethod::None => self.unresolved += 1,
            }
        }
    }
}

pub struct DocumentNormalizer<'a> {
    normalizer: &'a SymbolNormalizer,
    config: &'a NormalizationConfig,
}

impl<'a> DocumentNormalizer<'a> {
    pub fn new(normalizer: &'a SymbolNormalizer, config: &'a NormalizationConfig) -> Self {
        Self { normalizer, config }
    }

    /// Resolve the gene/protein mentions among `mentions`, in order.
    pub fn normalize_mentions(&self, mentions: &[Mention]) -> Vec<Resolution> {
        mentions
            .iter()
            .filter(|m| self.config.is_gene_label(&m.label) && !m.text.is_empty())
            .map(|m| self.normalizer.resolve(&m.text))
            .collect()
    }

    /// Tag `text` with `extractor`, then resolve the gene mentions.
    pub fn annotate(
        &self,
        text: &str,
        extractor: &dyn EntityExtractor,
    ) -> Result<Vec<Resolution>> {
        let mentions = extractor.extract(text)?;
        Ok(self.normalize_mentions(&mentions))
    }

    /// Add `normalized_genes` to one document. Malformed entities are ignored.
    pub fn normalize_document(&self, doc: &mut Value) -> Vec<Resolution> {
        let mentions: Vec<Mention> = doc
            .get("entities")
            .and_then(Value::as_array)
            .map(|entities| {
                entities
                    .iter()
                    .filter_map(|e| serde_json::from_value::<Mention>(e.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let resolutions = self.normalize_mentions(&mentions);
        if let Some(obj) = doc.as_object_mut() {
            obj.insert(
                "normalized_genes".to_string(),
                serde_json::to_value(&resolutions).unwrap_or(Value::Array(vec![])),
            );
        }
        resolutions
    }

    /// Normalize every document in `input` and write the result to `output`.
    ///
    /// The output file is replaced only once all documents are processed.
    pub fn normalize_file(&self, input: &Path, output: &Path) -> Result<NormalizeStats> {
        let file = fs::File::open(input)?;
        let mut stats = NormalizeStats::default();
        let mut out = String::new();

        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let mut doc: Value = serde_json::from_str(&line)?;
            let resolutions = self.normalize_document(&mut doc);
            stats.record(&resolutions);

            out.push_str(&serde_json::to_string(&doc)?);
            out.push('\n');
        }

        write_atomic(output, out.as_bytes())?;
        tracing::info!(
            documents = stats.documents,
            mentions = stats.mentions,
            "Saved normalized entities to {}",
            output.display()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::catalog::SymbolCatalog;
    use crate::normalize::resolver::MatchMethod;
    use tempfile::TempDir;

    fn normalizer() -> SymbolNormalizer {
        let mut builder = SymbolCatalog::builder();
        builder
            .add_row("BRCA1", "HGNC:1100", "RNF53", "")
            .add_row("TP53", "HGNC:11998", "p53", "");
        SymbolNormalizer::new(builder.build())
    }

    /// Tags capitalised alphanumeric words as genes, everything else as other
    struct UppercaseTagger;

    impl EntityExtractor for UppercaseTagger {
        fn extract(&self, text: &str) -> anyhow::Result<Vec<Mention>> {
            Ok(text
                .split_whitespace()
                .map(|w| {
                    let label = if w.chars().any(|c| c.is_ascii_digit())
                        && w.chars().all(|c| !c.is_lowercase())
                    {
                        "Gene"
                    } else {
                        "Other"
                    };
                    Mention::new(w, label)
                })
                .collect())
        }
    }

    #[test]
    fn test_label_filter() {
        let normalizer = normalizer();
        let config = NormalizationConfig::default();
        let docs = DocumentNormalizer::new(&normalizer, &config);

        let mentions = vec![
            Mention::new("BRCA1", "Gene"),
            Mention::new("breast cancer", "Disease_disorder"),
            Mention::new("", "Gene"),
            Mention::new("p53", "protein"),
        ];
        let results = docs.normalize_mentions(&mentions);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].method, MatchMethod::Exact);
        assert_eq!(results[1].method, MatchMethod::Alias);
    }

    #[test]
    fn test_annotate_with_extractor() {
        let normalizer = normalizer();
        let config = NormalizationConfig::default();
        let docs = DocumentNormalizer::new(&normalizer, &config);

        let results = docs
            .annotate("loss of TP53 and BRCA1 in tumours", &UppercaseTagger)
            .unwrap();
        let ids: Vec<_> = results.iter().filter_map(|r| r.identifier.as_deref()).collect();
        assert_eq!(ids, vec!["HGNC:11998", "HGNC:1100"]);
    }

    #[test]
    fn test_normalize_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ner_predictions.jsonl");
        let output = dir.path().join("out/normalized_entities.jsonl");
        fs::write(
            &input,
            concat!(
                r#"{"source": "a.xml", "text": "BRCA1 ...", "entities": [{"entity_group": "Gene", "word": "BRCA1", "start": 0}]}"#,
                "\n",
                r#"{"source": "b.xml", "text": "nothing", "entities": []}"#,
                "\n",
                r#"{"source": "c.xml", "text": "BRCAA1", "entities": [{"entity_group": "GENE_NAME", "word": "BRCAA1"}, {"entity_group": "Sign_symptom", "word": "pain"}]}"#,
                "\n"
            ),
        )
        .unwrap();

        let normalizer = normalizer();
        let config = NormalizationConfig::default();
        let stats = DocumentNormalizer::new(&normalizer, &config)
            .normalize_file(&input, &output)
            .unwrap();

        assert_eq!(stats.documents, 3);
        assert_eq!(stats.mentions, 2);
        assert_eq!(stats.exact, 1);
        assert_eq!(stats.fuzzy, 1);

        let lines: Vec<Value> = fs::read_to_string(&output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["source"], "a.xml");
        assert_eq!(lines[0]["normalized_genes"][0]["hgnc_id"], "HGNC:1100");
        assert_eq!(lines[1]["normalized_genes"], serde_json::json!([]));
        assert_eq!(lines[2]["normalized_genes"][0]["method"], "fuzzy");
    }
}
