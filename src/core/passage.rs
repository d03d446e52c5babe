//! Passage store
//!
//! Passages are the unit of retrieval. A passage's position in the store is
//! its identity and the row of its vector in the embedding index.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::error::Result;
use super::paths::write_atomic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub source_id: Option<String>,
    pub sequence_index: usize,
    pub text: String,
}

/// One line of the passage JSONL produced by preprocessing
#[derive(Debug, Clone, Deserialize)]
pub struct PassageRecord {
    #[serde(default)]
    pub source: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct PassageStore {
    passages: Vec<Passage>,
}

impl PassageStore {
    /// Turn ordered records into passages; position becomes `sequence_index`.
    pub fn load<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PassageRecord>,
    {
        let passages = records
            .into_iter()
            .enumerate()
            .map(|(sequence_index, record)| Passage {
                source_id: record.source,
                sequence_index,
                text: record.text,
            })
            .collect();

        Self { passages }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::load(texts.into_iter().map(|t| PassageRecord {
            source: None,
            text: t.into(),
        }))
    }

    /// Read `{source, text}` JSONL records. Blank lines are skipped.
    pub fn from_jsonl(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let mut records = Vec::new();

        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str::<PassageRecord>(&line)?);
        }

        Ok(Self::load(records))
    }

    /// Persist texts as a JSON array of strings, one per index row.
    pub fn save_list(&self, path: &Path) -> Result<()> {
        let texts: Vec<&str> = self.passages.iter().map(|p| p.text.as_str()).collect();
        write_atomic(path, serde_json::to_string(&texts)?.as_bytes())?;
        Ok(())
    }

    pub fn load_list(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let texts: Vec<String> = serde_json::from_str(&content)?;
        Ok(Self::from_texts(texts))
    }

    pub fn get(&self, index: usize) -> Option<&Passage> {
        self.passages.get(index)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Passage> {
        self.passages.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.passages.iter().map(|p| p.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_assigns_positions() {
        let store = PassageStore::from_texts(["first", "second", "third"]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(1).unwrap().sequence_index, 1);
        assert_eq!(store.get(2).unwrap().text, "third");
        assert!(store.get(3).is_none());
    }

    #[test]
    fn test_from_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passages.jsonl");
        fs::write(
            &path,
            "{\"source\": \"a.xml\", \"text\": \"BRCA1 repairs DNA.\"}\n\n{\"source\": \"b.xml\", \"text\": \"TP53 is a tumor suppressor.\"}\n",
        )
        .unwrap();

        let store = PassageStore::from_jsonl(&path).unwrap();
        assert_eq!(store.len(), 2);
        let second = store.get(1).unwrap();
        assert_eq!(second.source_id.as_deref(), Some("b.xml"));
        assert_eq!(second.sequence_index, 1);
    }

    #[test]
    fn test_list_persistence_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passages_list.json");
        let store = PassageStore::from_texts(["zeta", "alpha", "mu"]);

        store.save_list(&path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"["zeta","alpha","mu"]"#);

        let loaded = PassageStore::load_list(&path).unwrap();
        assert_eq!(loaded.texts(), vec!["zeta", "alpha", "mu"]);
        assert!(loaded.get(0).unwrap().source_id.is_none());
    }
}
