//! Gene mention resolution
//!
//! Each mention goes through exact symbol, alias, then fuzzy matching and
//! stops at the first stage that produces an answer. Fuzzy matches carry a
//! candidate symbol and score but no identifier.

use serde::de::{Deserializer, IgnoredAny};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::catalog::SymbolCatalog;
use super::fuzzy::best_match;

/// Raw entity span from the NER tagger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    #[serde(alias = "word")]
    pub text: String,
    #[serde(alias = "entity_group", default)]
    pub label: String,
}

impl Mention {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Alias,
    Fuzzy,
    None,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Alias => "alias",
            MatchMethod::Fuzzy => "fuzzy",
            MatchMethod::None => "none",
        }
    }
}

/// One resolved mention.
///
/// Serialized records keep the normalized-entities shape: `hgnc_id` for
/// exact/alias hits, `candidate: [symbol, score]` for fuzzy matches and
/// `candidate: []` when nothing matched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resolution {
    pub mention: String,
    #[serde(rename = "hgnc_id", default)]
    pub identifier: Option<String>,
    /// `(symbol, score)` for fuzzy matches
    #[serde(default, deserialize_with = "deserialize_candidate")]
    pub candidate: Option<(String, u8)>,
    pub method: MatchMethod,
    #[serde(default)]
    pub score: Option<u8>,
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("mention", &self.mention)?;
        if let Some(id) = &self.identifier {
            map.serialize_entry("hgnc_id", id)?;
        }
        match (&self.candidate, self.method) {
            (Some(candidate), _) => map.serialize_entry("candidate", candidate)?,
            (None, MatchMethod::None) => map.serialize_entry("candidate", &[] as &[(String, u8)])?,
            _ => {}
        }
        map.serialize_entry("method", &self.method)?;
        if let Some(score) = self.score {
            map.serialize_entry("score", &score)?;
        }
        map.end()
    }
}

/// Accepts `[symbol, score]`, `[]` or null
fn deserialize_candidate<'de, D>(deserializer: D) -> Result<Option<(String, u8)>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Pair(String, u8),
        Empty(Vec<IgnoredAny>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Pair(symbol, score)) => Some((symbol, score)),
        _ => None,
    })
}

impl Resolution {
    fn resolved(mention: &str, id: &str, method: MatchMethod) -> Self {
        Self {
            mention: mention.to_string(),
            identifier: Some(id.to_string()),
            candidate: None,
            method,
            score: None,
        }
    }

    fn unresolved(mention: &str) -> Self {
        Self {
            mention: mention.to_string(),
            identifier: None,
            candidate: None,
            method: MatchMethod::None,
            score: None,
        }
    }
}

pub struct SymbolNormalizer {
    catalog: SymbolCatalog,
    min_fuzzy_score: u8,
}

impl SymbolNormalizer {
    pub fn new(catalog: SymbolCatalog) -> Self {
        Self {
            catalog,
            min_fuzzy_score: 1,
        }
    }

    /// Fuzzy candidates scoring below `score` resolve to `none`
    pub fn with_min_fuzzy_score(mut self, score: u8) -> Self {
        self.min_fuzzy_score = score;
        self
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Resolve one mention. Never fails; unmatched text yields `none`.
    pub fn resolve(&self, mention: &str) -> Resolution {
        if mention.is_empty() {
            return Resolution::unresolved(mention);
        }

        if let Some(id) = self.catalog.exact(mention) {
            return Resolution::resolved(mention, id, MatchMethod::Exact);
        }

        if let Some(id) = self.catalog.alias(mention) {
            return Resolution::resolved(mention, id, MatchMethod::Alias);
        }

        match best_match(mention, self.catalog.keys()) {
            Some((symbol, score)) if score >= self.min_fuzzy_score.max(1) => Resolution {
                mention: mention.to_string(),
                identifier: None,
                candidate: Some((symbol.to_string(), score)),
                method: MatchMethod::Fuzzy,
                score: Some(score),
            },
            _ => Resolution::unresolved(mention),
        }
    }

    /// Resolve mentions in order. Empty mentions are skipped.
    pub fn resolve_all<'a, I>(&self, mentions: I) -> Vec<Resolution>
    where
        I: IntoIterator<Item = &'a str>,
    {
        mentions
            .into_iter()
            .filter(|m| !m.is_empty())
            .map(|m| self.resolve(m))
            .collect()
    }
}
