//! Symbol catalog built from the HGNC reference table
//!
//! Two maps: approved symbol -> HGNC id, and alias/previous symbol -> HGNC id.
//! When one alias appears on several rows the last row wins. That silently
//! rebinds the alias, so collisions are counted and reported once per build.

use std::collections::HashMap;
use std::path::Path;

use crate::core::error::{Error, Result};

const SYMBOL_COL: &str = "symbol";
const ID_COL: &str = "hgnc_id";
const ALIAS_COL: &str = "alias_symbol";
const PREV_COL: &str = "prev_symbol";

#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    primary: HashMap<String, String>,
    aliases: HashMap<String, String>,
    /// primary ∪ alias keys, sorted and deduplicated
    keys: Vec<String>,
    alias_collisions: usize,
}

impl SymbolCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Load from a tab-separated HGNC export.
    ///
    /// Fails with `MissingReferenceData` if the file does not exist.
    pub fn from_tsv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing("HGNC reference table", path));
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
        let symbol_idx = column(SYMBOL_COL)?;
        let id_idx = column(ID_COL)?;
        let alias_idx = headers.iter().position(|h| h == ALIAS_COL);
        let prev_idx = headers.iter().position(|h| h == PREV_COL);

        let mut builder = Self::builder();
        for record in reader.records() {
            let record = record?;
            let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

            builder.add_row(
                field(Some(symbol_idx)),
                field(Some(id_idx)),
                field(alias_idx),
                field(prev_idx),
            );
        }

        let catalog = builder.build();
        tracing::info!(
            symbols = catalog.primary.len(),
            aliases = catalog.aliases.len(),
            "Loaded symbol catalog from {}",
            path.display()
        );
        Ok(catalog)
    }

    pub fn exact(&self, symbol: &str) -> Option<&str> {
        self.primary.get(symbol).map(String::as_str)
    }

    pub fn alias(&self, symbol: &str) -> Option<&str> {
        self.aliases.get(symbol).map(String::as_str)
    }

    /// All matchable symbols, sorted
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.primary.len()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Aliases that were rebound to a different id during the build
    pub fn alias_collisions(&self) -> usize {
        self.alias_collisions
    }
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    primary: HashMap<String, String>,
    aliases: HashMap<String, String>,
    alias_collisions: usize,
}

impl CatalogBuilder {
    /// Register one reference row. `aliases` and `previous` are `|`-separated.
    ///
    /// Rows without an id are ignored; blank tokens are skipped.
    pub fn add_row(&mut self, symbol: &str, id: &str, aliases: &str, previous: &str) -> &mut Self {
        let id = id.trim();
        if id.is_empty() {
            return self;
        }

        let symbol = symbol.trim();
        if !symbol.is_empty() {
            self.primary.insert(symbol.to_string(), id.to_string());
        }

        for token in aliases.split('|').chain(previous.split('|')) {
            self.add_alias(token, id);
        }
        self
    }

    pub fn add_alias(&mut self, alias: &str, id: &str) -> &mut Self {
        let alias = alias.trim();
        if alias.is_empty() || id.is_empty() {
            return self;
        }

        if let Some(previous) = self.aliases.insert(alias.to_string(), id.to_string()) {
            if previous != id {
                tracing::debug!(alias, previous = %previous, id, "Alias rebound");
                self.alias_collisions += 1;
            }
        }
        self
    }

    pub fn build(self) -> SymbolCatalog {
        let mut keys: Vec<String> = self
            .primary
            .keys()
            .chain(self.aliases.keys())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();

        if self.alias_collisions > 0 {
            tracing::warn!(
                "{} alias symbol(s) map to more than one HGNC id; the last row read wins",
                self.alias_collisions
            );
        }

        SymbolCatalog {
            primary: self.primary,
            aliases: self.aliases,
            keys,
            alias_collisions: self.alias_collisions,
        }
    }
}
