//! Gene symbol normalization
//!
//! # Components
//!
//! - `catalog`: HGNC symbol and alias maps
//! - `fuzzy`: token-set similarity for unmatched mentions
//! - `resolver`: exact -> alias -> fuzzy resolution chain
//! - `document`: batch normalization of tagged documents

pub mod catalog;
pub mod document;
pub mod fuzzy;
pub mod resolver;

pub use catalog::{CatalogBuilder, SymbolCatalog};
pub use document::{DocumentNormalizer, EntityExtractor, NormalizeStats};
pub use resolver::{MatchMethod, Mention, Resolution, SymbolNormalizer};
