pub mod config;
pub mod error;
pub mod passage;
pub mod paths;

pub use error::{Error, Result};
