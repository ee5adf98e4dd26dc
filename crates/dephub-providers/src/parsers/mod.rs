//! Parsers for the supported dependency manifest formats.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::fetchers::FetchError;

mod composer;
mod pip;

pub use composer::ComposerParser;
pub use pip::PipParser;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("dependency file not found")]
    FileNotFound,

    #[error("unable to fetch dependencies from the source: {0}")]
    Fetch(FetchError),

    #[error("unable to parse dependency file content: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<FetchError> for ParserError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound(_) => ParserError::FileNotFound,
            other => ParserError::Fetch(other),
        }
    }
}

/// One declared dependency with its raw constraint expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub version: String,
}

/// One locked dependency at a concrete version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    /// True when the package is also a top-level declared dependency
    /// (for example listed in `composer.json` require).
    #[serde(default)]
    pub base: bool,
}

/// Common interface over the per-ecosystem manifest parsers.
#[async_trait]
pub trait DependencyParser: Send + Sync {
    /// Returns the locked dependency versions, or an empty list for
    /// ecosystems without a lock manifest.
    async fn requirements(&self) -> Result<Vec<Requirement>, ParserError>;

    /// Returns the declared dependency constraints. These are ranges, not
    /// locked versions.
    async fn constraints(&self) -> Result<Vec<Constraint>, ParserError>;
}
