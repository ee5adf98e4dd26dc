//! PIP manifest parsing (`requirements.txt`).

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use super::{Constraint, DependencyParser, ParserError, Requirement};
use crate::fetchers::FileFetcher;

const DEFAULT_SOURCE_NAME: &str = "requirements.txt";

/// Specifier tokens recognized in requirement lines. Order matters: the
/// first token contained in a line wins, and longer tokens shadow their
/// prefixes.
const DELIMITERS: &[&str] = &["===", "==", ">=", "<=", "<", ">", "~=", "!="];

/// Parser over a project's `requirements.txt`-style manifest.
pub struct PipParser {
    fetcher: Arc<dyn FileFetcher>,
    source_name: String,
}

impl PipParser {
    pub fn new(fetcher: Arc<dyn FileFetcher>) -> Self {
        Self::with_source(fetcher, DEFAULT_SOURCE_NAME)
    }

    /// Uses `source_name` instead of the default `requirements.txt`.
    pub fn with_source(fetcher: Arc<dyn FileFetcher>, source_name: impl Into<String>) -> Self {
        PipParser {
            fetcher,
            source_name: source_name.into(),
        }
    }
}

#[async_trait]
impl DependencyParser for PipParser {
    /// PIP has no fully locked dependency manifest, so this is always empty.
    async fn requirements(&self) -> Result<Vec<Requirement>, ParserError> {
        Ok(Vec::new())
    }

    /// Returns the constraints declared in the requirements file, in file
    /// order. Unversioned names get the `*` constraint.
    async fn constraints(&self) -> Result<Vec<Constraint>, ParserError> {
        let content = self.fetcher.file_content(&self.source_name).await?;

        Ok(parse_requirements_txt(&content)
            .into_iter()
            .map(|(name, version)| Constraint { name, version })
            .collect())
    }
}

/// Extracts `name -> specifier` pairs from a requirements file.
///
/// Lines carrying signatures we cannot resolve against a registry (comments,
/// `-r` includes, file paths, URLs, environment markers) are skipped.
fn parse_requirements_txt(content: &[u8]) -> IndexMap<String, String> {
    let mut result = IndexMap::new();

    for line in String::from_utf8_lossy(content).lines() {
        let line: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with("-r")
            || line.contains('/')
            || line.contains(';')
        {
            continue;
        }
        let line = line.split('#').next().unwrap_or_default();

        let mut name = line;
        let mut version = "*".to_string();
        for delimiter in DELIMITERS {
            if line.contains(delimiter) {
                let mut parts = line.split(delimiter);
                name = parts.next().unwrap_or_default();
                version = format!("{}{}", delimiter, parts.next().unwrap_or_default());
                break;
            }
        }

        result.insert(name.to_string(), version);
    }

    result
}
