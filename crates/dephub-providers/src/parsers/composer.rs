//! Composer manifest parsing (`composer.json` + `composer.lock`).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;

use super::{Constraint, DependencyParser, ParserError, Requirement};
use crate::fetchers::FileFetcher;

/// Relevant subset of `composer.json`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    require: IndexMap<String, String>,
}

/// Relevant subset of `composer.lock`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ComposerLock {
    #[serde(default)]
    packages: Vec<Requirement>,
}

/// Parser over a project's Composer manifests.
pub struct ComposerParser {
    fetcher: Arc<dyn FileFetcher>,
}

impl ComposerParser {
    pub fn new(fetcher: Arc<dyn FileFetcher>) -> Self {
        ComposerParser { fetcher }
    }
}

#[async_trait]
impl DependencyParser for ComposerParser {
    /// Returns the locked package versions from `composer.lock`. Packages
    /// also declared in `composer.json` require are flagged as base; a
    /// missing `composer.json` only means no package gets the flag.
    async fn requirements(&self) -> Result<Vec<Requirement>, ParserError> {
        let base_packages: HashSet<String> = match self.constraints().await {
            Ok(constraints) => constraints.into_iter().map(|c| c.name).collect(),
            Err(ParserError::FileNotFound) => HashSet::new(),
            Err(err) => return Err(err),
        };

        let content = self.fetcher.file_content("composer.lock").await?;
        let lock: ComposerLock = serde_json::from_slice(&content)?;

        Ok(lock
            .packages
            .into_iter()
            .map(|mut pkg| {
                pkg.base = base_packages.contains(&pkg.name);
                pkg
            })
            .collect())
    }

    /// Returns the declared constraints from `composer.json` require, in
    /// manifest order.
    async fn constraints(&self) -> Result<Vec<Constraint>, ParserError> {
        let content = self.fetcher.file_content("composer.json").await?;
        let manifest: ComposerJson = serde_json::from_slice(&content)?;

        Ok(manifest
            .require
            .into_iter()
            .map(|(name, version)| Constraint { name, version })
            .collect())
    }
}
