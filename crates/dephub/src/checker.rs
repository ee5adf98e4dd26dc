//! Update checkers: compare declared and locked dependencies against the
//! public registries.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use dephub_providers::parsers::{Constraint, Requirement};
use dephub_providers::registry::{
    PackageMeta, PackagistClient, PipPackage, PyPiClient, RegistryError, VersionMeta,
};
use dephub_versioneer::{ComposerConstraints, ComposerVersion, PipConstraints, PipVersion};

/// One available package update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Update {
    pub version: String,
    pub name: String,
    pub author: String,
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub current_version: String,
    #[serde(rename = "constraint", skip_serializing_if = "String::is_empty")]
    pub current_constraint: String,
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("no packages provided")]
    NoPackages,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Read access to Composer package metadata. Implemented by
/// [`PackagistClient`]; checker tests substitute their own.
#[async_trait]
pub trait PackageMetaSource: Send + Sync {
    /// Returns all known versions of the `{vendor}/{package}` named package.
    async fn package_meta(&self, name: &str) -> Result<PackageMeta, RegistryError>;
}

#[async_trait]
impl PackageMetaSource for PackagistClient {
    async fn package_meta(&self, name: &str) -> Result<PackageMeta, RegistryError> {
        let parts: Vec<&str> = name.split('/').collect();
        let (vendor, package) = match parts.as_slice() {
            [vendor, package] => (*vendor, *package),
            _ => {
                return Err(RegistryError::InvalidRequest(format!(
                    "cannot parse vendor from package name '{name}'"
                )))
            }
        };

        let meta = self.meta(vendor, package).await?;
        meta.packages
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::PackageNotFound(name.to_string()))
    }
}

/// Read access to PyPI release listings. Implemented by [`PyPiClient`];
/// checker tests substitute their own.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn releases(&self, name: &str) -> Result<PipPackage, RegistryError>;
}

#[async_trait]
impl ReleaseSource for PyPiClient {
    async fn releases(&self, name: &str) -> Result<PipPackage, RegistryError> {
        self.release(name).await
    }
}

/// Common interface of the per-ecosystem update checkers.
#[async_trait]
pub trait UpdatesChecker: Send + Sync {
    /// Returns the newest available update for each locked dependency that
    /// still satisfies its declared constraint.
    ///
    /// Basically it is "your locked dependency is lower than available
    /// within your constraints".
    async fn compatible_updates(
        &self,
        constraints: &[Constraint],
        requirements: &[Requirement],
    ) -> Result<Vec<Update>, CheckError>;

    /// Returns the newest release for each package. With `incompatible_only`
    /// set, packages whose newest release already satisfies their declared
    /// constraint are omitted.
    async fn last_updates(
        &self,
        packages: &[Constraint],
        incompatible_only: bool,
    ) -> Result<Vec<Update>, CheckError>;
}

/// Composer packages update checker backed by the Packagist API.
pub struct ComposerUpdatesChecker<A = PackagistClient> {
    api: A,
}

impl ComposerUpdatesChecker {
    pub fn new(client: reqwest::Client) -> Self {
        ComposerUpdatesChecker {
            api: PackagistClient::new(client),
        }
    }
}

impl<A: PackageMetaSource> ComposerUpdatesChecker<A> {
    pub fn with_api(api: A) -> Self {
        ComposerUpdatesChecker { api }
    }
}

#[async_trait]
impl<A: PackageMetaSource> UpdatesChecker for ComposerUpdatesChecker<A> {
    async fn compatible_updates(
        &self,
        constraints: &[Constraint],
        requirements: &[Requirement],
    ) -> Result<Vec<Update>, CheckError> {
        if constraints.is_empty() || requirements.is_empty() {
            return Err(CheckError::NoPackages);
        }

        let lookup: HashMap<&str, &Requirement> = requirements
            .iter()
            .map(|req| (req.name.as_str(), req))
            .collect();

        let mut result = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            let Some(req) = lookup.get(constraint.name.as_str()) else {
                continue;
            };

            let meta = match self.api.package_meta(&constraint.name).await {
                Ok(meta) => meta,
                Err(err) => {
                    log::debug!("skipping package '{}': {err}", constraint.name);
                    continue;
                }
            };

            if let Some(update) = compatible_release(constraint, req, &meta) {
                result.push(update);
            }
        }

        Ok(result)
    }

    async fn last_updates(
        &self,
        packages: &[Constraint],
        incompatible_only: bool,
    ) -> Result<Vec<Update>, CheckError> {
        if packages.is_empty() {
            return Err(CheckError::NoPackages);
        }

        let mut result = Vec::with_capacity(packages.len());
        'packages: for pkg in packages {
            let meta = match self.api.package_meta(&pkg.name).await {
                Ok(meta) => meta,
                Err(err) => {
                    log::debug!("skipping package '{}': {err}", pkg.name);
                    continue;
                }
            };

            let Ok(constraint) = ComposerConstraints::parse(&pkg.version) else {
                continue;
            };

            // Only the newest parsable release is of interest.
            for release in meta.values().rev() {
                let Ok(version) = ComposerVersion::parse(&release.version) else {
                    continue;
                };

                // The package is already up to date.
                if incompatible_only && constraint.matches(&version) {
                    continue 'packages;
                }

                let mut update = release_update(release);
                update.current_constraint = pkg.version.clone();
                result.push(update);
                continue 'packages;
            }
        }

        Ok(result)
    }
}

/// Finds the newest release satisfying both the declared constraint and
/// being above the currently locked version.
fn compatible_release(
    constraint: &Constraint,
    req: &Requirement,
    meta: &PackageMeta,
) -> Option<Update> {
    let declared = ComposerConstraints::parse(&constraint.version).ok()?;
    let above_locked = ComposerConstraints::parse(&format!(">{}", req.version)).ok()?;

    for release in meta.values().rev() {
        let Ok(version) = ComposerVersion::parse(&release.version) else {
            continue;
        };

        if above_locked.matches(&version) && declared.matches(&version) {
            let mut update = release_update(release);
            update.current_version = req.version.clone();
            update.current_constraint = constraint.version.clone();
            return Some(update);
        }
    }

    None
}

/// Converts a registry release entry to an [`Update`]. The package name
/// stands in for the author when the release lists none.
fn release_update(release: &VersionMeta) -> Update {
    let author = release
        .authors
        .first()
        .map(|author| author.name.clone())
        .unwrap_or_else(|| release.name.clone());

    Update {
        version: release.version.clone(),
        name: release.name.clone(),
        author,
        url: release.source.url.clone(),
        ..Default::default()
    }
}

/// PIP packages update checker backed by the PyPI API.
pub struct PipUpdatesChecker<R = PyPiClient> {
    api: R,
}

impl PipUpdatesChecker {
    pub fn new(client: reqwest::Client) -> Self {
        PipUpdatesChecker {
            api: PyPiClient::new(client),
        }
    }
}

impl<R: ReleaseSource> PipUpdatesChecker<R> {
    pub fn with_api(api: R) -> Self {
        PipUpdatesChecker { api }
    }
}

#[async_trait]
impl<R: ReleaseSource> UpdatesChecker for PipUpdatesChecker<R> {
    /// Always empty: PIP has no fully locked dependency manifest to compare
    /// declared constraints against.
    async fn compatible_updates(
        &self,
        constraints: &[Constraint],
        requirements: &[Requirement],
    ) -> Result<Vec<Update>, CheckError> {
        if constraints.is_empty() || requirements.is_empty() {
            return Err(CheckError::NoPackages);
        }

        Ok(Vec::new())
    }

    async fn last_updates(
        &self,
        packages: &[Constraint],
        incompatible_only: bool,
    ) -> Result<Vec<Update>, CheckError> {
        if packages.is_empty() {
            return Err(CheckError::NoPackages);
        }

        let mut result = Vec::with_capacity(packages.len());
        'packages: for pkg in packages {
            let package = match self.api.releases(&pkg.name).await {
                Ok(package) => package,
                Err(err) => {
                    log::debug!("skipping package '{}': {err}", pkg.name);
                    continue;
                }
            };

            let Ok(constraint) = PipConstraints::parse(&pkg.version) else {
                continue;
            };

            // Only the newest parsable release is of interest.
            for release in package.releases.keys().rev() {
                let Ok(version) = PipVersion::parse(release) else {
                    continue;
                };

                // The package is already up to date.
                if incompatible_only && constraint.matches(&version) {
                    continue 'packages;
                }

                result.push(Update {
                    version: release.clone(),
                    name: pkg.name.clone(),
                    author: package.info.author.clone(),
                    url: package.info.release_url.clone(),
                    current_constraint: pkg.version.clone(),
                    ..Default::default()
                });
                continue 'packages;
            }
        }

        Ok(result)
    }
}
