//! Packagist API client.
//!
//! Packagist is the main Composer repository, aggregating the public PHP
//! packages installable with Composer. API reference: packagist.org/apidoc

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use super::RegistryError;

const PACKAGIST_URL: &str = "https://packagist.org";

/// Response of the package metadata endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PackagesMeta {
    /// Package metadata keyed by full package name. Besides the requested
    /// package the endpoint also lists packages replacing it.
    pub packages: HashMap<String, PackageMeta>,
}

/// All known versions of one package, keyed by version string.
///
/// The registry emits versions as ordered JSON keys (oldest first); the map
/// keeps that order so the newest release is the last entry.
pub type PackageMeta = IndexMap<String, VersionMeta>;

/// Metadata of one released version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub source: SourceRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Pointer to the VCS source of a release.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Client for a Packagist-compatible API service.
#[derive(Debug, Clone)]
pub struct PackagistClient {
    client: reqwest::Client,
    base_url: String,
}

impl PackagistClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, PACKAGIST_URL)
    }

    /// Points the client at a custom Packagist-compatible service.
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        PackagistClient {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches metadata for every known version of `{vendor}/{package}`.
    pub async fn meta(&self, vendor: &str, package: &str) -> Result<PackagesMeta, RegistryError> {
        if vendor.is_empty() || package.is_empty() {
            return Err(RegistryError::InvalidRequest(
                "'vendor' and 'package' are required for a meta request".to_string(),
            ));
        }

        let url = format!("{}/p/{}/{}.json", self.base_url, vendor, package);
        log::debug!("fetching {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::PackageNotFound(format!(
                "{vendor}/{package}"
            )));
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
