//! PyPI API client.
//!
//! PyPI is the main Python package index. API reference:
//! warehouse.pypa.io/api-reference/json.html

use indexmap::IndexMap;
use serde::Deserialize;

use super::RegistryError;

const PYPI_URL: &str = "https://pypi.org";

/// Response of the package JSON endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PipPackage {
    pub info: PipPackageInfo,
    /// Files of every release, keyed by version string. The registry emits
    /// versions as ordered JSON keys (oldest first); the map keeps that
    /// order so the newest release is the last entry. A release with no
    /// remaining files keeps its key with an empty list.
    #[serde(default)]
    pub releases: IndexMap<String, Vec<ReleaseFile>>,
}

/// General package information block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipPackageInfo {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub release_url: String,
    #[serde(default)]
    pub package_url: String,
}

/// One distributed file of a release.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseFile {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub yanked: bool,
}

/// Client for a PyPI-compatible API service.
#[derive(Debug, Clone)]
pub struct PyPiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PyPiClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, PYPI_URL)
    }

    /// Points the client at a custom PyPI-compatible service.
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        PyPiClient {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches metadata and the full release history of a package.
    pub async fn release(&self, name: &str) -> Result<PipPackage, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidRequest(
                "package name is required and can't be empty".to_string(),
            ));
        }

        let url = format!("{}/pypi/{}/json", self.base_url, name);
        log::debug!("fetching {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::PackageNotFound(name.to_string()));
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

    /// Alias for [`PyPiClient::release`], mirroring the API route name.
    pub async fn package(&self, name: &str) -> Result<PipPackage, RegistryError> {
        self.release(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE_FIXTURE: &str = r#"{
        "info": {
            "author": "Django Software Foundation",
            "name": "Django",
            "version": "3.0.5",
            "release_url": "https://pypi.org/project/Django/3.0.5/",
            "package_url": "https://pypi.org/project/Django/"
        },
        "releases": {
            "1.0.1": [{"filename": "Django-1.0.1.tar.gz", "url": "https://example.org/Django-1.0.1.tar.gz", "yanked": false}],
            "2.2.12": [{"filename": "Django-2.2.12.tar.gz", "url": "https://example.org/Django-2.2.12.tar.gz", "yanked": false}],
            "3.0.5": []
        }
    }"#;

    #[test]
    fn test_package_response_keeps_release_order() {
        let package: PipPackage = serde_json::from_str(PACKAGE_FIXTURE).unwrap();

        let versions: Vec<_> = package.releases.keys().collect();
        assert_eq!(versions, ["1.0.1", "2.2.12", "3.0.5"]);

        // Newest release is the last key, even with no remaining files.
        assert_eq!(package.releases.keys().next_back().unwrap(), "3.0.5");
        assert!(package.releases["3.0.5"].is_empty());
    }

    #[test]
    fn test_package_response_info() {
        let package: PipPackage = serde_json::from_str(PACKAGE_FIXTURE).unwrap();

        assert_eq!(package.info.name, "Django");
        assert_eq!(package.info.author, "Django Software Foundation");
        assert_eq!(package.info.release_url, "https://pypi.org/project/Django/3.0.5/");
        assert_eq!(package.releases["1.0.1"][0].filename, "Django-1.0.1.tar.gz");
    }
}
