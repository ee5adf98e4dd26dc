//! File fetchers for local and remote project sources.
//!
//! A fetcher resolves a root-relative path (`composer.json`,
//! `requirements.txt`, ...) to raw bytes. Parsers stay storage-agnostic by
//! only depending on the [`FileFetcher`] trait.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("dependency file '{0}' not found")]
    NotFound(String),

    #[error("unable to load '{path}' from the source: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only access to one project's files.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Returns the raw content of the file at the root-relative `path`.
    async fn file_content(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// In-memory fetcher, useful for tests and custom source layers.
#[derive(Debug, Clone, Default)]
pub struct ByteMapFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl ByteMapFetcher {
    pub fn new(files: HashMap<String, Vec<u8>>) -> Self {
        ByteMapFetcher { files }
    }
}

#[async_trait]
impl FileFetcher for ByteMapFetcher {
    async fn file_content(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

/// Fetcher over a local project directory.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirFetcher { root: root.into() }
    }
}

#[async_trait]
impl FileFetcher for DirFetcher {
    async fn file_content(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        match tokio::fs::read(self.root.join(path)).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.to_string()))
            }
            Err(err) => Err(FetchError::Io(err)),
        }
    }
}

/// Fetcher over a GitHub repository, reading files at a given ref through
/// the raw content endpoint.
///
/// Pass a pre-configured [`reqwest::Client`] to attach authentication for
/// increased rate limits or private repositories.
#[derive(Debug, Clone)]
pub struct GitHubFetcher {
    client: reqwest::Client,
    owner: String,
    repo: String,
    git_ref: Option<String>,
}

impl GitHubFetcher {
    /// `owner` and `repo` follow the `{owner}/{repo}` notation; `git_ref`
    /// may name a commit hash, branch or tag and defaults to `HEAD`.
    pub fn new(
        client: reqwest::Client,
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: Option<String>,
    ) -> Self {
        GitHubFetcher {
            client,
            owner: owner.into(),
            repo: repo.into(),
            git_ref,
        }
    }

    fn raw_url(&self, path: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            self.owner,
            self.repo,
            self.git_ref.as_deref().unwrap_or("HEAD"),
            path
        )
    }
}

#[async_trait]
impl FileFetcher for GitHubFetcher {
    async fn file_content(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.raw_url(path);
        log::debug!("fetching {url}");

        let http = |source| FetchError::Http {
            path: path.to_string(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(http)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        let response = response.error_for_status().map_err(http)?;

        Ok(response.bytes().await.map_err(http)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_byte_map_fetcher() {
        let files = HashMap::from([("composer.json".to_string(), b"{}".to_vec())]);
        let fetcher = ByteMapFetcher::new(files);

        let content = fetcher.file_content("composer.json").await.unwrap();
        assert_eq!(content, b"{}");

        let err = fetcher.file_content("composer.lock").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(path) if path == "composer.lock"));
    }

    #[tokio::test]
    async fn test_dir_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "django==3.0").unwrap();
        let fetcher = DirFetcher::new(dir.path());

        let content = fetcher.file_content("requirements.txt").await.unwrap();
        assert_eq!(content, b"django==3.0");

        let err = fetcher.file_content("missing.txt").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[test]
    fn test_github_raw_url() {
        let client = reqwest::Client::new();

        let fetcher = GitHubFetcher::new(client.clone(), "vendor", "repo", None);
        assert_eq!(
            fetcher.raw_url("composer.json"),
            "https://raw.githubusercontent.com/vendor/repo/HEAD/composer.json"
        );

        let fetcher = GitHubFetcher::new(client, "vendor", "repo", Some("v1.2.3".to_string()));
        assert_eq!(
            fetcher.raw_url("requirements.txt"),
            "https://raw.githubusercontent.com/vendor/repo/v1.2.3/requirements.txt"
        );
    }
}
