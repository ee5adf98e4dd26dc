//! Dependency sources: where the project manifests come from.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use dephub_providers::fetchers::{ByteMapFetcher, DirFetcher, FileFetcher, GitHubFetcher};
use dephub_providers::parsers::{
    ComposerParser, Constraint, DependencyParser, ParserError, PipParser, Requirement,
};

use crate::DepType;

lazy_static! {
    /// Parses repository information out of a GIT-compatible address string,
    /// e.g. `git@myhostname:vendor/reponame.git` or
    /// `https://myhostname/vendor/reponame.git`.
    static ref GIT_REPO_RE: Regex = Regex::new(
        r"^(?:git@|git:|ssh:|https?://)(?P<host>[\w.@~-]+)[:/](?P<repo>[\w.@:/~-]+)\.git(?:/-)?"
    )
    .unwrap();
}

/// Git hosts the fetchers can read files from.
const SUPPORTED_GIT_HOSTS: &[&str] = &["github.com"];

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("unsupported git repository format '{0}'")]
    UnsupportedAddress(String),

    #[error("git source '{0}' is not supported")]
    UnsupportedHost(String),

    #[error("unable to parse vendor from name '{0}'")]
    NoVendor(String),

    #[error(transparent)]
    Parser(#[from] ParserError),
}

/// Abstraction over package manager source files, providing a uniform way
/// to read dependency information regardless of where the project lives.
#[async_trait]
pub trait DependencySource: Send + Sync {
    /// Returns the project's locked dependency versions (if any).
    async fn requirements(&self, dep_type: DepType) -> Result<Vec<Requirement>, SourceError>;

    /// Returns the project's declared dependency constraints.
    async fn constraints(&self, dep_type: DepType) -> Result<Vec<Constraint>, SourceError>;
}

fn solve_parser(dep_type: DepType, fetcher: Arc<dyn FileFetcher>) -> Box<dyn DependencyParser> {
    match dep_type {
        DepType::Composer => Box::new(ComposerParser::new(fetcher)),
        DepType::Pip => Box::new(PipParser::new(fetcher)),
    }
}

async fn parse_requirements(
    dep_type: DepType,
    fetcher: Arc<dyn FileFetcher>,
) -> Result<Vec<Requirement>, SourceError> {
    Ok(solve_parser(dep_type, fetcher).requirements().await?)
}

async fn parse_constraints(
    dep_type: DepType,
    fetcher: Arc<dyn FileFetcher>,
) -> Result<Vec<Constraint>, SourceError> {
    Ok(solve_parser(dep_type, fetcher).constraints().await?)
}

/// Source over an in-memory file map, useful for tests and custom layers.
pub struct MemorySource {
    fetcher: Arc<dyn FileFetcher>,
}

impl MemorySource {
    pub fn new(files: HashMap<String, Vec<u8>>) -> Self {
        MemorySource {
            fetcher: Arc::new(ByteMapFetcher::new(files)),
        }
    }
}

#[async_trait]
impl DependencySource for MemorySource {
    async fn requirements(&self, dep_type: DepType) -> Result<Vec<Requirement>, SourceError> {
        parse_requirements(dep_type, Arc::clone(&self.fetcher)).await
    }

    async fn constraints(&self, dep_type: DepType) -> Result<Vec<Constraint>, SourceError> {
        parse_constraints(dep_type, Arc::clone(&self.fetcher)).await
    }
}

/// Source over a local project directory.
pub struct DirSource {
    fetcher: Arc<dyn FileFetcher>,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource {
            fetcher: Arc::new(DirFetcher::new(root)),
        }
    }
}

#[async_trait]
impl DependencySource for DirSource {
    async fn requirements(&self, dep_type: DepType) -> Result<Vec<Requirement>, SourceError> {
        parse_requirements(dep_type, Arc::clone(&self.fetcher)).await
    }

    async fn constraints(&self, dep_type: DepType) -> Result<Vec<Constraint>, SourceError> {
        parse_constraints(dep_type, Arc::clone(&self.fetcher)).await
    }
}

/// Source over a remote git repository.
pub struct GitSource {
    fetcher: Arc<dyn FileFetcher>,
}

impl GitSource {
    /// Builds a source reading manifests from the repository at `repo_addr`
    /// (e.g. `git@github.com:vendor/reponame.git`). `git_ref` may name a
    /// commit hash, branch or tag and defaults to the repository head.
    ///
    /// Pass a pre-configured [`reqwest::Client`] to attach authentication
    /// for increased rate limits or private repositories.
    pub fn new(
        client: reqwest::Client,
        repo_addr: &str,
        git_ref: Option<String>,
    ) -> Result<Self, SourceError> {
        let repo = parse_git_addr(repo_addr)?;
        Ok(GitSource {
            fetcher: Arc::new(GitHubFetcher::new(client, repo.vendor, repo.repo, git_ref)),
        })
    }
}

#[async_trait]
impl DependencySource for GitSource {
    async fn requirements(&self, dep_type: DepType) -> Result<Vec<Requirement>, SourceError> {
        parse_requirements(dep_type, Arc::clone(&self.fetcher)).await
    }

    async fn constraints(&self, dep_type: DepType) -> Result<Vec<Constraint>, SourceError> {
        parse_constraints(dep_type, Arc::clone(&self.fetcher)).await
    }
}

/// Basic repository information parsed from a git address.
#[derive(Debug)]
struct GitRepo {
    vendor: String,
    repo: String,
}

fn parse_git_addr(addr: &str) -> Result<GitRepo, SourceError> {
    let caps = GIT_REPO_RE
        .captures(addr)
        .ok_or_else(|| SourceError::UnsupportedAddress(addr.to_string()))?;

    let host = caps.name("host").map_or("", |m| m.as_str());
    let full_name = caps.name("repo").map_or("", |m| m.as_str());
    if host.is_empty() || full_name.is_empty() {
        return Err(SourceError::UnsupportedAddress(addr.to_string()));
    }

    if !SUPPORTED_GIT_HOSTS.contains(&host) {
        return Err(SourceError::UnsupportedHost(host.to_string()));
    }

    let mut parts = full_name.split('/');
    match (parts.next(), parts.next()) {
        (Some(vendor), Some(repo)) => Ok(GitRepo {
            vendor: vendor.to_string(),
            repo: repo.to_string(),
        }),
        _ => Err(SourceError::NoVendor(full_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_files() -> HashMap<String, Vec<u8>> {
        HashMap::from([
            (
                "composer.json".to_string(),
                br#"{
                    "require": {
                        "php": ">=7.1.3",
                        "barryvdh/laravel-debugbar": "^3.2",
                        "cartalyst/sentinel": "2.0.*",
                        "davejamesmiller/laravel-breadcrumbs": "^3.0"
                    }
                }"#
                .to_vec(),
            ),
            (
                "composer.lock".to_string(),
                br#"{
                    "packages": [
                        {"name": "aws/aws-sdk-php", "version": "3.69.16"},
                        {"name": "barryvdh/laravel-debugbar", "version": "v3.2.0"},
                        {"name": "cartalyst/sentinel", "version": "v2.0.17"}
                    ]
                }"#
                .to_vec(),
            ),
            (
                "requirements.txt".to_string(),
                b"Django==1.11.15\ndjango-phonenumber-field==1.1.0\neasy-thumbnails==2.4.2\n"
                    .to_vec(),
            ),
        ])
    }

    #[tokio::test]
    async fn test_memory_source_composer() {
        let source = MemorySource::new(mock_files());

        let constraints = source.constraints(DepType::Composer).await.unwrap();
        assert_eq!(constraints.len(), 4);
        assert_eq!(constraints[0].name, "php");
        assert_eq!(constraints[0].version, ">=7.1.3");
        assert_eq!(constraints[2].name, "cartalyst/sentinel");
        assert_eq!(constraints[2].version, "2.0.*");

        let requirements = source.requirements(DepType::Composer).await.unwrap();
        assert_eq!(requirements.len(), 3);
        assert_eq!(requirements[0].name, "aws/aws-sdk-php");
        assert_eq!(requirements[0].version, "3.69.16");
        assert!(!requirements[0].base);
        assert!(requirements[1].base);
        assert!(requirements[2].base);
    }

    #[tokio::test]
    async fn test_memory_source_pip() {
        let source = MemorySource::new(mock_files());

        let constraints = source.constraints(DepType::Pip).await.unwrap();
        assert_eq!(constraints.len(), 3);
        assert_eq!(constraints[0].name, "Django");
        assert_eq!(constraints[0].version, "==1.11.15");

        let requirements = source.requirements(DepType::Pip).await.unwrap();
        assert!(requirements.is_empty());
    }

    #[tokio::test]
    async fn test_memory_source_missing_files() {
        let source = MemorySource::new(HashMap::new());

        assert!(matches!(
            source.constraints(DepType::Composer).await.unwrap_err(),
            SourceError::Parser(ParserError::FileNotFound)
        ));
        assert!(matches!(
            source.requirements(DepType::Composer).await.unwrap_err(),
            SourceError::Parser(ParserError::FileNotFound)
        ));
    }

    #[test]
    fn test_parse_git_addr() {
        for addr in [
            "git@github.com/hello/world.git",
            "git@github.com:hello/world.git",
            "https://github.com/hello/world.git",
            "http://github.com/hello/world.git",
        ] {
            let repo = parse_git_addr(addr).unwrap();
            assert_eq!(repo.vendor, "hello", "{addr}");
            assert_eq!(repo.repo, "world", "{addr}");
        }
    }

    #[test]
    fn test_parse_git_addr_errors() {
        assert!(matches!(
            parse_git_addr("github.com/hello/world.git").unwrap_err(),
            SourceError::UnsupportedAddress(_)
        ));
        assert!(matches!(
            parse_git_addr("git@notgithub.com/hello/world.git").unwrap_err(),
            SourceError::UnsupportedHost(host) if host == "notgithub.com"
        ));
        assert!(matches!(
            parse_git_addr("http://github.com/hello_world.git").unwrap_err(),
            SourceError::NoVendor(name) if name == "hello_world"
        ));
    }

    #[test]
    fn test_git_source_constructor() {
        let client = reqwest::Client::new();
        assert!(GitSource::new(client.clone(), "git@github.com/hello/world.git", None).is_ok());
        assert!(GitSource::new(client, "github.com/hello/world.git", None).is_err());
    }
}
