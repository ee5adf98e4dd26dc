//! Clients for the public package registries.

use thiserror::Error;

mod packagist;
mod pypi;

pub use packagist::{Author, PackageMeta, PackagesMeta, PackagistClient, SourceRef, VersionMeta};
pub use pypi::{PipPackage, PipPackageInfo, PyPiClient, ReleaseFile};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("package '{0}' not found in the registry")]
    PackageNotFound(String),

    #[error("registry responded with HTTP {status} for '{url}'")]
    Status { status: u16, url: String },

    #[error("unable to send registry request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unable to parse registry response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidRequest(String),
}
