//! High-level dependency inspection API.
//!
//! A [`DependencySource`](source::DependencySource) reads a project's
//! manifests (from memory, a local directory or a git host) and yields the
//! declared [`Constraint`]s and locked [`Requirement`]s. An
//! [`UpdatesChecker`](checker::UpdatesChecker) then compares those against
//! the public registry of the chosen ecosystem to report available updates.

pub mod checker;
pub mod source;

pub use checker::{
    CheckError, ComposerUpdatesChecker, PipUpdatesChecker, Update, UpdatesChecker,
};
pub use dephub_providers::parsers::{Constraint, Requirement};
pub use source::{DependencySource, DirSource, GitSource, MemorySource, SourceError};

/// Package manager selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepType {
    /// PHP's Composer package manager.
    Composer,
    /// Python's PIP package manager.
    Pip,
}

impl DepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepType::Composer => "composer",
            DepType::Pip => "pip",
        }
    }
}

impl std::fmt::Display for DepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
