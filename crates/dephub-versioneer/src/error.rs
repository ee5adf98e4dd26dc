//! Engine error types

use thiserror::Error;

/// Error type for version parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The raw text does not match the anchored version grammar.
    #[error("version '{0}' is not supported")]
    Unsupported(String),
    /// A numeric segment failed integer parsing (overflow).
    #[error("version segment in '{0}' is out of range")]
    Segment(String),
}

/// Error type for constraint parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// A clause token does not match the anchored operator+version grammar.
    #[error("constraint not supported: '{0}'")]
    Unsupported(String),
    /// The clause's derived reference version itself failed to parse.
    #[error("unable to parse version in constraint '{token}': {source}")]
    Reference {
        token: String,
        #[source]
        source: VersionError,
    },
}
