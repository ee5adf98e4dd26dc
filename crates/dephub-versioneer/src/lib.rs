//! Version and constraint matching for Composer and PIP range grammars
//!
//! This crate parses raw version strings and constraint expressions for the
//! two supported ecosystems and decides whether a concrete release satisfies
//! a declared requirement. The two grammars are related but not identical:
//! Composer combines comma/whitespace-AND groups with `||` (OR over ANDs) and
//! supports `~`/`^`, while PIP is a flat comma-AND list with `~=` and the
//! literal `===` comparison. They are deliberately kept as two separate sets
//! of types so each operator table stays exhaustive and compiler-checked.
//!
//! Parsing is pure and produces immutable values; matching is a total
//! function of two parsed inputs and never fails. Pre-release and build
//! metadata suffixes are accepted by the grammars but take no part in
//! comparisons.

mod composer;
mod error;
mod grammar;
mod pip;
mod segments;

pub use composer::{ComposerConstraints, ComposerOperator, ComposerVersion};
pub use error::{ConstraintError, VersionError};
pub use pip::{PipConstraints, PipOperator, PipVersion};
pub use segments::Wildcard;
