//! Building blocks for dependency inspection.
//!
//! The crate is split along the data flow: [`fetchers`] load raw manifest
//! bytes from a storage backend, [`parsers`] turn those bytes into declared
//! constraints and locked requirements, and [`registry`] talks to the public
//! package registries (Packagist, PyPI) to learn what releases exist.

pub mod fetchers;
pub mod parsers;
pub mod registry;
