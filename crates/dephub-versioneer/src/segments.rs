//! Shared version data model and comparison primitives
//!
//! Both ecosystem grammars reduce a version to its leading numeric run of
//! `major.minor.patch` segments; everything here operates on that shape.
//! The per-ecosystem modules own their grammars and operator tables and
//! call into these primitives for the tie-break logic they share.

use std::cmp::Ordering;

/// Wildcard position inside a constraint clause.
///
/// Derived during parsing from the first segment written as `*`/`x`/`X`
/// or omitted (scanning major -> minor -> patch); trailing segments after
/// the wildcard are irrelevant and forced to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    /// All three segments are concrete.
    None,
    /// `*` — any version.
    Major,
    /// `1.*` or `1` — major pinned.
    Minor,
    /// `1.2.*` or `1.2` — major and minor pinned.
    Patch,
}

/// The three ordered numeric segments of a version, absent segments zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Segments {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Segments {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Segments { major, minor, patch }
    }

    /// Lexicographic comparison: the first differing segment decides.
    pub fn compare(&self, other: &Segments) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    pub fn is_zero(&self) -> bool {
        *self == Segments::default()
    }
}

/// Equality under the clause's wildcard: a wildcarded segment (and everything
/// below it) accepts any value, segments above it must match exactly.
pub(crate) fn wildcard_equal(version: Segments, reference: Segments, wildcard: Wildcard) -> bool {
    match wildcard {
        Wildcard::None => {
            version.major == reference.major
                && version.minor == reference.minor
                && version.patch == reference.patch
        }
        Wildcard::Major => true,
        Wildcard::Minor => version.major == reference.major,
        Wildcard::Patch => version.major == reference.major && version.minor == reference.minor,
    }
}

/// Tilde-style range check, shared between Composer `~` and PIP `~=`.
///
/// Versions below the reference never match. A full-precision reference pins
/// the major segment and lets minor advance; a patch-wildcarded reference
/// pins the major segment only (the lenient reduced-precision policy). A
/// major wildcard or the `0.0.0` reference accepts anything.
pub(crate) fn tilde_match(version: Segments, reference: Segments, wildcard: Wildcard) -> bool {
    if version.compare(&reference) == Ordering::Less {
        return false;
    }

    if wildcard == Wildcard::None
        && version.major == reference.major
        && reference.minor <= version.minor
    {
        return true;
    }
    if wildcard == Wildcard::Patch && version.major == reference.major {
        return true;
    }

    wildcard == Wildcard::Major || reference.is_zero()
}
