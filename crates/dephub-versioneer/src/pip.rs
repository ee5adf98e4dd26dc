//! PIP (Python) version and constraint grammar
//!
//! Constraint expressions follow the requirement-specifier syntax used in
//! `requirements.txt`: a flat comma-separated list of clauses that are all
//! AND'd together. There is no OR combinator. See
//! <https://pip.pypa.io/en/stable/reference/requirement-specifiers/>.

use std::cmp::Ordering;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ConstraintError, VersionError};
use crate::grammar::{
    is_wildcard_segment, operator_alternation, parse_optional_segment, parse_segment,
    BUILD_METADATA, PRERELEASE,
};
use crate::segments::{tilde_match, wildcard_equal, Segments, Wildcard};

lazy_static! {
    /// Anchored version grammar. Unlike Composer, a fourth numeric segment is
    /// tolerated (some PyPI releases carry one) but takes no part in
    /// comparisons. Applied to lower-cased input.
    static ref VERSION_RE: Regex = Regex::new(&format!(
        r"^v?(?P<major>[0-9]+)(?P<minor>\.[0-9]+)?(?P<patch>\.[0-9]+)?(?P<extra>\.[0-9]+)?{PRERELEASE}{BUILD_METADATA}$"
    ))
    .unwrap();

    /// Anchored unary clause grammar: optional operator token followed by a
    /// wildcard-capable version pattern at three segments of precision.
    static ref CONSTRAINT_RE: Regex = Regex::new(&format!(
        r"^\s*(?P<op>{alt})\s*(?P<ver>v?(?P<major>[0-9xX*]+)(?P<minor>\.[0-9xX*]+)?(?P<patch>\.[0-9xX*]+)?{PRERELEASE}{BUILD_METADATA})\s*$",
        alt = operator_alternation(&PipOperator::tokens()),
    ))
    .unwrap();
}

/// Comparison operators accepted in PIP requirement clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipOperator {
    /// `==`, or no operator at all: equality under the clause's wildcard rules.
    Equal,
    /// `===` — literal comparison against the raw version text.
    ArbitraryEqual,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<=`
    LessThanOrEqual,
    /// `~=` — compatible release, same major with minor free to advance.
    TildeEqual,
}

impl PipOperator {
    const TABLE: &'static [(&'static str, PipOperator)] = &[
        ("", PipOperator::Equal),
        ("==", PipOperator::Equal),
        ("===", PipOperator::ArbitraryEqual),
        ("!=", PipOperator::NotEqual),
        (">", PipOperator::GreaterThan),
        ("<", PipOperator::LessThan),
        (">=", PipOperator::GreaterThanOrEqual),
        ("<=", PipOperator::LessThanOrEqual),
        ("~=", PipOperator::TildeEqual),
    ];

    fn tokens() -> Vec<&'static str> {
        Self::TABLE.iter().map(|(token, _)| *token).collect()
    }

    /// Looks an operator up by its exact token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, op)| *op)
    }

    pub fn token(&self) -> &'static str {
        match self {
            PipOperator::Equal => "==",
            PipOperator::ArbitraryEqual => "===",
            PipOperator::NotEqual => "!=",
            PipOperator::GreaterThan => ">",
            PipOperator::LessThan => "<",
            PipOperator::GreaterThanOrEqual => ">=",
            PipOperator::LessThanOrEqual => "<=",
            PipOperator::TildeEqual => "~=",
        }
    }
}

impl fmt::Display for PipOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A fixed PyPI release version (e.g. `3.7.1` or `2020.12.5`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipVersion {
    segments: Segments,
    raw: String,
}

impl PipVersion {
    /// Parses a raw version string. The grammar is case-insensitive and an
    /// optional leading `v` is stripped; absent segments default to zero.
    pub fn parse(value: &str) -> Result<Self, VersionError> {
        let normalized = value.to_lowercase();
        let caps = VERSION_RE
            .captures(&normalized)
            .ok_or_else(|| VersionError::Unsupported(value.to_string()))?;

        Ok(PipVersion {
            segments: Segments::new(
                parse_segment(caps.name("major").map_or("0", |m| m.as_str()), value)?,
                parse_optional_segment(caps.name("minor").map(|m| m.as_str()), value)?,
                parse_optional_segment(caps.name("patch").map(|m| m.as_str()), value)?,
            ),
            raw: value.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.segments.major
    }

    pub fn minor(&self) -> u64 {
        self.segments.minor
    }

    pub fn patch(&self) -> u64 {
        self.segments.patch
    }

    /// Original unmodified raw value of the version.
    pub fn value(&self) -> &str {
        &self.raw
    }

    /// Orders by numeric segments only; the fourth segment, pre-release and
    /// build metadata suffixes are ignored, the raw text never participates.
    pub fn cmp_precedence(&self, other: &PipVersion) -> Ordering {
        self.segments.compare(&other.segments)
    }

    /// Validates that the version is within the constraints. Delegates to
    /// [`PipConstraints::matches`]; both directions yield the same result.
    pub fn matches(&self, constraints: &PipConstraints) -> bool {
        constraints.matches(self)
    }

    pub(crate) fn segments(&self) -> Segments {
        self.segments
    }
}

impl fmt::Display for PipVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// One unary clause of a requirement specifier (e.g. `>=2.2` out of
/// `>=2.2,<4.0`).
#[derive(Debug, Clone)]
struct PipClause {
    operator: PipOperator,
    wildcard: Wildcard,
    reference: PipVersion,
    // Verbatim version text of the clause, for `===`.
    raw_reference: String,
}

impl PipClause {
    fn matches(&self, version: &PipVersion) -> bool {
        let v = version.segments();
        let r = self.reference.segments();
        let w = self.wildcard;

        match self.operator {
            PipOperator::Equal => wildcard_equal(v, r, w),
            PipOperator::ArbitraryEqual => version.value() == self.raw_reference,
            PipOperator::NotEqual => !wildcard_equal(v, r, w),
            PipOperator::GreaterThan => v.compare(&r) == Ordering::Greater,
            PipOperator::LessThan => v.compare(&r) == Ordering::Less,
            PipOperator::GreaterThanOrEqual => {
                wildcard_equal(v, r, w) || v.compare(&r) == Ordering::Greater
            }
            PipOperator::LessThanOrEqual => {
                wildcard_equal(v, r, w) || v.compare(&r) == Ordering::Less
            }
            PipOperator::TildeEqual => tilde_match(v, r, w),
        }
    }
}

/// A parsed PIP requirement specifier: a flat conjunction of unary clauses.
#[derive(Debug, Clone)]
pub struct PipConstraints {
    raw: String,
    clauses: Vec<PipClause>,
}

impl PipConstraints {
    /// Parses a full requirement specifier. Any malformed clause fails the
    /// whole expression; there is no partial constraint.
    pub fn parse(value: &str) -> Result<Self, ConstraintError> {
        let clauses = value
            .split(',')
            .map(parse_clause)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PipConstraints {
            raw: value.to_string(),
            clauses,
        })
    }

    /// Original unmodified raw value of the constraint expression.
    pub fn value(&self) -> &str {
        &self.raw
    }

    /// True iff every clause matches.
    pub fn matches(&self, version: &PipVersion) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }
}

impl fmt::Display for PipConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn parse_clause(token: &str) -> Result<PipClause, ConstraintError> {
    let caps = CONSTRAINT_RE
        .captures(token)
        .ok_or_else(|| ConstraintError::Unsupported(token.to_string()))?;

    let operator = PipOperator::from_token(caps.name("op").map_or("", |m| m.as_str()))
        .ok_or_else(|| ConstraintError::Unsupported(token.to_string()))?;

    let major = caps.name("major").map_or("", |m| m.as_str());
    let minor = caps.name("minor").map(|m| &m.as_str()[1..]);
    let patch = caps.name("patch").map(|m| &m.as_str()[1..]);
    let pre = caps.name("pre").map_or("", |m| m.as_str());
    let raw_reference = caps.name("ver").map_or("", |m| m.as_str()).to_string();

    // The first wildcarded or omitted segment fixes the wildcard position;
    // it and everything after it is forced to zero in the reference version.
    let (wildcard, reference) = if is_wildcard_segment(major) {
        (Wildcard::Major, "0.0.0".to_string())
    } else if minor.map_or(true, is_wildcard_segment) {
        (Wildcard::Minor, format!("{major}.0.0{pre}"))
    } else if patch.map_or(true, is_wildcard_segment) {
        (
            Wildcard::Patch,
            format!("{major}.{minor}.0{pre}", minor = minor.unwrap_or("0")),
        )
    } else {
        (Wildcard::None, raw_reference.clone())
    };

    let reference = PipVersion::parse(&reference).map_err(|source| ConstraintError::Reference {
        token: token.to_string(),
        source,
    })?;

    Ok(PipClause {
        operator,
        wildcard,
        reference,
        raw_reference,
    })
}
