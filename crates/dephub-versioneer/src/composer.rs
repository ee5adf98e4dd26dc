//! Composer (PHP) version and constraint grammar
//!
//! Constraint expressions follow the Composer version-range syntax: clauses
//! separated by `||` are OR'd, and within an OR-group clauses separated by
//! commas or whitespace are AND'd. See
//! <https://getcomposer.org/doc/articles/versions.md#version-range>.

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
    /// Anchored version grammar: `major(.minor)?(.patch)?(-pre)?(+build)?`,
    /// optionally prefixed with `v`. Applied to lower-cased input.
    static ref VERSION_RE: Regex = Regex::new(&format!(
        r"^v?(?P<major>[0-9]+)(?P<minor>\.[0-9]+)?(?P<patch>\.[0-9]+)?{PRERELEASE}{BUILD_METADATA}$"
    ))
    .unwrap();

    /// Anchored unary clause grammar: optional operator token followed by a
    /// wildcard-capable version pattern.
    static ref CONSTRAINT_RE: Regex = Regex::new(&format!(
        r"^\s*(?P<op>{alt})\s*(?P<ver>v?(?P<major>[0-9xX*]+)(?P<minor>\.[0-9xX*]+)?(?P<patch>\.[0-9xX*]+)?{PRERELEASE}{BUILD_METADATA})\s*$",
        alt = operator_alternation(&ComposerOperator::tokens()),
    ))
    .unwrap();
}

/// Comparison operators accepted in Composer constraint clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposerOperator {
    /// Empty operator: equality under the clause's wildcard rules.
    Equal,
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
    /// `~` — same major, minor may advance.
    Tilde,
    /// `^` — tilde with a minor lock for `major.minor` precision references.
    Caret,
}

impl ComposerOperator {
    const TABLE: &'static [(&'static str, ComposerOperator)] = &[
        ("", ComposerOperator::Equal),
        ("!=", ComposerOperator::NotEqual),
        (">", ComposerOperator::GreaterThan),
        ("<", ComposerOperator::LessThan),
        (">=", ComposerOperator::GreaterThanOrEqual),
        ("<=", ComposerOperator::LessThanOrEqual),
        ("~", ComposerOperator::Tilde),
        ("^", ComposerOperator::Caret),
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
            ComposerOperator::Equal => "",
            ComposerOperator::NotEqual => "!=",
            ComposerOperator::GreaterThan => ">",
            ComposerOperator::LessThan => "<",
            ComposerOperator::GreaterThanOrEqual => ">=",
            ComposerOperator::LessThanOrEqual => "<=",
            ComposerOperator::Tilde => "~",
            ComposerOperator::Caret => "^",
        }
    }
}

impl fmt::Display for ComposerOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A fixed Composer release version (e.g. `v1.2.3` or `2.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerVersion {
    segments: Segments,
    raw: String,
}

impl ComposerVersion {
    /// Parses a raw version string. The grammar is case-insensitive and an
    /// optional leading `v` is stripped; absent segments default to zero.
    pub fn parse(value: &str) -> Result<Self, VersionError> {
        let normalized = value.to_lowercase();
        let caps = VERSION_RE
            .captures(&normalized)
            .ok_or_else(|| VersionError::Unsupported(value.to_string()))?;

        Ok(ComposerVersion {
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

    /// Orders by numeric segments only; pre-release and build metadata
    /// suffixes are ignored, the raw text never participates.
    pub fn cmp_precedence(&self, other: &ComposerVersion) -> Ordering {
        self.segments.compare(&other.segments)
    }

    /// Validates that the version is within the constraints. Delegates to
    /// [`ComposerConstraints::matches`]; both directions yield the same result.
    pub fn matches(&self, constraints: &ComposerConstraints) -> bool {
        constraints.matches(self)
    }

    pub(crate) fn segments(&self) -> Segments {
        self.segments
    }
}

impl fmt::Display for ComposerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// One unary range clause of a constraint expression (e.g. `>=1.2` out of
/// `>=1.2||<2.0`).
#[derive(Debug, Clone)]
struct ComposerClause {
    operator: ComposerOperator,
    wildcard: Wildcard,
    reference: ComposerVersion,
}

impl ComposerClause {
    fn matches(&self, version: &ComposerVersion) -> bool {
        let v = version.segments();
        let r = self.reference.segments();
        let w = self.wildcard;

        match self.operator {
            ComposerOperator::Equal => wildcard_equal(v, r, w),
            ComposerOperator::NotEqual => !wildcard_equal(v, r, w),
            ComposerOperator::GreaterThan => v.compare(&r) == Ordering::Greater,
            ComposerOperator::LessThan => v.compare(&r) == Ordering::Less,
            ComposerOperator::GreaterThanOrEqual => {
                wildcard_equal(v, r, w) || v.compare(&r) == Ordering::Greater
            }
            ComposerOperator::LessThanOrEqual => {
                wildcard_equal(v, r, w) || v.compare(&r) == Ordering::Less
            }
            ComposerOperator::Tilde => tilde_match(v, r, w),
            ComposerOperator::Caret => {
                if v.compare(&r) == Ordering::Less {
                    return false;
                }
                // A major.minor-precision caret pins the minor segment too.
                if w == Wildcard::Patch && v.major == r.major {
                    return v.minor == r.minor;
                }
                tilde_match(v, r, w)
            }
        }
    }
}

/// A parsed Composer constraint expression: OR-groups of AND'd unary clauses.
#[derive(Debug, Clone)]
pub struct ComposerConstraints {
    raw: String,
    groups: Vec<Vec<ComposerClause>>,
}

impl ComposerConstraints {
    /// Parses a full constraint expression. Any malformed clause fails the
    /// whole expression; there is no partial constraint.
    pub fn parse(value: &str) -> Result<Self, ConstraintError> {
        let mut groups = Vec::new();
        for or_group in value.split("||") {
            let clauses = or_group
                .split([',', ' '])
                .filter(|token| !token.is_empty())
                .map(parse_clause)
                .collect::<Result<Vec<_>, _>>()?;
            if clauses.is_empty() {
                return Err(ConstraintError::Unsupported(or_group.trim().to_string()));
            }
            groups.push(clauses);
        }

        Ok(ComposerConstraints {
            raw: value.to_string(),
            groups,
        })
    }

    /// Original unmodified raw value of the constraint expression.
    pub fn value(&self) -> &str {
        &self.raw
    }

    /// True iff at least one OR-group has all of its clauses match.
    pub fn matches(&self, version: &ComposerVersion) -> bool {
        self.groups
            .iter()
            .any(|group| group.iter().all(|clause| clause.matches(version)))
    }
}

impl fmt::Display for ComposerConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn parse_clause(token: &str) -> Result<ComposerClause, ConstraintError> {
    let caps = CONSTRAINT_RE
        .captures(token)
        .ok_or_else(|| ConstraintError::Unsupported(token.to_string()))?;

    let operator = ComposerOperator::from_token(caps.name("op").map_or("", |m| m.as_str()))
        .ok_or_else(|| ConstraintError::Unsupported(token.to_string()))?;

    let major = caps.name("major").map_or("", |m| m.as_str());
    let minor = caps.name("minor").map(|m| &m.as_str()[1..]);
    let patch = caps.name("patch").map(|m| &m.as_str()[1..]);
    let pre = caps.name("pre").map_or("", |m| m.as_str());

    // The first wildcarded or omitted segment fixes the wildcard position;
    // it and everything after it is forced to zero in the reference version.
    let (wildcard, reference) = if is_wildcard_segment(major) {
        (Wildcard::Major, "0.0.0".to_string())
    } else if minor.map_or(true, is_wildcard_segment) {
        (Wildcard::Minor, format!("{major}.0.0{pre}"))
    } else if patch.map_or(true, is_wildcard_segment) {
        (Wildcard::Patch, format!("{major}.{minor}.0{pre}", minor = minor.unwrap_or("0")))
    } else {
        (
            Wildcard::None,
            caps.name("ver").map_or("", |m| m.as_str()).to_string(),
        )
    };

    let reference = ComposerVersion::parse(&reference).map_err(|source| ConstraintError::Reference {
        token: token.to_string(),
        source,
    })?;

    Ok(ComposerClause {
        operator,
        wildcard,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parts() {
        let version = ComposerVersion::parse("v1.2.3").unwrap();
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert_eq!(version.value(), "v1.2.3");
    }

    #[test]
    fn test_version_defaults_absent_segments() {
        let version = ComposerVersion::parse("3").unwrap();
        assert_eq!((version.major(), version.minor(), version.patch()), (3, 0, 0));

        let version = ComposerVersion::parse("3.7-beta.1+build-5").unwrap();
        assert_eq!((version.major(), version.minor(), version.patch()), (3, 7, 0));
    }

    #[test]
    fn test_version_errors() {
        assert!(matches!(
            ComposerVersion::parse("hi1.2.3"),
            Err(VersionError::Unsupported(_))
        ));
        assert!(ComposerVersion::parse("").is_err());
        assert!(ComposerVersion::parse("1.2.3 ").is_err());
        // Composer has no 4th numeric segment.
        assert!(ComposerVersion::parse("1.2.3.4").is_err());
        // Segment overflow is a parse error, not a silent truncation.
        assert!(matches!(
            ComposerVersion::parse("99999999999999999999999"),
            Err(VersionError::Segment(_))
        ));
    }

    #[test]
    fn test_constraints_keep_raw_value() {
        let raw = ">=1.2.3||<=1.4.0,  !=1.2.17";
        let constraints = ComposerConstraints::parse(raw).unwrap();
        assert_eq!(constraints.value(), raw);
    }

    #[test]
    fn test_constraints_errors() {
        // Single pipe is not an OR separator in Composer.
        assert!(ComposerConstraints::parse(">=1.2.3|<=1.4.0").is_err());
        assert!(ComposerConstraints::parse("").is_err());
        assert!(ComposerConstraints::parse("1.2.3||").is_err());
        assert!(ComposerConstraints::parse(">>1.2.3").is_err());
        assert!(ComposerConstraints::parse("~=1.2.3").is_err());
        assert!(ComposerConstraints::parse("===1.2.3").is_err());
        let err = ComposerConstraints::parse("abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    fn check(constraint: &str, version: &str, expected: bool) {
        let constraints = ComposerConstraints::parse(constraint).unwrap();
        assert_eq!(constraints.value(), constraint);
        let version = ComposerVersion::parse(version).unwrap();
        assert_eq!(
            constraints.matches(&version),
            expected,
            "constraint {constraint:?} vs version {:?}",
            version.value()
        );
        // Matching must be symmetric regardless of which side initiates it.
        assert_eq!(version.matches(&constraints), expected);
    }

    #[test]
    fn test_match_compound_expressions() {
        check(">=v1.2.3,<=1.4.0||98.1.*", "1.2.3", true);
        check(">=1.2.3,<=1.4.0||98.1.*", "1.3.2", true);
        check(">=1.2.3,<=1.4.0||v98.1.*", "v98.1.376", true);
        check(">=1.2.3,<=1.4.0||98.1.*", "v98.2.3", false);
        check(">=1.2.3,<=v1.4.0||98.1.*", "98.2", false);
        // Whitespace is an AND separator too.
        check(">=1.2.3 <=1.4.0", "1.3.0", true);
        check(">=1.2.3 <=1.4.0", "1.5.0", false);
    }

    #[test]
    fn test_match_equality_and_wildcards() {
        check("3.*", "3.0", true);
        check("3.*", "3.0.0", true);
        check("3.*", "3.9.9", true);
        check("3.*", "3.17.0", true);
        check("3.*", "3", true);
        check("3.*", "4.0.0", false);
        check("3.x", "3.17.0", true);
        check("3.X", "3.17.0", true);
        check("3.7", "3.7", true);
        check("3.7", "3.7.0", true);
        check("3", "3.7.0", true);
        check("3", "3.7", true);
        check("3", "3", true);
        check("*", "3", true);
        check("x", "3", true);
        check("v3", "3.7.0", true);
    }

    #[test]
    fn test_match_not_equal() {
        check("!=3.7", "3.7", false);
        check("!=3.7", "3.7.0", false);
        check("!=3.7||3.7", "3.7.0", true);
        check("!=3.7,3.7", "3.7.0", false);
        check("!=3.7 3.7", "3.7.0", false);
        check("!=3.7    3.7", "3.7.0", false);
    }

    #[test]
    fn test_match_comparisons() {
        check("<3.7", "3.6.0", true);
        check("<3.7.5", "3.7.4", true);
        check("<3.7.5", "3.7.5", false);
        check("<3.7.5", "3.7.6", false);
        check(">3.7", "3.7.0", false);
        check(">3.7", "3.7.1", true);
        check(">3.7", "3.8.0", true);
        check(">3.7.5", "3.7.6", true);
        check(">3.7.5", "3.7.5", false);
        check(">3.7.5", "3.7.4", false);
    }

    #[test]
    fn test_match_tilde() {
        check("~1.2", "1.2", true);
        check("~1.2", "1.2.0", true);
        check("~1.2", "1.2.1", true);
        check("~1.2", "1.8.99", true);
        check("~1.2", "1.1", false);
        check("~1.2", "2.0.0", false);
        check("~1.2", "2.1.0", false);
        check("~1.2.3", "1.2.3", true);
        check("~1.2.3", "1.2.199", true);
        check("~1.2.3", "2.0.0", false);
        check("~0.0.0", "123.213.213", true);
        check("~0.0.0", "0.0.0", true);
        check("~*", "123.213.213", true);
    }

    #[test]
    fn test_match_caret() {
        check("^1.2.3", "1.2.3", true);
        check("^1.2.3", "1.1.3", false);
        check("^1.2.3", "1.2.8", true);
        check("^1.2.3", "1.8.3", true);
        check("^1.2.3", "2.2.3", false);
        check("^1.2.3", "1.9.3", true);
        check("^0.3", "0.5.0", false);
        check("^0.3", "0.3.9", true);
    }

    // The reduced-precision tilde/caret branch is deliberately lenient:
    // `~1.2` locks the major segment only, while `^1.2` locks major and
    // minor. These pin the exact boundary.
    #[test]
    fn test_reduced_precision_range_boundaries() {
        check("~1.2", "1.9999.9999", true);
        check("~1.2", "2.0.0", false);
        check("~1.2.*", "1.9999.9999", true);
        check("~1.2.*", "2.0.0", false);
        check("^1.2", "1.2.9999", true);
        check("^1.2", "1.3.0", false);
        check("^1.2.*", "1.2.9999", true);
        check("^1.2.*", "1.3.0", false);
    }

    #[test]
    fn test_reparse_raw_is_equivalent() {
        let samples = ["1.1.3", "1.2.3", "1.3.2", "1.4.0", "2.0.0", "98.1.376", "98.2.3"];
        for raw in [">=1.2.3,<=1.4.0||98.1.*", "~1.2", "^1.2.3", "3.*"] {
            let first = ComposerConstraints::parse(raw).unwrap();
            let second = ComposerConstraints::parse(first.value()).unwrap();
            for sample in samples {
                let version = ComposerVersion::parse(sample).unwrap();
                assert_eq!(first.matches(&version), second.matches(&version), "{raw} vs {sample}");
            }
        }
    }

    #[test]
    fn test_cmp_precedence() {
        let a = ComposerVersion::parse("1.2.3").unwrap();
        let b = ComposerVersion::parse("v1.2.3").unwrap();
        let c = ComposerVersion::parse("1.3").unwrap();
        assert_eq!(a.cmp_precedence(&b), Ordering::Equal);
        assert_eq!(a.cmp_precedence(&c), Ordering::Less);
        assert_eq!(c.cmp_precedence(&a), Ordering::Greater);
    }
}
