//! Grammar building blocks shared by the two constraint parsers

use crate::error::VersionError;

/// Identifier tail accepted after `-` (pre-release) and `+` (build metadata).
/// Consumed by the grammars, ignored by comparisons.
pub(crate) const PRERELEASE: &str = r"(?P<pre>-[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?";
pub(crate) const BUILD_METADATA: &str = r"(?P<build>\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?";

/// Builds the operator alternation for a constraint regex.
///
/// Tokens are sorted longest-first before joining so that a token which is a
/// strict prefix of another (`<` vs `<=`, `==` vs `===`) can never shadow the
/// longer one. The empty token (implicit equality) always sorts last.
pub(crate) fn operator_alternation(tokens: &[&str]) -> String {
    let mut tokens: Vec<&str> = tokens.to_vec();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()));
    debug_assert!(
        tokens.windows(2).all(|w| w[0].len() >= w[1].len()),
        "operator tokens must be ordered longest-first"
    );
    tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

/// Parses one numeric version segment. The grammars only admit digit runs,
/// so the only possible failure is integer overflow.
pub(crate) fn parse_segment(segment: &str, raw: &str) -> Result<u64, VersionError> {
    segment
        .parse()
        .map_err(|_| VersionError::Segment(raw.to_string()))
}

/// Parses an optional `.segment` capture, defaulting absent segments to zero.
pub(crate) fn parse_optional_segment(
    segment: Option<&str>,
    raw: &str,
) -> Result<u64, VersionError> {
    match segment {
        Some(s) => parse_segment(s.trim_start_matches('.'), raw),
        None => Ok(0),
    }
}

/// A segment written as `*`, `x` or `X` means "any value at and below
/// this precision".
pub(crate) fn is_wildcard_segment(segment: &str) -> bool {
    matches!(segment, "*" | "x" | "X")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternation_orders_longest_first() {
        let alt = operator_alternation(&["", "<", "<=", "==", "==="]);
        assert_eq!(alt, "===|<=|==|<|");
    }

    #[test]
    fn test_wildcard_segments() {
        assert!(is_wildcard_segment("*"));
        assert!(is_wildcard_segment("x"));
        assert!(is_wildcard_segment("X"));
        assert!(!is_wildcard_segment("1"));
        assert!(!is_wildcard_segment("1x"));
        assert!(!is_wildcard_segment(""));
    }
}
