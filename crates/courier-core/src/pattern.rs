//! Command patterns and the matcher used to rank them.
//!
//! The pattern language has three elements:
//!
//! - literal characters, matched verbatim;
//! - `*`, matching any run of characters;
//! - `$`, anchoring the match to the end of the input (at most once).
//!
//! A [`Matcher`] does not capture anything. It produces a score used to pick
//! the most specific of several competing patterns: the longer the literal
//! coverage, the higher the score.
//!
//! ```rust
//! use courier_core::Matcher;
//!
//! let any = Matcher::compile("/*").unwrap();
//! let exact = Matcher::compile("/a/b").unwrap();
//!
//! assert_eq!(any.score("/a/b"), Some(4));
//! assert_eq!(exact.score("/a/b"), Some(4));
//! assert_eq!(Matcher::compile("/a/bc").unwrap().score("/a/b"), None);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::PatternError;

/// Matches any run of characters.
pub const WILDCARD: char = '*';
/// Anchors the match to the end of the input.
pub const END_ANCHOR: char = '$';

/// A validated command pattern.
///
/// Immutable once parsed. The literal parts are the pattern split on
/// [`WILDCARD`] with every [`END_ANCHOR`] removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    parts: Vec<String>,
    suffix: bool,
    greedy: bool,
    min_len: usize,
}

impl Pattern {
    /// Parses and validates a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::MultipleAnchors`] if the pattern contains more
    /// than one `$`, and [`PatternError::Empty`] for the empty string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        if pattern.matches(END_ANCHOR).count() > 1 {
            return Err(PatternError::MultipleAnchors(pattern.to_string()));
        }

        let literal = pattern.replace(END_ANCHOR, "");
        let parts: Vec<String> = literal.split(WILDCARD).map(str::to_string).collect();
        if parts.is_empty() {
            return Err(PatternError::Empty);
        }

        Ok(Self {
            source: pattern.to_string(),
            min_len: parts.iter().map(String::len).sum(),
            suffix: pattern.ends_with(END_ANCHOR),
            greedy: pattern.ends_with(WILDCARD),
            parts,
        })
    }

    /// Returns the pattern text as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the literal parts in order.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Returns `true` if the pattern ends with `$`.
    pub fn is_suffix_anchored(&self) -> bool {
        self.suffix
    }

    /// Returns `true` if the pattern ends with `*`.
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// Total length of the literal parts, in bytes.
    pub fn min_length(&self) -> usize {
        self.min_len
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A compiled, stateless pattern matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pattern: Pattern,
}

impl Matcher {
    /// Wraps an already parsed pattern.
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern }
    }

    /// Parses and compiles a pattern in one step.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        Pattern::parse(pattern).map(Self::new)
    }

    /// Returns the compiled pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Scores `value` against the pattern.
    ///
    /// Returns `None` if the value does not match. Otherwise the score is a
    /// byte count used only for ranking:
    ///
    /// - a single literal part scores its own length (the value only has to
    ///   start with it);
    /// - a `$`-anchored or `*`-terminated pattern scores the full value length;
    /// - any other pattern scores the offset reached by the last literal part.
    pub fn score(&self, value: &str) -> Option<usize> {
        let pattern = &self.pattern;
        if value.len() < pattern.min_len {
            return None;
        }

        let (first, rest) = pattern.parts.split_first()?;
        if !value.starts_with(first.as_str()) {
            return None;
        }

        let mut matched = first.len();
        if rest.is_empty() {
            return Some(matched);
        }

        for part in rest {
            let idx = value[matched..].find(part.as_str())?;
            matched += idx + part.len();
        }

        if pattern.suffix {
            let last = rest.last().map(String::as_str).unwrap_or_default();
            return value.ends_with(last).then_some(value.len());
        }

        if pattern.greedy {
            return Some(value.len());
        }

        Some(matched)
    }

    /// Returns `true` if `value` matches the pattern.
    pub fn is_match(&self, value: &str) -> bool {
        self.score(value).is_some()
    }
}

impl FromStr for Matcher {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(pattern: &str, value: &str) -> Option<usize> {
        Matcher::compile(pattern).unwrap().score(value)
    }

    #[test]
    fn test_rejects_multiple_anchors() {
        let err = Matcher::compile("$$").unwrap_err();
        assert_eq!(err, PatternError::MultipleAnchors("$$".to_string()));
        assert!(err.to_string().contains("more than one $ in pattern: $$"));
    }

    #[test]
    fn test_rejects_empty_pattern() {
        assert_eq!(Matcher::compile("").unwrap_err(), PatternError::Empty);
    }

    #[test]
    fn test_pattern_attributes() {
        let pattern = Pattern::parse("/a*/b$").unwrap();
        assert_eq!(pattern.parts(), ["/a", "/b"]);
        assert!(pattern.is_suffix_anchored());
        assert!(!pattern.is_greedy());
        assert_eq!(pattern.min_length(), 4);
        assert_eq!(pattern.to_string(), "/a*/b$");

        let pattern: Pattern = "/menu*".parse().unwrap();
        assert_eq!(pattern.parts(), ["/menu", ""]);
        assert!(pattern.is_greedy());
    }

    #[test]
    fn test_match_table() {
        let cases = [
            ("/", "/", Some(1)),
            ("/*", "/a/b", Some(4)),
            ("/", "/a/b", Some(1)),
            ("/*/b", "/a/b", Some(4)),
            ("/a/b", "/a/b", Some(4)),
            ("/a/bc", "/a/b", None),
            ("*", "/a/b", Some(4)),
        ];

        for (pattern, value, expected) in cases {
            assert_eq!(score(pattern, value), expected, "pattern {pattern:?} on {value:?}");
        }
    }

    #[test]
    fn test_literal_pattern_is_prefix_match() {
        for value in ["/start", "/start now", "/startx"] {
            assert_eq!(score("/start", value), Some(6));
        }
        assert_eq!(score("/start", "/sta"), None);
        assert_eq!(score("/start", "x/start"), None);
    }

    #[test]
    fn test_suffix_anchor() {
        assert_eq!(score("/a*b$", "/a/xxb"), Some(6));
        assert_eq!(score("/a*b$", "/a/xxbc"), None);
        // A single literal part never reaches the anchor check.
        assert_eq!(score("/start$", "/start now"), Some(6));
    }

    #[test]
    fn test_non_greedy_scores_matched_offset() {
        assert_eq!(score("/a*c", "/a/b/c/d"), Some(6));
        assert_eq!(score("/a*c", "/a/b/d"), None);
    }

    #[test]
    fn test_parts_must_appear_in_order() {
        assert_eq!(score("/x*b*a", "/xab"), None);
        assert_eq!(score("/x*a*b", "/xab"), Some(4));
    }

    #[test]
    fn test_zero_scores_are_matches() {
        assert_eq!(score("*", ""), Some(0));
        assert_eq!(score("$", "anything"), Some(0));
        assert!(Matcher::compile("$").unwrap().is_match(""));
    }

    #[test]
    fn test_longer_full_matches_outrank_shorter() {
        for pattern in ["/a*", "/a*$", "/a*b*"] {
            let m = Matcher::compile(pattern).unwrap();
            let short = m.score("/a/b/").unwrap();
            let long = m.score("/a/b/ccc").unwrap();
            assert!(long >= short, "pattern {pattern:?}");
        }
    }
}
