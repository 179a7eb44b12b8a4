//! Command query codec.
//!
//! A query is the small key-value language embedded in message text and
//! callback payloads:
//!
//! ```text
//! <command>[ <key>[=<v1>[,<v2>...]]]*
//! ```
//!
//! Tokens are separated by [`PARAM_DELIMITER`], a key is separated from its
//! values by [`VALUE_DELIMITER`] and values are joined with [`SLICE_DELIMITER`].
//!
//! # Example
//!
//! ```rust
//! use courier_core::Query;
//!
//! let query = Query::decode("menu page=help");
//! assert_eq!(query.command, "menu");
//! assert_eq!(query.get("page"), Some("help"));
//! assert_eq!(query.encode(), "menu page=help");
//! ```
//!
//! Encoding is canonical: the command comes first and the remaining keys are
//! emitted in sorted order, so a decode/encode cycle is a fixed point but does
//! not necessarily reproduce the original token order.

use std::collections::BTreeMap;
use std::fmt;

/// Separates tokens.
pub const PARAM_DELIMITER: char = ' ';
/// Separates a key from its value list.
pub const VALUE_DELIMITER: char = '=';
/// Separates values inside a value list.
pub const SLICE_DELIMITER: char = ',';

/// A decoded command query.
///
/// A key mapped to an empty list is a flag: it is present without values.
/// Presence is decided by map membership, never by list length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// The key of the first token.
    pub command: String,
    /// Parameter values by key, including the command token itself.
    pub params: BTreeMap<String, Vec<String>>,
}

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query with the given command and no parameters.
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: BTreeMap::new(),
        }
    }

    /// Decodes a query string.
    ///
    /// Decoding never fails; empty tokens are skipped and repeated keys
    /// accumulate their values (`word=2 word=3` is the same as `word=2,3`).
    pub fn decode(text: &str) -> Self {
        let command = text
            .split(PARAM_DELIMITER)
            .next()
            .map(|first| split_key_values(first).0.to_string())
            .unwrap_or_default();

        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for token in text.split(PARAM_DELIMITER).filter(|t| !t.is_empty()) {
            let (key, values) = split_key_values(token);
            params.entry(key.to_string()).or_default().extend(values);
        }

        Self { command, params }
    }

    /// Encodes the query into its canonical text form.
    pub fn encode(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.params.len());

        if !self.command.is_empty() {
            let values = self
                .params
                .get(&self.command)
                .map(Vec::as_slice)
                .unwrap_or_default();
            parts.push(join_key_values(&self.command, values));
        }

        parts.extend(
            self.params
                .iter()
                .filter(|(key, _)| **key != self.command)
                .map(|(key, values)| join_key_values(key, values)),
        );

        parts.join(&PARAM_DELIMITER.to_string())
    }

    /// Replaces the command.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Appends a value to a key.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Appends an integer value to a key.
    pub fn with_param_int64(self, key: impl Into<String>, value: i64) -> Self {
        self.with_param(key, value.to_string())
    }

    /// Marks a key as present without adding a value.
    pub fn with_param_empty(mut self, key: impl Into<String>) -> Self {
        self.params.entry(key.into()).or_default();
        self
    }

    /// Returns `true` if the key is present, with or without values.
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Returns the first value of a key.
    ///
    /// A flag yields `Some("")`; an absent key yields `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let values = self.params.get(key)?;
        Some(values.first().map(String::as_str).unwrap_or_default())
    }

    /// Returns all values of a key.
    pub fn get_slice(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// Parses the first value of a key as an integer.
    ///
    /// A flag yields `Some(0)`. An absent key or a malformed value yields
    /// `None`; callers must not treat zero as "missing".
    pub fn get_int64(&self, key: &str) -> Option<i64> {
        match self.params.get(key)?.first() {
            None => Some(0),
            Some(value) => value.parse().ok(),
        }
    }

    /// Parses every value of a key as an integer.
    ///
    /// Returns `None` if the key is absent or any value is malformed.
    pub fn get_int64_slice(&self, key: &str) -> Option<Vec<i64>> {
        self.params
            .get(key)?
            .iter()
            .map(|value| value.parse().ok())
            .collect()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Self::decode(text)
    }
}

/// Joins a key with its values: `key` or `key=v1,v2`.
pub fn join_key_values(key: &str, values: &[String]) -> String {
    if values.is_empty() {
        return key.to_string();
    }

    format!(
        "{key}{VALUE_DELIMITER}{}",
        values.join(&SLICE_DELIMITER.to_string())
    )
}

/// Splits a token into its key and value list.
///
/// A token without [`VALUE_DELIMITER`] has no values; `key=` has one empty value.
pub fn split_key_values(token: &str) -> (&str, Vec<String>) {
    match token.split_once(VALUE_DELIMITER) {
        Some((key, values)) => (
            key,
            values.split(SLICE_DELIMITER).map(str::to_string).collect(),
        ),
        None => (token, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: Vec<(&str, Vec<&str>)>) -> BTreeMap<String, Vec<String>> {
        entries
            .into_iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_decode_empty() {
        let query = Query::decode("");
        assert_eq!(query.command, "");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_decode_command_only() {
        let query = Query::decode("/add");
        assert_eq!(query.command, "/add");
        assert_eq!(query.params, params(vec![("/add", vec![])]));
    }

    #[test]
    fn test_decode_menu() {
        let query = Query::decode("menu page=help");
        assert_eq!(query.command, "menu");
        assert_eq!(query.params, params(vec![("menu", vec![]), ("page", vec!["help"])]));
        assert_eq!(query.encode(), "menu page=help");
    }

    #[test]
    fn test_decode_comma_values() {
        let query = Query::decode("multi word=2,3 params=4");
        assert_eq!(query.command, "multi");
        assert_eq!(
            query.params,
            params(vec![("multi", vec![]), ("word", vec!["2", "3"]), ("params", vec!["4"])])
        );
    }

    #[test]
    fn test_decode_repeated_keys_accumulate() {
        let query = Query::decode("multi word=2 word=3 params");
        assert_eq!(
            query.params,
            params(vec![("multi", vec![]), ("word", vec!["2", "3"]), ("params", vec![])])
        );
        assert_eq!(query.encode(), "multi params word=2,3");
    }

    #[test]
    fn test_decode_command_with_values() {
        let query = Query::decode("command=test with params");
        assert_eq!(query.command, "command");
        assert_eq!(query.get("command"), Some("test"));
        assert_eq!(query.encode(), "command=test params with");
    }

    #[test]
    fn test_decode_skips_empty_tokens() {
        let query = Query::decode("menu  page=1 ");
        assert_eq!(query.params, params(vec![("menu", vec![]), ("page", vec!["1"])]));
    }

    #[test]
    fn test_encode_without_command() {
        let query = Query::new().with_param_empty("add");
        assert_eq!(query.encode(), "add");
    }

    #[test]
    fn test_encode_command_without_params_entry() {
        assert_eq!(Query::command("command").encode(), "command");
        assert_eq!(Query::new().encode(), "");
    }

    #[test]
    fn test_encode_is_canonical() {
        let query = Query::command("multi")
            .with_param("word", "2")
            .with_param("word", "3")
            .with_param("params", "4");
        assert_eq!(query.encode(), "multi params=4 word=2,3");
        assert_eq!(query.to_string(), query.encode());
    }

    #[test]
    fn test_canonical_form_is_fixed_point() {
        for text in ["z a=1 b", "cmd=x y=1,2 y=3 flag", "  lead trail  ", "a=,b c="] {
            let once = Query::decode(text).encode();
            let twice = Query::decode(&once).encode();
            assert_eq!(once, twice, "input: {text:?}");
        }
    }

    #[test]
    fn test_setters() {
        let encoded = Query::command("cmd")
            .with_param("string", "s")
            .with_param_int64("int", 42)
            .with_param_empty("empty")
            .encode();
        assert_eq!(encoded, "cmd empty int=42 string=s");
    }

    #[test]
    fn test_getters() {
        let query = Query::decode("cmd empty int=42 string=s bad=x ids=1,2,3");

        assert!(query.has("empty"));
        assert_eq!(query.get("empty"), Some(""));
        assert_eq!(query.get_int64("empty"), Some(0));

        assert_eq!(query.get("string"), Some("s"));
        assert_eq!(query.get("int"), Some("42"));
        assert_eq!(query.get_int64("int"), Some(42));

        assert_eq!(query.get_int64("bad"), None);
        assert!(query.has("bad"));

        assert!(!query.has("missing"));
        assert_eq!(query.get("missing"), None);
        assert_eq!(query.get_int64("missing"), None);
        assert_eq!(query.get_slice("missing"), None);

        assert_eq!(query.get_int64_slice("ids"), Some(vec![1, 2, 3]));
        assert_eq!(query.get_int64_slice("bad"), None);
        assert_eq!(query.get_int64_slice("empty"), Some(vec![]));
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(split_key_values("key"), ("key", vec![]));
        assert_eq!(split_key_values("key="), ("key", vec![String::new()]));
        assert_eq!(
            split_key_values("key=a,b=c"),
            ("key", vec!["a".to_string(), "b=c".to_string()])
        );
        assert_eq!(join_key_values("key", &[]), "key");
        assert_eq!(
            join_key_values("key", &["a".to_string(), "b".to_string()]),
            "key=a,b"
        );
    }
}
