//! Route parameter extraction and query string parsing.
//!
//! This module provides two complementary types for working with URL data:
//!
//! - [`RouteParams`]: path parameters extracted from dynamic and star
//!   segments (e.g. `:id` in `users/:id`, `rest` in `files/*rest`). Supports
//!   typed access via [`get_as`](RouteParams::get_as) and ancestor merging via
//!   [`merge`](RouteParams::merge).
//! - [`QueryParams`]: query string parameters parsed from the
//!   `?key=value&...` portion of a URL. Supports multi-valued keys (e.g.
//!   `?tag=a&tag=b`), typed access, and round-trip serialization.
//!
//! Both are backed by ordered maps so that generated URLs and plan diffs are
//! deterministic.
//!
//! # Example
//!
//! ```
//! use navigator_pipeline::{QueryParams, RouteParams};
//!
//! let mut params = RouteParams::new();
//! params.set("id", "42");
//! assert_eq!(params.get_as::<u32>("id"), Some(42));
//!
//! let query = QueryParams::from_query_string("page=1&sort=name");
//! assert_eq!(query.get_as::<u32>("page"), Some(1));
//! assert_eq!(query.get("sort"), Some("name"));
//! ```

use std::collections::BTreeMap;

/// Route parameters extracted from path segments.
///
/// # Example
///
/// ```
/// use navigator_pipeline::RouteParams;
///
/// // Route pattern: users/:id
/// // Matched path: /users/123
/// let params = RouteParams::from_pairs([("id", "123")]);
///
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get_as::<i32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: BTreeMap<String, String>,
}

impl RouteParams {
    /// Create empty route parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a parameter value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter and parse it as a specific type.
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert or overwrite a parameter.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    /// Return `true` if the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over all `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Return the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Merge parent parameters with child parameters.
    ///
    /// Child parameters override parent parameters in case of collision.
    ///
    /// ```
    /// use navigator_pipeline::RouteParams;
    ///
    /// let parent = RouteParams::from_pairs([("workspace", "123"), ("view", "list")]);
    /// let child = RouteParams::from_pairs([("project", "456"), ("view", "grid")]);
    ///
    /// let merged = RouteParams::merge(&parent, &child);
    /// assert_eq!(merged.get("workspace"), Some("123"));
    /// assert_eq!(merged.get("project"), Some("456"));
    /// assert_eq!(merged.get("view"), Some("grid"));
    /// ```
    pub fn merge(parent: &RouteParams, child: &RouteParams) -> RouteParams {
        let mut merged = parent.clone();
        merged.extend(child);
        merged
    }

    /// Copy every pair of `other` into `self`, overwriting collisions.
    pub fn extend(&mut self, other: &RouteParams) {
        for (key, value) in &other.params {
            self.params.insert(key.clone(), value.clone());
        }
    }

    /// Symmetric key-by-key comparison, skipping `ignored` if given.
    ///
    /// A key present on one side only counts as a difference.
    pub fn differs_from(&self, other: &RouteParams, ignored: Option<&str>) -> bool {
        let differs = |a: &BTreeMap<String, String>, b: &BTreeMap<String, String>| {
            a.iter()
                .filter(|(key, _)| Some(key.as_str()) != ignored)
                .any(|(key, value)| b.get(key) != Some(value))
        };
        differs(&self.params, &other.params) || differs(&other.params, &self.params)
    }
}

impl<'a> IntoIterator for &'a RouteParams {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from a URL query string.
///
/// Supports multiple values for the same key. A bare key without `=` is
/// stored with an empty value.
///
/// ```
/// use navigator_pipeline::QueryParams;
///
/// let query = QueryParams::from_query_string("page=1&sort=name&tag=rust&tag=router");
///
/// assert_eq!(query.get("page"), Some("1"));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Create empty query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a query string (without the leading `?`).
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_uri_component(key), decode_uri_component(value));
        }
        params
    }

    /// Get the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.first().map(String::as_str)
    }

    /// Get all values for a key.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// Get the first value for a key, parsed as type `T`.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Append a value for the given key.
    ///
    /// If the key already exists, the new value is added to the list (not replaced).
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// Return `true` if the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over keys and their first value.
    pub fn iter_first(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.first().map(|first| (k.as_str(), first.as_str())))
    }

    /// Serialize back into a query string, keys in order.
    ///
    /// ```
    /// use navigator_pipeline::QueryParams;
    ///
    /// let mut query = QueryParams::new();
    /// query.insert("page", "1");
    /// query.insert("q", "a b");
    /// assert_eq!(query.to_query_string(), "page=1&q=a%20b");
    /// ```
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |value| {
                    format!(
                        "{}={}",
                        encode_uri_component(key),
                        encode_uri_component(value)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Return the number of unique parameter keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Percent-encode everything outside the unreserved set.
pub(crate) fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Percent-decode a query component, treating `+` as space.
pub(crate) fn decode_uri_component(s: &str) -> String {
    percent_decode(s, true)
}

/// Percent-decode a path segment; `+` is kept literally.
pub(crate) fn decode_path_segment(s: &str) -> String {
    percent_decode(s, false)
}

/// Malformed escapes are kept verbatim.
fn percent_decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.set("id", "123");

        assert_eq!(params.get("id"), Some("123"));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_route_params_get_as() {
        let params = RouteParams::from_pairs([("id", "123"), ("active", "true")]);

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_route_params_differs_symmetric() {
        let a = RouteParams::from_pairs([("id", "1")]);
        let b = RouteParams::from_pairs([("id", "1"), ("extra", "x")]);

        assert!(a.differs_from(&b, None));
        assert!(b.differs_from(&a, None));
        assert!(!a.differs_from(&a.clone(), None));
    }

    #[test]
    fn test_route_params_differs_ignores_key() {
        let a = RouteParams::from_pairs([("id", "1"), ("childRoute", "a")]);
        let b = RouteParams::from_pairs([("id", "1"), ("childRoute", "b")]);

        assert!(a.differs_from(&b, None));
        assert!(!a.differs_from(&b, Some("childRoute")));
    }

    #[test]
    fn test_query_params_multi_value() {
        let query = QueryParams::from_query_string("tag=a&tag=b&flag");
        assert_eq!(query.get_all("tag").unwrap(), ["a", "b"]);
        assert_eq!(query.get("flag"), Some(""));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_query_params_decoding() {
        let query = QueryParams::from_query_string("q=hello%20world&name=a+b&pct=100%");
        assert_eq!(query.get("q"), Some("hello world"));
        assert_eq!(query.get("name"), Some("a b"));
        assert_eq!(query.get("pct"), Some("100%"));
    }

    #[test]
    fn test_encode_utf8() {
        assert_eq!(encode_uri_component("é"), "%C3%A9");
        assert_eq!(decode_uri_component("%C3%A9"), "é");
    }
}
