//! URL and path helpers.
//!
//! All fragment handling in the router goes through these functions so that
//! nested routers agree on how base URLs, rooted paths and hash prefixes are
//! built.
//!
//! # Rules
//!
//! 1. Fragments handed to the router are split at the first `?` into path and
//!    query string.
//! 2. A child router's paths are rooted at its base URL, which is the
//!    parent's base URL followed by the part of the parent fragment that the
//!    parent route consumed.
//! 3. Without push state every rooted path gets a `#` prefix.
//! 4. Absolute URLs (`scheme://…` or `//…`) are never rewritten.
//!
//! ```
//! use navigator_pipeline::url::{create_rooted_path, normalize_path, split_url};
//!
//! assert_eq!(split_url("/users/42?tab=posts"), ("/users/42", Some("tab=posts")));
//! assert_eq!(normalize_path("users/"), "/users");
//! assert_eq!(create_rooted_path("settings", "/users/42/", true, false), "/users/42/settings");
//! assert_eq!(create_rooted_path("settings", "", false, false), "#/settings");
//! ```

use std::borrow::Cow;

/// Strip leading and trailing slashes from a path.
#[inline]
pub(crate) fn trim_slashes(path: &str) -> &str {
    path.trim_start_matches('/').trim_end_matches('/')
}

/// Split a URL into its path part and optional query string.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Normalize a path for consistent comparison.
///
/// Ensures paths have a leading slash and no trailing slash (unless root).
/// Returns `Cow<str>` to avoid allocation when the path is already normalized.
///
/// ```
/// use navigator_pipeline::url::normalize_path;
///
/// assert_eq!(normalize_path("/dashboard"), "/dashboard");
/// assert_eq!(normalize_path("dashboard"), "/dashboard");
/// assert_eq!(normalize_path("/dashboard/"), "/dashboard");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &'_ str) -> Cow<'_, str> {
    if path.is_empty() {
        return Cow::Borrowed("/");
    }
    if path == "/" {
        return Cow::Borrowed(path);
    }

    let has_leading = path.starts_with('/');
    let has_trailing = path.ends_with('/');
    if has_leading && !has_trailing && !path.starts_with("//") {
        return Cow::Borrowed(path);
    }

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{trimmed}"))
    }
}

/// Turn whatever a history implementation reports (`#/users`, `//users`,
/// `users`) into the rooted fragment the router works with (`/users`).
pub fn fragment_from_location(location: &str) -> String {
    let stripped = location.trim_start_matches('#').trim_start_matches('/');
    format!("/{}", stripped.trim_end())
}

/// `true` for `scheme://host…` and protocol-relative `//host…` URLs.
pub fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid_scheme && rest.starts_with("//")
}

/// Apply the hash prefix (no push state) or strip the leading slash
/// (push state + absolute) to a rooted path.
pub fn normalize_absolute_path(path: &str, has_push_state: bool, absolute: bool) -> String {
    let mut path = path.to_string();
    if !has_push_state && !path.starts_with('#') {
        path.insert(0, '#');
    }
    if has_push_state && absolute && !path.is_empty() {
        path.remove(0);
    }
    path
}

/// Root `fragment` at `base_url`.
pub fn create_rooted_path(
    fragment: &str,
    base_url: &str,
    has_push_state: bool,
    absolute: bool,
) -> String {
    if is_absolute_url(fragment) {
        return fragment.to_string();
    }

    let mut path = String::new();
    if !base_url.is_empty() && !base_url.starts_with('/') {
        path.push('/');
    }
    path.push_str(base_url);

    if !path.ends_with('/') && !fragment.starts_with('/') {
        path.push('/');
    }
    if path.ends_with('/') && fragment.starts_with('/') {
        path.pop();
    }

    path.push_str(fragment);
    normalize_absolute_path(&path, has_push_state, absolute)
}

/// Resolve a navigation target: rooted paths are kept, relative ones are
/// rooted at `base_url`.
pub fn resolve_url(fragment: &str, base_url: &str, has_push_state: bool) -> String {
    if fragment.starts_with('/') || fragment.starts_with('#') {
        return normalize_absolute_path(fragment, has_push_state, false);
    }
    create_rooted_path(fragment, base_url, has_push_state, false)
}
