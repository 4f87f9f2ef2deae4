//! Segment-based route recognition.
//!
//! A [`RouteRecognizer`] stores route patterns and resolves URLs into an
//! ordered list of matches. Patterns are split by `/` into segments:
//!
//! | Segment   | Meaning                                                  |
//! |-----------|----------------------------------------------------------|
//! | `users`   | static, matched case-insensitively unless case-sensitive |
//! | `:id`     | dynamic, captures exactly one path segment               |
//! | `:id?`    | optional dynamic, captures zero or one segment           |
//! | `*rest`   | star, captures the remaining segments (possibly none)    |
//!
//! Every pattern that matches contributes one [`RecognizedRoute`]. Results are
//! ordered by specificity: patterns with fewer star segments come first; among
//! star patterns more static then more dynamic segments win; otherwise fewer
//! dynamic then more static segments win. Ties keep registration order.
//!
//! # Example
//!
//! ```
//! use navigator_pipeline::recognizer::RouteRecognizer;
//!
//! let mut recognizer = RouteRecognizer::new();
//! recognizer.add("users/:id", "user", false);
//! recognizer.add("users/*rest", "fallback", false);
//!
//! let results = recognizer.recognize("/users/42?tab=posts");
//! assert_eq!(results[0].handler, "user");
//! assert_eq!(results[0].params.get("id"), Some("42"));
//! assert_eq!(results[0].query_params.get("tab"), Some("posts"));
//! assert_eq!(results[1].handler, "fallback");
//! ```

use crate::error::{Result, RouterError};
use crate::params::{decode_path_segment, encode_uri_component, QueryParams, RouteParams};
use crate::url::{split_url, trim_slashes};
use crate::{debug_log, trace_log};
use std::cmp::Ordering;
use std::collections::HashMap;

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, RecognitionCache};

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text.
    Static(String),
    /// `:name` or `:name?`.
    Dynamic { name: String, optional: bool },
    /// `*name`.
    Star(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            match name.strip_suffix('?') {
                Some(name) => Self::Dynamic {
                    name: name.to_string(),
                    optional: true,
                },
                None => Self::Dynamic {
                    name: name.to_string(),
                    optional: false,
                },
            }
        } else if let Some(name) = raw.strip_prefix('*') {
            Self::Star(name.to_string())
        } else {
            Self::Static(raw.to_string())
        }
    }

    /// Name of the parameter this segment captures, if any.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Static(_) => None,
            Self::Dynamic { name, .. } | Self::Star(name) => Some(name),
        }
    }
}

/// Parse a pattern into its segments.
pub fn parse_pattern(pattern: &str) -> Vec<Segment> {
    trim_slashes(pattern)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(Segment::parse)
        .collect()
}

/// Segment counts of a registered pattern.
///
/// Returned from [`RouteRecognizer::add`]; the router uses
/// [`is_dynamic`](Self::is_dynamic) to reject nav-model routes that need an
/// explicit href.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteShape {
    pub statics: usize,
    pub dynamics: usize,
    pub stars: usize,
}

impl RouteShape {
    fn of(segments: &[Segment]) -> Self {
        segments.iter().fold(Self::default(), |mut shape, seg| {
            match seg {
                Segment::Static(_) => shape.statics += 1,
                Segment::Dynamic { .. } => shape.dynamics += 1,
                Segment::Star(_) => shape.stars += 1,
            }
            shape
        })
    }

    /// `true` if the pattern captures any parameter.
    pub const fn is_dynamic(&self) -> bool {
        self.dynamics > 0 || self.stars > 0
    }

    fn specificity(&self, other: &Self) -> Ordering {
        if self.stars != other.stars {
            return self.stars.cmp(&other.stars);
        }
        if self.stars > 0 {
            if self.statics != other.statics {
                return other.statics.cmp(&self.statics);
            }
            if self.dynamics != other.dynamics {
                return other.dynamics.cmp(&self.dynamics);
            }
        }
        if self.dynamics != other.dynamics {
            return self.dynamics.cmp(&other.dynamics);
        }
        other.statics.cmp(&self.statics)
    }
}

/// One match produced by [`RouteRecognizer::recognize`].
#[derive(Debug, Clone)]
pub struct RecognizedRoute<H> {
    pub handler: H,
    pub params: RouteParams,
    pub query_params: QueryParams,
    /// Whether the matched pattern captured any parameter.
    pub is_dynamic: bool,
}

#[derive(Debug)]
struct RouteEntry<H> {
    segments: Vec<Segment>,
    shape: RouteShape,
    handler: H,
    case_sensitive: bool,
}

/// Ordered pattern table with reverse generation by name.
#[derive(Debug)]
pub struct RouteRecognizer<H> {
    routes: Vec<RouteEntry<H>>,
    names: HashMap<String, usize>,
    #[cfg(feature = "cache")]
    cache: RecognitionCache<H>,
}

impl<H: Clone> RouteRecognizer<H> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            names: HashMap::new(),
            #[cfg(feature = "cache")]
            cache: RecognitionCache::new(),
        }
    }

    /// Register `pattern` and return its shape.
    pub fn add(&mut self, pattern: &str, handler: H, case_sensitive: bool) -> RouteShape {
        let segments = parse_pattern(pattern);
        let shape = RouteShape::of(&segments);
        trace_log!("Registering pattern '{}' ({:?})", pattern, shape);
        self.routes.push(RouteEntry {
            segments,
            shape,
            handler,
            case_sensitive,
        });
        #[cfg(feature = "cache")]
        self.cache.clear();
        shape
    }

    /// Register `pattern` under `name` for reverse generation.
    ///
    /// Registering the same name twice makes the later pattern win.
    pub fn add_named(
        &mut self,
        name: &str,
        pattern: &str,
        handler: H,
        case_sensitive: bool,
    ) -> RouteShape {
        let shape = self.add(pattern, handler, case_sensitive);
        self.names.insert(name.to_string(), self.routes.len() - 1);
        shape
    }

    /// `true` if a pattern was registered under `name`.
    pub fn has_route(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Handler registered under `name`.
    pub fn handler_for(&self, name: &str) -> Option<&H> {
        self.names.get(name).map(|&index| &self.routes[index].handler)
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match `url` against every pattern, most specific first.
    pub fn recognize(&mut self, url: &str) -> Vec<RecognizedRoute<H>> {
        #[cfg(feature = "cache")]
        if let Some(results) = self.cache.get(url) {
            return results;
        }

        let results = self.recognize_uncached(url);

        #[cfg(feature = "cache")]
        self.cache.insert(url.to_string(), results.clone());

        results
    }

    fn recognize_uncached(&self, url: &str) -> Vec<RecognizedRoute<H>> {
        let (path, query) = split_url(url.trim_start_matches('#'));
        let query_params = query.map(QueryParams::from_query_string).unwrap_or_default();
        let path_segments: Vec<&str> = trim_slashes(path)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let mut matched: Vec<(&RouteEntry<H>, RouteParams)> = self
            .routes
            .iter()
            .filter_map(|entry| {
                let mut params = RouteParams::new();
                match_segments(&entry.segments, &path_segments, entry.case_sensitive, &mut params)
                    .then_some((entry, params))
            })
            .collect();

        matched.sort_by(|(a, _), (b, _)| a.shape.specificity(&b.shape));
        debug_log!("Recognized '{}': {} candidate(s)", url, matched.len());

        matched
            .into_iter()
            .map(|(entry, params)| RecognizedRoute {
                handler: entry.handler.clone(),
                params,
                query_params: query_params.clone(),
                is_dynamic: entry.shape.is_dynamic(),
            })
            .collect()
    }

    /// Build a path for the route registered under `name`.
    ///
    /// Parameters not consumed by the pattern are appended as a query string.
    pub fn generate(&self, name: &str, params: &RouteParams) -> Result<String> {
        let index = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| RouterError::NamedRouteNotFound {
                name: name.to_string(),
            })?;
        self.generate_at(index, name, params)
    }

    /// Build a path for the first pattern whose handler satisfies `matches`.
    ///
    /// Returns `None` when no handler matches.
    pub fn generate_where(
        &self,
        matches: impl Fn(&H) -> bool,
        params: &RouteParams,
    ) -> Option<Result<String>> {
        let index = self.routes.iter().position(|entry| matches(&entry.handler))?;
        let label = self.routes[index]
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(text) => text.clone(),
                Segment::Dynamic { name, .. } => format!(":{name}"),
                Segment::Star(name) => format!("*{name}"),
            })
            .collect::<Vec<_>>()
            .join("/");
        Some(self.generate_at(index, &label, params))
    }

    fn generate_at(&self, index: usize, name: &str, params: &RouteParams) -> Result<String> {
        let mut consumed = Vec::new();
        let mut parts = Vec::new();
        for segment in &self.routes[index].segments {
            match segment {
                Segment::Static(text) => parts.push(text.clone()),
                Segment::Dynamic {
                    name: param,
                    optional,
                } => match params.get(param) {
                    Some(value) => {
                        parts.push(encode_uri_component(value));
                        consumed.push(param.as_str());
                    }
                    None if *optional => {}
                    None => {
                        return Err(RouterError::MissingRouteParam {
                            name: name.to_string(),
                            param: param.clone(),
                        })
                    }
                },
                Segment::Star(param) => {
                    if let Some(value) = params.get(param) {
                        let value = trim_slashes(value);
                        if !value.is_empty() {
                            parts.push(value.to_string());
                        }
                    }
                    consumed.push(param.as_str());
                }
            }
        }

        let mut path = format!("/{}", parts.join("/"));
        let mut query = QueryParams::new();
        for (key, value) in params.iter().filter(|(key, _)| !consumed.contains(key)) {
            query.insert(key, value);
        }
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.to_query_string());
        }
        Ok(path)
    }

    /// Statistics of the recognition cache.
    #[cfg(feature = "cache")]
    pub const fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }
}

impl<H: Clone> Default for RouteRecognizer<H> {
    fn default() -> Self {
        Self::new()
    }
}

fn segment_eq(pattern: &str, actual: &str, case_sensitive: bool) -> bool {
    let actual = decode_path_segment(actual);
    if case_sensitive {
        pattern == actual
    } else {
        pattern.to_lowercase() == actual.to_lowercase()
    }
}

/// Backtracking matcher over pattern and path segments.
fn match_segments(
    pattern: &[Segment],
    path: &[&str],
    case_sensitive: bool,
    params: &mut RouteParams,
) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return path.is_empty();
    };

    match head {
        Segment::Static(text) => match path.split_first() {
            Some((first, tail)) if segment_eq(text, first, case_sensitive) => {
                match_segments(rest, tail, case_sensitive, params)
            }
            _ => false,
        },
        Segment::Dynamic { name, optional } => {
            if let Some((first, tail)) = path.split_first() {
                params.set(name.clone(), decode_path_segment(first));
                if match_segments(rest, tail, case_sensitive, params) {
                    return true;
                }
                params.remove(name);
            }
            *optional && match_segments(rest, path, case_sensitive, params)
        }
        Segment::Star(name) => {
            for taken in (0..=path.len()).rev() {
                let value = path[..taken]
                    .iter()
                    .map(|s| decode_path_segment(s))
                    .collect::<Vec<_>>()
                    .join("/");
                params.set(name.clone(), value);
                if match_segments(rest, &path[taken..], case_sensitive, params) {
                    return true;
                }
            }
            params.remove(name);
            false
        }
    }
}
