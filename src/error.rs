//! Error handling for the router.
//!
//! Every fallible operation in the crate returns [`RouterError`]. Most of them
//! never reach the caller of [`AppRouter::load_url`](crate::AppRouter::load_url):
//! hook and step failures are folded into a
//! [`PipelineResult`](crate::PipelineResult) instead. The variants that do
//! surface are:
//!
//! - [`RouteNotFound`](RouterError::RouteNotFound): no pattern and no
//!   unknown-route handler matched the URL.
//! - [`MaxAttemptsExceeded`](RouterError::MaxAttemptsExceeded): the
//!   redirect/retry budget of the navigation queue was blown.
//! - [`InvalidRouteConfig`](RouterError::InvalidRouteConfig): raised
//!   synchronously while registering routes.
//!
//! # Examples
//!
//! ```
//! use navigator_pipeline::RouterError;
//!
//! let error = RouterError::RouteNotFound { url: "/missing".into() };
//! assert_eq!(error.to_string(), "Route not found: /missing");
//! assert!(error.is_not_found());
//! ```

use thiserror::Error;

/// Detailed error variants that can occur while configuring or navigating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No registered pattern nor catch-all handler matched the URL.
    #[error("Route not found: {url}")]
    RouteNotFound { url: String },

    /// Reverse URL generation for a name nobody registered.
    #[error("A route with name '{name}' could not be found")]
    NamedRouteNotFound { name: String },

    /// Reverse URL generation without a value for a required segment.
    #[error("A value is required for route parameter '{param}' in route '{name}'")]
    MissingRouteParam { name: String, param: String },

    /// Structurally invalid route configuration.
    #[error("Invalid route config for \"{route}\": {reason}")]
    InvalidRouteConfig { route: String, reason: String },

    /// A view-port instruction references a view port that is not rendered.
    #[error("There was no view port named '{name}' found for {module_id}")]
    MissingViewPort { name: String, module_id: String },

    /// A previously active view port has no counterpart in the next config.
    #[error("Route config has no configuration for view port '{name}'")]
    ViewPortConfigMismatch { name: String },

    /// A user lifecycle hook failed.
    #[error("Lifecycle hook failed: {message}")]
    LifecycleHook { message: String },

    /// The route loader could not produce a component.
    #[error("Failed to load '{module_id}': {message}")]
    RouteLoad { module_id: String, message: String },

    /// Too many redirects or retries for a single navigation.
    #[error("Maximum navigation attempts exceeded ({attempts}). Giving up.")]
    MaxAttemptsExceeded { attempts: usize },

    /// `add_pipeline_step` with a slot name that does not exist.
    #[error("Invalid pipeline slot name: {name}")]
    InvalidPipelineSlot { name: String },

    /// Pipeline steps were configured on a child router.
    #[error("Pipeline steps can only be added to the root router")]
    PipelineStepsOnChildRouter,

    /// The unknown-route handler produced something unusable.
    #[error("Invalid unknown route handler")]
    InvalidUnknownRouteHandler,

    /// A router outlived the application router it belonged to.
    #[error("Router is no longer attached to an application router")]
    Detached,
}

impl RouterError {
    /// Build a [`LifecycleHook`](Self::LifecycleHook) error from anything printable.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::LifecycleHook {
            message: message.into(),
        }
    }

    /// Build an [`InvalidRouteConfig`](Self::InvalidRouteConfig) error.
    pub fn invalid_config(route: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRouteConfig {
            route: route.into(),
            reason: reason.into(),
        }
    }

    /// True for both URL and named-route lookup failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RouteNotFound { .. } | Self::NamedRouteNotFound { .. }
        )
    }
}

/// Crate-wide result alias.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_display() {
        let error = RouterError::RouteNotFound {
            url: "/test".to_string(),
        };
        assert_eq!(error.to_string(), "Route not found: /test");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_named_route_counts_as_not_found() {
        let error = RouterError::NamedRouteNotFound {
            name: "user".to_string(),
        };
        assert!(error.is_not_found());
        assert!(error.to_string().contains("'user'"));
    }

    #[test]
    fn test_invalid_config_display() {
        let error = RouterError::invalid_config("users/:id", "missing target");
        assert_eq!(
            error.to_string(),
            "Invalid route config for \"users/:id\": missing target"
        );
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_hook_error() {
        assert_eq!(
            RouterError::hook("boom"),
            RouterError::LifecycleHook {
                message: "boom".to_string()
            }
        );
    }
}
