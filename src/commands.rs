//! Navigation commands.
//!
//! A hook or step that answers with a [`NavigationCommand`] takes over the
//! navigation in progress: the pipeline is canceled and the queue runs the
//! command instead of committing.
//!
//! ```
//! use navigator_pipeline::{NavigationCommand, RouteParams};
//!
//! let redirect = NavigationCommand::redirect("/login");
//! assert!(!redirect.should_continue_processing());
//!
//! let to_route = NavigationCommand::redirect_to_route(
//!     "user",
//!     RouteParams::from_pairs([("id", "42")]),
//! );
//! assert!(matches!(to_route, NavigationCommand::RedirectToRoute { .. }));
//! ```

use crate::app_router::AppRouter;
use crate::error::Result;
use crate::params::RouteParams;
use crate::router::Router;
use crate::debug_log;

/// Options of a single navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    /// Run the pipeline for the new location.
    pub trigger: bool,
    /// Replace the current history entry instead of pushing one.
    pub replace: bool,
    /// Resolve against the root router instead of the issuing router.
    pub use_app_router: bool,
    /// Generate absolute URLs for named routes.
    pub absolute: bool,
}

impl NavigationOptions {
    pub const fn new() -> Self {
        Self {
            trigger: true,
            replace: false,
            use_app_router: false,
            absolute: false,
        }
    }

    /// Options commands use unless told otherwise.
    pub const fn redirect() -> Self {
        Self {
            trigger: true,
            replace: true,
            use_app_router: false,
            absolute: false,
        }
    }

    pub const fn trigger(mut self, trigger: bool) -> Self {
        self.trigger = trigger;
        self
    }

    pub const fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub const fn use_app_router(mut self, use_app_router: bool) -> Self {
        self.use_app_router = use_app_router;
        self
    }

    pub const fn absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Navigation that replaces the one in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationCommand {
    /// Navigate to a URL.
    Redirect {
        url: String,
        options: NavigationOptions,
        should_continue_processing: bool,
        router: Option<Router>,
    },
    /// Navigate to a named route.
    RedirectToRoute {
        name: String,
        params: RouteParams,
        options: NavigationOptions,
        should_continue_processing: bool,
        router: Option<Router>,
    },
}

impl NavigationCommand {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect {
            url: url.into(),
            options: NavigationOptions::redirect(),
            should_continue_processing: false,
            router: None,
        }
    }

    pub fn redirect_to_route(name: impl Into<String>, params: RouteParams) -> Self {
        Self::RedirectToRoute {
            name: name.into(),
            params,
            options: NavigationOptions::redirect(),
            should_continue_processing: false,
            router: None,
        }
    }

    pub fn with_options(mut self, new_options: NavigationOptions) -> Self {
        match &mut self {
            Self::Redirect { options, .. } | Self::RedirectToRoute { options, .. } => {
                *options = new_options;
            }
        }
        self
    }

    /// Let the pipeline continue after the command was observed.
    pub fn continue_processing(mut self, value: bool) -> Self {
        match &mut self {
            Self::Redirect {
                should_continue_processing,
                ..
            }
            | Self::RedirectToRoute {
                should_continue_processing,
                ..
            } => *should_continue_processing = value,
        }
        self
    }

    pub const fn should_continue_processing(&self) -> bool {
        match self {
            Self::Redirect {
                should_continue_processing,
                ..
            }
            | Self::RedirectToRoute {
                should_continue_processing,
                ..
            } => *should_continue_processing,
        }
    }

    pub const fn options(&self) -> &NavigationOptions {
        match self {
            Self::Redirect { options, .. } | Self::RedirectToRoute { options, .. } => options,
        }
    }

    /// Router the command resolves against.
    pub const fn router(&self) -> Option<&Router> {
        match self {
            Self::Redirect { router, .. } | Self::RedirectToRoute { router, .. } => {
                router.as_ref()
            }
        }
    }

    pub fn set_router(&mut self, new_router: Router) {
        match self {
            Self::Redirect { router, .. } | Self::RedirectToRoute { router, .. } => {
                *router = Some(new_router);
            }
        }
    }

    fn target_router(&self, app: &AppRouter) -> Router {
        match self.router() {
            Some(router) if !self.options().use_app_router => router.clone(),
            _ => app.router().clone(),
        }
    }

    /// Update history and queue the new navigation without waiting for it.
    pub(crate) async fn navigate(&self, app: &AppRouter) -> Result<()> {
        let router = self.target_router(app);
        match self {
            Self::Redirect { url, options, .. } => {
                debug_log!("Redirecting to '{}'", url);
                router.dispatch(url, *options).await
            }
            Self::RedirectToRoute {
                name,
                params,
                options,
                ..
            } => {
                let url = router.generate(name, params, options.absolute)?;
                debug_log!("Redirecting to route '{}' at '{}'", name, url);
                router.dispatch(&url, *options).await
            }
        }
    }
}
