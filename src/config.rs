//! Route and router configuration.
//!
//! Routes are described with [`RouteConfig`] builders and handed to a router
//! through a [`RouterConfiguration`]:
//!
//! ```
//! use navigator_pipeline::{RouteConfig, RouterConfiguration};
//!
//! let mut config = RouterConfiguration::new();
//! config
//!     .title("Admin")
//!     .map(RouteConfig::with_routes(["", "home"]).name("home").module_id("home").nav(true))
//!     .map(RouteConfig::new("users/:id").name("user").module_id("users/detail"))
//!     .map(RouteConfig::new("old-users/:id").redirect("users/:id"))
//!     .map_unknown_routes("not-found");
//! ```
//!
//! A registered route must name exactly one target: a module id, a redirect,
//! a navigation strategy, or a set of view ports.

use crate::error::{Result, RouterError};
use crate::hooks::{HookResult, NavigationStrategy};
use crate::instruction::NavigationInstruction;
use crate::nav_model::NavModel;
use crate::pipeline::PipelineStep;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Name of the view port synthesized for routes that only give a module id.
pub const DEFAULT_VIEW_PORT: &str = "default";

/// How a view port moves from the previous navigation to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationStrategy {
    /// Keep the current component and skip every lifecycle hook.
    NoChange,
    /// Keep the current component but run its lifecycle hooks again.
    InvokeLifecycle,
    /// Load a fresh component into the view port.
    Replace,
}

impl ActivationStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoChange => "no-change",
            Self::InvokeLifecycle => "invoke-lifecycle",
            Self::Replace => "replace",
        }
    }

    /// `true` for strategies that run lifecycle hooks.
    pub const fn runs_lifecycle(self) -> bool {
        matches!(self, Self::InvokeLifecycle | Self::Replace)
    }
}

impl fmt::Display for ActivationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module to show in one named view port.
///
/// A config without a module id falls back to the router's view port
/// defaults (see [`RouterConfiguration::use_view_port_defaults`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewPortConfig {
    pub module_id: Option<String>,
}

impl ViewPortConfig {
    pub fn module(module_id: impl Into<String>) -> Self {
        Self {
            module_id: Some(module_id.into()),
        }
    }

    /// A placeholder resolved from the router's view port defaults.
    pub const fn empty() -> Self {
        Self { module_id: None }
    }
}

/// Position of a route in the navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOrder {
    /// Ordered after explicitly ordered entries, in registration order.
    Auto,
    Order(i32),
}

/// Definition of a route.
#[derive(Clone)]
pub struct RouteConfig {
    /// Patterns this route answers to. Registered copies carry exactly one.
    pub routes: Vec<String>,
    /// Name for reverse generation.
    pub name: Option<String>,
    pub module_id: Option<String>,
    pub redirect: Option<String>,
    pub navigation_strategy: Option<Arc<dyn NavigationStrategy>>,
    pub view_ports: BTreeMap<String, ViewPortConfig>,
    pub title: Option<String>,
    /// `None` keeps the route out of the navigation menu.
    pub nav: Option<NavOrder>,
    pub href: Option<String>,
    pub settings: Map<String, Value>,
    pub case_sensitive: bool,
    /// Fixed strategy used when the module id did not change.
    pub activation_strategy: Option<ActivationStrategy>,
    pub(crate) has_child_router: bool,
    pub(crate) nav_model: Option<NavModel>,
}

impl RouteConfig {
    /// Route answering to a single pattern.
    pub fn new(route: impl Into<String>) -> Self {
        Self::with_routes([route.into()])
    }

    /// Route answering to several patterns that share one nav model.
    pub fn with_routes<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(Into::into).collect(),
            name: None,
            module_id: None,
            redirect: None,
            navigation_strategy: None,
            view_ports: BTreeMap::new(),
            title: None,
            nav: None,
            href: None,
            settings: Map::new(),
            case_sensitive: false,
            activation_strategy: None,
            has_child_router: false,
            nav_model: None,
        }
    }

    /// The primary pattern.
    pub fn route(&self) -> &str {
        self.routes.first().map_or("", String::as_str)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn module_id(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn navigation_strategy<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&NavigationInstruction) -> HookResult<RouteConfig> + Send + Sync + 'static,
    {
        self.navigation_strategy = Some(Arc::new(strategy));
        self
    }

    pub fn view_port(mut self, name: impl Into<String>, config: ViewPortConfig) -> Self {
        self.view_ports.insert(name.into(), config);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Include (or exclude) the route in the navigation menu.
    pub fn nav(mut self, include: bool) -> Self {
        self.nav = include.then_some(NavOrder::Auto);
        self
    }

    /// Include the route in the navigation menu at a fixed position.
    pub fn nav_order(mut self, order: i32) -> Self {
        self.nav = Some(NavOrder::Order(order));
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn activation_strategy(mut self, strategy: ActivationStrategy) -> Self {
        self.activation_strategy = Some(strategy);
        self
    }

    /// Whether this copy was registered in the child-route table.
    pub const fn has_child_router(&self) -> bool {
        self.has_child_router
    }

    /// Nav model attached at registration.
    pub const fn nav_model(&self) -> Option<&NavModel> {
        self.nav_model.as_ref()
    }

    /// Parameter name of the trailing star segment (`childRoute` for the
    /// child-route table).
    pub fn wildcard_name(&self) -> &str {
        let route = self.route();
        route.rfind('*').map_or("", |index| &route[index + 1..])
    }

    /// Check the route has a pattern and exactly one target.
    pub fn validate(&self) -> Result<()> {
        if self.routes.is_empty() {
            let name = self.name.as_deref().unwrap_or("(no name)");
            return Err(RouterError::invalid_config(
                name,
                "You must specify a \"route:\" pattern.",
            ));
        }

        let targets = [
            self.module_id.is_some(),
            self.redirect.is_some(),
            self.navigation_strategy.is_some(),
            !self.view_ports.is_empty(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        match targets {
            0 => Err(RouterError::invalid_config(
                self.route(),
                "You must specify a \"moduleId:\", \"redirect:\", \"navigationStrategy:\", or \"viewPorts:\".",
            )),
            1 => Ok(()),
            _ => Err(RouterError::invalid_config(
                self.route(),
                "Only one of \"moduleId:\", \"redirect:\", \"navigationStrategy:\", or \"viewPorts:\" may be given.",
            )),
        }
    }

    /// Give module-id routes their implicit `default` view port.
    pub(crate) fn ensure_view_ports(&mut self) {
        if self.view_ports.is_empty()
            && self.redirect.is_none()
            && self.navigation_strategy.is_none()
        {
            self.view_ports.insert(
                DEFAULT_VIEW_PORT.to_string(),
                ViewPortConfig {
                    module_id: self.module_id.clone(),
                },
            );
        }
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("routes", &self.routes)
            .field("name", &self.name)
            .field("module_id", &self.module_id)
            .field("redirect", &self.redirect)
            .field("navigation_strategy", &self.navigation_strategy.is_some())
            .field("view_ports", &self.view_ports)
            .field("nav", &self.nav)
            .field("has_child_router", &self.has_child_router)
            .finish_non_exhaustive()
    }
}

/// What to do with URLs no route matches.
#[derive(Clone)]
pub enum UnknownRouteHandler {
    /// Show this module.
    ModuleId(String),
    /// Use this config (its pattern is replaced by the fragment).
    Config(Box<RouteConfig>),
    /// Compute the config per navigation.
    Strategy(Arc<dyn NavigationStrategy>),
}

impl UnknownRouteHandler {
    pub fn strategy<F>(strategy: F) -> Self
    where
        F: Fn(&NavigationInstruction) -> HookResult<RouteConfig> + Send + Sync + 'static,
    {
        Self::Strategy(Arc::new(strategy))
    }
}

impl From<&str> for UnknownRouteHandler {
    fn from(module_id: &str) -> Self {
        Self::ModuleId(module_id.to_string())
    }
}

impl From<String> for UnknownRouteHandler {
    fn from(module_id: String) -> Self {
        Self::ModuleId(module_id)
    }
}

impl From<RouteConfig> for UnknownRouteHandler {
    fn from(config: RouteConfig) -> Self {
        Self::Config(Box::new(config))
    }
}

impl fmt::Debug for UnknownRouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleId(id) => f.debug_tuple("ModuleId").field(id).finish(),
            Self::Config(config) => f.debug_tuple("Config").field(config).finish(),
            Self::Strategy(_) => f.write_str("Strategy(..)"),
        }
    }
}

/// Title transform applied at the root router.
pub type TitleTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Behavior switches of a router.
#[derive(Clone)]
pub struct RouterOptions {
    /// Treat query-string changes as parameter changes when planning.
    pub compare_query_params: bool,
    /// Pipeline runs allowed for one navigation, redirects included.
    pub max_instruction_count: usize,
    pub transform_title: Option<TitleTransform>,
}

impl RouterOptions {
    pub const DEFAULT_MAX_INSTRUCTION_COUNT: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn compare_query_params(mut self, compare: bool) -> Self {
        self.compare_query_params = compare;
        self
    }

    pub fn max_instruction_count(mut self, count: usize) -> Self {
        self.max_instruction_count = count;
        self
    }

    pub fn transform_title(
        mut self,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.transform_title = Some(Arc::new(transform));
        self
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            compare_query_params: false,
            max_instruction_count: Self::DEFAULT_MAX_INSTRUCTION_COUNT,
            transform_title: None,
        }
    }
}

impl fmt::Debug for RouterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterOptions")
            .field("compare_query_params", &self.compare_query_params)
            .field("max_instruction_count", &self.max_instruction_count)
            .field("transform_title", &self.transform_title.is_some())
            .finish()
    }
}

/// Everything a router is configured with.
///
/// Applied with [`Router::configure`](crate::Router::configure).
#[derive(Default)]
pub struct RouterConfiguration {
    pub(crate) routes: Vec<RouteConfig>,
    pub(crate) unknown_route_handler: Option<UnknownRouteHandler>,
    pub(crate) pipeline_steps: Vec<(String, Arc<dyn PipelineStep>)>,
    pub(crate) title: Option<String>,
    pub(crate) title_separator: Option<String>,
    pub(crate) fallback_route: Option<String>,
    pub(crate) options: Option<RouterOptions>,
    pub(crate) view_port_defaults: BTreeMap<String, ViewPortConfig>,
}

impl RouterConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&mut self, route: RouteConfig) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn map_routes(&mut self, routes: impl IntoIterator<Item = RouteConfig>) -> &mut Self {
        self.routes.extend(routes);
        self
    }

    pub fn map_unknown_routes(&mut self, handler: impl Into<UnknownRouteHandler>) -> &mut Self {
        self.unknown_route_handler = Some(handler.into());
        self
    }

    /// Add a step to a named slot: `authorize`, `preActivate` (`modelbind`),
    /// `preRender` (`precommit`) or `postRender` (`postcomplete`).
    ///
    /// Only the root router accepts pipeline steps.
    pub fn add_pipeline_step(
        &mut self,
        slot: impl Into<String>,
        step: impl PipelineStep + 'static,
    ) -> &mut Self {
        self.pipeline_steps.push((slot.into(), Arc::new(step)));
        self
    }

    pub fn add_authorize_step(&mut self, step: impl PipelineStep + 'static) -> &mut Self {
        self.add_pipeline_step("authorize", step)
    }

    pub fn add_pre_activate_step(&mut self, step: impl PipelineStep + 'static) -> &mut Self {
        self.add_pipeline_step("preActivate", step)
    }

    pub fn add_pre_render_step(&mut self, step: impl PipelineStep + 'static) -> &mut Self {
        self.add_pipeline_step("preRender", step)
    }

    pub fn add_post_render_step(&mut self, step: impl PipelineStep + 'static) -> &mut Self {
        self.add_pipeline_step("postRender", step)
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn title_separator(&mut self, separator: impl Into<String>) -> &mut Self {
        self.title_separator = Some(separator.into());
        self
    }

    /// Route navigated to when a failed navigation has no previous location.
    pub fn fallback_route(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.fallback_route = Some(fragment.into());
        self
    }

    pub fn options(&mut self, options: RouterOptions) -> &mut Self {
        self.options = Some(options);
        self
    }

    pub fn use_view_port_defaults(
        &mut self,
        defaults: impl IntoIterator<Item = (String, ViewPortConfig)>,
    ) -> &mut Self {
        self.view_port_defaults.extend(defaults);
        self
    }
}
