//! Routers.
//!
//! A [`Router`] owns one route table and the view ports of one nesting
//! level. The root router belongs to an [`AppRouter`]; every component that
//! configures itself as a router host gets a child router created through
//! [`Router::create_child`], linked weakly to its parent.
//!
//! Routers are cheap handles: clones share state, and two handles compare
//! equal when they point at the same router.
//!
//! # Route tables
//!
//! Each route is registered twice: as given, and (for non-empty patterns)
//! with `/*childRoute` appended in a second table. URLs are matched against
//! the first table and fall back to the second, which is how a route hands
//! the rest of the URL to the child router of the component it shows.

use crate::app_router::{AppInner, AppRouter};
use crate::commands::NavigationOptions;
use crate::config::{
    NavOrder, RouteConfig, RouterConfiguration, RouterOptions, UnknownRouteHandler,
    ViewPortConfig,
};
use crate::error::{Result, RouterError};
use crate::hooks::NavigationStrategy;
use crate::instruction::{InstructionId, InstructionRef, NavigationInstruction, NavigationTree};
use crate::nav_model::NavModel;
use crate::params::{QueryParams, RouteParams};
use crate::pipeline::PipelineResult;
use crate::recognizer::{RecognizedRoute, RouteRecognizer};
use crate::url::{create_rooted_path, normalize_absolute_path, resolve_url, split_url};
use crate::viewport::ViewPort;
use crate::{debug_log, info_log, trace_log};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

const DEFAULT_TITLE_SEPARATOR: &str = " | ";
const FALLBACK_ORDER_START: i32 = 100;
const CHILD_ROUTE_SUFFIX: &str = "/*childRoute";

struct RouterState {
    routes: Vec<Arc<RouteConfig>>,
    navigation: Vec<NavModel>,
    base_url: String,
    title: Option<String>,
    title_separator: String,
    fallback_route: Option<String>,
    options: RouterOptions,
    view_port_defaults: BTreeMap<String, ViewPortConfig>,
    view_ports: BTreeMap<String, Arc<dyn ViewPort>>,
    unknown_route_handler: Option<UnknownRouteHandler>,
    current: Option<(Weak<NavigationTree>, InstructionId)>,
    fallback_order: i32,
    is_configured: bool,
}

impl RouterState {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            navigation: Vec::new(),
            base_url: String::new(),
            title: None,
            title_separator: DEFAULT_TITLE_SEPARATOR.to_string(),
            fallback_route: None,
            options: RouterOptions::default(),
            view_port_defaults: BTreeMap::new(),
            view_ports: BTreeMap::new(),
            unknown_route_handler: None,
            current: None,
            fallback_order: FALLBACK_ORDER_START,
            is_configured: false,
        }
    }
}

pub(crate) struct RouterInner {
    app: Weak<AppInner>,
    parent: Option<Weak<RouterInner>>,
    recognizer: Mutex<RouteRecognizer<Arc<RouteConfig>>>,
    child_recognizer: Mutex<RouteRecognizer<Arc<RouteConfig>>>,
    state: RwLock<RouterState>,
}

/// Handle to one router level.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    fn with_parent(app: Weak<AppInner>, parent: Option<Weak<RouterInner>>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                app,
                parent,
                recognizer: Mutex::new(RouteRecognizer::new()),
                child_recognizer: Mutex::new(RouteRecognizer::new()),
                state: RwLock::new(RouterState::new()),
            }),
        }
    }

    pub(crate) fn root(app: Weak<AppInner>) -> Self {
        Self::with_parent(app, None)
    }

    /// New router one level below this one.
    pub fn create_child(&self) -> Router {
        Self::with_parent(self.inner.app.clone(), Some(Arc::downgrade(&self.inner)))
    }

    /// The application router this router belongs to.
    pub fn app(&self) -> Result<AppRouter> {
        self.inner
            .app
            .upgrade()
            .map(AppRouter::from_inner)
            .ok_or(RouterError::Detached)
    }

    pub fn parent(&self) -> Option<Router> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Router { inner })
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    pub fn is_configured(&self) -> bool {
        self.inner.state.read().is_configured
    }

    /// `true` if both handles point at the same router.
    pub fn ptr_eq(&self, other: &Router) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Apply a configuration.
    ///
    /// Routes are validated and registered in order; the first invalid one
    /// aborts with the routes before it already registered. Pipeline steps
    /// are only accepted by the root router.
    pub fn configure(&self, configuration: RouterConfiguration) -> Result<()> {
        let RouterConfiguration {
            routes,
            unknown_route_handler,
            pipeline_steps,
            title,
            title_separator,
            fallback_route,
            options,
            view_port_defaults,
        } = configuration;

        if !pipeline_steps.is_empty() {
            if !self.is_root() {
                return Err(RouterError::PipelineStepsOnChildRouter);
            }
            let app = self.app()?;
            for (slot, step) in pipeline_steps {
                app.pipeline_provider().add_step(&slot, step)?;
            }
        }

        {
            let mut state = self.inner.state.write();
            if title.is_some() {
                state.title = title;
            }
            if let Some(separator) = title_separator {
                state.title_separator = separator;
            }
            if fallback_route.is_some() {
                state.fallback_route = fallback_route;
            }
            if let Some(options) = options {
                state.options = options;
            }
            state.view_port_defaults.extend(view_port_defaults);
            if unknown_route_handler.is_some() {
                state.unknown_route_handler = unknown_route_handler;
            }
        }

        for route in routes {
            self.add_route(route)?;
        }

        self.inner.state.write().is_configured = true;
        debug_log!(
            "Router configured with {} route(s)",
            self.inner.state.read().routes.len()
        );
        Ok(())
    }

    /// Register one route. Routes with several patterns are registered once
    /// per pattern and share one nav model.
    pub fn add_route(&self, mut config: RouteConfig) -> Result<()> {
        config.validate()?;
        if config.navigation_strategy.is_none() {
            config.ensure_view_ports();
        }

        let relative_href = config.route().trim_start_matches('/').to_string();
        let nav_model = NavModel::new(
            relative_href,
            config.href.clone(),
            config.title.clone(),
            config.settings.clone(),
            config.name.clone(),
        );

        let patterns = std::mem::take(&mut config.routes);
        for pattern in patterns {
            let mut copy = config.clone();
            copy.routes = vec![pattern];
            self.register(copy, nav_model.clone())?;
        }
        Ok(())
    }

    fn register(&self, mut config: RouteConfig, nav_model: NavModel) -> Result<()> {
        let path = config.route().trim_start_matches('/').to_string();
        config.routes = vec![path.clone()];
        config.nav_model = Some(nav_model.clone());
        let case_sensitive = config.case_sensitive;
        let name = config.name.clone();
        let nav = config.nav;
        let has_href = config.href.is_some();

        let config = Arc::new(config);
        let shape = {
            let mut recognizer = self.inner.recognizer.lock();
            match &name {
                Some(name) => {
                    recognizer.add_named(name, &path, Arc::clone(&config), case_sensitive)
                }
                None => recognizer.add(&path, Arc::clone(&config), case_sensitive),
            }
        };

        if !path.is_empty() {
            let mut with_child = (*config).clone();
            let child_path = format!("{path}{CHILD_ROUTE_SUFFIX}");
            with_child.routes = vec![child_path.clone()];
            with_child.has_child_router = true;
            let with_child = Arc::new(with_child);
            let mut recognizer = self.inner.child_recognizer.lock();
            match &name {
                Some(name) => recognizer.add_named(name, &child_path, with_child, case_sensitive),
                None => recognizer.add(&child_path, with_child, case_sensitive),
            };
        }

        let mut state = self.inner.state.write();
        state.routes.push(Arc::clone(&config));
        info_log!("Registered route '{}'", path);

        let Some(order) = nav else {
            return Ok(());
        };
        if state.navigation.iter().any(|model| model.ptr_eq(&nav_model)) {
            return Ok(());
        }
        if !has_href && shape.is_dynamic() {
            return Err(RouterError::invalid_config(
                path,
                "dynamic routes must specify an \"href:\" to be included in the navigation model.",
            ));
        }
        let order = match order {
            NavOrder::Order(order) => order,
            NavOrder::Auto => {
                state.fallback_order += 1;
                state.fallback_order
            }
        };
        nav_model.set_order(order);
        state.navigation.push(nav_model);
        state
            .navigation
            .sort_by_key(|model| model.order().unwrap_or(i32::MAX));
        Ok(())
    }

    /// Forget every route, nav model and handler.
    pub fn reset(&self) {
        *self.inner.recognizer.lock() = RouteRecognizer::new();
        *self.inner.child_recognizer.lock() = RouteRecognizer::new();
        {
            let mut state = self.inner.state.write();
            let view_ports = std::mem::take(&mut state.view_ports);
            *state = RouterState::new();
            state.view_ports = view_ports;
        }
        if self.is_root() {
            if let Ok(app) = self.app() {
                app.pipeline_provider().reset();
            }
        }
    }

    /// `true` if a route is registered under `name`.
    pub fn has_route(&self, name: &str) -> bool {
        self.inner.recognizer.lock().has_route(name)
    }

    /// `true` if this router or one of its ancestors knows `name`.
    pub fn has_own_or_parent_route(&self, name: &str) -> bool {
        self.has_route(name) || self.parent().is_some_and(|parent| parent.has_own_or_parent_route(name))
    }

    /// Registered route copies, one per pattern.
    pub fn routes(&self) -> Vec<Arc<RouteConfig>> {
        self.inner.state.read().routes.clone()
    }

    /// Nav models of routes registered with `nav`, ordered.
    pub fn navigation(&self) -> Vec<NavModel> {
        self.inner.state.read().navigation.clone()
    }

    pub fn options(&self) -> RouterOptions {
        self.inner.state.read().options.clone()
    }

    pub fn base_url(&self) -> String {
        self.inner.state.read().base_url.clone()
    }

    pub(crate) fn set_base_url(&self, base_url: String) {
        self.inner.state.write().base_url = base_url;
    }

    pub fn title(&self) -> Option<String> {
        self.inner.state.read().title.clone()
    }

    pub fn title_separator(&self) -> String {
        self.inner.state.read().title_separator.clone()
    }

    pub fn fallback_route(&self) -> Option<String> {
        self.inner.state.read().fallback_route.clone()
    }

    pub fn view_port_defaults(&self) -> BTreeMap<String, ViewPortConfig> {
        self.inner.state.read().view_port_defaults.clone()
    }

    /// Apply the root router's title transform.
    pub fn transform_title(&self, title: &str) -> String {
        let mut root = self.clone();
        while let Some(parent) = root.parent() {
            root = parent;
        }
        match root.options().transform_title {
            Some(transform) => transform(title),
            None => title.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // View ports
    // ------------------------------------------------------------------

    /// Attach the mount point called `name`.
    pub fn register_view_port(&self, name: impl Into<String>, view_port: Arc<dyn ViewPort>) {
        let name = name.into();
        trace_log!("Registering view port '{}'", name);
        self.inner.state.write().view_ports.insert(name, view_port);
    }

    pub fn view_port(&self, name: &str) -> Option<Arc<dyn ViewPort>> {
        self.inner.state.read().view_ports.get(name).cloned()
    }

    // ------------------------------------------------------------------
    // Current instruction
    // ------------------------------------------------------------------

    /// The last committed instruction of this router.
    pub fn current_instruction(&self) -> Option<InstructionRef> {
        let state = self.inner.state.read();
        let (tree, id) = state.current.as_ref()?;
        tree.upgrade().map(|tree| InstructionRef::new(tree, *id))
    }

    pub(crate) fn set_current_instruction(&self, tree: &Arc<NavigationTree>, id: InstructionId) {
        self.inner.state.write().current = Some((Arc::downgrade(tree), id));
    }

    /// Recompute the absolute hrefs of the nav models.
    pub fn refresh_navigation(&self) {
        let push_state = self.has_push_state();
        let state = self.inner.state.read();
        for model in &state.navigation {
            let href = match model.config_href() {
                Some(href) => normalize_absolute_path(&href, push_state, false),
                None => create_rooted_path(&model.relative_href(), &state.base_url, push_state, false),
            };
            model.set_href(href);
        }
    }

    pub fn has_push_state(&self) -> bool {
        self.app()
            .map(|app| app.history().has_push_state())
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Recognition and generation
    // ------------------------------------------------------------------

    /// Best match for `url`: the route table first, then the child-route
    /// table.
    pub fn recognize(&self, url: &str) -> Option<RecognizedRoute<Arc<RouteConfig>>> {
        let first = self.inner.recognizer.lock().recognize(url).into_iter().next();
        first.or_else(|| {
            self.inner
                .child_recognizer
                .lock()
                .recognize(url)
                .into_iter()
                .next()
        })
    }

    /// Path for a registered config, without base URL.
    pub(crate) fn generate_for_config(
        &self,
        config: &Arc<RouteConfig>,
        params: &RouteParams,
    ) -> Result<String> {
        let matches = |handler: &Arc<RouteConfig>| Arc::ptr_eq(handler, config);
        if let Some(path) = self.inner.recognizer.lock().generate_where(matches, params) {
            return path;
        }
        if let Some(path) = self
            .inner
            .child_recognizer
            .lock()
            .generate_where(matches, params)
        {
            return path;
        }
        Err(RouterError::RouteNotFound {
            url: config.route().to_string(),
        })
    }

    /// URL of the route called `name`, rooted at this router's base URL.
    ///
    /// Names unknown to an unconfigured router or to this router are looked
    /// up in the parent.
    pub fn generate(&self, name: &str, params: &RouteParams, absolute: bool) -> Result<String> {
        let has_route = self.has_route(name);
        if !self.is_configured() || !has_route {
            if let Some(parent) = self.parent() {
                return parent.generate(name, params, absolute);
            }
        }
        if !has_route {
            return Err(RouterError::NamedRouteNotFound {
                name: name.to_string(),
            });
        }

        let path = self.inner.recognizer.lock().generate(name, params)?;
        Ok(create_rooted_path(
            &path,
            &self.base_url(),
            self.has_push_state(),
            absolute,
        ))
    }

    /// Route with `name` that has a non-empty pattern.
    pub(crate) fn non_empty_route_named(&self, name: Option<&str>) -> Option<String> {
        let name = name?;
        self.inner
            .state
            .read()
            .routes
            .iter()
            .find(|route| route.name.as_deref() == Some(name) && !route.route().is_empty())
            .map(|route| route.route().to_string())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn navigation_target(&self) -> Router {
        let mut router = self.clone();
        while !router.is_configured() {
            match router.parent() {
                Some(parent) => router = parent,
                None => break,
            }
        }
        router
    }

    /// Navigate to `fragment`, relative to this router's base URL unless it
    /// is rooted.
    ///
    /// Returns the pipeline result, or `None` when no navigation ran (the
    /// history did not change or `trigger` is off).
    pub async fn navigate(
        &self,
        fragment: &str,
        options: NavigationOptions,
    ) -> Result<Option<PipelineResult>> {
        let router = self.navigation_target();
        let app = router.app()?;
        let history = app.history();
        let url = resolve_url(fragment, &router.base_url(), history.has_push_state());
        debug_log!("Navigating to '{}'", url);
        if !history.navigate(&url, &options) || !options.trigger {
            return Ok(None);
        }
        app.load_url(&url).await.map(Some)
    }

    /// Navigate to the route called `name`.
    pub async fn navigate_to_route(
        &self,
        name: &str,
        params: &RouteParams,
        options: NavigationOptions,
    ) -> Result<Option<PipelineResult>> {
        let path = self.generate(name, params, options.absolute)?;
        self.navigate(&path, options).await
    }

    /// Step back in history and load the location now current.
    pub async fn navigate_back(&self) -> Result<Option<PipelineResult>> {
        let app = self.app()?;
        match app.history().navigate_back() {
            Some(fragment) => app.load_url(&fragment).await.map(Some),
            None => Ok(None),
        }
    }

    /// Update history and queue a navigation without waiting for it.
    pub(crate) async fn dispatch(&self, fragment: &str, options: NavigationOptions) -> Result<()> {
        let router = self.navigation_target();
        let app = router.app()?;
        let history = app.history();
        let url = resolve_url(fragment, &router.base_url(), history.has_push_state());
        if history.navigate(&url, &options) && options.trigger {
            app.queue_url(&url).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Instruction creation
    // ------------------------------------------------------------------

    /// Tree with the root instruction for `url`.
    pub(crate) async fn create_root_tree(&self, url: &str) -> Result<NavigationTree> {
        let instruction = self.build_instruction(url, None).await?;
        Ok(NavigationTree::new(instruction))
    }

    /// Add the instruction of this (child) router for `url` below `parent`.
    pub(crate) async fn create_instruction(
        &self,
        tree: &mut NavigationTree,
        url: &str,
        parent: Option<InstructionId>,
    ) -> Result<InstructionId> {
        let mut instruction = self.build_instruction(url, parent).await?;
        instruction.previous = self.previous_in(tree);
        Ok(tree.push(instruction))
    }

    /// This router's current instruction, if it belongs to the tree `tree`
    /// replaces.
    fn previous_in(&self, tree: &NavigationTree) -> Option<InstructionId> {
        let previous_tree = tree.previous_tree()?;
        let state = self.inner.state.read();
        let (current, id) = state.current.as_ref()?;
        let current = current.upgrade()?;
        Arc::ptr_eq(&current, previous_tree).then_some(*id)
    }

    async fn build_instruction(
        &self,
        url: &str,
        parent: Option<InstructionId>,
    ) -> Result<NavigationInstruction> {
        let (path, query) = split_url(url);
        let fragment = path.to_string();
        let query_string = query.unwrap_or_default().to_string();

        if let Some(recognized) = self.recognize(url) {
            let RecognizedRoute {
                handler,
                params,
                query_params,
                ..
            } = recognized;
            let strategy = handler.navigation_strategy.clone();
            let instruction = NavigationInstruction::new(
                self.clone(),
                fragment,
                query_string,
                params,
                query_params,
                handler,
                parent,
            );
            debug_log!("Created instruction for '{}'", instruction.fragment);
            return match strategy {
                Some(strategy) => evaluate_navigation_strategy(instruction, strategy.as_ref()).await,
                None => Ok(instruction),
            };
        }

        let handler = self.inner.state.read().unknown_route_handler.clone();
        let Some(handler) = handler else {
            return Err(RouterError::RouteNotFound { url: fragment });
        };

        debug_log!("No route matched '{}': using the unknown route handler", fragment);
        let params = RouteParams::from_pairs([("path", fragment.as_str())]);
        let query_params = QueryParams::from_query_string(&query_string);
        let placeholder = Arc::new(RouteConfig::new(fragment.clone()));
        let mut instruction = NavigationInstruction::new(
            self.clone(),
            fragment.clone(),
            query_string,
            params,
            query_params,
            placeholder,
            parent,
        );

        let mut config = match handler {
            UnknownRouteHandler::ModuleId(module_id) => {
                RouteConfig::new(fragment.clone()).module_id(module_id)
            }
            UnknownRouteHandler::Config(config) => *config,
            UnknownRouteHandler::Strategy(strategy) => strategy
                .resolve(&instruction)
                .settle()
                .await?
                .ok_or(RouterError::InvalidUnknownRouteHandler)?,
        };
        config.routes = vec![fragment.clone()];
        config.validate()?;
        config.navigation_strategy = None;
        config.ensure_view_ports();
        config.nav_model = Some(NavModel::new(
            fragment,
            config.href.clone(),
            config.title.clone(),
            config.settings.clone(),
            config.name.clone(),
        ));
        instruction.config = Arc::new(config);
        Ok(instruction)
    }
}

async fn evaluate_navigation_strategy(
    mut instruction: NavigationInstruction,
    strategy: &dyn NavigationStrategy,
) -> Result<NavigationInstruction> {
    let original = Arc::clone(&instruction.config);
    let mut config = strategy.resolve(&instruction).settle().await?.ok_or_else(|| {
        RouterError::invalid_config(original.route(), "navigation strategy produced no config")
    })?;

    config.routes = original.routes.clone();
    if config.name.is_none() {
        config.name = original.name.clone();
    }
    if config.nav_model.is_none() {
        config.nav_model = original.nav_model.clone();
    }
    config.has_child_router = original.has_child_router;
    config.navigation_strategy = None;
    config.validate()?;
    config.ensure_view_ports();

    trace_log!("Navigation strategy resolved '{}'", original.route());
    instruction.config = Arc::new(config);
    Ok(instruction)
}

impl PartialEq for Router {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Router")
            .field("is_root", &self.inner.parent.is_none())
            .field("base_url", &state.base_url)
            .field("routes", &state.routes.len())
            .field("is_configured", &state.is_configured)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActivationStrategy;

    fn detached() -> Router {
        Router::root(Weak::new())
    }

    #[test]
    fn test_multi_pattern_routes_share_nav_model() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(
            RouteConfig::with_routes(["", "home"])
                .name("home")
                .module_id("home")
                .nav(true),
        );
        router.configure(config).unwrap();

        let routes = router.routes();
        assert_eq!(routes.len(), 2);
        let first = routes[0].nav_model().unwrap();
        let second = routes[1].nav_model().unwrap();
        assert!(first.ptr_eq(second));
        assert_eq!(router.navigation().len(), 1);
        assert_eq!(router.navigation()[0].order(), Some(101));
    }

    #[test]
    fn test_recognize_falls_back_to_child_table() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("users/:id").module_id("users/detail"));
        router.configure(config).unwrap();

        let direct = router.recognize("users/42").unwrap();
        assert!(!direct.handler.has_child_router());

        let nested = router.recognize("users/42/posts/7").unwrap();
        assert!(nested.handler.has_child_router());
        assert_eq!(nested.params.get("childRoute"), Some("posts/7"));
        assert_eq!(nested.params.get("id"), Some("42"));
    }

    #[test]
    fn test_empty_route_has_no_child_copy() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("").module_id("home"));
        router.configure(config).unwrap();
        assert!(router.recognize("anything/else").is_none());
    }

    #[test]
    fn test_leading_slash_is_stripped() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("/about").name("about").module_id("about"));
        router.configure(config).unwrap();
        assert_eq!(router.routes()[0].route(), "about");
        assert_eq!(
            router.generate("about", &RouteParams::new(), false).unwrap(),
            "#/about"
        );
    }

    #[test]
    fn test_dynamic_nav_route_requires_href() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("users/:id").module_id("user").nav(true));
        let error = router.configure(config).unwrap_err();
        assert!(matches!(error, RouterError::InvalidRouteConfig { .. }));

        let mut config = RouterConfiguration::new();
        config.map(
            RouteConfig::new("users/:id")
                .module_id("user")
                .href("#/users/1")
                .nav(true),
        );
        router.configure(config).unwrap();
        assert_eq!(router.navigation().len(), 1);
    }

    #[test]
    fn test_nav_ordering() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config
            .map(RouteConfig::new("a").module_id("a").nav(true))
            .map(RouteConfig::new("b").module_id("b").nav_order(5))
            .map(RouteConfig::new("c").module_id("c").nav(true))
            .map(RouteConfig::new("d").module_id("d"));
        router.configure(config).unwrap();

        let orders: Vec<_> = router.navigation().iter().map(|m| m.order()).collect();
        assert_eq!(orders, vec![Some(5), Some(101), Some(102)]);
        let hrefs: Vec<_> = router
            .navigation()
            .iter()
            .map(|m| m.relative_href())
            .collect();
        assert_eq!(hrefs, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_refresh_navigation_roots_hrefs() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config
            .map(RouteConfig::new("users").module_id("users").nav(true))
            .map(
                RouteConfig::new("docs")
                    .module_id("docs")
                    .href("/manual")
                    .nav(true),
            );
        router.configure(config).unwrap();
        router.set_base_url("/admin".to_string());
        router.refresh_navigation();

        let hrefs: Vec<_> = router.navigation().iter().map(|m| m.href()).collect();
        assert_eq!(hrefs, vec!["#/admin/users", "#/manual"]);
    }

    #[test]
    fn test_invalid_route_rejected() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("broken"));
        assert!(matches!(
            router.configure(config),
            Err(RouterError::InvalidRouteConfig { .. })
        ));
    }

    #[test]
    fn test_child_generate_defers_to_parent() {
        let parent = detached();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("users/:id").name("user").module_id("user"));
        parent.configure(config).unwrap();

        let child = parent.create_child();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("posts").name("posts").module_id("posts"));
        child.configure(config).unwrap();
        child.set_base_url("/users/42/".to_string());

        let params = RouteParams::from_pairs([("id", "7")]);
        assert_eq!(child.generate("user", &params, false).unwrap(), "#/users/7");
        assert_eq!(
            child.generate("posts", &RouteParams::new(), false).unwrap(),
            "#/users/42/posts"
        );
        assert!(child.generate("nope", &params, false).unwrap_err().is_not_found());
        assert_eq!(child.parent(), Some(parent));
    }

    #[test]
    fn test_pipeline_steps_rejected_on_child() {
        let child = detached().create_child();
        let mut config = RouterConfiguration::new();
        config.add_authorize_step(crate::pipeline::step_fn(|_, next| Ok(next.proceed())));
        assert_eq!(child.configure(config), Err(RouterError::PipelineStepsOnChildRouter));
    }

    #[test]
    fn test_non_empty_route_named() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(
            RouteConfig::with_routes(["", "home"])
                .name("home")
                .module_id("home")
                .activation_strategy(ActivationStrategy::Replace),
        );
        router.configure(config).unwrap();
        assert_eq!(router.non_empty_route_named(Some("home")).as_deref(), Some("home"));
        assert_eq!(router.non_empty_route_named(None), None);
    }

    #[test]
    fn test_reset_forgets_routes() {
        let router = detached();
        let mut config = RouterConfiguration::new();
        config.map(RouteConfig::new("a").name("a").module_id("a").nav(true));
        router.configure(config).unwrap();
        router.reset();
        assert!(router.routes().is_empty());
        assert!(router.navigation().is_empty());
        assert!(!router.has_route("a"));
        assert!(!router.is_configured());
    }
}
