//! Navigation menu entries.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct NavModelState {
    title: Option<String>,
    order: Option<i32>,
    relative_href: String,
    config_href: Option<String>,
    href: String,
    is_active: bool,
    settings: Map<String, Value>,
    route_name: Option<String>,
}

/// Presentation view of a route: title, href, and whether it is active.
///
/// Shared by every pattern of a multi-pattern route. Cloning yields another
/// handle to the same entry.
#[derive(Clone)]
pub struct NavModel {
    state: Arc<RwLock<NavModelState>>,
}

impl NavModel {
    pub(crate) fn new(
        relative_href: impl Into<String>,
        config_href: Option<String>,
        title: Option<String>,
        settings: Map<String, Value>,
        route_name: Option<String>,
    ) -> Self {
        let relative_href = relative_href.into();
        Self {
            state: Arc::new(RwLock::new(NavModelState {
                title,
                order: None,
                href: config_href.clone().unwrap_or_else(|| relative_href.clone()),
                relative_href,
                config_href,
                is_active: false,
                settings,
                route_name,
            })),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.state.read().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.write().title = Some(title.into());
    }

    pub fn is_active(&self) -> bool {
        self.state.read().is_active
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.state.write().is_active = active;
    }

    /// Absolute href, refreshed on every committed navigation.
    pub fn href(&self) -> String {
        self.state.read().href.clone()
    }

    /// Href relative to the owning router.
    pub fn relative_href(&self) -> String {
        self.state.read().relative_href.clone()
    }

    pub(crate) fn config_href(&self) -> Option<String> {
        self.state.read().config_href.clone()
    }

    pub(crate) fn set_href(&self, href: String) {
        self.state.write().href = href;
    }

    pub fn order(&self) -> Option<i32> {
        self.state.read().order
    }

    pub(crate) fn set_order(&self, order: i32) {
        self.state.write().order = Some(order);
    }

    pub fn settings(&self) -> Map<String, Value> {
        self.state.read().settings.clone()
    }

    pub fn setting(&self, key: &str) -> Option<Value> {
        self.state.read().settings.get(key).cloned()
    }

    pub fn route_name(&self) -> Option<String> {
        self.state.read().route_name.clone()
    }

    /// `true` if both handles point at the same entry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for NavModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("NavModel")
            .field("title", &state.title)
            .field("order", &state.order)
            .field("href", &state.href)
            .field("is_active", &state.is_active)
            .finish_non_exhaustive()
    }
}
