//! Loaded components and their lifecycle capabilities.
//!
//! A [`ViewModel`] declares, once, which lifecycle hooks it implements. The
//! pipeline checks these capabilities instead of probing objects per
//! traversal.
//!
//! ```
//! use navigator_pipeline::{Component, HookResult, LifecycleArgs, ViewModel};
//!
//! let view_model = ViewModel::new("users/detail")
//!     .can_activate(|args: &LifecycleArgs| HookResult::from(args.params.contains("id")))
//!     .can_deactivate(|| HookResult::from(true));
//!
//! let component = Component::new("users/detail", view_model);
//! assert!(component.view_model().has_can_activate());
//! assert!(!component.view_model().has_activate());
//! ```

use crate::config::{ActivationStrategy, RouterConfiguration};
use crate::hooks::{
    Activate, CanActivate, CanDeactivate, ConfigureRouter, DetermineActivationStrategy,
    Deactivate, HookResult,
};
use crate::instruction::LifecycleArgs;
use crate::router::Router;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Capability set of a component's view-model.
#[derive(Clone, Default)]
pub struct ViewModel {
    name: String,
    can_activate: Option<Arc<dyn CanActivate>>,
    activate: Option<Arc<dyn Activate>>,
    can_deactivate: Option<Arc<dyn CanDeactivate>>,
    deactivate: Option<Arc<dyn Deactivate>>,
    determine_activation_strategy: Option<Arc<dyn DetermineActivationStrategy>>,
    configure_router: Option<Arc<dyn ConfigureRouter>>,
}

impl ViewModel {
    /// View-model without any hook.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_activate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&LifecycleArgs) -> HookResult + Send + Sync + 'static,
    {
        self.can_activate = Some(Arc::new(hook));
        self
    }

    pub fn activate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&LifecycleArgs) -> HookResult + Send + Sync + 'static,
    {
        self.activate = Some(Arc::new(hook));
        self
    }

    pub fn can_deactivate<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> HookResult + Send + Sync + 'static,
    {
        self.can_deactivate = Some(Arc::new(hook));
        self
    }

    pub fn deactivate<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> HookResult + Send + Sync + 'static,
    {
        self.deactivate = Some(Arc::new(hook));
        self
    }

    pub fn determine_activation_strategy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&LifecycleArgs) -> ActivationStrategy + Send + Sync + 'static,
    {
        self.determine_activation_strategy = Some(Arc::new(hook));
        self
    }

    pub fn configure_router<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RouterConfiguration, &Router) -> HookResult<()> + Send + Sync + 'static,
    {
        self.configure_router = Some(Arc::new(hook));
        self
    }

    pub const fn has_can_activate(&self) -> bool {
        self.can_activate.is_some()
    }

    pub const fn has_activate(&self) -> bool {
        self.activate.is_some()
    }

    pub const fn has_can_deactivate(&self) -> bool {
        self.can_deactivate.is_some()
    }

    pub const fn has_deactivate(&self) -> bool {
        self.deactivate.is_some()
    }

    pub(crate) fn can_activate_hook(&self) -> Option<&Arc<dyn CanActivate>> {
        self.can_activate.as_ref()
    }

    pub(crate) fn activate_hook(&self) -> Option<&Arc<dyn Activate>> {
        self.activate.as_ref()
    }

    pub(crate) fn can_deactivate_hook(&self) -> Option<&Arc<dyn CanDeactivate>> {
        self.can_deactivate.as_ref()
    }

    pub(crate) fn deactivate_hook(&self) -> Option<&Arc<dyn Deactivate>> {
        self.deactivate.as_ref()
    }

    pub(crate) fn determine_activation_strategy_hook(
        &self,
    ) -> Option<&Arc<dyn DetermineActivationStrategy>> {
        self.determine_activation_strategy.as_ref()
    }

    pub(crate) fn configure_router_hook(&self) -> Option<&Arc<dyn ConfigureRouter>> {
        self.configure_router.as_ref()
    }
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("name", &self.name)
            .field("can_activate", &self.can_activate.is_some())
            .field("activate", &self.activate.is_some())
            .field("can_deactivate", &self.can_deactivate.is_some())
            .field("deactivate", &self.deactivate.is_some())
            .field(
                "determine_activation_strategy",
                &self.determine_activation_strategy.is_some(),
            )
            .field("configure_router", &self.configure_router.is_some())
            .finish()
    }
}

/// A loaded route module: its view-model and, once configured, the child
/// router it hosts.
pub struct Component {
    module_id: String,
    view_model: ViewModel,
    child_router: RwLock<Option<Router>>,
}

impl Component {
    pub fn new(module_id: impl Into<String>, view_model: ViewModel) -> Self {
        Self {
            module_id: module_id.into(),
            view_model,
            child_router: RwLock::new(None),
        }
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub const fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn child_router(&self) -> Option<Router> {
        self.child_router.read().clone()
    }

    pub(crate) fn set_child_router(&self, router: Router) {
        *self.child_router.write() = Some(router);
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("module_id", &self.module_id)
            .field("view_model", &self.view_model)
            .field("has_child_router", &self.child_router.read().is_some())
            .finish()
    }
}
