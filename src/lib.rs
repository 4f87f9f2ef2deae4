//! # navigator-pipeline
//!
//! Navigation engine for applications built from nested, named view ports.
//!
//! A navigation request travels through four stages:
//!
//! | Stage        | Module                           | Outcome                                   |
//! |--------------|----------------------------------|-------------------------------------------|
//! | Recognition  | [`recognizer`], [`router`]       | an instruction tree, one node per router  |
//! | Planning     | [`plan`]                         | a strategy per view port                  |
//! | Lifecycle    | [`activation`], [`loader`]       | hooks asked, new components loaded        |
//! | Commit       | [`commit`]                       | view ports swapped, routers updated       |
//!
//! The stages are [`PipelineStep`]s run by a [`Pipeline`]; the
//! [`AppRouter`] queues requests so that at most one navigation runs at a
//! time.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use navigator_pipeline::history::MemoryHistory;
//! use navigator_pipeline::{
//!     AppRouter, Component, NavigationInstruction, Result, RouteConfig, RouteLoader, Router,
//!     RouterConfiguration, ViewModel, ViewPort, ViewPortConfig, ViewPortInstruction,
//! };
//!
//! struct Loader;
//!
//! #[async_trait]
//! impl RouteLoader for Loader {
//!     async fn load_route(
//!         &self,
//!         _router: &Router,
//!         config: &ViewPortConfig,
//!         _instruction: &NavigationInstruction,
//!     ) -> Result<Arc<Component>> {
//!         let module_id = config.module_id.clone().unwrap_or_default();
//!         Ok(Arc::new(Component::new(module_id.clone(), ViewModel::new(module_id))))
//!     }
//! }
//!
//! struct Outlet;
//!
//! #[async_trait]
//! impl ViewPort for Outlet {
//!     async fn process(&self, _instruction: &ViewPortInstruction, _wait: bool) -> Result<()> {
//!         Ok(())
//!     }
//!     fn swap(&self, _instruction: &ViewPortInstruction) {}
//! }
//!
//! let app = AppRouter::new(Arc::new(MemoryHistory::new()), Arc::new(Loader));
//! let mut config = RouterConfiguration::new();
//! config
//!     .map(RouteConfig::new("").name("home").module_id("home").nav(true))
//!     .map(RouteConfig::new("users/:id").name("user").module_id("users/detail"));
//! app.configure(config).unwrap();
//! app.register_view_port("default", Arc::new(Outlet));
//!
//! let result = pollster::block_on(app.load_url("/users/42")).unwrap();
//! assert!(result.completed());
//! let current = app.current_instruction().unwrap();
//! assert_eq!(current.params.get("id"), Some("42"));
//! ```
//!
//! # Features
//!
//! | Feature   | Default | Effect                                        |
//! |-----------|---------|-----------------------------------------------|
//! | `log`     | yes     | log through the `log` crate                   |
//! | `tracing` | no      | log through the `tracing` crate               |
//! | `cache`   | yes     | LRU cache of recognition results (`lru`)      |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logging;

pub mod activation;
pub mod app_router;
#[cfg(feature = "cache")]
#[cfg_attr(docsrs, doc(cfg(feature = "cache")))]
pub mod cache;
pub mod commands;
pub mod commit;
pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod hooks;
pub mod instruction;
pub mod loader;
pub mod nav_model;
pub mod params;
pub mod pipeline;
pub mod plan;
pub mod recognizer;
pub mod router;
pub mod url;
pub mod viewport;

pub use activation::should_continue;
pub use app_router::AppRouter;
pub use commands::{NavigationCommand, NavigationOptions};
pub use component::{Component, ViewModel};
pub use config::{
    ActivationStrategy, NavOrder, RouteConfig, RouterConfiguration, RouterOptions,
    UnknownRouteHandler, ViewPortConfig, DEFAULT_VIEW_PORT,
};
pub use error::{Result, RouterError};
pub use events::{EventSink, NavigationEvent, NavigationEventArgs};
pub use history::{History, MemoryHistory};
pub use hooks::{HookOutput, HookResult};
pub use instruction::{
    InstructionId, InstructionRef, LifecycleArgs, NavigationInstruction, NavigationTree,
    ViewPortInstruction, ViewPortPlan,
};
pub use loader::RouteLoader;
pub use nav_model::NavModel;
pub use params::{QueryParams, RouteParams};
pub use pipeline::{
    step_fn, NavigationContext, Next, Pipeline, PipelineOutput, PipelineResult, PipelineStatus,
    PipelineStep, StepOutcome,
};
pub use plan::has_different_parameter_values;
pub use router::Router;
pub use viewport::ViewPort;
