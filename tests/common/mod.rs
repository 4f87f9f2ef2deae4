//! Test utilities for navigation tests
//!
//! Provides a recording loader, view ports and event sink, plus helpers to
//! build an application router over an in-memory history.

#![allow(dead_code)]

use async_trait::async_trait;
use navigator_pipeline::events::event_sink_fn;
use navigator_pipeline::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared, ordered record of what happened during a test.
#[derive(Clone, Default)]
pub struct Log {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Entries starting with `prefix`.
    pub fn filtered(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.starts_with(prefix))
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Factory = Arc<dyn Fn() -> ViewModel + Send + Sync>;

/// Loader creating a fresh component per load from registered factories.
/// Unregistered modules get a view-model without hooks.
#[derive(Default)]
pub struct TestLoader {
    factories: Mutex<HashMap<String, Factory>>,
    loads: Log,
}

impl TestLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn module(&self, module_id: &str, factory: impl Fn() -> ViewModel + Send + Sync + 'static) {
        self.factories
            .lock()
            .insert(module_id.to_string(), Arc::new(factory));
    }

    /// Module ids in load order.
    pub fn loads(&self) -> Vec<String> {
        self.loads.entries()
    }
}

#[async_trait]
impl RouteLoader for TestLoader {
    async fn load_route(
        &self,
        _router: &Router,
        config: &ViewPortConfig,
        _instruction: &NavigationInstruction,
    ) -> Result<Arc<Component>> {
        let module_id = config
            .module_id
            .clone()
            .ok_or_else(|| RouterError::RouteLoad {
                module_id: String::new(),
                message: "view port has no module".to_string(),
            })?;
        let factory = self.factories.lock().get(&module_id).cloned();
        let view_model = match factory {
            Some(factory) => factory(),
            None => ViewModel::new(module_id.clone()),
        };
        self.loads.push(module_id.clone());
        Ok(Arc::new(Component::new(module_id, view_model)))
    }
}

/// View port recording `process:<module>` and `swap:<module>`.
///
/// Components hosting a child router get a recording `default` view port
/// registered on it while processed, the way a rendered outlet would.
pub struct RecordingViewPort {
    log: Log,
}

impl RecordingViewPort {
    pub fn new(log: Log) -> Arc<Self> {
        Arc::new(Self { log })
    }
}

#[async_trait]
impl ViewPort for RecordingViewPort {
    async fn process(&self, instruction: &ViewPortInstruction, _wait_to_swap: bool) -> Result<()> {
        self.log
            .push(format!("process:{}", instruction.component.module_id()));
        if let Some(child_router) = instruction.child_router() {
            if child_router.view_port(DEFAULT_VIEW_PORT).is_none() {
                child_router.register_view_port(
                    DEFAULT_VIEW_PORT,
                    RecordingViewPort::new(self.log.clone()),
                );
            }
        }
        Ok(())
    }

    fn swap(&self, instruction: &ViewPortInstruction) {
        self.log
            .push(format!("swap:{}", instruction.component.module_id()));
    }
}

/// View-model whose four lifecycle hooks record `<hook>:<name>` and allow.
pub fn recording_view_model(name: &str, log: &Log) -> ViewModel {
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    let (na, nb, nc, nd) = (
        name.to_string(),
        name.to_string(),
        name.to_string(),
        name.to_string(),
    );
    ViewModel::new(name)
        .can_activate(move |_: &LifecycleArgs| {
            a.push(format!("can_activate:{na}"));
            HookResult::from(true)
        })
        .activate(move |_: &LifecycleArgs| {
            b.push(format!("activate:{nb}"));
            HookResult::default()
        })
        .can_deactivate(move || {
            c.push(format!("can_deactivate:{nc}"));
            HookResult::from(true)
        })
        .deactivate(move || {
            d.push(format!("deactivate:{nd}"));
            HookResult::default()
        })
}

/// Everything a navigation test inspects.
pub struct Harness {
    pub app: AppRouter,
    pub history: Arc<MemoryHistory>,
    pub loader: Arc<TestLoader>,
    /// Hook calls and view-port activity.
    pub log: Log,
    /// Published event names.
    pub events: Log,
}

impl Harness {
    /// Application router over a fresh history with a recording root view
    /// port. Configure it through `configure`.
    pub fn new(configure: impl FnOnce(&mut RouterConfiguration, &TestLoader, &Log)) -> Self {
        init_logging();
        let history = Arc::new(MemoryHistory::new());
        let loader = TestLoader::new();
        let log = Log::new();
        let events = Log::new();

        let app = AppRouter::new(history.clone(), loader.clone());
        let sink_log = events.clone();
        app.add_event_sink(event_sink_fn(move |event, _args| {
            sink_log.push(event.name());
        }));

        let mut config = RouterConfiguration::new();
        configure(&mut config, loader.as_ref(), &log);
        app.configure(config).expect("valid configuration");
        app.register_view_port(DEFAULT_VIEW_PORT, RecordingViewPort::new(log.clone()));

        Self {
            app,
            history,
            loader,
            log,
            events,
        }
    }

    pub fn load(&self, url: &str) -> PipelineResult {
        pollster::block_on(self.app.load_url(url)).expect("navigation ran")
    }

    /// Fragment of the committed root instruction.
    pub fn current_fragment(&self) -> Option<String> {
        self.app
            .current_instruction()
            .map(|instruction| instruction.fragment.clone())
    }

    pub fn current_component(&self) -> Arc<Component> {
        let current = self.app.current_instruction().expect("committed navigation");
        let view_port = current
            .view_port_instruction(DEFAULT_VIEW_PORT)
            .expect("default view port");
        Arc::clone(&view_port.component)
    }
}

/// Assert that the pipeline completed.
pub fn assert_completed(result: &PipelineResult) {
    assert!(
        result.completed(),
        "expected a completed navigation, got {:?}",
        result
    );
}

/// Assert that the pipeline ended canceled.
pub fn assert_canceled(result: &PipelineResult) {
    assert_eq!(
        result.status,
        PipelineStatus::Canceled,
        "expected a canceled navigation, got {:?}",
        result
    );
}
