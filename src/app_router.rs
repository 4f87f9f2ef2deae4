//! The application router and its navigation queue.
//!
//! [`AppRouter`] owns the root [`Router`], the history, the route loader and
//! the event sinks, and serializes navigations through a single-slot queue:
//!
//! - A request is turned into an instruction tree and put in the slot. A
//!   request still waiting in the slot when a newer one arrives is dropped
//!   and resolves as canceled.
//! - While a navigation runs, new top-level requests only fill the slot; the
//!   running navigation drains it once its pipeline finished.
//! - A pipeline ending in a [`NavigationCommand`](crate::NavigationCommand)
//!   queues the command's target and the queue runs it as the next attempt
//!   of the same navigation. After `max_instruction_count` runs the queue
//!   restores the previous location and stops.
//! - Navigations that do not complete restore the last committed location,
//!   or fall back to the configured fallback route.
//!
//! Events are published for the outermost attempt only; inner attempts
//! publish `child:complete`.

use crate::commands::NavigationOptions;
use crate::error::{Result, RouterError};
use crate::events::{EventSink, LoggingEventSink, NavigationEvent, NavigationEventArgs};
use crate::history::{History, HistoryOptions};
use crate::instruction::{InstructionId, NavigationTree};
use crate::loader::RouteLoader;
use crate::pipeline::{
    NavigationContext, PipelineOutput, PipelineProvider, PipelineResult, PipelineStatus,
};
use crate::router::Router;
use crate::url::fragment_from_location;
use crate::{debug_log, error_log, trace_log, warn_log};
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct QueuedNavigation {
    tree: NavigationTree,
    resolve: oneshot::Sender<PipelineResult>,
}

pub(crate) struct AppInner {
    router: Router,
    history: Arc<dyn History>,
    loader: Arc<dyn RouteLoader>,
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
    pipeline_provider: PipelineProvider,
    queue: Mutex<Option<QueuedNavigation>>,
    navigating: AtomicBool,
    current_tree: RwLock<Option<Arc<NavigationTree>>>,
}

/// Top-level router of an application.
///
/// Dereferences to its root [`Router`].
#[derive(Clone)]
pub struct AppRouter {
    inner: Arc<AppInner>,
}

impl AppRouter {
    pub fn new(history: Arc<dyn History>, loader: Arc<dyn RouteLoader>) -> Self {
        let inner = Arc::new_cyclic(|app| AppInner {
            router: Router::root(app.clone()),
            history,
            loader,
            sinks: RwLock::new(vec![Arc::new(LoggingEventSink)]),
            pipeline_provider: PipelineProvider::new(),
            queue: Mutex::new(None),
            navigating: AtomicBool::new(false),
            current_tree: RwLock::new(None),
        });
        Self { inner }
    }

    pub(crate) const fn from_inner(inner: Arc<AppInner>) -> Self {
        Self { inner }
    }

    /// The root router.
    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    pub fn history(&self) -> Arc<dyn History> {
        Arc::clone(&self.inner.history)
    }

    pub fn loader(&self) -> Arc<dyn RouteLoader> {
        Arc::clone(&self.inner.loader)
    }

    pub fn pipeline_provider(&self) -> &PipelineProvider {
        &self.inner.pipeline_provider
    }

    /// Register another receiver of navigation events.
    pub fn add_event_sink(&self, sink: impl EventSink) {
        trace_log!("Adding event sink '{}'", sink.name());
        self.inner.sinks.write().push(Arc::new(sink));
    }

    pub fn is_navigating(&self) -> bool {
        self.inner.navigating.load(Ordering::SeqCst)
    }

    fn set_navigating(&self, navigating: bool) {
        self.inner.navigating.store(navigating, Ordering::SeqCst);
    }

    /// The last committed instruction tree.
    pub fn current_tree(&self) -> Option<Arc<NavigationTree>> {
        self.inner.current_tree.read().clone()
    }

    pub(crate) fn set_current_tree(&self, tree: Arc<NavigationTree>) {
        *self.inner.current_tree.write() = Some(tree);
    }

    /// Fragment and query string of the last committed navigation.
    pub fn previous_location(&self) -> Option<String> {
        self.current_tree().map(|tree| {
            let root = tree.root();
            if root.query_string.is_empty() {
                root.fragment.clone()
            } else {
                format!("{}?{}", root.fragment, root.query_string)
            }
        })
    }

    /// Take over the history and load the location it reports.
    pub async fn activate(&self) -> Result<PipelineResult> {
        let history = self.history();
        history.activate(&HistoryOptions {
            push_state: history.has_push_state(),
        });
        let fragment = history.fragment();
        self.load_url(&fragment).await
    }

    pub fn deactivate(&self) {
        self.inner.history.deactivate();
    }

    /// Run a navigation to `url` and wait for its result.
    ///
    /// Route-not-found and an exhausted retry budget are the only errors;
    /// every other failure shows up in the returned [`PipelineResult`].
    pub fn load_url<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<PipelineResult>> {
        async move {
            let fragment = fragment_from_location(url);
            match self.queue_url(&fragment).await {
                Ok(receiver) => {
                    self.dequeue(0).await;
                    let result = receiver
                        .await
                        .unwrap_or_else(|_| PipelineResult::canceled());
                    match result.output.as_error() {
                        Some(error) if matches!(error, RouterError::MaxAttemptsExceeded { .. }) => {
                            Err(error.clone())
                        }
                        _ => Ok(result),
                    }
                }
                Err(error) => {
                    error_log!("Navigation to '{}' failed: {}", fragment, error);
                    self.restore_previous_location().await;
                    self.dequeue(0).await;
                    Err(error)
                }
            }
        }
        .boxed()
    }

    /// Create the instruction for `url` and put it in the queue slot.
    pub(crate) async fn queue_url(&self, url: &str) -> Result<oneshot::Receiver<PipelineResult>> {
        let fragment = fragment_from_location(url);
        let tree = self.router().create_root_tree(&fragment).await?;
        let (resolve, receiver) = oneshot::channel();
        let superseded = self
            .inner
            .queue
            .lock()
            .replace(QueuedNavigation { tree, resolve });
        if let Some(superseded) = superseded {
            debug_log!(
                "Navigation to '{}' superseded by '{}'",
                superseded.tree.root().fragment,
                fragment
            );
        }
        Ok(receiver)
    }

    fn dequeue(&self, attempt: usize) -> BoxFuture<'_, Option<PipelineResult>> {
        async move {
            if attempt == 0 && self.is_navigating() {
                trace_log!("Navigation in progress: request stays queued");
                return None;
            }

            let queued = self.inner.queue.lock().take();
            let Some(QueuedNavigation { tree, resolve }) = queued else {
                if attempt == 0 {
                    self.set_navigating(false);
                }
                return None;
            };
            self.set_navigating(true);

            let max = self.router().options().max_instruction_count;
            let args = NavigationEventArgs {
                fragment: tree.root().fragment.clone(),
                query_string: tree.root().query_string.clone(),
                result: None,
            };

            let result = if attempt > max {
                error_log!("Maximum navigation attempts exceeded ({}). Giving up.", attempt);
                PipelineResult::new(
                    PipelineStatus::Rejected,
                    PipelineOutput::Error(RouterError::MaxAttemptsExceeded { attempts: attempt }),
                )
            } else if attempt == max {
                error_log!(
                    "{} navigation instructions have been attempted without success. Restoring last known good location.",
                    attempt
                );
                self.restore_previous_location().await;
                let inner = self.dequeue(attempt + 1).await;
                inner.unwrap_or_else(PipelineResult::canceled)
            } else {
                if attempt == 0 {
                    self.publish(NavigationEvent::Processing, &args);
                }
                self.run(tree, attempt).await
            };

            let _ = resolve.send(result.clone());

            if attempt == 0 {
                self.set_navigating(false);
                let event = if result.output.as_error().is_some() {
                    NavigationEvent::Error
                } else if !result.completed() {
                    NavigationEvent::Canceled
                } else {
                    NavigationEvent::Success
                };
                let args = NavigationEventArgs {
                    result: Some(result.clone()),
                    ..args
                };
                self.publish(event, &args);
                self.publish(NavigationEvent::Complete, &args);
            } else {
                let args = NavigationEventArgs {
                    result: Some(result.clone()),
                    ..args
                };
                self.publish(NavigationEvent::ChildComplete, &args);
            }
            Some(result)
        }
        .boxed()
    }

    /// Run the pipeline for one attempt and drain what it queued.
    async fn run(&self, mut tree: NavigationTree, attempt: usize) -> PipelineResult {
        let previous = self.current_tree();
        let root_previous = previous.as_ref().map(|_| InstructionId::ROOT);
        tree.attach_previous(previous, root_previous);

        let pipeline = self.pipeline_provider().create_pipeline();
        let mut ctx = NavigationContext::new(self.clone(), tree);
        let result = pipeline.run(&mut ctx).await;
        drop(ctx);

        if let Some(command) = result.output.as_command() {
            if let Err(error) = command.navigate(self).await {
                error_log!("Redirect failed: {}", error);
                self.restore_previous_location().await;
            }
        } else if !result.completed() {
            if let Some(error) = result.output.as_error() {
                error_log!("Router navigation failed: {}", error);
            }
            self.restore_previous_location().await;
        }

        let inner = self.dequeue(attempt + 1).await;
        match (result.output.as_command(), inner) {
            (Some(_), Some(inner)) => inner,
            _ => result,
        }
    }

    async fn restore_previous_location(&self) {
        let router = self.router();
        if let Some(location) = self.previous_location() {
            warn_log!("Restoring previous location '{}'", location);
            let options = NavigationOptions::new().trigger(false).replace(true);
            if let Err(error) = router.navigate(&location, options).await {
                error_log!("Restoring '{}' failed: {}", location, error);
            }
        } else if let Some(fallback) = router.fallback_route() {
            warn_log!("Navigating to fallback route '{}'", fallback);
            let options = NavigationOptions::new().trigger(true).replace(true);
            if let Err(error) = router.dispatch(&fallback, options).await {
                error_log!("Fallback route '{}' failed: {}", fallback, error);
            }
        } else {
            error_log!(
                "Router navigation failed, and no previous location or fallbackRoute could be restored."
            );
        }
    }

    fn publish(&self, event: NavigationEvent, args: &NavigationEventArgs) {
        let sinks = self.inner.sinks.read().clone();
        for sink in sinks {
            sink.publish(event, args);
        }
    }
}

impl Deref for AppRouter {
    type Target = Router;

    fn deref(&self) -> &Self::Target {
        &self.inner.router
    }
}

impl fmt::Debug for AppRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRouter")
            .field("router", &self.inner.router)
            .field("navigating", &self.is_navigating())
            .field("pipeline", &self.inner.pipeline_provider)
            .finish_non_exhaustive()
    }
}
