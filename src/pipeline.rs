//! The navigation pipeline.
//!
//! A [`Pipeline`] runs [`PipelineStep`]s in order against one
//! [`NavigationContext`]. Each step answers through the [`Next`] it is handed:
//!
//! | Call                | Effect                                        |
//! |---------------------|-----------------------------------------------|
//! | `next.proceed()`    | run the following step                        |
//! | `next.complete(o)`  | stop, status `completed`                      |
//! | `next.cancel(o)`    | stop, status `canceled`                       |
//! | `next.reject(o)`    | stop, status `rejected`                       |
//!
//! A step returning `Err` is treated as `next.reject(err)`. When every step
//! proceeds the pipeline completes with no output.
//!
//! # Step order
//!
//! [`PipelineProvider::create_pipeline`] assembles the fixed sequence
//!
//! ```text
//! build plan → can-deactivate → load route → [authorize] → can-activate →
//! [preActivate] → deactivate → activate → [preRender] → commit → [postRender]
//! ```
//!
//! where bracketed entries are named slots filled through
//! [`RouterConfiguration::add_pipeline_step`](crate::RouterConfiguration::add_pipeline_step).

use crate::activation::{
    ActivateNextStep, CanActivateNextStep, CanDeactivatePreviousStep, DeactivatePreviousStep,
};
use crate::app_router::AppRouter;
use crate::commands::NavigationCommand;
use crate::commit::CommitChangesStep;
use crate::error::{Result, RouterError};
use crate::hooks::HookOutput;
use crate::instruction::{NavigationInstruction, NavigationTree};
use crate::loader::LoadRouteStep;
use crate::plan::BuildNavigationPlanStep;
use crate::{debug_log, trace_log};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// State of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Completed,
    Canceled,
    Rejected,
    /// Steps are still executing; seen through [`NavigationContext::status`].
    Running,
}

/// Value a pipeline run ends with.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PipelineOutput {
    #[default]
    None,
    Bool(bool),
    Error(RouterError),
    Command(NavigationCommand),
}

impl PipelineOutput {
    pub const fn as_error(&self) -> Option<&RouterError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    pub const fn as_command(&self) -> Option<&NavigationCommand> {
        match self {
            Self::Command(command) => Some(command),
            _ => None,
        }
    }
}

impl From<HookOutput> for PipelineOutput {
    fn from(output: HookOutput) -> Self {
        match output {
            HookOutput::Undefined => Self::None,
            HookOutput::Bool(value) => Self::Bool(value),
            HookOutput::Command(command) => Self::Command(command),
        }
    }
}

impl From<RouterError> for PipelineOutput {
    fn from(error: RouterError) -> Self {
        Self::Error(error)
    }
}

impl From<NavigationCommand> for PipelineOutput {
    fn from(command: NavigationCommand) -> Self {
        Self::Command(command)
    }
}

/// Outcome of running the pipeline for one instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    pub output: PipelineOutput,
}

impl PipelineResult {
    pub const fn new(status: PipelineStatus, output: PipelineOutput) -> Self {
        Self { status, output }
    }

    /// Result of a request dropped before it ran.
    pub const fn canceled() -> Self {
        Self::new(PipelineStatus::Canceled, PipelineOutput::None)
    }

    pub fn completed(&self) -> bool {
        self.status == PipelineStatus::Completed
    }
}

/// How a step ended.
#[derive(Debug)]
pub enum StepOutcome {
    Continue,
    Finish(PipelineStatus, PipelineOutput),
}

/// Continuation handed to every step.
#[derive(Debug)]
pub struct Next {
    step: &'static str,
}

impl Next {
    const fn new(step: &'static str) -> Self {
        Self { step }
    }

    pub fn proceed(self) -> StepOutcome {
        trace_log!("Pipeline step '{}' continued", self.step);
        StepOutcome::Continue
    }

    pub fn complete(self, output: impl Into<PipelineOutput>) -> StepOutcome {
        debug_log!("Pipeline completed by '{}'", self.step);
        StepOutcome::Finish(PipelineStatus::Completed, output.into())
    }

    pub fn cancel(self, output: impl Into<PipelineOutput>) -> StepOutcome {
        debug_log!("Pipeline canceled by '{}'", self.step);
        StepOutcome::Finish(PipelineStatus::Canceled, output.into())
    }

    pub fn reject(self, output: impl Into<PipelineOutput>) -> StepOutcome {
        debug_log!("Pipeline rejected by '{}'", self.step);
        StepOutcome::Finish(PipelineStatus::Rejected, output.into())
    }
}

/// State the steps of one navigation share.
pub struct NavigationContext {
    app: AppRouter,
    tree: NavigationTree,
    committed: Option<Arc<NavigationTree>>,
    status: PipelineStatus,
}

impl NavigationContext {
    pub(crate) const fn new(app: AppRouter, tree: NavigationTree) -> Self {
        Self {
            app,
            tree,
            committed: None,
            status: PipelineStatus::Running,
        }
    }

    /// `Running` while steps execute, then the status the run ended with.
    pub const fn status(&self) -> PipelineStatus {
        self.status
    }

    pub const fn app(&self) -> &AppRouter {
        &self.app
    }

    /// The instruction tree, or the frozen tree once committed.
    pub fn tree(&self) -> &NavigationTree {
        self.committed.as_deref().unwrap_or(&self.tree)
    }

    /// Root instruction of this navigation.
    pub fn instruction(&self) -> &NavigationInstruction {
        self.tree().root()
    }

    pub(crate) fn tree_mut(&mut self) -> &mut NavigationTree {
        &mut self.tree
    }

    pub(crate) fn freeze(&mut self) -> Arc<NavigationTree> {
        let tree = Arc::new(std::mem::take(&mut self.tree));
        self.committed = Some(Arc::clone(&tree));
        tree
    }

    pub const fn committed(&self) -> Option<&Arc<NavigationTree>> {
        self.committed.as_ref()
    }
}

impl fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationContext")
            .field("fragment", &self.instruction().fragment)
            .field("committed", &self.committed.is_some())
            .finish_non_exhaustive()
    }
}

/// One stage of the navigation pipeline.
#[async_trait]
pub trait PipelineStep: Send + Sync + 'static {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome>;

    /// Step name for logs.
    fn name(&self) -> &'static str {
        "PipelineStep"
    }
}

/// Create a synchronous step from a closure.
///
/// ```
/// use navigator_pipeline::{step_fn, NavigationCommand};
///
/// let require_login = step_fn(|ctx, next| {
///     if ctx.instruction().fragment.starts_with("/admin") {
///         Ok(next.cancel(NavigationCommand::redirect("/login")))
///     } else {
///         Ok(next.proceed())
///     }
/// });
/// # let _ = require_login;
/// ```
pub const fn step_fn<F>(f: F) -> FnStep<F>
where
    F: Fn(&mut NavigationContext, Next) -> Result<StepOutcome> + Send + Sync + 'static,
{
    FnStep { f }
}

/// Step created from a closure.
pub struct FnStep<F> {
    f: F,
}

#[async_trait]
impl<F> PipelineStep for FnStep<F>
where
    F: Fn(&mut NavigationContext, Next) -> Result<StepOutcome> + Send + Sync + 'static,
{
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        (self.f)(ctx, next)
    }

    fn name(&self) -> &'static str {
        "FnStep"
    }
}

/// Ordered list of steps.
#[derive(Default, Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: Arc<dyn PipelineStep>) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Run every step until one finishes the pipeline.
    pub async fn run(&self, ctx: &mut NavigationContext) -> PipelineResult {
        ctx.status = PipelineStatus::Running;
        let result = self.run_steps(ctx).await;
        ctx.status = result.status;
        result
    }

    async fn run_steps(&self, ctx: &mut NavigationContext) -> PipelineResult {
        for step in &self.steps {
            let name = step.name();
            trace_log!("Running pipeline step '{}'", name);
            match step.run(ctx, Next::new(name)).await {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::Finish(status, output)) => {
                    return PipelineResult::new(status, output);
                }
                Err(error) => {
                    debug_log!("Pipeline step '{}' failed: {}", name, error);
                    return PipelineResult::new(PipelineStatus::Rejected, error.into());
                }
            }
        }
        PipelineResult::new(PipelineStatus::Completed, PipelineOutput::None)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

/// Extension slot of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineSlot {
    Authorize,
    PreActivate,
    PreRender,
    PostRender,
}

impl PipelineSlot {
    /// Parse a slot name, accepting the legacy aliases.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "authorize" => Ok(Self::Authorize),
            "preActivate" | "modelbind" => Ok(Self::PreActivate),
            "preRender" | "precommit" => Ok(Self::PreRender),
            "postRender" | "postcomplete" => Ok(Self::PostRender),
            _ => Err(RouterError::InvalidPipelineSlot {
                name: name.to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct SlotSteps {
    authorize: Vec<Arc<dyn PipelineStep>>,
    pre_activate: Vec<Arc<dyn PipelineStep>>,
    pre_render: Vec<Arc<dyn PipelineStep>>,
    post_render: Vec<Arc<dyn PipelineStep>>,
}

impl SlotSteps {
    fn slot_mut(&mut self, slot: PipelineSlot) -> &mut Vec<Arc<dyn PipelineStep>> {
        match slot {
            PipelineSlot::Authorize => &mut self.authorize,
            PipelineSlot::PreActivate => &mut self.pre_activate,
            PipelineSlot::PreRender => &mut self.pre_render,
            PipelineSlot::PostRender => &mut self.post_render,
        }
    }
}

/// Builds the pipeline for each navigation, including user slot steps.
#[derive(Default)]
pub struct PipelineProvider {
    slots: RwLock<SlotSteps>,
}

impl PipelineProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `step` to the slot called `name`.
    pub fn add_step(&self, name: &str, step: Arc<dyn PipelineStep>) -> Result<()> {
        let slot = PipelineSlot::from_name(name)?;
        debug_log!("Adding pipeline step '{}' to slot {:?}", step.name(), slot);
        self.slots.write().slot_mut(slot).push(step);
        Ok(())
    }

    /// Remove every user step.
    pub fn reset(&self) {
        *self.slots.write() = SlotSteps::default();
    }

    pub fn create_pipeline(&self) -> Pipeline {
        let slots = self.slots.read();
        let mut pipeline = Pipeline::new();
        pipeline
            .add_step(Arc::new(BuildNavigationPlanStep))
            .add_step(Arc::new(CanDeactivatePreviousStep))
            .add_step(Arc::new(LoadRouteStep));
        slots.authorize.iter().for_each(|step| {
            pipeline.add_step(Arc::clone(step));
        });
        pipeline.add_step(Arc::new(CanActivateNextStep));
        slots.pre_activate.iter().for_each(|step| {
            pipeline.add_step(Arc::clone(step));
        });
        pipeline
            .add_step(Arc::new(DeactivatePreviousStep))
            .add_step(Arc::new(ActivateNextStep));
        slots.pre_render.iter().for_each(|step| {
            pipeline.add_step(Arc::clone(step));
        });
        pipeline.add_step(Arc::new(CommitChangesStep));
        slots.post_render.iter().for_each(|step| {
            pipeline.add_step(Arc::clone(step));
        });
        pipeline
    }
}

impl fmt::Debug for PipelineProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineProvider")
            .field("pipeline", &self.create_pipeline())
            .finish()
    }
}
