//! Lifecycle steps: can-deactivate, deactivate, can-activate, activate.
//!
//! Deactivation walks the previous components inside-out (deepest child
//! router first); activation walks the next components top-down. For a tree
//! of depth N that gives `can_deactivate` on levels N..1 and `activate` on
//! levels 1..N.
//!
//! The `can_*` steps cancel the pipeline on the first answer that does not
//! allow continuing. The plain steps run after the point of no return: their
//! answers are ignored and only a hook error cancels.

use crate::component::Component;
use crate::error::Result;
use crate::hooks::{HookOutput, HookResult};
use crate::instruction::{InstructionId, LifecycleArgs, NavigationTree};
use crate::pipeline::{NavigationContext, Next, PipelineOutput, PipelineStep, StepOutcome};
use crate::router::Router;
use crate::{trace_log, warn_log};
use async_trait::async_trait;
use std::sync::Arc;

/// Decide whether a hook answer lets the pipeline go on.
///
/// Commands are bound to `router` (when given) and continue only if they ask
/// to; `Undefined` continues; booleans are taken as they are.
pub fn should_continue(output: &mut HookOutput, router: Option<&Router>) -> bool {
    match output {
        HookOutput::Undefined => true,
        HookOutput::Bool(value) => *value,
        HookOutput::Command(command) => {
            if let Some(router) = router {
                command.set_router(router.clone());
            }
            command.should_continue_processing()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeactivationHook {
    CanDeactivate,
    Deactivate,
}

impl DeactivationHook {
    fn has(self, component: &Component) -> bool {
        match self {
            Self::CanDeactivate => component.view_model().has_can_deactivate(),
            Self::Deactivate => component.view_model().has_deactivate(),
        }
    }

    fn call(self, component: &Component) -> HookResult {
        let view_model = component.view_model();
        let hook = match self {
            Self::CanDeactivate => view_model.can_deactivate_hook().map(|h| h.can_deactivate()),
            Self::Deactivate => view_model.deactivate_hook().map(|h| h.deactivate()),
        };
        hook.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivationHook {
    CanActivate,
    Activate,
}

impl ActivationHook {
    fn has(self, component: &Component) -> bool {
        match self {
            Self::CanActivate => component.view_model().has_can_activate(),
            Self::Activate => component.view_model().has_activate(),
        }
    }

    fn call(self, component: &Component, args: &LifecycleArgs) -> HookResult {
        let view_model = component.view_model();
        let hook = match self {
            Self::CanActivate => view_model.can_activate_hook().map(|h| h.can_activate(args)),
            Self::Activate => view_model.activate_hook().map(|h| h.activate(args)),
        };
        hook.unwrap_or_default()
    }
}

/// Previous components, outermost first.
fn find_deactivatable(
    tree: &NavigationTree,
    id: InstructionId,
    hook: DeactivationHook,
    list: &mut Vec<Arc<Component>>,
) {
    let Some(plans) = tree[id].plan() else {
        return;
    };
    for plan in plans.values() {
        let Some(component) = &plan.prev_component else {
            if let Some(child) = plan.child {
                find_deactivatable(tree, child, hook, list);
            }
            continue;
        };

        if plan.strategy.runs_lifecycle() && hook.has(component) {
            list.push(Arc::clone(component));
        }
        if plan.strategy == crate::config::ActivationStrategy::Replace {
            add_previous_deactivatable(component, hook, list);
        } else if let Some(child) = plan.child {
            find_deactivatable(tree, child, hook, list);
        }
    }
}

/// Components still mounted below a component that is being replaced.
fn add_previous_deactivatable(
    component: &Component,
    hook: DeactivationHook,
    list: &mut Vec<Arc<Component>>,
) {
    let Some(current) = component
        .child_router()
        .and_then(|router| router.current_instruction())
    else {
        return;
    };
    for instruction in current.view_port_instructions().values() {
        if hook.has(&instruction.component) {
            list.push(Arc::clone(&instruction.component));
        }
        add_previous_deactivatable(&instruction.component, hook, list);
    }
}

async fn process_deactivatable(
    tree: &NavigationTree,
    hook: DeactivationHook,
    next: Next,
    ignore_result: bool,
) -> StepOutcome {
    let mut components = Vec::new();
    find_deactivatable(tree, InstructionId::ROOT, hook, &mut components);

    for component in components.iter().rev() {
        trace_log!("Calling {:?} on '{}'", hook, component.module_id());
        match hook.call(component).resolve().await {
            Ok(mut output) => {
                if !ignore_result && !should_continue(&mut output, None) {
                    return next.cancel(output);
                }
            }
            Err(error) => {
                warn_log!("{:?} hook of '{}' failed: {}", hook, component.module_id(), error);
                return next.cancel(PipelineOutput::Error(error));
            }
        }
    }
    next.proceed()
}

struct Activatable {
    component: Arc<Component>,
    args: LifecycleArgs,
    router: Router,
}

/// Next components, outermost first.
fn find_activatable(
    tree: &NavigationTree,
    id: InstructionId,
    hook: ActivationHook,
    router: &Router,
    list: &mut Vec<Activatable>,
) {
    let Some(plans) = tree[id].plan() else {
        return;
    };
    for (name, plan) in plans {
        let Some(instruction) = tree[id].view_port_instruction(name) else {
            continue;
        };
        if plan.strategy.runs_lifecycle() && hook.has(&instruction.component) {
            list.push(Activatable {
                component: Arc::clone(&instruction.component),
                args: instruction.lifecycle_args.clone(),
                router: router.clone(),
            });
        }
        if let Some(child) = plan.child {
            let child_router = instruction.child_router().unwrap_or_else(|| router.clone());
            find_activatable(tree, child, hook, &child_router, list);
        }
    }
}

async fn process_activatable(
    tree: &NavigationTree,
    hook: ActivationHook,
    next: Next,
    ignore_result: bool,
) -> StepOutcome {
    let mut targets = Vec::new();
    let root_router = tree.root().router().clone();
    find_activatable(tree, InstructionId::ROOT, hook, &root_router, &mut targets);

    for target in &targets {
        trace_log!("Calling {:?} on '{}'", hook, target.component.module_id());
        match hook.call(&target.component, &target.args).resolve().await {
            Ok(mut output) => {
                if !ignore_result && !should_continue(&mut output, Some(&target.router)) {
                    return next.cancel(output);
                }
            }
            Err(error) => {
                warn_log!(
                    "{:?} hook of '{}' failed: {}",
                    hook,
                    target.component.module_id(),
                    error
                );
                return next.cancel(PipelineOutput::Error(error));
            }
        }
    }
    next.proceed()
}

/// Asks previous components whether they may be left.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanDeactivatePreviousStep;

#[async_trait]
impl PipelineStep for CanDeactivatePreviousStep {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        Ok(process_deactivatable(ctx.tree(), DeactivationHook::CanDeactivate, next, false).await)
    }

    fn name(&self) -> &'static str {
        "CanDeactivatePrevious"
    }
}

/// Tells previous components they are being left.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeactivatePreviousStep;

#[async_trait]
impl PipelineStep for DeactivatePreviousStep {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        Ok(process_deactivatable(ctx.tree(), DeactivationHook::Deactivate, next, true).await)
    }

    fn name(&self) -> &'static str {
        "DeactivatePrevious"
    }
}

/// Asks next components whether they may be entered.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanActivateNextStep;

#[async_trait]
impl PipelineStep for CanActivateNextStep {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        Ok(process_activatable(ctx.tree(), ActivationHook::CanActivate, next, false).await)
    }

    fn name(&self) -> &'static str {
        "CanActivateNext"
    }
}

/// Tells next components they are entered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivateNextStep;

#[async_trait]
impl PipelineStep for ActivateNextStep {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        Ok(process_activatable(ctx.tree(), ActivationHook::Activate, next, true).await)
    }

    fn name(&self) -> &'static str {
        "ActivateNext"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NavigationCommand;

    #[test]
    fn test_should_continue_basic_values() {
        assert!(should_continue(&mut HookOutput::Undefined, None));
        assert!(should_continue(&mut HookOutput::Bool(true), None));
        assert!(!should_continue(&mut HookOutput::Bool(false), None));
    }

    #[test]
    fn test_should_continue_commands() {
        let mut stop = HookOutput::Command(NavigationCommand::redirect("/login"));
        assert!(!should_continue(&mut stop, None));

        let mut go_on = HookOutput::Command(
            NavigationCommand::redirect("/audit").continue_processing(true),
        );
        assert!(should_continue(&mut go_on, None));
    }
}
