//! Loading components for replaced view ports.

use crate::component::Component;
use crate::config::{ActivationStrategy, RouterConfiguration, ViewPortConfig};
use crate::error::{Result, RouterError};
use crate::instruction::{InstructionId, NavigationInstruction, NavigationTree, ViewPortInstruction};
use crate::pipeline::{NavigationContext, Next, PipelineStep, StepOutcome};
use crate::plan::{build_navigation_plan, PlanOutcome};
use crate::router::Router;
use crate::{debug_log, trace_log, warn_log};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

/// Resolves a view port config to a component.
///
/// Implementations own module lookup and instantiation. A component whose
/// view-model implements `configure_router` gets a child router once loaded.
#[async_trait]
pub trait RouteLoader: Send + Sync + 'static {
    async fn load_route(
        &self,
        router: &Router,
        config: &ViewPortConfig,
        instruction: &NavigationInstruction,
    ) -> Result<Arc<Component>>;
}

/// Loads every `replace` view port of the tree, discovering child routers
/// along the way.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadRouteStep;

#[async_trait]
impl PipelineStep for LoadRouteStep {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        let loader = ctx.app().loader();
        match load_new_route(loader.as_ref(), ctx.tree_mut(), InstructionId::ROOT).await {
            Ok(PlanOutcome::Ready) => Ok(next.proceed()),
            Ok(PlanOutcome::Redirect(command)) => Ok(next.cancel(command)),
            Err(error) => {
                warn_log!("Loading route failed: {}", error);
                Ok(next.cancel(error))
            }
        }
    }

    fn name(&self) -> &'static str {
        "LoadRoute"
    }
}

/// Record view ports that keep their component and list the ones to load.
fn determine_what_to_load(
    tree: &mut NavigationTree,
    id: InstructionId,
    to_load: &mut Vec<(InstructionId, String)>,
) {
    let plans: Vec<_> = tree[id]
        .plan
        .as_ref()
        .map(|plans| plans.values().cloned().collect())
        .unwrap_or_default();

    for plan in plans {
        if plan.strategy == ActivationStrategy::Replace {
            to_load.push((id, plan.name.clone()));
        } else if let Some(component) = plan.prev_component {
            trace_log!("Reusing '{}' in view port '{}'", component.module_id(), plan.name);
            let instruction = ViewPortInstruction {
                name: plan.name.clone(),
                strategy: plan.strategy,
                module_id: plan.prev_module_id.clone(),
                component,
                lifecycle_args: tree.lifecycle_args(id),
                child: plan.child,
            };
            tree[id]
                .view_port_instructions
                .insert(plan.name.clone(), instruction);
        }

        if let Some(child) = plan.child {
            determine_what_to_load(tree, child, to_load);
        }
    }
}

fn load_new_route<'a>(
    loader: &'a dyn RouteLoader,
    tree: &'a mut NavigationTree,
    id: InstructionId,
) -> BoxFuture<'a, Result<PlanOutcome>> {
    async move {
        let mut to_load = Vec::new();
        determine_what_to_load(tree, id, &mut to_load);
        for (owner, view_port) in to_load {
            if let PlanOutcome::Redirect(command) = load_route(loader, tree, owner, &view_port).await? {
                return Ok(PlanOutcome::Redirect(command));
            }
        }
        Ok(PlanOutcome::Ready)
    }
    .boxed()
}

async fn load_route(
    loader: &dyn RouteLoader,
    tree: &mut NavigationTree,
    id: InstructionId,
    view_port: &str,
) -> Result<PlanOutcome> {
    let Some(plan) = tree[id]
        .plan
        .as_ref()
        .and_then(|plans| plans.get(view_port))
        .cloned()
    else {
        return Ok(PlanOutcome::Ready);
    };

    let router = tree[id].router.clone();
    let component = load_component(loader, &router, &plan.config, &tree[id]).await?;
    debug_log!(
        "Loaded '{}' into view port '{}'",
        component.module_id(),
        view_port
    );

    let instruction = ViewPortInstruction {
        name: plan.name.clone(),
        strategy: plan.strategy,
        module_id: plan.config.module_id.clone(),
        component: Arc::clone(&component),
        lifecycle_args: tree.lifecycle_args(id),
        child: None,
    };
    tree[id]
        .view_port_instructions
        .insert(plan.name.clone(), instruction);

    let Some(child_router) = component.child_router() else {
        return Ok(PlanOutcome::Ready);
    };

    let path = tree[id].wildcard_path();
    let child = child_router.create_instruction(tree, &path, Some(id)).await?;
    if let Some(plan) = tree[id]
        .plan
        .as_mut()
        .and_then(|plans| plans.get_mut(view_port))
    {
        plan.child = Some(child);
    }

    if let PlanOutcome::Redirect(command) = build_navigation_plan(tree, child, false).await? {
        return Ok(PlanOutcome::Redirect(command));
    }
    if let Some(instruction) = tree[id].view_port_instructions.get_mut(view_port) {
        instruction.child = Some(child);
    }
    load_new_route(loader, tree, child).await
}

async fn load_component(
    loader: &dyn RouteLoader,
    router: &Router,
    config: &ViewPortConfig,
    instruction: &NavigationInstruction,
) -> Result<Arc<Component>> {
    let component = loader.load_route(router, config, instruction).await?;

    if component.child_router().is_none() {
        if let Some(hook) = component.view_model().configure_router_hook() {
            let child_router = router.create_child();
            let mut configuration = RouterConfiguration::new();
            hook.configure_router(&mut configuration, &child_router)
                .resolve()
                .await
                .map_err(|error| RouterError::RouteLoad {
                    module_id: component.module_id().to_string(),
                    message: error.to_string(),
                })?;
            child_router.configure(configuration)?;
            component.set_child_router(child_router);
        }
    }

    Ok(component)
}
