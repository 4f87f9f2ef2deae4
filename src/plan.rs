//! Navigation planning.
//!
//! Before any hook runs, the next instruction tree is compared with the
//! committed one and every view port gets an [`ActivationStrategy`]:
//!
//! 1. A route with a redirect fails planning with a redirect command.
//! 2. Without a previous instruction every view port is replaced.
//! 3. Otherwise, per view port, a different module id means `replace`; an
//!    unchanged one asks, in order, the previous component's
//!    `determine_activation_strategy` hook, the route's fixed strategy, and
//!    finally compares parameters (`invoke-lifecycle` if they differ,
//!    `no-change` if not).
//! 4. View ports that keep their component and host a child router plan the
//!    child router's next instruction recursively. Under an
//!    `invoke-lifecycle` parent, children run at least their lifecycle.

use crate::commands::NavigationCommand;
use crate::config::{ActivationStrategy, RouteConfig, ViewPortConfig};
use crate::error::{Result, RouterError};
use crate::instruction::{
    InstructionId, LifecycleArgs, NavigationInstruction, NavigationTree, ViewPortInstruction,
    ViewPortPlan,
};
use crate::params::RouteParams;
use crate::pipeline::{NavigationContext, Next, PipelineStep, StepOutcome};
use crate::router::Router;
use crate::url::create_rooted_path;
use crate::{debug_log, trace_log};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;

/// Whether planning (or loading) may go on.
#[derive(Debug)]
pub(crate) enum PlanOutcome {
    Ready,
    Redirect(NavigationCommand),
}

/// Plans the whole tree and attaches the plans to the instructions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildNavigationPlanStep;

#[async_trait]
impl PipelineStep for BuildNavigationPlanStep {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        match build_navigation_plan(ctx.tree_mut(), InstructionId::ROOT, false).await {
            Ok(PlanOutcome::Ready) => Ok(next.proceed()),
            Ok(PlanOutcome::Redirect(command)) => Ok(next.cancel(command)),
            Err(error) => Ok(next.cancel(error)),
        }
    }

    fn name(&self) -> &'static str {
        "BuildNavigationPlan"
    }
}

/// Plan instruction `id` and, through child routers, everything below it.
pub(crate) fn build_navigation_plan(
    tree: &mut NavigationTree,
    id: InstructionId,
    force_lifecycle_minimum: bool,
) -> BoxFuture<'_, Result<PlanOutcome>> {
    async move {
        if tree[id].config.redirect.is_some() {
            return build_redirect(tree, id).map(PlanOutcome::Redirect);
        }

        let defaults = tree[id].router.view_port_defaults();
        if tree.previous_of(id).is_none() {
            let plans = tree[id]
                .config
                .view_ports
                .iter()
                .map(|(name, config)| {
                    let plan = ViewPortPlan {
                        name: name.clone(),
                        config: with_defaults(name, config, &defaults),
                        prev_component: None,
                        prev_module_id: None,
                        strategy: ActivationStrategy::Replace,
                        child: None,
                    };
                    (name.clone(), plan)
                })
                .collect();
            debug_log!("First navigation into '{}': replacing every view port", tree[id].fragment);
            tree[id].plan = Some(plans);
            return Ok(PlanOutcome::Ready);
        }

        let (plans, pending) = build_transition_plans(tree, id, &defaults, force_lifecycle_minimum)?;
        tree[id].plan = Some(plans);

        let path = tree[id].wildcard_path();
        for (name, child_router, strategy) in pending {
            let child = child_router.create_instruction(tree, &path, Some(id)).await?;
            if let Some(plan) = tree[id].plan.as_mut().and_then(|plans| plans.get_mut(&name)) {
                plan.child = Some(child);
            }
            let force = strategy == ActivationStrategy::InvokeLifecycle;
            if let PlanOutcome::Redirect(command) = build_navigation_plan(tree, child, force).await? {
                return Ok(PlanOutcome::Redirect(command));
            }
        }
        Ok(PlanOutcome::Ready)
    }
    .boxed()
}

type PendingChild = (String, Router, ActivationStrategy);

fn build_transition_plans(
    tree: &NavigationTree,
    id: InstructionId,
    defaults: &BTreeMap<String, ViewPortConfig>,
    force_lifecycle_minimum: bool,
) -> Result<(BTreeMap<String, ViewPortPlan>, Vec<PendingChild>)> {
    let next = &tree[id];
    let Some(prev) = tree.previous_of(id) else {
        return Ok((BTreeMap::new(), Vec::new()));
    };
    let args = tree.lifecycle_args(id);
    let has_new_params = has_different_parameter_values(prev, next);

    let mut plans = BTreeMap::new();
    let mut pending = Vec::new();
    for (name, prev_instruction) in &prev.view_port_instructions {
        let config = next
            .config
            .view_ports
            .get(name)
            .ok_or_else(|| RouterError::ViewPortConfigMismatch { name: name.clone() })?;
        let plan = determine_view_port_plan(
            prev_instruction,
            with_defaults(name, config, defaults),
            &next.config,
            &args,
            has_new_params || force_lifecycle_minimum,
        );

        if plan.strategy != ActivationStrategy::Replace {
            if let Some(child_router) = prev_instruction.child_router() {
                pending.push((name.clone(), child_router, plan.strategy));
            }
        }
        plans.insert(name.clone(), plan);
    }

    for (name, config) in &next.config.view_ports {
        if !plans.contains_key(name) {
            trace_log!("View port '{}' is new: replace", name);
            plans.insert(
                name.clone(),
                ViewPortPlan {
                    name: name.clone(),
                    config: with_defaults(name, config, defaults),
                    prev_component: None,
                    prev_module_id: None,
                    strategy: ActivationStrategy::Replace,
                    child: None,
                },
            );
        }
    }

    Ok((plans, pending))
}

fn determine_view_port_plan(
    prev: &ViewPortInstruction,
    config: ViewPortConfig,
    route: &RouteConfig,
    args: &LifecycleArgs,
    lifecycle_required: bool,
) -> ViewPortPlan {
    let view_model = prev.component.view_model();
    let strategy = if prev.module_id != config.module_id {
        ActivationStrategy::Replace
    } else if let Some(hook) = view_model.determine_activation_strategy_hook() {
        hook.determine_activation_strategy(args)
    } else if let Some(strategy) = route.activation_strategy {
        strategy
    } else if lifecycle_required {
        ActivationStrategy::InvokeLifecycle
    } else {
        ActivationStrategy::NoChange
    };
    debug_log!("View port '{}' planned as {}", prev.name, strategy);

    ViewPortPlan {
        name: prev.name.clone(),
        config,
        prev_component: Some(prev.component.clone()),
        prev_module_id: prev.module_id.clone(),
        strategy,
        child: None,
    }
}

fn with_defaults(
    name: &str,
    config: &ViewPortConfig,
    defaults: &BTreeMap<String, ViewPortConfig>,
) -> ViewPortConfig {
    match (&config.module_id, defaults.get(name)) {
        (None, Some(default)) => default.clone(),
        _ => config.clone(),
    }
}

/// Compare route parameters (and, if enabled, query parameters) of two
/// instructions, ignoring the child-route pass-through parameter.
pub fn has_different_parameter_values(
    prev: &NavigationInstruction,
    next: &NavigationInstruction,
) -> bool {
    let wildcard = next
        .config
        .has_child_router()
        .then(|| next.wildcard_name());
    if next.params.differs_from(&prev.params, wildcard) {
        return true;
    }
    next.options.compare_query_params && next.query_params != prev.query_params
}

fn build_redirect(tree: &NavigationTree, id: InstructionId) -> Result<NavigationCommand> {
    let instruction = &tree[id];
    let router = &instruction.router;
    let target = instruction.config.redirect.as_deref().unwrap_or_default();
    let recognized = router
        .recognize(target)
        .ok_or_else(|| RouterError::RouteNotFound {
            url: target.to_string(),
        })?;

    let mut params = RouteParams::new();
    for (key, value) in recognized.params.iter() {
        match value.strip_prefix(':') {
            Some(source) => {
                if let Some(original) = instruction.params.get(source) {
                    params.set(key, original);
                }
            }
            None => params.set(key, value),
        }
    }

    let path = router.generate_for_config(&recognized.handler, &params)?;
    let base = tree.ancestor_base_url(id);
    let mut location = create_rooted_path(&path, &base, router.has_push_state(), false);
    if !instruction.query_string.is_empty() {
        location.push('?');
        location.push_str(&instruction.query_string);
    }
    debug_log!("Route '{}' redirects to '{}'", instruction.config.route(), location);
    Ok(NavigationCommand::redirect(location))
}
