//! Committing a navigation.
//!
//! The commit step flips nav models, hands every replaced view port to its
//! [`ViewPort`](crate::viewport::ViewPort), prunes the tree and makes it the
//! current one for every router it touched. Swaps are deferred per router
//! level: siblings are processed concurrently and only swapped once all of
//! them settled.

use crate::config::ActivationStrategy;
use crate::error::{Result, RouterError};
use crate::instruction::{InstructionId, NavigationTree};
use crate::pipeline::{NavigationContext, Next, PipelineStep, StepOutcome};
use crate::{debug_log, info_log, warn_log};
use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::sync::Arc;

/// Applies the planned changes. Runs after the point of no return.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitChangesStep;

#[async_trait]
impl PipelineStep for CommitChangesStep {
    async fn run(&self, ctx: &mut NavigationContext, next: Next) -> Result<StepOutcome> {
        if let Err(error) = commit_instruction(ctx.tree(), InstructionId::ROOT, true).await {
            warn_log!("Commit of '{}' failed: {}", ctx.instruction().fragment, error);
            return Ok(next.reject(error));
        }

        ctx.tree_mut().prune();
        let tree = ctx.freeze();
        for (id, instruction) in tree.iter() {
            instruction.router().set_current_instruction(&tree, id);
        }
        ctx.app().set_current_tree(Arc::clone(&tree));
        info_log!("Committed navigation to '{}'", tree.root().fragment);

        let separator = ctx.app().router().title_separator();
        let title = build_title(&tree, InstructionId::ROOT, &separator);
        if !title.is_empty() {
            ctx.app().history().set_title(&title);
        }
        Ok(next.proceed())
    }

    fn name(&self) -> &'static str {
        "CommitChanges"
    }
}

fn commit_instruction(
    tree: &NavigationTree,
    id: InstructionId,
    wait_to_swap: bool,
) -> BoxFuture<'_, Result<()>> {
    async move {
        let instruction = &tree[id];
        let router = instruction.router();

        if let Some(model) = tree
            .previous_of(id)
            .and_then(|previous| previous.config.nav_model())
        {
            model.set_active(false);
        }
        if let Some(model) = instruction.config.nav_model() {
            model.set_active(true);
        }
        if instruction.parent().is_some() {
            router.set_base_url(tree.ancestor_base_url(id));
        }
        router.refresh_navigation();

        let mut loads = Vec::new();
        let mut delayed = Vec::new();
        for (name, view_port_instruction) in instruction.view_port_instructions() {
            let view_port = router.view_port(name).ok_or_else(|| RouterError::MissingViewPort {
                name: name.clone(),
                module_id: view_port_instruction
                    .module_id
                    .clone()
                    .unwrap_or_else(|| view_port_instruction.component.module_id().to_string()),
            })?;
            let child = view_port_instruction.child;

            if view_port_instruction.strategy == ActivationStrategy::Replace {
                debug_log!(
                    "Processing '{}' into view port '{}'",
                    view_port_instruction.component.module_id(),
                    name
                );
                if wait_to_swap {
                    delayed.push((Arc::clone(&view_port), view_port_instruction));
                }
                loads.push(
                    async move {
                        view_port.process(view_port_instruction, wait_to_swap).await?;
                        match child {
                            Some(child) => commit_instruction(tree, child, wait_to_swap).await,
                            None => Ok(()),
                        }
                    }
                    .boxed(),
                );
            } else if let Some(child) = child {
                loads.push(commit_instruction(tree, child, wait_to_swap));
            }
        }

        try_join_all(loads).await?;
        for (view_port, view_port_instruction) in delayed {
            view_port.swap(view_port_instruction);
        }
        Ok(())
    }
    .boxed()
}

/// Title of instruction `id`: child titles first, then its own nav-model
/// title, then the router title, joined by `separator`.
pub(crate) fn build_title(tree: &NavigationTree, id: InstructionId, separator: &str) -> String {
    let instruction = &tree[id];
    let router = instruction.router();

    let mut title = instruction
        .config
        .nav_model()
        .and_then(|model| model.title())
        .map(|title| router.transform_title(&title))
        .unwrap_or_default();

    let child_titles: Vec<String> = instruction
        .view_port_instructions()
        .values()
        .filter_map(|view_port| view_port.child)
        .map(|child| build_title(tree, child, separator))
        .filter(|title| !title.is_empty())
        .collect();
    if !child_titles.is_empty() {
        let mut joined = child_titles.join(separator);
        if !title.is_empty() {
            joined.push_str(separator);
        }
        joined.push_str(&title);
        title = joined;
    }

    if let Some(router_title) = router.title() {
        if !title.is_empty() {
            title.push_str(separator);
        }
        title.push_str(&router.transform_title(&router_title));
    }
    title
}
