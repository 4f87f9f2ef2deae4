//! Navigation instructions and the per-navigation instruction tree.
//!
//! Every navigation produces one [`NavigationTree`]: an arena of
//! [`NavigationInstruction`]s, one per router level, addressed by
//! [`InstructionId`]. The root instruction always sits at
//! [`InstructionId::ROOT`]; child instructions point at their parent by id.
//!
//! While a navigation runs, the tree also holds the previously committed tree
//! and every instruction remembers which instruction it replaces there. On
//! commit both links and all plans are pruned, and the tree is frozen behind
//! an `Arc` that routers reference weakly through [`InstructionRef`].
//!
//! ```text
//! NavigationTree                          previous: Arc<NavigationTree>
//! ┌──────────────────────────────┐        ┌──────────────────────────┐
//! │ #0 /users/43  (root router)  │ ─prev─▶│ #0 /users/42             │
//! │ #1 posts      (child, ↑ #0)  │ ─prev─▶│ #1 profile               │
//! └──────────────────────────────┘        └──────────────────────────┘
//! ```

use crate::component::Component;
use crate::config::{ActivationStrategy, RouteConfig, ViewPortConfig};
use crate::params::{QueryParams, RouteParams};
use crate::router::Router;
use crate::url::trim_slashes;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, Index, IndexMut};
use std::sync::Arc;

/// Index of an instruction inside its [`NavigationTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstructionId(usize);

impl InstructionId {
    pub const ROOT: Self = Self(0);

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-instruction switches copied from the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionOptions {
    pub compare_query_params: bool,
}

/// What the lifecycle hooks of a view port receive.
#[derive(Debug, Clone)]
pub struct LifecycleArgs {
    /// Query parameters (first value per key), overridden by the parameters
    /// of every router level from the root down.
    pub params: RouteParams,
    pub config: Arc<RouteConfig>,
    pub fragment: String,
    pub query_string: String,
    pub query_params: QueryParams,
}

/// Planning decision for one view port.
#[derive(Debug, Clone)]
pub struct ViewPortPlan {
    pub name: String,
    pub config: ViewPortConfig,
    pub prev_component: Option<Arc<Component>>,
    pub prev_module_id: Option<String>,
    pub strategy: ActivationStrategy,
    /// Instruction for the child router hosted in this view port.
    pub child: Option<InstructionId>,
}

/// Execution record for one view port.
#[derive(Debug, Clone)]
pub struct ViewPortInstruction {
    pub name: String,
    pub strategy: ActivationStrategy,
    pub module_id: Option<String>,
    pub component: Arc<Component>,
    pub lifecycle_args: LifecycleArgs,
    pub child: Option<InstructionId>,
}

impl ViewPortInstruction {
    pub fn child_router(&self) -> Option<Router> {
        self.component.child_router()
    }
}

/// One resolved navigation request at one router level.
#[derive(Debug, Clone)]
pub struct NavigationInstruction {
    pub fragment: String,
    pub query_string: String,
    pub params: RouteParams,
    pub query_params: QueryParams,
    pub config: Arc<RouteConfig>,
    pub options: InstructionOptions,
    pub(crate) router: Router,
    pub(crate) parent: Option<InstructionId>,
    pub(crate) previous: Option<InstructionId>,
    pub(crate) plan: Option<BTreeMap<String, ViewPortPlan>>,
    pub(crate) view_port_instructions: BTreeMap<String, ViewPortInstruction>,
}

impl NavigationInstruction {
    pub(crate) fn new(
        router: Router,
        fragment: String,
        query_string: String,
        params: RouteParams,
        query_params: QueryParams,
        config: Arc<RouteConfig>,
        parent: Option<InstructionId>,
    ) -> Self {
        let options = InstructionOptions {
            compare_query_params: router.options().compare_query_params,
        };
        Self {
            fragment,
            query_string,
            params,
            query_params,
            config,
            options,
            router,
            parent,
            previous: None,
            plan: None,
            view_port_instructions: BTreeMap::new(),
        }
    }

    /// Router that produced this instruction.
    pub const fn router(&self) -> &Router {
        &self.router
    }

    pub const fn parent(&self) -> Option<InstructionId> {
        self.parent
    }

    /// Instruction this one replaces, in the previous tree.
    pub const fn previous(&self) -> Option<InstructionId> {
        self.previous
    }

    pub const fn plan(&self) -> Option<&BTreeMap<String, ViewPortPlan>> {
        self.plan.as_ref()
    }

    pub const fn view_port_instructions(&self) -> &BTreeMap<String, ViewPortInstruction> {
        &self.view_port_instructions
    }

    pub fn view_port_instruction(&self, name: &str) -> Option<&ViewPortInstruction> {
        self.view_port_instructions.get(name)
    }

    pub fn wildcard_name(&self) -> &str {
        self.config.wildcard_name()
    }

    fn wildcard_value(&self) -> &str {
        let name = self.wildcard_name();
        if name.is_empty() {
            return "";
        }
        self.params.get(name).unwrap_or("")
    }

    /// Remaining path for a child router, query string included.
    pub fn wildcard_path(&self) -> String {
        let mut path = self.wildcard_value().to_string();
        if !self.query_string.is_empty() {
            path.push('?');
            path.push_str(&self.query_string);
        }
        path
    }

    /// The part of the fragment consumed by this router level.
    pub fn base_url(&self) -> String {
        let mut fragment = self.fragment.clone();
        if trim_slashes(&fragment).is_empty() {
            if let Some(route) = self.router.non_empty_route_named(self.config.name.as_deref()) {
                fragment = route;
            }
        }

        let path = self.wildcard_value();
        if path.is_empty() {
            return fragment;
        }
        match fragment.rfind(path) {
            Some(index) => fragment[..index].to_string(),
            None => fragment,
        }
    }
}

/// Arena of the instructions of one navigation.
#[derive(Debug, Default)]
pub struct NavigationTree {
    nodes: Vec<NavigationInstruction>,
    previous: Option<Arc<NavigationTree>>,
}

impl NavigationTree {
    pub(crate) fn new(root: NavigationInstruction) -> Self {
        Self {
            nodes: vec![root],
            previous: None,
        }
    }

    pub(crate) fn push(&mut self, instruction: NavigationInstruction) -> InstructionId {
        self.nodes.push(instruction);
        InstructionId(self.nodes.len() - 1)
    }

    pub fn root(&self) -> &NavigationInstruction {
        &self[InstructionId::ROOT]
    }

    pub fn get(&self, id: InstructionId) -> Option<&NavigationInstruction> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Instructions with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (InstructionId, &NavigationInstruction)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (InstructionId(index), node))
    }

    /// The committed tree this navigation replaces.
    pub fn previous_tree(&self) -> Option<&Arc<NavigationTree>> {
        self.previous.as_ref()
    }

    /// Instruction `id` replaces.
    pub fn previous_of(&self, id: InstructionId) -> Option<&NavigationInstruction> {
        let previous = self[id].previous?;
        self.previous.as_deref()?.get(previous)
    }

    pub(crate) fn attach_previous(
        &mut self,
        previous: Option<Arc<NavigationTree>>,
        root_previous: Option<InstructionId>,
    ) {
        self.nodes[0].previous = previous.as_ref().and(root_previous);
        self.previous = previous;
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn lineage(&self, id: InstructionId) -> Vec<InstructionId> {
        let mut chain = vec![id];
        let mut current = self[id].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self[parent].parent;
        }
        chain.reverse();
        chain
    }

    /// Merged parameters handed to the hooks of instruction `id`.
    pub fn lifecycle_args(&self, id: InstructionId) -> LifecycleArgs {
        let node = &self[id];
        let mut params = RouteParams::new();
        for (key, value) in node.query_params.iter_first() {
            params.set(key, value);
        }
        for level in self.lineage(id) {
            let ancestor = &self[level];
            let mut level_params = ancestor.params.clone();
            if ancestor.config.has_child_router() {
                level_params.remove(ancestor.wildcard_name());
            }
            params.extend(&level_params);
        }

        LifecycleArgs {
            params,
            config: Arc::clone(&node.config),
            fragment: node.fragment.clone(),
            query_string: node.query_string.clone(),
            query_params: node.query_params.clone(),
        }
    }

    /// Base URL of the router that owns instruction `id`, computed from the
    /// instructions above it.
    pub fn ancestor_base_url(&self, id: InstructionId) -> String {
        let lineage = self.lineage(id);
        let ancestors = &lineage[..lineage.len() - 1];
        let Some(&top) = ancestors.first() else {
            return self[id].router.base_url();
        };
        let mut base = self[top].router.base_url();
        for &ancestor in ancestors {
            base.push_str(&self[ancestor].base_url());
        }
        base
    }

    /// Drop previous-tree links and plans once the navigation is committed.
    pub(crate) fn prune(&mut self) {
        for node in &mut self.nodes {
            node.previous = None;
            node.plan = None;
        }
        self.previous = None;
    }
}

impl Index<InstructionId> for NavigationTree {
    type Output = NavigationInstruction;

    fn index(&self, id: InstructionId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl IndexMut<InstructionId> for NavigationTree {
    fn index_mut(&mut self, id: InstructionId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}

/// Handle to an instruction of a committed tree.
#[derive(Clone)]
pub struct InstructionRef {
    tree: Arc<NavigationTree>,
    id: InstructionId,
}

impl InstructionRef {
    pub(crate) const fn new(tree: Arc<NavigationTree>, id: InstructionId) -> Self {
        Self { tree, id }
    }

    pub const fn tree(&self) -> &Arc<NavigationTree> {
        &self.tree
    }

    pub const fn id(&self) -> InstructionId {
        self.id
    }

    pub fn lifecycle_args(&self) -> LifecycleArgs {
        self.tree.lifecycle_args(self.id)
    }
}

impl Deref for InstructionRef {
    type Target = NavigationInstruction;

    fn deref(&self) -> &Self::Target {
        &self.tree[self.id]
    }
}

impl fmt::Debug for InstructionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionRef")
            .field("id", &self.id)
            .field("fragment", &self.fragment)
            .finish()
    }
}
