//! Branch scopes.
//!
//! For each branching condition the builder computes the set of node ids
//! reachable only on the true edge and only on the false edge, within the
//! owning method. A node reachable from both branch heads sits past the
//! reconvergence point and belongs to neither scope.

use crate::edge::{BranchComparison, ControlFlowKind, EdgeKind};
use crate::graph::ProgramGraph;
use jflow_common::NodeId;
use jflow_common::descriptor::MethodDescriptor;
use jflow_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::trace;

/// The partition of control-dependent nodes under one condition.
#[derive(Clone, Debug)]
pub struct BranchScope {
    pub condition: NodeId,
    pub owning_method: MethodDescriptor,
    pub comparison: BranchComparison,
    pub true_nodes: FxHashSet<NodeId>,
    pub false_nodes: FxHashSet<NodeId>,
}

impl BranchScope {
    /// The nodes dead when the branch of `kind` is never taken.
    #[must_use]
    pub fn nodes_of(&self, kind: ControlFlowKind) -> &FxHashSet<NodeId> {
        match kind {
            ControlFlowKind::BranchTrue => &self.true_nodes,
            _ => &self.false_nodes,
        }
    }
}

/// All branch scopes of a graph, indexed by condition node.
#[derive(Debug)]
pub(crate) struct BranchScopes {
    scopes: Vec<BranchScope>,
    by_condition: FxHashMap<NodeId, Vec<usize>>,
}

impl BranchScopes {
    pub(crate) fn build(graph: &ProgramGraph) -> Self {
        // Pair each condition's true and false heads.
        struct Heads {
            true_to: Option<NodeId>,
            false_to: Option<NodeId>,
            comparison: Option<BranchComparison>,
            order: usize,
        }
        let mut heads: FxHashMap<NodeId, Heads> = FxHashMap::default();
        let mut conditions: Vec<NodeId> = Vec::new();
        for edge in graph.edges() {
            let EdgeKind::ControlFlow { kind, comparison } = edge.kind else {
                continue;
            };
            if !kind.is_branch() {
                continue;
            }
            let entry = heads.entry(edge.from).or_insert_with(|| {
                conditions.push(edge.from);
                Heads {
                    true_to: None,
                    false_to: None,
                    comparison: None,
                    order: conditions.len() - 1,
                }
            });
            match kind {
                ControlFlowKind::BranchTrue => entry.true_to.get_or_insert(edge.to),
                _ => entry.false_to.get_or_insert(edge.to),
            };
            if entry.comparison.is_none() {
                entry.comparison = comparison;
            }
        }

        let mut scopes: Vec<BranchScope> = Vec::new();
        let mut by_condition: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();
        conditions.sort_by_key(|c| heads[c].order);
        for condition in conditions {
            let entry = &heads[&condition];
            let (Some(true_to), Some(false_to), Some(comparison)) =
                (entry.true_to, entry.false_to, entry.comparison)
            else {
                trace!(target: "jflow", %condition, "condition without paired branch edges");
                continue;
            };
            let Some(owner) = graph.node(condition).and_then(|n| n.owning_method()).cloned()
            else {
                trace!(target: "jflow", %condition, "condition node has no owning method");
                continue;
            };
            let reach_true = reachable_in_method(graph, true_to, &owner);
            let reach_false = reachable_in_method(graph, false_to, &owner);
            let scope = BranchScope {
                condition,
                owning_method: owner,
                comparison,
                true_nodes: reach_true.difference(&reach_false).copied().collect(),
                false_nodes: reach_false.difference(&reach_true).copied().collect(),
            };
            by_condition
                .entry(condition)
                .or_default()
                .push(scopes.len());
            scopes.push(scope);
        }

        Self {
            scopes,
            by_condition,
        }
    }

    pub(crate) fn all(&self) -> &[BranchScope] {
        &self.scopes
    }

    pub(crate) fn for_condition(&self, condition: NodeId) -> impl Iterator<Item = &BranchScope> {
        self.by_condition
            .get(&condition)
            .into_iter()
            .flatten()
            .map(|&i| &self.scopes[i])
    }
}

/// Forward reachability from `start` over sequential/switch/exception/return
/// control edges, restricted to nodes owned by `owner`.
fn reachable_in_method(
    graph: &ProgramGraph,
    start: NodeId,
    owner: &MethodDescriptor,
) -> FxHashSet<NodeId> {
    let mut reached: FxHashSet<NodeId> = FxHashSet::default();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    if in_method(graph, start, owner) {
        reached.insert(start);
        queue.push_back(start);
    }
    let mut iterations = 0usize;
    while let Some(current) = queue.pop_front() {
        iterations += 1;
        if iterations > MAX_SCOPE_WALK_ITERATIONS {
            trace!(target: "jflow", %start, "scope walk exceeded iteration cap");
            break;
        }
        for (edge, kind) in graph.outgoing_control(current) {
            if !kind.is_scope_walk() {
                continue;
            }
            if in_method(graph, edge.to, owner) && reached.insert(edge.to) {
                queue.push_back(edge.to);
            }
        }
    }
    reached
}

fn in_method(graph: &ProgramGraph, id: NodeId, owner: &MethodDescriptor) -> bool {
    graph
        .node(id)
        .and_then(|n| n.owning_method())
        .is_some_and(|m| m == owner)
}
