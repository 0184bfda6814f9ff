//! Branch reachability under assumed call results.
//!
//! Each assumption fixes the value produced by every call site matching a
//! method pattern (optionally narrowed to call sites whose argument slice
//! contains a given constant). Assumed values propagate forward through
//! dataflow to the first branch condition they feed; decidable conditions
//! kill one branch scope, and the dead-method closure then iterates to a
//! fixpoint over the finite method universe.

use crate::slicer::{SliceCache, resolve_value};
use jflow_common::descriptor::MethodDescriptor;
use jflow_common::limits::MAX_REACHABILITY_ITERATIONS;
use jflow_common::options::{AnalysisOptions, SliceOptions};
use jflow_common::pattern::MethodPattern;
use jflow_common::NodeId;
use jflow_graph::{
    CompareOp, ConstantValue, ControlFlowKind, DataFlowKind, EdgeKind, Node, ProgramGraph,
};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, trace};

// =============================================================================
// Inputs and outputs
// =============================================================================

/// One assumed call result.
#[derive(Clone, Debug, Serialize)]
pub struct Assumption {
    /// Which callees the assumption applies to.
    pub method_pattern: MethodPattern,
    /// When set, only call sites whose backward slice at this argument
    /// position contains `argument_value` are bound.
    pub argument_index: Option<usize>,
    pub argument_value: Option<ConstantValue>,
    /// The value every bound call site is assumed to produce.
    pub assumed_result: ConstantValue,
}

impl Assumption {
    #[must_use]
    pub fn new(method_pattern: MethodPattern, assumed_result: ConstantValue) -> Self {
        Self {
            method_pattern,
            argument_index: None,
            argument_value: None,
            assumed_result,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, index: usize, value: ConstantValue) -> Self {
        self.argument_index = Some(index);
        self.argument_value = Some(value);
        self
    }
}

/// A branch scope proven unreachable.
#[derive(Clone, Debug, Serialize)]
pub struct DeadBranch {
    pub condition: NodeId,
    /// Which side of the condition is dead.
    pub dead_kind: ControlFlowKind,
    pub owning_method: MethodDescriptor,
    /// Every node id in the dead scope, ascending.
    pub dead_nodes: Vec<NodeId>,
    /// The call sites among `dead_nodes`, ascending.
    pub dead_call_sites: Vec<NodeId>,
}

/// The full outcome of a reachability run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DeadCodeResult {
    pub dead_branches: Vec<DeadBranch>,
    /// Methods whose every call site lies in dead or unreachable code.
    pub dead_methods: Vec<MethodDescriptor>,
    /// Call sites in dead scopes or inside dead methods, ascending.
    pub dead_call_sites: Vec<NodeId>,
    /// Methods no surviving call site references at all. Disjoint from
    /// `dead_methods`.
    pub unreferenced_methods: Vec<MethodDescriptor>,
}

// =============================================================================
// Engine
// =============================================================================

/// What forward propagation knows about one node.
#[derive(Clone, Debug, PartialEq)]
enum Propagated {
    Known(ConstantValue),
    Conflicting,
}

pub struct ReachabilityEngine<'g> {
    graph: &'g ProgramGraph,
    options: &'g AnalysisOptions,
    cache: &'g SliceCache,
}

impl<'g> ReachabilityEngine<'g> {
    #[must_use]
    pub fn new(graph: &'g ProgramGraph, options: &'g AnalysisOptions, cache: &'g SliceCache) -> Self {
        Self {
            graph,
            options,
            cache,
        }
    }

    /// Run the engine for a set of assumptions.
    #[must_use]
    pub fn analyze(&self, assumptions: &[Assumption]) -> DeadCodeResult {
        let assumed = self.bind_assumptions(assumptions);
        debug!(target: "jflow", bound = assumed.len(), "assumptions bound to call sites");
        let values = self.propagate(&assumed);
        let dead_branches = self.decide_branches(&values);
        self.close_over_dead_methods(dead_branches)
    }

    // =========================================================================
    // Step 1: bind assumptions to call sites
    // =========================================================================

    fn bind_assumptions(&self, assumptions: &[Assumption]) -> FxHashMap<NodeId, ConstantValue> {
        let mut assumed: FxHashMap<NodeId, ConstantValue> = FxHashMap::default();
        for assumption in assumptions {
            for call in self.graph.call_sites(&assumption.method_pattern) {
                if let (Some(index), Some(wanted)) =
                    (assumption.argument_index, &assumption.argument_value)
                {
                    let Some(&argument) = call.arguments.get(index) else {
                        continue;
                    };
                    let slice = self
                        .cache
                        .slice(self.graph, argument, SliceOptions::default());
                    if !slice.contains_value(self.graph, wanted) {
                        continue;
                    }
                }
                if assumed
                    .insert(call.id, assumption.assumed_result.clone())
                    .is_some()
                {
                    trace!(target: "jflow", call = %call.id, "call site bound by multiple assumptions; last wins");
                }
            }
        }
        assumed
    }

    // =========================================================================
    // Step 2: forward propagation
    // =========================================================================

    /// Push each assumed value forward along dataflow until it feeds a
    /// condition. A node fed two different values becomes `Conflicting` and
    /// stops propagating (the branch is indeterminate, never dead).
    fn propagate(&self, assumed: &FxHashMap<NodeId, ConstantValue>) -> FxHashMap<NodeId, Propagated> {
        let mut values: FxHashMap<NodeId, Propagated> = FxHashMap::default();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        for (&call, value) in assumed {
            values.insert(call, Propagated::Known(value.clone()));
            queue.push_back(call);
        }

        while let Some(node) = queue.pop_front() {
            let Some(current) = values.get(&node).cloned() else {
                continue;
            };
            if node_is_condition(self.graph, node) {
                continue;
            }
            for (edge, kind) in self.graph.outgoing_dataflow(node) {
                if !propagates(kind) {
                    continue;
                }
                let next = match (&current, values.get(&edge.to)) {
                    (_, Some(Propagated::Conflicting)) => continue,
                    (Propagated::Conflicting, _) => Propagated::Conflicting,
                    (Propagated::Known(value), None) => Propagated::Known(value.clone()),
                    (Propagated::Known(value), Some(Propagated::Known(existing))) => {
                        if existing == value {
                            continue;
                        }
                        trace!(target: "jflow", node = %edge.to, "conflicting values meet; node is indeterminate");
                        Propagated::Conflicting
                    }
                };
                values.insert(edge.to, next);
                queue.push_back(edge.to);
            }
        }
        values
    }

    // =========================================================================
    // Step 3/4: decide branches, materialise dead scopes
    // =========================================================================

    fn decide_branches(&self, values: &FxHashMap<NodeId, Propagated>) -> Vec<DeadBranch> {
        let mut dead = Vec::new();
        for scope in self.graph.branch_scopes() {
            let Some(Propagated::Known(value)) = values.get(&scope.condition) else {
                continue;
            };
            let Some(comparand) = self.constant_of(scope.comparison.comparand) else {
                // Comparand is not a statically known constant; the
                // condition is indeterminate and simply omitted.
                continue;
            };
            let Some(take) = eval(
                &resolve_value(self.graph, value),
                scope.comparison.op,
                &resolve_value(self.graph, &comparand),
            ) else {
                continue;
            };
            let dead_kind = if take {
                ControlFlowKind::BranchFalse
            } else {
                ControlFlowKind::BranchTrue
            };
            let scope_nodes = scope.nodes_of(dead_kind);
            let mut dead_nodes: Vec<NodeId> = scope_nodes.iter().copied().collect();
            dead_nodes.sort_unstable();
            let mut dead_call_sites: Vec<NodeId> = dead_nodes
                .iter()
                .copied()
                .filter(|&id| self.graph.call_site(id).is_some())
                .collect();
            dead_call_sites.sort_unstable();
            dead.push(DeadBranch {
                condition: scope.condition,
                dead_kind,
                owning_method: scope.owning_method.clone(),
                dead_nodes,
                dead_call_sites,
            });
        }
        dead
    }

    fn constant_of(&self, id: NodeId) -> Option<ConstantValue> {
        match self.graph.node(id)? {
            Node::Constant(constant) => Some(constant.value.clone()),
            _ => None,
        }
    }

    // =========================================================================
    // Step 5: transitive closure
    // =========================================================================

    fn close_over_dead_methods(&self, dead_branches: Vec<DeadBranch>) -> DeadCodeResult {
        let graph = self.graph;
        let entry_points = compile_entry_points(&self.options.entry_points);
        let is_entry = |signature: &str| entry_points.iter().any(|re| re.is_match(signature));

        let mut dead_scope_calls: FxHashSet<NodeId> = FxHashSet::default();
        for branch in &dead_branches {
            dead_scope_calls.extend(branch.dead_call_sites.iter().copied());
        }

        // Methods never called at all, minus entry points, synthetics, and
        // constructors.
        let mut unreferenced: FxHashSet<String> = FxHashSet::default();
        for info in graph.all_methods() {
            let descriptor = &info.descriptor;
            let signature = descriptor.signature();
            if !graph.call_sites_calling(&signature).is_empty() {
                continue;
            }
            if is_entry(&signature)
                || self.is_synthetic(descriptor)
                || descriptor.is_constructor()
            {
                continue;
            }
            unreferenced.insert(signature);
        }

        // Fixpoint: a method is dead when every call site referencing it is
        // in a dead scope or belongs to a dead/unreferenced caller.
        let mut dead_methods: FxHashSet<String> = FxHashSet::default();
        let mut iterations = 0usize;
        loop {
            iterations += 1;
            if iterations > MAX_REACHABILITY_ITERATIONS {
                trace!(target: "jflow", "dead-method fixpoint exceeded iteration cap");
                break;
            }
            let mut changed = false;
            for info in graph.all_methods() {
                let signature = info.descriptor.signature();
                if dead_methods.contains(&signature) || unreferenced.contains(&signature) {
                    continue;
                }
                if is_entry(&signature) {
                    continue;
                }
                let callers = graph.call_sites_calling(&signature);
                if callers.is_empty() {
                    continue;
                }
                let all_dead = callers.iter().all(|&call| {
                    if dead_scope_calls.contains(&call) {
                        return true;
                    }
                    graph.call_site(call).is_some_and(|c| {
                        let caller = c.caller.signature();
                        dead_methods.contains(&caller) || unreferenced.contains(&caller)
                    })
                });
                if all_dead {
                    dead_methods.insert(signature);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // Constructors surface as unreferenced only once their entire class
        // is gone.
        for info in graph.all_methods() {
            let descriptor = &info.descriptor;
            if !descriptor.is_constructor() {
                continue;
            }
            let signature = descriptor.signature();
            if !graph.call_sites_calling(&signature).is_empty() || is_entry(&signature) {
                continue;
            }
            let class = &descriptor.declaring_class.class_name;
            let mut siblings = graph
                .all_methods()
                .filter(|other| &other.descriptor.declaring_class.class_name == class)
                .filter(|other| !other.descriptor.is_constructor())
                .peekable();
            if siblings.peek().is_some()
                && siblings.all(|other| {
                    let sibling = other.descriptor.signature();
                    dead_methods.contains(&sibling) || unreferenced.contains(&sibling)
                })
            {
                unreferenced.insert(signature);
            }
        }

        // Transitively dead call sites: scope-dead plus everything inside a
        // dead method.
        let mut dead_call_sites: Vec<NodeId> = dead_scope_calls.iter().copied().collect();
        for call in graph.call_site_nodes() {
            if dead_methods.contains(&call.caller.signature())
                && !dead_scope_calls.contains(&call.id)
            {
                dead_call_sites.push(call.id);
            }
        }
        dead_call_sites.sort_unstable();

        // Report in method registration order for determinism.
        let dead_method_list: Vec<MethodDescriptor> = graph
            .all_methods()
            .filter(|info| dead_methods.contains(&info.descriptor.signature()))
            .map(|info| info.descriptor.clone())
            .collect();
        let unreferenced_list: Vec<MethodDescriptor> = graph
            .all_methods()
            .filter(|info| unreferenced.contains(&info.descriptor.signature()))
            .map(|info| info.descriptor.clone())
            .collect();

        DeadCodeResult {
            dead_branches,
            dead_methods: dead_method_list,
            dead_call_sites,
            unreferenced_methods: unreferenced_list,
        }
    }

    /// Compiler-generated names, plus `values`/`valueOf` on enum classes
    /// only.
    fn is_synthetic(&self, descriptor: &MethodDescriptor) -> bool {
        if descriptor.has_synthetic_name() {
            return true;
        }
        (descriptor.name == "values" || descriptor.name == "valueOf")
            && self
                .graph
                .is_enum_class(&descriptor.declaring_class.class_name)
    }
}

fn compile_entry_points(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(err) => {
                debug!(target: "jflow", pattern = p.as_str(), %err, "invalid entry-point regex ignored");
                None
            }
        })
        .collect()
}

fn node_is_condition(graph: &ProgramGraph, id: NodeId) -> bool {
    graph.outgoing(id).any(|edge| {
        matches!(
            edge.kind,
            EdgeKind::ControlFlow { kind, .. } if kind.is_branch()
        )
    })
}

fn propagates(kind: DataFlowKind) -> bool {
    matches!(
        kind,
        DataFlowKind::Assign
            | DataFlowKind::ParameterPass
            | DataFlowKind::ReturnValue
            | DataFlowKind::FieldLoad
            | DataFlowKind::FieldStore
            | DataFlowKind::Phi
    )
}

// =============================================================================
// Comparison evaluation
// =============================================================================

/// Evaluate `value <op> comparand` when both operands are of compatible
/// primitive kinds; anything else is indeterminate.
#[must_use]
pub fn eval(value: &ConstantValue, op: CompareOp, comparand: &ConstantValue) -> Option<bool> {
    use ConstantValue::{Bool, Double, Float, Int, Long, Null, Str};
    match (value, comparand) {
        (Int(a), Int(b)) => Some(compare_longs(i64::from(*a), i64::from(*b), op)),
        (Long(a), Long(b)) => Some(compare_longs(*a, *b, op)),
        (Int(a), Long(b)) => Some(compare_longs(i64::from(*a), *b, op)),
        (Long(a), Int(b)) => Some(compare_longs(*a, i64::from(*b), op)),
        (Float(_) | Double(_), _) | (_, Float(_) | Double(_)) => {
            let a = as_double(value)?;
            let b = as_double(comparand)?;
            Some(compare_doubles(a, b, op))
        }
        (Bool(a), Bool(b)) => match op {
            CompareOp::Eq => Some(a == b),
            CompareOp::Ne => Some(a != b),
            _ => None,
        },
        (Str(a), Str(b)) => match op {
            CompareOp::Eq => Some(a == b),
            CompareOp::Ne => Some(a != b),
            _ => None,
        },
        (Null, Null) => match op {
            CompareOp::Eq => Some(true),
            CompareOp::Ne => Some(false),
            _ => None,
        },
        (Null, _) | (_, Null) => match op {
            CompareOp::Eq => Some(false),
            CompareOp::Ne => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn as_double(value: &ConstantValue) -> Option<f64> {
    match value {
        ConstantValue::Int(v) => Some(f64::from(*v)),
        ConstantValue::Long(v) => Some(*v as f64),
        ConstantValue::Float(v) => Some(f64::from(*v)),
        ConstantValue::Double(v) => Some(*v),
        _ => None,
    }
}

fn compare_longs(a: i64, b: i64, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Ge => a >= b,
        CompareOp::Gt => a > b,
        CompareOp::Le => a <= b,
    }
}

fn compare_doubles(a: f64, b: f64, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Ge => a >= b,
        CompareOp::Gt => a > b,
        CompareOp::Le => a <= b,
    }
}
