//! Backward slicing over dataflow edges.
//!
//! The slicer walks incoming dataflow edges in reverse breadth-first order
//! from a seed node, collecting every statically resolvable constant that
//! can flow into the seed. Boxing/unboxing calls are already lowered to
//! plain `Assign` edges by the frontend, field loads continue into the
//! field's stores, and call sites continue into the callee's return node
//! when cross-method traversal is enabled.
//!
//! Results are memoised per `(graph identity, seed, options fingerprint)`
//! in a read-through cache; the cache is owned alongside the graph, so a
//! result computed against one frozen graph can never leak into another.

use dashmap::DashMap;
use jflow_common::limits::MAX_PATHS_PER_SLICE;
use jflow_common::options::SliceOptions;
use jflow_common::NodeId;
use jflow_graph::enums::EnumValue;
use jflow_graph::{ConstantValue, Node, ProgramGraph};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

// =============================================================================
// Results
// =============================================================================

/// One constant discovered by a slice.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FoundConstant {
    pub node: NodeId,
    pub value: ConstantValue,
}

/// The propagation path of one constant: `nodes[0]` is the constant's node,
/// `nodes[last]` is the seed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlicePath {
    pub constant: NodeId,
    pub nodes: Vec<NodeId>,
}

/// The outcome of one backward slice. Constant sequences are ordered by
/// first-visit time of the reverse traversal; slicing the same seed twice
/// on the same frozen graph yields the same result.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SliceResult {
    pub seed: NodeId,
    direct: Vec<FoundConstant>,
    derived: Vec<FoundConstant>,
    paths: Vec<SlicePath>,
}

impl SliceResult {
    /// Constants reached without crossing a field's initialiser.
    #[must_use]
    pub fn direct_constants(&self) -> &[FoundConstant] {
        &self.direct
    }

    /// Constants propagated out of a static field's known initialiser.
    #[must_use]
    pub fn derived_constants(&self) -> &[FoundConstant] {
        &self.derived
    }

    /// Direct plus derived constants with enum references resolved against
    /// the enum index: an enum constant contributes its primary value.
    #[must_use]
    pub fn all_constants(&self, graph: &ProgramGraph) -> Vec<FoundConstant> {
        self.direct
            .iter()
            .chain(&self.derived)
            .map(|found| FoundConstant {
                node: found.node,
                value: resolve_value(graph, &found.value),
            })
            .collect()
    }

    /// `i32` view of `all_constants`.
    #[must_use]
    pub fn int_constants(&self, graph: &ProgramGraph) -> Vec<i32> {
        self.all_constants(graph)
            .into_iter()
            .filter_map(|found| match found.value {
                ConstantValue::Int(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// `i64` view of `all_constants`.
    #[must_use]
    pub fn long_constants(&self, graph: &ProgramGraph) -> Vec<i64> {
        self.all_constants(graph)
            .into_iter()
            .filter_map(|found| match found.value {
                ConstantValue::Long(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// String view of `all_constants`.
    #[must_use]
    pub fn string_constants(&self, graph: &ProgramGraph) -> Vec<String> {
        self.all_constants(graph)
            .into_iter()
            .filter_map(|found| match found.value {
                ConstantValue::Str(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Boolean view of `all_constants`.
    #[must_use]
    pub fn bool_constants(&self, graph: &ProgramGraph) -> Vec<bool> {
        self.all_constants(graph)
            .into_iter()
            .filter_map(|found| match found.value {
                ConstantValue::Bool(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Whether any constant of the slice resolves to `value`.
    #[must_use]
    pub fn contains_value(&self, graph: &ProgramGraph, value: &ConstantValue) -> bool {
        let wanted = resolve_value(graph, value);
        self.all_constants(graph)
            .iter()
            .any(|found| found.value == wanted)
    }

    /// Recorded propagation paths. Empty unless `collect_paths` was set.
    #[must_use]
    pub fn paths(&self) -> &[SlicePath] {
        &self.paths
    }

    /// The recorded path of one constant.
    #[must_use]
    pub fn path_for(&self, constant: NodeId) -> Option<&SlicePath> {
        self.paths.iter().find(|p| p.constant == constant)
    }
}

/// Resolve an enum constant to its primary value (first constructor
/// argument), following cross-enum references through the enum index. Plain
/// constants resolve to themselves.
#[must_use]
pub fn resolve_value(graph: &ProgramGraph, value: &ConstantValue) -> ConstantValue {
    let ConstantValue::Enum {
        enum_type,
        enum_name,
        constructor_args,
    } = value
    else {
        return value.clone();
    };
    match constructor_args.first() {
        Some(EnumValue::EnumRef { .. }) | None => graph
            .enum_primary_value(&enum_type.class_name, enum_name)
            .unwrap_or_else(|| value.clone()),
        Some(arg) => arg.as_constant().unwrap_or_else(|| value.clone()),
    }
}

// =============================================================================
// Cache
// =============================================================================

/// Read-through memo cache for slice results.
///
/// Keys carry the graph's process-unique identity so results can never be
/// served across graphs, even if a cache outlives its analyzer.
#[derive(Default)]
pub struct SliceCache {
    entries: DashMap<(u64, NodeId, u64), Arc<SliceResult>>,
}

impl SliceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoised slice for `seed`, computing it on first request.
    /// Readers observe either a complete result or no entry.
    #[must_use]
    pub fn slice(
        &self,
        graph: &ProgramGraph,
        seed: NodeId,
        options: SliceOptions,
    ) -> Arc<SliceResult> {
        let key = (graph.graph_id(), seed, options.fingerprint());
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(&hit);
        }
        let result = Arc::new(compute_slice(graph, seed, options));
        self.entries.insert(key, Arc::clone(&result));
        result
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Traversal
// =============================================================================

struct Frontier {
    node: NodeId,
    depth: u32,
    via_field: bool,
}

/// Reverse breadth-first traversal from `seed` over incoming dataflow.
fn compute_slice(graph: &ProgramGraph, seed: NodeId, options: SliceOptions) -> SliceResult {
    let mut result = SliceResult {
        seed,
        ..SliceResult::default()
    };
    if graph.node(seed).is_none() {
        trace!(target: "jflow", %seed, "slice seed is not in the graph");
        return result;
    }

    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    visited.insert(seed);
    // parent[n] is the node one hop closer to the seed.
    let mut parents: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut queue: VecDeque<Frontier> = VecDeque::new();
    queue.push_back(Frontier {
        node: seed,
        depth: 0,
        via_field: false,
    });

    while let Some(Frontier {
        node,
        depth,
        via_field,
    }) = queue.pop_front()
    {
        let Some(current) = graph.node(node) else {
            continue;
        };
        match current {
            Node::Constant(constant) => {
                let found = FoundConstant {
                    node,
                    value: constant.value.clone(),
                };
                if options.collect_paths && result.paths.len() < MAX_PATHS_PER_SLICE {
                    result.paths.push(SlicePath {
                        constant: node,
                        nodes: path_to_seed(node, seed, &parents),
                    });
                }
                if via_field {
                    result.derived.push(found);
                } else {
                    result.direct.push(found);
                }
                // Constants terminate their branch of the traversal.
                continue;
            }
            Node::CallSite(call) => {
                // The value a call produces comes from the callee's return
                // node, not from the call's receiver or arguments.
                if options.traverse_method_calls
                    && depth < options.max_depth
                    && let Some(info) = graph.method(&call.callee.signature())
                    && !info.return_node.is_none()
                    && visited.insert(info.return_node)
                {
                    parents.insert(info.return_node, node);
                    queue.push_back(Frontier {
                        node: info.return_node,
                        depth: depth + 1,
                        via_field,
                    });
                }
                continue;
            }
            Node::Field(_) => {
                // Constants behind a field's stores are derived, not direct.
                expand_incoming(graph, node, depth, true, options, &mut visited, &mut parents, &mut queue);
            }
            Node::Local(_) | Node::Return(_) => {
                expand_incoming(
                    graph, node, depth, via_field, options, &mut visited, &mut parents, &mut queue,
                );
            }
            Node::Parameter(param) => {
                expand_incoming(
                    graph, node, depth, via_field, options, &mut visited, &mut parents, &mut queue,
                );
                // Cross-method: arguments at every call site of the owning
                // method flow into this parameter.
                if options.traverse_method_calls && depth < options.max_depth {
                    let signature = param.owning_method.signature();
                    let index = param.index as usize;
                    for &call_id in graph.call_sites_calling(&signature) {
                        let Some(call) = graph.call_site(call_id) else {
                            continue;
                        };
                        let Some(&argument) = call.arguments.get(index) else {
                            continue;
                        };
                        if visited.insert(argument) {
                            parents.insert(argument, node);
                            queue.push_back(Frontier {
                                node: argument,
                                depth: depth + 1,
                                via_field,
                            });
                        }
                    }
                }
            }
        }
    }

    result
}

fn expand_incoming(
    graph: &ProgramGraph,
    node: NodeId,
    depth: u32,
    via_field: bool,
    options: SliceOptions,
    visited: &mut FxHashSet<NodeId>,
    parents: &mut FxHashMap<NodeId, NodeId>,
    queue: &mut VecDeque<Frontier>,
) {
    if depth >= options.max_depth {
        // Unresolved dataflow past the depth bound contributes nothing;
        // it is not recorded as a failure.
        return;
    }
    for (edge, _kind) in graph.incoming_dataflow(node) {
        if visited.insert(edge.from) {
            parents.insert(edge.from, node);
            queue.push_back(Frontier {
                node: edge.from,
                depth: depth + 1,
                via_field,
            });
        }
    }
}

fn path_to_seed(from: NodeId, seed: NodeId, parents: &FxHashMap<NodeId, NodeId>) -> Vec<NodeId> {
    let mut nodes = vec![from];
    let mut current = from;
    while current != seed {
        match parents.get(&current) {
            Some(&next) => {
                nodes.push(next);
                current = next;
            }
            None => break,
        }
    }
    nodes
}
