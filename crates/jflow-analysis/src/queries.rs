//! Query façade over a frozen graph.
//!
//! `Analyzer` bundles a graph with its slice cache and the framework
//! options, and exposes the DSL-shaped entry points: argument-constant
//! search, actual-return-type recovery, typed-field lookup, endpoint
//! filtering, and dead-code analysis. Queries never fail for data reasons;
//! a pattern that matches nothing yields an empty result.

use crate::reachability::{Assumption, DeadCodeResult, ReachabilityEngine};
use crate::slicer::{SliceCache, SliceResult, resolve_value};
use jflow_common::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use jflow_common::options::{AnalysisOptions, SliceOptions};
use jflow_common::pattern::MethodPattern;
use jflow_common::NodeId;
use jflow_graph::endpoints::{EndpointInfo, HttpMethod};
use jflow_graph::{ConstantValue, Node, ProgramGraph};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// Result types
// =============================================================================

/// One constant that can flow into an argument position of a call site.
#[derive(Clone, Debug, Serialize)]
pub struct ArgumentConstant {
    pub call_site: NodeId,
    /// `caller_signature:line`, `?` when the line is unknown.
    pub location: String,
    pub callee: MethodDescriptor,
    pub argument_index: usize,
    pub constant_node: NodeId,
    /// The constant's own value; for enum constants, the primary value.
    pub value: ConstantValue,
    /// Propagation path from the constant to the argument, when requested.
    pub path: Option<Vec<NodeId>>,
}

/// Declared vs. observed return types of one method.
#[derive(Clone, Debug, Serialize)]
pub struct ReturnTypeInfo {
    pub method: MethodDescriptor,
    pub declared: TypeDescriptor,
    /// Deduplicated actual types, in discovery order.
    pub actual: Vec<TypeDescriptor>,
}

/// One field whose declared type matched a query pattern.
#[derive(Clone, Debug, Serialize)]
pub struct FieldMatch {
    pub node: NodeId,
    pub field: FieldDescriptor,
    pub is_static: bool,
    /// Verdict of the caller-supplied compliance predicate, when one was
    /// given.
    pub compliant: Option<bool>,
}

// =============================================================================
// Analyzer
// =============================================================================

/// Queries over one frozen graph.
///
/// The slice cache lives here, one per analyzer, so memoised results die
/// with the graph/analyzer pair.
pub struct Analyzer<'g> {
    graph: &'g ProgramGraph,
    options: AnalysisOptions,
    cache: SliceCache,
}

impl<'g> Analyzer<'g> {
    #[must_use]
    pub fn new(graph: &'g ProgramGraph) -> Self {
        Self::with_options(graph, AnalysisOptions::default())
    }

    #[must_use]
    pub fn with_options(graph: &'g ProgramGraph, options: AnalysisOptions) -> Self {
        Self {
            graph,
            options,
            cache: SliceCache::new(),
        }
    }

    #[must_use]
    pub fn graph(&self) -> &'g ProgramGraph {
        self.graph
    }

    /// Memoised backward slice from `seed`.
    #[must_use]
    pub fn slice(&self, seed: NodeId, options: SliceOptions) -> Arc<SliceResult> {
        self.cache.slice(self.graph, seed, options)
    }

    /// Which constants can flow into argument `argument_index` of every
    /// call site whose callee matches `pattern`.
    #[must_use]
    pub fn find_argument_constants(
        &self,
        pattern: &MethodPattern,
        argument_index: usize,
        options: SliceOptions,
    ) -> Vec<ArgumentConstant> {
        let mut results = Vec::new();
        for call in self.graph.call_sites(pattern) {
            let Some(&argument) = call.arguments.get(argument_index) else {
                continue;
            };
            let slice = self.slice(argument, options);
            for found in slice.all_constants(self.graph) {
                let path = if options.collect_paths {
                    slice.path_for(found.node).map(|p| p.nodes.clone())
                } else {
                    None
                };
                results.push(ArgumentConstant {
                    call_site: call.id,
                    location: call.location(),
                    callee: call.callee.clone(),
                    argument_index,
                    constant_node: found.node,
                    value: found.value,
                    path,
                });
            }
        }
        debug!(target: "jflow", count = results.len(), "argument-constant query finished");
        results
    }

    /// Declared and observed return types for every method matching
    /// `pattern`.
    #[must_use]
    pub fn find_actual_return_types(&self, pattern: &MethodPattern) -> Vec<ReturnTypeInfo> {
        self.graph
            .methods(pattern)
            .into_iter()
            .map(|info| {
                let actual = self.trace_return_types(info.return_node);
                ReturnTypeInfo {
                    method: info.descriptor.clone(),
                    declared: info.descriptor.return_type.clone(),
                    actual,
                }
            })
            .collect()
    }

    /// Recursively trace a return node's incoming dataflow for the types
    /// that actually reach it.
    fn trace_return_types(&self, return_node: NodeId) -> Vec<TypeDescriptor> {
        let mut actual: Vec<TypeDescriptor> = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        if return_node.is_none() {
            return actual;
        }
        let mut push = |actual: &mut Vec<TypeDescriptor>, ty: TypeDescriptor| {
            if seen.insert(ty.to_string()) {
                actual.push(ty);
            }
        };
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        visited.insert(return_node);
        let mut stack = vec![return_node];
        while let Some(node) = stack.pop() {
            if let Some(Node::Return(ret)) = self.graph.node(node)
                && let Some(resolved) = &ret.resolved_actual_type
            {
                push(&mut actual, resolved.clone());
            }
            for (edge, _) in self.graph.incoming_dataflow(node) {
                let Some(source) = self.graph.node(edge.from) else {
                    continue;
                };
                match source {
                    Node::Local(local) => {
                        if local.declared_type.is_object() {
                            // An Object-typed local says nothing; look
                            // further back.
                            if visited.insert(edge.from) {
                                stack.push(edge.from);
                            }
                        } else {
                            push(&mut actual, local.declared_type.clone());
                        }
                    }
                    Node::Parameter(param) => {
                        if !param.declared_type.is_object() {
                            push(&mut actual, param.declared_type.clone());
                        }
                    }
                    Node::Field(field) => {
                        push(&mut actual, field.descriptor.field_type.clone());
                    }
                    Node::CallSite(call) => {
                        let ret = &call.callee.return_type;
                        if !ret.is_object() && !ret.is_void() {
                            push(&mut actual, ret.clone());
                        }
                    }
                    Node::Constant(constant) => {
                        if let Some(boxed) = constant.value.boxed_type() {
                            push(&mut actual, boxed);
                        }
                    }
                    Node::Return(_) => {
                        if visited.insert(edge.from) {
                            stack.push(edge.from);
                        }
                    }
                }
            }
        }
        actual
    }

    /// Fields whose declared type matches any of `type_patterns` (exact, or
    /// `*`-suffix prefix). The compliance predicate, when given, annotates
    /// each match.
    #[must_use]
    pub fn find_fields_of_type(
        &self,
        type_patterns: &[String],
        compliance: Option<&dyn Fn(&FieldDescriptor) -> bool>,
    ) -> Vec<FieldMatch> {
        self.graph
            .field_nodes()
            .filter_map(|field| {
                let class_name = &field.descriptor.field_type.class_name;
                let matched = type_patterns.iter().any(|pattern| {
                    match pattern.strip_suffix('*') {
                        Some(prefix) => class_name.starts_with(prefix),
                        None => class_name == pattern,
                    }
                });
                if !matched {
                    return None;
                }
                Some(FieldMatch {
                    node: field.id,
                    field: field.descriptor.clone(),
                    is_static: field.is_static,
                    compliant: compliance.map(|pred| pred(&field.descriptor)),
                })
            })
            .collect()
    }

    /// Endpoints filtered by optional path pattern and HTTP method.
    #[must_use]
    pub fn endpoints(
        &self,
        path_pattern: Option<&str>,
        method: Option<HttpMethod>,
    ) -> Vec<&'g EndpointInfo> {
        self.graph.endpoints(path_pattern, method)
    }

    /// Dead branches, call sites, and methods under the given assumptions.
    #[must_use]
    pub fn find_dead_code(&self, assumptions: &[Assumption]) -> DeadCodeResult {
        ReachabilityEngine::new(self.graph, &self.options, &self.cache).analyze(assumptions)
    }

    /// Resolve a constant to the value queries report for it (enum
    /// constants resolve to their primary value).
    #[must_use]
    pub fn resolve(&self, value: &ConstantValue) -> ConstantValue {
        resolve_value(self.graph, value)
    }
}
