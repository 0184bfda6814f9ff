//! The frozen program graph.
//!
//! A `ProgramGraph` is produced by `GraphBuilder::build()` and is read-only
//! from then on: nodes, edges, and the derived indices never change, which
//! is what lets analysis results be memoised against the graph's identity.
//! Iteration order over nodes of a kind is the insertion order of that kind;
//! adjacency lists preserve edge insertion order in both directions.

use crate::annotations::JsonBindingInfo;
use crate::edge::{ControlFlowKind, DataFlowKind, Edge, EdgeKind};
use crate::endpoints::{EndpointInfo, HttpMethod};
use crate::enums::EnumValue;
use crate::hierarchy::TypeHierarchy;
use crate::node::{
    CallSiteNode, ConstantNode, ConstantValue, FieldNode, Node, NodeKind, NodeKindMask,
};
use crate::scopes::{BranchScope, BranchScopes};
use indexmap::IndexMap;
use jflow_common::descriptor::{MethodDescriptor, TypeDescriptor};
use jflow_common::pattern::MethodPattern;
use jflow_common::{NodeId, fresh_graph_id};
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;

/// A registered method with its dataflow anchor nodes.
#[derive(Clone, Debug, Serialize)]
pub struct MethodInfo {
    pub descriptor: MethodDescriptor,
    /// The method's single return node, or `NodeId::NONE` when the frontend
    /// did not emit one (e.g. `void` or abstract methods).
    pub return_node: NodeId,
    /// Parameter nodes in declaration order.
    pub parameter_nodes: SmallVec<[NodeId; 4]>,
}

impl MethodInfo {
    #[must_use]
    pub fn new(descriptor: MethodDescriptor) -> Self {
        Self {
            descriptor,
            return_node: NodeId::NONE,
            parameter_nodes: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_return_node(mut self, return_node: NodeId) -> Self {
        self.return_node = return_node;
        self
    }

    #[must_use]
    pub fn with_parameter_nodes(mut self, parameter_nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.parameter_nodes = SmallVec::from_iter(parameter_nodes);
        self
    }
}

/// Per-kind node and edge counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub locals: usize,
    pub parameters: usize,
    pub fields: usize,
    pub returns: usize,
    pub constants: usize,
    pub call_sites: usize,
    pub dataflow_edges: usize,
    pub call_edges: usize,
    pub control_flow_edges: usize,
    pub type_edges: usize,
    pub methods: usize,
    pub endpoints: usize,
}

/// The frozen, read-only program graph.
#[derive(Debug)]
pub struct ProgramGraph {
    graph_id: u64,
    nodes: Vec<Node>,
    slots: FxHashMap<NodeId, u32>,
    edges: Vec<Edge>,
    outgoing: FxHashMap<NodeId, Vec<u32>>,
    incoming: FxHashMap<NodeId, Vec<u32>>,
    by_kind: [Vec<NodeId>; NodeKind::COUNT],
    /// Callee `(class, name)` buckets over call sites.
    call_buckets: FxHashMap<(String, String), Vec<NodeId>>,
    /// Callee signature → call sites invoking it.
    callers: FxHashMap<String, Vec<NodeId>>,
    methods: IndexMap<String, MethodInfo>,
    hierarchy: TypeHierarchy,
    enum_values: FxHashMap<(String, String), Vec<EnumValue>>,
    enum_classes: FxHashSet<String>,
    endpoints: Vec<EndpointInfo>,
    jackson_fields: FxHashMap<(String, String), JsonBindingInfo>,
    jackson_getters: FxHashMap<(String, String), JsonBindingInfo>,
    scopes: OnceCell<BranchScopes>,
}

impl ProgramGraph {
    pub(crate) fn freeze(
        nodes: Vec<Node>,
        slots: FxHashMap<NodeId, u32>,
        edges: Vec<Edge>,
        hierarchy: TypeHierarchy,
        methods: Vec<MethodInfo>,
        enum_values: FxHashMap<(String, String), Vec<EnumValue>>,
        enum_classes: FxHashSet<String>,
        endpoints: Vec<EndpointInfo>,
        jackson_fields: FxHashMap<(String, String), JsonBindingInfo>,
        jackson_getters: FxHashMap<(String, String), JsonBindingInfo>,
    ) -> Self {
        let mut outgoing: FxHashMap<NodeId, Vec<u32>> = FxHashMap::default();
        let mut incoming: FxHashMap<NodeId, Vec<u32>> = FxHashMap::default();
        for (index, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.from).or_default().push(index as u32);
            incoming.entry(edge.to).or_default().push(index as u32);
        }

        let mut by_kind: [Vec<NodeId>; NodeKind::COUNT] = Default::default();
        let mut call_buckets: FxHashMap<(String, String), Vec<NodeId>> = FxHashMap::default();
        let mut callers: FxHashMap<String, Vec<NodeId>> = FxHashMap::default();
        for node in &nodes {
            by_kind[node.kind().index()].push(node.id());
            if let Node::CallSite(call) = node {
                call_buckets
                    .entry((
                        call.callee.declaring_class.class_name.clone(),
                        call.callee.name.clone(),
                    ))
                    .or_default()
                    .push(call.id);
                callers
                    .entry(call.callee.signature())
                    .or_default()
                    .push(call.id);
            }
        }

        let methods = methods
            .into_iter()
            .map(|info| (info.descriptor.signature(), info))
            .collect();

        Self {
            graph_id: fresh_graph_id(),
            nodes,
            slots,
            edges,
            outgoing,
            incoming,
            by_kind,
            call_buckets,
            callers,
            methods,
            hierarchy,
            enum_values,
            enum_classes,
            endpoints,
            jackson_fields,
            jackson_getters,
            scopes: OnceCell::new(),
        }
    }

    /// Process-unique identity of this frozen graph.
    #[must_use]
    pub fn graph_id(&self) -> u64 {
        self.graph_id
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot as usize])
    }

    #[must_use]
    pub fn call_site(&self, id: NodeId) -> Option<&CallSiteNode> {
        self.node(id).and_then(Node::as_call_site)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes of one kind, in that kind's insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.by_kind[kind.index()]
            .iter()
            .filter_map(|id| self.node(*id))
    }

    /// Nodes whose kind is in `mask`, in overall insertion order.
    pub fn nodes_matching(&self, mask: NodeKindMask) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| mask.contains_kind(n.kind()))
    }

    /// Every call site, in insertion order.
    pub fn call_site_nodes(&self) -> impl Iterator<Item = &CallSiteNode> {
        self.nodes_of_kind(NodeKind::CallSite)
            .filter_map(Node::as_call_site)
    }

    /// Every field node, in insertion order.
    pub fn field_nodes(&self) -> impl Iterator<Item = &FieldNode> {
        self.nodes_of_kind(NodeKind::Field).filter_map(|n| match n {
            Node::Field(field) => Some(field),
            _ => None,
        })
    }

    /// Every interned constant, in insertion order.
    pub fn constant_nodes(&self) -> impl Iterator<Item = &ConstantNode> {
        self.nodes_of_kind(NodeKind::Constant)
            .filter_map(Node::as_constant)
    }

    // =========================================================================
    // Edges
    // =========================================================================

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i as usize])
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.incoming
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i as usize])
    }

    /// Incoming dataflow edges only.
    pub fn incoming_dataflow(&self, id: NodeId) -> impl Iterator<Item = (&Edge, DataFlowKind)> {
        self.incoming(id)
            .filter_map(|e| e.kind.as_dataflow().map(|k| (e, k)))
    }

    /// Outgoing dataflow edges only.
    pub fn outgoing_dataflow(&self, id: NodeId) -> impl Iterator<Item = (&Edge, DataFlowKind)> {
        self.outgoing(id)
            .filter_map(|e| e.kind.as_dataflow().map(|k| (e, k)))
    }

    /// Incoming control-flow edges only.
    pub fn incoming_control(&self, id: NodeId) -> impl Iterator<Item = (&Edge, ControlFlowKind)> {
        self.incoming(id)
            .filter_map(|e| e.kind.as_control_flow().map(|(k, _)| (e, k)))
    }

    /// Outgoing control-flow edges only.
    pub fn outgoing_control(&self, id: NodeId) -> impl Iterator<Item = (&Edge, ControlFlowKind)> {
        self.outgoing(id)
            .filter_map(|e| e.kind.as_control_flow().map(|(k, _)| (e, k)))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    // =========================================================================
    // Call sites and methods
    // =========================================================================

    /// Call sites whose callee matches `pattern`, in insertion order.
    ///
    /// A pattern that pins class and name exactly is answered from the
    /// `(class, name)` bucket; anything else scans.
    #[must_use]
    pub fn call_sites(&self, pattern: &MethodPattern) -> Vec<&CallSiteNode> {
        let compiled = pattern.compile();
        if !pattern.use_regex
            && let (Some(class), Some(name)) = (&pattern.class_name, &pattern.name)
            && !class.ends_with('*')
            && !name.ends_with('*')
        {
            return self
                .call_buckets
                .get(&(class.clone(), name.clone()))
                .into_iter()
                .flatten()
                .filter_map(|&id| self.call_site(id))
                .filter(|call| compiled.matches(&call.callee))
                .collect();
        }
        self.call_site_nodes()
            .filter(|call| compiled.matches(&call.callee))
            .collect()
    }

    /// Call sites that invoke exactly the method with `signature`.
    #[must_use]
    pub fn call_sites_calling(&self, signature: &str) -> &[NodeId] {
        self.callers
            .get(signature)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Registered methods matching `pattern`, in registration order.
    #[must_use]
    pub fn methods(&self, pattern: &MethodPattern) -> Vec<&MethodInfo> {
        let compiled = pattern.compile();
        self.methods
            .values()
            .filter(|info| compiled.matches(&info.descriptor))
            .collect()
    }

    #[must_use]
    pub fn method(&self, signature: &str) -> Option<&MethodInfo> {
        self.methods.get(signature)
    }

    pub fn all_methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.values()
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    #[must_use]
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Direct supertypes of `class_name`.
    pub fn supertypes(&self, class_name: &str) -> impl Iterator<Item = &TypeDescriptor> {
        self.hierarchy.supertypes(class_name)
    }

    /// Direct subtypes of `class_name`.
    pub fn subtypes(&self, class_name: &str) -> impl Iterator<Item = &TypeDescriptor> {
        self.hierarchy.subtypes(class_name)
    }

    // =========================================================================
    // Enum index
    // =========================================================================

    /// The user-defined constructor arguments of one enum constant.
    #[must_use]
    pub fn enum_values(&self, enum_class: &str, enum_name: &str) -> Option<&[EnumValue]> {
        self.enum_values
            .get(&(enum_class.to_string(), enum_name.to_string()))
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_enum_class(&self, class_name: &str) -> bool {
        self.enum_classes.contains(class_name)
    }

    /// The primary (first constructor argument) value of an enum constant,
    /// following cross-enum references until a plain constant appears.
    #[must_use]
    pub fn enum_primary_value(&self, enum_class: &str, enum_name: &str) -> Option<ConstantValue> {
        let mut current = (enum_class.to_string(), enum_name.to_string());
        // References cannot recurse forever: each hop moves to another
        // constant and the constant universe is finite.
        let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
        loop {
            if !seen.insert(current.clone()) {
                return None;
            }
            let args = self.enum_values.get(&current)?;
            match args.first() {
                Some(EnumValue::EnumRef { enum_type, enum_name }) => {
                    current = (enum_type.clone(), enum_name.clone());
                }
                Some(value) => return value.as_constant(),
                None => return None,
            }
        }
    }

    // =========================================================================
    // Endpoints and JSON binding
    // =========================================================================

    /// Endpoints filtered by optional path pattern and HTTP method.
    #[must_use]
    pub fn endpoints(
        &self,
        path_pattern: Option<&str>,
        method: Option<HttpMethod>,
    ) -> Vec<&EndpointInfo> {
        self.endpoints
            .iter()
            .filter(|e| e.matches(path_pattern, method))
            .collect()
    }

    #[must_use]
    pub fn jackson_field_info(&self, class_name: &str, field_name: &str) -> Option<&JsonBindingInfo> {
        self.jackson_fields
            .get(&(class_name.to_string(), field_name.to_string()))
    }

    #[must_use]
    pub fn jackson_getter_info(
        &self,
        class_name: &str,
        method_name: &str,
    ) -> Option<&JsonBindingInfo> {
        self.jackson_getters
            .get(&(class_name.to_string(), method_name.to_string()))
    }

    // =========================================================================
    // Branch scopes
    // =========================================================================

    /// All branch scopes. Built lazily on first request and cached for the
    /// graph's lifetime.
    #[must_use]
    pub fn branch_scopes(&self) -> &[BranchScope] {
        self.scopes_index().all()
    }

    /// Branch scopes whose condition is `condition`.
    pub fn branch_scopes_for(&self, condition: NodeId) -> impl Iterator<Item = &BranchScope> {
        self.scopes_index().for_condition(condition)
    }

    fn scopes_index(&self) -> &BranchScopes {
        self.scopes.get_or_init(|| BranchScopes::build(self))
    }

    // =========================================================================
    // Stats
    // =========================================================================

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            locals: self.by_kind[NodeKind::Local.index()].len(),
            parameters: self.by_kind[NodeKind::Parameter.index()].len(),
            fields: self.by_kind[NodeKind::Field.index()].len(),
            returns: self.by_kind[NodeKind::Return.index()].len(),
            constants: self.by_kind[NodeKind::Constant.index()].len(),
            call_sites: self.by_kind[NodeKind::CallSite.index()].len(),
            type_edges: self.hierarchy.edges().len(),
            methods: self.methods.len(),
            endpoints: self.endpoints.len(),
            ..GraphStats::default()
        };
        for edge in &self.edges {
            match edge.kind {
                EdgeKind::DataFlow(_) => stats.dataflow_edges += 1,
                EdgeKind::Call { .. } => stats.call_edges += 1,
                EdgeKind::ControlFlow { .. } => stats.control_flow_edges += 1,
            }
        }
        stats
    }
}
