//! Graph construction.
//!
//! The builder is the only mutable view of a graph. The frontend populates
//! it while visiting bytecode, the extractors decorate it, and `build()`
//! freezes it into a read-only `ProgramGraph` with its derived indices.
//! Structural mistakes (duplicate node ids, edges to unknown nodes, cyclic
//! type relations) are rejected rather than repaired.

use crate::annotations::{ClassAnnotationView, JsonBindingInfo, is_getter_name};
use crate::edge::{Edge, EdgeKind, TypeRelation};
use crate::endpoints::{EndpointInfo, extract_endpoints};
use crate::enums::{EnumValue, InitStmt, extract_enum_values};
use crate::graph::{MethodInfo, ProgramGraph};
use crate::hierarchy::TypeHierarchy;
use crate::node::{
    CallSiteNode, ConstantKey, ConstantNode, ConstantValue, FieldNode, LocalNode, Node,
    ParameterNode, ReturnNode,
};
use jflow_common::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use jflow_common::options::AnalysisOptions;
use jflow_common::{NodeId, fresh_node_id};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

/// Structural errors surfaced while building a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),
    #[error("duplicate constant node for value {0}")]
    DuplicateConstant(String),
    #[error("edge references unknown node {id} ({context})")]
    UnknownNode { id: NodeId, context: &'static str },
    #[error("branch edge {from} -> {to} has no comparison")]
    MissingComparison { from: NodeId, to: NodeId },
    #[error("type hierarchy has a cycle through {0}")]
    CyclicTypeHierarchy(String),
}

/// Mutable graph under construction.
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    slots: FxHashMap<NodeId, u32>,
    edges: Vec<Edge>,
    constants: FxHashMap<ConstantKey, NodeId>,
    hierarchy: TypeHierarchy,
    methods: Vec<MethodInfo>,
    enum_values: FxHashMap<(String, String), Vec<EnumValue>>,
    enum_classes: FxHashSet<String>,
    endpoints: Vec<EndpointInfo>,
    jackson_fields: FxHashMap<(String, String), JsonBindingInfo>,
    jackson_getters: FxHashMap<(String, String), JsonBindingInfo>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Insert a fully formed node. The id must be unused within this build;
    /// constant nodes must go through [`GraphBuilder::constant`] so they
    /// stay interned by `(variant, value)`.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let id = node.id();
        if self.slots.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        if let Node::Constant(constant) = &node {
            let key = constant.value.intern_key();
            if self.constants.contains_key(&key) {
                return Err(GraphError::DuplicateConstant(constant.value.to_string()));
            }
            self.constants.insert(key, id);
        }
        self.slots.insert(id, self.nodes.len() as u32);
        self.nodes.push(node);
        Ok(id)
    }

    /// Allocate a local-variable node.
    pub fn local(
        &mut self,
        name: impl Into<String>,
        declared_type: TypeDescriptor,
        owning_method: MethodDescriptor,
    ) -> NodeId {
        let id = fresh_node_id();
        self.insert(Node::Local(LocalNode {
            id,
            name: name.into(),
            declared_type,
            owning_method,
        }));
        id
    }

    /// Allocate a parameter node. `index` matches declaration order.
    pub fn parameter(
        &mut self,
        index: u16,
        declared_type: TypeDescriptor,
        owning_method: MethodDescriptor,
    ) -> NodeId {
        let id = fresh_node_id();
        self.insert(Node::Parameter(ParameterNode {
            id,
            index,
            declared_type,
            owning_method,
        }));
        id
    }

    /// Allocate a field node.
    pub fn field(&mut self, descriptor: FieldDescriptor, is_static: bool) -> NodeId {
        let id = fresh_node_id();
        self.insert(Node::Field(FieldNode {
            id,
            descriptor,
            is_static,
        }));
        id
    }

    /// Allocate the return node of a method.
    pub fn return_node(
        &mut self,
        owning_method: MethodDescriptor,
        resolved_actual_type: Option<TypeDescriptor>,
    ) -> NodeId {
        let id = fresh_node_id();
        self.insert(Node::Return(ReturnNode {
            id,
            owning_method,
            resolved_actual_type,
        }));
        id
    }

    /// The interned constant node for `value`, allocating it on first use.
    pub fn constant(&mut self, value: ConstantValue) -> NodeId {
        let key = value.intern_key();
        if let Some(&id) = self.constants.get(&key) {
            return id;
        }
        let id = fresh_node_id();
        self.constants.insert(key, id);
        self.insert(Node::Constant(ConstantNode { id, value }));
        id
    }

    /// Allocate a call-site node. Argument ordering matches the callee's
    /// parameter ordering.
    pub fn call_site(
        &mut self,
        caller: MethodDescriptor,
        callee: MethodDescriptor,
        line: Option<u32>,
        receiver: Option<NodeId>,
        arguments: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let id = fresh_node_id();
        self.insert(Node::CallSite(CallSiteNode {
            id,
            caller,
            callee,
            line,
            receiver,
            arguments: SmallVec::from_iter(arguments),
        }));
        id
    }

    fn insert(&mut self, node: Node) {
        // Fresh ids cannot collide; the registry is monotonic.
        self.slots.insert(node.id(), self.nodes.len() as u32);
        self.nodes.push(node);
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Insert an edge. Both endpoints (and the comparand of a branch
    /// comparison) must already be in the node store.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if !self.slots.contains_key(&edge.from) {
            return Err(GraphError::UnknownNode {
                id: edge.from,
                context: "edge source",
            });
        }
        if !self.slots.contains_key(&edge.to) {
            return Err(GraphError::UnknownNode {
                id: edge.to,
                context: "edge target",
            });
        }
        if let EdgeKind::ControlFlow { kind, comparison } = edge.kind
            && kind.is_branch()
        {
            let Some(comparison) = comparison else {
                return Err(GraphError::MissingComparison {
                    from: edge.from,
                    to: edge.to,
                });
            };
            if !self.slots.contains_key(&comparison.comparand) {
                return Err(GraphError::UnknownNode {
                    id: comparison.comparand,
                    context: "branch comparand",
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Register a direct type relation, from subtype to supertype.
    pub fn add_type_relation(
        &mut self,
        subtype: TypeDescriptor,
        supertype: TypeDescriptor,
        relation: TypeRelation,
    ) {
        if relation == TypeRelation::Extends
            && supertype.class_name == jflow_common::well_known::ENUM
        {
            self.enum_classes.insert(subtype.class_name.clone());
        }
        self.hierarchy.insert(subtype, supertype, relation);
    }

    // =========================================================================
    // Methods and decorations
    // =========================================================================

    /// Register a method with its return/parameter nodes.
    pub fn add_method(&mut self, info: MethodInfo) {
        self.methods.push(info);
    }

    /// Record the user-defined constructor arguments of one enum constant.
    pub fn add_enum_values(
        &mut self,
        enum_class: impl Into<String>,
        enum_name: impl Into<String>,
        args: Vec<EnumValue>,
    ) {
        let enum_class = enum_class.into();
        self.enum_classes.insert(enum_class.clone());
        self.enum_values.insert((enum_class, enum_name.into()), args);
    }

    /// Mine an enum class's static initialiser and record every constant.
    pub fn ingest_enum_initializer(&mut self, enum_class: &str, body: &[InitStmt]) {
        for (field, args) in extract_enum_values(enum_class, body) {
            debug!(target: "jflow", enum_class, field, count = args.len(), "extracted enum constant");
            self.add_enum_values(enum_class, field, args);
        }
    }

    pub fn add_endpoint(&mut self, endpoint: EndpointInfo) {
        self.endpoints.push(endpoint);
    }

    pub fn add_jackson_field(
        &mut self,
        class_name: impl Into<String>,
        field_name: impl Into<String>,
        info: JsonBindingInfo,
    ) {
        self.jackson_fields
            .insert((class_name.into(), field_name.into()), info);
    }

    pub fn add_jackson_getter(
        &mut self,
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        info: JsonBindingInfo,
    ) {
        self.jackson_getters
            .insert((class_name.into(), method_name.into()), info);
    }

    /// Apply the endpoint and JSON-binding extractors to one class's
    /// reflective annotation view, honoring package filters.
    pub fn ingest_annotations(&mut self, view: &ClassAnnotationView, options: &AnalysisOptions) {
        if !options.is_class_included(&view.class_name) {
            options.verbose(&format!("skipping annotations of {}", view.class_name));
            return;
        }
        for endpoint in extract_endpoints(view) {
            self.add_endpoint(endpoint);
        }
        for field_view in &view.fields {
            let info = JsonBindingInfo::from_annotations(&field_view.annotations);
            if info != JsonBindingInfo::default() {
                self.add_jackson_field(view.class_name.clone(), field_view.field.name.clone(), info);
            }
        }
        for method_view in &view.methods {
            if !is_getter_name(&method_view.method.name) {
                continue;
            }
            let info = JsonBindingInfo::from_annotations(&method_view.annotations);
            if info != JsonBindingInfo::default() {
                self.add_jackson_getter(
                    view.class_name.clone(),
                    method_view.method.name.clone(),
                    info,
                );
            }
        }
    }

    // =========================================================================
    // Freeze
    // =========================================================================

    /// Validate the store and freeze it into a read-only graph.
    pub fn build(self) -> Result<ProgramGraph, GraphError> {
        for node in &self.nodes {
            if let Node::CallSite(call) = node {
                if let Some(receiver) = call.receiver
                    && !self.slots.contains_key(&receiver)
                {
                    return Err(GraphError::UnknownNode {
                        id: receiver,
                        context: "call-site receiver",
                    });
                }
                for &arg in &call.arguments {
                    if !self.slots.contains_key(&arg) {
                        return Err(GraphError::UnknownNode {
                            id: arg,
                            context: "call-site argument",
                        });
                    }
                }
            }
        }
        for info in &self.methods {
            if !info.return_node.is_none() && !self.slots.contains_key(&info.return_node) {
                return Err(GraphError::UnknownNode {
                    id: info.return_node,
                    context: "method return node",
                });
            }
            for &param in &info.parameter_nodes {
                if !self.slots.contains_key(&param) {
                    return Err(GraphError::UnknownNode {
                        id: param,
                        context: "method parameter node",
                    });
                }
            }
        }
        if let Some(class) = self.hierarchy.find_cycle() {
            return Err(GraphError::CyclicTypeHierarchy(class));
        }
        Ok(ProgramGraph::freeze(
            self.nodes,
            self.slots,
            self.edges,
            self.hierarchy,
            self.methods,
            self.enum_values,
            self.enum_classes,
            self.endpoints,
            self.jackson_fields,
            self.jackson_getters,
        ))
    }
}
