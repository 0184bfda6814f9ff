//! JSON graph-dump ingestion.
//!
//! A frontend that has lowered class files into nodes and edges can emit
//! them as one JSON document; the loader replays the document through the
//! `GraphBuilder`. Node ids in a dump are the frontend's own allocations;
//! they only have to be unique within the document.

use anyhow::{Context, Result};
use jflow_common::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use jflow_common::options::AnalysisOptions;
use jflow_common::NodeId;
use serde::Deserialize;
use jflow_graph::annotations::ClassAnnotationView;
use jflow_graph::enums::EnumValue;
use jflow_graph::graph::MethodInfo;
use jflow_graph::node::{
    CallSiteNode, ConstantNode, ConstantValue, FieldNode, LocalNode, Node, ParameterNode,
    ReturnNode,
};
use jflow_graph::{
    BranchComparison, CompareOp, ControlFlowKind, DataFlowKind, Edge, EdgeKind, GraphBuilder,
    ProgramGraph, TypeRelation,
};

// =============================================================================
// Dump model
// =============================================================================

/// A method reference in the dump; `returns` defaults to `void`.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodRef {
    pub class: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "default_void")]
    pub returns: String,
}

fn default_void() -> String {
    "void".to_string()
}

impl MethodRef {
    fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            TypeDescriptor::named(&self.class),
            &self.name,
            self.params.iter().map(TypeDescriptor::named).collect(),
            TypeDescriptor::named(&self.returns),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstDump {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    Null,
    Enum {
        class: String,
        name: String,
        #[serde(default)]
        args: Vec<EnumValueDump>,
    },
}

impl ConstDump {
    fn value(&self) -> ConstantValue {
        match self {
            ConstDump::Int(v) => ConstantValue::Int(*v),
            ConstDump::Long(v) => ConstantValue::Long(*v),
            ConstDump::Float(v) => ConstantValue::Float(*v),
            ConstDump::Double(v) => ConstantValue::Double(*v),
            ConstDump::Bool(v) => ConstantValue::Bool(*v),
            ConstDump::Str(v) => ConstantValue::Str(v.clone()),
            ConstDump::Null => ConstantValue::Null,
            ConstDump::Enum { class, name, args } => ConstantValue::Enum {
                enum_type: TypeDescriptor::named(class),
                enum_name: name.clone(),
                constructor_args: args.iter().map(EnumValueDump::value).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumValueDump {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    EnumRef { class: String, name: String },
    Unknown,
}

impl EnumValueDump {
    fn value(&self) -> EnumValue {
        match self {
            EnumValueDump::Int(v) => EnumValue::Int(*v),
            EnumValueDump::Long(v) => EnumValue::Long(*v),
            EnumValueDump::Float(v) => EnumValue::Float(*v),
            EnumValueDump::Double(v) => EnumValue::Double(*v),
            EnumValueDump::Bool(v) => EnumValue::Bool(*v),
            EnumValueDump::Str(v) => EnumValue::Str(v.clone()),
            EnumValueDump::EnumRef { class, name } => EnumValue::EnumRef {
                enum_type: class.clone(),
                enum_name: name.clone(),
            },
            EnumValueDump::Unknown => EnumValue::Unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDump {
    Local {
        id: u32,
        name: String,
        #[serde(rename = "type")]
        declared_type: String,
        method: MethodRef,
    },
    Parameter {
        id: u32,
        index: u16,
        #[serde(rename = "type")]
        declared_type: String,
        method: MethodRef,
    },
    Field {
        id: u32,
        class: String,
        name: String,
        #[serde(rename = "type")]
        field_type: String,
        #[serde(default)]
        is_static: bool,
    },
    Return {
        id: u32,
        method: MethodRef,
        #[serde(default)]
        actual_type: Option<String>,
    },
    Constant {
        id: u32,
        value: ConstDump,
    },
    CallSite {
        id: u32,
        caller: MethodRef,
        callee: MethodRef,
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        receiver: Option<u32>,
        #[serde(default)]
        arguments: Vec<u32>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOpDump {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl From<CompareOpDump> for CompareOp {
    fn from(op: CompareOpDump) -> Self {
        match op {
            CompareOpDump::Eq => CompareOp::Eq,
            CompareOpDump::Ne => CompareOp::Ne,
            CompareOpDump::Lt => CompareOp::Lt,
            CompareOpDump::Ge => CompareOp::Ge,
            CompareOpDump::Gt => CompareOp::Gt,
            CompareOpDump::Le => CompareOp::Le,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CompareDump {
    pub op: CompareOpDump,
    pub comparand: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeDump {
    DataFlow {
        from: u32,
        to: u32,
        kind: DataFlowKindDump,
    },
    Call {
        from: u32,
        to: u32,
        #[serde(default)]
        is_virtual: bool,
        #[serde(default)]
        is_dynamic: bool,
    },
    ControlFlow {
        from: u32,
        to: u32,
        kind: ControlFlowKindDump,
        #[serde(default)]
        compare: Option<CompareDump>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFlowKindDump {
    Assign,
    ParameterPass,
    ReturnValue,
    FieldStore,
    FieldLoad,
    ArrayStore,
    ArrayLoad,
    Cast,
    Phi,
}

impl From<DataFlowKindDump> for DataFlowKind {
    fn from(kind: DataFlowKindDump) -> Self {
        match kind {
            DataFlowKindDump::Assign => DataFlowKind::Assign,
            DataFlowKindDump::ParameterPass => DataFlowKind::ParameterPass,
            DataFlowKindDump::ReturnValue => DataFlowKind::ReturnValue,
            DataFlowKindDump::FieldStore => DataFlowKind::FieldStore,
            DataFlowKindDump::FieldLoad => DataFlowKind::FieldLoad,
            DataFlowKindDump::ArrayStore => DataFlowKind::ArrayStore,
            DataFlowKindDump::ArrayLoad => DataFlowKind::ArrayLoad,
            DataFlowKindDump::Cast => DataFlowKind::Cast,
            DataFlowKindDump::Phi => DataFlowKind::Phi,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlFlowKindDump {
    Sequential,
    BranchTrue,
    BranchFalse,
    SwitchCase,
    SwitchDefault,
    Exception,
    Return,
}

impl From<ControlFlowKindDump> for ControlFlowKind {
    fn from(kind: ControlFlowKindDump) -> Self {
        match kind {
            ControlFlowKindDump::Sequential => ControlFlowKind::Sequential,
            ControlFlowKindDump::BranchTrue => ControlFlowKind::BranchTrue,
            ControlFlowKindDump::BranchFalse => ControlFlowKind::BranchFalse,
            ControlFlowKindDump::SwitchCase => ControlFlowKind::SwitchCase,
            ControlFlowKindDump::SwitchDefault => ControlFlowKind::SwitchDefault,
            ControlFlowKindDump::Exception => ControlFlowKind::Exception,
            ControlFlowKindDump::Return => ControlFlowKind::Return,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDump {
    #[serde(flatten)]
    pub method: MethodRef,
    #[serde(default)]
    pub return_node: Option<u32>,
    #[serde(default)]
    pub parameter_nodes: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeRelationDump {
    pub sub: String,
    pub sup: String,
    #[serde(default)]
    pub implements: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumConstantDump {
    pub name: String,
    #[serde(default)]
    pub args: Vec<EnumValueDump>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDump {
    pub class: String,
    #[serde(default)]
    pub constants: Vec<EnumConstantDump>,
}

/// The root of a graph dump document.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDump {
    #[serde(default)]
    pub nodes: Vec<NodeDump>,
    #[serde(default)]
    pub edges: Vec<EdgeDump>,
    #[serde(default)]
    pub methods: Vec<MethodDump>,
    #[serde(default)]
    pub types: Vec<TypeRelationDump>,
    #[serde(default)]
    pub enums: Vec<EnumDump>,
    #[serde(default)]
    pub annotations: Vec<ClassAnnotationView>,
}

// =============================================================================
// Loader
// =============================================================================

/// Replay a dump through the builder and freeze the resulting graph.
pub fn build_graph(dump: &GraphDump, options: &AnalysisOptions) -> Result<ProgramGraph> {
    let mut builder = GraphBuilder::new();

    for node in &dump.nodes {
        let built = match node {
            NodeDump::Local {
                id,
                name,
                declared_type,
                method,
            } => Node::Local(LocalNode {
                id: NodeId(*id),
                name: name.clone(),
                declared_type: TypeDescriptor::named(declared_type),
                owning_method: method.descriptor(),
            }),
            NodeDump::Parameter {
                id,
                index,
                declared_type,
                method,
            } => Node::Parameter(ParameterNode {
                id: NodeId(*id),
                index: *index,
                declared_type: TypeDescriptor::named(declared_type),
                owning_method: method.descriptor(),
            }),
            NodeDump::Field {
                id,
                class,
                name,
                field_type,
                is_static,
            } => Node::Field(FieldNode {
                id: NodeId(*id),
                descriptor: FieldDescriptor::new(
                    TypeDescriptor::named(class),
                    name,
                    TypeDescriptor::named(field_type),
                ),
                is_static: *is_static,
            }),
            NodeDump::Return {
                id,
                method,
                actual_type,
            } => Node::Return(ReturnNode {
                id: NodeId(*id),
                owning_method: method.descriptor(),
                resolved_actual_type: actual_type.as_deref().map(TypeDescriptor::named),
            }),
            NodeDump::Constant { id, value } => Node::Constant(ConstantNode {
                id: NodeId(*id),
                value: value.value(),
            }),
            NodeDump::CallSite {
                id,
                caller,
                callee,
                line,
                receiver,
                arguments,
            } => Node::CallSite(CallSiteNode {
                id: NodeId(*id),
                caller: caller.descriptor(),
                callee: callee.descriptor(),
                line: *line,
                receiver: (*receiver).map(NodeId),
                arguments: arguments.iter().map(|&a| NodeId(a)).collect(),
            }),
        };
        builder
            .add_node(built)
            .context("graph dump contains an invalid node")?;
    }

    for edge in &dump.edges {
        let built = match edge {
            EdgeDump::DataFlow { from, to, kind } => {
                Edge::dataflow(NodeId(*from), NodeId(*to), (*kind).into())
            }
            EdgeDump::Call {
                from,
                to,
                is_virtual,
                is_dynamic,
            } => Edge {
                from: NodeId(*from),
                to: NodeId(*to),
                kind: EdgeKind::Call {
                    is_virtual: *is_virtual,
                    is_dynamic: *is_dynamic,
                },
            },
            EdgeDump::ControlFlow {
                from,
                to,
                kind,
                compare,
            } => Edge {
                from: NodeId(*from),
                to: NodeId(*to),
                kind: EdgeKind::ControlFlow {
                    kind: (*kind).into(),
                    comparison: (*compare).map(|c| BranchComparison {
                        op: c.op.into(),
                        comparand: NodeId(c.comparand),
                    }),
                },
            },
        };
        builder
            .add_edge(built)
            .context("graph dump contains an invalid edge")?;
    }

    for method in &dump.methods {
        let mut info = MethodInfo::new(method.method.descriptor());
        if let Some(ret) = method.return_node {
            info = info.with_return_node(NodeId(ret));
        }
        info = info.with_parameter_nodes(method.parameter_nodes.iter().map(|&p| NodeId(p)));
        builder.add_method(info);
    }

    for relation in &dump.types {
        let kind = if relation.implements {
            TypeRelation::Implements
        } else {
            TypeRelation::Extends
        };
        builder.add_type_relation(
            TypeDescriptor::named(&relation.sub),
            TypeDescriptor::named(&relation.sup),
            kind,
        );
    }

    for enum_dump in &dump.enums {
        for constant in &enum_dump.constants {
            builder.add_enum_values(
                &enum_dump.class,
                &constant.name,
                constant.args.iter().map(EnumValueDump::value).collect(),
            );
        }
    }

    for view in &dump.annotations {
        builder.ingest_annotations(view, options);
    }

    builder.build().context("graph dump is inconsistent")
}

/// Parse a dump document from JSON text.
pub fn parse_dump(text: &str) -> Result<GraphDump> {
    serde_json::from_str(text).context("graph dump is not valid JSON")
}
