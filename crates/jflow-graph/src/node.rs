//! Graph nodes.
//!
//! Every node is a tagged variant carrying its own `NodeId`. Value nodes
//! (locals, parameters, fields, returns, constants) participate in dataflow;
//! call sites do not — edges to and from a call site mediate call flow.

use crate::enums::EnumValue;
use bitflags::bitflags;
use jflow_common::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use jflow_common::{NodeId, well_known};
use serde::Serialize;
use smallvec::SmallVec;

// =============================================================================
// Constant values
// =============================================================================

/// A compile-time constant observed in bytecode.
///
/// `Long` values are preserved at full width; truncating to 32 bits is a
/// bug, not acceptable behavior.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    Null,
    /// An enum constant. The primary value of an enum constant is its first
    /// user-defined constructor argument.
    Enum {
        enum_type: TypeDescriptor,
        enum_name: String,
        constructor_args: Vec<EnumValue>,
    },
}

impl ConstantValue {
    /// The value this constant contributes to queries. For `Enum` that is
    /// the first constructor argument (as a plain constant, when it is one).
    #[must_use]
    pub fn primary(&self) -> Option<ConstantValue> {
        match self {
            ConstantValue::Enum {
                constructor_args, ..
            } => constructor_args.first().and_then(EnumValue::as_constant),
            other => Some(other.clone()),
        }
    }

    /// The wrapper class a boxed form of this constant would have.
    #[must_use]
    pub fn boxed_type(&self) -> Option<TypeDescriptor> {
        let class = match self {
            ConstantValue::Int(_) => "java.lang.Integer",
            ConstantValue::Long(_) => "java.lang.Long",
            ConstantValue::Float(_) => "java.lang.Float",
            ConstantValue::Double(_) => "java.lang.Double",
            ConstantValue::Bool(_) => "java.lang.Boolean",
            ConstantValue::Str(_) => well_known::STRING,
            ConstantValue::Null => return None,
            ConstantValue::Enum { enum_type, .. } => return Some(enum_type.clone()),
        };
        Some(TypeDescriptor::named(class))
    }

    /// Interning key: floats are keyed by bit pattern so that constants can
    /// live in hash maps.
    #[must_use]
    pub fn intern_key(&self) -> ConstantKey {
        match self {
            ConstantValue::Int(v) => ConstantKey::Int(*v),
            ConstantValue::Long(v) => ConstantKey::Long(*v),
            ConstantValue::Float(v) => ConstantKey::Float(v.to_bits()),
            ConstantValue::Double(v) => ConstantKey::Double(v.to_bits()),
            ConstantValue::Bool(v) => ConstantKey::Bool(*v),
            ConstantValue::Str(v) => ConstantKey::Str(v.clone()),
            ConstantValue::Null => ConstantKey::Null,
            ConstantValue::Enum {
                enum_type,
                enum_name,
                ..
            } => ConstantKey::Enum(enum_type.class_name.clone(), enum_name.clone()),
        }
    }
}

impl std::fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Long(v) => write!(f, "{v}L"),
            ConstantValue::Float(v) => write!(f, "{v}f"),
            ConstantValue::Double(v) => write!(f, "{v}"),
            ConstantValue::Bool(v) => write!(f, "{v}"),
            ConstantValue::Str(v) => write!(f, "\"{v}\""),
            ConstantValue::Null => f.write_str("null"),
            ConstantValue::Enum {
                enum_type,
                enum_name,
                ..
            } => write!(f, "{}.{}", enum_type.class_name, enum_name),
        }
    }
}

/// Hashable identity of a constant, `(variant, value)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstantKey {
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    Bool(bool),
    Str(String),
    Null,
    Enum(String, String),
}

// =============================================================================
// Node variants
// =============================================================================

/// A local variable slot within a method body.
///
/// `new T(...)` expressions produce a local whose declared type is `T`
/// itself, not the erased static type of the expression; this is what lets
/// return-type queries recover precise types behind `Object` declarations.
#[derive(Clone, Debug, Serialize)]
pub struct LocalNode {
    pub id: NodeId,
    pub name: String,
    pub declared_type: TypeDescriptor,
    pub owning_method: MethodDescriptor,
}

/// A declared method parameter. `index` matches declaration order.
#[derive(Clone, Debug, Serialize)]
pub struct ParameterNode {
    pub id: NodeId,
    pub index: u16,
    pub declared_type: TypeDescriptor,
    pub owning_method: MethodDescriptor,
}

/// A field reference (static or instance).
#[derive(Clone, Debug, Serialize)]
pub struct FieldNode {
    pub id: NodeId,
    pub descriptor: FieldDescriptor,
    pub is_static: bool,
}

/// The single return slot of a method.
#[derive(Clone, Debug, Serialize)]
pub struct ReturnNode {
    pub id: NodeId,
    pub owning_method: MethodDescriptor,
    /// Filled in when the frontend resolved a more precise type than the
    /// declared one.
    pub resolved_actual_type: Option<TypeDescriptor>,
}

/// An interned constant.
#[derive(Clone, Debug, Serialize)]
pub struct ConstantNode {
    pub id: NodeId,
    pub value: ConstantValue,
}

/// A specific invocation location. Not a value node; `ParameterPass` edges
/// arrive from the arguments and a `ReturnValue` edge leaves toward the
/// receiving local, if any.
#[derive(Clone, Debug, Serialize)]
pub struct CallSiteNode {
    pub id: NodeId,
    pub caller: MethodDescriptor,
    pub callee: MethodDescriptor,
    pub line: Option<u32>,
    pub receiver: Option<NodeId>,
    /// Argument ordering matches the callee's parameter ordering.
    pub arguments: SmallVec<[NodeId; 4]>,
}

impl CallSiteNode {
    /// `caller_signature:line`, with `?` when the line is unknown.
    #[must_use]
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.caller.signature()),
            None => format!("{}:?", self.caller.signature()),
        }
    }
}

/// A graph node.
#[derive(Clone, Debug, Serialize)]
pub enum Node {
    Local(LocalNode),
    Parameter(ParameterNode),
    Field(FieldNode),
    Return(ReturnNode),
    Constant(ConstantNode),
    CallSite(CallSiteNode),
}

impl Node {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Node::Local(n) => n.id,
            Node::Parameter(n) => n.id,
            Node::Field(n) => n.id,
            Node::Return(n) => n.id,
            Node::Constant(n) => n.id,
            Node::CallSite(n) => n.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Local(_) => NodeKind::Local,
            Node::Parameter(_) => NodeKind::Parameter,
            Node::Field(_) => NodeKind::Field,
            Node::Return(_) => NodeKind::Return,
            Node::Constant(_) => NodeKind::Constant,
            Node::CallSite(_) => NodeKind::CallSite,
        }
    }

    /// Whether this node can participate in dataflow as a value.
    #[must_use]
    pub fn is_value(&self) -> bool {
        !matches!(self, Node::CallSite(_))
    }

    /// The method this node belongs to, when it is method-scoped.
    /// Fields and constants are global.
    #[must_use]
    pub fn owning_method(&self) -> Option<&MethodDescriptor> {
        match self {
            Node::Local(n) => Some(&n.owning_method),
            Node::Parameter(n) => Some(&n.owning_method),
            Node::Return(n) => Some(&n.owning_method),
            Node::CallSite(n) => Some(&n.caller),
            Node::Field(_) | Node::Constant(_) => None,
        }
    }

    #[must_use]
    pub fn as_constant(&self) -> Option<&ConstantNode> {
        match self {
            Node::Constant(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_call_site(&self) -> Option<&CallSiteNode> {
        match self {
            Node::CallSite(n) => Some(n),
            _ => None,
        }
    }
}

/// Discriminant of a `Node` variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum NodeKind {
    Local = 0,
    Parameter = 1,
    Field = 2,
    Return = 3,
    Constant = 4,
    CallSite = 5,
}

impl NodeKind {
    pub const COUNT: usize = 6;

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Filter mask over node kinds for combined iteration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeKindMask: u8 {
        const LOCAL = 1 << 0;
        const PARAMETER = 1 << 1;
        const FIELD = 1 << 2;
        const RETURN = 1 << 3;
        const CONSTANT = 1 << 4;
        const CALL_SITE = 1 << 5;
        const VALUES = Self::LOCAL.bits()
            | Self::PARAMETER.bits()
            | Self::FIELD.bits()
            | Self::RETURN.bits()
            | Self::CONSTANT.bits();
    }
}

impl NodeKindMask {
    #[must_use]
    pub fn contains_kind(self, kind: NodeKind) -> bool {
        self.contains(NodeKindMask::from_bits_truncate(1 << kind as u8))
    }
}
