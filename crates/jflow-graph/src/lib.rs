//! Typed program graph for the jflow analysis framework.
//!
//! This crate provides:
//! - `GraphBuilder` - incremental construction with structural validation
//! - `ProgramGraph` - the frozen node/edge store with its derived indices
//! - Type-hierarchy index with transitive walkers
//! - Enum-constant extraction from lowered static initialisers
//! - Endpoint and JSON-binding extraction from reflective annotation views
//! - Lazy per-condition branch scopes

pub mod node;
pub use node::{
    CallSiteNode, ConstantNode, ConstantValue, FieldNode, LocalNode, Node, NodeKind, NodeKindMask,
    ParameterNode, ReturnNode,
};

pub mod edge;
pub use edge::{
    BranchComparison, CompareOp, ControlFlowKind, DataFlowKind, Edge, EdgeKind, TypeRelation,
};

pub mod builder;
pub use builder::{GraphBuilder, GraphError};

pub mod graph;
pub use graph::{GraphStats, MethodInfo, ProgramGraph};

pub mod hierarchy;
pub use hierarchy::{TypeEdge, TypeHierarchy};

pub mod enums;
pub use enums::{CtorArg, EnumValue, InitStmt, extract_enum_values};

pub mod annotations;
pub use annotations::{
    AnnotationInfo, AnnotationValue, ClassAnnotationView, FieldAnnotationView, JsonBindingInfo,
    MethodAnnotationView,
};

pub mod endpoints;
pub use endpoints::{EndpointInfo, HttpMethod, combine_paths, match_path, normalize_path_variables};

pub mod scopes;
pub use scopes::BranchScope;
