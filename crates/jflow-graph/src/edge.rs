//! Graph edges.
//!
//! Dataflow, call, and control-flow edges connect node ids; type relations
//! connect declared types and live in the hierarchy index (`TypeEdge`).

use jflow_common::NodeId;
use serde::Serialize;

/// The flavor of a dataflow edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DataFlowKind {
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

/// The flavor of a control-flow edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ControlFlowKind {
    Sequential,
    BranchTrue,
    BranchFalse,
    SwitchCase,
    SwitchDefault,
    Exception,
    Return,
}

impl ControlFlowKind {
    /// Whether this edge leaves a branching condition.
    #[must_use]
    pub fn is_branch(self) -> bool {
        matches!(self, ControlFlowKind::BranchTrue | ControlFlowKind::BranchFalse)
    }

    /// Branch scopes follow these kinds when collecting a branch's nodes.
    #[must_use]
    pub fn is_scope_walk(self) -> bool {
        matches!(
            self,
            ControlFlowKind::Sequential
                | ControlFlowKind::SwitchCase
                | ControlFlowKind::SwitchDefault
                | ControlFlowKind::Exception
                | ControlFlowKind::Return
        )
    }
}

/// Comparison operator of a conditional branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
        })
    }
}

/// The comparison a conditional branch tests: `<condition> <op> <comparand>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BranchComparison {
    pub op: CompareOp,
    pub comparand: NodeId,
}

/// Payload of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum EdgeKind {
    DataFlow(DataFlowKind),
    /// From a call-site node to the callee's entry (its return node).
    Call { is_virtual: bool, is_dynamic: bool },
    /// Every `BranchTrue`/`BranchFalse` edge carries its comparison.
    ControlFlow {
        kind: ControlFlowKind,
        comparison: Option<BranchComparison>,
    },
}

impl EdgeKind {
    #[must_use]
    pub fn as_dataflow(self) -> Option<DataFlowKind> {
        match self {
            EdgeKind::DataFlow(kind) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_control_flow(self) -> Option<(ControlFlowKind, Option<BranchComparison>)> {
        match self {
            EdgeKind::ControlFlow { kind, comparison } => Some((kind, comparison)),
            _ => None,
        }
    }
}

/// A directed edge between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

impl Edge {
    #[must_use]
    pub fn dataflow(from: NodeId, to: NodeId, kind: DataFlowKind) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::DataFlow(kind),
        }
    }

    #[must_use]
    pub fn control(from: NodeId, to: NodeId, kind: ControlFlowKind) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::ControlFlow {
                kind,
                comparison: None,
            },
        }
    }

    #[must_use]
    pub fn branch(
        from: NodeId,
        to: NodeId,
        kind: ControlFlowKind,
        comparison: BranchComparison,
    ) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::ControlFlow {
                kind,
                comparison: Some(comparison),
            },
        }
    }
}

/// Kind of a direct type relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRelation {
    Extends,
    Implements,
}
