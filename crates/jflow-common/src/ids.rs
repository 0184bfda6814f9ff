//! Node identity and the process-wide id registry.
//!
//! Every graph node carries a `NodeId` handed out by a single monotonic
//! counter that spans the whole process. Ids are never reused and never
//! mutated; nothing relies on them being contiguous within one graph, only
//! on their uniqueness within a build.

use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Unique identifier for a node in a program graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::NONE
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

/// Allocate a fresh node id from the process-wide registry.
///
/// The counter is monotonic; `NodeId::NONE` is reserved and never issued.
pub fn fresh_node_id() -> NodeId {
    let id = NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed);
    debug_assert!(id != u32::MAX, "node id space exhausted");
    NodeId(id)
}

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Allocate a process-unique graph identity.
///
/// Used to key memoized analysis results so that results computed against one
/// frozen graph can never be served for another.
pub fn fresh_graph_id() -> u64 {
    NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique_and_monotonic() {
        let a = fresh_node_id();
        let b = fresh_node_id();
        let c = fresh_node_id();
        assert!(a.0 < b.0 && b.0 < c.0);
        assert!(!a.is_none());
    }

    #[test]
    fn graph_ids_are_unique() {
        assert_ne!(fresh_graph_id(), fresh_graph_id());
    }
}
