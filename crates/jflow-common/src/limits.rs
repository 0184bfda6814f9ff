//! Centralized limits and thresholds for the analysis engines.
//!
//! Centralizing these values prevents duplicate definitions with
//! inconsistent defaults and documents the rationale for each bound.

/// Default upper bound on backward-slice frontier expansion.
///
/// Slices are bounded so that pathological dataflow chains (deeply nested
/// helper calls, long assignment chains) terminate in predictable time. At
/// the boundary, unresolved dataflow contributes nothing and is not an error.
pub const DEFAULT_MAX_SLICE_DEPTH: u32 = 100;

/// Maximum number of propagation paths recorded per slice.
///
/// Path recording is opt-in and can explode combinatorially on diamond-shaped
/// dataflow; slices keep the first paths in visit order and drop the rest.
pub const MAX_PATHS_PER_SLICE: usize = 1_000;

/// Iteration cap on the dead-method fixpoint.
///
/// The dead set is monotone over a finite method universe so the loop always
/// terminates; the cap guards against accounting bugs turning into hangs.
pub const MAX_REACHABILITY_ITERATIONS: usize = 10_000;

/// Iteration cap on branch-scope reachability walks within one method.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 100_000;
