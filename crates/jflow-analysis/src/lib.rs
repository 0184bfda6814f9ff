//! Analysis engines for the jflow framework.
//!
//! This crate provides:
//! - `SliceCache` / `SliceResult` - memoised backward slicing over dataflow
//! - `ReachabilityEngine` - dead branches and methods under assumed call results
//! - `Analyzer` - the query façade bundling a frozen graph with its caches

pub mod slicer;
pub use slicer::{FoundConstant, SliceCache, SlicePath, SliceResult, resolve_value};

pub mod reachability;
pub use reachability::{Assumption, DeadBranch, DeadCodeResult, ReachabilityEngine, eval};

pub mod queries;
pub use queries::{Analyzer, ArgumentConstant, FieldMatch, ReturnTypeInfo};
