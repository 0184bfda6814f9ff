//! Common types and utilities for the jflow analysis framework.
//!
//! This crate provides foundational types used across all jflow crates:
//! - Node identifiers and the process-wide id registry (`NodeId`, `fresh_node_id`)
//! - Type/method/field descriptors (`TypeDescriptor`, `MethodDescriptor`, `FieldDescriptor`)
//! - Well-known JVM class names and the primitive/wrapper table
//! - Method patterns with wildcard and regex matching (`MethodPattern`)
//! - Analysis configuration (`AnalysisOptions`, `SliceOptions`)
//! - Centralized limits and thresholds

// Node identity - process-wide monotonic id allocation
pub mod ids;
pub use ids::{NodeId, fresh_graph_id, fresh_node_id};

// Descriptors - value types shared across every phase
pub mod descriptor;
pub use descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};

// Well-known JVM names (wrapper classes, Object, Enum, ...)
pub mod well_known;

// Method patterns - wildcard/regex predicates over method descriptors
pub mod pattern;
pub use pattern::MethodPattern;

// Analysis configuration
pub mod options;
pub use options::{AnalysisOptions, CallGraphMode, SliceOptions};

// Centralized limits and thresholds
pub mod limits;
