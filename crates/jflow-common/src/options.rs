//! Analysis configuration.
//!
//! `AnalysisOptions` covers ingestion-time filtering and reachability roots;
//! `SliceOptions` covers the per-query knobs of the backward slicer. Both
//! live here so the graph store and the engines can share them without a
//! circular dependency.

use crate::limits;
use std::sync::Arc;

/// How (and whether) the frontend computes a whole-program call graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallGraphMode {
    /// No call graph; call edges come only from directly observed call sites.
    #[default]
    None,
    /// Class-hierarchy analysis.
    Cha,
    /// Rapid-type analysis.
    Rta,
}

/// Diagnostic sink; shared so options stay cloneable.
pub type VerboseSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Framework-level configuration.
#[derive(Clone, Default)]
pub struct AnalysisOptions {
    /// Only classes whose fully qualified name starts with one of these
    /// prefixes are processed for methods/endpoints/JSON-binding info.
    /// Empty means "include everything".
    pub include_packages: Vec<String>,
    /// Classes with a matching prefix are excluded. Applied before
    /// `include_packages`.
    pub exclude_packages: Vec<String>,
    /// Whether and how the frontend computes a whole-program call graph.
    pub build_call_graph: CallGraphMode,
    /// Regexes naming methods considered live roots for reachability closure.
    pub entry_points: Vec<String>,
    /// Optional sink for diagnostic strings. Messages are also forwarded to
    /// `tracing::debug!`.
    pub verbose: Option<VerboseSink>,
}

impl AnalysisOptions {
    /// Emit a diagnostic message to the configured sink, if any.
    pub fn verbose(&self, msg: &str) {
        tracing::debug!(target: "jflow", "{msg}");
        if let Some(sink) = &self.verbose {
            sink(msg);
        }
    }

    /// Package filtering: exclusions win, then inclusions; an empty include
    /// list admits everything.
    #[must_use]
    pub fn is_class_included(&self, class_name: &str) -> bool {
        if self
            .exclude_packages
            .iter()
            .any(|p| class_name.starts_with(p.as_str()))
        {
            return false;
        }
        if self.include_packages.is_empty() {
            return true;
        }
        self.include_packages
            .iter()
            .any(|p| class_name.starts_with(p.as_str()))
    }
}

impl std::fmt::Debug for AnalysisOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisOptions")
            .field("include_packages", &self.include_packages)
            .field("exclude_packages", &self.exclude_packages)
            .field("build_call_graph", &self.build_call_graph)
            .field("entry_points", &self.entry_points)
            .field("verbose", &self.verbose.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

/// Per-query knobs of the backward slicer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceOptions {
    /// Upper bound on reverse-frontier expansion.
    pub max_depth: u32,
    /// Whether the slicer follows `ReturnValue` edges into callees.
    pub traverse_method_calls: bool,
    /// Whether propagation paths are recorded on the result.
    pub collect_paths: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            max_depth: limits::DEFAULT_MAX_SLICE_DEPTH,
            traverse_method_calls: true,
            collect_paths: false,
        }
    }
}

impl SliceOptions {
    /// Stable fingerprint used as part of the memo-cache key.
    #[must_use]
    pub fn fingerprint(self) -> u64 {
        (u64::from(self.max_depth) << 2)
            | (u64::from(self.traverse_method_calls) << 1)
            | u64::from(self.collect_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_filtering_applies_excludes_first() {
        let opts = AnalysisOptions {
            include_packages: vec!["com.example.".into()],
            exclude_packages: vec!["com.example.generated.".into()],
            ..Default::default()
        };
        assert!(opts.is_class_included("com.example.Client"));
        assert!(!opts.is_class_included("com.example.generated.Stub"));
        assert!(!opts.is_class_included("org.other.Thing"));
    }

    #[test]
    fn empty_include_list_admits_everything() {
        let opts = AnalysisOptions::default();
        assert!(opts.is_class_included("anything.at.All"));
    }

    #[test]
    fn fingerprint_distinguishes_options() {
        let a = SliceOptions::default();
        let b = SliceOptions {
            collect_paths: true,
            ..a
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
