//! HTTP endpoint extraction and path matching.
//!
//! Endpoint metadata comes from class- and method-level mapping annotations.
//! Paths are combined so that exactly one `/` separates non-empty segments,
//! a leading `/` is always present, and empty paths become `/`. `{…}` path
//! variables are normalised to `*`. Pattern matching supports `*` (one
//! segment) and `**` (any number of segments, greedy with backtrack).

use crate::annotations::{AnnotationInfo, ClassAnnotationView};
use jflow_common::descriptor::MethodDescriptor;
use serde::{Deserialize, Serialize};

// =============================================================================
// HTTP method
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    /// `RequestMapping` without a dedicated verb; matches every method.
    Any,
}

impl HttpMethod {
    /// Resolve from an annotation simple name, e.g. `GetMapping`.
    #[must_use]
    pub fn from_annotation_name(simple_name: &str) -> Option<HttpMethod> {
        const MAPPINGS: &[(&str, HttpMethod)] = &[
            ("GetMapping", HttpMethod::Get),
            ("PostMapping", HttpMethod::Post),
            ("PutMapping", HttpMethod::Put),
            ("DeleteMapping", HttpMethod::Delete),
            ("PatchMapping", HttpMethod::Patch),
            ("RequestMapping", HttpMethod::Any),
        ];
        MAPPINGS
            .iter()
            .find(|(name, _)| simple_name.contains(name))
            .map(|(_, method)| *method)
    }

    /// `Any` is compatible with every concrete method, in both directions.
    #[must_use]
    pub fn accepts(self, other: HttpMethod) -> bool {
        self == HttpMethod::Any || other == HttpMethod::Any || self == other
    }
}

// =============================================================================
// Paths
// =============================================================================

/// Join two path fragments with exactly one `/`, always leading with `/`.
#[must_use]
pub fn combine_paths(class_path: &str, method_path: &str) -> String {
    let class_part = class_path.trim_matches('/');
    let method_part = method_path.trim_matches('/');
    let mut out = String::with_capacity(class_part.len() + method_part.len() + 2);
    out.push('/');
    out.push_str(class_part);
    if !class_part.is_empty() && !method_part.is_empty() {
        out.push('/');
    }
    out.push_str(method_part);
    out
}

/// Replace `{var}` path variables with `*`.
#[must_use]
pub fn normalize_path_variables(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() >= 2 {
                "*"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Match `path` against `pattern`.
///
/// `*` consumes exactly one segment; `**` consumes zero or more and retries
/// longer consumptions on failure, so it also works mid-pattern.
#[must_use]
pub fn match_path(pattern: &str, path: &str) -> bool {
    let pat: Vec<&str> = segments(pattern);
    let subject: Vec<&str> = segments(path);
    match_segments(&pat, &subject)
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return path.is_empty();
    };
    if *head == "**" {
        // Zero or more segments; try every split point.
        return (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]));
    }
    let Some((segment, path_rest)) = path.split_first() else {
        return false;
    };
    (*head == "*" || head == segment) && match_segments(rest, path_rest)
}

// =============================================================================
// Endpoint extraction
// =============================================================================

/// One extracted HTTP endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EndpointInfo {
    pub http_method: HttpMethod,
    /// Combined, normalised path (`{var}` already rewritten to `*`).
    pub path: String,
    pub handler: MethodDescriptor,
}

impl EndpointInfo {
    /// Filter predicate used by the store's `endpoints` query.
    #[must_use]
    pub fn matches(&self, path_pattern: Option<&str>, method: Option<HttpMethod>) -> bool {
        if let Some(m) = method
            && !self.http_method.accepts(m)
        {
            return false;
        }
        match path_pattern {
            Some(pattern) => match_path(pattern, &self.path),
            None => true,
        }
    }
}

/// Read the path attribute (`value` or `path`) off a mapping annotation.
fn annotation_path(ann: &AnnotationInfo) -> String {
    ann.values
        .get("value")
        .or_else(|| ann.values.get("path"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Extract every endpoint a class declares.
///
/// The class-level mapping contributes the path prefix; each method-level
/// mapping annotation yields one endpoint.
#[must_use]
pub fn extract_endpoints(view: &ClassAnnotationView) -> Vec<EndpointInfo> {
    let class_path = view
        .class_annotations
        .iter()
        .find(|ann| HttpMethod::from_annotation_name(&ann.class_name).is_some())
        .map(annotation_path)
        .unwrap_or_default();

    let mut endpoints = Vec::new();
    for method_view in &view.methods {
        for ann in &method_view.annotations {
            let Some(http_method) = HttpMethod::from_annotation_name(&ann.class_name) else {
                continue;
            };
            let combined = combine_paths(&class_path, &annotation_path(ann));
            endpoints.push(EndpointInfo {
                http_method,
                path: normalize_path_variables(&combined),
                handler: method_view.method.clone(),
            });
        }
    }
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_paths_boundary_cases() {
        assert_eq!(combine_paths("/api", "users"), "/api/users");
        assert_eq!(combine_paths("", ""), "/");
        assert_eq!(combine_paths("/api/", "/users"), "/api/users");
        assert_eq!(combine_paths("", "users"), "/users");
        assert_eq!(combine_paths("api", ""), "/api");
    }

    #[test]
    fn single_star_matches_one_segment() {
        assert!(match_path("/a/*", "/a/b"));
        assert!(!match_path("/a/*", "/a/b/c"));
        assert!(!match_path("/a/*", "/a"));
    }

    #[test]
    fn double_star_matches_any_depth() {
        assert!(match_path("/a/**", "/a/b"));
        assert!(match_path("/a/**", "/a/b/c"));
        assert!(match_path("/a/**", "/a"));
    }

    #[test]
    fn double_star_backtracks_mid_pattern() {
        assert!(match_path("/a/**/d", "/a/b/c/d"));
        assert!(match_path("/a/**/d", "/a/d"));
        assert!(!match_path("/a/**/d", "/a/b/c"));
        assert!(match_path("/**/c/**", "/a/b/c/d"));
    }

    #[test]
    fn path_variables_normalise_to_star() {
        assert_eq!(normalize_path_variables("/users/{id}/orders"), "/users/*/orders");
        assert_eq!(normalize_path_variables("/users/{}"), "/users/*");
    }

    #[test]
    fn http_method_resolution_by_containment() {
        assert_eq!(HttpMethod::from_annotation_name("GetMapping"), Some(HttpMethod::Get));
        assert_eq!(
            HttpMethod::from_annotation_name("RequestMapping"),
            Some(HttpMethod::Any)
        );
        assert_eq!(HttpMethod::from_annotation_name("Autowired"), None);
    }
}
