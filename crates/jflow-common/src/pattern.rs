//! Method patterns: wildcard/regex predicates over method descriptors.
//!
//! A pattern component that is `None` matches unconditionally. In the default
//! mode a trailing `*` turns the class/name component into a prefix match; in
//! regex mode (`use_regex`) class and name are matched as anchored regexes.
//! Parameter lists are compared positionally against erased class names.

use crate::descriptor::MethodDescriptor;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// A predicate over method descriptors.
///
/// Annotation entries are advisory at this level: annotation-driven matching
/// happens in the endpoint extractor, which sees the reflective annotation
/// view the frontend provides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MethodPattern {
    /// Declaring class to match, or `None` for any.
    pub class_name: Option<String>,
    /// Method name to match, or `None` for any.
    pub name: Option<String>,
    /// Exact erased parameter type list, or `None` for any arity.
    pub parameter_types: Option<Vec<String>>,
    /// Erased return type, or `None` for any.
    pub return_type: Option<String>,
    /// Advisory annotation names.
    pub annotations: Vec<String>,
    /// Interpret `class_name`/`name` as anchored regexes.
    pub use_regex: bool,
}

impl MethodPattern {
    /// A pattern that matches every method.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Exact class + name pattern, the common query shape.
    #[must_use]
    pub fn of(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parameter_types(mut self, parameter_types: Vec<String>) -> Self {
        self.parameter_types = Some(parameter_types);
        self
    }

    #[must_use]
    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    #[must_use]
    pub fn regex(mut self) -> Self {
        self.use_regex = true;
        self
    }

    /// Compile the pattern for repeated matching.
    #[must_use]
    pub fn compile(&self) -> CompiledPattern<'_> {
        CompiledPattern::new(self)
    }

    /// One-off convenience; compiles and matches in one step.
    #[must_use]
    pub fn matches(&self, method: &MethodDescriptor) -> bool {
        self.compile().matches(method)
    }
}

/// A `MethodPattern` with its regex components compiled once.
pub struct CompiledPattern<'a> {
    pattern: &'a MethodPattern,
    class_re: Option<Regex>,
    name_re: Option<Regex>,
}

impl<'a> CompiledPattern<'a> {
    fn new(pattern: &'a MethodPattern) -> Self {
        let (class_re, name_re) = if pattern.use_regex {
            (
                pattern.class_name.as_deref().and_then(compile_anchored),
                pattern.name.as_deref().and_then(compile_anchored),
            )
        } else {
            (None, None)
        };
        Self {
            pattern,
            class_re,
            name_re,
        }
    }

    /// Whether `method` satisfies every specified component.
    #[must_use]
    pub fn matches(&self, method: &MethodDescriptor) -> bool {
        let p = self.pattern;
        if !component_matches(
            p.class_name.as_deref(),
            self.class_re.as_ref(),
            p.use_regex,
            &method.declaring_class.class_name,
        ) {
            return false;
        }
        if !component_matches(
            p.name.as_deref(),
            self.name_re.as_ref(),
            p.use_regex,
            &method.name,
        ) {
            return false;
        }
        if let Some(params) = &p.parameter_types {
            if params.len() != method.parameter_types.len() {
                return false;
            }
            if params
                .iter()
                .zip(&method.parameter_types)
                .any(|(want, have)| want != &have.class_name)
            {
                return false;
            }
        }
        if let Some(ret) = &p.return_type
            && ret != &method.return_type.class_name
        {
            return false;
        }
        true
    }
}

/// Anchor and compile a regex component. A malformed regex matches nothing;
/// a query over it yields an empty result rather than an error.
fn compile_anchored(source: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{source})$")) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(pattern = source, %err, "invalid regex in method pattern");
            None
        }
    }
}

fn component_matches(
    component: Option<&str>,
    compiled: Option<&Regex>,
    use_regex: bool,
    candidate: &str,
) -> bool {
    let Some(component) = component else {
        return true;
    };
    if use_regex {
        // Malformed regexes compile to None and match nothing.
        return compiled.is_some_and(|re| re.is_match(candidate));
    }
    if let Some(prefix) = component.strip_suffix('*') {
        candidate.starts_with(prefix)
    } else {
        candidate == component
    }
}
