//! Reflective annotation views and JSON-binding extraction.
//!
//! The frontend exposes annotations as plain data: simple name, fully
//! qualified name, and a name→value map. The extractor reads `JsonIgnore`
//! and `JsonProperty` off fields and getters to record how a class binds to
//! JSON.

use jflow_common::descriptor::{FieldDescriptor, MethodDescriptor};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// =============================================================================
// Annotation model
// =============================================================================

/// An annotation attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// The value as a string; a multi-valued attribute yields its first
    /// element.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Str(s) => Some(s),
            AnnotationValue::List(items) => items.first().and_then(AnnotationValue::as_str),
            _ => None,
        }
    }

    /// Render for containment checks (`access` stringifies to something
    /// containing `WRITE_ONLY`).
    #[must_use]
    pub fn stringify(&self) -> String {
        match self {
            AnnotationValue::Str(s) => s.clone(),
            AnnotationValue::Int(v) => v.to_string(),
            AnnotationValue::Bool(v) => v.to_string(),
            AnnotationValue::List(items) => {
                let parts: Vec<String> = items.iter().map(AnnotationValue::stringify).collect();
                format!("[{}]", parts.join(","))
            }
        }
    }
}

/// One annotation as the frontend observed it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInfo {
    /// Simple name, e.g. `GetMapping`.
    pub class_name: String,
    /// Fully qualified name, e.g.
    /// `org.springframework.web.bind.annotation.GetMapping`.
    pub fully_qualified_name: String,
    #[serde(default)]
    pub values: FxHashMap<String, AnnotationValue>,
}

impl AnnotationInfo {
    #[must_use]
    pub fn named(simple: &str, qualified: &str) -> Self {
        Self {
            class_name: simple.to_string(),
            fully_qualified_name: qualified.to_string(),
            values: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, key: &str, value: AnnotationValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

/// Annotations attached to one method.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodAnnotationView {
    pub method: MethodDescriptor,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,
}

/// Annotations attached to one field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldAnnotationView {
    pub field: FieldDescriptor,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,
}

/// Everything the frontend observed about one class's annotations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassAnnotationView {
    pub class_name: String,
    #[serde(default)]
    pub class_annotations: Vec<AnnotationInfo>,
    #[serde(default)]
    pub methods: Vec<MethodAnnotationView>,
    #[serde(default)]
    pub fields: Vec<FieldAnnotationView>,
}

// =============================================================================
// JSON binding
// =============================================================================

/// How a field or getter binds to JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JsonBindingInfo {
    /// Name override from `JsonProperty`, when present and non-empty.
    pub json_name: Option<String>,
    /// Set by `JsonIgnore`, or by `JsonProperty(access = WRITE_ONLY)`.
    pub is_ignored: bool,
}

impl JsonBindingInfo {
    /// Read `JsonIgnore`/`JsonProperty` off one annotated member.
    #[must_use]
    pub fn from_annotations(annotations: &[AnnotationInfo]) -> Self {
        let mut info = JsonBindingInfo::default();
        for ann in annotations {
            match ann.class_name.as_str() {
                "JsonIgnore" => info.is_ignored = true,
                "JsonProperty" => {
                    if let Some(value) = ann.values.get("value")
                        && let Some(name) = value.as_str()
                        && !name.is_empty()
                    {
                        info.json_name = Some(name.to_string());
                    }
                    if let Some(access) = ann.values.get("access")
                        && access.stringify().contains("WRITE_ONLY")
                    {
                        info.is_ignored = true;
                    }
                }
                _ => {}
            }
        }
        info
    }
}

/// Whether `name` is a JavaBeans-style getter name (`getX` or `isX`).
#[must_use]
pub fn is_getter_name(name: &str) -> bool {
    (name.starts_with("get") && name.len() > 3) || (name.starts_with("is") && name.len() > 2)
}
