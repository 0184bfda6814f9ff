//! Enum-constant extraction.
//!
//! Enum class bodies lower deterministically into a static initialiser that
//! allocates each constant with `(name, ordinal, user-args...)`. The
//! extractor scans that initialiser in order, tracking which locals hold
//! which values and which locals alias a fresh allocation, and records the
//! user-defined constructor arguments per enum field — no source-level
//! reflection required.

use crate::node::ConstantValue;
use jflow_common::descriptor::FieldDescriptor;
use jflow_common::well_known;
use rustc_hash::FxHashMap;
use serde::Serialize;

// =============================================================================
// Extracted values
// =============================================================================

/// A single user-defined constructor argument of an enum constant.
///
/// Integer arguments are `i32`, longs are `i64` (full width), booleans are
/// `bool`, strings are text. A reference to another enum's constant is the
/// distinguished `EnumRef` sentinel, resolved lazily against the enum index.
/// Arguments the extractor cannot resolve are `Unknown`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum EnumValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    EnumRef { enum_type: String, enum_name: String },
    Unknown,
}

impl EnumValue {
    /// The plain constant this value denotes, when it is one. `EnumRef` and
    /// `Unknown` have no constant form at this level.
    #[must_use]
    pub fn as_constant(&self) -> Option<ConstantValue> {
        match self {
            EnumValue::Int(v) => Some(ConstantValue::Int(*v)),
            EnumValue::Long(v) => Some(ConstantValue::Long(*v)),
            EnumValue::Float(v) => Some(ConstantValue::Float(*v)),
            EnumValue::Double(v) => Some(ConstantValue::Double(*v)),
            EnumValue::Bool(v) => Some(ConstantValue::Bool(*v)),
            EnumValue::Str(v) => Some(ConstantValue::Str(v.clone())),
            EnumValue::EnumRef { .. } | EnumValue::Unknown => None,
        }
    }

    fn from_constant(value: &ConstantValue) -> Option<EnumValue> {
        match value {
            ConstantValue::Int(v) => Some(EnumValue::Int(*v)),
            ConstantValue::Long(v) => Some(EnumValue::Long(*v)),
            ConstantValue::Float(v) => Some(EnumValue::Float(*v)),
            ConstantValue::Double(v) => Some(EnumValue::Double(*v)),
            ConstantValue::Bool(v) => Some(EnumValue::Bool(*v)),
            ConstantValue::Str(v) => Some(EnumValue::Str(v.clone())),
            ConstantValue::Null | ConstantValue::Enum { .. } => None,
        }
    }
}

// =============================================================================
// Static-initialiser IR
// =============================================================================

/// A constructor argument as the frontend observed it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum CtorArg {
    Const(ConstantValue),
    /// `Wrapper.valueOf(<const>)` boxing around a constant.
    Boxed { wrapper: String, value: ConstantValue },
    Local(String),
    StaticField(FieldDescriptor),
}

/// One lowered statement of an enum class's static initialiser.
///
/// This is the ingestion contract for enum bodies: the frontend emits these
/// in body order, before any graph edges exist for the initialiser.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum InitStmt {
    /// `local = <const>`
    AssignConst { local: String, value: ConstantValue },
    /// `local = Wrapper.valueOf(<const>)`
    AssignBoxed {
        local: String,
        wrapper: String,
        value: ConstantValue,
    },
    /// `local = Other.FIELD` (static field read)
    AssignStaticField { local: String, field: FieldDescriptor },
    /// `left = right` (local-to-local copy)
    AssignLocal { left: String, right: String },
    /// `local = new <class>` (fresh allocation; `local` becomes a root)
    AssignNew { local: String, class_name: String },
    /// `receiver.<init>(name, ordinal, user-args...)`
    ConstructorCall { receiver: String, arguments: Vec<CtorArg> },
    /// `<class>.FIELD = local` (static field store)
    StoreStaticField { field: FieldDescriptor, local: String },
}

// =============================================================================
// Extraction
// =============================================================================

/// `(enum field name, user-defined constructor arguments)` pairs in
/// initialiser order.
pub type ExtractedEnumValues = Vec<(String, Vec<EnumValue>)>;

/// Mine the static initialiser of `enum_class` for per-constant constructor
/// arguments.
///
/// The scan keeps two maps: value-of-local (what constant a local holds) and
/// alias-of-local (which fresh allocation a local refers to). A store into a
/// static field of the enum class itself marks an enum constant; its
/// arguments come from the nearest subsequent constructor call on the
/// aliased allocation root, with the `(name, ordinal)` prefix dropped.
#[must_use]
pub fn extract_enum_values(enum_class: &str, body: &[InitStmt]) -> ExtractedEnumValues {
    let mut values: FxHashMap<&str, EnumValue> = FxHashMap::default();
    let mut aliases: FxHashMap<&str, &str> = FxHashMap::default();
    let mut extracted = ExtractedEnumValues::new();

    for (index, stmt) in body.iter().enumerate() {
        match stmt {
            InitStmt::AssignConst { local, value } => {
                if let Some(v) = EnumValue::from_constant(value) {
                    values.insert(local, v);
                }
            }
            InitStmt::AssignBoxed {
                local,
                wrapper,
                value,
            } => {
                if well_known::is_wrapper(wrapper)
                    && let Some(v) = EnumValue::from_constant(value)
                {
                    values.insert(local, v);
                }
            }
            InitStmt::AssignStaticField { local, field } => {
                // A static field whose declared type equals its declaring
                // class is another enum's constant.
                if field.field_type.class_name == field.declaring_class.class_name {
                    values.insert(
                        local,
                        EnumValue::EnumRef {
                            enum_type: field.declaring_class.class_name.clone(),
                            enum_name: field.name.clone(),
                        },
                    );
                }
            }
            InitStmt::AssignLocal { left, right } => {
                let root = resolve_root(&aliases, right);
                aliases.insert(left, root);
                if let Some(v) = values.get(root).cloned() {
                    values.insert(left, v);
                }
            }
            InitStmt::AssignNew { .. } | InitStmt::ConstructorCall { .. } => {}
            InitStmt::StoreStaticField { field, local } => {
                if field.declaring_class.class_name != enum_class {
                    continue;
                }
                let root = resolve_root(&aliases, local);
                let args = nearest_constructor_args(&body[index + 1..], root, &values);
                extracted.push((field.name.clone(), args));
            }
        }
    }

    extracted
}

fn resolve_root<'a>(aliases: &FxHashMap<&'a str, &'a str>, local: &'a str) -> &'a str {
    let mut current = local;
    // Alias chains are short; the map never cycles because an alias always
    // points at an earlier local.
    while let Some(next) = aliases.get(current) {
        if *next == current {
            break;
        }
        current = next;
    }
    current
}

/// Find the nearest constructor call whose receiver resolves to `root` and
/// return its arguments with the `(name, ordinal)` prefix dropped.
fn nearest_constructor_args(
    rest: &[InitStmt],
    root: &str,
    values: &FxHashMap<&str, EnumValue>,
) -> Vec<EnumValue> {
    for stmt in rest {
        let InitStmt::ConstructorCall { receiver, arguments } = stmt else {
            continue;
        };
        if receiver != root {
            continue;
        }
        return arguments
            .iter()
            .skip(2)
            .map(|arg| resolve_ctor_arg(arg, values))
            .collect();
    }
    Vec::new()
}

fn resolve_ctor_arg(arg: &CtorArg, values: &FxHashMap<&str, EnumValue>) -> EnumValue {
    match arg {
        CtorArg::Const(value) => EnumValue::from_constant(value).unwrap_or(EnumValue::Unknown),
        CtorArg::Boxed { wrapper, value } => {
            if well_known::is_wrapper(wrapper) {
                EnumValue::from_constant(value).unwrap_or(EnumValue::Unknown)
            } else {
                EnumValue::Unknown
            }
        }
        CtorArg::Local(name) => values.get(name.as_str()).cloned().unwrap_or(EnumValue::Unknown),
        CtorArg::StaticField(field) => {
            if field.field_type.class_name == field.declaring_class.class_name {
                EnumValue::EnumRef {
                    enum_type: field.declaring_class.class_name.clone(),
                    enum_name: field.name.clone(),
                }
            } else {
                EnumValue::Unknown
            }
        }
    }
}
