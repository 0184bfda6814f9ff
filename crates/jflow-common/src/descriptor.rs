//! Type, method, and field descriptors.
//!
//! Descriptors are plain value types, freely cloned and shared between the
//! graph store and the analysis engines. A `TypeDescriptor` with no type
//! arguments denotes the raw/erased form; array types carry `[]` suffixes on
//! the class name.

use serde::{Deserialize, Serialize};

// =============================================================================
// TypeDescriptor
// =============================================================================

/// A (possibly generic) reference to a declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully qualified class name, plus optional `[]` suffixes for arrays.
    pub class_name: String,
    /// Type arguments; empty for the raw/erased form.
    pub type_arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Create a raw (non-generic) type descriptor.
    #[must_use]
    pub fn named(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            type_arguments: Vec::new(),
        }
    }

    /// Create a generic type descriptor.
    #[must_use]
    pub fn generic(class_name: impl Into<String>, type_arguments: Vec<TypeDescriptor>) -> Self {
        Self {
            class_name: class_name.into(),
            type_arguments,
        }
    }

    /// The erased class name (ignores type arguments).
    #[must_use]
    pub fn erased(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.class_name == crate::well_known::OBJECT
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.class_name == crate::well_known::VOID
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.class_name.ends_with("[]")
    }

    /// The simple (unqualified) name of the class.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.class_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.class_name)
    }

    /// The package prefix of the class, or `""` for the default package.
    #[must_use]
    pub fn package(&self) -> &str {
        match self.class_name.rfind('.') {
            Some(idx) => &self.class_name[..idx],
            None => "",
        }
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.class_name)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

// =============================================================================
// MethodDescriptor
// =============================================================================

/// A fully resolved method reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub declaring_class: TypeDescriptor,
    pub name: String,
    pub parameter_types: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new(
        declaring_class: TypeDescriptor,
        name: impl Into<String>,
        parameter_types: Vec<TypeDescriptor>,
        return_type: TypeDescriptor,
    ) -> Self {
        Self {
            declaring_class,
            name: name.into(),
            parameter_types,
            return_type,
        }
    }

    /// Canonical signature: `<class>.<name>(<param1,param2,...>)`.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut out = String::with_capacity(
            self.declaring_class.class_name.len() + self.name.len() + 16,
        );
        out.push_str(&self.declaring_class.class_name);
        out.push('.');
        out.push_str(&self.name);
        out.push('(');
        for (i, p) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&p.class_name);
        }
        out.push(')');
        out
    }

    /// Whether this is an instance or class initializer (`<init>`/`<clinit>`).
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }

    /// Whether the name looks compiler-generated (contains `$` or a
    /// `lambda$` prefix). Enum `values`/`valueOf` are handled separately
    /// because they are only synthetic on enum classes.
    #[must_use]
    pub fn has_synthetic_name(&self) -> bool {
        self.name.contains('$') || self.name.starts_with("lambda$")
    }
}

impl std::fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.signature())
    }
}

// =============================================================================
// FieldDescriptor
// =============================================================================

/// A fully resolved field reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub declaring_class: TypeDescriptor,
    pub name: String,
    pub field_type: TypeDescriptor,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(
        declaring_class: TypeDescriptor,
        name: impl Into<String>,
        field_type: TypeDescriptor,
    ) -> Self {
        Self {
            declaring_class,
            name: name.into(),
            field_type,
        }
    }
}

impl std::fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.declaring_class.class_name, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_canonical() {
        let m = MethodDescriptor::new(
            TypeDescriptor::named("com.example.Client"),
            "getOption",
            vec![TypeDescriptor::named("int")],
            TypeDescriptor::named("boolean"),
        );
        assert_eq!(m.signature(), "com.example.Client.getOption(int)");
    }

    #[test]
    fn generic_display_includes_arguments() {
        let t = TypeDescriptor::generic(
            "java.util.List",
            vec![TypeDescriptor::named("java.lang.String")],
        );
        assert_eq!(t.to_string(), "java.util.List<java.lang.String>");
        assert_eq!(t.erased(), "java.util.List");
    }

    #[test]
    fn simple_name_and_package() {
        let t = TypeDescriptor::named("com.example.Client");
        assert_eq!(t.simple_name(), "Client");
        assert_eq!(t.package(), "com.example");
        let d = TypeDescriptor::named("TopLevel");
        assert_eq!(d.simple_name(), "TopLevel");
        assert_eq!(d.package(), "");
    }
}
