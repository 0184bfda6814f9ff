//! Well-known JVM class names.
//!
//! The wrapper table drives boxing/unboxing pass-through in the slicer and
//! the `valueOf` unwrapping performed by the enum-constant extractor.

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const ENUM: &str = "java.lang.Enum";
pub const VOID: &str = "void";

/// `(primitive, wrapper)` pairs for the boxable primitives.
pub const WRAPPERS: &[(&str, &str)] = &[
    ("int", "java.lang.Integer"),
    ("long", "java.lang.Long"),
    ("short", "java.lang.Short"),
    ("byte", "java.lang.Byte"),
    ("float", "java.lang.Float"),
    ("double", "java.lang.Double"),
    ("boolean", "java.lang.Boolean"),
    ("char", "java.lang.Character"),
];

/// The wrapper class for a primitive name, if any.
#[must_use]
pub fn wrapper_of(primitive: &str) -> Option<&'static str> {
    WRAPPERS
        .iter()
        .find(|(p, _)| *p == primitive)
        .map(|(_, w)| *w)
}

/// The primitive name for a wrapper class, if any.
#[must_use]
pub fn primitive_of(wrapper: &str) -> Option<&'static str> {
    WRAPPERS
        .iter()
        .find(|(_, w)| *w == wrapper)
        .map(|(p, _)| *p)
}

/// Whether `class_name` is one of the boxable wrapper classes.
#[must_use]
pub fn is_wrapper(class_name: &str) -> bool {
    WRAPPERS.iter().any(|(_, w)| *w == class_name)
}

/// Whether `class_name` is a primitive type name.
#[must_use]
pub fn is_primitive(class_name: &str) -> bool {
    class_name == VOID || WRAPPERS.iter().any(|(p, _)| *p == class_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_round_trip() {
        assert_eq!(wrapper_of("int"), Some("java.lang.Integer"));
        assert_eq!(primitive_of("java.lang.Integer"), Some("int"));
        assert!(is_wrapper("java.lang.Boolean"));
        assert!(!is_wrapper("java.lang.String"));
        assert!(is_primitive("boolean"));
        assert!(!is_primitive("java.lang.Integer"));
    }
}
