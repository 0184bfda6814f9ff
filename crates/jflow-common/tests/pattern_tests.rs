use jflow_common::descriptor::{MethodDescriptor, TypeDescriptor};
use jflow_common::pattern::MethodPattern;

fn method(class: &str, name: &str, params: &[&str], ret: &str) -> MethodDescriptor {
    MethodDescriptor::new(
        TypeDescriptor::named(class),
        name,
        params.iter().map(|p| TypeDescriptor::named(*p)).collect(),
        TypeDescriptor::named(ret),
    )
}

#[test]
fn exact_class_and_name_match() {
    let m = method("com.example.Client", "getOption", &["int"], "boolean");
    assert!(MethodPattern::of("com.example.Client", "getOption").matches(&m));
    assert!(!MethodPattern::of("com.example.Client", "getValue").matches(&m));
    assert!(!MethodPattern::of("com.example.Server", "getOption").matches(&m));
}

#[test]
fn unset_components_match_anything() {
    let m = method("com.example.Client", "getOption", &["int"], "boolean");
    assert!(MethodPattern::any().matches(&m));
    let name_only = MethodPattern {
        name: Some("getOption".into()),
        ..MethodPattern::default()
    };
    assert!(name_only.matches(&m));
}

#[test]
fn trailing_star_is_a_prefix_wildcard() {
    let m = method("com.example.Client", "getOption", &[], "boolean");
    assert!(MethodPattern::of("com.example.*", "get*").matches(&m));
    assert!(MethodPattern::of("*", "*").matches(&m));
    assert!(!MethodPattern::of("com.other.*", "get*").matches(&m));
    // Star is only a wildcard in the trailing position.
    assert!(!MethodPattern::of("*.Client", "getOption").matches(&m));
}

#[test]
fn parameter_types_compare_positionally() {
    let m = method(
        "com.example.Client",
        "getOption",
        &["int", "java.lang.String"],
        "boolean",
    );
    let ok = MethodPattern::of("com.example.Client", "getOption")
        .with_parameter_types(vec!["int".into(), "java.lang.String".into()]);
    assert!(ok.matches(&m));

    let wrong_arity = MethodPattern::of("com.example.Client", "getOption")
        .with_parameter_types(vec!["int".into()]);
    assert!(!wrong_arity.matches(&m));

    let wrong_order = MethodPattern::of("com.example.Client", "getOption")
        .with_parameter_types(vec!["java.lang.String".into(), "int".into()]);
    assert!(!wrong_order.matches(&m));
}

#[test]
fn return_type_is_exact() {
    let m = method("com.example.Client", "getOption", &[], "boolean");
    assert!(
        MethodPattern::of("com.example.Client", "getOption")
            .with_return_type("boolean")
            .matches(&m)
    );
    assert!(
        !MethodPattern::of("com.example.Client", "getOption")
            .with_return_type("int")
            .matches(&m)
    );
}

#[test]
fn regex_mode_is_anchored() {
    let m = method("com.example.Client", "getOption", &[], "boolean");
    let p = MethodPattern {
        class_name: Some(r"com\.example\..*".into()),
        name: Some("get(Option|Value)".into()),
        ..MethodPattern::default()
    }
    .regex();
    assert!(p.matches(&m));

    // Without anchoring "ample" would match; anchored it must not.
    let partial = MethodPattern {
        class_name: Some("ample".into()),
        ..MethodPattern::default()
    }
    .regex();
    assert!(!partial.matches(&m));
}

#[test]
fn malformed_regex_matches_nothing() {
    let m = method("com.example.Client", "getOption", &[], "boolean");
    let bad = MethodPattern {
        class_name: Some("com.(unclosed".into()),
        ..MethodPattern::default()
    }
    .regex();
    assert!(!bad.matches(&m));
}

#[test]
fn compiled_pattern_is_reusable() {
    let pattern = MethodPattern::of("com.example.*", "get*");
    let compiled = pattern.compile();
    assert!(compiled.matches(&method("com.example.A", "getX", &[], "int")));
    assert!(compiled.matches(&method("com.example.B", "getY", &[], "int")));
    assert!(!compiled.matches(&method("com.example.B", "setY", &[], "void")));
}
