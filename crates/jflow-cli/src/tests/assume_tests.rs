use crate::assume::{parse_assumption, parse_value};
use jflow_graph::ConstantValue;

#[test]
fn full_assumption_spec_round_trips() {
    let assumption =
        parse_assumption("com.example.Client.getOption(0=1001)->true").expect("spec parses");
    assert_eq!(
        assumption.method_pattern.class_name.as_deref(),
        Some("com.example.Client")
    );
    assert_eq!(assumption.method_pattern.name.as_deref(), Some("getOption"));
    assert_eq!(assumption.argument_index, Some(0));
    assert_eq!(assumption.argument_value, Some(ConstantValue::Int(1001)));
    assert_eq!(assumption.assumed_result, ConstantValue::Bool(true));
}

#[test]
fn assumption_without_argument_filter() {
    let assumption = parse_assumption("com.example.Flags.isEnabled->false").expect("spec parses");
    assert_eq!(assumption.argument_index, None);
    assert_eq!(assumption.assumed_result, ConstantValue::Bool(false));
}

#[test]
fn malformed_specs_are_rejected() {
    assert!(parse_assumption("com.example.Client.getOption").is_err());
    assert!(parse_assumption("noDot->true").is_err());
    assert!(parse_assumption("a.b(0=1001->true").is_err());
    assert!(parse_assumption("a.b(zero=1)->true").is_err());
}

#[test]
fn value_literals_cover_all_kinds() {
    assert_eq!(parse_value("true").expect("parses"), ConstantValue::Bool(true));
    assert_eq!(parse_value("null").expect("parses"), ConstantValue::Null);
    assert_eq!(parse_value("42").expect("parses"), ConstantValue::Int(42));
    assert_eq!(
        parse_value("4294967297L").expect("parses"),
        ConstantValue::Long(4_294_967_297)
    );
    assert_eq!(
        parse_value("4294967297").expect("parses"),
        ConstantValue::Long(4_294_967_297)
    );
    assert_eq!(
        parse_value("\"token\"").expect("parses"),
        ConstantValue::Str("token".into())
    );
    assert_eq!(parse_value("1.5").expect("parses"), ConstantValue::Double(1.5));
    assert!(parse_value("not a literal").is_err());
}
