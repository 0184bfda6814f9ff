use jflow_common::descriptor::{FieldDescriptor, TypeDescriptor};
use jflow_graph::node::ConstantValue;
use jflow_graph::{CtorArg, EnumValue, GraphBuilder, InitStmt, extract_enum_values};

const EXP: &str = "com.example.Exp";

fn enum_field(class: &str, name: &str) -> FieldDescriptor {
    FieldDescriptor::new(TypeDescriptor::named(class), name, TypeDescriptor::named(class))
}

/// `Exp.A = new Exp("A", 0, 1001)` in lowered form.
fn simple_constant(field: &str, ordinal: i32, user_arg: i32) -> Vec<InitStmt> {
    vec![
        InitStmt::AssignNew {
            local: "e0".into(),
            class_name: EXP.into(),
        },
        InitStmt::StoreStaticField {
            field: enum_field(EXP, field),
            local: "e0".into(),
        },
        InitStmt::ConstructorCall {
            receiver: "e0".into(),
            arguments: vec![
                CtorArg::Const(ConstantValue::Str(field.into())),
                CtorArg::Const(ConstantValue::Int(ordinal)),
                CtorArg::Const(ConstantValue::Int(user_arg)),
            ],
        },
    ]
}

#[test]
fn direct_constant_argument() {
    let extracted = extract_enum_values(EXP, &simple_constant("A", 0, 1001));
    assert_eq!(extracted, vec![("A".into(), vec![EnumValue::Int(1001)])]);
}

#[test]
fn name_and_ordinal_prefix_is_dropped() {
    let body = vec![
        InitStmt::AssignNew {
            local: "e0".into(),
            class_name: EXP.into(),
        },
        InitStmt::StoreStaticField {
            field: enum_field(EXP, "A"),
            local: "e0".into(),
        },
        InitStmt::ConstructorCall {
            receiver: "e0".into(),
            arguments: vec![
                CtorArg::Const(ConstantValue::Str("A".into())),
                CtorArg::Const(ConstantValue::Int(0)),
            ],
        },
    ];
    // No user-defined arguments at all.
    assert_eq!(extract_enum_values(EXP, &body), vec![("A".into(), vec![])]);
}

#[test]
fn boxed_argument_yields_inner_primitive() {
    let body = vec![
        InitStmt::AssignBoxed {
            local: "v".into(),
            wrapper: "java.lang.Integer".into(),
            value: ConstantValue::Int(1001),
        },
        InitStmt::AssignNew {
            local: "e0".into(),
            class_name: EXP.into(),
        },
        InitStmt::StoreStaticField {
            field: enum_field(EXP, "A"),
            local: "e0".into(),
        },
        InitStmt::ConstructorCall {
            receiver: "e0".into(),
            arguments: vec![
                CtorArg::Const(ConstantValue::Str("A".into())),
                CtorArg::Const(ConstantValue::Int(0)),
                CtorArg::Local("v".into()),
            ],
        },
    ];
    assert_eq!(
        extract_enum_values(EXP, &body),
        vec![("A".into(), vec![EnumValue::Int(1001)])]
    );
}

#[test]
fn long_arguments_keep_full_width() {
    let body = vec![
        InitStmt::AssignNew {
            local: "e0".into(),
            class_name: EXP.into(),
        },
        InitStmt::StoreStaticField {
            field: enum_field(EXP, "BIG"),
            local: "e0".into(),
        },
        InitStmt::ConstructorCall {
            receiver: "e0".into(),
            arguments: vec![
                CtorArg::Const(ConstantValue::Str("BIG".into())),
                CtorArg::Const(ConstantValue::Int(0)),
                CtorArg::Const(ConstantValue::Long(0x1_0000_0001)),
            ],
        },
    ];
    assert_eq!(
        extract_enum_values(EXP, &body),
        vec![("BIG".into(), vec![EnumValue::Long(0x1_0000_0001)])]
    );
}

#[test]
fn cross_enum_reference_is_a_sentinel() {
    let other = "com.example.Color";
    let body = vec![
        InitStmt::AssignStaticField {
            local: "c".into(),
            field: enum_field(other, "RED"),
        },
        InitStmt::AssignNew {
            local: "e0".into(),
            class_name: EXP.into(),
        },
        InitStmt::StoreStaticField {
            field: enum_field(EXP, "A"),
            local: "e0".into(),
        },
        InitStmt::ConstructorCall {
            receiver: "e0".into(),
            arguments: vec![
                CtorArg::Const(ConstantValue::Str("A".into())),
                CtorArg::Const(ConstantValue::Int(0)),
                CtorArg::Local("c".into()),
            ],
        },
    ];
    assert_eq!(
        extract_enum_values(EXP, &body),
        vec![(
            "A".into(),
            vec![EnumValue::EnumRef {
                enum_type: other.into(),
                enum_name: "RED".into(),
            }]
        )]
    );
}

#[test]
fn non_enum_static_field_is_not_a_reference() {
    // Field type differs from declaring class: not an enum constant.
    let field = FieldDescriptor::new(
        TypeDescriptor::named("com.example.Config"),
        "DEFAULT",
        TypeDescriptor::named("int"),
    );
    let body = vec![
        InitStmt::AssignStaticField {
            local: "c".into(),
            field,
        },
        InitStmt::AssignNew {
            local: "e0".into(),
            class_name: EXP.into(),
        },
        InitStmt::StoreStaticField {
            field: enum_field(EXP, "A"),
            local: "e0".into(),
        },
        InitStmt::ConstructorCall {
            receiver: "e0".into(),
            arguments: vec![
                CtorArg::Const(ConstantValue::Str("A".into())),
                CtorArg::Const(ConstantValue::Int(0)),
                CtorArg::Local("c".into()),
            ],
        },
    ];
    assert_eq!(
        extract_enum_values(EXP, &body),
        vec![("A".into(), vec![EnumValue::Unknown])]
    );
}

#[test]
fn aliases_resolve_to_the_allocation_root() {
    let body = vec![
        InitStmt::AssignNew {
            local: "e0".into(),
            class_name: EXP.into(),
        },
        InitStmt::AssignLocal {
            left: "alias".into(),
            right: "e0".into(),
        },
        InitStmt::StoreStaticField {
            field: enum_field(EXP, "A"),
            local: "alias".into(),
        },
        // Constructor call targets the root, not the alias.
        InitStmt::ConstructorCall {
            receiver: "e0".into(),
            arguments: vec![
                CtorArg::Const(ConstantValue::Str("A".into())),
                CtorArg::Const(ConstantValue::Int(0)),
                CtorArg::Const(ConstantValue::Str("payload".into())),
            ],
        },
    ];
    assert_eq!(
        extract_enum_values(EXP, &body),
        vec![("A".into(), vec![EnumValue::Str("payload".into())])]
    );
}

#[test]
fn nearest_subsequent_constructor_wins() {
    let mut body = simple_constant("A", 0, 1001);
    body.extend(simple_constant("B", 1, 1002));
    let extracted = extract_enum_values(EXP, &body);
    assert_eq!(
        extracted,
        vec![
            ("A".into(), vec![EnumValue::Int(1001)]),
            ("B".into(), vec![EnumValue::Int(1002)]),
        ]
    );
}

#[test]
fn stores_into_other_classes_are_ignored() {
    let mut body = simple_constant("A", 0, 1001);
    body.insert(
        0,
        InitStmt::StoreStaticField {
            field: enum_field("com.example.Other", "X"),
            local: "e0".into(),
        },
    );
    assert_eq!(
        extract_enum_values(EXP, &body),
        vec![("A".into(), vec![EnumValue::Int(1001)])]
    );
}

#[test]
fn builder_ingest_records_values_and_marks_enum_class() {
    let mut builder = GraphBuilder::new();
    builder.ingest_enum_initializer(EXP, &simple_constant("A", 0, 1001));
    let graph = builder.build().expect("build succeeds");

    assert!(graph.is_enum_class(EXP));
    assert_eq!(graph.enum_values(EXP, "A"), Some(&[EnumValue::Int(1001)][..]));
    assert_eq!(graph.enum_values(EXP, "B"), None);
    assert_eq!(graph.enum_primary_value(EXP, "A"), Some(ConstantValue::Int(1001)));
}

#[test]
fn enum_primary_value_follows_references() {
    let mut builder = GraphBuilder::new();
    builder.add_enum_values("a.Color", "RED", vec![EnumValue::Int(0xFF0000)]);
    builder.add_enum_values(
        "a.Paint",
        "CRIMSON",
        vec![EnumValue::EnumRef {
            enum_type: "a.Color".into(),
            enum_name: "RED".into(),
        }],
    );
    let graph = builder.build().expect("build succeeds");
    assert_eq!(
        graph.enum_primary_value("a.Paint", "CRIMSON"),
        Some(ConstantValue::Int(0xFF0000))
    );
}
