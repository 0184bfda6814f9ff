use jflow_analysis::Analyzer;
use jflow_common::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use jflow_common::options::SliceOptions;
use jflow_common::pattern::MethodPattern;
use jflow_graph::{ConstantValue, DataFlowKind, Edge, GraphBuilder, MethodInfo};

fn ty(name: &str) -> TypeDescriptor {
    TypeDescriptor::named(name)
}

fn caller() -> MethodDescriptor {
    MethodDescriptor::new(ty("com.example.Main"), "main", vec![], ty("void"))
}

fn get_option() -> MethodDescriptor {
    MethodDescriptor::new(ty("com.example.Client"), "getOption", vec![ty("int")], ty("boolean"))
}

#[test]
fn argument_constants_carry_location_and_value() {
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(1001));
    builder.call_site(caller(), get_option(), Some(12), None, [c]);
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let results = analyzer.find_argument_constants(
        &MethodPattern::of("com.example.Client", "getOption"),
        0,
        SliceOptions::default(),
    );
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].value, ConstantValue::Int(1001));
    assert_eq!(results[0].location, "com.example.Main.main():12");
    assert_eq!(results[0].argument_index, 0);
    assert!(results[0].path.is_none());
}

#[test]
fn unknown_line_renders_as_question_mark() {
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(7));
    builder.call_site(caller(), get_option(), None, None, [c]);
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let results = analyzer.find_argument_constants(
        &MethodPattern::of("com.example.Client", "getOption"),
        0,
        SliceOptions::default(),
    );
    assert_eq!(results[0].location, "com.example.Main.main():?");
}

#[test]
fn paths_are_attached_when_requested() {
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(1001));
    let id_local = builder.local("id", ty("int"), caller());
    builder
        .add_edge(Edge::dataflow(c, id_local, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    builder.call_site(caller(), get_option(), Some(3), None, [id_local]);
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let results = analyzer.find_argument_constants(
        &MethodPattern::of("com.example.Client", "getOption"),
        0,
        SliceOptions {
            collect_paths: true,
            ..SliceOptions::default()
        },
    );
    assert_eq!(results.len(), 1);
    let path = results[0].path.as_ref().expect("path requested");
    assert_eq!(path.first(), Some(&c));
    assert_eq!(path.last(), Some(&id_local));
}

#[test]
fn branch_arms_yield_distinct_call_sites() {
    // if (flag) client.getOption(1001); else client.getOption(1002);
    let mut builder = GraphBuilder::new();
    let c1 = builder.constant(ConstantValue::Int(1001));
    let c2 = builder.constant(ConstantValue::Int(1002));
    builder.call_site(caller(), get_option(), Some(5), None, [c1]);
    builder.call_site(caller(), get_option(), Some(7), None, [c2]);
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let results = analyzer.find_argument_constants(
        &MethodPattern::of("com.example.Client", "getOption"),
        0,
        SliceOptions::default(),
    );
    assert_eq!(results.len(), 2);
    assert_ne!(results[0].call_site, results[1].call_site);
    let values: Vec<&ConstantValue> = results.iter().map(|r| &r.value).collect();
    assert!(values.contains(&&ConstantValue::Int(1001)));
    assert!(values.contains(&&ConstantValue::Int(1002)));
}

#[test]
fn no_matching_call_sites_is_an_empty_result() {
    let graph = GraphBuilder::new().build().expect("empty build succeeds");
    let analyzer = Analyzer::new(&graph);
    let results = analyzer.find_argument_constants(
        &MethodPattern::of("com.example.Nothing", "here"),
        0,
        SliceOptions::default(),
    );
    assert!(results.is_empty());
}

#[test]
fn actual_return_types_recover_precision_behind_object() {
    // Object make() { if (..) return new Widget(); else return helper(); }
    // helper's declared return type is com.example.Gadget.
    let mut builder = GraphBuilder::new();
    let make = MethodDescriptor::new(ty("com.example.Factory"), "make", vec![], ty("java.lang.Object"));
    let helper = MethodDescriptor::new(ty("com.example.Factory"), "helper", vec![], ty("com.example.Gadget"));

    let ret = builder.return_node(make.clone(), None);
    // `new Widget()` produces a local declared as the precise type.
    let widget = builder.local("fresh", ty("com.example.Widget"), make.clone());
    builder
        .add_edge(Edge::dataflow(widget, ret, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    let helper_call = builder.call_site(make.clone(), helper.clone(), Some(21), None, []);
    let via = builder.local("via", ty("java.lang.Object"), make.clone());
    builder
        .add_edge(Edge::dataflow(helper_call, via, DataFlowKind::ReturnValue))
        .expect("edge endpoints exist");
    builder
        .add_edge(Edge::dataflow(via, ret, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    builder.add_method(MethodInfo::new(make).with_return_node(ret));
    builder.add_method(MethodInfo::new(helper));
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let results =
        analyzer.find_actual_return_types(&MethodPattern::of("com.example.Factory", "make"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].declared.class_name, "java.lang.Object");
    let actual: Vec<&str> = results[0].actual.iter().map(|t| t.class_name.as_str()).collect();
    // The Object-typed local is looked through to the call site behind it.
    assert!(actual.contains(&"com.example.Widget"));
    assert!(actual.contains(&"com.example.Gadget"));
    assert!(!actual.contains(&"java.lang.Object"));
}

#[test]
fn constant_returns_report_boxed_types() {
    let mut builder = GraphBuilder::new();
    let id = MethodDescriptor::new(ty("com.example.Factory"), "id", vec![], ty("java.lang.Object"));
    let ret = builder.return_node(id.clone(), None);
    let c = builder.constant(ConstantValue::Int(3));
    builder
        .add_edge(Edge::dataflow(c, ret, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    builder.add_method(MethodInfo::new(id).with_return_node(ret));
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let results = analyzer.find_actual_return_types(&MethodPattern::of("com.example.Factory", "id"));
    let actual: Vec<&str> = results[0].actual.iter().map(|t| t.class_name.as_str()).collect();
    assert_eq!(actual, vec!["java.lang.Integer"]);
}

#[test]
fn actual_return_types_deduplicate() {
    let mut builder = GraphBuilder::new();
    let make = MethodDescriptor::new(ty("com.example.Factory"), "make", vec![], ty("java.lang.Object"));
    let ret = builder.return_node(make.clone(), None);
    let a = builder.local("a", ty("com.example.Widget"), make.clone());
    let b = builder.local("b", ty("com.example.Widget"), make.clone());
    builder
        .add_edge(Edge::dataflow(a, ret, DataFlowKind::Phi))
        .expect("edge endpoints exist");
    builder
        .add_edge(Edge::dataflow(b, ret, DataFlowKind::Phi))
        .expect("edge endpoints exist");
    builder.add_method(MethodInfo::new(make).with_return_node(ret));
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let results =
        analyzer.find_actual_return_types(&MethodPattern::of("com.example.Factory", "make"));
    assert_eq!(results[0].actual.len(), 1);
}

#[test]
fn fields_of_type_match_exact_and_prefix_patterns() {
    let mut builder = GraphBuilder::new();
    builder.field(
        FieldDescriptor::new(ty("com.example.Order"), "created", ty("java.util.Date")),
        false,
    );
    builder.field(
        FieldDescriptor::new(ty("com.example.Order"), "user", ty("com.example.User")),
        false,
    );
    builder.field(
        FieldDescriptor::new(ty("com.example.Order"), "count", ty("int")),
        true,
    );
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let dates = analyzer.find_fields_of_type(&["java.util.Date".into()], None);
    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].field.name, "created");
    assert_eq!(dates[0].compliant, None);

    let ours = analyzer.find_fields_of_type(&["com.example.*".into()], None);
    assert_eq!(ours.len(), 1);
    assert_eq!(ours[0].field.name, "user");

    let both = analyzer.find_fields_of_type(&["java.util.Date".into(), "int".into()], None);
    assert_eq!(both.len(), 2);
}

#[test]
fn field_compliance_predicate_annotates_matches() {
    let mut builder = GraphBuilder::new();
    builder.field(
        FieldDescriptor::new(ty("com.example.Order"), "created", ty("java.util.Date")),
        false,
    );
    builder.field(
        FieldDescriptor::new(ty("com.example.Order"), "updated", ty("java.util.Date")),
        false,
    );
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let predicate = |field: &FieldDescriptor| field.name == "created";
    let results = analyzer.find_fields_of_type(&["java.util.Date".into()], Some(&predicate));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].compliant, Some(true));
    assert_eq!(results[1].compliant, Some(false));
}
