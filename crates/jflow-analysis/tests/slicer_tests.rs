use jflow_analysis::{Analyzer, SliceCache};
use jflow_common::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use jflow_common::options::SliceOptions;
use jflow_graph::enums::EnumValue;
use jflow_graph::{ConstantValue, DataFlowKind, Edge, GraphBuilder, MethodInfo};
use std::sync::Arc;

fn ty(name: &str) -> TypeDescriptor {
    TypeDescriptor::named(name)
}

fn method(class: &str, name: &str) -> MethodDescriptor {
    MethodDescriptor::new(ty(class), name, vec![ty("int")], ty("boolean"))
}

fn caller() -> MethodDescriptor {
    MethodDescriptor::new(ty("com.example.Main"), "main", vec![], ty("void"))
}

fn paths_on() -> SliceOptions {
    SliceOptions {
        collect_paths: true,
        ..SliceOptions::default()
    }
}

#[test]
fn direct_constant_argument() {
    // client.getOption(1001)
    let mut builder = GraphBuilder::new();
    let callee = method("com.example.Client", "getOption");
    let c = builder.constant(ConstantValue::Int(1001));
    let call = builder.call_site(caller(), callee, Some(12), None, [c]);
    builder
        .add_edge(Edge::dataflow(c, call, DataFlowKind::ParameterPass))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(c, paths_on());
    assert_eq!(slice.direct_constants().len(), 1);
    assert_eq!(slice.direct_constants()[0].value, ConstantValue::Int(1001));
    assert_eq!(slice.int_constants(&graph), vec![1001]);
    // Seeding at the constant itself yields a single-node path.
    assert_eq!(slice.paths().len(), 1);
    assert_eq!(slice.paths()[0].nodes, vec![c]);
}

#[test]
fn constant_through_local_variable() {
    // int id = 1001; client.getOption(id);
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(1001));
    let id_local = builder.local("id", ty("int"), caller());
    builder
        .add_edge(Edge::dataflow(c, id_local, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    builder.call_site(caller(), method("com.example.Client", "getOption"), Some(3), None, [id_local]);
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(id_local, paths_on());
    assert_eq!(slice.int_constants(&graph), vec![1001]);
    let path = slice.path_for(c).expect("constant has a path");
    assert_eq!(path.nodes, vec![c, id_local]);
}

#[test]
fn boxing_is_bypassed_by_assign_lowering() {
    // client.getOption(Integer.valueOf(1001)) — the frontend lowers the
    // valueOf call to a plain assign edge into the result local.
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(1001));
    let boxed = builder.local("boxed", ty("java.lang.Integer"), caller());
    builder
        .add_edge(Edge::dataflow(c, boxed, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(boxed, SliceOptions::default());
    assert_eq!(slice.int_constants(&graph), vec![1001]);
}

#[test]
fn enum_constant_resolves_to_primary_value() {
    // enum Exp { A(1001) }; client.getOption(Exp.A)
    let mut builder = GraphBuilder::new();
    builder.add_enum_values("com.example.Exp", "A", vec![EnumValue::Int(1001)]);
    let e = builder.constant(ConstantValue::Enum {
        enum_type: ty("com.example.Exp"),
        enum_name: "A".into(),
        constructor_args: vec![EnumValue::Int(1001)],
    });
    let arg_local = builder.local("exp", ty("com.example.Exp"), caller());
    builder
        .add_edge(Edge::dataflow(e, arg_local, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(arg_local, SliceOptions::default());
    let all = slice.all_constants(&graph);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].node, e);
    assert_eq!(all[0].value, ConstantValue::Int(1001));
    assert_eq!(slice.int_constants(&graph), vec![1001]);
}

#[test]
fn field_initialiser_constants_are_derived_not_direct() {
    // static int LIMIT = 7; ... int x = LIMIT;
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(7));
    let field = builder.field(
        FieldDescriptor::new(ty("com.example.Config"), "LIMIT", ty("int")),
        true,
    );
    let x = builder.local("x", ty("int"), caller());
    builder
        .add_edge(Edge::dataflow(c, field, DataFlowKind::FieldStore))
        .expect("edge endpoints exist");
    builder
        .add_edge(Edge::dataflow(field, x, DataFlowKind::FieldLoad))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(x, SliceOptions::default());
    assert!(slice.direct_constants().is_empty());
    assert_eq!(slice.derived_constants().len(), 1);
    assert_eq!(slice.derived_constants()[0].value, ConstantValue::Int(7));
    assert_eq!(slice.int_constants(&graph), vec![7]);
}

#[test]
fn call_sites_continue_into_the_callee_return() {
    // int x = helper(); helper() { return 42; }
    let mut builder = GraphBuilder::new();
    let helper = MethodDescriptor::new(ty("com.example.Main"), "helper", vec![], ty("int"));
    let c = builder.constant(ConstantValue::Int(42));
    let ret = builder.return_node(helper.clone(), None);
    builder
        .add_edge(Edge::dataflow(c, ret, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    builder.add_method(MethodInfo::new(helper.clone()).with_return_node(ret));

    let x = builder.local("x", ty("int"), caller());
    let call = builder.call_site(caller(), helper, Some(8), None, []);
    builder
        .add_edge(Edge::dataflow(call, x, DataFlowKind::ReturnValue))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(x, SliceOptions::default());
    assert_eq!(slice.int_constants(&graph), vec![42]);

    // With cross-method traversal off, the call is opaque.
    let shallow = analyzer.slice(
        x,
        SliceOptions {
            traverse_method_calls: false,
            ..SliceOptions::default()
        },
    );
    assert!(shallow.all_constants(&graph).is_empty());
}

#[test]
fn parameters_continue_into_caller_arguments() {
    // helper(int v) { use(v); } ... helper(5);
    let mut builder = GraphBuilder::new();
    let helper = MethodDescriptor::new(ty("com.example.Main"), "helper", vec![ty("int")], ty("void"));
    let param = builder.parameter(0, ty("int"), helper.clone());
    builder.add_method(MethodInfo::new(helper.clone()).with_parameter_nodes([param]));
    let c = builder.constant(ConstantValue::Int(5));
    builder.call_site(caller(), helper, Some(2), None, [c]);
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(param, SliceOptions::default());
    assert_eq!(slice.int_constants(&graph), vec![5]);
}

#[test]
fn max_depth_bounds_the_reverse_frontier() {
    // c -> l1 -> l2 -> l3
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(9));
    let l1 = builder.local("l1", ty("int"), caller());
    let l2 = builder.local("l2", ty("int"), caller());
    let l3 = builder.local("l3", ty("int"), caller());
    for (from, to) in [(c, l1), (l1, l2), (l2, l3)] {
        builder
            .add_edge(Edge::dataflow(from, to, DataFlowKind::Assign))
            .expect("edge endpoints exist");
    }
    let graph = builder.build().expect("build succeeds");
    let analyzer = Analyzer::new(&graph);

    let shallow = analyzer.slice(
        l3,
        SliceOptions {
            max_depth: 2,
            ..SliceOptions::default()
        },
    );
    assert!(shallow.all_constants(&graph).is_empty());

    let deep = analyzer.slice(
        l3,
        SliceOptions {
            max_depth: 3,
            ..SliceOptions::default()
        },
    );
    assert_eq!(deep.int_constants(&graph), vec![9]);
}

#[test]
fn slices_are_memoised_per_seed_and_options() {
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(1));
    let x = builder.local("x", ty("int"), caller());
    builder
        .add_edge(Edge::dataflow(c, x, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");

    let cache = SliceCache::new();
    let first = cache.slice(&graph, x, SliceOptions::default());
    let second = cache.slice(&graph, x, SliceOptions::default());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    // A different fingerprint computes a fresh entry.
    let with_paths = cache.slice(&graph, x, paths_on());
    assert!(!Arc::ptr_eq(&first, &with_paths));
    assert_eq!(cache.len(), 2);
}

#[test]
fn slicing_is_idempotent_on_the_frozen_graph() {
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Str("token".into()));
    let x = builder.local("x", ty("java.lang.String"), caller());
    builder
        .add_edge(Edge::dataflow(c, x, DataFlowKind::Assign))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");
    let analyzer = Analyzer::new(&graph);

    let a = analyzer.slice(x, paths_on());
    let b = analyzer.slice(x, paths_on());
    assert_eq!(a.direct_constants(), b.direct_constants());
    assert_eq!(a.paths(), b.paths());
    assert_eq!(a.string_constants(&graph), vec!["token".to_string()]);
}

#[test]
fn every_direct_constant_path_starts_at_the_constant_and_ends_at_the_seed() {
    // Diamond dataflow: two constants reach the seed through two locals.
    let mut builder = GraphBuilder::new();
    let c1 = builder.constant(ConstantValue::Int(1));
    let c2 = builder.constant(ConstantValue::Int(2));
    let a = builder.local("a", ty("int"), caller());
    let b = builder.local("b", ty("int"), caller());
    let seed = builder.local("seed", ty("int"), caller());
    for (from, to) in [(c1, a), (c2, b), (a, seed), (b, seed)] {
        builder
            .add_edge(Edge::dataflow(from, to, DataFlowKind::Phi))
            .expect("edge endpoints exist");
    }
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(seed, paths_on());
    assert_eq!(slice.direct_constants().len(), 2);
    for found in slice.direct_constants() {
        let path = slice.path_for(found.node).expect("path recorded");
        assert_eq!(path.nodes.first(), Some(&found.node));
        assert_eq!(path.nodes.last(), Some(&seed));
    }
}

#[test]
fn casts_and_array_flow_are_followed_backward() {
    // Object o = (Object) arr[0]; with 5 stored into the array.
    let mut builder = GraphBuilder::new();
    let c = builder.constant(ConstantValue::Int(5));
    let arr = builder.local("arr", ty("int[]"), caller());
    let elem = builder.local("elem", ty("int"), caller());
    let cast = builder.local("o", ty("java.lang.Object"), caller());
    builder
        .add_edge(Edge::dataflow(c, arr, DataFlowKind::ArrayStore))
        .expect("edge endpoints exist");
    builder
        .add_edge(Edge::dataflow(arr, elem, DataFlowKind::ArrayLoad))
        .expect("edge endpoints exist");
    builder
        .add_edge(Edge::dataflow(elem, cast, DataFlowKind::Cast))
        .expect("edge endpoints exist");
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(cast, SliceOptions::default());
    assert_eq!(slice.int_constants(&graph), vec![5]);
}

#[test]
fn unresolved_dataflow_contributes_nothing() {
    // A local with no incoming dataflow at all.
    let mut builder = GraphBuilder::new();
    let x = builder.local("x", ty("int"), caller());
    let graph = builder.build().expect("build succeeds");

    let analyzer = Analyzer::new(&graph);
    let slice = analyzer.slice(x, SliceOptions::default());
    assert!(slice.all_constants(&graph).is_empty());
    assert!(slice.paths().is_empty());
}
