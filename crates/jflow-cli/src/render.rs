//! Text renderers for query results.
//!
//! JSON output is handled by serializing the result types directly; these
//! renderers produce the human-readable default.

use jflow_analysis::{ArgumentConstant, DeadCodeResult, FieldMatch, ReturnTypeInfo};
use jflow_graph::{EndpointInfo, GraphStats};

pub fn stats(stats: &GraphStats) -> String {
    format!(
        "nodes: {} locals, {} parameters, {} fields, {} returns, {} constants, {} call sites\n\
         edges: {} dataflow, {} call, {} control-flow, {} type\n\
         methods: {}, endpoints: {}",
        stats.locals,
        stats.parameters,
        stats.fields,
        stats.returns,
        stats.constants,
        stats.call_sites,
        stats.dataflow_edges,
        stats.call_edges,
        stats.control_flow_edges,
        stats.type_edges,
        stats.methods,
        stats.endpoints,
    )
}

pub fn argument_constants(results: &[ArgumentConstant]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&format!(
            "{} {} arg{} = {}",
            result.location,
            result.callee.signature(),
            result.argument_index,
            result.value,
        ));
        if let Some(path) = &result.path {
            let hops: Vec<String> = path.iter().map(|n| n.to_string()).collect();
            out.push_str(&format!("  via {}", hops.join(" -> ")));
        }
        out.push('\n');
    }
    if results.is_empty() {
        out.push_str("no matching constants\n");
    }
    out
}

pub fn return_types(results: &[ReturnTypeInfo]) -> String {
    let mut out = String::new();
    for result in results {
        let actual: Vec<String> = result.actual.iter().map(|t| t.to_string()).collect();
        out.push_str(&format!(
            "{}: declared {} actual [{}]\n",
            result.method.signature(),
            result.declared,
            actual.join(", "),
        ));
    }
    if results.is_empty() {
        out.push_str("no matching methods\n");
    }
    out
}

pub fn fields(results: &[FieldMatch]) -> String {
    let mut out = String::new();
    for result in results {
        let marker = if result.is_static { " (static)" } else { "" };
        out.push_str(&format!(
            "{} : {}{}\n",
            result.field,
            result.field.field_type,
            marker,
        ));
    }
    if results.is_empty() {
        out.push_str("no matching fields\n");
    }
    out
}

pub fn endpoints(results: &[&EndpointInfo]) -> String {
    let mut out = String::new();
    for endpoint in results {
        out.push_str(&format!(
            "{:?} {} -> {}\n",
            endpoint.http_method,
            endpoint.path,
            endpoint.handler.signature(),
        ));
    }
    if results.is_empty() {
        out.push_str("no matching endpoints\n");
    }
    out
}

pub fn dead_code(result: &DeadCodeResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("dead branches: {}\n", result.dead_branches.len()));
    for branch in &result.dead_branches {
        out.push_str(&format!(
            "  {:?} of condition {} in {} ({} nodes, {} call sites)\n",
            branch.dead_kind,
            branch.condition,
            branch.owning_method.signature(),
            branch.dead_nodes.len(),
            branch.dead_call_sites.len(),
        ));
    }
    out.push_str(&format!("dead methods: {}\n", result.dead_methods.len()));
    for method in &result.dead_methods {
        out.push_str(&format!("  {}\n", method.signature()));
    }
    out.push_str(&format!(
        "unreferenced methods: {}\n",
        result.unreferenced_methods.len()
    ));
    for method in &result.unreferenced_methods {
        out.push_str(&format!("  {}\n", method.signature()));
    }
    out.push_str(&format!("dead call sites: {}\n", result.dead_call_sites.len()));
    out
}
