//! Query driver: load the graph dump, run the requested query, render.

use crate::args::{CliArgs, Command};
use crate::assume::parse_assumption;
use crate::dump::{build_graph, parse_dump};
use crate::render;
use anyhow::{Context, Result};
use jflow_analysis::{Analyzer, Assumption};
use jflow_common::options::{AnalysisOptions, SliceOptions};
use jflow_common::pattern::MethodPattern;
use std::fs;

pub fn run(args: CliArgs) -> Result<()> {
    let graph_path = args
        .graph
        .as_ref()
        .context("--graph <file> is required")?;
    let text = fs::read_to_string(graph_path)
        .with_context(|| format!("cannot read graph dump {}", graph_path.display()))?;
    let dump = parse_dump(&text)?;

    let mut options = AnalysisOptions {
        include_packages: args.include_packages.clone(),
        exclude_packages: args.exclude_packages.clone(),
        ..AnalysisOptions::default()
    };
    if let Command::Deadcode { entry_points, .. } = &args.command {
        options.entry_points = entry_points.clone();
    }

    let graph = build_graph(&dump, &options)?;
    let analyzer = Analyzer::with_options(&graph, options);

    let output = match &args.command {
        Command::Stats => {
            let stats = graph.stats();
            if args.json {
                serde_json::to_string_pretty(&stats)?
            } else {
                render::stats(&stats)
            }
        }
        Command::Args {
            class,
            method,
            regex,
            arg,
            paths,
            max_depth,
            no_calls,
        } => {
            let pattern = pattern_of(class.clone(), method.clone(), *regex);
            let mut slice_options = SliceOptions {
                collect_paths: *paths,
                traverse_method_calls: !*no_calls,
                ..SliceOptions::default()
            };
            if let Some(depth) = max_depth {
                slice_options.max_depth = *depth;
            }
            let results = analyzer.find_argument_constants(&pattern, *arg, slice_options);
            if args.json {
                serde_json::to_string_pretty(&results)?
            } else {
                render::argument_constants(&results)
            }
        }
        Command::Returns {
            class,
            method,
            regex,
        } => {
            let pattern = pattern_of(class.clone(), method.clone(), *regex);
            let results = analyzer.find_actual_return_types(&pattern);
            if args.json {
                serde_json::to_string_pretty(&results)?
            } else {
                render::return_types(&results)
            }
        }
        Command::Fields { types } => {
            let results = analyzer.find_fields_of_type(types, None);
            if args.json {
                serde_json::to_string_pretty(&results)?
            } else {
                render::fields(&results)
            }
        }
        Command::Endpoints { path, method } => {
            let results = analyzer.endpoints(path.as_deref(), (*method).map(Into::into));
            if args.json {
                serde_json::to_string_pretty(&results)?
            } else {
                render::endpoints(&results)
            }
        }
        Command::Deadcode { assumptions, .. } => {
            let assumptions: Vec<Assumption> = assumptions
                .iter()
                .map(|spec| parse_assumption(spec))
                .collect::<Result<_>>()?;
            let result = analyzer.find_dead_code(&assumptions);
            if args.json {
                serde_json::to_string_pretty(&result)?
            } else {
                render::dead_code(&result)
            }
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn pattern_of(class: Option<String>, method: Option<String>, regex: bool) -> MethodPattern {
    MethodPattern {
        class_name: class,
        name: method,
        use_regex: regex,
        ..MethodPattern::default()
    }
}
