//! CLI arguments for the `jflow` binary.

use clap::{Parser, Subcommand, ValueEnum};
use jflow_graph::HttpMethod;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jflow",
    version,
    about = "Graph-based static analysis for JVM class files"
)]
pub struct CliArgs {
    /// Path to the JSON graph dump produced by a frontend.
    #[arg(short = 'g', long = "graph", global = true)]
    pub graph: Option<PathBuf>,

    /// Render results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only process classes under these package prefixes.
    #[arg(long = "include", global = true)]
    pub include_packages: Vec<String>,

    /// Skip classes under these package prefixes (applied before includes).
    #[arg(long = "exclude", global = true)]
    pub exclude_packages: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print node/edge statistics for the loaded graph.
    Stats,

    /// Find constants flowing into an argument position of matching call sites.
    Args {
        /// Callee class, exact or `prefix*`.
        #[arg(long)]
        class: Option<String>,
        /// Callee method name, exact or `prefix*`.
        #[arg(long)]
        method: Option<String>,
        /// Interpret class/method as anchored regexes.
        #[arg(long)]
        regex: bool,
        /// Argument position to slice.
        #[arg(long, default_value_t = 0)]
        arg: usize,
        /// Record propagation paths on each result.
        #[arg(long)]
        paths: bool,
        /// Bound on backward-slice expansion.
        #[arg(long = "max-depth")]
        max_depth: Option<u32>,
        /// Do not follow return values into callees.
        #[arg(long = "no-calls")]
        no_calls: bool,
    },

    /// Report declared vs. actual return types of matching methods.
    Returns {
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        regex: bool,
    },

    /// List fields whose declared type matches the given patterns.
    Fields {
        /// Type pattern, exact or `prefix*`. Repeatable.
        #[arg(long = "type", required = true)]
        types: Vec<String>,
    },

    /// List HTTP endpoints, optionally filtered by path pattern and method.
    Endpoints {
        /// Path pattern supporting `*` and `**`.
        #[arg(long)]
        path: Option<String>,
        #[arg(long, value_enum, ignore_case = true)]
        method: Option<HttpMethodArg>,
    },

    /// Compute dead branches and methods under assumed call results.
    Deadcode {
        /// Assumption spec, e.g. `com.example.Client.getOption(0=1001)->true`.
        /// Repeatable.
        #[arg(long = "assume", required = true)]
        assumptions: Vec<String>,
        /// Regex naming methods that are always live. Repeatable.
        #[arg(long = "entry-point")]
        entry_points: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum HttpMethodArg {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Any,
}

impl From<HttpMethodArg> for HttpMethod {
    fn from(value: HttpMethodArg) -> Self {
        match value {
            HttpMethodArg::Get => HttpMethod::Get,
            HttpMethodArg::Post => HttpMethod::Post,
            HttpMethodArg::Put => HttpMethod::Put,
            HttpMethodArg::Delete => HttpMethod::Delete,
            HttpMethodArg::Patch => HttpMethod::Patch,
            HttpMethodArg::Any => HttpMethod::Any,
        }
    }
}
