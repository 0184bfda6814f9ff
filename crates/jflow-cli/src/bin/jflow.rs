#![allow(clippy::print_stderr)]

use clap::Parser;
use jflow_cli::args::CliArgs;
use jflow_cli::driver;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    if let Err(err) = driver::run(args) {
        // One line per failure; details stay behind RUST_LOG.
        tracing::error!("{err:#}");
        eprintln!("jflow: {err:#}");
        std::process::exit(1);
    }
}
