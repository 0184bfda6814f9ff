//! CLI support for the jflow analysis framework.
//!
//! This crate provides the `jflow` binary and its modules: argument parsing,
//! the JSON graph-dump loader, assumption-spec parsing, and the query driver.

pub mod args;
pub mod assume;
pub mod driver;
pub mod dump;
pub mod render;

#[cfg(test)]
#[path = "tests/assume_tests.rs"]
mod assume_tests;
#[cfg(test)]
#[path = "tests/dump_tests.rs"]
mod dump_tests;
