//! CLI module for rowquery
//!
//! Provides command-line access to tables under one data directory:
//! - tables / drop: list and remove tables
//! - insert: add a row
//! - get / count / delete / set: run a query, optionally `--explain`
//! - index: add, remove and list index tables

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, IndexAction, QueryArgs};
pub use commands::{run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{parse_filters, parse_row, write_line};
