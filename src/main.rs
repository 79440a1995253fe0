//! rowquery CLI entry point
//!
//! Parsing, configuration, logging and dispatch all live in the CLI
//! module; this only reports the error and sets the exit code.

use rowquery::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
