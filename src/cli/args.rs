//! CLI argument definitions using clap
//!
//! Commands:
//! - rowquery tables
//! - rowquery insert <table> <json>
//! - rowquery get|count|delete <table> [--where col=value]... [--select a,b] [--limit n] [--explain]
//! - rowquery set <table> <json> [query options]
//! - rowquery index add|remove <table> <column>, rowquery index list <table>
//! - rowquery drop <table>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// rowquery - row tables with index tables and a fluent query layer
#[derive(Parser, Debug)]
#[command(name = "rowquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: ./rowquery.json if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tables holding data
    Tables,

    /// Insert one row given as a JSON object
    Insert {
        table: String,
        /// Row as a JSON object
        row: String,
    },

    /// Print matching rows
    Get(QueryArgs),

    /// Print the number of matching rows
    Count(QueryArgs),

    /// Delete matching rows and print them
    Delete(QueryArgs),

    /// Merge a JSON object into matching rows and print the results
    Set {
        #[command(flatten)]
        query: QueryArgs,
        /// Changes as a JSON object
        changes: String,
    },

    /// Manage index tables
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },

    /// Remove a table with all rows and index tables
    Drop { table: String },
}

/// Query options shared by get, count, delete and set
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    pub table: String,

    /// Equality filter; the value is parsed as JSON, falling back to a string
    #[arg(long = "where", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Columns to keep, comma-separated; `*` for all
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Maximum number of own rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print the plan instead of running it
    #[arg(long)]
    pub explain: bool,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Build an index table for a column
    Add { table: String, column: String },
    /// Remove the index table for a column
    Remove { table: String, column: String },
    /// List indexed columns
    List { table: String },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
