//! CLI command implementations
//!
//! `run` loads configuration, installs logging and opens the database;
//! `run_command` executes one parsed command against an open database and
//! writes its results as JSON lines.

use std::io::{self, Write};

use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::database::Database;
use crate::query::QueryBuilder;
use crate::table::{Row, RowStore};

use super::args::{Cli, Command, IndexAction, QueryArgs};
use super::errors::CliResult;
use super::io::{parse_filters, parse_row, write_line};

/// Parse arguments, load configuration and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    init_tracing(&config.log_filter);

    let db = Database::open(&config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&cli.command, &db, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over the configured filter
fn init_tracing(fallback: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Run one command against `db`
pub fn run_command(cmd: &Command, db: &Database, out: &mut dyn Write) -> CliResult<()> {
    match cmd {
        Command::Tables => {
            for table in db.table_names()? {
                write_line(out, &json!({ "table": table }))?;
            }
        }
        Command::Insert { table, row } => {
            let store = db.table(table)?;
            let id = store.insert(parse_row(row)?)?;
            write_line(out, &json!({ "id": id }))?;
        }
        Command::Get(args) => {
            let store = db.table(&args.table)?;
            let query = build_query(&store, args)?;
            if args.explain {
                return write_line(out, &query.explain());
            }
            write_rows(out, &query.get()?)?;
        }
        Command::Count(args) => {
            let store = db.table(&args.table)?;
            let query = build_query(&store, args)?;
            if args.explain {
                return write_line(out, &query.explain());
            }
            write_line(out, &json!({ "count": query.count()? }))?;
        }
        Command::Delete(args) => {
            let store = db.table(&args.table)?;
            let query = build_query(&store, args)?;
            if args.explain {
                return write_line(out, &query.explain());
            }
            let deleted = query.delete()?;
            info!(table = %args.table, rows = deleted.len(), "rows deleted");
            write_rows(out, &deleted)?;
        }
        Command::Set { query: args, changes } => {
            let changes = parse_row(changes)?;
            let store = db.table(&args.table)?;
            let query = build_query(&store, args)?;
            if args.explain {
                return write_line(out, &query.explain());
            }
            write_rows(out, &query.set(changes)?)?;
        }
        Command::Index { action } => index(action, db, out)?,
        Command::Drop { table } => {
            let dropped = db.drop_table(table)?;
            write_line(out, &json!({ "table": table, "dropped": dropped }))?;
        }
    }
    Ok(())
}

fn index(action: &IndexAction, db: &Database, out: &mut dyn Write) -> CliResult<()> {
    match action {
        IndexAction::Add { table, column } => {
            db.table(table)?.add_index_table(column)?;
            write_line(out, &json!({ "table": table, "column": column, "indexed": true }))
        }
        IndexAction::Remove { table, column } => {
            let removed = db.table(table)?.remove_index_table(column)?;
            write_line(out, &json!({ "table": table, "column": column, "removed": removed }))
        }
        IndexAction::List { table } => {
            for column in db.table(table)?.index_columns()? {
                write_line(out, &json!({ "column": column }))?;
            }
            Ok(())
        }
    }
}

fn build_query<'a>(store: &'a RowStore, args: &QueryArgs) -> CliResult<QueryBuilder<'a>> {
    let mut query = store.query();
    if !args.filters.is_empty() {
        query = query.filter(parse_filters(&args.filters)?);
    }
    if !args.select.is_empty() {
        query = query.select(args.select.iter());
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    Ok(query)
}

fn write_rows(out: &mut dyn Write, rows: &[Row]) -> CliResult<()> {
    rows.iter().try_for_each(|row| write_line(out, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::Value;

    fn exec(db: &Database, argv: &[&str]) -> CliResult<Vec<Value>> {
        let cli = Cli::try_parse_from(std::iter::once("rowquery").chain(argv.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        run_command(&cli.command, db, &mut out)?;
        Ok(String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect())
    }

    fn seeded() -> Database {
        let db = Database::in_memory();
        for row in [
            r#"{"name": "a", "age": 10}"#,
            r#"{"name": "b", "age": 20}"#,
            r#"{"name": "c", "age": 20}"#,
        ] {
            exec(&db, &["insert", "people", row]).unwrap();
        }
        db
    }

    #[test]
    fn test_insert_prints_id() {
        let db = Database::in_memory();
        let out = exec(&db, &["insert", "people", r#"{"name": "a"}"#]).unwrap();
        assert_eq!(out, vec![json!({"id": "0000"})]);
        assert_eq!(exec(&db, &["tables"]).unwrap(), vec![json!({"table": "people"})]);
    }

    #[test]
    fn test_get_with_options() {
        let db = seeded();
        let out = exec(
            &db,
            &["get", "people", "--where", "age=20", "--select", "name", "--limit", "1"],
        )
        .unwrap();
        assert_eq!(out, vec![json!({"name": "b"})]);

        let count = exec(&db, &["count", "people", "--where", "age=20"]).unwrap();
        assert_eq!(count, vec![json!({"count": 2})]);
    }

    #[test]
    fn test_where_does_not_coerce_quoted_numbers() {
        let db = seeded();
        let out = exec(&db, &["count", "people", "--where", "age=\"20\""]).unwrap();
        assert_eq!(out, vec![json!({"count": 0})]);
    }

    #[test]
    fn test_set_and_delete() {
        let db = seeded();
        exec(&db, &["index", "add", "people", "age"]).unwrap();

        let updated = exec(&db, &["set", "people", r#"{"age": 21}"#, "--where", "name=b"]).unwrap();
        assert_eq!(updated, vec![json!({"id": "0001", "name": "b", "age": 21})]);

        let deleted = exec(&db, &["delete", "people", "--where", "age=20", "--select", "name"]).unwrap();
        assert_eq!(deleted, vec![json!({"name": "c"})]);

        db.table("people").unwrap().verify_indexes().unwrap();
    }

    #[test]
    fn test_explain_does_not_execute() {
        let db = seeded();
        exec(&db, &["index", "add", "people", "age"]).unwrap();

        let out = exec(&db, &["delete", "people", "--where", "age=20", "--explain"]).unwrap();
        assert_eq!(out[0]["scan"], json!("INDEX_LOOKUP"));
        assert_eq!(out[0]["index_lookups"], json!(["age = 20"]));
        assert_eq!(exec(&db, &["count", "people"]).unwrap(), vec![json!({"count": 3})]);
    }

    #[test]
    fn test_index_commands() {
        let db = seeded();
        exec(&db, &["index", "add", "people", "age"]).unwrap();
        exec(&db, &["index", "add", "people", "name"]).unwrap();
        assert_eq!(
            exec(&db, &["index", "list", "people"]).unwrap(),
            vec![json!({"column": "age"}), json!({"column": "name"})]
        );

        let out = exec(&db, &["index", "remove", "people", "age"]).unwrap();
        assert_eq!(out[0]["removed"], json!(true));
        let out = exec(&db, &["index", "remove", "people", "age"]).unwrap();
        assert_eq!(out[0]["removed"], json!(false));
    }

    #[test]
    fn test_drop() {
        let db = seeded();
        let out = exec(&db, &["drop", "people"]).unwrap();
        assert_eq!(out[0]["dropped"], json!(true));
        assert!(exec(&db, &["tables"]).unwrap().is_empty());
    }

    #[test]
    fn test_errors_carry_codes() {
        let db = Database::in_memory();
        let err = exec(&db, &["insert", "people", "[1]"]).unwrap_err();
        assert_eq!(err.code(), "ROWQUERY_CLI_INVALID_ARGUMENT");

        let err = exec(&db, &["insert", "people", r#"{"tags": [1]}"#]).unwrap_err();
        assert_eq!(err.code(), "ROWQUERY_INVALID_VALUE");

        let err = exec(&db, &["get", "../x"]).unwrap_err();
        assert_eq!(err.code(), "ROWQUERY_INVALID_TABLE_NAME");
    }
}
