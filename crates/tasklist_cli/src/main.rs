//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tasklist_core` linkage and storage bootstrap from a shell.
//! - Print deterministic `key=value` lines.
//!
//! Usage: `tasklist_cli [DB_PATH] [LOG_DIR] [LOG_LEVEL]`. Without a path an
//! in-memory store is used; without a log directory file logging stays off.

use std::process::ExitCode;
use tasklist_core::{init_logging, SqliteKvStore, TaskListConfig, TaskStore};

fn main() -> ExitCode {
    let (config, log_dir) = match parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("tasklist_core error={err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = log_dir {
        if let Err(err) = init_logging(config.log_level(), &log_dir) {
            eprintln!("tasklist_core error={err}");
            return ExitCode::FAILURE;
        }
        println!("tasklist_core log_level={}", config.log_level());
    }

    println!("tasklist_core ping={}", tasklist_core::ping());
    println!("tasklist_core version={}", tasklist_core::core_version());

    match load_task_count(&config) {
        Ok(count) => {
            println!("tasklist_core tasks={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("tasklist_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn load_task_count(config: &TaskListConfig) -> Result<usize, String> {
    let conn = config.open_connection().map_err(|err| err.to_string())?;
    let kv = SqliteKvStore::try_new(&conn).map_err(|err| err.to_string())?;
    let mut store = TaskStore::with_storage_key(kv, config.storage_key());
    Ok(store.initialize().len())
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<(TaskListConfig, Option<String>), String> {
    let mut config = match args.next() {
        Some(path) => TaskListConfig::new().with_db_path(path),
        None => TaskListConfig::new(),
    };
    let log_dir = args.next();
    if let Some(level) = args.next() {
        config = config.with_log_level(&level)?;
    }
    Ok((config, log_dir))
}
