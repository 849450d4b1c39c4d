//! CLI entry point for inspecting a board database.
//!
//! # Responsibility
//! - Open (or create) a board database and print the selected board.
//! - Seed the demo board into an empty database.
//!
//! Usage: `taskflow_cli [db_path]`. Without a path an in-memory store is used.
//! Setting `TASKFLOW_LOG_DIR` (absolute path) enables file logging.

use log::info;
use std::error::Error;
use std::process::ExitCode;
use taskflow_core::{init_logging, KanbanService, StoreConfig};

const ENV_LOG_DIR: &str = "TASKFLOW_LOG_DIR";

fn main() -> ExitCode {
    println!("taskflow_core version={}", taskflow_core::core_version());
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env()?;
    if let Ok(log_dir) = std::env::var(ENV_LOG_DIR) {
        init_logging(config.log_level, &log_dir)?;
    }
    info!(
        "event=cli_run module=cli status=start backend={}",
        if db_path.is_some() { "sqlite" } else { "memory" }
    );
    let mut service = match db_path.as_deref() {
        Some(path) => KanbanService::open_sqlite(path, config)?,
        None => KanbanService::in_memory(config),
    };

    if service.all_boards().is_empty() {
        service.seed_demo_board()?;
        println!("seeded demo board");
    }
    if service.selected_board().is_none() {
        let first = service.all_boards().first().map(|board| board.id);
        service.select_board(first);
    }

    let Some(board) = service.selected_board() else {
        println!("no board selected");
        return Ok(());
    };
    println!("board {} ({})", board.title, board.id);

    for column in service.tasks_by_column().iter() {
        let over = if column.column.is_over_limit() {
            " over limit"
        } else {
            ""
        };
        println!(
            "  [{}] {} task(s){}",
            column.column.title,
            column.tasks.len(),
            over
        );
        for task in &column.tasks {
            let (done, total) = task.checklist_progress();
            println!(
                "    - {} priority={:?} checklist={}/{}",
                task.title, task.priority, done, total
            );
        }
    }

    for issue in service.check_integrity() {
        println!("integrity: {issue}");
    }
    Ok(())
}
