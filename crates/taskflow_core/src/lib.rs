//! Core domain logic for TaskFlow boards.
//! This crate is the single source of truth for board/column/task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::board::{Board, BoardId, BoardPatch, BoardSummary};
pub use model::column::{Column, ColumnId, ColumnPatch};
pub use model::task::{
    ChecklistItem, Label, Task, TaskDraft, TaskId, TaskPatch, TaskPriority, TaskStatus,
};
pub use persist::{
    KvStore, MemoryKvStore, PersistError, PersistResult, PersistenceAdapter, SqliteKvStore,
};
pub use service::KanbanService;
pub use store::{
    BoardStore, ChangeKind, ColumnStore, ColumnTasks, IntegrityIssue, StoreChange, StoreError,
    StoreKind, StoreResult, Subscription, TaskStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
