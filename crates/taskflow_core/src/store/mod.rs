//! Board/column/task entity stores.
//!
//! # Responsibility
//! - Own the three normalized collections and their selection cursors.
//! - Keep order-arrays and back-references consistent across stores.
//! - Expose memoized, read-only derived views.
//!
//! # Invariants
//! - Dependencies point one way: tasks see columns, columns see boards.
//!   Upward access is passed per call through `ColumnOrderHost` and
//!   `TaskOrderHost`; no store holds a reference to another.
//! - A failed operation leaves every collection untouched.
//! - Every committed transition bumps the store version, is written back to
//!   persistence and is announced to subscribers, in that order.

use crate::model::board::{Board, BoardId};
use crate::model::column::{Column, ColumnId};
use crate::model::task::TaskId;
use crate::persist::PersistError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

pub mod board_store;
pub mod column_store;
pub mod integrity;
mod loading;
mod memo;
pub mod observer;
pub mod reorder;
mod shared;
pub mod task_store;

pub use board_store::BoardStore;
pub use column_store::ColumnStore;
pub use integrity::{check_integrity, IntegrityIssue};
pub use observer::{ChangeKind, StoreChange, StoreKind, Subscription};
pub use task_store::{ColumnTasks, TaskStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Expected failure conditions of store operations.
#[derive(Debug)]
pub enum StoreError {
    BoardNotFound(BoardId),
    ColumnNotFound(ColumnId),
    TaskNotFound(TaskId),
    ChecklistItemNotFound { task_id: TaskId, item_id: Uuid },
    /// The source column of a move no longer lists the task.
    TaskNotInColumn { task_id: TaskId, column_id: ColumnId },
    /// A reorder referenced a position the column does not have.
    IndexOutOfRange {
        column_id: ColumnId,
        index: usize,
        len: usize,
    },
    /// Durable storage could not be read.
    Persistence(PersistError),
}

impl StoreError {
    /// Returns whether this error names an absent entity or position.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ChecklistItemNotFound { task_id, item_id } => {
                write!(f, "checklist item {item_id} not found on task {task_id}")
            }
            Self::TaskNotInColumn { task_id, column_id } => {
                write!(f, "task {task_id} is not in column {column_id}")
            }
            Self::IndexOutOfRange {
                column_id,
                index,
                len,
            } => write!(
                f,
                "index {index} is out of range for column {column_id} with {len} tasks"
            ),
            Self::Persistence(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersistError> for StoreError {
    fn from(value: PersistError) -> Self {
        Self::Persistence(value)
    }
}

/// Board-level access that column operations need.
///
/// Implemented by [`BoardStore`]; `ColumnStore` never sees more than this.
pub trait ColumnOrderHost {
    fn board(&self, id: BoardId) -> Option<&Board>;
    fn selected_board(&self) -> Option<&Board>;
    /// Version counter covering the collection and the selection cursor.
    fn version(&self) -> u64;
    /// Replaces one board's `column_order` wholesale.
    fn update_column_order(&mut self, id: BoardId, order: Vec<ColumnId>) -> StoreResult<()>;
}

/// Column-level access that task operations need.
///
/// Implemented by [`ColumnStore`].
pub trait TaskOrderHost {
    fn column(&self, id: ColumnId) -> Option<&Column>;
    fn version(&self) -> u64;
    /// Replaces several columns' `task_ids` as one state transition.
    ///
    /// Fails without writing anything when any column id is unknown.
    fn replace_task_orders(&mut self, updates: Vec<(ColumnId, Vec<TaskId>)>) -> StoreResult<()>;
    /// Columns of the selected board in that board's display order.
    fn columns_by_board(&self, boards: &dyn ColumnOrderHost) -> Rc<Vec<Column>>;
}
