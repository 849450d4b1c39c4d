//! Cross-store consistency check for order-arrays and back-references.
//!
//! Boards list columns in `column_order` and columns list tasks in
//! `task_ids`; the children point back through `board_id` and `column_id`.
//! `check_integrity` reports every place where the two directions disagree.
//! It is read-only; repairing is left to callers.

use crate::model::board::{Board, BoardId};
use crate::model::column::{Column, ColumnId};
use crate::model::task::{Task, TaskId};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// `column_order` names a column that does not exist.
    DanglingColumn { board_id: BoardId, column_id: ColumnId },
    /// `column_order` names a column that belongs to another board.
    ColumnOwnerMismatch {
        board_id: BoardId,
        column_id: ColumnId,
        owner_id: BoardId,
    },
    DuplicateColumn { board_id: BoardId, column_id: ColumnId },
    /// A column whose board exists but does not list it.
    UnplacedColumn { board_id: BoardId, column_id: ColumnId },
    /// A column whose board no longer exists.
    OrphanedColumn { board_id: BoardId, column_id: ColumnId },
    /// `task_ids` names a task that does not exist.
    DanglingTask { column_id: ColumnId, task_id: TaskId },
    /// `task_ids` names a task whose `column_id` points elsewhere.
    TaskOwnerMismatch {
        column_id: ColumnId,
        task_id: TaskId,
        owner_id: ColumnId,
    },
    DuplicateTask { column_id: ColumnId, task_id: TaskId },
    UnplacedTask { column_id: ColumnId, task_id: TaskId },
    /// A task whose column no longer exists.
    OrphanedTask { column_id: ColumnId, task_id: TaskId },
    /// A task whose `board_id` differs from its column's board.
    TaskBoardMismatch {
        task_id: TaskId,
        board_id: BoardId,
        column_board_id: BoardId,
    },
}

impl Display for IntegrityIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingColumn {
                board_id,
                column_id,
            } => write!(f, "board {board_id} lists missing column {column_id}"),
            Self::ColumnOwnerMismatch {
                board_id,
                column_id,
                owner_id,
            } => write!(
                f,
                "board {board_id} lists column {column_id} owned by board {owner_id}"
            ),
            Self::DuplicateColumn {
                board_id,
                column_id,
            } => write!(f, "board {board_id} lists column {column_id} twice"),
            Self::UnplacedColumn {
                board_id,
                column_id,
            } => write!(f, "column {column_id} is not listed by board {board_id}"),
            Self::OrphanedColumn {
                board_id,
                column_id,
            } => write!(f, "column {column_id} points at missing board {board_id}"),
            Self::DanglingTask { column_id, task_id } => {
                write!(f, "column {column_id} lists missing task {task_id}")
            }
            Self::TaskOwnerMismatch {
                column_id,
                task_id,
                owner_id,
            } => write!(
                f,
                "column {column_id} lists task {task_id} placed in column {owner_id}"
            ),
            Self::DuplicateTask { column_id, task_id } => {
                write!(f, "column {column_id} lists task {task_id} twice")
            }
            Self::UnplacedTask { column_id, task_id } => {
                write!(f, "task {task_id} is not listed by column {column_id}")
            }
            Self::OrphanedTask { column_id, task_id } => {
                write!(f, "task {task_id} points at missing column {column_id}")
            }
            Self::TaskBoardMismatch {
                task_id,
                board_id,
                column_board_id,
            } => write!(
                f,
                "task {task_id} names board {board_id} but its column is on board {column_board_id}"
            ),
        }
    }
}

/// Returns every order-array inconsistency across the three collections.
///
/// Issues are reported board by board, then column by column, in collection
/// order. An empty result means both order invariants hold.
pub fn check_integrity(
    boards: &[Board],
    columns: &[Column],
    tasks: &[Task],
) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let board_owner: HashMap<BoardId, &Board> =
        boards.iter().map(|board| (board.id, board)).collect();
    let column_owner: HashMap<ColumnId, &Column> =
        columns.iter().map(|column| (column.id, column)).collect();
    let task_owner: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id, task)).collect();

    for board in boards {
        let mut seen = HashSet::new();
        for column_id in &board.column_order {
            if !seen.insert(*column_id) {
                issues.push(IntegrityIssue::DuplicateColumn {
                    board_id: board.id,
                    column_id: *column_id,
                });
                continue;
            }
            match column_owner.get(column_id) {
                None => issues.push(IntegrityIssue::DanglingColumn {
                    board_id: board.id,
                    column_id: *column_id,
                }),
                Some(column) if column.board_id != board.id => {
                    issues.push(IntegrityIssue::ColumnOwnerMismatch {
                        board_id: board.id,
                        column_id: *column_id,
                        owner_id: column.board_id,
                    })
                }
                Some(_) => {}
            }
        }
    }

    for column in columns {
        match board_owner.get(&column.board_id) {
            None => issues.push(IntegrityIssue::OrphanedColumn {
                board_id: column.board_id,
                column_id: column.id,
            }),
            Some(board) if !board.column_order.contains(&column.id) => {
                issues.push(IntegrityIssue::UnplacedColumn {
                    board_id: board.id,
                    column_id: column.id,
                })
            }
            Some(_) => {}
        }

        let mut seen = HashSet::new();
        for task_id in &column.task_ids {
            if !seen.insert(*task_id) {
                issues.push(IntegrityIssue::DuplicateTask {
                    column_id: column.id,
                    task_id: *task_id,
                });
                continue;
            }
            match task_owner.get(task_id) {
                None => issues.push(IntegrityIssue::DanglingTask {
                    column_id: column.id,
                    task_id: *task_id,
                }),
                Some(task) if task.column_id != column.id => {
                    issues.push(IntegrityIssue::TaskOwnerMismatch {
                        column_id: column.id,
                        task_id: *task_id,
                        owner_id: task.column_id,
                    })
                }
                Some(_) => {}
            }
        }
    }

    for task in tasks {
        match column_owner.get(&task.column_id) {
            None => issues.push(IntegrityIssue::OrphanedTask {
                column_id: task.column_id,
                task_id: task.id,
            }),
            Some(column) => {
                if !column.task_ids.contains(&task.id) {
                    issues.push(IntegrityIssue::UnplacedTask {
                        column_id: column.id,
                        task_id: task.id,
                    });
                }
                if column.board_id != task.board_id {
                    issues.push(IntegrityIssue::TaskBoardMismatch {
                        task_id: task.id,
                        board_id: task.board_id,
                        column_board_id: column.board_id,
                    });
                }
            }
        }
    }

    issues
}
