//! Task board use-case service.
//!
//! # Responsibility
//! - Provide one entry point for every board, column and task operation.
//! - Pass the upstream store into downstream operations, so stores stay
//!   unaware of each other.
//! - Honor `StoreConfig::cascade_on_delete` for board and column deletes.
//!
//! # Invariants
//! - With cascading disabled, deletes leave children in place, pointing at
//!   the removed parent id.
//! - The parent is deleted first; a failed parent delete removes nothing.

use crate::config::StoreConfig;
use crate::model::board::{Board, BoardId, BoardPatch, BoardSummary};
use crate::model::column::{Column, ColumnId, ColumnPatch};
use crate::model::task::{ChecklistItem, Label, Task, TaskDraft, TaskId, TaskPatch};
use crate::persist::{PersistResult, PersistenceAdapter, SqliteKvStore};
use crate::store::{
    check_integrity, BoardStore, ColumnStore, ColumnTasks, IntegrityIssue, StoreResult,
    TaskStore,
};
use log::info;
use std::path::Path;
use std::rc::Rc;
use uuid::Uuid;

/// Facade over the board, column and task stores.
pub struct KanbanService {
    config: StoreConfig,
    boards: BoardStore,
    columns: ColumnStore,
    tasks: TaskStore,
}

impl KanbanService {
    /// Builds the stores over `adapter` and loads their collections.
    pub fn new(adapter: PersistenceAdapter, config: StoreConfig) -> Self {
        Self {
            boards: BoardStore::new(adapter.clone(), config.clone()),
            columns: ColumnStore::new(adapter.clone(), config.clone()),
            tasks: TaskStore::new(adapter, config.clone()),
            config,
        }
    }

    /// Service backed by a fresh in-memory key-value store.
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::new(PersistenceAdapter::in_memory(), config)
    }

    /// Service backed by the SQLite database at `path`, created if missing.
    pub fn open_sqlite(path: impl AsRef<Path>, config: StoreConfig) -> PersistResult<Self> {
        let backend = SqliteKvStore::open(path)?;
        Ok(Self::new(PersistenceAdapter::new(Rc::new(backend)), config))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn boards(&self) -> &BoardStore {
        &self.boards
    }

    pub fn columns(&self) -> &ColumnStore {
        &self.columns
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Reloads all three collections from persistence.
    ///
    /// Every store is attempted; the first failure is returned.
    pub fn reload(&mut self) -> StoreResult<()> {
        let boards = self.boards.load_boards();
        let columns = self.columns.load_columns();
        let tasks = self.tasks.load_tasks();
        boards?;
        columns?;
        tasks?;
        Ok(())
    }

    pub fn create_board(&mut self, title: impl Into<String>, description: Option<String>) -> Board {
        self.boards.create_board(title, description)
    }

    pub fn update_board(&mut self, id: BoardId, patch: BoardPatch) -> StoreResult<Board> {
        self.boards.update_board(id, patch)
    }

    pub fn update_column_order(&mut self, id: BoardId, order: Vec<ColumnId>) -> StoreResult<()> {
        self.boards.update_column_order(id, order)
    }

    /// Deletes a board, and with cascading enabled its columns and their tasks.
    pub fn delete_board(&mut self, id: BoardId) -> StoreResult<Board> {
        let board = self.boards.delete_board(id)?;
        if self.config.cascade_on_delete {
            let columns = self.columns.remove_columns_of_board(id);
            let column_ids: Vec<ColumnId> = columns.iter().map(|column| column.id).collect();
            let tasks = self.tasks.remove_tasks_in_columns(&column_ids);
            info!(
                "event=cascade_delete module=service status=ok board_id={} columns={} tasks={}",
                id,
                columns.len(),
                tasks.len()
            );
        }
        Ok(board)
    }

    pub fn select_board(&mut self, id: Option<BoardId>) {
        self.boards.select_board(id);
    }

    pub fn create_column(
        &mut self,
        board_id: BoardId,
        title: impl Into<String>,
        color: Option<String>,
    ) -> StoreResult<Column> {
        self.columns
            .create_column(&mut self.boards, board_id, title, color)
    }

    pub fn update_column(&mut self, id: ColumnId, patch: ColumnPatch) -> StoreResult<Column> {
        self.columns.update_column(id, patch)
    }

    /// Deletes a column, and with cascading enabled the tasks placed in it.
    pub fn delete_column(&mut self, id: ColumnId) -> StoreResult<Column> {
        let column = self.columns.delete_column(&mut self.boards, id)?;
        if self.config.cascade_on_delete {
            let tasks = self.tasks.remove_tasks_in_columns(&[id]);
            info!(
                "event=cascade_delete module=service status=ok column_id={} tasks={}",
                id,
                tasks.len()
            );
        }
        Ok(column)
    }

    pub fn move_column(&mut self, id: ColumnId, to_index: usize) -> StoreResult<usize> {
        self.columns.move_column(&mut self.boards, id, to_index)
    }

    pub fn update_task_order(&mut self, id: ColumnId, task_ids: Vec<TaskId>) -> StoreResult<()> {
        self.columns.update_task_order(id, task_ids)
    }

    pub fn create_task(
        &mut self,
        column_id: ColumnId,
        board_id: BoardId,
        draft: TaskDraft,
    ) -> StoreResult<Task> {
        self.tasks
            .create_task(&mut self.columns, column_id, board_id, draft)
    }

    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> StoreResult<Task> {
        self.tasks.update_task(&mut self.columns, id, patch)
    }

    pub fn reorder_tasks_in_column(
        &mut self,
        column_id: ColumnId,
        from_index: usize,
        to_index: usize,
    ) -> StoreResult<usize> {
        self.tasks
            .reorder_tasks_in_column(&mut self.columns, column_id, from_index, to_index)
    }

    pub fn move_task_to_column(
        &mut self,
        task_id: TaskId,
        from_column_id: ColumnId,
        to_column_id: ColumnId,
        to_index: usize,
    ) -> StoreResult<usize> {
        self.tasks.move_task_to_column(
            &mut self.columns,
            task_id,
            from_column_id,
            to_column_id,
            to_index,
        )
    }

    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<Task> {
        self.tasks.delete_task(&mut self.columns, id)
    }

    pub fn select_task(&mut self, id: Option<TaskId>) {
        self.tasks.select_task(id);
    }

    pub fn add_checklist_item(
        &mut self,
        task_id: TaskId,
        text: impl Into<String>,
    ) -> StoreResult<ChecklistItem> {
        self.tasks.add_checklist_item(task_id, text)
    }

    pub fn set_checklist_item_completed(
        &mut self,
        task_id: TaskId,
        item_id: Uuid,
        completed: bool,
    ) -> StoreResult<()> {
        self.tasks
            .set_checklist_item_completed(task_id, item_id, completed)
    }

    pub fn delete_checklist_item(
        &mut self,
        task_id: TaskId,
        item_id: Uuid,
    ) -> StoreResult<ChecklistItem> {
        self.tasks.delete_checklist_item(task_id, item_id)
    }

    pub fn add_label(&mut self, task_id: TaskId, label: Label) -> StoreResult<bool> {
        self.tasks.add_label(task_id, label)
    }

    pub fn remove_label(&mut self, task_id: TaskId, label_id: Uuid) -> StoreResult<bool> {
        self.tasks.remove_label(task_id, label_id)
    }

    pub fn all_boards(&self) -> Rc<Vec<Board>> {
        self.boards.all_boards()
    }

    pub fn selected_board(&self) -> Option<&Board> {
        self.boards.selected_board()
    }

    pub fn board_summaries(&self) -> Rc<Vec<BoardSummary>> {
        self.boards.board_summaries()
    }

    pub fn all_columns(&self) -> Rc<Vec<Column>> {
        self.columns.all_columns()
    }

    /// Columns of the selected board in display order.
    pub fn columns_by_board(&self) -> Rc<Vec<Column>> {
        self.columns.columns_by_board(&self.boards)
    }

    pub fn all_tasks(&self) -> Rc<Vec<Task>> {
        self.tasks.all_tasks()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.selected_task()
    }

    /// Columns of the selected board, each with its ordered tasks.
    pub fn tasks_by_column(&self) -> Rc<Vec<ColumnTasks>> {
        self.tasks.tasks_by_column(&self.columns, &self.boards)
    }

    /// Whether any store is still inside its simulated load latency.
    pub fn is_loading(&self) -> bool {
        self.boards.is_loading() || self.columns.is_loading() || self.tasks.is_loading()
    }

    /// Reports order-array and back-reference mismatches across all stores.
    pub fn check_integrity(&self) -> Vec<IntegrityIssue> {
        check_integrity(
            &self.boards.all_boards(),
            &self.columns.all_columns(),
            &self.tasks.all_tasks(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::KanbanService;
    use crate::config::StoreConfig;
    use crate::model::task::TaskDraft;
    use crate::store::IntegrityIssue;

    #[test]
    fn non_cascading_column_delete_orphans_tasks() {
        let mut service = KanbanService::in_memory(StoreConfig::default());
        let board = service.create_board("B1", None);
        let column = service.create_column(board.id, "Todo", None).unwrap();
        let task = service
            .create_task(column.id, board.id, TaskDraft::new("T1"))
            .unwrap();

        service.delete_column(column.id).unwrap();
        assert_eq!(service.all_tasks()[0].column_id, column.id);
        assert_eq!(
            service.check_integrity(),
            vec![IntegrityIssue::OrphanedTask {
                column_id: column.id,
                task_id: task.id,
            }]
        );
    }

    #[test]
    fn cascading_board_delete_removes_children() {
        let config = StoreConfig::default().with_cascade_on_delete(true);
        let mut service = KanbanService::in_memory(config);
        let board = service.create_board("B1", None);
        let keep = service.create_board("B2", None);
        let column = service.create_column(board.id, "Todo", None).unwrap();
        let other = service.create_column(keep.id, "Todo", None).unwrap();
        service
            .create_task(column.id, board.id, TaskDraft::new("gone"))
            .unwrap();
        let survivor = service
            .create_task(other.id, keep.id, TaskDraft::new("stays"))
            .unwrap();

        service.delete_board(board.id).unwrap();
        assert_eq!(service.all_columns().len(), 1);
        let tasks = service.all_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, survivor.id);
        assert!(service.check_integrity().is_empty());
    }
}
