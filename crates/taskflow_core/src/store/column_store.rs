//! Column collection store.
//!
//! # Responsibility
//! - Own the column collection and each column's `task_ids` order-array.
//! - Keep boards' `column_order` in step with column create/delete/move.
//!
//! # Invariants
//! - A create or delete writes both the column collection and the owning
//!   board's order before returning, or writes neither.
//! - `columns_by_board` tolerates dangling ids in `column_order` by
//!   skipping them.

use super::memo::Memo;
use super::observer::{ChangeKind, StoreChange, StoreKind, Subscription};
use super::reorder::{insert_clamped, without};
use super::shared::StoreCore;
use super::{ColumnOrderHost, StoreError, StoreResult, TaskOrderHost};
use crate::config::StoreConfig;
use crate::model::board::BoardId;
use crate::model::column::{Column, ColumnId, ColumnPatch};
use crate::model::task::TaskId;
use crate::persist::{PersistenceAdapter, COLUMNS_KEY};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::rc::Rc;

pub struct ColumnStore {
    core: StoreCore,
    columns: Rc<Vec<Column>>,
    by_board: Memo<(u64, u64, Option<BoardId>), Vec<Column>>,
}

impl ColumnStore {
    /// Creates the store and loads persisted columns.
    pub fn new(adapter: PersistenceAdapter, config: StoreConfig) -> Self {
        let mut store = Self {
            core: StoreCore::new(StoreKind::Columns, adapter, config),
            columns: Rc::new(Vec::new()),
            by_board: Memo::new(),
        };
        // Failure is already recorded on the store.
        let _ = store.load_columns();
        store
    }

    pub fn load_columns(&mut self) -> StoreResult<usize> {
        self.core.begin_loading();
        match self.core.adapter().load_collection::<Column>(COLUMNS_KEY) {
            Ok(columns) => {
                let count = columns.len();
                self.columns = Rc::new(columns);
                self.core.finish_load();
                info!("event=store_load module=store store=columns status=ok count={count}");
                self.core.commit(ChangeKind::Loaded { count });
                Ok(count)
            }
            Err(err) => Err(self.core.fail_load("load_columns", err.into())),
        }
    }

    /// Appends a column to `board_id` and to the end of its column order.
    pub fn create_column(
        &mut self,
        boards: &mut dyn ColumnOrderHost,
        board_id: BoardId,
        title: impl Into<String>,
        color: Option<String>,
    ) -> StoreResult<Column> {
        let Some(board) = boards.board(board_id) else {
            return Err(self
                .core
                .fail("create_column", StoreError::BoardNotFound(board_id)));
        };
        let mut order = board.column_order.clone();

        let column = Column::new(board_id, title, color);
        order.push(column.id);
        Rc::make_mut(&mut self.columns).push(column.clone());

        if let Err(err) = boards.update_column_order(board_id, order) {
            Rc::make_mut(&mut self.columns).pop();
            return Err(self.core.fail("create_column", err));
        }

        self.persist();
        self.core.commit(ChangeKind::Created(column.id));
        Ok(column)
    }

    pub fn update_column(&mut self, id: ColumnId, patch: ColumnPatch) -> StoreResult<Column> {
        let index = self.require_index("update_column", id)?;
        let columns = Rc::make_mut(&mut self.columns);
        patch.apply_to(&mut columns[index]);
        let updated = columns[index].clone();
        self.persist();
        self.core.commit(ChangeKind::Updated(id));
        Ok(updated)
    }

    /// Removes a column and strips it from its owning board's order.
    ///
    /// Tasks listed in the column are left in place, still pointing at the
    /// removed column id.
    pub fn delete_column(
        &mut self,
        boards: &mut dyn ColumnOrderHost,
        id: ColumnId,
    ) -> StoreResult<Column> {
        let index = self.require_index("delete_column", id)?;
        let board_id = self.columns[index].board_id;

        let removed = Rc::make_mut(&mut self.columns).remove(index);
        let order = boards
            .board(board_id)
            .map(|board| without(&board.column_order, &id));
        match order.map(|order| boards.update_column_order(board_id, order)) {
            Some(Ok(())) => {}
            Some(Err(err)) => warn!(
                "event=delete_column module=store store=columns status=error board_id={board_id} error={err}"
            ),
            None => debug!(
                "event=delete_column module=store store=columns status=ok board_missing={board_id}"
            ),
        }

        self.persist();
        self.core.commit(ChangeKind::Deleted(vec![id]));
        Ok(removed)
    }

    /// Moves a column to `to_index` within its board's column order.
    ///
    /// Returns the index actually used after clamping.
    pub fn move_column(
        &mut self,
        boards: &mut dyn ColumnOrderHost,
        id: ColumnId,
        to_index: usize,
    ) -> StoreResult<usize> {
        let index = self.require_index("move_column", id)?;
        let board_id = self.columns[index].board_id;
        let Some(board) = boards.board(board_id) else {
            return Err(self
                .core
                .fail("move_column", StoreError::BoardNotFound(board_id)));
        };

        // A column its board forgot about is put back rather than rejected.
        let mut order = without(&board.column_order, &id);
        let final_index = insert_clamped(&mut order, id, to_index);
        boards
            .update_column_order(board_id, order)
            .map_err(|err| self.core.fail("move_column", err))?;
        Ok(final_index)
    }

    /// Replaces one column's `task_ids` wholesale.
    pub fn update_task_order(&mut self, id: ColumnId, task_ids: Vec<TaskId>) -> StoreResult<()> {
        self.replace_task_orders(vec![(id, task_ids)])
    }

    /// Removes every column owned by `board_id`, returning them.
    pub fn remove_columns_of_board(&mut self, board_id: BoardId) -> Vec<Column> {
        let (removed, kept): (Vec<Column>, Vec<Column>) = self
            .columns
            .iter()
            .cloned()
            .partition(|column| column.board_id == board_id);
        if removed.is_empty() {
            return removed;
        }
        self.columns = Rc::new(kept);
        self.persist();
        self.core
            .commit(ChangeKind::Deleted(removed.iter().map(|c| c.id).collect()));
        removed
    }

    pub fn all_columns(&self) -> Rc<Vec<Column>> {
        Rc::clone(&self.columns)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// Columns of the selected board, in that board's `column_order`.
    pub fn columns_by_board(&self, boards: &dyn ColumnOrderHost) -> Rc<Vec<Column>> {
        let selected = boards.selected_board();
        let key = (boards.version(), self.core.version(), selected.map(|b| b.id));
        self.by_board.get_or_compute(key, || {
            let Some(board) = selected else {
                return Vec::new();
            };
            let live: HashMap<ColumnId, &Column> = self
                .columns
                .iter()
                .filter(|column| column.board_id == board.id)
                .map(|column| (column.id, column))
                .collect();
            board
                .column_order
                .iter()
                .filter_map(|id| live.get(id).map(|column| (*column).clone()))
                .collect()
        })
    }

    pub fn is_loading(&self) -> bool {
        self.core.is_loading()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.core.error_message()
    }

    pub fn persistence_error(&self) -> Option<&str> {
        self.core.persistence_error()
    }

    pub fn version(&self) -> u64 {
        self.core.version()
    }

    pub fn subscribe(&self, listener: impl FnMut(&StoreChange) + 'static) -> Subscription {
        self.core.subscribe(listener)
    }

    fn require_index(&mut self, operation: &'static str, id: ColumnId) -> StoreResult<usize> {
        match self.columns.iter().position(|column| column.id == id) {
            Some(index) => Ok(index),
            None => Err(self.core.fail(operation, StoreError::ColumnNotFound(id))),
        }
    }

    fn persist(&mut self) {
        self.core
            .writeback(COLUMNS_KEY, self.columns.as_slice(), None);
    }
}

impl TaskOrderHost for ColumnStore {
    fn column(&self, id: ColumnId) -> Option<&Column> {
        ColumnStore::column(self, id)
    }

    fn version(&self) -> u64 {
        ColumnStore::version(self)
    }

    fn replace_task_orders(&mut self, updates: Vec<(ColumnId, Vec<TaskId>)>) -> StoreResult<()> {
        let mut indexed = Vec::with_capacity(updates.len());
        for (id, task_ids) in updates {
            let index = self.require_index("replace_task_orders", id)?;
            indexed.push((index, task_ids));
        }
        if indexed.is_empty() {
            return Ok(());
        }

        let columns = Rc::make_mut(&mut self.columns);
        let mut touched = Vec::with_capacity(indexed.len());
        for (index, task_ids) in indexed {
            let column = &mut columns[index];
            column.task_ids = task_ids;
            column.touch();
            touched.push(column.id);
        }
        self.persist();
        self.core.commit(ChangeKind::Reordered(touched));
        Ok(())
    }

    fn columns_by_board(&self, boards: &dyn ColumnOrderHost) -> Rc<Vec<Column>> {
        ColumnStore::columns_by_board(self, boards)
    }
}
