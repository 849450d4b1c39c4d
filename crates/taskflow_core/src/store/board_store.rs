//! Board collection store.
//!
//! # Responsibility
//! - Own the board collection and the selected-board cursor.
//! - Replace `column_order` on behalf of `ColumnStore`.
//!
//! # Invariants
//! - Never reads or writes columns or tasks; deletes do not cascade.
//! - `update_column_order` trusts its caller to pass live column ids.

use super::memo::Memo;
use super::observer::{ChangeKind, StoreChange, StoreKind, Subscription};
use super::shared::StoreCore;
use super::{ColumnOrderHost, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::model::board::{Board, BoardId, BoardPatch, BoardSummary};
use crate::model::column::ColumnId;
use crate::persist::{PersistenceAdapter, BOARDS_KEY, SELECTED_BOARD_KEY};
use log::info;
use std::rc::Rc;

pub struct BoardStore {
    core: StoreCore,
    boards: Rc<Vec<Board>>,
    selected_board_id: Option<BoardId>,
    summaries: Memo<u64, Vec<BoardSummary>>,
}

impl BoardStore {
    /// Creates the store and loads persisted boards.
    ///
    /// A failed load leaves the store empty with `error_message` set.
    pub fn new(adapter: PersistenceAdapter, config: StoreConfig) -> Self {
        let mut store = Self {
            core: StoreCore::new(StoreKind::Boards, adapter, config),
            boards: Rc::new(Vec::new()),
            selected_board_id: None,
            summaries: Memo::new(),
        };
        // Failure is already recorded on the store.
        let _ = store.load_boards();
        store
    }

    /// Replaces the collection and cursor with the persisted ones.
    ///
    /// Returns the number of loaded boards. On failure the in-memory state is
    /// kept as-is.
    pub fn load_boards(&mut self) -> StoreResult<usize> {
        self.core.begin_loading();
        match self.core.adapter().load_collection::<Board>(BOARDS_KEY) {
            Ok(boards) => {
                let count = boards.len();
                self.boards = Rc::new(boards);
                self.selected_board_id = self.core.load_cursor(SELECTED_BOARD_KEY);
                self.core.finish_load();
                info!("event=store_load module=store store=boards status=ok count={count}");
                self.core.commit(ChangeKind::Loaded { count });
                Ok(count)
            }
            Err(err) => Err(self.core.fail_load("load_boards", err.into())),
        }
    }

    /// Appends a new board with an empty column order.
    pub fn create_board(&mut self, title: impl Into<String>, description: Option<String>) -> Board {
        let board = Board::new(title, description);
        Rc::make_mut(&mut self.boards).push(board.clone());
        self.persist();
        self.core.commit(ChangeKind::Created(board.id));
        board
    }

    pub fn update_board(&mut self, id: BoardId, patch: BoardPatch) -> StoreResult<Board> {
        let index = self.require_index("update_board", id)?;
        let boards = Rc::make_mut(&mut self.boards);
        patch.apply_to(&mut boards[index]);
        let updated = boards[index].clone();
        self.persist();
        self.core.commit(ChangeKind::Updated(id));
        Ok(updated)
    }

    /// Replaces `column_order` wholesale without validating membership.
    pub fn update_column_order(&mut self, id: BoardId, order: Vec<ColumnId>) -> StoreResult<()> {
        let index = self.require_index("update_column_order", id)?;
        let board = &mut Rc::make_mut(&mut self.boards)[index];
        board.column_order = order;
        board.touch();
        self.persist();
        self.core.commit(ChangeKind::Reordered(vec![id]));
        Ok(())
    }

    /// Removes one board, clearing the selection when it pointed at it.
    ///
    /// Columns and tasks of the board are left untouched.
    pub fn delete_board(&mut self, id: BoardId) -> StoreResult<Board> {
        let index = self.require_index("delete_board", id)?;
        let removed = Rc::make_mut(&mut self.boards).remove(index);
        if self.selected_board_id == Some(id) {
            self.selected_board_id = None;
        }
        self.persist();
        self.core.commit(ChangeKind::Deleted(vec![id]));
        Ok(removed)
    }

    /// Moves the cursor; the id is not checked against the collection.
    pub fn select_board(&mut self, id: Option<BoardId>) {
        if self.selected_board_id == id {
            return;
        }
        self.selected_board_id = id;
        self.persist();
        self.core.commit(ChangeKind::Selected(id));
    }

    pub fn all_boards(&self) -> Rc<Vec<Board>> {
        Rc::clone(&self.boards)
    }

    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == id)
    }

    pub fn selected_board_id(&self) -> Option<BoardId> {
        self.selected_board_id
    }

    /// Board under the cursor; `None` when the cursor is dangling.
    pub fn selected_board(&self) -> Option<&Board> {
        self.selected_board_id.and_then(|id| self.board(id))
    }

    pub fn board_summaries(&self) -> Rc<Vec<BoardSummary>> {
        self.summaries.get_or_compute(self.core.version(), || {
            self.boards.iter().map(BoardSummary::from).collect()
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

    fn require_index(&mut self, operation: &'static str, id: BoardId) -> StoreResult<usize> {
        match self.boards.iter().position(|board| board.id == id) {
            Some(index) => Ok(index),
            None => Err(self.core.fail(operation, StoreError::BoardNotFound(id))),
        }
    }

    fn persist(&mut self) {
        self.core.writeback(
            BOARDS_KEY,
            self.boards.as_slice(),
            Some((SELECTED_BOARD_KEY, self.selected_board_id)),
        );
    }
}

impl ColumnOrderHost for BoardStore {
    fn board(&self, id: BoardId) -> Option<&Board> {
        BoardStore::board(self, id)
    }

    fn selected_board(&self) -> Option<&Board> {
        BoardStore::selected_board(self)
    }

    fn version(&self) -> u64 {
        BoardStore::version(self)
    }

    fn update_column_order(&mut self, id: BoardId, order: Vec<ColumnId>) -> StoreResult<()> {
        BoardStore::update_column_order(self, id, order)
    }
}
