//! Task collection store and the task move protocol.
//!
//! # Responsibility
//! - Own the task collection and the selected-task cursor.
//! - Keep each task's `column_id` in step with the columns' `task_ids`.
//!
//! # Invariants
//! - Moves validate every id before writing, then publish the column
//!   order-arrays and the task back-reference together.
//! - A move whose source column no longer lists the task changes nothing.
//! - Checklist and label edits run on a copy and replace the task only when
//!   the whole edit succeeded.

use super::memo::Memo;
use super::observer::{ChangeKind, StoreChange, StoreKind, Subscription};
use super::reorder::{relocate, splice_move, without, Relocation};
use super::shared::StoreCore;
use super::{ColumnOrderHost, StoreError, StoreResult, TaskOrderHost};
use crate::config::StoreConfig;
use crate::model::board::BoardId;
use crate::model::column::{Column, ColumnId};
use crate::model::task::{ChecklistItem, Label, Task, TaskDraft, TaskId, TaskPatch};
use crate::persist::{PersistenceAdapter, SELECTED_TASK_KEY, TASKS_KEY};
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;
use uuid::Uuid;

/// One column of the selected board with its tasks in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTasks {
    pub column: Column,
    pub tasks: Vec<Task>,
}

pub struct TaskStore {
    core: StoreCore,
    tasks: Rc<Vec<Task>>,
    selected_task_id: Option<TaskId>,
    by_column: Memo<(u64, u64, u64), Vec<ColumnTasks>>,
}

impl TaskStore {
    /// Creates the store and loads persisted tasks.
    pub fn new(adapter: PersistenceAdapter, config: StoreConfig) -> Self {
        let mut store = Self {
            core: StoreCore::new(StoreKind::Tasks, adapter, config),
            tasks: Rc::new(Vec::new()),
            selected_task_id: None,
            by_column: Memo::new(),
        };
        // Failure is already recorded on the store.
        let _ = store.load_tasks();
        store
    }

    pub fn load_tasks(&mut self) -> StoreResult<usize> {
        self.core.begin_loading();
        match self.core.adapter().load_collection::<Task>(TASKS_KEY) {
            Ok(tasks) => {
                let count = tasks.len();
                self.tasks = Rc::new(tasks);
                self.selected_task_id = self.core.load_cursor(SELECTED_TASK_KEY);
                self.core.finish_load();
                info!("event=store_load module=store store=tasks status=ok count={count}");
                self.core.commit(ChangeKind::Loaded { count });
                Ok(count)
            }
            Err(err) => Err(self.core.fail_load("load_tasks", err.into())),
        }
    }

    /// Creates a task at the end of `column_id`.
    ///
    /// The stored `board_id` is the column's owner; a different `board_id`
    /// argument is ignored.
    pub fn create_task(
        &mut self,
        columns: &mut dyn TaskOrderHost,
        column_id: ColumnId,
        board_id: BoardId,
        draft: TaskDraft,
    ) -> StoreResult<Task> {
        let Some(column) = columns.column(column_id) else {
            return Err(self
                .core
                .fail("create_task", StoreError::ColumnNotFound(column_id)));
        };
        if column.board_id != board_id {
            debug!(
                "event=create_task module=store store=tasks status=ok board_override={}",
                column.board_id
            );
        }

        let task = Task::from_draft(column_id, column.board_id, draft);
        let mut order = column.task_ids.clone();
        order.push(task.id);
        columns
            .replace_task_orders(vec![(column_id, order)])
            .map_err(|err| self.core.fail("create_task", err))?;

        Rc::make_mut(&mut self.tasks).push(task.clone());
        self.persist();
        self.core.commit(ChangeKind::Created(task.id));
        Ok(task)
    }

    /// Merges `patch` into a task.
    ///
    /// A `column_id` different from the current one moves the task to the
    /// end of that column first. The old column may already be gone; the
    /// new one must exist.
    pub fn update_task(
        &mut self,
        columns: &mut dyn TaskOrderHost,
        id: TaskId,
        patch: TaskPatch,
    ) -> StoreResult<Task> {
        let index = self.require_index("update_task", id)?;
        let current_column = self.tasks[index].column_id;
        let target = patch.column_id.filter(|target| *target != current_column);

        let mut moved_to = None;
        if let Some(target) = target {
            let Some(destination) = columns.column(target) else {
                return Err(self
                    .core
                    .fail("update_task", StoreError::ColumnNotFound(target)));
            };
            let board_id = destination.board_id;
            let mut destination_ids = without(&destination.task_ids, &id);
            destination_ids.push(id);
            let position = destination_ids.len() - 1;

            let mut updates = Vec::with_capacity(2);
            if let Some(source) = columns.column(current_column) {
                updates.push((current_column, without(&source.task_ids, &id)));
            }
            updates.push((target, destination_ids));
            columns
                .replace_task_orders(updates)
                .map_err(|err| self.core.fail("update_task", err))?;
            moved_to = Some((target, board_id, position));
        }

        let task = &mut Rc::make_mut(&mut self.tasks)[index];
        if let Some((column_id, board_id, _)) = moved_to {
            task.column_id = column_id;
            task.board_id = board_id;
        }
        patch.apply_fields_to(task);
        let updated = task.clone();
        self.persist();

        let change = match moved_to {
            Some((to, _, index)) => ChangeKind::Moved {
                id,
                from: current_column,
                to,
                index,
            },
            None => ChangeKind::Updated(id),
        };
        self.core.commit(change);
        Ok(updated)
    }

    /// Moves the task at `from_index` of a column to `to_index`.
    ///
    /// `to_index` counts positions after the removal and is clamped. Returns
    /// the final index. Only the column is written; moving a task onto its
    /// own position writes nothing.
    pub fn reorder_tasks_in_column(
        &mut self,
        columns: &mut dyn TaskOrderHost,
        column_id: ColumnId,
        from_index: usize,
        to_index: usize,
    ) -> StoreResult<usize> {
        let Some(column) = columns.column(column_id) else {
            return Err(self
                .core
                .fail("reorder_tasks_in_column", StoreError::ColumnNotFound(column_id)));
        };
        let len = column.task_ids.len();
        let Some((order, index)) = splice_move(&column.task_ids, from_index, to_index) else {
            return Err(self.core.fail(
                "reorder_tasks_in_column",
                StoreError::IndexOutOfRange {
                    column_id,
                    index: from_index,
                    len,
                },
            ));
        };

        if order != column.task_ids {
            columns
                .replace_task_orders(vec![(column_id, order)])
                .map_err(|err| self.core.fail("reorder_tasks_in_column", err))?;
        }
        self.core.clear_error();
        Ok(index)
    }

    /// Moves a task between columns, or within one when both ids match.
    ///
    /// Returns the index the task landed at in `to_column_id`.
    pub fn move_task_to_column(
        &mut self,
        columns: &mut dyn TaskOrderHost,
        task_id: TaskId,
        from_column_id: ColumnId,
        to_column_id: ColumnId,
        to_index: usize,
    ) -> StoreResult<usize> {
        let index = self.require_index("move_task_to_column", task_id)?;
        let Some(source) = columns.column(from_column_id) else {
            return Err(self.core.fail(
                "move_task_to_column",
                StoreError::ColumnNotFound(from_column_id),
            ));
        };

        let (relocation, board_id) = if from_column_id == to_column_id {
            (
                relocate(source.task_ids.as_slice(), None, &task_id, to_index),
                source.board_id,
            )
        } else {
            let Some(destination) = columns.column(to_column_id) else {
                return Err(self.core.fail(
                    "move_task_to_column",
                    StoreError::ColumnNotFound(to_column_id),
                ));
            };
            (
                relocate(
                    source.task_ids.as_slice(),
                    Some(destination.task_ids.as_slice()),
                    &task_id,
                    to_index,
                ),
                destination.board_id,
            )
        };
        let Some(relocation) = relocation else {
            return Err(self.core.fail(
                "move_task_to_column",
                StoreError::TaskNotInColumn {
                    task_id,
                    column_id: from_column_id,
                },
            ));
        };

        let final_index = relocation.index();
        let updates = match relocation {
            Relocation::Within { list, .. } => vec![(from_column_id, list)],
            Relocation::Across {
                source,
                destination,
                ..
            } => vec![(from_column_id, source), (to_column_id, destination)],
        };
        columns
            .replace_task_orders(updates)
            .map_err(|err| self.core.fail("move_task_to_column", err))?;

        let task = &mut Rc::make_mut(&mut self.tasks)[index];
        task.column_id = to_column_id;
        task.board_id = board_id;
        task.touch();
        self.persist();
        self.core.commit(ChangeKind::Moved {
            id: task_id,
            from: from_column_id,
            to: to_column_id,
            index: final_index,
        });
        Ok(final_index)
    }

    /// Removes a task and strips it from its column, when that still exists.
    pub fn delete_task(&mut self, columns: &mut dyn TaskOrderHost, id: TaskId) -> StoreResult<Task> {
        let index = self.require_index("delete_task", id)?;
        let column_id = self.tasks[index].column_id;

        let order = columns
            .column(column_id)
            .map(|column| without(&column.task_ids, &id));
        if let Some(order) = order {
            columns
                .replace_task_orders(vec![(column_id, order)])
                .map_err(|err| self.core.fail("delete_task", err))?;
        }

        let removed = Rc::make_mut(&mut self.tasks).remove(index);
        if self.selected_task_id == Some(id) {
            self.selected_task_id = None;
        }
        self.persist();
        self.core.commit(ChangeKind::Deleted(vec![id]));
        Ok(removed)
    }

    /// Removes every task placed in one of `column_ids`, returning them.
    ///
    /// Column order-arrays are not touched; the columns are expected to be
    /// going away too.
    pub fn remove_tasks_in_columns(&mut self, column_ids: &[ColumnId]) -> Vec<Task> {
        let (removed, kept): (Vec<Task>, Vec<Task>) = self
            .tasks
            .iter()
            .cloned()
            .partition(|task| column_ids.contains(&task.column_id));
        if removed.is_empty() {
            return removed;
        }
        if let Some(selected) = self.selected_task_id {
            if removed.iter().any(|task| task.id == selected) {
                self.selected_task_id = None;
            }
        }
        self.tasks = Rc::new(kept);
        self.persist();
        self.core
            .commit(ChangeKind::Deleted(removed.iter().map(|t| t.id).collect()));
        removed
    }

    pub fn select_task(&mut self, id: Option<TaskId>) {
        if self.selected_task_id == id {
            return;
        }
        self.selected_task_id = id;
        self.persist();
        self.core.commit(ChangeKind::Selected(id));
    }

    pub fn add_checklist_item(
        &mut self,
        task_id: TaskId,
        text: impl Into<String>,
    ) -> StoreResult<ChecklistItem> {
        let item = ChecklistItem::new(text);
        let added = item.clone();
        self.edit("add_checklist_item", task_id, move |task| {
            task.checklist.push(added);
            Ok(())
        })?;
        Ok(item)
    }

    pub fn set_checklist_item_completed(
        &mut self,
        task_id: TaskId,
        item_id: Uuid,
        completed: bool,
    ) -> StoreResult<()> {
        self.edit("set_checklist_item_completed", task_id, |task| {
            let item = task
                .checklist
                .iter_mut()
                .find(|item| item.id == item_id)
                .ok_or(StoreError::ChecklistItemNotFound { task_id, item_id })?;
            item.is_completed = completed;
            Ok(())
        })
    }

    pub fn delete_checklist_item(
        &mut self,
        task_id: TaskId,
        item_id: Uuid,
    ) -> StoreResult<ChecklistItem> {
        self.edit("delete_checklist_item", task_id, |task| {
            let position = task
                .checklist
                .iter()
                .position(|item| item.id == item_id)
                .ok_or(StoreError::ChecklistItemNotFound { task_id, item_id })?;
            Ok(task.checklist.remove(position))
        })
    }

    /// Attaches `label`; returns `false` when a label with its id was present.
    pub fn add_label(&mut self, task_id: TaskId, label: Label) -> StoreResult<bool> {
        self.edit("add_label", task_id, |task| Ok(task.insert_label(label)))
    }

    /// Detaches a label; returns `false` when the task did not carry it.
    pub fn remove_label(&mut self, task_id: TaskId, label_id: Uuid) -> StoreResult<bool> {
        self.edit("remove_label", task_id, |task| {
            let before = task.labels.len();
            task.labels.retain(|label| label.id != label_id);
            Ok(task.labels.len() != before)
        })
    }

    pub fn all_tasks(&self) -> Rc<Vec<Task>> {
        Rc::clone(&self.tasks)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.selected_task_id
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id.and_then(|id| self.task(id))
    }

    /// Tasks of every column of the selected board, in display order.
    ///
    /// Within a column tasks follow `task_ids`; tasks pointing at the column
    /// without being listed come last, in collection order.
    pub fn tasks_by_column(
        &self,
        columns: &dyn TaskOrderHost,
        boards: &dyn ColumnOrderHost,
    ) -> Rc<Vec<ColumnTasks>> {
        let key = (boards.version(), columns.version(), self.core.version());
        self.by_column.get_or_compute(key, || {
            columns
                .columns_by_board(boards)
                .iter()
                .map(|column| {
                    let rank: HashMap<TaskId, usize> = column
                        .task_ids
                        .iter()
                        .enumerate()
                        .map(|(position, id)| (*id, position))
                        .collect();
                    let mut tasks: Vec<Task> = self
                        .tasks
                        .iter()
                        .filter(|task| task.column_id == column.id)
                        .cloned()
                        .collect();
                    tasks.sort_by_key(|task| rank.get(&task.id).copied().unwrap_or(usize::MAX));
                    ColumnTasks {
                        column: column.clone(),
                        tasks,
                    }
                })
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

    fn edit<R>(
        &mut self,
        operation: &'static str,
        id: TaskId,
        apply: impl FnOnce(&mut Task) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let index = self.require_index(operation, id)?;
        let mut draft = self.tasks[index].clone();
        let outcome = apply(&mut draft).map_err(|err| self.core.fail(operation, err))?;
        draft.touch();
        Rc::make_mut(&mut self.tasks)[index] = draft;
        self.persist();
        self.core.commit(ChangeKind::Updated(id));
        Ok(outcome)
    }

    fn require_index(&mut self, operation: &'static str, id: TaskId) -> StoreResult<usize> {
        match self.tasks.iter().position(|task| task.id == id) {
            Some(index) => Ok(index),
            None => Err(self.core.fail(operation, StoreError::TaskNotFound(id))),
        }
    }

    fn persist(&mut self) {
        self.core.writeback(
            TASKS_KEY,
            self.tasks.as_slice(),
            Some((SELECTED_TASK_KEY, self.selected_task_id)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::config::StoreConfig;
    use crate::model::column::Column;
    use crate::model::task::{Label, TaskDraft, TaskPatch};
    use crate::persist::PersistenceAdapter;
    use crate::store::{BoardStore, ColumnStore, StoreError};
    use uuid::Uuid;

    struct Fixture {
        boards: BoardStore,
        columns: ColumnStore,
        tasks: TaskStore,
    }

    impl Fixture {
        fn new() -> Self {
            let adapter = PersistenceAdapter::in_memory();
            Self {
                boards: BoardStore::new(adapter.clone(), StoreConfig::default()),
                columns: ColumnStore::new(adapter.clone(), StoreConfig::default()),
                tasks: TaskStore::new(adapter, StoreConfig::default()),
            }
        }

        fn column(&mut self, title: &str) -> Column {
            let board_id = match self.boards.selected_board_id() {
                Some(id) => id,
                None => {
                    let board = self.boards.create_board("Board", None);
                    self.boards.select_board(Some(board.id));
                    board.id
                }
            };
            self.columns
                .create_column(&mut self.boards, board_id, title, None)
                .unwrap()
        }

        fn task_ids(&self, column: &Column) -> Vec<Uuid> {
            self.columns.column(column.id).unwrap().task_ids.clone()
        }
    }

    #[test]
    fn create_appends_to_column_order() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        let first = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();
        let second = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("b"))
            .unwrap();
        assert_eq!(fx.task_ids(&todo), vec![first.id, second.id]);
        assert_eq!(first.board_id, todo.board_id);
    }

    #[test]
    fn reorder_out_of_range_is_rejected_without_writes() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        fx.tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();
        let version = fx.columns.version();

        let err = fx
            .tasks
            .reorder_tasks_in_column(&mut fx.columns, todo.id, 3, 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { len: 1, .. }));
        assert_eq!(fx.columns.version(), version);
        assert!(fx.tasks.error_message().is_some());
    }

    #[test]
    fn stale_move_fails_cleanly() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        let doing = fx.column("Doing");
        let task = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();
        fx.tasks
            .move_task_to_column(&mut fx.columns, task.id, todo.id, doing.id, 0)
            .unwrap();

        let err = fx
            .tasks
            .move_task_to_column(&mut fx.columns, task.id, todo.id, doing.id, 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskNotInColumn { .. }));
        assert_eq!(fx.task_ids(&doing), vec![task.id]);
        assert!(fx.task_ids(&todo).is_empty());
    }

    #[test]
    fn update_with_new_column_is_an_implicit_move() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        let done = fx.column("Done");
        let task = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();

        let updated = fx
            .tasks
            .update_task(
                &mut fx.columns,
                task.id,
                TaskPatch::default().column(done.id).title("renamed"),
            )
            .unwrap();
        assert_eq!(updated.column_id, done.id);
        assert_eq!(updated.title, "renamed");
        assert!(fx.task_ids(&todo).is_empty());
        assert_eq!(fx.task_ids(&done), vec![task.id]);
    }

    #[test]
    fn update_to_unknown_column_changes_nothing() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        let task = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();

        let err = fx
            .tasks
            .update_task(
                &mut fx.columns,
                task.id,
                TaskPatch::default().column(Uuid::new_v4()).title("renamed"),
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fx.tasks.task(task.id).unwrap().title, "a");
        assert_eq!(fx.task_ids(&todo), vec![task.id]);
    }

    #[test]
    fn checklist_edits_validate_item_ids() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        let task = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();

        let item = fx.tasks.add_checklist_item(task.id, "step").unwrap();
        fx.tasks
            .set_checklist_item_completed(task.id, item.id, true)
            .unwrap();
        assert_eq!(fx.tasks.task(task.id).unwrap().checklist_progress(), (1, 1));

        let err = fx
            .tasks
            .delete_checklist_item(task.id, Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, StoreError::ChecklistItemNotFound { .. }));
        assert_eq!(fx.tasks.task(task.id).unwrap().checklist.len(), 1);

        let removed = fx.tasks.delete_checklist_item(task.id, item.id).unwrap();
        assert_eq!(removed.id, item.id);
    }

    #[test]
    fn labels_dedupe_by_id() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        let task = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();
        let label = Label::new("bug", "#ff0000");

        assert!(fx.tasks.add_label(task.id, label.clone()).unwrap());
        assert!(!fx.tasks.add_label(task.id, label.clone()).unwrap());
        assert!(fx.tasks.remove_label(task.id, label.id).unwrap());
        assert!(!fx.tasks.remove_label(task.id, label.id).unwrap());
    }

    #[test]
    fn unlisted_tasks_sort_last_in_view() {
        let mut fx = Fixture::new();
        let todo = fx.column("Todo");
        let a = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("a"))
            .unwrap();
        let b = fx
            .tasks
            .create_task(&mut fx.columns, todo.id, todo.board_id, TaskDraft::new("b"))
            .unwrap();
        fx.columns.update_task_order(todo.id, vec![b.id]).unwrap();

        let view = fx.tasks.tasks_by_column(&fx.columns, &fx.boards);
        let ids: Vec<_> = view[0].tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }
}
