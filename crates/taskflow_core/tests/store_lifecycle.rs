use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use taskflow_core::{
    IntegrityIssue, KanbanService, KvStore, MemoryKvStore, PersistError, PersistResult,
    PersistenceAdapter, StoreConfig, StoreKind, TaskDraft,
};

/// Memory backend whose writes can be switched off.
#[derive(Default)]
struct FlakyKvStore {
    inner: MemoryKvStore,
    fail_writes: Cell<bool>,
}

impl KvStore for FlakyKvStore {
    fn get(&self, key: &str) -> PersistResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> PersistResult<()> {
        if self.fail_writes.get() {
            return Err(PersistError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> PersistResult<()> {
        if self.fail_writes.get() {
            return Err(PersistError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.remove(key)
    }
}

#[test]
fn deleting_a_column_without_cascade_leaves_orphans() {
    let mut service = KanbanService::in_memory(StoreConfig::default());
    let board = service.create_board("B1", None);
    let column = service.create_column(board.id, "Todo", None).unwrap();
    let first = service
        .create_task(column.id, board.id, TaskDraft::new("T1"))
        .unwrap();
    let second = service
        .create_task(column.id, board.id, TaskDraft::new("T2"))
        .unwrap();

    service.delete_column(column.id).unwrap();

    assert!(service.all_columns().is_empty());
    assert!(service.boards().board(board.id).unwrap().column_order.is_empty());
    let tasks = service.all_tasks();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|task| task.column_id == column.id));
    assert_eq!(
        service.check_integrity(),
        vec![
            IntegrityIssue::OrphanedTask {
                column_id: column.id,
                task_id: first.id,
            },
            IntegrityIssue::OrphanedTask {
                column_id: column.id,
                task_id: second.id,
            },
        ]
    );
}

#[test]
fn deleting_a_board_without_cascade_keeps_its_columns() {
    let mut service = KanbanService::in_memory(StoreConfig::default());
    let board = service.create_board("B1", None);
    service.select_board(Some(board.id));
    let column = service.create_column(board.id, "Todo", None).unwrap();

    service.delete_board(board.id).unwrap();
    assert_eq!(service.selected_board(), None);
    assert_eq!(service.all_columns()[0].id, column.id);
    assert!(service.columns_by_board().is_empty());
}

#[test]
fn cascading_column_delete_removes_tasks_and_selection() {
    let mut service = KanbanService::in_memory(StoreConfig::default().with_cascade_on_delete(true));
    let board = service.create_board("B1", None);
    let column = service.create_column(board.id, "Todo", None).unwrap();
    let task = service
        .create_task(column.id, board.id, TaskDraft::new("T1"))
        .unwrap();
    service.select_task(Some(task.id));

    service.delete_column(column.id).unwrap();
    assert!(service.all_tasks().is_empty());
    assert_eq!(service.selected_task(), None);
    assert!(service.check_integrity().is_empty());
}

#[test]
fn write_failures_keep_memory_authoritative() {
    let backend = Rc::new(FlakyKvStore::default());
    let mut service = KanbanService::new(
        PersistenceAdapter::new(backend.clone()),
        StoreConfig::default(),
    );
    let board = service.create_board("Saved", None);

    backend.fail_writes.set(true);
    let unsaved = service.create_board("Unsaved", None);
    assert_eq!(service.all_boards().len(), 2);
    assert!(service
        .boards()
        .persistence_error()
        .unwrap()
        .contains("quota exceeded"));
    assert_eq!(service.boards().error_message(), None);

    backend.fail_writes.set(false);
    service.select_board(Some(unsaved.id));
    assert_eq!(service.boards().persistence_error(), None);

    let reloaded = KanbanService::new(PersistenceAdapter::new(backend), StoreConfig::default());
    let ids: Vec<_> = reloaded.all_boards().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![board.id, unsaved.id]);
}

#[test]
fn loading_flag_follows_configured_latency() {
    let slow = KanbanService::in_memory(
        StoreConfig::default().with_load_latency(Duration::from_secs(60)),
    );
    assert!(slow.is_loading());
    assert!(slow.all_boards().is_empty());

    let fast = KanbanService::in_memory(StoreConfig::default());
    assert!(!fast.is_loading());
}

#[test]
fn subscriptions_stop_on_drop_and_report_store_kind() {
    let mut service = KanbanService::in_memory(StoreConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let subscription = service
        .boards()
        .subscribe(move |change| sink.borrow_mut().push((change.store, change.version)));
    let board = service.create_board("B1", None);
    service.select_board(Some(board.id));
    drop(subscription);
    service.create_board("B2", None);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(store, _)| *store == StoreKind::Boards));
    assert!(seen[0].1 < seen[1].1);
}

#[test]
fn derived_views_are_memoized_per_version() {
    let mut service = KanbanService::in_memory(StoreConfig::default());
    service.seed_demo_board().unwrap();

    let first = service.tasks_by_column();
    let second = service.tasks_by_column();
    assert!(Rc::ptr_eq(&first, &second));

    let task = first[0].tasks[0].id;
    let from = first[0].column.id;
    let to = first[1].column.id;
    service.move_task_to_column(task, from, to, 0).unwrap();

    let third = service.tasks_by_column();
    assert!(!Rc::ptr_eq(&first, &third));
    assert_eq!(third[1].tasks[0].id, task);
    assert_eq!(first[0].tasks[0].id, task);
}
