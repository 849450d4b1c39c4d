use serde_json::Value;
use std::rc::Rc;
use taskflow_core::persist::{
    BOARDS_KEY, COLUMNS_KEY, SELECTED_BOARD_KEY, SELECTED_TASK_KEY, TASKS_KEY,
};
use taskflow_core::{
    KanbanService, MemoryKvStore, PersistenceAdapter, StoreConfig, TaskDraft, TaskPriority,
};

#[test]
fn sqlite_file_reload_restores_collections_and_cursors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskflow.db");

    let (boards, columns, tasks, selected_task) = {
        let mut service = KanbanService::open_sqlite(&path, StoreConfig::default()).unwrap();
        service.seed_demo_board().unwrap();
        let first_task = service.tasks_by_column()[0].tasks[0].id;
        service.select_task(Some(first_task));
        (
            service.all_boards(),
            service.all_columns(),
            service.all_tasks(),
            first_task,
        )
    };

    let reopened = KanbanService::open_sqlite(&path, StoreConfig::default()).unwrap();
    assert_eq!(reopened.all_boards(), boards);
    assert_eq!(reopened.all_columns(), columns);
    assert_eq!(reopened.all_tasks(), tasks);
    assert_eq!(reopened.selected_board().map(|b| b.id), Some(boards[0].id));
    assert_eq!(reopened.selected_task().map(|t| t.id), Some(selected_task));
    assert!(reopened.check_integrity().is_empty());
}

#[test]
fn reload_is_idempotent_in_memory() {
    let backend = Rc::new(MemoryKvStore::new());
    let adapter = PersistenceAdapter::new(backend.clone());
    let mut service = KanbanService::new(adapter.clone(), StoreConfig::default());
    service.seed_demo_board().unwrap();
    let before = backend.snapshot();

    service.reload().unwrap();
    service.reload().unwrap();
    assert_eq!(backend.snapshot(), before);

    let second = KanbanService::new(adapter, StoreConfig::default());
    assert_eq!(second.all_tasks(), service.all_tasks());
    assert_eq!(second.tasks_by_column(), service.tasks_by_column());
}

#[test]
fn stored_records_use_camel_case_and_rfc3339() {
    let backend = Rc::new(MemoryKvStore::new());
    let mut service = KanbanService::new(
        PersistenceAdapter::new(backend.clone()),
        StoreConfig::default(),
    );
    let board = service.create_board("B1", None);
    let column = service.create_column(board.id, "Todo", None).unwrap();
    service
        .create_task(
            column.id,
            board.id,
            TaskDraft::new("T1").priority(TaskPriority::Urgent),
        )
        .unwrap();

    let entries = backend.snapshot();
    let boards: Value = serde_json::from_str(&entries[BOARDS_KEY]).unwrap();
    assert_eq!(boards[0]["columnOrder"][0], column.id.to_string());
    assert_eq!(boards[0]["ownerId"], "current-user");
    assert!(boards[0].get("description").is_none());
    let created_at = boards[0]["createdAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());

    let columns: Value = serde_json::from_str(&entries[COLUMNS_KEY]).unwrap();
    assert_eq!(columns[0]["boardId"], board.id.to_string());
    assert_eq!(columns[0]["taskIds"].as_array().unwrap().len(), 1);

    let tasks: Value = serde_json::from_str(&entries[TASKS_KEY]).unwrap();
    assert_eq!(tasks[0]["columnId"], column.id.to_string());
    assert_eq!(tasks[0]["priority"], "urgent");
    assert_eq!(tasks[0]["status"], "todo");
}

#[test]
fn clearing_a_cursor_removes_its_key() {
    let backend = Rc::new(MemoryKvStore::new());
    let mut service = KanbanService::new(
        PersistenceAdapter::new(backend.clone()),
        StoreConfig::default(),
    );
    let board = service.create_board("B1", None);

    service.select_board(Some(board.id));
    assert_eq!(
        backend.snapshot().get(SELECTED_BOARD_KEY),
        Some(&board.id.to_string())
    );

    service.select_board(None);
    assert!(!backend.snapshot().contains_key(SELECTED_BOARD_KEY));
    assert!(!backend.snapshot().contains_key(SELECTED_TASK_KEY));
}

#[test]
fn corrupt_payload_surfaces_as_load_error() {
    let backend = Rc::new(MemoryKvStore::new());
    taskflow_core::KvStore::set(backend.as_ref(), BOARDS_KEY, "{not json").unwrap();

    let service = KanbanService::new(PersistenceAdapter::new(backend), StoreConfig::default());
    assert!(service.all_boards().is_empty());
    let message = service.boards().error_message().unwrap();
    assert!(message.contains(BOARDS_KEY));
}

#[test]
fn unreadable_cursors_do_not_drop_collections() {
    let backend = Rc::new(MemoryKvStore::new());
    let adapter = PersistenceAdapter::new(backend.clone());
    let mut seeded = KanbanService::new(adapter.clone(), StoreConfig::default());
    seeded.seed_demo_board().unwrap();
    let boards = seeded.all_boards();
    let tasks = seeded.all_tasks();
    drop(seeded);
    taskflow_core::KvStore::set(backend.as_ref(), SELECTED_BOARD_KEY, "board-1").unwrap();
    taskflow_core::KvStore::set(backend.as_ref(), SELECTED_TASK_KEY, "task-1").unwrap();

    let mut service = KanbanService::new(adapter, StoreConfig::default());
    assert_eq!(service.all_boards(), boards);
    assert_eq!(service.all_tasks(), tasks);
    assert_eq!(service.selected_board(), None);
    assert_eq!(service.selected_task(), None);
    assert_eq!(service.tasks().error_message(), None);
    assert!(service
        .tasks()
        .persistence_error()
        .unwrap()
        .contains(SELECTED_TASK_KEY));

    let column = service.all_columns()[0].id;
    service
        .create_task(column, boards[0].id, TaskDraft::new("after"))
        .unwrap();
    let stored: Value = serde_json::from_str(&backend.snapshot()[TASKS_KEY]).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), tasks.len() + 1);
    assert!(service.check_integrity().is_empty());
}
