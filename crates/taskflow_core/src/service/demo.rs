//! Demo board used by the CLI and by development builds.

use super::KanbanService;
use crate::model::board::BoardId;
use crate::model::task::{Label, TaskDraft, TaskPriority, TaskStatus};
use crate::store::StoreResult;
use log::info;

struct DemoTask {
    title: &'static str,
    description: &'static str,
    column: usize,
    priority: TaskPriority,
    status: TaskStatus,
    labels: &'static [(&'static str, &'static str)],
    checklist: &'static [(&'static str, bool)],
}

const DEMO_COLUMNS: [(&str, &str); 3] = [
    ("To Do", "#3b82f6"),
    ("In Progress", "#f59e0b"),
    ("Done", "#10b981"),
];

const DEMO_TASKS: [DemoTask; 6] = [
    DemoTask {
        title: "Design user interface",
        description: "Create wireframes and mockups for the new dashboard",
        column: 0,
        priority: TaskPriority::High,
        status: TaskStatus::Todo,
        labels: &[("Design", "#3b82f6"), ("UI/UX", "#8b5cf6")],
        checklist: &[("Create wireframes", false), ("Design mockups", false)],
    },
    DemoTask {
        title: "Set up development environment",
        description: "Install and configure all necessary development tools",
        column: 0,
        priority: TaskPriority::Medium,
        status: TaskStatus::Todo,
        labels: &[("Setup", "#10b981")],
        checklist: &[],
    },
    DemoTask {
        title: "Write API documentation",
        description: "Document all API endpoints and their usage",
        column: 0,
        priority: TaskPriority::Low,
        status: TaskStatus::Todo,
        labels: &[("Documentation", "#f59e0b")],
        checklist: &[],
    },
    DemoTask {
        title: "Implement authentication",
        description: "Build login and registration system",
        column: 1,
        priority: TaskPriority::High,
        status: TaskStatus::InProgress,
        labels: &[("Backend", "#ef4444"), ("Security", "#8b5cf6")],
        checklist: &[("Set up JWT tokens", true), ("Implement login endpoint", false)],
    },
    DemoTask {
        title: "Create database schema",
        description: "Design and implement the database structure",
        column: 1,
        priority: TaskPriority::Medium,
        status: TaskStatus::InProgress,
        labels: &[("Database", "#06b6d4")],
        checklist: &[],
    },
    DemoTask {
        title: "Project setup",
        description: "Initialize the project structure and basic configuration",
        column: 2,
        priority: TaskPriority::Medium,
        status: TaskStatus::Done,
        labels: &[("Setup", "#10b981")],
        checklist: &[
            ("Create project structure", true),
            ("Configure build tools", true),
        ],
    },
];

impl KanbanService {
    /// Creates and selects the "Project Alpha" demo board.
    ///
    /// Everything goes through the public operations, so the result satisfies
    /// the same order invariants as user-built boards.
    pub fn seed_demo_board(&mut self) -> StoreResult<BoardId> {
        let board = self.create_board(
            "Project Alpha",
            Some("Main development board for the new application".to_string()),
        );
        self.select_board(Some(board.id));

        let mut column_ids = Vec::with_capacity(DEMO_COLUMNS.len());
        for (title, color) in DEMO_COLUMNS {
            let column = self.create_column(board.id, title, Some(color.to_string()))?;
            column_ids.push(column.id);
        }

        for spec in &DEMO_TASKS {
            let draft = TaskDraft::new(spec.title)
                .description(spec.description)
                .priority(spec.priority)
                .status(spec.status);
            let task = self.create_task(column_ids[spec.column], board.id, draft)?;
            for (name, color) in spec.labels {
                self.add_label(task.id, Label::new(*name, *color))?;
            }
            for (text, done) in spec.checklist {
                let item = self.add_checklist_item(task.id, *text)?;
                if *done {
                    self.set_checklist_item_completed(task.id, item.id, true)?;
                }
            }
        }

        info!(
            "event=seed_demo module=service status=ok board_id={} columns={} tasks={}",
            board.id,
            column_ids.len(),
            DEMO_TASKS.len()
        );
        Ok(board.id)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::StoreConfig;
    use crate::service::KanbanService;

    #[test]
    fn demo_board_is_selected_and_consistent() {
        let mut service = KanbanService::in_memory(StoreConfig::default());
        let board_id = service.seed_demo_board().unwrap();

        assert_eq!(service.selected_board().map(|b| b.id), Some(board_id));
        let view = service.tasks_by_column();
        let titles: Vec<&str> = view.iter().map(|c| c.column.title.as_str()).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);
        let counts: Vec<usize> = view.iter().map(|c| c.tasks.len()).collect();
        assert_eq!(counts, vec![3, 2, 1]);
        assert!(service.check_integrity().is_empty());

        let done = &view[2].tasks[0];
        assert_eq!(done.checklist_progress(), (2, 2));
    }
}
