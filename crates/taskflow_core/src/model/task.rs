//! Task domain model.
//!
//! # Responsibility
//! - Define the task record with its priority/status vocabulary.
//! - Provide draft/patch inputs consumed by `TaskStore`.
//!
//! # Invariants
//! - `board_id` equals the board of the column referenced by `column_id`.
//! - `labels` holds at most one label per label id.
//! - `checklist` keeps insertion order.

use crate::model::board::BoardId;
use crate::model::column::ColumnId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Workflow status, independent of which column holds the task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Uuid,
    pub text: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            is_completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Back-reference to the column whose `task_ids` contains this id.
    pub column_id: ColumnId,
    /// Denormalized owning board.
    pub board_id: BoardId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl Task {
    /// Builds a task from a draft, placing it in `column_id` of `board_id`.
    pub fn from_draft(column_id: ColumnId, board_id: BoardId, draft: TaskDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            column_id,
            board_id,
            created_at: now,
            updated_at: now,
            due_date: draft.due_date,
            assignee_id: draft.assignee_id,
            priority: draft.priority,
            status: draft.status,
            labels: Vec::new(),
            checklist: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Returns `(completed, total)` checklist counts.
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self
            .checklist
            .iter()
            .filter(|item| item.is_completed)
            .count();
        (done, self.checklist.len())
    }

    /// Adds `label` unless a label with the same id is already present.
    ///
    /// Returns `false` when the label was already attached.
    pub fn insert_label(&mut self, label: Label) -> bool {
        if self.labels.iter().any(|existing| existing.id == label.id) {
            return false;
        }
        self.labels.push(label);
        true
    }
}

/// Creation input for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<String>,
}

impl TaskDraft {
    /// Draft with default priority `medium` and status `todo`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            due_date: None,
            assignee_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial field update for [`Task`].
///
/// A `column_id` different from the task's current column turns the update
/// into an implicit move handled by `TaskStore::update_task`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub column_id: Option<ColumnId>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub labels: Option<Vec<Label>>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assignee_id: Option<Option<String>>,
}

impl TaskPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn column(mut self, column_id: ColumnId) -> Self {
        self.column_id = Some(column_id);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn checklist(mut self, checklist: Vec<ChecklistItem>) -> Self {
        self.checklist = Some(checklist);
        self
    }

    pub fn labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn assignee(mut self, assignee_id: Option<String>) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Merges every field except `column_id` into `task`.
    ///
    /// Column placement is owned by the move protocol, so callers set
    /// `column_id`/`board_id` themselves after relocating the id.
    pub fn apply_fields_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(labels) = self.labels {
            task.labels.clear();
            for label in labels {
                task.insert_label(label);
            }
        }
        if let Some(checklist) = self.checklist {
            task.checklist = checklist;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        task.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::{ChecklistItem, Label, Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus};
    use uuid::Uuid;

    #[test]
    fn draft_defaults_to_medium_todo() {
        let task = Task::from_draft(Uuid::new_v4(), Uuid::new_v4(), TaskDraft::new("Write docs"));
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.labels.is_empty());
        assert!(task.checklist.is_empty());
    }

    #[test]
    fn status_and_priority_use_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&TaskPriority::Urgent).unwrap(),
            "\"urgent\""
        );
    }

    #[test]
    fn labels_behave_as_a_set() {
        let mut task = Task::from_draft(Uuid::new_v4(), Uuid::new_v4(), TaskDraft::new("Ship"));
        let label = Label::new("Backend", "#ef4444");
        assert!(task.insert_label(label.clone()));
        assert!(!task.insert_label(label.clone()));

        TaskPatch::default()
            .labels(vec![label.clone(), label])
            .apply_fields_to(&mut task);
        assert_eq!(task.labels.len(), 1);
    }

    #[test]
    fn patch_leaves_column_untouched() {
        let column_id = Uuid::new_v4();
        let mut task = Task::from_draft(column_id, Uuid::new_v4(), TaskDraft::new("Ship"));
        TaskPatch::default()
            .column(Uuid::new_v4())
            .status(TaskStatus::Review)
            .apply_fields_to(&mut task);
        assert_eq!(task.column_id, column_id);
        assert_eq!(task.status, TaskStatus::Review);
    }

    #[test]
    fn checklist_progress_counts_completed_items() {
        let mut task = Task::from_draft(Uuid::new_v4(), Uuid::new_v4(), TaskDraft::new("Ship"));
        let mut done = ChecklistItem::new("one");
        done.is_completed = true;
        task.checklist = vec![done, ChecklistItem::new("two")];
        assert_eq!(task.checklist_progress(), (1, 2));
    }
}
