//! Column domain model.
//!
//! # Invariants
//! - `task_ids` is the authoritative top-to-bottom order of tasks.
//! - `limit` is an advisory WIP cap and is never enforced as an error.

use crate::model::board::BoardId;
use crate::model::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a column.
pub type ColumnId = Uuid;

/// Canonical column record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// Owning board. Changes only through an explicit move.
    pub board_id: BoardId,
    pub task_ids: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Column {
    /// Creates a column with a generated id and no tasks.
    pub fn new(board_id: BoardId, title: impl Into<String>, color: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            board_id,
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            limit: None,
            color,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Returns whether the column holds more tasks than its advisory limit.
    pub fn is_over_limit(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.task_ids.len() > limit as usize)
    }
}

/// Partial field update for [`Column`].
///
/// `board_id` and `task_ids` are not patchable; they change only through the
/// move protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub limit: Option<Option<u32>>,
    pub color: Option<Option<String>>,
}

impl ColumnPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn limit(mut self, limit: Option<u32>) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn color(mut self, color: Option<String>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn apply_to(self, column: &mut Column) {
        if let Some(title) = self.title {
            column.title = title;
        }
        if let Some(limit) = self.limit {
            column.limit = limit;
        }
        if let Some(color) = self.color {
            column.color = color;
        }
        column.touch();
    }
}
