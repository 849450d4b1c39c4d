//! Board domain model.
//!
//! # Responsibility
//! - Define the top-level board record and its column order-array.
//! - Provide partial-update and summary projections used by `BoardStore`.
//!
//! # Invariants
//! - `id` is stable and never reused for another board.
//! - Every id in `column_order` references a column whose `board_id` is this
//!   board's id, and appears at most once.

use crate::model::column::ColumnId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a board.
pub type BoardId = Uuid;

/// Owner recorded on boards created without an authenticated user.
pub const DEFAULT_OWNER_ID: &str = "current-user";

/// Canonical board record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_id: String,
    pub is_archived: bool,
    /// Authoritative left-to-right order of this board's columns.
    pub column_order: Vec<ColumnId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates a board with a generated id and an empty column order.
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            owner_id: DEFAULT_OWNER_ID.to_string(),
            is_archived: false,
            column_order: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial field update for [`Board`].
///
/// `None` leaves a field untouched. For optional fields, `Some(None)` clears
/// the value. `column_order` is not patchable; order changes go through
/// `BoardStore::update_column_order`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub owner_id: Option<String>,
    pub is_archived: Option<bool>,
}

impl BoardPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn archived(mut self, is_archived: bool) -> Self {
        self.is_archived = Some(is_archived);
        self
    }

    /// Merges all set fields into `board` and refreshes `updated_at`.
    pub fn apply_to(self, board: &mut Board) {
        if let Some(title) = self.title {
            board.title = title;
        }
        if let Some(description) = self.description {
            board.description = description;
        }
        if let Some(owner_id) = self.owner_id {
            board.owner_id = owner_id;
        }
        if let Some(is_archived) = self.is_archived {
            board.is_archived = is_archived;
        }
        board.touch();
    }
}

/// Lightweight projection used by board lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSummary {
    pub id: BoardId,
    pub title: String,
    pub description: Option<String>,
    pub column_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Board> for BoardSummary {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id,
            title: board.title.clone(),
            description: board.description.clone(),
            column_count: board.column_order.len(),
            updated_at: board.updated_at,
        }
    }
}
