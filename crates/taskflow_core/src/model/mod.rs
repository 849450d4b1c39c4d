//! Board/column/task domain model.
//!
//! # Responsibility
//! - Define the three normalized entity records and their patch inputs.
//! - Keep wire naming (camelCase, ISO-8601 timestamps) next to the types.
//!
//! # Invariants
//! - Order lives on parents (`Board::column_order`, `Column::task_ids`);
//!   children only carry back-references.

pub mod board;
pub mod column;
pub mod task;
