//! Board use-case services.
//!
//! # Responsibility
//! - Own the three entity stores and wire them together per call.
//! - Apply configuration-driven policies (cascading deletes) that no single
//!   store may perform on its own.

mod demo;
pub mod kanban_service;

pub use kanban_service::KanbanService;
