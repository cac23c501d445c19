//! Domain types and store rules for taskmile.
//!
//! Everything here is pure: no file system, no database. Persistence adapters
//! load a [`Workspace`] and hand it back for saving.

/// Category records and colors.
pub mod category;
/// Calendar due dates.
pub mod due_date;
/// Error taxonomy.
pub mod error;
/// Listing filters and display ordering.
pub mod filter;
/// Identifier types.
pub mod id;
/// Task priorities.
pub mod priority;
/// Task and category stores.
pub mod store;
/// Task records, creation payloads and patches.
pub mod task;

pub use category::{Category, Color, DEFAULT_CATEGORIES};
pub use due_date::DueDate;
pub use error::{RecordKind, TaskError, TaskResult, ValidationError};
pub use filter::{TaskFilter, display_order};
pub use id::{CategoryId, InvalidOwner, Owner, TaskId};
pub use priority::Priority;
pub use store::{CategoryStore, TaskStore, Workspace};
pub use task::{NewTask, Task, TaskPatch, TaskRecord, validate_description};
