//! Error taxonomy for task and category operations.

use std::fmt;

use thiserror::Error;

use crate::id::{CategoryId, InvalidOwner, TaskId};

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,
    /// Priority token is not one of high/medium/low.
    #[error("invalid priority '{0}' (expected high, medium or low)")]
    InvalidPriority(String),
    /// Due date could not be parsed.
    #[error("invalid due date '{0}' (expected DD/MM/YYYY)")]
    InvalidDate(String),
    /// Estimated minutes below zero.
    #[error("estimated minutes must not be negative (got {0})")]
    NegativeEstimate(i64),
    /// Category does not exist for this owner.
    #[error("category {0} does not exist")]
    UnknownCategory(CategoryId),
    /// Category name is empty after trimming.
    #[error("category name must not be empty")]
    EmptyCategoryName,
    /// Owner already has a category with this name (compared case-insensitively).
    #[error("category '{0}' already exists")]
    DuplicateCategoryName(String),
    /// Color is not a `#rrggbb` value.
    #[error("invalid color '{0}' (expected #rrggbb)")]
    InvalidColor(String),
    /// Owner name is blank.
    #[error(transparent)]
    InvalidOwner(#[from] InvalidOwner),
}

/// Kind of record targeted by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A task.
    Task,
    /// A category.
    Category,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Task => "task",
            Self::Category => "category",
        })
    }
}

/// Errors raised by [`Workspace`](crate::store::Workspace) operations.
///
/// Every variant is recoverable: the operation is rejected and the workspace is
/// left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Bad input shape.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Target record does not exist for this owner.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of the missing record.
        kind: RecordKind,
        /// Identifier that was looked up.
        id: String,
    },
    /// Category still referenced by tasks.
    #[error("category {category} is used by {tasks} task(s) and cannot be deleted")]
    Conflict {
        /// Category whose deletion was refused.
        category: CategoryId,
        /// Number of tasks referencing it.
        tasks: usize,
    },
}

impl TaskError {
    pub(crate) fn task_not_found(id: TaskId) -> Self {
        Self::NotFound {
            kind: RecordKind::Task,
            id: id.to_string(),
        }
    }

    pub(crate) fn category_not_found(id: CategoryId) -> Self {
        Self::NotFound {
            kind: RecordKind::Category,
            id: id.to_string(),
        }
    }

    /// Presentation layers may report these errors and keep going.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Conflict { .. }
        )
    }
}

/// Result alias for workspace operations.
pub type TaskResult<T> = Result<T, TaskError>;
