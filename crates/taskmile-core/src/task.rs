use serde::Serialize;
use time::OffsetDateTime;

use crate::due_date::DueDate;
use crate::error::ValidationError;
use crate::id::{CategoryId, Owner, TaskId};
use crate::priority::Priority;

/// A single actionable item.
///
/// The description and the estimate are only reachable through accessors: a
/// task can be built by [`NewTask`], rebuilt by [`Task::restore`] or changed
/// by [`TaskPatch`], and each of those validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Identifier of the task.
    pub id: TaskId,
    /// User who created the task.
    pub owner: Owner,
    pub(crate) description: String,
    /// Urgency.
    pub priority: Priority,
    /// Day the task is due.
    pub due_date: DueDate,
    /// Completion flag.
    pub completed: bool,
    /// Optional category owned by the same user.
    pub category: Option<CategoryId>,
    /// Free-form notes (empty when absent).
    pub notes: String,
    pub(crate) estimated_minutes: i64,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Task fields read back from storage, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// Stored identifier.
    pub id: TaskId,
    /// Stored owner.
    pub owner: Owner,
    /// Raw description.
    pub description: String,
    /// Stored priority.
    pub priority: Priority,
    /// Stored due date.
    pub due_date: DueDate,
    /// Stored completion flag.
    pub completed: bool,
    /// Stored category reference.
    pub category: Option<CategoryId>,
    /// Stored notes.
    pub notes: String,
    /// Stored estimate.
    pub estimated_minutes: i64,
    /// Stored creation timestamp.
    pub created_at: OffsetDateTime,
}

impl Task {
    /// Rebuild a persisted task under the same rules as creation.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyDescription`] or
    /// [`ValidationError::NegativeEstimate`].
    pub fn restore(record: TaskRecord) -> Result<Self, ValidationError> {
        Ok(Self {
            id: record.id,
            owner: record.owner,
            description: validate_description(&record.description)?,
            priority: record.priority,
            due_date: record.due_date,
            completed: record.completed,
            category: record.category,
            notes: record.notes,
            estimated_minutes: validate_estimate(record.estimated_minutes)?,
            created_at: record.created_at,
        })
    }

    /// Trimmed, non-empty description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Estimated effort in minutes, never negative.
    #[must_use]
    pub const fn estimated_minutes(&self) -> i64 {
        self.estimated_minutes
    }

    /// Pending and past its due date.
    #[must_use]
    pub fn is_overdue(&self, today: DueDate) -> bool {
        !self.completed && self.due_date < today
    }
}

/// Validated payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub(crate) description: String,
    pub(crate) priority: Priority,
    pub(crate) due_date: DueDate,
    pub(crate) category: Option<CategoryId>,
    pub(crate) notes: String,
    pub(crate) estimated_minutes: i64,
}

impl NewTask {
    /// Validate the mandatory fields from user-facing strings.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] for an empty description, an unknown
    /// priority or a malformed due date.
    pub fn parse(description: &str, priority: &str, due_date: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(
            validate_description(description)?,
            Priority::parse(priority)?,
            DueDate::parse(due_date)?,
        ))
    }

    /// Build from already typed values; the description is checked when the
    /// task is added.
    #[must_use]
    pub fn new(description: impl Into<String>, priority: Priority, due_date: DueDate) -> Self {
        Self {
            description: description.into(),
            priority,
            due_date,
            category: None,
            notes: String::new(),
            estimated_minutes: 0,
        }
    }

    /// Assign a category.
    #[must_use]
    pub const fn with_category(mut self, category: Option<CategoryId>) -> Self {
        self.category = category;
        self
    }

    /// Attach notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Set the effort estimate; negative values are rejected when the task is added.
    #[must_use]
    pub const fn with_estimate(mut self, minutes: i64) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub(crate) fn into_task(self, owner: Owner) -> Result<Task, ValidationError> {
        Ok(Task {
            id: TaskId::new(),
            owner,
            description: validate_description(&self.description)?,
            priority: self.priority,
            due_date: self.due_date,
            completed: false,
            category: self.category,
            notes: self.notes.trim().to_owned(),
            estimated_minutes: validate_estimate(self.estimated_minutes)?,
            created_at: OffsetDateTime::now_utc(),
        })
    }
}

/// Partial update for an existing task; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New due date.
    pub due_date: Option<DueDate>,
    /// `Some(None)` clears the category.
    pub category: Option<Option<CategoryId>>,
    /// New notes; `Some("")` clears them.
    pub notes: Option<String>,
    /// New estimate.
    pub estimated_minutes: Option<i64>,
    /// Set the completion flag explicitly.
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.category.is_none()
            && self.notes.is_none()
            && self.estimated_minutes.is_none()
            && self.completed.is_none()
    }

    /// Produce the updated task without touching `current`.
    pub(crate) fn apply_to(&self, current: &Task) -> Result<Task, ValidationError> {
        let mut next = current.clone();
        if let Some(description) = &self.description {
            next.description = validate_description(description)?;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(notes) = &self.notes {
            notes.trim().clone_into(&mut next.notes);
        }
        if let Some(minutes) = self.estimated_minutes {
            next.estimated_minutes = validate_estimate(minutes)?;
        }
        if let Some(completed) = self.completed {
            next.completed = completed;
        }
        Ok(next)
    }
}

/// Trim a description and reject it when nothing is left.
///
/// # Errors
/// Returns [`ValidationError::EmptyDescription`].
pub fn validate_description(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(trimmed.to_owned())
}

const fn validate_estimate(minutes: i64) -> Result<i64, ValidationError> {
    if minutes < 0 {
        return Err(ValidationError::NegativeEstimate(minutes));
    }
    Ok(minutes)
}
