use std::cmp::Ordering;
use std::fmt;

use crate::priority::Priority;
use crate::task::Task;

/// Named predicate applied when listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Pending,
    /// Completed tasks.
    Completed,
    /// Tasks with exactly this priority.
    Priority(Priority),
}

impl TaskFilter {
    /// Parse a filter token, falling back to [`TaskFilter::All`] for anything
    /// unrecognized (including an empty token).
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        Self::parse_strict(raw).unwrap_or_default()
    }

    /// Parse a filter token, returning `None` when it is not recognized.
    #[must_use]
    pub fn parse_strict(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "all" | "todas" => Some(Self::All),
            "pending" | "pendentes" => Some(Self::Pending),
            "completed" | "done" | "concluidas" | "concluídas" => Some(Self::Completed),
            other => Priority::parse(other).ok().map(Self::Priority),
        }
    }

    /// Returns true when the task passes the filter.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Priority(priority) => task.priority == priority,
        }
    }

    /// Returns true for [`TaskFilter::All`].
    #[must_use]
    pub const fn is_all(self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
            Self::Priority(priority) => write!(f, "priority={priority}"),
        }
    }
}

/// Display ordering: priority descending, then due date ascending.
///
/// Ties keep insertion order when used with a stable sort.
#[must_use]
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| a.due_date.cmp(&b.due_date))
}
