//! Turning raw user text into workspace requests.
//!
//! Shared by the CLI subcommands and the numbered console menu.

use std::str::FromStr;

use taskmile_core::{
    CategoryId, DueDate, NewTask, Priority, Task, TaskId, TaskPatch, ValidationError, Workspace,
};
use thiserror::Error;

/// Problems with user-supplied text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// A field failed task validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Neither a listed position nor a task id.
    #[error("'{input}' is not a task number between 1 and {len}")]
    InvalidIndex {
        /// What the user typed.
        input: String,
        /// Number of tasks on screen.
        len: usize,
    },

    /// Expected a whole number.
    #[error("'{0}' is not a whole number")]
    InvalidNumber(String),

    /// No category has that name or id.
    #[error("no category named '{0}'")]
    UnknownCategory(String),

    /// Not one of the menu options.
    #[error("invalid option '{0}': choose 1-5")]
    InvalidChoice(String),
}

/// Raw fields for a new task.
#[derive(Debug, Clone, Default)]
pub struct NewTaskInput {
    /// Task text.
    pub description: String,
    /// Priority token; `medium` when blank.
    pub priority: String,
    /// `DD/MM/YYYY` or `YYYY-MM-DD`; today when blank.
    pub due_date: String,
    /// Category name or id.
    pub category: Option<String>,
    /// Free text.
    pub notes: Option<String>,
    /// Whole minutes.
    pub estimated_minutes: Option<String>,
}

impl NewTaskInput {
    /// Validate the text fields and build a [`NewTask`].
    ///
    /// # Errors
    /// Returns [`InputError`] for unparsable priorities, dates, numbers or
    /// category names.
    pub fn into_new_task(self, workspace: &Workspace) -> Result<NewTask, InputError> {
        let priority = parse_priority_or_default(&self.priority)?;
        let due_date = if self.due_date.trim().is_empty() {
            DueDate::today()
        } else {
            DueDate::parse(&self.due_date)?
        };
        let category = non_blank(self.category.as_deref())
            .map(|token| resolve_category(workspace, token))
            .transpose()?;
        let estimate = non_blank(self.estimated_minutes.as_deref())
            .map(parse_minutes)
            .transpose()?
            .unwrap_or(0);

        Ok(NewTask::new(self.description, priority, due_date)
            .with_category(category)
            .with_notes(self.notes.unwrap_or_default())
            .with_estimate(estimate))
    }
}

/// Raw fields for an edit. `None` or blank leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskEditInput {
    /// New text.
    pub description: Option<String>,
    /// New priority token.
    pub priority: Option<String>,
    /// New due date.
    pub due_date: Option<String>,
    /// New category name or id.
    pub category: Option<String>,
    /// Drop the category reference.
    pub clear_category: bool,
    /// New notes; an empty string clears them.
    pub notes: Option<String>,
    /// New estimate in minutes.
    pub estimated_minutes: Option<String>,
    /// New completion flag.
    pub completed: Option<bool>,
}

impl TaskEditInput {
    /// Build a [`TaskPatch`].
    ///
    /// # Errors
    /// Returns [`InputError`] for unparsable values.
    pub fn into_patch(self, workspace: &Workspace) -> Result<TaskPatch, InputError> {
        let category = if self.clear_category {
            Some(None)
        } else {
            non_blank(self.category.as_deref())
                .map(|token| resolve_category(workspace, token).map(Some))
                .transpose()?
        };

        Ok(TaskPatch {
            description: self.description,
            priority: non_blank(self.priority.as_deref())
                .map(Priority::parse)
                .transpose()?,
            due_date: non_blank(self.due_date.as_deref())
                .map(DueDate::parse)
                .transpose()?,
            category,
            notes: self.notes,
            estimated_minutes: non_blank(self.estimated_minutes.as_deref())
                .map(parse_minutes)
                .transpose()?,
            completed: self.completed,
        })
    }
}

/// Resolve a 1-based position in `listed`, or a literal task id.
///
/// # Errors
/// Returns [`InputError::InvalidIndex`] when the token matches neither.
pub fn resolve_task(listed: &[&Task], token: &str) -> Result<TaskId, InputError> {
    let token = token.trim();
    if let Ok(position) = token.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| listed.get(index))
            .map(|task| task.id)
            .ok_or_else(|| invalid_index(token, listed.len()));
    }
    token
        .parse::<TaskId>()
        .map_err(|_| invalid_index(token, listed.len()))
}

fn invalid_index(token: &str, len: usize) -> InputError {
    InputError::InvalidIndex {
        input: token.to_owned(),
        len,
    }
}

/// Priority token, defaulting to medium when blank.
///
/// # Errors
/// Returns the validation error for unknown tokens.
pub fn parse_priority_or_default(raw: &str) -> Result<Priority, InputError> {
    if raw.trim().is_empty() {
        Ok(Priority::default())
    } else {
        Ok(Priority::parse(raw)?)
    }
}

fn parse_minutes(raw: &str) -> Result<i64, InputError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| InputError::InvalidNumber(raw.trim().to_owned()))
}

fn resolve_category(workspace: &Workspace, token: &str) -> Result<CategoryId, InputError> {
    if let Some(category) = workspace.category_by_name(token) {
        return Ok(category.id);
    }
    token
        .parse::<CategoryId>()
        .ok()
        .filter(|id| workspace.category(*id).is_ok())
        .ok_or_else(|| InputError::UnknownCategory(token.trim().to_owned()))
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

/// Options of the numbered console menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 1. add a task
    Add,
    /// 2. list tasks
    List,
    /// 3. toggle completion
    Toggle,
    /// 4. remove a task
    Remove,
    /// 5. save and exit
    Exit,
}

impl MenuChoice {
    /// Every option in menu order.
    pub const ALL: [Self; 5] = [Self::Add, Self::List, Self::Toggle, Self::Remove, Self::Exit];

    /// Number printed next to the option.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Add => 1,
            Self::List => 2,
            Self::Toggle => 3,
            Self::Remove => 4,
            Self::Exit => 5,
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "Add task",
            Self::List => "List tasks",
            Self::Toggle => "Mark task as done / pending",
            Self::Remove => "Remove task",
            Self::Exit => "Save and exit",
        }
    }
}

impl FromStr for MenuChoice {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::ALL.into_iter().find(|choice| choice.number() == n))
            .ok_or_else(|| InputError::InvalidChoice(trimmed.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmile_core::{Color, Owner, TaskFilter};

    fn workspace() -> Workspace {
        let mut ws = Workspace::new(Owner::local());
        ws.seed_default_categories();
        ws
    }

    #[test]
    fn new_task_defaults_blank_fields() -> Result<(), Box<dyn std::error::Error>> {
        let mut ws = workspace();
        let input = NewTaskInput {
            description: "Water plants".into(),
            ..NewTaskInput::default()
        };
        let task = ws.add_task(input.into_new_task(&ws)?)?;
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, DueDate::today());
        assert_eq!(task.estimated_minutes(), 0);
        assert!(task.category.is_none());
        Ok(())
    }

    #[test]
    fn new_task_resolves_category_by_name() -> Result<(), Box<dyn std::error::Error>> {
        let mut ws = workspace();
        let work = ws.category_by_name("Work").map(|category| category.id);
        let input = NewTaskInput {
            description: "Report".into(),
            priority: "alta".into(),
            due_date: "15/03/2030".into(),
            category: Some("work".into()),
            notes: Some("q1".into()),
            estimated_minutes: Some(" 30 ".into()),
        };
        let task = ws.add_task(input.into_new_task(&ws)?)?;
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.estimated_minutes(), 30);
        assert_eq!(task.notes, "q1");
        assert_eq!(task.category, work);
        Ok(())
    }

    #[test]
    fn bad_fields_are_reported() {
        let ws = workspace();
        let bad_date = NewTaskInput {
            description: "x".into(),
            due_date: "31/02/2030".into(),
            ..NewTaskInput::default()
        };
        assert!(matches!(
            bad_date.into_new_task(&ws),
            Err(InputError::Validation(ValidationError::InvalidDate(_)))
        ));

        let bad_category = NewTaskInput {
            description: "x".into(),
            category: Some("Garden".into()),
            ..NewTaskInput::default()
        };
        assert_eq!(
            bad_category.into_new_task(&ws).err(),
            Some(InputError::UnknownCategory("Garden".into()))
        );

        let bad_minutes = NewTaskInput {
            description: "x".into(),
            estimated_minutes: Some("ten".into()),
            ..NewTaskInput::default()
        };
        assert_eq!(
            bad_minutes.into_new_task(&ws).err(),
            Some(InputError::InvalidNumber("ten".into()))
        );
    }

    #[test]
    fn edit_input_builds_sparse_patch() -> Result<(), InputError> {
        let mut ws = workspace();
        let garden = ws
            .add_category("Garden", Color::default())
            .map(|category| category.id)
            .unwrap_or_else(|err| panic!("{err}"));

        let patch = TaskEditInput {
            priority: Some("baixa".into()),
            category: Some(garden.to_string()),
            due_date: Some(String::new()),
            ..TaskEditInput::default()
        }
        .into_patch(&ws)?;
        assert_eq!(patch.priority, Some(Priority::Low));
        assert_eq!(patch.category, Some(Some(garden)));
        assert!(patch.due_date.is_none());
        assert!(patch.description.is_none());

        let clear = TaskEditInput {
            clear_category: true,
            ..TaskEditInput::default()
        }
        .into_patch(&ws)?;
        assert_eq!(clear.category, Some(None));
        Ok(())
    }

    #[test]
    fn resolve_task_by_position_or_id() -> Result<(), Box<dyn std::error::Error>> {
        let mut ws = workspace();
        let low = ws.add_task(NewTask::parse("low", "low", "01/01/2030")?)?.id;
        let high = ws.add_task(NewTask::parse("high", "high", "01/01/2030")?)?.id;
        let listed = ws.list(TaskFilter::All);

        assert_eq!(resolve_task(&listed, "1")?, high);
        assert_eq!(resolve_task(&listed, " 2 ")?, low);
        assert_eq!(resolve_task(&listed, &low.to_string())?, low);
        for bad in ["0", "3", "abc", ""] {
            assert!(matches!(
                resolve_task(&listed, bad),
                Err(InputError::InvalidIndex { len: 2, .. })
            ));
        }
        Ok(())
    }

    #[test]
    fn menu_choices() {
        assert_eq!("1".parse(), Ok(MenuChoice::Add));
        assert_eq!(" 5\n".parse(), Ok(MenuChoice::Exit));
        assert_eq!(
            "6".parse::<MenuChoice>(),
            Err(InputError::InvalidChoice("6".into()))
        );
        assert!("add".parse::<MenuChoice>().is_err());
    }
}
