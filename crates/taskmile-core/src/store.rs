//! In-memory task and category stores scoped to a single owner.

use crate::category::{Category, Color, DEFAULT_CATEGORIES};
use crate::error::{TaskError, TaskResult, ValidationError};
use crate::filter::{TaskFilter, display_order};
use crate::id::{CategoryId, Owner, TaskId};
use crate::task::{NewTask, Task, TaskPatch};

/// Ordered task records; insertion order is kept for display ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Tasks in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of stored tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when no task is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Filtered tasks in display order (priority desc, due date asc).
    #[must_use]
    pub fn list(&self, filter: TaskFilter) -> Vec<&Task> {
        let mut selected: Vec<&Task> = self.tasks.iter().filter(|task| filter.matches(task)).collect();
        selected.sort_by(|a, b| display_order(a, b));
        selected
    }

    fn position(&self, owner: &Owner, id: TaskId) -> TaskResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id && task.owner == *owner)
            .ok_or_else(|| TaskError::task_not_found(id))
    }

    fn referencing(&self, category: CategoryId) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.category == Some(category))
            .count()
    }
}

/// Categories of one owner, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStore {
    categories: Vec<Category>,
}

impl CategoryStore {
    /// All categories.
    #[must_use]
    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    /// Number of categories.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns true when no category exists.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn position(&self, owner: &Owner, id: CategoryId) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category.id == id && category.owner == *owner)
    }
}

/// Everything one owner can see: tasks, categories and account state.
///
/// A workspace is an explicit value owned by its caller (a console session or a
/// request handler). Every operation either succeeds completely or returns an
/// error and leaves the workspace unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    owner: Owner,
    tasks: TaskStore,
    categories: CategoryStore,
    registered: bool,
}

impl Workspace {
    /// Empty workspace for `owner`.
    #[must_use]
    pub fn new(owner: Owner) -> Self {
        Self {
            owner,
            tasks: TaskStore::default(),
            categories: CategoryStore::default(),
            registered: false,
        }
    }

    /// Rebuild a workspace from persisted records.
    ///
    /// Records belonging to another owner are dropped, and category references
    /// that no longer resolve are cleared.
    #[must_use]
    pub fn from_parts(
        owner: Owner,
        tasks: Vec<Task>,
        categories: Vec<Category>,
        registered: bool,
    ) -> Self {
        let categories: Vec<Category> = categories
            .into_iter()
            .filter(|category| category.owner == owner)
            .collect();
        let tasks = tasks
            .into_iter()
            .filter(|task| task.owner == owner)
            .map(|mut task| {
                if let Some(category) = task.category
                    && !categories.iter().any(|c| c.id == category)
                {
                    task.category = None;
                }
                task
            })
            .collect();
        Self {
            owner,
            tasks: TaskStore { tasks },
            categories: CategoryStore { categories },
            registered,
        }
    }

    /// Owner of every record in this workspace.
    #[must_use]
    pub const fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Whether the account has been registered (default categories seeded).
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.registered
    }

    /// Task store.
    #[must_use]
    pub const fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Category store.
    #[must_use]
    pub const fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    /// Filtered tasks in display order.
    #[must_use]
    pub fn list(&self, filter: TaskFilter) -> Vec<&Task> {
        self.tasks.list(filter)
    }

    /// Look up a task by id.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown to this owner.
    pub fn task(&self, id: TaskId) -> TaskResult<&Task> {
        let index = self.tasks.position(&self.owner, id)?;
        Ok(&self.tasks.tasks[index])
    }

    /// Append a new pending task.
    ///
    /// # Errors
    /// Returns [`TaskError::Validation`] for an empty description, a negative
    /// estimate or a category this owner does not have.
    pub fn add_task(&mut self, new_task: NewTask) -> TaskResult<&Task> {
        if let Some(category) = new_task.category {
            self.ensure_category(category)?;
        }
        let task = new_task.into_task(self.owner.clone())?;
        self.tasks.tasks.push(task);
        let index = self.tasks.tasks.len() - 1;
        Ok(&self.tasks.tasks[index])
    }

    /// Flip the completion flag of a task.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown to this owner.
    pub fn toggle_complete(&mut self, id: TaskId) -> TaskResult<&Task> {
        let index = self.tasks.position(&self.owner, id)?;
        let task = &mut self.tasks.tasks[index];
        task.completed = !task.completed;
        Ok(task)
    }

    /// Delete a task and return it.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown to this owner.
    pub fn remove_task(&mut self, id: TaskId) -> TaskResult<Task> {
        let index = self.tasks.position(&self.owner, id)?;
        Ok(self.tasks.tasks.remove(index))
    }

    /// Apply a partial update after validating every supplied field.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] or [`TaskError::Validation`]; the task is
    /// unchanged in both cases.
    pub fn edit_task(&mut self, id: TaskId, patch: &TaskPatch) -> TaskResult<&Task> {
        let index = self.tasks.position(&self.owner, id)?;
        if let Some(Some(category)) = patch.category {
            self.ensure_category(category)?;
        }
        let updated = patch.apply_to(&self.tasks.tasks[index])?;
        self.tasks.tasks[index] = updated;
        Ok(&self.tasks.tasks[index])
    }

    /// Look up a category by id.
    ///
    /// # Errors
    /// Returns [`TaskError::NotFound`] when the id is unknown to this owner.
    pub fn category(&self, id: CategoryId) -> TaskResult<&Category> {
        self.categories
            .position(&self.owner, id)
            .map(|index| &self.categories.categories[index])
            .ok_or_else(|| TaskError::category_not_found(id))
    }

    /// Case-insensitive lookup by category name.
    #[must_use]
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        let needle = name.trim().to_lowercase();
        self.categories
            .categories
            .iter()
            .find(|category| category.name.to_lowercase() == needle)
    }

    /// Create a category.
    ///
    /// # Errors
    /// Returns [`TaskError::Validation`] when the name is blank or already
    /// taken by another category of this owner.
    pub fn add_category(&mut self, name: &str, color: Color) -> TaskResult<&Category> {
        let category = Category::new(self.owner.clone(), name, color)?;
        if self.category_by_name(&category.name).is_some() {
            return Err(ValidationError::DuplicateCategoryName(category.name).into());
        }
        self.categories.categories.push(category);
        let index = self.categories.categories.len() - 1;
        Ok(&self.categories.categories[index])
    }

    /// Delete a category that no task references.
    ///
    /// # Errors
    /// Returns [`TaskError::Conflict`] when tasks still reference it, or
    /// [`TaskError::NotFound`] when it does not exist.
    pub fn remove_category(&mut self, id: CategoryId) -> TaskResult<Category> {
        let index = self
            .categories
            .position(&self.owner, id)
            .ok_or_else(|| TaskError::category_not_found(id))?;
        let tasks = self.tasks.referencing(id);
        if tasks > 0 {
            return Err(TaskError::Conflict { category: id, tasks });
        }
        Ok(self.categories.categories.remove(index))
    }

    /// Seed the default categories the first time an account is registered.
    /// Names the owner already uses are skipped.
    ///
    /// Returns false when the account was already registered.
    pub fn seed_default_categories(&mut self) -> bool {
        if self.registered {
            return false;
        }
        for (name, color) in DEFAULT_CATEGORIES {
            if self.category_by_name(name).is_some() {
                continue;
            }
            let color = Color::parse(color).unwrap_or_default();
            let category = Category {
                id: CategoryId::new(),
                owner: self.owner.clone(),
                name: name.to_owned(),
                color,
            };
            self.categories.categories.push(category);
        }
        self.registered = true;
        true
    }

    fn ensure_category(&self, id: CategoryId) -> Result<(), ValidationError> {
        self.categories
            .position(&self.owner, id)
            .map(|_| ())
            .ok_or(ValidationError::UnknownCategory(id))
    }
}
