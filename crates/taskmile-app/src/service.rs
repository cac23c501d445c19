use taskmile_core::{
    Category, CategoryId, Color, NewTask, Owner, Task, TaskError, TaskFilter, TaskId, TaskPatch,
    Workspace,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::adapter::StoreAdapter;

/// Errors surfaced by [`TaskService`] and [`ConsoleSession`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested operation was rejected by the workspace.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// The backing store could not be read or written.
    #[error("storage failure: {0:#}")]
    Persistence(#[source] anyhow::Error),

    /// `register_account` was called for an owner that already has an account.
    #[error("account '{0}' is already registered")]
    AlreadyRegistered(Owner),
}

impl ServiceError {
    fn persistence(err: impl Into<anyhow::Error>) -> Self {
        Self::Persistence(err.into())
    }

    /// True when the failure came from the storage layer.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service façade that runs every operation as load → apply → save.
///
/// Nothing is written when the workspace rejects an operation.
pub struct TaskService<A> {
    adapter: A,
}

impl<A> TaskService<A> {
    /// Wrap an adapter.
    pub const fn new(adapter: A) -> Self {
        Self { adapter }
    }

    /// Borrow the underlying adapter.
    pub const fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A: StoreAdapter> TaskService<A> {
    /// Load a snapshot of the owner's workspace.
    ///
    /// # Errors
    /// Returns [`ServiceError::Persistence`] when the store cannot be read.
    pub fn workspace(&self) -> ServiceResult<Workspace> {
        self.adapter.load().map_err(ServiceError::persistence)
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Workspace) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut workspace = self.workspace()?;
        let output = op(&mut workspace)?;
        self.adapter
            .save(&workspace)
            .map_err(ServiceError::persistence)?;
        Ok(output)
    }

    /// Create a task.
    ///
    /// # Errors
    /// Returns a validation error or a persistence failure.
    pub fn add_task(&self, new_task: NewTask) -> ServiceResult<Task> {
        let task = self.mutate(|ws| Ok(ws.add_task(new_task)?.clone()))?;
        info!(task = %task.id, owner = %task.owner, "task created");
        Ok(task)
    }

    /// Flip the completion flag of a task.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids or a persistence failure.
    pub fn toggle_complete(&self, id: TaskId) -> ServiceResult<Task> {
        let task = self.mutate(|ws| Ok(ws.toggle_complete(id)?.clone()))?;
        debug!(task = %id, completed = task.completed, "task toggled");
        Ok(task)
    }

    /// Delete a task.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids or a persistence failure.
    pub fn remove_task(&self, id: TaskId) -> ServiceResult<Task> {
        let task = self.mutate(|ws| Ok(ws.remove_task(id)?))?;
        info!(task = %id, "task removed");
        Ok(task)
    }

    /// Apply a partial update to a task.
    ///
    /// # Errors
    /// Returns `NotFound`, a validation error or a persistence failure.
    pub fn edit_task(&self, id: TaskId, patch: &TaskPatch) -> ServiceResult<Task> {
        if patch.is_empty() {
            return Ok(self.workspace()?.task(id)?.clone());
        }
        let task = self.mutate(|ws| Ok(ws.edit_task(id, patch)?.clone()))?;
        debug!(task = %id, "task edited");
        Ok(task)
    }

    /// Tasks matching `filter`, in display order.
    ///
    /// # Errors
    /// Returns a persistence failure.
    pub fn list_tasks(&self, filter: TaskFilter) -> ServiceResult<Vec<Task>> {
        let workspace = self.workspace()?;
        Ok(workspace.list(filter).into_iter().cloned().collect())
    }

    /// Create a category.
    ///
    /// # Errors
    /// Returns a validation error or a persistence failure.
    pub fn add_category(&self, name: &str, color: Color) -> ServiceResult<Category> {
        self.mutate(|ws| Ok(ws.add_category(name, color)?.clone()))
    }

    /// Delete a category no task references.
    ///
    /// # Errors
    /// Returns `Conflict` when tasks still reference it, `NotFound`, or a
    /// persistence failure.
    pub fn remove_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.mutate(|ws| Ok(ws.remove_category(id)?))
    }

    /// All categories of the owner.
    ///
    /// # Errors
    /// Returns a persistence failure.
    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.workspace()?.categories().list().to_vec())
    }

    /// Register the owner's account and seed the default categories.
    ///
    /// # Errors
    /// Returns [`ServiceError::AlreadyRegistered`] on a second call.
    pub fn register_account(&self) -> ServiceResult<Vec<Category>> {
        let owner = self.adapter.owner().clone();
        let categories = self.mutate(|ws| {
            if !ws.seed_default_categories() {
                return Err(ServiceError::AlreadyRegistered(owner.clone()));
            }
            Ok(ws.categories().list().to_vec())
        })?;
        info!(owner = %owner, categories = categories.len(), "account registered");
        Ok(categories)
    }
}

/// In-memory session for the console menu.
///
/// The workspace is loaded once; an unreadable store degrades to an empty
/// workspace. Changes are only written by [`ConsoleSession::save`].
pub struct ConsoleSession<A> {
    adapter: A,
    workspace: Workspace,
}

impl<A: StoreAdapter> ConsoleSession<A> {
    /// Load the workspace, falling back to an empty one on failure.
    pub fn open(adapter: A) -> Self {
        let workspace = match adapter.load() {
            Ok(workspace) => workspace,
            Err(err) => {
                let err: anyhow::Error = err.into();
                warn!(error = %format!("{err:#}"), "could not load tasks; starting empty");
                Workspace::new(adapter.owner().clone())
            }
        };
        Self { adapter, workspace }
    }

    /// Current in-memory workspace.
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Mutable access for menu operations.
    pub const fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Write the workspace back to the store.
    ///
    /// # Errors
    /// Returns [`ServiceError::Persistence`] when the write fails.
    pub fn save(&self) -> ServiceResult<()> {
        self.adapter
            .save(&self.workspace)
            .map_err(ServiceError::persistence)?;
        debug!(tasks = self.workspace.tasks().len(), "session saved");
        Ok(())
    }
}
