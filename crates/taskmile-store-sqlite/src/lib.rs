//! `SQLite` storage for taskmile: one row per task and category, scoped by owner.
//!
//! Many owners share one database file; a store instance only ever reads and
//! writes the rows of the owner it was opened for.

mod error;
pub mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use taskmile_core::{
    Category, CategoryId, Color, DueDate, Owner, Priority, Task, TaskId, TaskRecord, Workspace,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

pub use error::SqliteStoreError;

/// Storage based on a `SQLite` database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    owner: Owner,
}

struct TaskRow {
    id: String,
    description: String,
    priority: String,
    due_date: String,
    completed: bool,
    category_id: Option<String>,
    notes: String,
    estimated_minutes: i64,
    created_at: String,
}

struct CategoryRow {
    id: String,
    name: String,
    color: String,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` for `owner`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>, owner: Owner) -> Result<Self, SqliteStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SqliteStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), owner = %owner, "opened task database");
        Self::with_connection(conn, owner)
    }

    /// Private in-memory database, mostly for tests.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory(owner: Owner) -> Result<Self, SqliteStoreError> {
        Self::with_connection(Connection::open_in_memory()?, owner)
    }

    /// Wrap an existing connection, running migrations first.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn with_connection(conn: Connection, owner: Owner) -> Result<Self, SqliteStoreError> {
        schema::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            owner,
        })
    }

    /// Owner the store is bound to.
    #[must_use]
    pub const fn owner(&self) -> &Owner {
        &self.owner
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.conn.lock().map_err(|_| SqliteStoreError::LockError)
    }

    /// Load the owner's workspace.
    ///
    /// # Errors
    /// Returns an error on database failures or rows that break task invariants.
    pub fn load(&self) -> Result<Workspace, SqliteStoreError> {
        let conn = self.lock()?;
        let owner = self.owner.as_str();

        let registered = conn
            .query_row(
                "SELECT 1 FROM accounts WHERE owner = ?1",
                params![owner],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        let mut stmt = conn.prepare(
            "SELECT id, name, color FROM categories WHERE owner = ?1 ORDER BY position, rowid",
        )?;
        let category_rows = stmt
            .query_map(params![owner], |row| {
                Ok(CategoryRow {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    color: row.get("color")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, description, priority, due_date, completed, category_id, notes,
                    estimated_minutes, created_at
             FROM tasks WHERE owner = ?1 ORDER BY position, rowid",
        )?;
        let task_rows = stmt
            .query_map(params![owner], |row| {
                Ok(TaskRow {
                    id: row.get("id")?,
                    description: row.get("description")?,
                    priority: row.get("priority")?,
                    due_date: row.get("due_date")?,
                    completed: row.get("completed")?,
                    category_id: row.get("category_id")?,
                    notes: row.get("notes")?,
                    estimated_minutes: row.get("estimated_minutes")?,
                    created_at: row.get("created_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let categories = category_rows
            .into_iter()
            .map(|row| self.category_from_row(&row))
            .collect::<Result<Vec<_>, _>>()?;
        let tasks = task_rows
            .into_iter()
            .map(|row| self.task_from_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            owner,
            tasks = tasks.len(),
            categories = categories.len(),
            "loaded workspace from database"
        );
        Ok(Workspace::from_parts(self.owner.clone(), tasks, categories, registered))
    }

    /// Replace the owner's rows with the contents of `workspace` in one
    /// transaction. Rows of other owners are never touched.
    ///
    /// # Errors
    /// Returns an error if any statement fails; the transaction is rolled back.
    pub fn save(&self, workspace: &Workspace) -> Result<(), SqliteStoreError> {
        let mut conn = self.lock()?;
        let owner = self.owner.as_str();
        let tx = conn.transaction()?;

        if workspace.is_registered() {
            tx.execute(
                "INSERT OR IGNORE INTO accounts (owner) VALUES (?1)",
                params![owner],
            )?;
        }

        tx.execute("DELETE FROM tasks WHERE owner = ?1", params![owner])?;
        tx.execute("DELETE FROM categories WHERE owner = ?1", params![owner])?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO categories (id, owner, name, color, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, category) in workspace.categories().list().iter().enumerate() {
                insert.execute(params![
                    category.id.to_string(),
                    owner,
                    category.name,
                    category.color.as_str(),
                    position,
                ])?;
            }
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO tasks (id, owner, description, priority, due_date, completed,
                                    category_id, notes, estimated_minutes, created_at, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for (position, task) in workspace.tasks().as_slice().iter().enumerate() {
                let created_at = task
                    .created_at
                    .format(&Rfc3339)
                    .map_err(|err| SqliteStoreError::invalid_row("tasks", &task.id.to_string(), err))?;
                insert.execute(params![
                    task.id.to_string(),
                    owner,
                    task.description(),
                    task.priority.as_str(),
                    task.due_date.to_iso_string(),
                    task.completed,
                    task.category.map(|id| id.to_string()),
                    task.notes,
                    task.estimated_minutes(),
                    created_at,
                    position,
                ])?;
            }
        }

        tx.commit()?;
        debug!(owner, tasks = workspace.tasks().len(), "saved workspace to database");
        Ok(())
    }

    /// Owners that have registered an account, alphabetically.
    ///
    /// # Errors
    /// Returns an error on database failures.
    pub fn registered_owners(&self) -> Result<Vec<String>, SqliteStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT owner FROM accounts ORDER BY owner")?;
        let owners = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(owners)
    }

    fn task_from_row(&self, row: TaskRow) -> Result<Task, SqliteStoreError> {
        let invalid = |reason: String| SqliteStoreError::invalid_row("tasks", &row.id, reason);
        let id: TaskId = row.id.parse().map_err(|err| invalid(format!("{err}")))?;
        let priority = Priority::parse(&row.priority).map_err(|err| invalid(err.to_string()))?;
        let due_date = DueDate::parse(&row.due_date).map_err(|err| invalid(err.to_string()))?;
        let category = row
            .category_id
            .as_deref()
            .map(str::parse::<CategoryId>)
            .transpose()
            .map_err(|err| invalid(err.to_string()))?;
        let created_at = OffsetDateTime::parse(&row.created_at, &Rfc3339)
            .map_err(|err| invalid(err.to_string()))?;
        Task::restore(TaskRecord {
            id,
            owner: self.owner.clone(),
            description: row.description,
            priority,
            due_date,
            completed: row.completed,
            category,
            notes: row.notes,
            estimated_minutes: row.estimated_minutes,
            created_at,
        })
        .map_err(|err| invalid(err.to_string()))
    }

    fn category_from_row(&self, row: &CategoryRow) -> Result<Category, SqliteStoreError> {
        let invalid = |reason: String| SqliteStoreError::invalid_row("categories", &row.id, reason);
        let id: CategoryId = row.id.parse().map_err(|err| invalid(format!("{err}")))?;
        let color = Color::parse(&row.color).map_err(|err| invalid(err.to_string()))?;
        let mut category =
            Category::new(self.owner.clone(), &row.name, color).map_err(|err| invalid(err.to_string()))?;
        category.id = id;
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use taskmile_core::{NewTask, TaskError};

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(Owner::local()).unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn empty_database_loads_empty_workspace() -> Result<()> {
        let ws = store().load()?;
        assert!(ws.tasks().is_empty());
        assert!(!ws.is_registered());
        Ok(())
    }

    #[test]
    fn save_and_load_preserve_order_and_fields() -> Result<()> {
        let store = store();
        let mut ws = Workspace::new(Owner::local());
        let first = ws.add_task(NewTask::parse("first", "low", "05/05/2030")?.with_notes("n"))?.id;
        let _ = ws.add_task(NewTask::parse("second", "high", "01/05/2030")?.with_estimate(15))?;
        let _ = ws.toggle_complete(first)?;

        store.save(&ws)?;
        let loaded = store.load()?;

        assert_eq!(loaded.tasks().as_slice(), ws.tasks().as_slice());
        Ok(())
    }

    #[test]
    fn saving_twice_replaces_rows() -> Result<()> {
        let store = store();
        let mut ws = Workspace::new(Owner::local());
        let id = ws.add_task(NewTask::parse("gone soon", "low", "05/05/2030")?)?.id;
        store.save(&ws)?;

        let _ = ws.remove_task(id)?;
        store.save(&ws)?;

        let mut loaded = store.load()?;
        assert!(loaded.tasks().is_empty());
        assert!(matches!(loaded.toggle_complete(id), Err(TaskError::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn registration_is_recorded() -> Result<()> {
        let store = store();
        let mut ws = Workspace::new(Owner::local());
        let _ = ws.seed_default_categories();
        store.save(&ws)?;

        let loaded = store.load()?;
        assert!(loaded.is_registered());
        assert_eq!(loaded.categories().list(), ws.categories().list());
        assert_eq!(store.registered_owners()?, vec!["local".to_owned()]);
        Ok(())
    }
}
