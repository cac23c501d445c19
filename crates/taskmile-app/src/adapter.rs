//! Persistence seam between the workspace and its backing store.

use std::sync::Arc;

use anyhow::Error;
use taskmile_core::{Owner, Workspace};
use taskmile_store_json::{JsonStore, JsonStoreError};
use taskmile_store_sqlite::{SqliteStore, SqliteStoreError};

/// Abstraction over the storage backend used by [`crate::TaskService`].
///
/// An adapter is bound to exactly one owner; `load` only ever returns that
/// owner's records and `save` only ever replaces them.
pub trait StoreAdapter {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Owner this adapter reads and writes for.
    fn owner(&self) -> &Owner;

    /// Read the owner's whole workspace.
    ///
    /// # Errors
    /// Returns a store-specific error when the backend cannot be read.
    fn load(&self) -> Result<Workspace, Self::Error>;

    /// Persist the owner's whole workspace.
    ///
    /// # Errors
    /// Returns a store-specific error when the write fails.
    fn save(&self, workspace: &Workspace) -> Result<(), Self::Error>;
}

impl StoreAdapter for JsonStore {
    type Error = JsonStoreError;

    fn owner(&self) -> &Owner {
        Self::owner(self)
    }

    fn load(&self) -> Result<Workspace, Self::Error> {
        Self::load(self)
    }

    fn save(&self, workspace: &Workspace) -> Result<(), Self::Error> {
        Self::save(self, workspace)
    }
}

impl StoreAdapter for SqliteStore {
    type Error = SqliteStoreError;

    fn owner(&self) -> &Owner {
        Self::owner(self)
    }

    fn load(&self) -> Result<Workspace, Self::Error> {
        Self::load(self)
    }

    fn save(&self, workspace: &Workspace) -> Result<(), Self::Error> {
        Self::save(self, workspace)
    }
}

impl<S> StoreAdapter for &S
where
    S: StoreAdapter + ?Sized,
{
    type Error = S::Error;

    fn owner(&self) -> &Owner {
        (*self).owner()
    }

    fn load(&self) -> Result<Workspace, Self::Error> {
        (*self).load()
    }

    fn save(&self, workspace: &Workspace) -> Result<(), Self::Error> {
        (*self).save(workspace)
    }
}

impl<S> StoreAdapter for Arc<S>
where
    S: StoreAdapter + ?Sized,
{
    type Error = S::Error;

    fn owner(&self) -> &Owner {
        (**self).owner()
    }

    fn load(&self) -> Result<Workspace, Self::Error> {
        (**self).load()
    }

    fn save(&self, workspace: &Workspace) -> Result<(), Self::Error> {
        (**self).save(workspace)
    }
}

/// Backend chosen at runtime from configuration.
pub enum ConfiguredStore {
    /// Single JSON document.
    Json(JsonStore),
    /// `SQLite` database shared by many owners.
    Sqlite(SqliteStore),
}

impl StoreAdapter for ConfiguredStore {
    type Error = Error;

    fn owner(&self) -> &Owner {
        match self {
            Self::Json(store) => store.owner(),
            Self::Sqlite(store) => store.owner(),
        }
    }

    fn load(&self) -> Result<Workspace, Self::Error> {
        match self {
            Self::Json(store) => Ok(store.load()?),
            Self::Sqlite(store) => Ok(store.load()?),
        }
    }

    fn save(&self, workspace: &Workspace) -> Result<(), Self::Error> {
        match self {
            Self::Json(store) => Ok(store.save(workspace)?),
            Self::Sqlite(store) => Ok(store.save(workspace)?),
        }
    }
}
