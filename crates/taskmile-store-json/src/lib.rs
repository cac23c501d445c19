//! JSON document storage for taskmile.
//!
//! A store reads and writes one owner's workspace inside a shared document;
//! records of other owners in the same file are carried through every save.
//! Loading never fails on a corrupt document: the problem is logged and an
//! empty workspace is returned instead.

pub mod document;
mod error;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use taskmile_core::{Owner, Workspace};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub use document::{ForeignRecords, ParsedDocument, parse_document, render_document};
pub use error::JsonStoreError;

/// Default document name used by the console.
pub const DEFAULT_FILE_NAME: &str = "tarefas.json";

/// Storage backed by a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    owner: Owner,
}

impl JsonStore {
    /// Bind a store to `path` for `owner`. The file is not touched until the
    /// first load or save.
    pub fn open(path: impl Into<PathBuf>, owner: Owner) -> Self {
        Self {
            path: path.into(),
            owner,
        }
    }

    /// Location of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Owner the store is bound to.
    #[must_use]
    pub const fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Read the workspace.
    ///
    /// A missing or blank file yields an empty workspace, and so does a corrupt
    /// one (after a warning).
    ///
    /// # Errors
    /// Returns [`JsonStoreError::Io`] when the file exists but cannot be read.
    pub fn load(&self) -> Result<Workspace, JsonStoreError> {
        let Some(contents) = self.read()? else {
            return Ok(self.empty());
        };

        match parse_document(&contents, &self.owner) {
            Ok(parsed) => {
                debug!(
                    path = %self.path.display(),
                    tasks = parsed.workspace.tasks().len(),
                    categories = parsed.workspace.categories().len(),
                    other_owners_tasks = parsed.foreign.task_count(),
                    "loaded task document"
                );
                Ok(parsed.workspace)
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "task document is corrupt; starting empty");
                Ok(self.empty())
            }
        }
    }

    /// Write the owner's workspace, replacing their previous records. Records
    /// of other owners already in the document are written back unchanged.
    ///
    /// The document is written to a temporary file in the same directory and
    /// then moved over the target; on failure the temporary file is removed.
    ///
    /// # Errors
    /// Returns [`JsonStoreError`] when the existing document cannot be read,
    /// or when serialization or any file operation fails.
    pub fn save(&self, workspace: &Workspace) -> Result<(), JsonStoreError> {
        let foreign = self.foreign_records()?;
        let rendered = render_document(workspace, &foreign)?;

        write_atomically(&self.path, &rendered)?;

        debug!(
            path = %self.path.display(),
            tasks = workspace.tasks().len(),
            other_owners_tasks = foreign.task_count(),
            "saved task document"
        );
        Ok(())
    }

    /// Contents of the document, or `None` when it is missing or blank.
    fn read(&self) -> Result<Option<String>, JsonStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task document not found");
                Ok(None)
            }
            Err(err) => Err(JsonStoreError::io(&self.path, err)),
        }
    }

    /// Records of other owners in the current document. A corrupt document
    /// has none worth keeping.
    fn foreign_records(&self) -> Result<ForeignRecords, JsonStoreError> {
        let Some(contents) = self.read()? else {
            return Ok(ForeignRecords::default());
        };
        match parse_document(&contents, &self.owner) {
            Ok(parsed) => Ok(parsed.foreign),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "overwriting corrupt task document");
                Ok(ForeignRecords::default())
            }
        }
    }

    fn empty(&self) -> Workspace {
        Workspace::new(self.owner.clone())
    }
}

/// Write `contents` to a temporary file next to `path`, then move it over
/// `path`. The temporary file never outlives a failure.
fn write_atomically(path: &Path, contents: &str) -> Result<(), JsonStoreError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|err| JsonStoreError::io(parent, err))?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| JsonStoreError::io(dir, err))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|err| JsonStoreError::io(tmp.path(), err))?;
    tmp.persist(path).map_err(|err| JsonStoreError::io(path, err.error))?;
    Ok(())
}
