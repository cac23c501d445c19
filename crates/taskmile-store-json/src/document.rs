//! On-disk layouts of the task document.
//!
//! Two layouts are read:
//! - a bare array of task entries, as written by the single-user console;
//!   entries may be plain strings from the earliest files, where a leading
//!   check mark meant "completed";
//! - an object carrying the owner, account flags, categories and tasks.
//!
//! Keys are accepted in English or in the Portuguese spelling of older files.
//! A document may hold records of several owners. Records that name another
//! owner are kept aside as raw JSON and written back untouched.
//!
//! Optional fields never make a document unreadable: a value that cannot be
//! understood is logged and replaced by its default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use taskmile_core::{
    Category, CategoryId, Color, DueDate, Owner, Priority, Task, TaskId, TaskRecord,
    ValidationError, Workspace,
};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::warn;

use crate::error::JsonStoreError;

const DONE_MARK: char = '✅';

/// Timestamps without an offset, as written by older tools; read as UTC.
const NAIVE_TIMESTAMP: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    List(Vec<Value>),
    Full(FullDocument),
}

#[derive(Debug, Serialize, Deserialize)]
struct FullDocument {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    owner: Option<Owner>,
    #[serde(default)]
    registered: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    accounts: Vec<Owner>,
    #[serde(default, alias = "categorias")]
    categories: Vec<Value>,
    #[serde(default, alias = "tarefas")]
    tasks: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Text(String),
    Record(StoredTask),
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTask {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    owner: Option<Owner>,
    #[serde(alias = "descricao")]
    description: String,
    #[serde(default, alias = "prioridade")]
    priority: Priority,
    #[serde(alias = "data", alias = "data_vencimento")]
    due_date: DueDate,
    #[serde(default, alias = "concluida")]
    completed: bool,
    #[serde(default, alias = "categoria", skip_serializing_if = "Option::is_none")]
    category: Option<CategoryRef>,
    #[serde(default, alias = "notas", skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, alias = "tempo_estimado", deserialize_with = "lenient_minutes")]
    estimated_minutes: i64,
    #[serde(
        default,
        alias = "data_criacao",
        deserialize_with = "lenient_timestamp",
        serialize_with = "time::serde::rfc3339::option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    created_at: Option<OffsetDateTime>,
}

/// A task's category: an id, or whatever older files stored there (a name, a
/// numeric key).
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum CategoryRef {
    Id(CategoryId),
    Other(Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCategory {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    owner: Option<Owner>,
    #[serde(alias = "nome")]
    name: String,
    #[serde(default, alias = "cor", deserialize_with = "lenient_color")]
    color: Color,
}

/// Records of other owners found in a document, kept verbatim.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ForeignRecords {
    tasks: Vec<Value>,
    categories: Vec<Value>,
    accounts: Vec<Owner>,
}

impl ForeignRecords {
    /// Number of tasks belonging to other owners.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// True when the document holds nothing but the loading owner's records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.categories.is_empty() && self.accounts.is_empty()
    }
}

/// A document split into the loading owner's workspace and everyone else's
/// records.
#[derive(Debug)]
pub struct ParsedDocument {
    /// Records of the loading owner.
    pub workspace: Workspace,
    /// Records of other owners.
    pub foreign: ForeignRecords,
}

/// Parse a document into a workspace for `owner`.
///
/// Missing optional keys take their defaults; records without an owner are
/// attributed to `owner`.
///
/// # Errors
/// Returns [`JsonStoreError::Parse`] when the text matches no layout and
/// [`JsonStoreError::InvalidRecord`] when a record breaks a task invariant.
pub fn parse_document(contents: &str, owner: &Owner) -> Result<ParsedDocument, JsonStoreError> {
    let document: StoredDocument = serde_json::from_str(contents)?;
    let mut foreign = ForeignRecords::default();
    let (entries, categories, registered) = match document {
        StoredDocument::List(entries) => (entries, Vec::new(), false),
        StoredDocument::Full(full) => {
            let doc_owner_is_us = full.owner.as_ref().is_none_or(|doc_owner| doc_owner == owner);
            let registered = (full.registered && doc_owner_is_us) || full.accounts.contains(owner);
            foreign.accounts = full.accounts.into_iter().filter(|account| account != owner).collect();
            if let Some(doc_owner) = full.owner.filter(|_| full.registered && !doc_owner_is_us)
                && !foreign.accounts.contains(&doc_owner)
            {
                foreign.accounts.push(doc_owner);
            }
            (full.tasks, full.categories, registered)
        }
    };

    let mut own_categories = Vec::new();
    for value in categories {
        if belongs_to_other(&value, owner) {
            foreign.categories.push(value);
        } else {
            let stored: StoredCategory = serde_json::from_value(value)?;
            own_categories.push(stored.into_category(owner)?);
        }
    }

    let mut tasks = Vec::new();
    for value in entries {
        if belongs_to_other(&value, owner) {
            foreign.tasks.push(value);
        } else {
            let entry: StoredEntry = serde_json::from_value(value)?;
            tasks.push(entry.into_task(owner, &own_categories)?);
        }
    }

    Ok(ParsedDocument {
        workspace: Workspace::from_parts(owner.clone(), tasks, own_categories, registered),
        foreign,
    })
}

/// Render a workspace, plus the records of other owners, as pretty-printed
/// JSON.
///
/// Documents without categories or registered accounts keep the bare array
/// layout so older readers still understand the file.
///
/// # Errors
/// Returns [`JsonStoreError::Parse`] if serialization fails.
pub fn render_document(workspace: &Workspace, foreign: &ForeignRecords) -> Result<String, JsonStoreError> {
    let mut tasks = workspace
        .tasks()
        .as_slice()
        .iter()
        .map(|task| serde_json::to_value(StoredTask::from(task)))
        .collect::<Result<Vec<_>, _>>()?;
    tasks.extend(foreign.tasks.iter().cloned());

    let plain = workspace.categories().is_empty()
        && !workspace.is_registered()
        && foreign.categories.is_empty()
        && foreign.accounts.is_empty();

    let document = if plain {
        StoredDocument::List(tasks)
    } else {
        let mut categories = workspace
            .categories()
            .list()
            .iter()
            .map(|category| serde_json::to_value(StoredCategory::from(category)))
            .collect::<Result<Vec<_>, _>>()?;
        categories.extend(foreign.categories.iter().cloned());

        StoredDocument::Full(FullDocument {
            owner: Some(workspace.owner().clone()),
            registered: workspace.is_registered(),
            accounts: foreign.accounts.clone(),
            categories,
            tasks,
        })
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

/// True when the record names an owner other than `owner`. Records without a
/// readable owner belong to whoever loads them.
fn belongs_to_other(value: &Value, owner: &Owner) -> bool {
    value
        .get("owner")
        .and_then(Value::as_str)
        .and_then(|name| Owner::new(name).ok())
        .is_some_and(|record_owner| record_owner != *owner)
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            warn!(%value, error = %err, "ignoring unreadable field in task document");
            Ok(None)
        }
    }
}

fn lenient_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

fn lenient_minutes<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let minutes = match &value {
        Value::Null => Some(0),
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    match minutes {
        Some(minutes) if minutes >= 0 => Ok(minutes),
        _ => {
            warn!(%value, "ignoring unreadable estimated minutes");
            Ok(0)
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let parsed = value.as_str().and_then(parse_timestamp);
    if parsed.is_none() {
        warn!(%value, "ignoring unreadable creation time");
    }
    Ok(parsed)
}

fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    OffsetDateTime::parse(text, &Rfc3339).ok().or_else(|| {
        PrimitiveDateTime::parse(text, NAIVE_TIMESTAMP)
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    })
}

impl StoredEntry {
    fn into_task(self, owner: &Owner, categories: &[Category]) -> Result<Task, ValidationError> {
        match self {
            Self::Record(record) => record.into_task(owner, categories),
            Self::Text(text) => {
                let (completed, description) = match text.trim_start().strip_prefix(DONE_MARK) {
                    Some(rest) => (true, rest),
                    None => (false, text.as_str()),
                };
                let now = OffsetDateTime::now_utc();
                Task::restore(TaskRecord {
                    id: TaskId::new(),
                    owner: owner.clone(),
                    description: description.to_owned(),
                    priority: Priority::default(),
                    due_date: DueDate::new(now.date()),
                    completed,
                    category: None,
                    notes: String::new(),
                    estimated_minutes: 0,
                    created_at: now,
                })
            }
        }
    }
}

impl StoredTask {
    fn into_task(self, owner: &Owner, categories: &[Category]) -> Result<Task, ValidationError> {
        let category = self.category.and_then(|reference| reference.resolve(categories));
        Task::restore(TaskRecord {
            id: self.id.unwrap_or_else(TaskId::new),
            owner: self.owner.unwrap_or_else(|| owner.clone()),
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            completed: self.completed,
            category,
            notes: self.notes.unwrap_or_default(),
            estimated_minutes: self.estimated_minutes,
            created_at: self.created_at.unwrap_or_else(OffsetDateTime::now_utc),
        })
    }
}

impl CategoryRef {
    /// Ids are kept as they are; a name maps to the category of that name.
    /// Anything else is dropped.
    fn resolve(self, categories: &[Category]) -> Option<CategoryId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Other(Value::String(name)) => {
                let needle = name.trim().to_lowercase();
                let found = categories
                    .iter()
                    .find(|category| category.name.to_lowercase() == needle)
                    .map(|category| category.id);
                if found.is_none() {
                    warn!(category = %name, "task refers to an unknown category; dropping it");
                }
                found
            }
            Self::Other(value) => {
                warn!(%value, "task category is not an id or a name; dropping it");
                None
            }
        }
    }
}

impl From<&Task> for StoredTask {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            owner: Some(task.owner.clone()),
            description: task.description().to_owned(),
            priority: task.priority,
            due_date: task.due_date,
            completed: task.completed,
            category: task.category.map(CategoryRef::Id),
            notes: (!task.notes.is_empty()).then(|| task.notes.clone()),
            estimated_minutes: task.estimated_minutes(),
            created_at: Some(task.created_at),
        }
    }
}

impl StoredCategory {
    fn into_category(self, owner: &Owner) -> Result<Category, ValidationError> {
        let mut category = Category::new(
            self.owner.unwrap_or_else(|| owner.clone()),
            &self.name,
            self.color,
        )?;
        if let Some(id) = self.id {
            category.id = id;
        }
        Ok(category)
    }
}

impl From<&Category> for StoredCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            owner: Some(category.owner.clone()),
            name: category.name.clone(),
            color: category.color.clone(),
        }
    }
}
