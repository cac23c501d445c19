//! DDL for the account, category and task tables.

use rusqlite::Connection;

use crate::error::SqliteStoreError;

/// Create tables and indexes.
///
/// Runs on every open; all statements use `IF NOT EXISTS`.
///
/// # Errors
/// Returns an error if a statement fails.
pub fn run_migrations(conn: &Connection) -> Result<(), SqliteStoreError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    owner TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    name TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT '#007bff',
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_categories_owner
    ON categories(owner, position);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    description TEXT NOT NULL,
    priority TEXT NOT NULL DEFAULT 'medium'
        CHECK(priority IN ('high', 'medium', 'low')),
    due_date TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    category_id TEXT REFERENCES categories(id) ON DELETE SET NULL,
    notes TEXT NOT NULL DEFAULT '',
    estimated_minutes INTEGER NOT NULL DEFAULT 0
        CHECK(estimated_minutes >= 0),
    created_at TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner
    ON tasks(owner, position);
";
