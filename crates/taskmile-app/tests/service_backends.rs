#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use anyhow::Result;
use taskmile_app::{
    ConsoleSession, ProjectConfig, ServiceError, StorageBackend, StoreAdapter, TaskService,
};
use taskmile_core::{NewTask, Owner, TaskError, TaskFilter};
use taskmile_store_json::JsonStore;
use taskmile_store_sqlite::SqliteStore;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    TempDir::with_prefix("taskmile-app-test-").expect("create temp dir")
}

fn exercise<A: StoreAdapter>(service: &TaskService<A>) -> Result<()> {
    service.register_account()?;
    let work = service.list_categories()?[0].id;

    let milk = service.add_task(NewTask::parse("Buy milk", "high", "01/01/2030")?)?;
    let report = service.add_task(
        NewTask::parse("Write report", "media", "02/01/2030")?.with_category(Some(work)),
    )?;
    service.toggle_complete(milk.id)?;

    let pending = service.list_tasks(TaskFilter::Pending)?;
    let completed = service.list_tasks(TaskFilter::Completed)?;
    assert_eq!(pending.len() + completed.len(), 2);
    assert_eq!(pending[0].id, report.id);
    assert_eq!(completed[0].id, milk.id);

    assert!(matches!(
        service.remove_category(work),
        Err(ServiceError::Task(TaskError::Conflict { .. }))
    ));
    service.remove_task(report.id)?;
    service.remove_category(work)?;
    assert_eq!(service.list_categories()?.len(), 3);

    assert!(matches!(
        service.remove_task(report.id),
        Err(ServiceError::Task(TaskError::NotFound { .. }))
    ));
    Ok(())
}

#[test]
fn json_backend_supports_every_operation() -> Result<()> {
    let dir = temp_dir();
    let store = JsonStore::open(dir.path().join("tarefas.json"), Owner::local());
    exercise(&TaskService::new(&store))?;

    let reloaded = store.load()?;
    assert!(reloaded.is_registered());
    assert_eq!(reloaded.tasks().len(), 1);
    Ok(())
}

#[test]
fn sqlite_backend_supports_every_operation() -> Result<()> {
    let dir = temp_dir();
    let store = Arc::new(SqliteStore::open(dir.path().join("tasks.db"), Owner::new("ana")?)?);
    exercise(&TaskService::new(Arc::clone(&store)))?;

    let other = TaskService::new(SqliteStore::open(dir.path().join("tasks.db"), Owner::new("bia")?)?);
    assert!(other.list_tasks(TaskFilter::All)?.is_empty());
    assert!(other.list_categories()?.is_empty());
    Ok(())
}

#[test]
fn configured_store_follows_the_config_file() -> Result<()> {
    let dir = temp_dir();
    std::fs::create_dir_all(dir.path().join(".taskmile"))?;
    std::fs::write(
        dir.path().join(".taskmile").join("config.toml"),
        "[storage]\nbackend = \"sqlite\"\npath = \"data/tasks.db\"\n",
    )?;

    let settings = ProjectConfig::load(dir.path())?.storage_settings(dir.path())?;
    assert_eq!(settings.backend, StorageBackend::Sqlite);
    let service = TaskService::new(settings.open()?);
    service.add_task(NewTask::parse("configured", "low", "2030-06-01")?)?;

    assert!(dir.path().join("data").join("tasks.db").exists());
    assert_eq!(service.list_tasks(TaskFilter::All)?.len(), 1);
    Ok(())
}

#[test]
fn console_session_recovers_from_corrupt_document() -> Result<()> {
    let dir = temp_dir();
    let path = dir.path().join("tarefas.json");
    std::fs::write(&path, "not json at all")?;

    let mut session = ConsoleSession::open(JsonStore::open(&path, Owner::local()));
    assert!(session.workspace().tasks().is_empty());
    session
        .workspace_mut()
        .add_task(NewTask::parse("fresh start", "baixa", "09/09/2030")?)?;
    session.save()?;

    let reloaded = JsonStore::open(&path, Owner::local()).load()?;
    assert_eq!(reloaded.tasks().as_slice()[0].description(), "fresh start");
    Ok(())
}

#[test]
fn json_document_shared_by_two_owners_loses_nothing() -> Result<()> {
    let dir = temp_dir();
    let path = dir.path().join("tarefas.json");
    let local = TaskService::new(JsonStore::open(&path, Owner::local()));
    let bob = TaskService::new(JsonStore::open(&path, Owner::new("bob")?));

    local.add_task(NewTask::parse("local task", "high", "01/01/2030")?)?;
    bob.add_task(NewTask::parse("bob task", "low", "01/01/2030")?)?;

    let mine = local.list_tasks(TaskFilter::All)?;
    let theirs = bob.list_tasks(TaskFilter::All)?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].description(), "local task");
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].description(), "bob task");
    Ok(())
}

#[test]
fn console_session_keeps_tasks_with_legacy_category_values() -> Result<()> {
    let dir = temp_dir();
    let path = dir.path().join("tarefas.json");
    std::fs::write(
        &path,
        r#"[
            {"descricao": "Relatório", "prioridade": "alta", "data": "01/03/2030", "categoria": "Trabalho"},
            {"descricao": "Mercado", "prioridade": "baixa", "data": "02/03/2030"}
        ]"#,
    )?;

    let session = ConsoleSession::open(JsonStore::open(&path, Owner::local()));
    assert_eq!(session.workspace().tasks().len(), 2);
    session.save()?;

    let reloaded = JsonStore::open(&path, Owner::local()).load()?;
    assert_eq!(reloaded.tasks().len(), 2);
    Ok(())
}
