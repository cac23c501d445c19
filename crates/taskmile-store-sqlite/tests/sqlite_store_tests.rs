#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use anyhow::Result;
use taskmile_core::{Color, NewTask, Owner, TaskFilter, TaskPatch, Workspace};
use taskmile_store_sqlite::SqliteStore;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    TempDir::with_prefix("taskmile-sqlite-test-").expect("create temp dir")
}

#[test]
fn owners_sharing_a_database_never_see_each_other() -> Result<()> {
    let dir = temp_dir();
    let path = dir.path().join("tasks.db");
    let alice = Owner::new("alice")?;
    let bob = Owner::new("bob")?;

    let alice_store = SqliteStore::open(&path, alice.clone())?;
    let mut alice_ws = Workspace::new(alice);
    alice_ws.add_task(NewTask::parse("alice's errand", "high", "10/10/2030")?)?;
    alice_store.save(&alice_ws)?;

    let bob_store = SqliteStore::open(&path, bob.clone())?;
    let mut bob_ws = bob_store.load()?;
    assert!(bob_ws.tasks().is_empty());

    bob_ws.add_task(NewTask::parse("bob's errand", "low", "11/10/2030")?)?;
    bob_store.save(&bob_ws)?;

    let alice_again = alice_store.load()?;
    assert_eq!(alice_again.tasks().len(), 1);
    assert_eq!(alice_again.tasks().as_slice()[0].description(), "alice's errand");
    assert_eq!(bob_store.load()?.tasks().len(), 1);
    Ok(())
}

#[test]
fn data_survives_reopening_the_file() -> Result<()> {
    let dir = temp_dir();
    let path = dir.path().join("nested").join("tasks.db");

    let id = {
        let store = SqliteStore::open(&path, Owner::local())?;
        let mut ws = Workspace::new(Owner::local());
        ws.seed_default_categories();
        let garden = ws.add_category("Garden", Color::parse("#00AA00")?)?.id;
        let id = ws
            .add_task(
                NewTask::parse("Plant tomatoes", "alta", "2030-04-01")?
                    .with_category(Some(garden))
                    .with_estimate(90),
            )?
            .id;
        ws.edit_task(
            id,
            &TaskPatch {
                notes: Some("south bed".into()),
                ..TaskPatch::default()
            },
        )?;
        store.save(&ws)?;
        id
    };

    let store = SqliteStore::open(&path, Owner::local())?;
    let ws = store.load()?;
    let task = ws.task(id)?;
    assert!(ws.is_registered());
    assert_eq!(ws.categories().len(), 5);
    assert_eq!(task.notes, "south bed");
    assert_eq!(task.estimated_minutes(), 90);
    assert_eq!(task.due_date.to_string(), "01/04/2030");
    assert_eq!(
        ws.category(task.category.expect("category kept"))?.color.as_str(),
        "#00aa00"
    );
    Ok(())
}

#[test]
fn removed_category_is_gone_after_reload() -> Result<()> {
    let store = SqliteStore::open_in_memory(Owner::local())?;
    let mut ws = Workspace::new(Owner::local());
    let scratch = ws.add_category("Scratch", Color::default())?.id;
    store.save(&ws)?;

    let mut ws = store.load()?;
    ws.remove_category(scratch)?;
    store.save(&ws)?;

    assert!(store.load()?.categories().is_empty());
    Ok(())
}

#[test]
fn filters_apply_to_loaded_rows() -> Result<()> {
    let store = SqliteStore::open_in_memory(Owner::local())?;
    let mut ws = Workspace::new(Owner::local());
    let done = ws.add_task(NewTask::parse("done", "low", "01/01/2030")?)?.id;
    ws.add_task(NewTask::parse("open", "high", "02/01/2030")?)?;
    ws.toggle_complete(done)?;
    store.save(&ws)?;

    let loaded = store.load()?;
    assert_eq!(loaded.list(TaskFilter::Completed).len(), 1);
    assert_eq!(loaded.list(TaskFilter::Pending)[0].description(), "open");
    Ok(())
}
