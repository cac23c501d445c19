//! Numbered console menu over an in-memory session.
//!
//! Reads choices line by line; bad input is reported and the menu is shown
//! again. Tasks are written to storage only when the user picks "Save and exit"
//! or input ends.

use std::io::{BufRead, Write};

use anyhow::Result;
use taskmile_app::{
    ConsoleSession, MenuChoice, NewTaskInput, StoreAdapter, parse_priority_or_default, resolve_task,
};
use taskmile_core::{DueDate, TaskFilter};

use crate::commands::render_task_table;

const RULE: &str = "=-=-=-=-=-=-=-=-=-=-=";

/// Run the menu until the user exits or input ends.
///
/// # Errors
/// Returns an error only when the terminal cannot be written to. Save failures
/// are reported to the user and returned.
pub fn run<A: StoreAdapter>(
    mut session: ConsoleSession<A>,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    loop {
        print_menu(&mut out)?;
        let Some(line) = prompt(&mut input, &mut out, "\nChoose an option (1-5): ")? else {
            writeln!(out)?;
            return save_and_exit(&session, &mut out);
        };

        let choice = match line.parse::<MenuChoice>() {
            Ok(choice) => choice,
            Err(err) => {
                writeln!(out, "❌ {err}")?;
                continue;
            }
        };

        match choice {
            MenuChoice::Add => add_task(&mut session, &mut input, &mut out)?,
            MenuChoice::List => list_tasks(&session, &mut out)?,
            MenuChoice::Toggle => toggle_task(&mut session, &mut input, &mut out)?,
            MenuChoice::Remove => remove_task(&mut session, &mut input, &mut out)?,
            MenuChoice::Exit => return save_and_exit(&session, &mut out),
        }
    }
}

fn print_menu(out: &mut impl Write) -> Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "TASK MANAGER")?;
    writeln!(out, "{RULE}")?;
    for choice in MenuChoice::ALL {
        writeln!(out, "{}. {}", choice.number(), choice.label())?;
    }
    Ok(())
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, message: &str) -> Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn add_task<A: StoreAdapter>(
    session: &mut ConsoleSession<A>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let description = prompt(input, out, "\nNew task: ")?.unwrap_or_default();
    if description.is_empty() {
        writeln!(out, "⚠️ Empty task not added.")?;
        return Ok(());
    }
    let priority = prompt(input, out, "Priority (high/medium/low) [medium]: ")?.unwrap_or_default();
    if let Err(err) = parse_priority_or_default(&priority) {
        writeln!(out, "❌ {err}")?;
        return Ok(());
    }
    let today = DueDate::today();
    let due_date = prompt(input, out, &format!("Due date (DD/MM/YYYY) [{today}]: "))?.unwrap_or_default();

    let parsed = NewTaskInput {
        description,
        priority,
        due_date,
        ..NewTaskInput::default()
    }
    .into_new_task(session.workspace());
    let new_task = match parsed {
        Ok(new_task) => new_task,
        Err(err) => {
            writeln!(out, "❌ {err}")?;
            return Ok(());
        }
    };
    match session.workspace_mut().add_task(new_task) {
        Ok(task) => writeln!(out, "\n✅ Task '{}' added!", task.description())?,
        Err(err) => writeln!(out, "❌ {err}")?,
    }
    Ok(())
}

fn list_tasks<A: StoreAdapter>(session: &ConsoleSession<A>, out: &mut impl Write) -> Result<()> {
    writeln!(out, "\n{RULE}")?;
    writeln!(out, "TASK LIST")?;
    writeln!(out, "{RULE}")?;
    let workspace = session.workspace();
    let tasks = workspace.list(TaskFilter::All);
    if tasks.is_empty() {
        writeln!(out, "No tasks found.")?;
    } else {
        render_task_table(out, workspace, &tasks)?;
    }
    Ok(())
}

fn toggle_task<A: StoreAdapter>(
    session: &mut ConsoleSession<A>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    list_tasks(session, out)?;
    let token = prompt(input, out, "\nTask number to mark done / pending: ")?.unwrap_or_default();
    let id = match resolve_task(&session.workspace().list(TaskFilter::All), &token) {
        Ok(id) => id,
        Err(err) => {
            writeln!(out, "❌ {err}")?;
            return Ok(());
        }
    };
    match session.workspace_mut().toggle_complete(id) {
        Ok(task) if task.completed => writeln!(out, "\n✅ Task marked as done!")?,
        Ok(_) => writeln!(out, "\n↩️ Task marked as pending.")?,
        Err(err) => writeln!(out, "❌ {err}")?,
    }
    Ok(())
}

fn remove_task<A: StoreAdapter>(
    session: &mut ConsoleSession<A>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    list_tasks(session, out)?;
    let token = prompt(input, out, "\nTask number to remove: ")?.unwrap_or_default();
    let id = match resolve_task(&session.workspace().list(TaskFilter::All), &token) {
        Ok(id) => id,
        Err(err) => {
            writeln!(out, "❌ {err}")?;
            return Ok(());
        }
    };
    match session.workspace_mut().remove_task(id) {
        Ok(task) => writeln!(out, "\n🗑️ Task '{}' removed!", task.description())?,
        Err(err) => writeln!(out, "❌ {err}")?,
    }
    Ok(())
}

fn save_and_exit<A: StoreAdapter>(session: &ConsoleSession<A>, out: &mut impl Write) -> Result<()> {
    match session.save() {
        Ok(()) => {
            writeln!(out, "\n💾 Tasks saved. Goodbye!")?;
            Ok(())
        }
        Err(err) => {
            writeln!(out, "\n❌ Could not save tasks: {err}")?;
            Err(err.into())
        }
    }
}
