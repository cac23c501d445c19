use std::io::Write;

use anyhow::{Context, Result, bail};
use taskmile_app::{NewTaskInput, StoreAdapter, TaskEditInput, TaskService, resolve_task};
use taskmile_core::{CategoryId, Color, TaskFilter, TaskId, Workspace};

use crate::{CategoryCommand, Command, LsFormat};

mod render;

pub use render::{render_categories, render_task_table};

/// Execute one subcommand as a single load, apply, save cycle.
///
/// # Errors
/// Returns parse, validation, not-found, conflict and storage errors, and
/// refuses [`Command::Menu`], which needs a console session.
pub fn run<A: StoreAdapter>(
    command: Command,
    service: &TaskService<A>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Add {
            description,
            priority,
            due,
            category,
            notes,
            estimate,
        } => {
            let workspace = service.workspace()?;
            let new_task = NewTaskInput {
                description,
                priority,
                due_date: due.unwrap_or_default(),
                category,
                notes,
                estimated_minutes: estimate,
            }
            .into_new_task(&workspace)?;
            let task = service.add_task(new_task)?;
            writeln!(out, "✅ Task '{}' added ({})", task.description(), task.id)?;
        }
        Command::Ls { filter, format } => {
            let filter = TaskFilter::parse_lenient(&filter);
            let workspace = service.workspace()?;
            let tasks = workspace.list(filter);

            if tasks.is_empty() {
                if filter.is_all() {
                    writeln!(out, "No tasks found")?;
                } else {
                    writeln!(out, "No tasks matched filter '{filter}'")?;
                }
                return Ok(());
            }

            match format {
                LsFormat::Table => render_task_table(out, &workspace, &tasks)?,
                LsFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?,
            }
        }
        Command::Done { task } => {
            let id = lookup_task(service, &task)?;
            let task = service.toggle_complete(id)?;
            if task.completed {
                writeln!(out, "✅ '{}' marked as done", task.description())?;
            } else {
                writeln!(out, "↩️ '{}' marked as pending", task.description())?;
            }
        }
        Command::Rm { task } => {
            let id = lookup_task(service, &task)?;
            let task = service.remove_task(id)?;
            writeln!(out, "🗑️ Task '{}' removed", task.description())?;
        }
        Command::Edit {
            task,
            description,
            priority,
            due,
            category,
            clear_category,
            notes,
            estimate,
        } => {
            let workspace = service.workspace()?;
            let id = resolve_task(&workspace.list(TaskFilter::All), &task)?;
            let patch = TaskEditInput {
                description,
                priority,
                due_date: due,
                category,
                clear_category,
                notes,
                estimated_minutes: estimate,
                completed: None,
            }
            .into_patch(&workspace)?;
            let task = service.edit_task(id, &patch)?;
            writeln!(out, "✏️ Task '{}' updated", task.description())?;
        }
        Command::Category { cmd } => run_category(cmd, service, out)?,
        Command::Register => {
            let categories = service.register_account()?;
            writeln!(
                out,
                "Account '{}' registered with {} categories",
                service.adapter().owner(),
                categories.len()
            )?;
        }
        Command::Menu => bail!("the menu runs in an interactive console session"),
    }

    Ok(())
}

fn run_category<A: StoreAdapter>(
    command: CategoryCommand,
    service: &TaskService<A>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        CategoryCommand::Add { name, color } => {
            let color = Color::parse(&color)?;
            let category = service.add_category(&name, color)?;
            writeln!(out, "Category '{}' created ({})", category.name, category.color)?;
        }
        CategoryCommand::Ls => {
            let categories = service.list_categories()?;
            if categories.is_empty() {
                writeln!(out, "No categories yet; run `taskmile register` for the defaults")?;
            } else {
                render_categories(out, &categories)?;
            }
        }
        CategoryCommand::Rm { category } => {
            let workspace = service.workspace()?;
            let id = lookup_category(&workspace, &category)?;
            let removed = service.remove_category(id)?;
            writeln!(out, "Category '{}' removed", removed.name)?;
        }
    }
    Ok(())
}

fn lookup_task<A: StoreAdapter>(service: &TaskService<A>, token: &str) -> Result<TaskId> {
    let workspace = service.workspace()?;
    Ok(resolve_task(&workspace.list(TaskFilter::All), token)?)
}

fn lookup_category(workspace: &Workspace, token: &str) -> Result<CategoryId> {
    if let Some(category) = workspace.category_by_name(token) {
        return Ok(category.id);
    }
    let id: CategoryId = token
        .trim()
        .parse()
        .with_context(|| format!("no category named '{}'", token.trim()))?;
    Ok(workspace.category(id)?.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmile_app::{ConfiguredStore, StorageBackend, StorageSettings};
    use taskmile_core::{NewTask, Owner};

    fn service(dir: &tempfile::TempDir) -> TaskService<ConfiguredStore> {
        let settings = StorageSettings {
            backend: StorageBackend::Json,
            path: dir.path().join("tarefas.json"),
            owner: Owner::local(),
        };
        TaskService::new(settings.open().unwrap_or_else(|err| panic!("{err}")))
    }

    fn run_to_string<A: StoreAdapter>(command: Command, service: &TaskService<A>) -> Result<String> {
        let mut out = Vec::new();
        run(command, service, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn add_then_list_in_display_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let service = service(&dir);
        service.add_task(NewTask::parse("later", "low", "01/01/2030")?)?;

        let output = run_to_string(
            Command::Add {
                description: "Buy milk".into(),
                priority: "high".into(),
                due: Some("01/01/2030".into()),
                category: None,
                notes: None,
                estimate: None,
            },
            &service,
        )?;
        assert!(output.contains("Buy milk"));

        let listing = run_to_string(
            Command::Ls {
                filter: "all".into(),
                format: LsFormat::Table,
            },
            &service,
        )?;
        let milk = listing.find("Buy milk").unwrap_or(usize::MAX);
        let later = listing.find("later").unwrap_or(0);
        assert!(milk < later, "high priority first:\n{listing}");
        Ok(())
    }

    #[test]
    fn done_by_position_toggles() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let service = service(&dir);
        service.add_task(NewTask::parse("only", "medium", "01/01/2030")?)?;

        let output = run_to_string(Command::Done { task: "1".into() }, &service)?;
        assert!(output.contains("marked as done"));
        let output = run_to_string(Command::Done { task: "1".into() }, &service)?;
        assert!(output.contains("marked as pending"));
        Ok(())
    }

    #[test]
    fn bad_position_is_an_error_and_changes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let service = service(&dir);
        service.add_task(NewTask::parse("only", "medium", "01/01/2030")?)?;

        let Err(err) = run_to_string(Command::Rm { task: "7".into() }, &service) else {
            panic!("position 7 should not exist");
        };
        assert!(err.to_string().contains("between 1 and 1"));
        assert_eq!(service.list_tasks(TaskFilter::All)?.len(), 1);
        Ok(())
    }

    #[test]
    fn filtered_listing_reports_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let service = service(&dir);
        service.add_task(NewTask::parse("open", "medium", "01/01/2030")?)?;

        let output = run_to_string(
            Command::Ls {
                filter: "concluidas".into(),
                format: LsFormat::Table,
            },
            &service,
        )?;
        assert_eq!(output.trim(), "No tasks matched filter 'completed'");
        Ok(())
    }

    #[test]
    fn category_lifecycle() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let service = service(&dir);

        let output = run_to_string(Command::Register, &service)?;
        assert!(output.contains("4 categories"));

        run_to_string(
            Command::Category {
                cmd: CategoryCommand::Add {
                    name: "Garden".into(),
                    color: "#00FF00".into(),
                },
            },
            &service,
        )?;
        service.add_task(NewTask::parse("Plant", "low", "01/01/2030")?)?;
        run_to_string(
            Command::Edit {
                task: "1".into(),
                description: None,
                priority: None,
                due: None,
                category: Some("garden".into()),
                clear_category: false,
                notes: None,
                estimate: None,
            },
            &service,
        )?;

        let Err(err) = run_to_string(
            Command::Category {
                cmd: CategoryCommand::Rm {
                    category: "Garden".into(),
                },
            },
            &service,
        ) else {
            panic!("garden is in use");
        };
        assert!(err.to_string().contains("1 task"));

        let listing = run_to_string(
            Command::Category {
                cmd: CategoryCommand::Ls,
            },
            &service,
        )?;
        assert!(listing.contains("Garden"));
        assert!(listing.contains("#00ff00"));
        Ok(())
    }

    #[test]
    fn menu_is_refused_outside_a_console_session() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let service = service(&dir);

        let Err(err) = run_to_string(Command::Menu, &service) else {
            panic!("menu needs a console session");
        };
        assert!(err.to_string().contains("console session"));
        assert!(!dir.path().join("tarefas.json").exists());
        Ok(())
    }
}
