use std::io::{self, Write};

use taskmile_core::{Category, DueDate, Task, Workspace};

/// Numbered task table; numbers are the positions accepted by `done`, `rm`
/// and `edit`.
///
/// # Errors
/// Fails only when `out` cannot be written.
pub fn render_task_table(out: &mut impl Write, workspace: &Workspace, tasks: &[&Task]) -> io::Result<()> {
    let today = DueDate::today();
    writeln!(out, "# | Done | Priority | Due | Description | Category | Estimate")?;
    writeln!(out, "- | ---- | -------- | --- | ----------- | -------- | --------")?;

    for (index, task) in tasks.iter().enumerate() {
        let done = if task.completed { "✅" } else { "  " };
        let due = if task.is_overdue(today) {
            format!("{} (overdue)", task.due_date)
        } else {
            task.due_date.to_string()
        };
        let category = task
            .category
            .and_then(|id| workspace.category(id).ok())
            .map_or("-", |category| category.name.as_str());
        let estimate = if task.estimated_minutes() > 0 {
            format!("{} min", task.estimated_minutes())
        } else {
            "-".to_owned()
        };

        writeln!(
            out,
            "{} | {} | {} | {} | {} | {} | {}",
            index + 1,
            done,
            task.priority,
            due,
            task.description(),
            category,
            estimate
        )?;
        if !task.notes.is_empty() {
            writeln!(out, "    {}", task.notes)?;
        }
    }
    Ok(())
}

/// Category table with ids.
///
/// # Errors
/// Fails only when `out` cannot be written.
pub fn render_categories(out: &mut impl Write, categories: &[Category]) -> io::Result<()> {
    writeln!(out, "Name | Color | ID")?;
    writeln!(out, "---- | ----- | --")?;
    for category in categories {
        writeln!(out, "{} | {} | {}", category.name, category.color, category.id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmile_core::{NewTask, Owner, TaskFilter};

    #[test]
    fn table_shows_category_notes_and_overdue() -> anyhow::Result<()> {
        let mut ws = Workspace::new(Owner::local());
        ws.seed_default_categories();
        let work = ws.category_by_name("Work").map(|c| c.id);
        ws.add_task(
            NewTask::parse("Old report", "high", "01/01/2000")?
                .with_category(work)
                .with_notes("ask Ana")
                .with_estimate(20),
        )?;

        let mut out = Vec::new();
        render_task_table(&mut out, &ws, &ws.list(TaskFilter::All))?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("1 |    | high | 01/01/2000 (overdue) | Old report | Work | 20 min"));
        assert!(text.contains("    ask Ana"));
        Ok(())
    }
}
