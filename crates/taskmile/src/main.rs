//! CLI entry point for taskmile.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use taskmile_app::{
    ConsoleSession, ProjectConfig, StorageBackend, StorageSettings, TaskService,
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;
mod menu;

/// Personal task manager with JSON or `SQLite` storage.
#[derive(Parser, Debug)]
#[command(
    name = "taskmile",
    version,
    about = "taskmile: a personal task list with priorities, due dates and categories"
)]
struct Cli {
    /// Task document or database file (overrides the config file).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Storage backend: json or sqlite.
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,

    /// Owner of the tasks.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task.
    Add {
        /// Task text.
        description: String,
        /// high|medium|low (alta|media|baixa also accepted).
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Due date as DD/MM/YYYY or YYYY-MM-DD; today when omitted.
        #[arg(short, long)]
        due: Option<String>,
        /// Category name or id.
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Estimated minutes.
        #[arg(long)]
        estimate: Option<String>,
    },

    /// List tasks in display order.
    Ls {
        /// all | pending | completed | high | medium | low
        #[arg(short, long, default_value = "all")]
        filter: String,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Toggle a task between done and pending.
    Done {
        /// Number shown by `ls` or a task id.
        task: String,
    },

    /// Remove a task.
    Rm {
        /// Number shown by `ls` or a task id.
        task: String,
    },

    /// Change fields of a task.
    Edit {
        /// Number shown by `ls` or a task id.
        task: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        due: Option<String>,
        #[arg(short, long, conflicts_with = "clear_category")]
        category: Option<String>,
        /// Remove the task's category.
        #[arg(long)]
        clear_category: bool,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        estimate: Option<String>,
    },

    /// Manage categories.
    Category {
        #[command(subcommand)]
        cmd: CategoryCommand,
    },

    /// Register the account and create the default categories.
    Register,

    /// Interactive numbered menu (default).
    Menu,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Create a category.
    Add {
        name: String,
        /// Hex color such as #28a745.
        #[arg(long, default_value = "#007bff")]
        color: String,
    },
    /// List categories.
    Ls,
    /// Delete a category no task uses.
    Rm {
        /// Category name or id.
        category: String,
    },
}

/// Output format for `ls`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    #[default]
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli {
        data,
        backend,
        user,
        cmd,
    } = Cli::parse();

    install_tracing();

    let settings = resolve_settings(data, backend, user)?;
    execute_command(&settings, cmd.unwrap_or(Command::Menu))
}

fn resolve_settings(
    data: Option<PathBuf>,
    backend: Option<StorageBackend>,
    user: Option<String>,
) -> Result<StorageSettings> {
    let workdir = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config = ProjectConfig::load(&workdir)?;
    if let Some(backend) = backend {
        config.storage.backend = backend;
    }
    if data.is_some() {
        config.storage.path = data;
    }
    if user.is_some() {
        config.user.name = user;
    }
    config.storage_settings(&workdir)
}

fn execute_command(settings: &StorageSettings, command: Command) -> Result<()> {
    let store = settings.open()?;
    tracing::debug!(
        backend = %settings.backend,
        path = %settings.path.display(),
        owner = %settings.owner,
        "storage opened"
    );
    match command {
        Command::Menu => {
            let session = ConsoleSession::open(store);
            let stdin = io::stdin();
            menu::run(session, stdin.lock(), io::stdout())
        }
        other => commands::run(other, &TaskService::new(store), &mut io::stdout()),
    }
}

fn install_tracing() {
    // RUST_LOG is honoured; the default level is WARN so the menu stays readable.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}
