//! Application layer logic for taskmile.
//!
//! This crate wires the workspace model to its storage backends and provides
//! the services, configuration and input parsing shared by the CLI and the
//! console menu.

pub mod adapter;
pub mod config;
pub mod input;
pub mod service;

// Re-exports for convenience
pub use adapter::{ConfiguredStore, StoreAdapter};
pub use config::{ProjectConfig, StorageBackend, StorageSettings, user_config_path};
pub use input::{
    InputError, MenuChoice, NewTaskInput, TaskEditInput, parse_priority_or_default, resolve_task,
};
pub use service::{ConsoleSession, ServiceError, ServiceResult, TaskService};
