use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use taskmile_core::Owner;
use taskmile_store_json::{DEFAULT_FILE_NAME, JsonStore};
use taskmile_store_sqlite::SqliteStore;

use crate::adapter::ConfiguredStore;

const CONFIG_DIR: &str = ".taskmile";
const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "taskmile";
const DEFAULT_DATABASE: &str = "taskmile.db";

/// Top-level configuration loaded from `.taskmile/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Where tasks are stored.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Who the tasks belong to.
    #[serde(default)]
    pub user: UserConfig,
}

/// `[storage]` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Document or database location. Relative paths resolve against the
    /// working directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// `[user]` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Owner name; `local` when unset.
    #[serde(default)]
    pub name: Option<String>,
}

/// Supported storage backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON document per owner.
    #[default]
    Json,
    /// A `SQLite` database shared by owners.
    Sqlite,
}

impl StorageBackend {
    const fn default_file(self) -> &'static str {
        match self {
            Self::Json => DEFAULT_FILE_NAME,
            Self::Sqlite => DEFAULT_DATABASE,
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        })
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" | "db" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage backend '{other}' (expected json or sqlite)")),
        }
    }
}

/// Fully resolved storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Backend kind.
    pub backend: StorageBackend,
    /// Absolute or workdir-relative location.
    pub path: PathBuf,
    /// Owner the store is opened for.
    pub owner: Owner,
}

impl StorageSettings {
    /// Open the configured backend.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(&self) -> Result<ConfiguredStore> {
        Ok(match self.backend {
            StorageBackend::Json => {
                ConfiguredStore::Json(JsonStore::open(&self.path, self.owner.clone()))
            }
            StorageBackend::Sqlite => ConfiguredStore::Sqlite(
                SqliteStore::open(&self.path, self.owner.clone())
                    .with_context(|| format!("failed to open {}", self.path.display()))?,
            ),
        })
    }
}

impl ProjectConfig {
    /// Load configuration for `workdir`: the project file first, then the
    /// user-level file, then built-in defaults.
    ///
    /// # Errors
    /// Returns an error when an existing file cannot be read or parsed.
    pub fn load(workdir: impl AsRef<Path>) -> Result<Self> {
        let project = workdir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if project.exists() {
            return Self::from_file(&project);
        }
        match user_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a known working tree directory only.
    ///
    /// # Errors
    /// Returns an error when the file exists but is invalid.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let config_path = workdir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    /// Parse one configuration file.
    ///
    /// # Errors
    /// Returns an error naming the file when it cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.user.name {
            Owner::new(name).map_err(|_| anyhow!("user.name must not be empty"))?;
        }
        if self
            .storage
            .path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(anyhow!("storage.path must not be empty"));
        }
        Ok(())
    }

    /// Resolve the storage settings, relative to `workdir`.
    ///
    /// # Errors
    /// Returns an error when the configured user name is blank.
    pub fn storage_settings(&self, workdir: impl AsRef<Path>) -> Result<StorageSettings> {
        let backend = self.storage.backend;
        let path = self
            .storage
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(backend.default_file()));
        let path = if path.is_absolute() {
            path
        } else {
            workdir.as_ref().join(path)
        };
        let owner = match &self.user.name {
            Some(name) => Owner::new(name).map_err(|_| anyhow!("user name must not be empty"))?,
            None => Owner::local(),
        };
        Ok(StorageSettings {
            backend,
            path,
            owner,
        })
    }
}

/// Location of the user-level configuration file.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(dir: &Path, contents: &str) -> Result<()> {
        let cfg_dir = dir.join(CONFIG_DIR);
        fs::create_dir_all(&cfg_dir)?;
        let mut file = fs::File::create(cfg_dir.join(CONFIG_FILE))?;
        writeln!(file, "{contents}")?;
        Ok(())
    }

    #[test]
    fn missing_config_uses_json_in_workdir() -> Result<()> {
        let dir = tempdir()?;
        let cfg = ProjectConfig::from_workdir(dir.path())?;
        let settings = cfg.storage_settings(dir.path())?;
        assert_eq!(settings.backend, StorageBackend::Json);
        assert_eq!(settings.path, dir.path().join("tarefas.json"));
        assert_eq!(settings.owner, Owner::local());
        Ok(())
    }

    #[test]
    fn sqlite_backend_with_user() -> Result<()> {
        let dir = tempdir()?;
        write_config(
            dir.path(),
            "[storage]\nbackend = \"sqlite\"\n\n[user]\nname = \"alice\"",
        )?;

        let cfg = ProjectConfig::load(dir.path())?;
        let settings = cfg.storage_settings(dir.path())?;
        assert_eq!(settings.backend, StorageBackend::Sqlite);
        assert_eq!(settings.path, dir.path().join("taskmile.db"));
        assert_eq!(settings.owner.as_str(), "alice");
        Ok(())
    }

    #[test]
    fn absolute_path_is_kept() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("elsewhere").join("mine.json");
        write_config(
            dir.path(),
            &format!("[storage]\npath = {:?}", target.display().to_string()),
        )?;

        let settings = ProjectConfig::from_workdir(dir.path())?.storage_settings("/unused")?;
        assert_eq!(settings.path, target);
        Ok(())
    }

    #[test]
    fn unknown_backend_names_the_file() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[storage]\nbackend = \"postgres\"")?;

        let Err(err) = ProjectConfig::from_workdir(dir.path()) else {
            panic!("unknown backend should error");
        };
        assert!(format!("{err:#}").contains("config.toml"));
        Ok(())
    }

    #[test]
    fn blank_user_name_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[user]\nname = \"  \"")?;

        let Err(err) = ProjectConfig::from_workdir(dir.path()) else {
            panic!("blank user should error");
        };
        assert!(format!("{err:#}").contains("user.name must not be empty"));
        Ok(())
    }

    #[test]
    fn backend_parses_from_cli_tokens() {
        assert_eq!("JSON".parse::<StorageBackend>(), Ok(StorageBackend::Json));
        assert_eq!("sqlite".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert!("csv".parse::<StorageBackend>().is_err());
        assert_eq!(StorageBackend::Sqlite.to_string(), "sqlite");
    }
}
