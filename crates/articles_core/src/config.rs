//! Storage target configuration.
//!
//! # Responsibility
//! - Describe which SQLite file a connection factory opens.
//! - Carry connection options applied on every acquire.
//!
//! # Invariants
//! - Library code never reads process environment; only
//!   `ExecutionMode::from_env` does, and only callers opt into it.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Store file used in production mode.
pub const PRODUCTION_DB_FILE: &str = "articles.db";
/// Store file used in testing mode.
pub const TEST_DB_FILE: &str = "test_articles.db";
/// Environment variable that switches callers into testing mode.
pub const TESTING_ENV_VAR: &str = "TESTING";

pub(crate) const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Selects between the production and test storage targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    #[default]
    Production,
    Testing,
}

impl ExecutionMode {
    /// Reads `TESTING` from the process environment.
    ///
    /// Any non-empty value selects `Testing`.
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(TESTING_ENV_VAR).ok().as_deref())
    }

    /// Maps a raw flag value to a mode. Empty or missing means production.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some(flag) if !flag.is_empty() => Self::Testing,
            _ => Self::Production,
        }
    }

    /// File name of the store for this mode.
    pub fn db_file_name(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_DB_FILE,
            Self::Testing => TEST_DB_FILE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }
}

/// Connection factory configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Directory holding the store file. Created on first acquire.
    pub data_dir: PathBuf,
    /// Production or test target.
    pub mode: ExecutionMode,
    /// Mirrors `PRAGMA foreign_keys`.
    pub enforce_foreign_keys: bool,
    /// How long a writer waits on a locked database.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// Creates a config with foreign keys enforced and a 5s busy timeout.
    pub fn new(data_dir: impl Into<PathBuf>, mode: ExecutionMode) -> Self {
        Self {
            data_dir: data_dir.into(),
            mode,
            enforce_foreign_keys: true,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Returns a copy with foreign-key enforcement switched.
    pub fn with_foreign_keys(mut self, enforce: bool) -> Self {
        self.enforce_foreign_keys = enforce;
        self
    }

    /// Full path of the store file for the configured mode.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(self.mode.db_file_name())
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_path()
    }
}
