//! Server configuration loaded from environment variables.
//!
//! - `PROJECTBOARD_HOST` - bind address (default `127.0.0.1`)
//! - `PROJECTBOARD_PORT` - HTTP port (default `5000`)
//! - `PROJECTBOARD_DB` - SQLite file path, or `:memory:` (default: platform data dir)
//! - `PROJECTBOARD_CORS_ORIGINS` - comma-separated allowed origins (default: any)

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::Database;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

const MEMORY_MARKER: &str = ":memory:";

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// `<platform data dir>/projectboard/projectboard.db`
    Default,
    File(PathBuf),
    Memory,
}

impl DatabaseLocation {
    fn parse(value: &str) -> Self {
        if value == MEMORY_MARKER {
            Self::Memory
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    /// Open the store and bring its schema up to date.
    pub fn open(&self) -> Result<Database> {
        let db = match self {
            Self::Default => Database::open_default()?,
            Self::File(path) => Database::open(path.clone())?,
            Self::Memory => Database::open_memory()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseLocation,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DatabaseLocation::Default,
            cors_origins: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("PROJECTBOARD_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PROJECTBOARD_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("PROJECTBOARD_PORT is not a valid port: {}", port))?;
        }
        if let Some(db) = lookup("PROJECTBOARD_DB") {
            config.database = DatabaseLocation::parse(db.trim());
        }
        config.cors_origins = lookup("PROJECTBOARD_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        db: Option<PathBuf>,
        memory: bool,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(path) = db {
            self.database = DatabaseLocation::File(path);
        }
        if memory {
            self.database = DatabaseLocation::Memory;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
