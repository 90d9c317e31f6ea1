//! Configuration for opening an LSH index.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `sqllsh.toml` (or an explicit path)
//! 3. `SQLLSH_*` environment variables (e.g. `SQLLSH_TABLE=signatures`)

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::debug;

use crate::dialect::{Dialect, DialectKind};
use crate::error::{Error, Result};
use crate::params::LshParams;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "sqllsh.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SQLLSH_";

/// Settings needed to connect to the database and open an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LshConfig {
    /// sqlx connection URL, e.g. `sqlite://lsh.db?mode=rwc`.
    pub database_url: String,
    /// Index table name, used verbatim in generated SQL.
    pub table: String,
    /// Hash values per key.
    pub k: usize,
    /// Number of hash tables.
    pub l: usize,
    /// Backend; inferred from `database_url` when unset.
    pub dialect: Option<DialectKind>,
    /// Maximum pool connections.
    pub max_connections: u32,
}

impl Default for LshConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://sqllsh.db?mode=rwc".to_string(),
            table: "lshtable".to_string(),
            k: 2,
            l: 2,
            dialect: None,
            max_connections: 5,
        }
    }
}

impl LshConfig {
    /// Loads configuration from `sqllsh.toml` in the working directory and
    /// the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads configuration from `path` (missing file is fine) and the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered provider, exposed so callers can merge their own overrides.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Checks parameters and dialect resolution.
    pub fn validate(&self) -> Result<()> {
        self.params()?;
        self.dialect_kind()?;
        if self.table.trim().is_empty() {
            return Err(Error::Config("table must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(Error::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Validated LSH parameters.
    pub fn params(&self) -> Result<LshParams> {
        LshParams::new(self.k, self.l)
    }

    /// Configured backend, or the one implied by the URL.
    pub fn dialect_kind(&self) -> Result<DialectKind> {
        match self.dialect {
            Some(kind) => Ok(kind),
            None => DialectKind::from_url(&self.database_url),
        }
    }

    /// Dialect for the configured backend.
    pub fn dialect(&self) -> Result<Dialect> {
        self.dialect_kind().map(DialectKind::dialect)
    }

    /// Opens a connection pool for `database_url`.
    pub async fn connect(&self) -> Result<AnyPool> {
        sqlx::any::install_default_drivers();
        debug!(
            max_connections = self.max_connections,
            "Connecting to database"
        );
        let pool = AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await?;
        Ok(pool)
    }
}
