//! Backend-specific SQL syntax.
//!
//! The statement builders never hard-code placeholder tokens or index flavors.
//! A [`Dialect`] carries both as injected configuration: a function mapping a
//! zero-based parameter position to that backend's placeholder, and a
//! `CREATE INDEX` template.
//!
//! Template tokens: `{name}` (index name), `{table}` and `{columns}`
//! (comma-separated column list).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maps a zero-based parameter position to a placeholder token.
pub type PlaceholderFn = Arc<dyn Fn(usize) -> String + Send + Sync>;

/// Index template for SQLite.
pub const SQLITE_INDEX_TEMPLATE: &str = "CREATE INDEX {name} ON {table} ({columns})";

/// Index template for PostgreSQL.
pub const POSTGRES_INDEX_TEMPLATE: &str = "CREATE INDEX {name} ON {table} USING BTREE ({columns})";

/// SQL syntax differences between backends.
#[derive(Clone)]
pub struct Dialect {
    name: String,
    placeholder: PlaceholderFn,
    index_template: String,
}

impl Dialect {
    /// Creates a custom dialect.
    pub fn new<F>(name: impl Into<String>, placeholder: F, index_template: impl Into<String>) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            placeholder: Arc::new(placeholder),
            index_template: index_template.into(),
        }
    }

    /// SQLite: unnumbered `?` placeholders, default B-tree index.
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new("sqlite", |_| "?".to_string(), SQLITE_INDEX_TEMPLATE)
    }

    /// PostgreSQL: numbered `$1, $2, ...` placeholders, explicit B-tree index.
    #[must_use]
    pub fn postgres() -> Self {
        Self::new("postgres", |i| format!("${}", i + 1), POSTGRES_INDEX_TEMPLATE)
    }

    /// Dialect name, for logging.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder token for the parameter at `position`.
    #[must_use]
    pub fn placeholder(&self, position: usize) -> String {
        (self.placeholder)(position)
    }

    /// Renders the index template.
    #[must_use]
    pub fn create_index(&self, name: &str, table: &str, columns: &str) -> String {
        self.index_template
            .replace("{name}", name)
            .replace("{table}", table)
            .replace("{columns}", columns)
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("index_template", &self.index_template)
            .finish_non_exhaustive()
    }
}

/// Built-in backends, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// SQLite 3.
    Sqlite,
    /// PostgreSQL.
    Postgres,
}

impl DialectKind {
    /// Infers the backend from a database URL scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split_once(':').map_or(url, |(scheme, _)| scheme);
        match scheme.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(Error::Config(format!(
                "Cannot infer dialect from URL scheme '{other}'. Valid: sqlite, postgres"
            ))),
        }
    }

    /// Returns the dialect for this backend.
    #[must_use]
    pub fn dialect(self) -> Dialect {
        match self {
            Self::Sqlite => Dialect::sqlite(),
            Self::Postgres => Dialect::postgres(),
        }
    }
}

impl From<DialectKind> for Dialect {
    fn from(kind: DialectKind) -> Self {
        kind.dialect()
    }
}
