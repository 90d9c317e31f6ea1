//! sqllsh CLI - create, fill and query SQL-backed LSH indexes.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use figment::providers::Serialized;
use serde::Serialize;
use sqllsh_core::{LshConfig, SqlLsh};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// sqllsh - locality-sensitive hashing index stored in SQLite or PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "sqllsh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = sqllsh_core::config::CONFIG_FILE)]
    config: PathBuf,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Settings that take precedence over the file and the environment.
#[derive(clap::Args, Serialize, Debug)]
struct Overrides {
    /// Database URL, e.g. sqlite://lsh.db?mode=rwc
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    database_url: Option<String>,

    /// Index table name
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<String>,

    /// Hash values per key
    #[arg(short, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<usize>,

    /// Number of hash tables
    #[arg(short, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    l: Option<usize>,

    /// SQL dialect (inferred from the URL when omitted)
    #[arg(long, global = true, value_parser = ["sqlite", "postgres"])]
    #[serde(skip_serializing_if = "Option::is_none")]
    dialect: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the generated SQL without touching the database
    Schema,
    /// Create the index table
    Create {
        /// Also build the band indexes
        #[arg(long)]
        index: bool,
    },
    /// Build one B-tree index per band
    Index,
    /// Insert entries read as JSON lines: {"id": 1, "signature": [..]}
    Insert {
        /// Input file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Entries per transaction
        #[arg(long, default_value = "1000")]
        batch_size: usize,
    },
    /// Print ids colliding with a signature, one per line
    Query {
        /// Comma-separated hash values
        #[arg(value_delimiter = ',', required = true)]
        signature: Vec<u64>,
    },
    /// Print every entry as JSON lines
    Scan,
}

fn load_config(cli: &Cli) -> Result<LshConfig> {
    let config: LshConfig = LshConfig::figment(&cli.config)
        .merge(Serialized::defaults(&cli.overrides))
        .extract()
        .context("Failed to load configuration")?;
    config.validate()?;
    Ok(config)
}

async fn open(config: &LshConfig) -> Result<SqlLsh> {
    let pool = config.connect().await.context("Failed to connect")?;
    let lsh = SqlLsh::open(config.params()?, config.table.as_str(), pool, config.dialect()?)
        .await
        .with_context(|| format!("Failed to open index table '{}'", config.table))?;
    Ok(lsh)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Command::Schema => commands::schema(&config),
        Command::Create { index } => commands::create(&config, index).await,
        Command::Index => commands::index(&open(&config).await?).await,
        Command::Insert { file, batch_size } => {
            commands::insert(&open(&config).await?, file.as_deref(), batch_size).await
        }
        Command::Query { signature } => commands::query(&open(&config).await?, &signature).await,
        Command::Scan => commands::scan(&open(&config).await?).await,
    }
}
