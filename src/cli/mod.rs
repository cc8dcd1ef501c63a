//! Command-line interface for depdocs.
//!
//! Subcommands:
//! - `analyze` - run the staleness gate and re-analyze when needed
//! - `status` - show the gate verdict and artifact summary
//! - `list` - filtered, sorted, paginated package listing
//! - `show` - one package's full record
//! - `top` - top-N packages by usage rank
//! - `logos` - packages with discovered (non-placeholder) logos

mod analyze;
mod list;
mod logos;
mod show;
mod status;
mod top;

use crate::cache::QueryCache;
use crate::config::Config;
use crate::store::ArtifactStore;
use crate::table::PackageTable;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Dependency documentation extraction and caching pipeline.
#[derive(Parser)]
#[command(name = "depdocs", version, about, long_about = None)]
pub struct Cli {
    /// Path to depdocs.toml (defaults to ./depdocs.toml)
    #[arg(long, global = true, env = "DEPDOCS_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run analysis if the manifest changed (or unconditionally with --force)
    Analyze(analyze::AnalyzeCommand),
    /// Show staleness gate verdict and artifact summary
    Status(status::StatusCommand),
    /// List packages with filtering, sorting, and pagination
    List(list::ListCommand),
    /// Show one package's record
    Show(show::ShowCommand),
    /// Top N packages by usage rank
    Top(top::TopCommand),
    /// Packages with discovered logos
    Logos(logos::LogosCommand),
}

impl Cli {
    /// Parse configuration and dispatch to the selected command.
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Analyze(cmd) => cmd.execute(&config).await,
            Commands::Status(cmd) => cmd.execute(&config),
            Commands::List(cmd) => cmd.execute(&config),
            Commands::Show(cmd) => cmd.execute(&config),
            Commands::Top(cmd) => cmd.execute(&config),
            Commands::Logos(cmd) => cmd.execute(&config),
        }
    }
}

/// Shared read-path wiring: artifact store, query cache, current checksum tag.
pub(crate) struct ReadContext {
    pub store: ArtifactStore,
    pub cache: Arc<QueryCache>,
    pub checksum: String,
}

impl ReadContext {
    pub fn new(config: &Config) -> Self {
        let store = ArtifactStore::new(config);
        let cache = Arc::new(QueryCache::new(Duration::from_secs(
            config.analysis.cache_ttl_secs,
        )));
        let checksum = store.stored_checksum().unwrap_or_default();
        Self {
            store,
            cache,
            checksum,
        }
    }

    /// Load a fresh table snapshot.
    pub fn table(&self) -> Result<PackageTable> {
        PackageTable::load(&self.store)
    }
}

/// Output format for read commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON document
    Json,
}

/// Print a package listing in the selected format.
pub(crate) fn print_rows(rows: &serde_json::Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Table => {
            let Some(rows) = rows.as_array() else {
                println!("{rows}");
                return Ok(());
            };
            println!("{:<5} {:<40} {:<12} {:<12} {:>6}", "RANK", "PACKAGE", "VERSION", "KIND", "USED");
            for row in rows {
                println!(
                    "{:<5} {:<40} {:<12} {:<12} {:>6}",
                    row["rank"].as_u64().unwrap_or(0),
                    row["name"].as_str().unwrap_or("?"),
                    row["version"].as_str().unwrap_or("?"),
                    row["kind"].as_str().unwrap_or("?"),
                    row["usageCount"].as_u64().unwrap_or(0),
                );
            }
        }
    }
    Ok(())
}

/// Project the listing fields out of full records.
pub(crate) fn listing_value(rows: &[&crate::record::DependencyRecord]) -> serde_json::Value {
    serde_json::Value::Array(
        rows.iter()
            .map(|r| {
                serde_json::json!({
                    "rank": r.rank,
                    "name": r.name,
                    "version": r.version,
                    "kind": r.kind,
                    "usageCount": r.usage_count,
                    "latestVersion": r.latest_version,
                    "hasNewerVersion": r.has_newer_version,
                })
            })
            .collect(),
    )
}
