//! The `analyze` command: trigger surface for re-analysis.

use crate::analysis::Orchestrator;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::render::NullRender;
use crate::store::ArtifactStore;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;

/// Run the staleness gate and re-analyze when required.
#[derive(Args)]
pub struct AnalyzeCommand {
    /// Re-analyze even when the manifest is unchanged
    #[arg(long)]
    force: bool,

    /// Fail fast instead of waiting for a concurrent analysis to finish
    #[arg(long)]
    no_wait: bool,

    /// Retry failed runs (queued-worker semantics, bounded attempts)
    #[arg(long)]
    retry: bool,
}

impl AnalyzeCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let store = ArtifactStore::new(config);

        if !self.force && !store.needs_refresh()? {
            println!("{} analysis is up to date", "✓".green());
            return Ok(());
        }

        let cache = Arc::new(QueryCache::new(Duration::from_secs(
            config.analysis.cache_ttl_secs,
        )));
        let orchestrator = Orchestrator::new(config.clone(), Arc::new(NullRender), cache)?;

        let artifact = if self.retry {
            orchestrator.run_with_retries().await?
        } else {
            orchestrator.run(!self.no_wait).await?
        };

        println!(
            "{} analyzed {} packages",
            "✓".green(),
            artifact.packages.len()
        );
        Ok(())
    }
}
