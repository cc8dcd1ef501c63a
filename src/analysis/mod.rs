//! Analysis orchestration: the full pipeline from inventory to artifact.
//!
//! The orchestrator sequences the pipeline phases, each shaped as
//! `Phase(records) -> records`:
//!
//! 1. Inventory (fatal on failure, nothing written)
//! 2. Usage analysis over the source tree
//! 3. Asset extraction from the installed-dependencies tree
//! 4. Registry enrichment
//!
//! then sorts by usage count, assigns ranks, persists the artifact atomically
//! with its checksum sidecar, and clears the query cache. The whole run
//! is guarded by an exclusive per-project lock and a hard timeout; an aborted
//! run leaves the previous artifact authoritative.

pub mod lock;

pub use lock::AnalysisLock;

use crate::cache::QueryCache;
use crate::config::Config;
use crate::core::DepdocsError;
use crate::record::AnalysisArtifact;
use crate::registry::RegistryClient;
use crate::render::MarkdownRender;
use crate::store::ArtifactStore;
use crate::usage::{SubstringMatcher, UsageMatcher};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{info, warn};

/// Sequences the pipeline phases and owns persistence and cache clearing.
pub struct Orchestrator {
    config: Config,
    store: ArtifactStore,
    registry: RegistryClient,
    renderer: Arc<dyn MarkdownRender>,
    matcher: Arc<dyn UsageMatcher>,
    cache: Arc<QueryCache>,
    /// Client for logo downloads; separate from the registry client so asset
    /// extraction and enrichment tune their timeouts independently.
    asset_client: reqwest::Client,
}

impl Orchestrator {
    /// Build an orchestrator with the default substring usage matcher.
    pub fn new(
        config: Config,
        renderer: Arc<dyn MarkdownRender>,
        cache: Arc<QueryCache>,
    ) -> Result<Self> {
        let store = ArtifactStore::new(&config);
        let registry = RegistryClient::new(&config.registry)?;
        let asset_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.registry.request_timeout_secs))
            .build()
            .context("Failed to build asset HTTP client")?;

        Ok(Self {
            config,
            store,
            registry,
            renderer,
            matcher: Arc::new(SubstringMatcher),
            cache,
            asset_client,
        })
    }

    /// Replace the usage matcher (for stricter analyzers or tests).
    #[must_use]
    pub fn with_matcher(mut self, matcher: Arc<dyn UsageMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// The staleness gate for this project.
    pub fn needs_refresh(&self) -> Result<bool> {
        self.store.needs_refresh()
    }

    /// Run one full analysis under the exclusive lock and the hard timeout.
    ///
    /// With `wait` false the call fails fast with
    /// [`DepdocsError::AnalysisInProgress`] instead of queueing behind another
    /// run.
    pub async fn run(&self, wait: bool) -> Result<AnalysisArtifact> {
        let _lock = if wait {
            AnalysisLock::acquire(&self.config.data_dir()).await?
        } else {
            AnalysisLock::try_acquire(&self.config.data_dir())?
        };

        let timeout = Duration::from_secs(self.config.analysis.timeout_secs);
        match tokio::time::timeout(timeout, self.run_pipeline()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Analysis aborted after {}s; previous artifact remains", timeout.as_secs());
                Err(DepdocsError::AnalysisTimeout {
                    secs: timeout.as_secs(),
                }
                .into())
            }
        }
    }

    /// Queued path: run with bounded retries.
    ///
    /// Produces byte-identical artifacts to [`run`](Self::run) for identical
    /// inputs; only the retry envelope differs.
    pub async fn run_with_retries(&self) -> Result<AnalysisArtifact> {
        let attempts = self.config.analysis.max_attempts.max(1);
        let strategy = ExponentialBackoff::from_millis(500).take(attempts - 1);

        Retry::spawn(strategy, || self.run(true)).await
    }

    async fn run_pipeline(&self) -> Result<AnalysisArtifact> {
        // Hash the manifest up front: the checksum must describe the manifest
        // as it was when this run read it
        let manifest_checksum = self.store.manifest_checksum()?;

        let records = crate::inventory::list_dependencies(&self.config).await?;
        info!("Analyzing {} dependencies", records.len());

        let records =
            crate::usage::analyze(records, &self.config, Arc::clone(&self.matcher)).await?;
        let records = crate::assets::extract_all(
            records,
            &self.config,
            self.renderer.as_ref(),
            &self.asset_client,
        )
        .await?;
        let records = crate::registry::enrich_all(records, &self.registry).await?;

        let mut artifact = AnalysisArtifact {
            generated_at: chrono::Utc::now().to_rfc3339(),
            manifest_checksum,
            packages: records,
        };
        artifact.assign_ranks();

        self.store.persist(&artifact)?;
        // A forced re-run can replace the artifact with the manifest checksum
        // unchanged, so drop everything rather than filtering by checksum
        self.cache.clear();

        info!("Analysis complete: {} packages ranked", artifact.packages.len());
        Ok(artifact)
    }
}
