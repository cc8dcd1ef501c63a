//! Registry enrichment: package metadata and download statistics.
//!
//! For each dependency the enricher queries the registry's
//! `GET /packages/{name}.json` and `GET /packages/{name}/stats.json`
//! endpoints. Each endpoint response is cached per package name with a fixed
//! TTL so repeated runs within the window reuse prior responses.
//!
//! Enrichment is strictly best-effort: failures are captured as typed
//! [`DepdocsError::EnrichmentError`] values, logged so failure rates stay
//! observable, and swallowed functionally; the affected package simply keeps
//! its enrichment fields absent. Calls run on a bounded worker pool with a
//! per-request timeout and transient-failure retries.

use crate::config::RegistryConfig;
use crate::core::DepdocsError;
use crate::record::{DependencyRecord, DownloadStats};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use semver::Version;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

/// What one successful enrichment pass learned about a package.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    /// Repository URL reported by the registry.
    pub repository: Option<String>,
    /// Maintainer names.
    pub maintainers: Vec<String>,
    /// Newest non-development version by publish time.
    pub latest_version: Option<String>,
    /// Download statistics.
    pub downloads: Option<DownloadStats>,
}

/// HTTP client for the package registry with per-endpoint TTL caching.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    ttl: Duration,
    max_parallel: usize,
    cache: DashMap<String, (Instant, Value)>,
}

impl RegistryClient {
    /// Build a client from registry configuration.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build registry HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ttl: Duration::from_secs(config.ttl_secs),
            max_parallel: config.max_parallel.max(1),
            cache: DashMap::new(),
        })
    }

    /// Fetch both endpoints for one package and merge the result.
    pub async fn enrich_package(&self, name: &str) -> Result<Enrichment, DepdocsError> {
        let metadata = self
            .cached_get(&format!("meta:{name}"), &format!("{}/packages/{name}.json", self.base_url))
            .await
            .map_err(|e| DepdocsError::EnrichmentError {
                package: name.to_string(),
                reason: e.to_string(),
            })?;

        let mut enrichment = parse_metadata(&metadata);

        // Stats failures degrade to metadata-only enrichment
        match self
            .cached_get(
                &format!("stats:{name}"),
                &format!("{}/packages/{name}/stats.json", self.base_url),
            )
            .await
        {
            Ok(stats) => enrichment.downloads = parse_stats(&stats),
            Err(e) => {
                warn!("Download stats unavailable for {name}: {e}");
            }
        }

        Ok(enrichment)
    }

    /// GET a JSON document with TTL caching and bounded retries.
    async fn cached_get(&self, key: &str, url: &str) -> Result<Value> {
        if let Some(entry) = self.cache.get(key) {
            let (inserted_at, value) = entry.value();
            if inserted_at.elapsed() < self.ttl {
                debug!("Registry cache hit for {key}");
                return Ok(value.clone());
            }
        }

        let strategy = ExponentialBackoff::from_millis(100).map(jitter).take(2);
        let value = Retry::spawn(strategy, || async {
            self.client
                .get(url)
                .send()
                .await
                .with_context(|| format!("Request failed: {url}"))?
                .error_for_status()
                .with_context(|| format!("Non-success status from {url}"))?
                .json::<Value>()
                .await
                .with_context(|| format!("Invalid JSON from {url}"))
        })
        .await?;

        self.cache.insert(key.to_string(), (Instant::now(), value.clone()));
        Ok(value)
    }
}

/// Enrich every record from the registry.
///
/// `Phase(records) -> records`: independent, idempotent calls fanned out over
/// a bounded worker pool; failures leave the package unenriched.
pub async fn enrich_all(
    records: BTreeMap<String, DependencyRecord>,
    registry: &RegistryClient,
) -> Result<BTreeMap<String, DependencyRecord>> {
    let results: Vec<(String, DependencyRecord)> = stream::iter(records.into_iter())
        .map(|(name, mut record)| async move {
            match registry.enrich_package(&name).await {
                Ok(enrichment) => apply_enrichment(&mut record, &enrichment),
                Err(e) => warn!("{e}"),
            }
            (name, record)
        })
        .buffer_unordered(registry.max_parallel)
        .collect()
        .await;

    Ok(results.into_iter().collect())
}

/// Merge an enrichment into a record, computing `has_newer_version`.
pub fn apply_enrichment(record: &mut DependencyRecord, enrichment: &Enrichment) {
    record.registry_repository = enrichment.repository.clone();
    record.registry_maintainers = enrichment.maintainers.clone();
    record.latest_version = enrichment.latest_version.clone();
    record.download_stats = enrichment.downloads;
    record.has_newer_version = match &enrichment.latest_version {
        Some(latest) => is_newer(latest, &record.version),
        None => false,
    };
}

/// Parse the package-metadata endpoint response.
fn parse_metadata(value: &Value) -> Enrichment {
    let package = &value["package"];

    let repository = package["repository"].as_str().map(ToString::to_string);

    let maintainers = package["maintainers"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|m| m["name"].as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default();

    let latest_version = package["versions"].as_object().and_then(|versions| {
        versions
            .iter()
            .filter(|(version, _)| !is_dev_version(version))
            .filter_map(|(version, data)| {
                let time = data["time"]
                    .as_str()
                    .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                    .map(|t| t.with_timezone(&Utc));
                Some((version.clone(), time?))
            })
            .max_by_key(|(_, time)| *time)
            .map(|(version, _)| version)
    });

    Enrichment {
        repository,
        maintainers,
        latest_version,
        downloads: None,
    }
}

/// Parse the downloads-statistics endpoint response.
fn parse_stats(value: &Value) -> Option<DownloadStats> {
    let downloads = value.get("downloads")?;
    Some(DownloadStats {
        total: downloads["total"].as_u64().unwrap_or(0),
        monthly: downloads["monthly"].as_u64().unwrap_or(0),
        daily: downloads["daily"].as_u64().unwrap_or(0),
    })
}

/// True for development version strings (`dev-main`, `1.x-dev`, ...).
fn is_dev_version(version: &str) -> bool {
    version.starts_with("dev-") || version.ends_with("-dev")
}

/// Semantic comparison of the registry's latest version against the installed
/// version after stripping constraint operators.
///
/// Non-semver strings on either side compare false.
pub fn is_newer(latest: &str, installed: &str) -> bool {
    let Some(latest) = parse_version(latest) else {
        return false;
    };
    let Some(installed) = parse_version(installed) else {
        return false;
    };
    latest > installed
}

fn parse_version(raw: &str) -> Option<Version> {
    let cleaned = raw
        .trim()
        .trim_start_matches(|c| matches!(c, '^' | '~' | '>' | '<' | '=' | 'v' | ' '));
    Version::parse(cleaned).ok()
}
