//! Checksum-tagged query cache coherence across re-analysis.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use depdocs_cli::analysis::Orchestrator;
use depdocs_cli::cache::QueryCache;
use depdocs_cli::render::NullRender;
use depdocs_cli::store::ArtifactStore;
use depdocs_cli::table::PackageTable;

use crate::common::TestProject;

#[tokio::test]
async fn test_cached_read_skips_recompute_for_same_checksum() -> Result<()> {
    let project = TestProject::new()?;
    let config = project.config()?;
    let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
    Orchestrator::new(config.clone(), Arc::new(NullRender), Arc::clone(&cache))?
        .run(true)
        .await?;

    let store = ArtifactStore::new(&config);
    let checksum = store.stored_checksum().unwrap();
    let computes = AtomicUsize::new(0);

    let key = QueryCache::key("list", &["", "", "Asc", "", "0"]);
    for _ in 0..3 {
        let rows = cache.get_or_compute(&key, &checksum, || {
            computes.fetch_add(1, Ordering::SeqCst);
            let table = PackageTable::load(&store)?;
            Ok(serde_json::json!(table.all().len()))
        })?;
        assert_eq!(rows.as_ref(), &serde_json::json!(2));
    }
    assert_eq!(computes.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_stale_entry_recomputed_after_reanalysis() -> Result<()> {
    let project = TestProject::new()?;
    let config = project.config()?;
    let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
    let store = ArtifactStore::new(&config);

    Orchestrator::new(config.clone(), Arc::new(NullRender), Arc::clone(&cache))?
        .run(true)
        .await?;
    let old_checksum = store.stored_checksum().unwrap();

    let key = QueryCache::key("top", &["10"]);
    cache.get_or_compute(&key, &old_checksum, || Ok(serde_json::json!("old")))?;

    // Manifest shrinks to one package and the orchestrator re-runs; the new
    // run drops every pre-refresh entry
    project.write_manifest(r#"{"require": {"acme/widgets": "^1.0"}}"#)?;
    project.write_inventory(
        r#"[{"name": "acme/widgets", "version": "1.2.3", "isDirect": true}]"#,
    )?;
    Orchestrator::new(config.clone(), Arc::new(NullRender), Arc::clone(&cache))?
        .run(true)
        .await?;
    let new_checksum = store.stored_checksum().unwrap();
    assert_ne!(old_checksum, new_checksum);

    let computes = AtomicUsize::new(0);
    let value = cache.get_or_compute(&key, &new_checksum, || {
        computes.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!("new"))
    })?;
    assert_eq!(value.as_ref(), &serde_json::json!("new"));
    assert_eq!(computes.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_rerun_with_unchanged_manifest_drops_cached_reads() -> Result<()> {
    let project = TestProject::new()?;
    let config = project.config()?;
    let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
    let store = ArtifactStore::new(&config);
    let orch = Orchestrator::new(config.clone(), Arc::new(NullRender), Arc::clone(&cache))?;
    orch.run(true).await?;

    let checksum = store.stored_checksum().unwrap();
    let key = QueryCache::key("list", &[]);
    let count = cache.get_or_compute(&key, &checksum, || {
        let table = PackageTable::load(&store)?;
        Ok(serde_json::json!(table.all().len()))
    })?;
    assert_eq!(count.as_ref(), &serde_json::json!(2));

    // The installed dependency set grows while the manifest bytes stay
    // identical, then a second run persists a three-package artifact
    project.write_inventory(
        r#"[{"name": "acme/widgets", "version": "1.2.3", "isDirect": true},
            {"name": "beta/tools", "version": "2.0.0", "isDev": true},
            {"name": "gamma/extra", "version": "3.0.0"}]"#,
    )?;
    orch.run(true).await?;
    assert_eq!(store.stored_checksum().unwrap(), checksum);

    // Same key, same checksum tag: the read still sees the refreshed artifact
    let count = cache.get_or_compute(&key, &checksum, || {
        let table = PackageTable::load(&store)?;
        Ok(serde_json::json!(table.all().len()))
    })?;
    assert_eq!(count.as_ref(), &serde_json::json!(3));

    Ok(())
}

#[tokio::test]
async fn test_failed_compute_is_not_cached() -> Result<()> {
    let cache = QueryCache::new(Duration::from_secs(60));
    let key = QueryCache::key("show", &["acme/widgets"]);

    let failed: Result<_> =
        cache.get_or_compute(&key, "sha256:abc", || anyhow::bail!("artifact missing"));
    assert!(failed.is_err());
    assert!(cache.is_empty());

    let value = cache.get_or_compute(&key, "sha256:abc", || Ok(serde_json::json!(1)))?;
    assert_eq!(value.as_ref(), &serde_json::json!(1));

    Ok(())
}
