//! Manifest-checksum staleness gate and artifact persistence.

use anyhow::Result;
use predicates::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use depdocs_cli::analysis::Orchestrator;
use depdocs_cli::cache::QueryCache;
use depdocs_cli::render::NullRender;
use depdocs_cli::store::ArtifactStore;

use crate::common::TestProject;

fn orchestrator(project: &TestProject) -> Result<Orchestrator> {
    Orchestrator::new(
        project.config()?,
        Arc::new(NullRender),
        Arc::new(QueryCache::new(Duration::from_secs(60))),
    )
}

#[tokio::test]
async fn test_gate_opens_only_on_manifest_change() -> Result<()> {
    let project = TestProject::new()?;
    let store = ArtifactStore::new(&project.config()?);

    // No artifact yet: refresh required
    assert!(store.needs_refresh()?);
    assert!(store.stored_checksum().is_none());

    orchestrator(&project)?.run(true).await?;
    assert!(!store.needs_refresh()?);

    // Rewriting identical manifest bytes leaves the gate closed
    project.write_manifest(
        r#"{"require": {"acme/widgets": "^1.0"}, "require-dev": {"beta/tools": "^2.0"}}"#,
    )?;
    assert!(!store.needs_refresh()?);

    // A real content change opens it
    project.write_manifest(r#"{"require": {"acme/widgets": "^2.0"}}"#)?;
    assert!(store.needs_refresh()?);

    Ok(())
}

#[tokio::test]
async fn test_missing_sidecar_forces_refresh() -> Result<()> {
    let project = TestProject::new()?;
    let store = ArtifactStore::new(&project.config()?);

    orchestrator(&project)?.run(true).await?;
    assert!(!store.needs_refresh()?);

    std::fs::remove_file(project.checksum_path())?;
    assert!(store.needs_refresh()?);

    Ok(())
}

#[tokio::test]
async fn test_reanalysis_replaces_artifact_checksum() -> Result<()> {
    let project = TestProject::new()?;
    let store = ArtifactStore::new(&project.config()?);

    orchestrator(&project)?.run(true).await?;
    let first = store.stored_checksum().unwrap();

    project.write_manifest(r#"{"require": {"acme/widgets": "^2.0"}}"#)?;
    orchestrator(&project)?.run(true).await?;
    let second = store.stored_checksum().unwrap();

    assert_ne!(first, second);
    assert_eq!(store.load()?.manifest_checksum, second);
    assert!(!store.needs_refresh()?);

    Ok(())
}

#[test]
fn test_status_reports_absent_then_fresh() -> Result<()> {
    let project = TestProject::new()?;

    project
        .depdocs()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("absent"))
        .stdout(predicate::str::contains("refresh needed"));

    project.depdocs().arg("analyze").assert().success();

    project
        .depdocs()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("packages:  2"))
        .stdout(predicate::str::contains("up to date"));

    Ok(())
}
