//! End-to-end analysis runs through the depdocs binary.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_analyze_produces_ranked_artifact() -> Result<()> {
    let project = TestProject::new()?;

    project
        .depdocs()
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyzed 2 packages"));

    let artifact: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(project.artifact_path())?)?;
    let packages = &artifact["packages"];

    // The referenced package outranks the unreferenced one
    assert_eq!(packages["acme/widgets"]["rank"], 1);
    assert_eq!(packages["acme/widgets"]["usageCount"], 1);
    assert_eq!(packages["beta/tools"]["rank"], 2);
    assert_eq!(packages["beta/tools"]["usageCount"], 0);
    assert_eq!(packages["beta/tools"]["kind"], "development");

    // Checksum sidecar tags the artifact with the manifest state
    let sidecar = std::fs::read_to_string(project.checksum_path())?;
    assert!(sidecar.starts_with("sha256:"), "unexpected sidecar: {sidecar}");
    assert_eq!(artifact["manifestChecksum"].as_str(), Some(sidecar.trim()));

    Ok(())
}

#[test]
fn test_analyze_copies_docs_and_logo_into_storage() -> Result<()> {
    let project = TestProject::new()?;
    project.depdocs().arg("analyze").assert().success();

    let storage = project.root().join("public/storage/packages/acme/widgets");
    assert!(storage.join("README.md").is_file());
    assert!(storage.join("docs/usage.md").is_file());
    assert!(storage.join("art/logo.png").is_file());

    let artifact: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(project.artifact_path())?)?;
    let logo = &artifact["packages"]["acme/widgets"]["logo"];
    assert_eq!(logo["isPlaceholder"], false);
    assert_eq!(
        logo["storedUrl"].as_str(),
        Some("/storage/packages/acme/widgets/art/logo.png")
    );

    Ok(())
}

#[test]
fn test_second_analyze_skips_when_fresh() -> Result<()> {
    let project = TestProject::new()?;
    project.depdocs().arg("analyze").assert().success();

    project
        .depdocs()
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));

    Ok(())
}

#[test]
fn test_force_reanalyzes_fresh_project() -> Result<()> {
    let project = TestProject::new()?;
    project.depdocs().arg("analyze").assert().success();

    project
        .depdocs()
        .args(["analyze", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("analyzed 2 packages"));

    Ok(())
}

#[test]
fn test_malformed_inventory_fails_without_artifact() -> Result<()> {
    let project = TestProject::new()?;
    project.write_inventory("not json at all")?;

    project.depdocs().arg("analyze").assert().failure();
    assert!(!project.artifact_path().exists());
    assert!(!project.checksum_path().exists());

    Ok(())
}

#[test]
fn test_analyze_with_retry_flag_succeeds() -> Result<()> {
    let project = TestProject::new()?;

    project
        .depdocs()
        .args(["analyze", "--retry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("analyzed 2 packages"));

    Ok(())
}
