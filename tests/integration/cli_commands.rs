//! Read-side CLI commands against an analyzed project.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

fn analyzed_project() -> Result<TestProject> {
    let project = TestProject::new()?;
    project.depdocs().arg("analyze").assert().success();
    Ok(project)
}

#[test]
fn test_list_json_is_rank_ordered() -> Result<()> {
    let project = analyzed_project()?;

    let output = project.depdocs().args(["list", "--format", "json"]).assert().success();
    let rows: serde_json::Value =
        serde_json::from_slice(&output.get_output().stdout)?;

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "acme/widgets");
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[1]["name"], "beta/tools");

    Ok(())
}

#[test]
fn test_list_filters_by_kind() -> Result<()> {
    let project = analyzed_project()?;

    let output = project
        .depdocs()
        .args(["list", "--kind", "development", "--format", "json"])
        .assert()
        .success();
    let rows: serde_json::Value = serde_json::from_slice(&output.get_output().stdout)?;

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "beta/tools");
    assert_eq!(rows[0]["kind"], "development");

    Ok(())
}

#[test]
fn test_list_unknown_sort_key_falls_back_to_rank() -> Result<()> {
    let project = analyzed_project()?;

    let output = project
        .depdocs()
        .args(["list", "--sort", "bogus", "--direction", "desc", "--format", "json"])
        .assert()
        .success();
    let rows: serde_json::Value = serde_json::from_slice(&output.get_output().stdout)?;

    // Fallback overrides the requested direction too
    assert_eq!(rows[0]["rank"], 1);

    Ok(())
}

#[test]
fn test_show_readme_prints_raw_markdown() -> Result<()> {
    let project = analyzed_project()?;

    project
        .depdocs()
        .args(["show", "acme/widgets", "--readme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Widgets"));

    Ok(())
}

#[test]
fn test_show_full_record_includes_references() -> Result<()> {
    let project = analyzed_project()?;

    let output = project.depdocs().args(["show", "acme/widgets"]).assert().success();
    let record: serde_json::Value = serde_json::from_slice(&output.get_output().stdout)?;

    assert_eq!(record["usageCount"], 1);
    assert_eq!(record["referencingFiles"][0]["relativePath"], "src/Main.php");
    assert!(
        record["referencingFiles"][0]["editorLink"]
            .as_str()
            .unwrap()
            .starts_with("vscode://file/")
    );

    Ok(())
}

#[test]
fn test_show_file_prints_one_doc_file() -> Result<()> {
    let project = analyzed_project()?;

    project
        .depdocs()
        .args(["show", "acme/widgets", "--file", "docs/usage.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Usage"));

    project
        .depdocs()
        .args(["show", "acme/widgets", "--file", "docs/missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No documentation file"));

    Ok(())
}

#[test]
fn test_show_unknown_package_fails() -> Result<()> {
    let project = analyzed_project()?;

    project
        .depdocs()
        .args(["show", "nope/nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Package not found"));

    Ok(())
}

#[test]
fn test_top_limits_row_count() -> Result<()> {
    let project = analyzed_project()?;

    let output = project
        .depdocs()
        .args(["top", "1", "--format", "json"])
        .assert()
        .success();
    let rows: serde_json::Value = serde_json::from_slice(&output.get_output().stdout)?;

    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["name"], "acme/widgets");

    Ok(())
}

#[test]
fn test_logos_excludes_placeholders() -> Result<()> {
    let project = analyzed_project()?;

    let output = project.depdocs().arg("logos").assert().success();
    let rows: serde_json::Value = serde_json::from_slice(&output.get_output().stdout)?;

    // beta/tools has no installed tree, so only the real widgets logo shows
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "acme/widgets");
    assert_eq!(
        rows[0]["logoUrl"],
        "/storage/packages/acme/widgets/art/logo.png"
    );

    Ok(())
}

#[test]
fn test_reads_before_analysis_suggest_analyze() -> Result<()> {
    let project = TestProject::new()?;

    project
        .depdocs()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("depdocs analyze"));

    Ok(())
}
