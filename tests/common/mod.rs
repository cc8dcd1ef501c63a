//! Common test utilities for depdocs integration tests
//!
//! Provides a `TestProject` fixture: a temporary project tree with a
//! dependency manifest, a file-backed inventory, source code that references
//! one dependency, and an installed-dependencies tree with documentation and
//! a logo. The registry endpoint points at an unroutable address so every
//! test runs offline.

// Allow dead code because these utilities are shared across test files and
// not every helper is used in every file
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A self-contained project fixture for exercising the depdocs binary and
/// library against a realistic dependency tree.
pub struct TestProject {
    temp: TempDir,
    config_path: PathBuf,
}

impl TestProject {
    /// Create a fixture project with two dependencies: `acme/widgets`
    /// (direct, referenced from source, documented, with a logo) and
    /// `beta/tools` (development, unreferenced, no installed tree).
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let root = temp.path();

        fs::write(
            root.join("composer.json"),
            r#"{"require": {"acme/widgets": "^1.0"}, "require-dev": {"beta/tools": "^2.0"}}"#,
        )?;
        fs::write(
            root.join("inventory.json"),
            r#"[
                {"name": "acme/widgets", "version": "1.2.3", "isDirect": true,
                 "description": "Widget toolkit"},
                {"name": "beta/tools", "version": "2.0.0", "isDev": true}
            ]"#,
        )?;

        let src = root.join("src");
        fs::create_dir_all(&src)?;
        fs::write(
            src.join("Main.php"),
            "<?php\nuse Acme\\Widgets\\Button;\n\nnew Button();\n",
        )?;

        let vendor = root.join("vendor/acme/widgets");
        fs::create_dir_all(vendor.join("docs"))?;
        fs::create_dir_all(vendor.join("art"))?;
        fs::write(vendor.join("README.md"), "# Widgets\n\nA widget toolkit.\n")?;
        fs::write(vendor.join("docs/usage.md"), "## Usage\n")?;
        fs::write(vendor.join("art/logo.png"), b"\x89PNG fake")?;

        let config_path = root.join("depdocs.toml");
        fs::write(
            &config_path,
            format!(
                r#"project_root = "{root}"
source_roots = ["src"]
source_extensions = ["php"]

[inventory]
file = "inventory.json"

[registry]
base_url = "http://127.0.0.1:1"
request_timeout_secs = 1
max_parallel = 2

[analysis]
timeout_secs = 60
max_attempts = 2
"#,
                root = root.display()
            ),
        )?;

        Ok(Self { temp, config_path })
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Path to the generated `depdocs.toml`.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Path where the consolidated artifact lands after analysis.
    pub fn artifact_path(&self) -> PathBuf {
        self.root().join("data/dependencies.json")
    }

    /// Path of the manifest checksum sidecar.
    pub fn checksum_path(&self) -> PathBuf {
        self.root().join("data/dependencies.json.checksum")
    }

    /// Overwrite the dependency manifest.
    pub fn write_manifest(&self, content: &str) -> Result<()> {
        fs::write(self.root().join("composer.json"), content)?;
        Ok(())
    }

    /// Overwrite the file-backed inventory.
    pub fn write_inventory(&self, content: &str) -> Result<()> {
        fs::write(self.root().join("inventory.json"), content)?;
        Ok(())
    }

    /// A `depdocs` command pre-configured against this project.
    pub fn depdocs(&self) -> Command {
        let mut cmd = Command::cargo_bin("depdocs").expect("depdocs binary should build");
        cmd.arg("--config").arg(&self.config_path);
        cmd.env_remove("DEPDOCS_CONFIG_PATH");
        cmd
    }

    /// The same configuration as `depdocs.toml`, as a typed value for
    /// library-level tests.
    pub fn config(&self) -> Result<depdocs_cli::config::Config> {
        depdocs_cli::config::Config::load(Some(&self.config_path))
    }
}
