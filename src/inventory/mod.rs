//! Dependency inventory: running the inventory command and parsing its output.
//!
//! The inventory is the only fatal failure point in the pipeline: a failing
//! command or malformed output aborts the run before anything is written.
//! Individual rows with missing fields, on the other hand, degrade to minimal
//! valid defaults rather than rejecting the whole run.

use crate::config::Config;
use crate::core::{DepdocsError, PackageKind};
use crate::record::DependencyRecord;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One row of the structured inventory output.
///
/// Field names match the inventory command's JSON output; every field except
/// the name is optional so partially-missing rows still construct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    /// Package name, `vendor/package`-shaped.
    #[serde(default)]
    pub name: Option<String>,
    /// Installed version.
    #[serde(default)]
    pub version: Option<String>,
    /// True for development-only dependencies.
    #[serde(default)]
    pub is_dev: bool,
    /// Package description.
    #[serde(default)]
    pub description: Option<String>,
    /// Package homepage.
    #[serde(default)]
    pub homepage: Option<String>,
    /// True when declared directly in the manifest.
    #[serde(default)]
    pub is_direct: bool,
    /// Source repository URL.
    #[serde(default)]
    pub source: Option<String>,
    /// True when the package is marked abandoned.
    #[serde(default)]
    pub is_abandoned: bool,
    /// Declared transitive dependency constraints.
    #[serde(default)]
    pub transitive_dependencies: BTreeMap<String, String>,
}

impl InventoryEntry {
    /// Convert an inventory row into a dependency record, falling back to
    /// minimal valid defaults for missing fields.
    fn into_record(self) -> DependencyRecord {
        let name = self.name.unwrap_or_else(|| "unknown".to_string());
        let mut record = DependencyRecord::minimal(name);
        record.version = self.version.unwrap_or_else(|| "unknown".to_string());
        record.kind = if self.is_dev {
            PackageKind::Development
        } else {
            PackageKind::Production
        };
        record.description = self.description;
        record.homepage = self.homepage;
        record.is_direct = self.is_direct;
        record.source_url = self.source;
        record.is_abandoned = self.is_abandoned;
        record.transitive_dependencies = self.transitive_dependencies;
        record
    }
}

/// Produce the initial dependency record map from the configured inventory
/// source.
///
/// A configured command takes precedence over an inventory file. Command
/// failure or malformed JSON is fatal: the error surfaces to the caller and
/// no artifact is written.
pub async fn list_dependencies(config: &Config) -> Result<BTreeMap<String, DependencyRecord>> {
    let raw = if let Some(command) = &config.inventory.command {
        run_inventory_command(command).await?
    } else if let Some(file) = &config.inventory.file {
        let path = config.project_root.join(file);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read inventory file: {}", path.display()))?
    } else {
        return Err(DepdocsError::InventoryParseError {
            reason: "no inventory command or file configured".to_string(),
        }
        .into());
    };

    parse_inventory(&raw)
}

async fn run_inventory_command(command: &str) -> Result<String> {
    debug!("Running inventory command: {command}");

    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .await
        .with_context(|| format!("Failed to spawn inventory command: {command}"))?;

    if !output.status.success() {
        return Err(DepdocsError::InventoryCommandFailed {
            command: command.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse inventory JSON into dependency records keyed by name.
///
/// Rows that fail row-level validation degrade to `unknown` defaults; only a
/// document that is not a JSON array of objects is fatal.
pub fn parse_inventory(raw: &str) -> Result<BTreeMap<String, DependencyRecord>> {
    let entries: Vec<InventoryEntry> =
        serde_json::from_str(raw).map_err(|e| DepdocsError::InventoryParseError {
            reason: e.to_string(),
        })?;

    let mut records = BTreeMap::new();
    for entry in entries {
        if entry.name.is_none() {
            warn!("Inventory row without a name; falling back to 'unknown'");
        }
        let record = entry.into_record();
        records.insert(record.name.clone(), record);
    }

    debug!("Inventory produced {} dependency records", records.len());
    Ok(records)
}
