//! Artifact persistence and the staleness gate.
//!
//! The consolidated artifact is one JSON document plus a checksum sidecar.
//! Writes use replace semantics (write-new-then-rename) so a reader never
//! observes a half-written artifact; the sidecar is written immediately after
//! the artifact and is the sole freshness signal the gate consults.

use crate::config::Config;
use crate::core::DepdocsError;
use crate::record::AnalysisArtifact;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compute the SHA-256 checksum of a file's bytes in `sha256:<hex>` format.
pub fn compute_checksum(path: &Path) -> Result<String> {
    let content = std::fs::read(path)
        .with_context(|| format!("Cannot read file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&content);
    let result = hasher.finalize();

    Ok(format!("sha256:{}", hex::encode(result)))
}

/// Reads and writes the consolidated artifact and its checksum sidecar.
pub struct ArtifactStore {
    artifact_path: PathBuf,
    checksum_path: PathBuf,
    manifest_path: PathBuf,
}

impl ArtifactStore {
    /// Build a store from the configured paths.
    pub fn new(config: &Config) -> Self {
        Self {
            artifact_path: config.artifact_path(),
            checksum_path: config.checksum_path(),
            manifest_path: config.manifest_path(),
        }
    }

    /// Checksum of the dependency manifest as it exists right now.
    pub fn manifest_checksum(&self) -> Result<String> {
        if !self.manifest_path.exists() {
            return Err(DepdocsError::ManifestNotFound {
                path: self.manifest_path.display().to_string(),
            }
            .into());
        }
        compute_checksum(&self.manifest_path)
    }

    /// Persist the artifact atomically, then its checksum sidecar.
    ///
    /// The sidecar is written second: if the process dies between the two
    /// writes, the stale sidecar simply forces the next run to re-analyze.
    pub fn persist(&self, artifact: &AnalysisArtifact) -> Result<()> {
        let json = serde_json::to_vec_pretty(artifact)
            .context("Failed to serialize analysis artifact")?;

        crate::utils::atomic_write(&self.artifact_path, &json)?;
        crate::utils::safe_write(&self.checksum_path, &artifact.manifest_checksum)?;

        debug!(
            "Persisted artifact with {} packages to {}",
            artifact.packages.len(),
            self.artifact_path.display()
        );
        Ok(())
    }

    /// Load the persisted artifact.
    ///
    /// Loads fresh from disk on every call so orchestrator rewrites are
    /// immediately visible to readers.
    pub fn load(&self) -> Result<AnalysisArtifact> {
        if !self.artifact_path.exists() {
            return Err(DepdocsError::ArtifactMissing {
                path: self.artifact_path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(&self.artifact_path)
            .with_context(|| format!("Failed to read artifact: {}", self.artifact_path.display()))?;

        let artifact: AnalysisArtifact =
            serde_json::from_str(&content).map_err(|e| DepdocsError::ArtifactParseError {
                reason: e.to_string(),
            })?;

        Ok(artifact)
    }

    /// The stored sidecar checksum, if present.
    pub fn stored_checksum(&self) -> Option<String> {
        std::fs::read_to_string(&self.checksum_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Staleness gate: does the artifact need to be rebuilt?
    ///
    /// True when the sidecar is absent, the artifact is absent, or the stored
    /// checksum differs from a fresh hash of the manifest. This is the only
    /// freshness signal consulted before serving; it is intentionally
    /// insensitive to source-file changes that leave the manifest untouched.
    pub fn needs_refresh(&self) -> Result<bool> {
        if !self.artifact_path.exists() {
            return Ok(true);
        }

        let Some(stored) = self.stored_checksum() else {
            return Ok(true);
        };

        let current = self.manifest_checksum()?;
        Ok(stored != current)
    }
}
