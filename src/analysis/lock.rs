//! Process-safe mutual exclusion for analysis runs.
//!
//! At most one analysis may be in flight per project: two concurrent runs
//! would interleave partial writes to the same artifact path. The lock is an
//! OS file lock under the data directory and is released when the lock object
//! is dropped.

use crate::core::DepdocsError;
use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "analysis.lock";

/// An exclusive lock over a project's analysis run.
#[derive(Debug)]
pub struct AnalysisLock {
    _file: File,
    path: PathBuf,
}

impl AnalysisLock {
    /// Acquire the lock, blocking until any other holder releases it.
    ///
    /// File locking happens on a blocking thread via `spawn_blocking` so the
    /// tokio runtime is never stalled while waiting.
    pub async fn acquire(data_dir: &Path) -> Result<Self> {
        let lock_path = Self::lock_path(data_dir)?;
        let lock_path_clone = lock_path.clone();

        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = open_lock_file(&lock_path_clone)?;
            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire lock: {}", lock_path_clone.display()))?;
            Ok(file)
        })
        .await
        .context("Failed to spawn blocking task for lock acquisition")??;

        Ok(Self {
            _file: file,
            path: lock_path,
        })
    }

    /// Acquire the lock without waiting.
    ///
    /// Returns [`DepdocsError::AnalysisInProgress`] when another run already
    /// holds it.
    pub fn try_acquire(data_dir: &Path) -> Result<Self> {
        let lock_path = Self::lock_path(data_dir)?;
        let file = open_lock_file(&lock_path)?;

        let acquired = file
            .try_lock_exclusive()
            .with_context(|| format!("Failed to probe lock: {}", lock_path.display()))?;
        if !acquired {
            return Err(DepdocsError::AnalysisInProgress.into());
        }

        Ok(Self {
            _file: file,
            path: lock_path,
        })
    }

    fn lock_path(data_dir: &Path) -> Result<PathBuf> {
        let locks_dir = data_dir.join(".locks");
        crate::utils::ensure_dir(&locks_dir)?;
        Ok(locks_dir.join(LOCK_FILE))
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open lock file: {}", path.display()))
}

impl Drop for AnalysisLock {
    fn drop(&mut self) {
        // Released on close anyway; explicit unlock for clarity
        #[allow(unstable_name_collisions)]
        if let Err(e) = self._file.unlock() {
            tracing::warn!("Failed to unlock {}: {e}", self.path.display());
        }
    }
}
