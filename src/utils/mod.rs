//! Cross-platform utilities shared across the pipeline.
//!
//! - [`fs`] - Atomic file operations and directory helpers
//! - [`normalize_path_for_storage`] - Forward-slash path normalization for
//!   storage keys and URLs

pub mod fs;

pub use fs::{atomic_write, copy_file, ensure_dir, safe_write};

use std::path::Path;

/// Normalize a path to forward slashes for storage keys and URLs.
///
/// Artifact contents must be byte-identical across platforms, so every path
/// that ends up in the artifact or in a storage URL goes through this.
pub fn normalize_path_for_storage(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
