//! Shared data model for the analysis pipeline.
//!
//! A [`DependencyRecord`] accumulates fields across the pipeline phases
//! (inventory, usage, assets, enrichment); each phase takes ownership of the
//! record map and returns it, so no record is ever shared mutably across
//! workers. The consolidated [`AnalysisArtifact`] is the single persisted
//! snapshot of all records.
//!
//! Field names serialize as camelCase to keep the artifact document stable for
//! downstream consumers.

use crate::core::PackageKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A source file that references a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Path relative to the project root, forward slashes.
    pub relative_path: String,
    /// Editor deep-link URI for developer convenience.
    pub editor_link: String,
}

/// A documentation file copied into durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocFile {
    /// Path relative to the dependency's installed root, forward slashes.
    pub relative_path: String,
    /// Path of the stored copy, relative to the storage root.
    pub stored_path: String,
    /// Public URL of the stored copy.
    pub stored_url: String,
    /// Raw markdown content.
    pub raw_content: String,
    /// Rendered HTML; only populated for readme files.
    pub rendered_html: Option<String>,
}

/// A resolved package logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    /// Where the logo came from: a vendor-tree path, a remote URL, or
    /// `generated` for the placeholder.
    pub source_path: String,
    /// Path of the stored copy, relative to the storage root.
    pub stored_path: String,
    /// Public URL of the stored copy.
    pub stored_url: String,
    /// True when this is the deterministic generated placeholder.
    pub is_placeholder: bool,
}

/// Registry download statistics for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DownloadStats {
    /// All-time downloads.
    pub total: u64,
    /// Downloads in the last month.
    pub monthly: u64,
    /// Downloads in the last day.
    pub daily: u64,
}

/// Directory-to-filenames trie derived from documentation file paths.
///
/// Subdirectories live under their own `dirs` key rather than being flattened
/// into the node, so a documentation directory literally named `files` cannot
/// collide with the filename list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DocTree {
    /// Filenames directly in this directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Subdirectories keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dirs: BTreeMap<String, DocTree>,
}

impl DocTree {
    /// Insert a forward-slash relative path into the trie.
    pub fn insert(&mut self, relative_path: &str) {
        let mut node = self;
        let mut parts = relative_path.split('/').peekable();

        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                node.files.push(part.to_string());
            } else {
                node = node.dirs.entry(part.to_string()).or_default();
            }
        }
    }

    /// True when the trie holds no files at any depth.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.values().all(Self::is_empty)
    }
}

/// One declared dependency and everything the pipeline learned about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// Unique `vendor/package`-shaped name.
    pub name: String,
    /// Installed version or declared constraint.
    pub version: String,
    /// Production or development dependency.
    pub kind: PackageKind,
    /// Number of distinct source files referencing this dependency.
    pub usage_count: u64,
    /// Referencing files, deduplicated by relative path, sorted.
    pub referencing_files: Vec<FileRef>,
    /// Documentation files in enumeration order.
    pub documentation_files: Vec<DocFile>,
    /// Directory trie over `documentation_files`.
    pub documentation_tree: DocTree,
    /// Discovered or generated logo.
    pub logo: Option<Logo>,
    /// Package description from the inventory.
    pub description: Option<String>,
    /// Package homepage from the inventory.
    pub homepage: Option<String>,
    /// True when declared directly in the manifest.
    pub is_direct: bool,
    /// Source repository URL from the inventory.
    pub source_url: Option<String>,
    /// True when the package is marked abandoned.
    pub is_abandoned: bool,
    /// Declared transitive dependency constraints, name to constraint string.
    pub transitive_dependencies: BTreeMap<String, String>,
    /// Repository URL reported by the registry.
    pub registry_repository: Option<String>,
    /// Maintainer names reported by the registry.
    pub registry_maintainers: Vec<String>,
    /// Newest non-development version on the registry.
    pub latest_version: Option<String>,
    /// True when `latest_version` is semver-newer than the installed version.
    pub has_newer_version: bool,
    /// Registry download statistics.
    pub download_stats: Option<DownloadStats>,
    /// 1-based position by descending usage count; 0 until assigned.
    pub rank: u64,
}

impl DependencyRecord {
    /// A record with minimal valid defaults for the given name.
    ///
    /// Used both as the base the inventory fills in and as the fallback when
    /// upstream data is partially missing.
    pub fn minimal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "unknown".to_string(),
            kind: PackageKind::Production,
            usage_count: 0,
            referencing_files: Vec::new(),
            documentation_files: Vec::new(),
            documentation_tree: DocTree::default(),
            logo: None,
            description: None,
            homepage: None,
            is_direct: false,
            source_url: None,
            is_abandoned: false,
            transitive_dependencies: BTreeMap::new(),
            registry_repository: None,
            registry_maintainers: Vec::new(),
            latest_version: None,
            has_newer_version: false,
            download_stats: None,
            rank: 0,
        }
    }

    /// Record a referencing file, deduplicating by relative path.
    pub fn add_reference(&mut self, file: FileRef) {
        if !self.referencing_files.iter().any(|f| f.relative_path == file.relative_path) {
            self.referencing_files.push(file);
        }
    }

    /// The first readme documentation file, if any (case-insensitive basename).
    pub fn readme(&self) -> Option<&DocFile> {
        self.documentation_files.iter().find(|f| {
            f.relative_path
                .rsplit('/')
                .next()
                .is_some_and(|base| base.eq_ignore_ascii_case("readme.md"))
        })
    }
}

/// The full consolidated snapshot of all dependency records.
///
/// Rebuilt wholesale on every analysis run and replaced atomically; never
/// mutated field-by-field after being persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    /// RFC 3339 timestamp of the run that produced this artifact.
    pub generated_at: String,
    /// SHA-256 of the manifest bytes at run time, `sha256:<hex>` format.
    pub manifest_checksum: String,
    /// Dependency name to record; key always equals the record's name.
    pub packages: BTreeMap<String, DependencyRecord>,
}

impl AnalysisArtifact {
    /// Assign 1-based ranks by descending usage count, name ascending as the
    /// deterministic tiebreaker.
    pub fn assign_ranks(&mut self) {
        let mut order: Vec<(u64, String)> = self
            .packages
            .values()
            .map(|r| (r.usage_count, r.name.clone()))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        for (idx, (_, name)) in order.into_iter().enumerate() {
            if let Some(record) = self.packages.get_mut(&name) {
                record.rank = (idx + 1) as u64;
            }
        }
    }

}
