//! Usage analysis: which source files reference which dependency.
//!
//! Source files are enumerated from the configured source roots and processed
//! in bounded-size chunks to cap memory use. Chunks are scanned concurrently;
//! attribution results flow back as `(package, file)` pairs and are folded
//! into the records afterwards, so no record is shared mutably across
//! workers. Unreadable files are logged and skipped.
//!
//! Re-running on unchanged inputs reproduces identical counts and reference
//! sets: files are enumerated in sorted order and reference lists are sorted
//! by path before counting.

pub mod patterns;

pub use patterns::{SubstringMatcher, UsageMatcher, UsagePatterns};

use crate::config::Config;
use crate::record::{DependencyRecord, FileRef};
use crate::utils::normalize_path_for_storage;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Enumerate source files under the configured roots, sorted for determinism.
pub fn collect_source_files(config: &Config) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in config.source_roots() {
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if has_source_extension(entry.path(), &config.source_extensions) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files
}

fn has_source_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    extensions.iter().any(|ext| name.ends_with(&format!(".{ext}")))
}

/// Scan the source tree and fill in `usage_count` and `referencing_files` for
/// every record.
///
/// Takes ownership of the record map and returns the updated map, following
/// the `Phase(records) -> records` shape used by every pipeline phase.
pub async fn analyze(
    mut records: BTreeMap<String, DependencyRecord>,
    config: &Config,
    matcher: Arc<dyn UsageMatcher>,
) -> Result<BTreeMap<String, DependencyRecord>> {
    let files = collect_source_files(config);
    debug!("Scanning {} source files for {} packages", files.len(), records.len());

    let patterns: Arc<Vec<(String, UsagePatterns)>> = Arc::new(
        records
            .keys()
            .map(|name| (name.clone(), UsagePatterns::for_package(name)))
            .collect(),
    );

    let chunk_size = config.analysis.chunk_size.max(1);
    let project_root = config.project_root.clone();
    let editor_template = config.editor_link_template.clone();

    let mut tasks = Vec::new();
    for chunk in files.chunks(chunk_size) {
        let chunk: Vec<PathBuf> = chunk.to_vec();
        let patterns = Arc::clone(&patterns);
        let matcher = Arc::clone(&matcher);
        let project_root = project_root.clone();
        let editor_template = editor_template.clone();

        tasks.push(tokio::spawn(async move {
            scan_chunk(&chunk, &patterns, matcher.as_ref(), &project_root, &editor_template).await
        }));
    }

    // Fold the per-chunk attributions into the records
    for task in tasks {
        let hits = task.await?;
        for (package, file_ref) in hits {
            if let Some(record) = records.get_mut(&package) {
                record.add_reference(file_ref);
            }
        }
    }

    for record in records.values_mut() {
        record.referencing_files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        record.usage_count = record.referencing_files.len() as u64;
    }

    Ok(records)
}

async fn scan_chunk(
    files: &[PathBuf],
    patterns: &[(String, UsagePatterns)],
    matcher: &dyn UsageMatcher,
    project_root: &Path,
    editor_template: &str,
) -> Vec<(String, FileRef)> {
    let mut hits = Vec::new();

    for path in files {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable source file {}: {e}", path.display());
                continue;
            }
        };

        let relative = path.strip_prefix(project_root).unwrap_or(path);
        let relative_path = normalize_path_for_storage(relative);
        let absolute = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());
        let editor_link = editor_template.replace("{path}", &absolute.display().to_string());

        for (package, pattern) in patterns {
            if matcher.matches(&content, pattern) {
                hits.push((
                    package.clone(),
                    FileRef {
                        relative_path: relative_path.clone(),
                        editor_link: editor_link.clone(),
                    },
                ));
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.project_root = root.to_path_buf();
        config.source_roots = vec![PathBuf::from("src")];
        config.source_extensions = vec!["php".to_string()];
        config
    }

    fn records_for(names: &[&str]) -> BTreeMap<String, DependencyRecord> {
        names
            .iter()
            .map(|n| (n.to_string(), DependencyRecord::minimal(*n)))
            .collect()
    }

    #[tokio::test]
    async fn test_analyze_attributes_namespace_reference() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("Main.php"), "<?php\nuse Acme\\Widgets\\Button;\n").unwrap();
        std::fs::write(src.join("Other.php"), "<?php\n// nothing relevant\n").unwrap();

        let config = test_config(temp.path());
        let records = records_for(&["acme/widgets"]);

        let records = analyze(records, &config, Arc::new(SubstringMatcher)).await.unwrap();
        let record = &records["acme/widgets"];
        assert_eq!(record.usage_count, 1);
        assert_eq!(record.referencing_files[0].relative_path, "src/Main.php");
        assert!(record.referencing_files[0].editor_link.starts_with("vscode://file/"));
    }

    #[tokio::test]
    async fn test_analyze_zero_usage() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("Main.php"), "<?php\nuse Other\\Library;\n").unwrap();

        let config = test_config(temp.path());
        let records = records_for(&["acme/widgets"]);

        let records = analyze(records, &config, Arc::new(SubstringMatcher)).await.unwrap();
        let record = &records["acme/widgets"];
        assert_eq!(record.usage_count, 0);
        assert!(record.referencing_files.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        for i in 0..5 {
            std::fs::write(
                src.join(format!("File{i}.php")),
                "<?php use Acme\\Widgets\\Button;",
            )
            .unwrap();
        }

        let mut config = test_config(temp.path());
        // Force multiple chunks
        config.analysis.chunk_size = 2;

        let first = analyze(records_for(&["acme/widgets"]), &config, Arc::new(SubstringMatcher))
            .await
            .unwrap();
        let second = analyze(records_for(&["acme/widgets"]), &config, Arc::new(SubstringMatcher))
            .await
            .unwrap();

        assert_eq!(first["acme/widgets"].usage_count, 5);
        assert_eq!(
            first["acme/widgets"].referencing_files,
            second["acme/widgets"].referencing_files
        );
    }

    #[tokio::test]
    async fn test_analyze_dedups_by_path() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        // Both the namespace and the literal appear in the same file
        std::fs::write(src.join("Main.php"), "use Acme\\Widgets\\X; // acmewidgets").unwrap();

        let config = test_config(temp.path());
        let records = analyze(records_for(&["acme/widgets"]), &config, Arc::new(SubstringMatcher))
            .await
            .unwrap();
        assert_eq!(records["acme/widgets"].usage_count, 1);
    }

    #[test]
    fn test_collect_source_files_filters_extensions() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("a.php"), "x").unwrap();
        std::fs::write(src.join("b.txt"), "x").unwrap();
        std::fs::write(src.join("c.blade.php"), "x").unwrap();

        let mut config = test_config(temp.path());
        config.source_extensions = vec!["php".to_string()];

        let files = collect_source_files(&config);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.php", "c.blade.php"]);
    }
}
