//! Asset extraction: documentation files, documentation tree, and logo.
//!
//! For each dependency the extractor walks the installed package tree once,
//! classifies files by extension, mirrors markdown and image files into
//! durable storage under `packages/<name>/<original-relative-path>`, builds
//! the documentation trie, and applies the logo heuristic (see [`logo`]).
//!
//! Individual copy or download failures are logged and never abort the
//! remaining files or dependencies. Packages are processed concurrently, each
//! record owned by exactly one worker during mutation.

pub mod logo;

use crate::config::Config;
use crate::record::{DependencyRecord, DocFile, DocTree};
use crate::render::MarkdownRender;
use crate::utils::{copy_file, normalize_path_for_storage};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown"];

/// Concurrency bound for per-package extraction.
const MAX_PARALLEL_PACKAGES: usize = 8;

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

/// Extract documentation and logo assets for every record.
///
/// `Phase(records) -> records`: takes ownership of the map and returns the
/// updated map. Packages without an installed tree pass through unchanged.
pub async fn extract_all(
    records: BTreeMap<String, DependencyRecord>,
    config: &Config,
    renderer: &dyn MarkdownRender,
    client: &reqwest::Client,
) -> Result<BTreeMap<String, DependencyRecord>> {
    let results: Vec<(String, DependencyRecord)> = stream::iter(records.into_iter())
        .map(|(name, record)| async move {
            let record = extract_package(record, config, renderer, client).await;
            (name, record)
        })
        .buffer_unordered(MAX_PARALLEL_PACKAGES)
        .collect()
        .await;

    Ok(results.into_iter().collect())
}

/// Extract assets for one dependency.
///
/// Never fails: every per-file error is logged and skipped, and the
/// placeholder fallback keeps `logo` non-null whenever a readme exists.
pub async fn extract_package(
    mut record: DependencyRecord,
    config: &Config,
    renderer: &dyn MarkdownRender,
    client: &reqwest::Client,
) -> DependencyRecord {
    let package_root = config.vendor_dir().join(&record.name);
    if !package_root.is_dir() {
        debug!("No installed tree for {}, skipping asset extraction", record.name);
        return record;
    }

    let mut tree = DocTree::default();

    // Single recursive enumeration, sorted so logo selection order is stable
    for entry in WalkDir::new(&package_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let relative = path.strip_prefix(&package_root).unwrap_or(path);
        let relative_path = normalize_path_for_storage(relative);

        if is_markdown(path) {
            if let Some(doc) = store_doc_file(&record.name, path, &relative_path, config, renderer) {
                tree.insert(&doc.relative_path);
                record.documentation_files.push(doc);
            }
        } else if logo::is_image(path) {
            store_image(&mut record, path, &relative_path, config);
        }
    }

    record.documentation_tree = tree;

    // Readme-based fallback only when the walk found no logo candidate
    if record.logo.is_none() {
        if let Some(readme) = record.readme().cloned() {
            match logo::from_readme(
                &record.name,
                &readme.relative_path,
                &readme.raw_content,
                &package_root,
                config,
                client,
            )
            .await
            {
                Ok(found) => record.logo = Some(found),
                Err(e) => warn!("Logo resolution failed for {}: {e}", record.name),
            }
        }
    }

    record
}

fn store_doc_file(
    package: &str,
    path: &Path,
    relative_path: &str,
    config: &Config,
    renderer: &dyn MarkdownRender,
) -> Option<DocFile> {
    let raw_content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping unreadable documentation file {}: {e}", path.display());
            return None;
        }
    };

    let stored_path = format!("packages/{package}/{relative_path}");
    let target = config.storage_dir().join(&stored_path);
    if let Err(e) = copy_file(path, &target) {
        warn!("Failed to store documentation file {}: {e}", path.display());
        return None;
    }

    let is_readme = relative_path
        .rsplit('/')
        .next()
        .is_some_and(|base| base.eq_ignore_ascii_case("readme.md"));

    let rendered_html = if is_readme {
        match renderer.render(&raw_content) {
            Ok(html) => Some(html),
            Err(e) => {
                debug!("Markdown rendering unavailable for {package}: {e}");
                None
            }
        }
    } else {
        None
    };

    Some(DocFile {
        relative_path: relative_path.to_string(),
        stored_path: stored_path.clone(),
        stored_url: format!("{}/{stored_path}", config.storage_base_url),
        raw_content,
        rendered_html,
    })
}

fn store_image(record: &mut DependencyRecord, path: &Path, relative_path: &str, config: &Config) {
    let stored_path = format!("packages/{}/{relative_path}", record.name);
    let target = config.storage_dir().join(&stored_path);
    if let Err(e) = copy_file(path, &target) {
        warn!("Failed to store image file {}: {e}", path.display());
        return;
    }

    // First matching candidate wins; enumeration order is stable
    if record.logo.is_none() && logo::is_logo_candidate(relative_path) {
        record.logo = Some(crate::record::Logo {
            source_path: relative_path.to_string(),
            stored_path: stored_path.clone(),
            stored_url: format!("{}/{stored_path}", config.storage_base_url),
            is_placeholder: false,
        });
    }
}
