//! Logo detection heuristics and the placeholder fallback.
//!
//! Detection is explicitly best-effort. Order of preference:
//! 1. An image in the package tree under an `art/` directory or with `logo`
//!    in its basename (handled by the extractor walk, first match wins)
//! 2. The first image embedded in the readme: downloaded if absolute,
//!    copied if relative and present on disk
//! 3. A deterministic generated placeholder
//!
//! Every failure along the way degrades to the next step; the placeholder
//! guarantees a non-null logo for any package with a readme.

use crate::config::Config;
use crate::record::Logo;
use crate::utils::{copy_file, normalize_path_for_storage, safe_write};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]*\]\(\s*([^)\s]+)").expect("markdown image regex")
});

static HTML_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]*\ssrc\s*=\s*["']([^"']+)["']"#).expect("html image regex")
});

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "ico"];

/// True when a file's extension marks it as image-like.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)))
}

/// True when an image path looks like a package logo: an `art` directory
/// segment anywhere in the path, or `logo` in the basename.
pub fn is_logo_candidate(relative_path: &str) -> bool {
    let mut segments = relative_path.split('/').peekable();
    while let Some(segment) = segments.next() {
        let is_last = segments.peek().is_none();
        if is_last {
            if segment.to_lowercase().contains("logo") {
                return true;
            }
        } else if segment.eq_ignore_ascii_case("art") {
            return true;
        }
    }
    false
}

/// Extract the first embedded image URL from readme content.
///
/// Considers both Markdown image syntax and HTML `<img src=...>` tags and
/// returns whichever occurs first in the text.
pub fn first_readme_image(content: &str) -> Option<String> {
    let md = MARKDOWN_IMAGE
        .captures(content)
        .and_then(|c| c.get(1).map(|m| (m.start(), m.as_str().to_string())));
    let html = HTML_IMAGE
        .captures(content)
        .and_then(|c| c.get(1).map(|m| (m.start(), m.as_str().to_string())));

    match (md, html) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a.1 } else { b.1 }),
        (Some(a), None) => Some(a.1),
        (None, Some(b)) => Some(b.1),
        (None, None) => None,
    }
}

/// Resolve a logo from the readme's first embedded image, falling back to the
/// generated placeholder on any failure.
///
/// - Absolute http(s) URLs are downloaded and stored
/// - Root-relative URLs (`/...`) are unresolvable and go straight to the
///   placeholder
/// - Other relative URLs resolve against the readme's directory inside the
///   package tree and are copied when the file exists
pub async fn from_readme(
    package: &str,
    readme_relative_path: &str,
    readme_content: &str,
    package_root: &Path,
    config: &Config,
    client: &reqwest::Client,
) -> Result<Logo> {
    let Some(url) = first_readme_image(readme_content) else {
        return placeholder(package, config);
    };

    if url.starts_with("http://") || url.starts_with("https://") {
        match download_logo(package, &url, config, client).await {
            Ok(logo) => return Ok(logo),
            Err(e) => {
                warn!("Logo download failed for {package} ({url}): {e}");
                return placeholder(package, config);
            }
        }
    }

    if url.starts_with('/') {
        // Root-relative against an unknown host; not resolvable
        debug!("Root-relative readme image for {package}, using placeholder");
        return placeholder(package, config);
    }

    let readme_dir = Path::new(readme_relative_path).parent().unwrap_or(Path::new(""));
    let candidate = package_root.join(readme_dir).join(&url);
    if candidate.is_file() {
        let relative = candidate.strip_prefix(package_root).unwrap_or(&candidate);
        let relative = normalize_path_for_storage(relative);
        let stored_path = format!("packages/{package}/{relative}");
        let target = config.storage_dir().join(&stored_path);
        match copy_file(&candidate, &target) {
            Ok(()) => {
                return Ok(Logo {
                    source_path: relative,
                    stored_path: stored_path.clone(),
                    stored_url: format!("{}/{stored_path}", config.storage_base_url),
                    is_placeholder: false,
                });
            }
            Err(e) => warn!("Failed to copy readme image for {package}: {e}"),
        }
    }

    placeholder(package, config)
}

async fn download_logo(
    package: &str,
    url: &str,
    config: &Config,
    client: &reqwest::Client,
) -> Result<Logo> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Non-success status fetching {url}"))?;

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body of {url}"))?;

    let extension = url
        .rsplit('.')
        .next()
        .filter(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)))
        .unwrap_or("png");

    let stored_path = format!("packages/{package}/logo-remote.{extension}");
    let target = config.storage_dir().join(&stored_path);
    crate::utils::atomic_write(&target, &bytes)?;

    Ok(Logo {
        source_path: url.to_string(),
        stored_path: stored_path.clone(),
        stored_url: format!("{}/{stored_path}", config.storage_base_url),
        is_placeholder: false,
    })
}

/// Generate the deterministic placeholder logo for a package.
///
/// A simple inline SVG: the package initials on a background color picked
/// from a fixed palette by a hash of the name. Identical input always yields
/// identical bytes.
pub fn placeholder(package: &str, config: &Config) -> Result<Logo> {
    const PALETTE: &[&str] = &[
        "#4f46e5", "#0891b2", "#059669", "#d97706", "#dc2626", "#7c3aed", "#db2777",
    ];

    let hash: usize = package.bytes().map(usize::from).sum();
    let color = PALETTE[hash % PALETTE.len()];
    let initials = initials_for(package);

    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="128" height="128" viewBox="0 0 128 128">"#,
            r#"<rect width="128" height="128" rx="16" fill="{color}"/>"#,
            r#"<text x="64" y="64" dy="0.35em" text-anchor="middle" "#,
            r##"font-family="sans-serif" font-size="48" fill="#ffffff">{initials}</text>"##,
            "</svg>"
        ),
        color = color,
        initials = initials,
    );

    let stored_path = format!("packages/{package}/logo-placeholder.svg");
    let target = config.storage_dir().join(&stored_path);
    safe_write(&target, &svg)?;

    Ok(Logo {
        source_path: "generated".to_string(),
        stored_path: stored_path.clone(),
        stored_url: format!("{}/{stored_path}", config.storage_base_url),
        is_placeholder: true,
    })
}

fn initials_for(package: &str) -> String {
    package
        .split('/')
        .filter_map(|segment| segment.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .take(2)
        .collect()
}
