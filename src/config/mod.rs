//! Configuration management for depdocs.
//!
//! Configuration lives in `depdocs.toml` at the project root. Every field has
//! a sensible default so a missing file yields a working configuration rooted
//! at the current directory.
//!
//! # Example
//!
//! ```toml
//! manifest_path = "composer.json"
//! vendor_dir = "vendor"
//! source_roots = ["src", "app"]
//! storage_dir = "public/storage"
//! storage_base_url = "/storage"
//! data_dir = "data"
//!
//! [inventory]
//! command = "composer show --all --format=json"
//!
//! [registry]
//! base_url = "https://packagist.org"
//! ttl_secs = 3600
//! max_parallel = 8
//!
//! [analysis]
//! timeout_secs = 600
//! max_attempts = 3
//! cache_ttl_secs = 1800
//! ```
//!
//! # Resolution order
//!
//! 1. `--config` CLI flag
//! 2. `DEPDOCS_CONFIG_PATH` environment variable
//! 3. `depdocs.toml` in the current directory
//! 4. Built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the dependency inventory is obtained.
///
/// A command takes precedence over a file when both are set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InventoryConfig {
    /// Shell command emitting the inventory JSON on stdout.
    pub command: Option<String>,
    /// Path to a pre-generated inventory JSON file, relative to the project root.
    pub file: Option<PathBuf>,
}

/// Package registry endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the package registry API.
    #[serde(default = "default_registry_url")]
    pub base_url: String,
    /// TTL for per-package metadata cache entries, in seconds.
    #[serde(default = "default_registry_ttl")]
    pub ttl_secs: u64,
    /// Maximum concurrent registry requests.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            ttl_secs: default_registry_ttl(),
            max_parallel: default_max_parallel(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Analysis run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Hard timeout for a full analysis run, in seconds.
    #[serde(default = "default_analysis_timeout")]
    pub timeout_secs: u64,
    /// Retry attempts for the queued analysis path.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Number of source files read per scan chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// TTL for query cache entries, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_analysis_timeout(),
            max_attempts: default_max_attempts(),
            chunk_size: default_chunk_size(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

/// Top-level depdocs configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project root; all relative paths below resolve against it.
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
    /// Dependency manifest path, relative to the project root.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,
    /// Installed-dependencies tree root, relative to the project root.
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: PathBuf,
    /// Directories scanned for dependency usage.
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<PathBuf>,
    /// File extensions considered source code during usage scanning.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    /// Durable public storage root for copied documentation and images.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// URL prefix under which stored files are served.
    #[serde(default = "default_storage_base_url")]
    pub storage_base_url: String,
    /// Directory holding the artifact and checksum sidecar.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Editor deep-link template; `{path}` is replaced with the absolute path.
    #[serde(default = "default_editor_link_template")]
    pub editor_link_template: String,
    /// Inventory source configuration.
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// Registry endpoint configuration.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Analysis run configuration.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            manifest_path: default_manifest_path(),
            vendor_dir: default_vendor_dir(),
            source_roots: default_source_roots(),
            source_extensions: default_source_extensions(),
            storage_dir: default_storage_dir(),
            storage_base_url: default_storage_base_url(),
            data_dir: default_data_dir(),
            editor_link_template: default_editor_link_template(),
            inventory: InventoryConfig::default(),
            registry: RegistryConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the `DEPDOCS_CONFIG_PATH`
    /// environment variable, or `depdocs.toml` in the current directory.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DEPDOCS_CONFIG_PATH").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("depdocs.toml"));

        if !path.exists() {
            if explicit.is_some() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Absolute path to the dependency manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(&self.manifest_path)
    }

    /// Absolute path to the installed-dependencies tree.
    pub fn vendor_dir(&self) -> PathBuf {
        self.project_root.join(&self.vendor_dir)
    }

    /// Absolute paths of the source roots that exist on disk.
    pub fn source_roots(&self) -> Vec<PathBuf> {
        self.source_roots.iter().map(|r| self.project_root.join(r)).collect()
    }

    /// Absolute path to the storage root.
    pub fn storage_dir(&self) -> PathBuf {
        self.project_root.join(&self.storage_dir)
    }

    /// Absolute path to the data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.project_root.join(&self.data_dir)
    }

    /// Absolute path to the consolidated artifact document.
    pub fn artifact_path(&self) -> PathBuf {
        self.data_dir().join("dependencies.json")
    }

    /// Absolute path to the manifest checksum sidecar.
    pub fn checksum_path(&self) -> PathBuf {
        self.data_dir().join("dependencies.json.checksum")
    }
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("composer.json")
}

fn default_vendor_dir() -> PathBuf {
    PathBuf::from("vendor")
}

fn default_source_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("src"), PathBuf::from("app")]
}

fn default_source_extensions() -> Vec<String> {
    ["php", "js", "ts", "rs", "py", "rb", "twig", "blade.php"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("public/storage")
}

fn default_storage_base_url() -> String {
    "/storage".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_editor_link_template() -> String {
    "vscode://file/{path}".to_string()
}

fn default_registry_url() -> String {
    "https://packagist.org".to_string()
}

const fn default_registry_ttl() -> u64 {
    3600
}

const fn default_max_parallel() -> usize {
    8
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_analysis_timeout() -> u64 {
    600
}

const fn default_max_attempts() -> usize {
    3
}

const fn default_chunk_size() -> usize {
    100
}

const fn default_cache_ttl() -> u64 {
    1800
}
