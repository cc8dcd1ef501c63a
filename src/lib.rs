//! depdocs - dependency documentation extraction and caching pipeline
//!
//! depdocs inventories a project's declared dependencies, determines which
//! ones its source code actually references, extracts the bundled
//! documentation and image assets from the installed-dependencies tree,
//! enriches the result with public registry metadata, and persists one
//! consolidated artifact served through a checksum-gated cache. Expensive
//! recomputation happens only when the dependency manifest actually changes.
//!
//! # Pipeline
//!
//! ```text
//! inventory ─▶ usage scan ─▶ asset extraction ─▶ registry enrichment
//!                                                        │
//!            staleness gate ◀── checksum sidecar ◀── artifact (atomic write)
//!                  │
//!            table adapter ─▶ query cache ─▶ read operations
//! ```
//!
//! # Core Modules
//!
//! - [`inventory`] - Runs the dependency-inventory command and parses its output
//! - [`usage`] - Lexical usage scanning over the project's source tree
//! - [`assets`] - Documentation/image extraction and the logo heuristic
//! - [`registry`] - Registry metadata and download-statistics enrichment
//! - [`analysis`] - Orchestration, locking, timeouts, and retries
//! - [`store`] - Artifact persistence, checksums, and the staleness gate
//! - [`table`] - Tabular query adapter over the persisted artifact
//! - [`cache`] - Checksum-tagged, TTL-bounded query cache
//!
//! # Supporting Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - `depdocs.toml` configuration
//! - [`core`] - Shared types and error handling
//! - [`record`] - The dependency record and artifact data model
//! - [`render`] - External markdown-rendering collaborator seam
//! - [`utils`] - Atomic file operations and path normalization

// Pipeline phases
pub mod assets;
pub mod inventory;
pub mod registry;
pub mod usage;

// Orchestration and serving
pub mod analysis;
pub mod cache;
pub mod store;
pub mod table;

// Supporting modules
pub mod cli;
pub mod config;
pub mod core;
pub mod record;
pub mod render;
pub mod utils;
