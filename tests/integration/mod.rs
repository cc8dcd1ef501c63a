//! Integration test suite for depdocs
//!
//! End-to-end tests that exercise the analysis pipeline, the staleness gate,
//! the query cache, and the CLI surface against a temporary project fixture.
//! Every test runs offline: the fixture points the registry at an unroutable
//! address, so enrichment degrades gracefully instead of reaching the network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **analyze_flow**: Full pipeline runs through the binary
//! - **cache_coherence**: Checksum-tagged query cache behavior
//! - **cli_commands**: Read-side command surface (list, show, top, logos)
//! - **staleness**: Manifest-checksum gate and artifact persistence

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod analyze_flow;
mod cache_coherence;
mod cli_commands;
mod staleness;
