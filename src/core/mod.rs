//! Core types and error handling for depdocs.
//!
//! - [`error`] - The [`DepdocsError`] taxonomy and user-friendly error display
//! - [`PackageKind`] - Production vs development dependency classification

pub mod error;

pub use error::{DepdocsError, ErrorContext, user_friendly_error};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a declared dependency.
///
/// Mirrors the `require` / `require-dev` split in the dependency manifest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// A runtime dependency.
    #[default]
    Production,
    /// A development-only dependency.
    Development,
}

impl PackageKind {
    /// Parse a kind from user input, accepting common short forms.
    ///
    /// Returns `None` for unrecognized input so callers can decide whether to
    /// error or fall back.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" | "require" => Some(Self::Production),
            "development" | "dev" | "require-dev" => Some(Self::Development),
            _ => None,
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}
