//! Error handling for depdocs.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`DepdocsError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users
//!
//! Propagation policy: only inventory failures halt an analysis run. File I/O
//! failures during scanning/extraction, registry enrichment failures, and
//! asset-resolution failures are absorbed locally, logged via `tracing`, and
//! never surface past their component.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for depdocs operations.
///
/// Each variant represents a specific failure mode with enough context to
/// produce an actionable message. Fatal variants (inventory and configuration
/// errors) abort the analysis run; everything else is absorbed at the
/// component boundary.
#[derive(Error, Debug)]
pub enum DepdocsError {
    /// The dependency-inventory command failed to execute or exited non-zero.
    #[error("Inventory command failed: {command}\nstderr: {stderr}")]
    InventoryCommandFailed {
        /// The command line that was executed
        command: String,
        /// Captured standard error output
        stderr: String,
    },

    /// The inventory output could not be parsed into dependency records.
    #[error("Failed to parse inventory output: {reason}")]
    InventoryParseError {
        /// Description of the parse failure
        reason: String,
    },

    /// The dependency manifest file does not exist.
    #[error("Dependency manifest not found: {path}")]
    ManifestNotFound {
        /// Path that was checked
        path: String,
    },

    /// Configuration file is missing required values or fails to parse.
    #[error("Configuration error in {file}: {reason}")]
    ConfigError {
        /// Configuration file path
        file: String,
        /// Description of the problem
        reason: String,
    },

    /// The consolidated artifact has not been generated yet.
    #[error("Analysis artifact not found at {path}")]
    ArtifactMissing {
        /// Expected artifact path
        path: String,
    },

    /// The persisted artifact could not be deserialized.
    #[error("Failed to parse analysis artifact: {reason}")]
    ArtifactParseError {
        /// Description of the parse failure
        reason: String,
    },

    /// The analysis run exceeded its hard timeout.
    #[error("Analysis timed out after {secs} seconds")]
    AnalysisTimeout {
        /// Configured timeout in seconds
        secs: u64,
    },

    /// Another analysis run already holds the exclusive lock.
    #[error("An analysis is already in progress for this project")]
    AnalysisInProgress,

    /// A registry enrichment call failed for one package.
    ///
    /// Swallowed functionally (the package simply stays unenriched) but kept
    /// as a typed error so failure rates are observable in logs.
    #[error("Registry enrichment failed for '{package}': {reason}")]
    EnrichmentError {
        /// Package name the call was for
        package: String,
        /// Description of the failure
        reason: String,
    },

    /// I/O error wrapper from [`std::io::Error`].
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error wrapper from [`serde_json::Error`].
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parse error wrapper from [`toml::de::Error`].
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// Error context wrapper adding user-friendly suggestions and details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying depdocs error
    pub error: DepdocsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`DepdocsError`].
    #[must_use]
    pub const fn new(error: DepdocsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`] with suggestions.
///
/// Downcasts known error types to attach contextual guidance; unknown errors
/// get a generic wrapper.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(depdocs_error) = error.downcast_ref::<DepdocsError>() {
        return create_error_context(depdocs_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DepdocsError::Other(error.to_string()))
                    .with_suggestion(
                        "Check file ownership or run with elevated permissions",
                    )
                    .with_details("depdocs does not have permission to read or write a required file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DepdocsError::Other(error.to_string()))
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(DepdocsError::ConfigError {
            file: "depdocs.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your depdocs.toml file");
    }

    ErrorContext::new(DepdocsError::Other(error.to_string()))
}

fn create_error_context(error: &DepdocsError) -> ErrorContext {
    match error {
        DepdocsError::InventoryCommandFailed { command, stderr } => {
            ErrorContext::new(DepdocsError::InventoryCommandFailed {
                command: command.clone(),
                stderr: stderr.clone(),
            })
            .with_suggestion("Verify the inventory command runs successfully on its own")
            .with_details(
                "The dependency inventory is the only fatal failure point; nothing was written",
            )
        }
        DepdocsError::ManifestNotFound { path } => {
            ErrorContext::new(DepdocsError::ManifestNotFound { path: path.clone() })
                .with_suggestion("Set manifest_path in depdocs.toml to your dependency manifest")
        }
        DepdocsError::ArtifactMissing { path } => {
            ErrorContext::new(DepdocsError::ArtifactMissing { path: path.clone() })
                .with_suggestion("Run 'depdocs analyze' to generate the artifact")
        }
        DepdocsError::AnalysisInProgress => ErrorContext::new(DepdocsError::AnalysisInProgress)
            .with_suggestion("Wait for the running analysis to finish, or re-run without --no-wait")
            .with_details("Only one analysis may run per project at a time"),
        DepdocsError::AnalysisTimeout { secs } => {
            ErrorContext::new(DepdocsError::AnalysisTimeout { secs: *secs })
                .with_suggestion("Increase analysis.timeout_secs in depdocs.toml")
                .with_details("The previous artifact remains authoritative; no partial data was written")
        }
        other => ErrorContext::new(DepdocsError::Other(other.to_string())),
    }
}
