//! Error handling for Quilt
//!
//! This module provides the error types and user-friendly error reporting for
//! Quilt. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`QuiltError`] - Enumerated error types for every failure case
//! - [`ErrorContext`] - Wrapper that adds suggestions and details for display
//!
//! # Degraded vs Fatal
//!
//! Only [`QuiltError::ConfigError`] is fatal, and only at construction time.
//! Everything else is logged where it happens and collapsed into partial or
//! empty output by the service layer: a version that fails to load or fetch
//! is simply unavailable, and a bad module reference truncates one resolution
//! list without failing the stitch.
//!
//! # Examples
//!
//! ```rust,no_run
//! use quilt::core::{QuiltError, user_friendly_error};
//!
//! let error = QuiltError::VersionUnavailable {
//!     name: "2.0.0".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Quilt operations.
///
/// # Error Categories
///
/// ## Configuration
/// - [`ConfigError`](QuiltError::ConfigError) - Invalid or incomplete configuration
/// - [`RemoteNotConfigured`](QuiltError::RemoteNotConfigured) - Fetch attempted without a remote
///
/// ## Version Loading
/// - [`ManifestNotFound`](QuiltError::ManifestNotFound) - `manifest.json` missing
/// - [`ManifestParseError`](QuiltError::ManifestParseError) - `manifest.json` malformed
/// - [`VariantUnreadable`](QuiltError::VariantUnreadable) - Variant directory missing
/// - [`InvalidVersionName`](QuiltError::InvalidVersionName) - Name unusable as a directory
/// - [`VersionUnavailable`](QuiltError::VersionUnavailable) - Not on disk, cache, or remote
///
/// ## Remote Fetch
/// - [`NetworkError`](QuiltError::NetworkError) - Transport failure or non-200 status
/// - [`ExtractionFailed`](QuiltError::ExtractionFailed) - Archive tool exited non-zero
#[derive(Error, Debug)]
pub enum QuiltError {
    /// Configuration is missing a required value or holds an invalid one.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// The version directory has no `manifest.json`.
    #[error("Manifest not found: {path}")]
    ManifestNotFound {
        /// Expected manifest location
        path: String,
    },

    /// The manifest exists but is not valid JSON of the expected shape.
    #[error("Invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// Manifest location
        file: String,
        /// Parser message
        reason: String,
    },

    /// A variant directory (`prefix` or `debug_prefix`) cannot be read.
    #[error("Cannot read variant directory: {path}")]
    VariantUnreadable {
        /// Variant directory
        path: String,
    },

    /// A version name that cannot be used as a directory name.
    #[error("Invalid version name: '{name}'")]
    InvalidVersionName {
        /// Rejected name
        name: String,
    },

    /// The version exists neither in memory, on disk, nor remotely.
    #[error("Version '{name}' is not available")]
    VersionUnavailable {
        /// Requested version name
        name: String,
    },

    /// A fetch was needed but no remote host or path is configured.
    #[error("Remote archive store is not configured (missing {missing})")]
    RemoteNotConfigured {
        /// The missing setting
        missing: String,
    },

    /// The archive download failed.
    #[error("Network error during {operation}: {reason}")]
    NetworkError {
        /// Operation that failed
        operation: String,
        /// Status line or transport error
        reason: String,
    },

    /// The archive extraction tool exited with a non-zero status.
    #[error("Failed to extract archive {archive} (exit code {exit_code})")]
    ExtractionFailed {
        /// Archive that failed to extract
        archive: String,
        /// Tool exit code
        exit_code: i32,
        /// Captured stdout and stderr
        output: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Error wrapper carrying a suggestion and extra details for display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: QuiltError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Background on why it happens
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without any suggestion or details.
    #[must_use]
    pub const fn new(error: QuiltError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
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

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// [`QuiltError`]s anywhere in the chain get a tailored suggestion; IO and
/// TOML errors are mapped to their closest variant; everything else is kept
/// as a configuration-free message with the full cause chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(quilt_error) = cause.downcast_ref::<QuiltError>() {
            return create_error_context(clone_error(quilt_error));
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(QuiltError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your quilt.toml. Verify quotes and brackets");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(QuiltError::IoError(std::io::Error::new(
            io_error.kind(),
            io_error.to_string(),
        )))
        .with_suggestion("Check that the path exists and is accessible");
    }

    let details = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>().join(": ");
    let mut ctx = ErrorContext::new(QuiltError::ConfigError {
        message: error.to_string(),
    });
    if !details.is_empty() {
        ctx = ctx.with_details(details);
    }
    ctx
}

fn create_error_context(error: QuiltError) -> ErrorContext {
    match &error {
        QuiltError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Set local_path in quilt.toml or export QUILT_LOCAL_PATH")
            .with_details("Quilt needs a local directory to load and store versions"),
        QuiltError::ManifestNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Every version directory must contain a manifest.json"),
        QuiltError::ManifestParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Validate manifest.json with a JSON linter"),
        QuiltError::VariantUnreadable { .. } => ErrorContext::new(error)
            .with_suggestion("Check the prefix and debug_prefix entries of the manifest"),
        QuiltError::InvalidVersionName { .. } => ErrorContext::new(error)
            .with_suggestion("Version names must not be empty or contain path separators"),
        QuiltError::VersionUnavailable { .. } => ErrorContext::new(error)
            .with_suggestion("Check the version name and the remote configuration")
            .with_details("Versions are loaded from local_path or fetched as <name>.tgz from the remote store"),
        QuiltError::RemoteNotConfigured { .. } => ErrorContext::new(error)
            .with_suggestion("Add a [remote] table with host and path to quilt.toml"),
        QuiltError::NetworkError { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the remote archive store is reachable")
            .with_details("Fetches are not retried"),
        QuiltError::ExtractionFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Make sure the remote archive is a gzip-compressed tar file"),
        QuiltError::IoError(_) => ErrorContext::new(error)
            .with_suggestion("Check file permissions and available disk space"),
    }
}

fn clone_error(error: &QuiltError) -> QuiltError {
    match error {
        QuiltError::ConfigError {
            message,
        } => QuiltError::ConfigError {
            message: message.clone(),
        },
        QuiltError::ManifestNotFound {
            path,
        } => QuiltError::ManifestNotFound {
            path: path.clone(),
        },
        QuiltError::ManifestParseError {
            file,
            reason,
        } => QuiltError::ManifestParseError {
            file: file.clone(),
            reason: reason.clone(),
        },
        QuiltError::VariantUnreadable {
            path,
        } => QuiltError::VariantUnreadable {
            path: path.clone(),
        },
        QuiltError::InvalidVersionName {
            name,
        } => QuiltError::InvalidVersionName {
            name: name.clone(),
        },
        QuiltError::VersionUnavailable {
            name,
        } => QuiltError::VersionUnavailable {
            name: name.clone(),
        },
        QuiltError::RemoteNotConfigured {
            missing,
        } => QuiltError::RemoteNotConfigured {
            missing: missing.clone(),
        },
        QuiltError::NetworkError {
            operation,
            reason,
        } => QuiltError::NetworkError {
            operation: operation.clone(),
            reason: reason.clone(),
        },
        QuiltError::ExtractionFailed {
            archive,
            exit_code,
            output,
        } => QuiltError::ExtractionFailed {
            archive: archive.clone(),
            exit_code: *exit_code,
            output: output.clone(),
        },
        // io::Error is not Clone
        QuiltError::IoError(e) => QuiltError::IoError(std::io::Error::new(e.kind(), e.to_string())),
    }
}
