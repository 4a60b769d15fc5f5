//! Core types for Quilt
//!
//! This module holds the error types shared by every other module:
//! - [`QuiltError`] - Enumerated error types covering all Quilt failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! Internal plumbing returns [`anyhow::Result`] with context attached at each
//! step; typed [`QuiltError`] values are raised at the points callers need to
//! distinguish (configuration, manifest, network, extraction).

pub mod error;

pub use error::{ErrorContext, QuiltError, user_friendly_error};
