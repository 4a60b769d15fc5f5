//! Version name validation.
//!
//! A version name becomes a directory under `local_path` and part of the
//! archive URL, so it must be a single plain path component.

use crate::core::QuiltError;

/// Reject names that are empty, `.`/`..`, contain a path separator or a NUL
/// byte.
///
/// # Examples
///
/// ```rust
/// use quilt::utils::validate_version_name;
///
/// assert!(validate_version_name("1.0.0").is_ok());
/// assert!(validate_version_name("../etc").is_err());
/// ```
pub fn validate_version_name(name: &str) -> Result<(), QuiltError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(QuiltError::InvalidVersionName {
            name: name.to_string(),
        });
    }
    Ok(())
}
