//! Small shared helpers.
//!
//! - [`fs`] - async directory creation and best-effort cleanup
//! - [`security`] - version name validation

pub mod fs;
pub mod security;

pub use fs::{cleanup_dir, ensure_dir, remove_dir_all};
pub use security::validate_version_name;
