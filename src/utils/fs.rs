//! Filesystem helpers for version directories.

use std::io;
use std::path::Path;

/// Create `path` and its parents. Succeeds if it already exists.
pub async fn ensure_dir(path: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

/// Remove a directory tree. Succeeds if it does not exist.
pub async fn remove_dir_all(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Remove a directory tree after a failed install, logging instead of
/// failing.
pub async fn cleanup_dir(path: &Path) {
    if let Err(e) = remove_dir_all(path).await {
        tracing::warn!(
            target: "quilt::fetch",
            "Could not remove {}: {}",
            path.display(),
            e
        );
    } else {
        tracing::debug!(target: "quilt::fetch", "Removed {}", path.display());
    }
}
