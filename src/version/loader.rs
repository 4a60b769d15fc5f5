//! Loads a version directory into a [`Version`].
//!
//! Loading reads `manifest.json`, resolves the variant directories and reads
//! every referenced file eagerly. Only a missing or malformed manifest (or an
//! unreadable default variant directory) fails the load; unreadable header,
//! common, footer or module files are logged and degrade to empty text or a
//! missing module.
//!
//! # Directory Layout
//!
//! ```text
//! {local_path}/{version}/
//! ├── manifest.json
//! ├── header.js            # relative to the variant directory
//! ├── optional/0.js
//! └── debug/               # debug_prefix, optional
//!     ├── header.js
//!     └── optional/0.js
//! ```

use super::{Module, Variant, Version};
use crate::constants::MANIFEST_FILE;
use crate::core::QuiltError;
use crate::manifest::Manifest;
use std::io;
use std::path::{Path, PathBuf};

/// Load `local_path/version_name` into memory.
///
/// # Errors
///
/// - [`QuiltError::ManifestNotFound`] when `manifest.json` does not exist
/// - [`QuiltError::ManifestParseError`] when it is not a valid manifest
/// - [`QuiltError::VariantUnreadable`] when the default variant directory
///   cannot be read
/// - [`QuiltError::IoError`] for other failures reading the manifest
///
/// # Examples
///
/// ```rust,no_run
/// use quilt::version::{VariantKind, load_version};
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let version = load_version(Path::new("/srv/quilt"), "1.0.0").await?;
/// println!("{} modules", version.variant(VariantKind::Default).modules().len());
/// # Ok(())
/// # }
/// ```
pub async fn load_version(local_path: &Path, version_name: &str) -> Result<Version, QuiltError> {
    tracing::debug!(target: "quilt::loader", "Loading version: {}", version_name);

    let version_dir = local_path.join(version_name);
    let manifest = read_manifest(&version_dir).await?;

    let default_dir = variant_dir(&version_dir, manifest.prefix.as_deref());
    let default = load_variant(&default_dir, &manifest).await?;

    let debug_variant = match manifest.debug_prefix.as_deref() {
        Some(prefix) => {
            let debug_dir = variant_dir(&version_dir, Some(prefix));
            match load_variant(&debug_dir, &manifest).await {
                Ok(variant) => Some(variant),
                Err(e) => {
                    tracing::error!(
                        target: "quilt::loader",
                        "Version {}: debug variant unavailable: {}",
                        version_name,
                        e
                    );
                    None
                }
            }
        }
        None => None,
    };

    tracing::debug!(
        target: "quilt::loader",
        "Loaded version {} ({} modules{})",
        version_name,
        default.modules().len(),
        if debug_variant.is_some() { ", with debug variant" } else { "" }
    );

    Ok(Version::new(version_name, version_dir, default, debug_variant))
}

/// Whether `local_path/version_name/manifest.json` exists.
pub async fn manifest_exists(local_path: &Path, version_name: &str) -> bool {
    let path = local_path.join(version_name).join(MANIFEST_FILE);
    tokio::fs::try_exists(&path).await.unwrap_or(false)
}

/// Module name for a manifest filename: the segment after the last `/`.
///
/// Returns `None` for an empty filename or one ending in `/`.
///
/// ```rust
/// use quilt::version::derive_module_name;
///
/// assert_eq!(derive_module_name("./hi/hello.js"), Some("hello.js"));
/// assert_eq!(derive_module_name("hello.js"), Some("hello.js"));
/// assert_eq!(derive_module_name("/hello/"), None);
/// ```
pub fn derive_module_name(filename: &str) -> Option<&str> {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    if name.is_empty() { None } else { Some(name) }
}

async fn read_manifest(version_dir: &Path) -> Result<Manifest, QuiltError> {
    let path = version_dir.join(MANIFEST_FILE);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::error!(target: "quilt::loader", "Could not read manifest: {}", path.display());
            return Err(QuiltError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => {
            tracing::error!(
                target: "quilt::loader",
                "Could not read manifest {}: {}",
                path.display(),
                e
            );
            return Err(e.into());
        }
    };

    Manifest::from_json(&content).map_err(|e| {
        tracing::error!(target: "quilt::loader", "Could not parse manifest {}: {}", path.display(), e);
        QuiltError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        }
    })
}

fn variant_dir(version_dir: &Path, prefix: Option<&str>) -> PathBuf {
    match prefix {
        Some(prefix) => resolve_file(version_dir, prefix),
        None => version_dir.to_path_buf(),
    }
}

/// Manifest paths are relative to the variant directory even when written
/// with a leading `/`.
fn resolve_file(dir: &Path, filename: &str) -> PathBuf {
    dir.join(filename.trim_start_matches('/'))
}

async fn load_variant(dir: &Path, manifest: &Manifest) -> Result<Variant, QuiltError> {
    let readable = tokio::fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false);
    if !readable {
        return Err(QuiltError::VariantUnreadable {
            path: dir.display().to_string(),
        });
    }

    let mut variant = Variant::new();

    if let Some(header) = manifest.header.as_deref() {
        variant.header = read_piece(dir, header, "header").await.unwrap_or_default();
    }

    for file in &manifest.common {
        if let Some(text) = read_piece(dir, file, "common module").await {
            variant.common.push_str(&text);
        }
    }

    for entry in &manifest.optional {
        let Some(name) = derive_module_name(&entry.file) else {
            tracing::error!(
                target: "quilt::loader",
                "Could not extract module name from: {}",
                entry.file
            );
            continue;
        };
        let Some(source) = read_piece(dir, &entry.file, "module").await else {
            continue;
        };
        variant.insert(
            Module::new(name, source)
                .with_dependencies(entry.dependencies.iter().cloned())
                .with_position(entry.position),
        );
    }

    if let Some(footer) = manifest.footer.as_deref() {
        variant.footer = read_piece(dir, footer, "footer").await.unwrap_or_default();
    }

    Ok(variant)
}

/// Read one referenced file; failures are logged and yield `None`.
async fn read_piece(dir: &Path, filename: &str, what: &str) -> Option<String> {
    let path = resolve_file(dir, filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::error!(
                target: "quilt::loader",
                "Could not load {}: {} ({})",
                what,
                filename,
                e
            );
            None
        }
    }
}
