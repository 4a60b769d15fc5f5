//! Remote fetch-and-extract pipeline.
//!
//! When a version is neither cached nor on disk, [`Fetcher::fetch_and_load`]
//! downloads `<remote>/<name>.tgz`, unpacks it into `local_path/<name>/` and
//! loads the result:
//!
//! ```text
//! acquire fetch lock(name)
//!   └─ manifest on disk?  ── yes ──▶ load
//!        │ no
//!        ▼
//!   GET http://host:port/path/<name>.tgz   (200 only, no retry)
//!        ▼
//!   write <local>/<name>/<name>.tgz
//!        ▼
//!   extract in <local>/<name>/, delete archive
//!        ▼
//!   load  (failure removes <local>/<name>/)
//! ```
//!
//! The lock makes concurrent misses for one name converge on a single
//! download: the winner installs the version, the waiters find the manifest
//! on their re-check. Different names fetch in parallel.

mod extract;

pub use extract::{ExtractOutput, Extractor, TarExtractor};

use crate::cache::FetchLocks;
use crate::config::{RemoteConfig, RemoteEndpoint};
use crate::constants::ARCHIVE_EXTENSION;
use crate::core::QuiltError;
use crate::utils::{cleanup_dir, ensure_dir};
use crate::version::{Version, load_version, manifest_exists};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Downloads, extracts and loads versions missing from disk.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    local_path: PathBuf,
    remote: Option<RemoteConfig>,
    extractor: Arc<dyn Extractor>,
    locks: FetchLocks,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("local_path", &self.local_path)
            .field("remote", &self.remote)
            .field("pending_locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Fetcher installing into `local_path`, extracting with the system `tar`.
    pub fn new(local_path: impl Into<PathBuf>, remote: Option<RemoteConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            local_path: local_path.into(),
            remote,
            extractor: Arc::new(TarExtractor::new()),
            locks: FetchLocks::new(),
        }
    }

    /// Replace the extraction capability.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// The per-name lock registry.
    pub fn locks(&self) -> &FetchLocks {
        &self.locks
    }

    /// The HTTP client, shared with the health probe.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Remote store settings, if any.
    pub fn remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref()
    }

    /// The usable remote endpoint.
    ///
    /// # Errors
    ///
    /// [`QuiltError::RemoteNotConfigured`] when there is no `[remote]` or it
    /// lacks a host or path.
    pub fn endpoint(&self) -> Result<RemoteEndpoint, QuiltError> {
        match &self.remote {
            Some(remote) => remote.endpoint(),
            None => Err(QuiltError::RemoteNotConfigured {
                missing: "remote.host".to_string(),
            }),
        }
    }

    /// Make `name` available on disk and load it.
    ///
    /// Runs under the fetch lock for `name`; see the module docs for the
    /// steps. Every failure is logged before it is returned.
    pub async fn fetch_and_load(&self, name: &str) -> Result<Version, QuiltError> {
        let _guard = self.locks.acquire(name).await;

        // Another task may have installed it while we waited
        if manifest_exists(&self.local_path, name).await {
            tracing::debug!(target: "quilt::fetch", "Version {} appeared on disk, loading", name);
            return load_version(&self.local_path, name).await;
        }

        let endpoint = self.endpoint().inspect_err(|e| {
            tracing::error!(target: "quilt::fetch", "Cannot fetch version {}: {}", name, e);
        })?;

        let body = self.download(&endpoint, name).await?;

        let dest = self.local_path.join(name);
        self.install(&dest, name, &body).await?;

        match load_version(&self.local_path, name).await {
            Ok(version) => {
                tracing::info!(target: "quilt::fetch", "Fetched version {}", name);
                Ok(version)
            }
            Err(e) => {
                tracing::error!(
                    target: "quilt::fetch",
                    "Fetched version {} could not be loaded: {}",
                    name,
                    e
                );
                cleanup_dir(&dest).await;
                Err(e)
            }
        }
    }

    async fn download(&self, endpoint: &RemoteEndpoint, name: &str) -> Result<Vec<u8>, QuiltError> {
        let url = endpoint.archive_url(name);
        tracing::debug!(target: "quilt::fetch", "Fetching version {} from {}", name, url);

        let network_error = |reason: String| {
            tracing::error!(
                target: "quilt::fetch",
                "Error fetching remote version {}: {}",
                name,
                reason
            );
            QuiltError::NetworkError {
                operation: format!("GET {url}"),
                reason,
            }
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(network_error(format!("HTTP {status}")));
        }

        let body = response.bytes().await.map_err(|e| network_error(e.to_string()))?;
        tracing::debug!(
            target: "quilt::fetch",
            "Downloaded {} bytes for version {}",
            body.len(),
            name
        );
        Ok(body.to_vec())
    }

    /// Write and unpack the archive into `dest`, removing `dest` on failure.
    async fn install(&self, dest: &Path, name: &str, body: &[u8]) -> Result<(), QuiltError> {
        let archive = dest.join(format!("{name}.{ARCHIVE_EXTENSION}"));

        if let Err(e) = write_archive(dest, &archive, body).await {
            tracing::error!(
                target: "quilt::fetch",
                "Could not write archive {}: {}",
                archive.display(),
                e
            );
            cleanup_dir(dest).await;
            return Err(e.into());
        }

        let output = self.run_extractor(&archive, dest).await;

        if let Err(e) = tokio::fs::remove_file(&archive).await {
            tracing::warn!(
                target: "quilt::fetch",
                "Could not remove archive {}: {}",
                archive.display(),
                e
            );
        }

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(target: "quilt::fetch", "Could not run extractor for {}: {}", name, e);
                cleanup_dir(dest).await;
                return Err(e.into());
            }
        };

        if !output.is_success() {
            let captured = output.combined();
            tracing::error!(
                target: "quilt::fetch",
                "Error unpacking version {} (exit code {}): {}",
                name,
                output.exit_code,
                captured
            );
            cleanup_dir(dest).await;
            return Err(QuiltError::ExtractionFailed {
                archive: archive.display().to_string(),
                exit_code: output.exit_code,
                output: captured,
            });
        }

        Ok(())
    }

    async fn run_extractor(&self, archive: &Path, dest: &Path) -> io::Result<ExtractOutput> {
        let extractor = Arc::clone(&self.extractor);
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extractor.extract(&archive, &dest))
            .await
            .map_err(io::Error::other)?
    }
}

async fn write_archive(dest: &Path, archive: &Path, body: &[u8]) -> io::Result<()> {
    ensure_dir(dest).await?;
    tokio::fs::write(archive, body).await
}
