//! The Quilt service facade.
//!
//! [`Quilt`] owns the configuration and the [`VersionCache`] and exposes the
//! public operations: fetching a version, stitching it, and reporting health
//! and status. One instance is meant to be shared (`Arc<Quilt>`) by all
//! request handlers.

use crate::cache::VersionCache;
use crate::config::QuiltConfig;
use crate::core::QuiltError;
use crate::fetch::{Extractor, Fetcher, TarExtractor};
use crate::stitch::{Overrides, Selector, stitch_version};
use crate::version::{VariantKind, Version};
use std::fmt::Write as _;
use std::sync::Arc;

/// Versioned module bundle service.
///
/// # Examples
///
/// ```rust,no_run
/// use quilt::config::QuiltConfig;
/// use quilt::service::Quilt;
/// use quilt::stitch::{Overrides, Selector};
/// use quilt::version::VariantKind;
///
/// # async fn example() -> anyhow::Result<()> {
/// let quilt = Quilt::new(QuiltConfig::with_local_path("/srv/quilt"))?;
/// let bundle = quilt
///     .stitch(&Selector::modules(["0.js"]), "1.0.0", VariantKind::Default, &Overrides::new())
///     .await?;
/// print!("{bundle}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Quilt {
    config: QuiltConfig,
    cache: VersionCache,
}

impl Quilt {
    /// Build the service, extracting archives with the system `tar`.
    ///
    /// # Errors
    ///
    /// [`QuiltError::ConfigError`] when the configuration has no
    /// `local_path` or a zero `cache_size`, [`QuiltError::IoError`] when a
    /// relative `local_path` cannot be made absolute.
    pub fn new(config: QuiltConfig) -> Result<Self, QuiltError> {
        Self::with_extractor(config, Arc::new(TarExtractor::new()))
    }

    /// Build the service with a specific extraction capability.
    ///
    /// # Errors
    ///
    /// As [`Quilt::new`].
    pub fn with_extractor(
        mut config: QuiltConfig,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self, QuiltError> {
        // Archives are extracted with the version directory as working
        // directory, so every path handed to the extractor must be absolute
        let local_path = std::path::absolute(config.validate()?)?;
        config.local_path = Some(local_path.clone());

        tracing::debug!(
            "Quilt serving {} (cache size {}, remote {})",
            local_path.display(),
            config.cache_size,
            if config.remote.is_some() { "configured" } else { "none" }
        );

        let fetcher =
            Fetcher::new(local_path.clone(), config.remote.clone()).with_extractor(extractor);
        let cache = VersionCache::new(local_path, config.cache_size, fetcher);

        Ok(Self { config, cache })
    }

    /// The configuration the service was built with.
    pub fn config(&self) -> &QuiltConfig {
        &self.config
    }

    /// The version cache.
    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    /// Return the named version from memory, disk or the remote store.
    ///
    /// `None` when it is unavailable; the reason has been logged.
    pub async fn get_version(&self, name: &str) -> Option<Arc<Version>> {
        self.cache.get_version(name).await
    }

    /// Stitch the selected modules of `version_name` into one artifact.
    ///
    /// # Errors
    ///
    /// [`QuiltError::VersionUnavailable`] when the version cannot be loaded
    /// from any source. Bad module references are not errors; they shorten
    /// the output and are logged.
    pub async fn stitch(
        &self,
        selector: &Selector,
        version_name: &str,
        kind: VariantKind,
        overrides: &Overrides,
    ) -> Result<String, QuiltError> {
        let version = self.get_version(version_name).await.ok_or_else(|| {
            QuiltError::VersionUnavailable {
                name: version_name.to_string(),
            }
        })?;
        Ok(stitch_version(&version, selector, kind, overrides))
    }

    /// Probe the remote archive store.
    ///
    /// Returns `(true, None)` when no remote host is configured or the probe
    /// file answers 200, otherwise `(false, Some(problem))`.
    pub async fn health(&self) -> (bool, Option<String>) {
        let remote = match &self.config.remote {
            Some(remote) if remote.host.as_deref().is_some_and(|h| !h.is_empty()) => remote,
            _ => return (true, None),
        };

        let endpoint = match remote.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::warn!(target: "quilt::fetch", "Health check failed: {}", e);
                return (false, Some(e.to_string()));
            }
        };

        let url = endpoint.health_url();
        match self.cache.fetcher().client().get(&url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => (true, None),
            Ok(response) => {
                let problem = format!("HTTP {} from {}", response.status(), url);
                tracing::warn!(target: "quilt::fetch", "Health check failed: {}", problem);
                (false, Some(problem))
            }
            Err(e) => {
                let problem = format!("Could not reach {url}: {e}");
                tracing::warn!(target: "quilt::fetch", "Health check failed: {}", problem);
                (false, Some(problem))
            }
        }
    }

    /// Human-readable status: local path, remote archive URL template and
    /// the versions held in memory.
    pub async fn status(&self) -> String {
        let cached = self.cache.cached_names().await;

        let mut out = String::new();
        let _ = writeln!(out, "local path: {}", self.cache.local_path().display());
        match self.cache.fetcher().endpoint() {
            Ok(endpoint) => {
                let _ = writeln!(out, "remote: {}", endpoint.archive_url_template());
            }
            Err(_) => {
                let _ = writeln!(out, "remote: not configured");
            }
        }
        let _ = writeln!(
            out,
            "cached versions ({}/{}): {}",
            cached.len(),
            self.config.cache_size,
            if cached.is_empty() { "none".to_string() } else { cached.join(", ") }
        );
        out
    }
}
