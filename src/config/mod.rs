//! Configuration for the Quilt service.
//!
//! Configuration comes from a TOML file plus environment overrides:
//!
//! ```toml
//! # quilt.toml
//! local_path = "~/quilt/versions"   # required; `~` and `$VAR` are expanded
//! cache_size = 10                   # versions kept in memory
//!
//! [remote]                          # optional archive store
//! host = "archives.internal"
//! port = 8080                       # default 80
//! path = "/quilt"
//! ```
//!
//! # Resolution Order
//!
//! 1. The file given with `--config`, else `QUILT_CONFIG`, else `quilt.toml`
//!    in the working directory if it exists (no file is fine)
//! 2. `QUILT_LOCAL_PATH`, `QUILT_CACHE_SIZE`, `QUILT_REMOTE_HOST`,
//!    `QUILT_REMOTE_PORT` and `QUILT_REMOTE_PATH` replace file values
//! 3. `local_path` is shell-expanded
//!
//! Missing values are not an error here. [`QuiltConfig::validate`] runs when
//! the [`Quilt`](crate::service::Quilt) service is built.

mod parser;

pub use parser::parse_config;

use crate::constants::{
    ARCHIVE_EXTENSION, CACHE_SIZE_ENV, CONFIG_PATH_ENV, DEFAULT_CACHE_SIZE, DEFAULT_CONFIG_FILE,
    DEFAULT_REMOTE_PORT, HEALTH_CHECK_FILE, LOCAL_PATH_ENV, REMOTE_HOST_ENV, REMOTE_PATH_ENV,
    REMOTE_PORT_ENV,
};
use crate::core::QuiltError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuiltConfig {
    /// Directory holding one subdirectory per version.
    #[serde(default)]
    pub local_path: Option<PathBuf>,

    /// Number of loaded versions kept in memory.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Remote archive store used when a version is not on disk.
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl Default for QuiltConfig {
    fn default() -> Self {
        Self {
            local_path: None,
            cache_size: DEFAULT_CACHE_SIZE,
            remote: None,
        }
    }
}

/// Location of the remote archive store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Host name or address.
    #[serde(default)]
    pub host: Option<String>,

    /// TCP port.
    #[serde(default = "default_remote_port")]
    pub port: u16,

    /// URL path prefix under which `<version>.tgz` archives live.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_REMOTE_PORT,
            path: None,
        }
    }
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_remote_port() -> u16 {
    DEFAULT_REMOTE_PORT
}

impl QuiltConfig {
    /// Configuration rooted at `local_path` with defaults for everything else.
    pub fn with_local_path(local_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: Some(local_path.into()),
            ..Self::default()
        }
    }

    /// Set the remote archive store.
    #[must_use]
    pub fn with_remote(mut self, host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        self.remote = Some(RemoteConfig {
            host: Some(host.into()),
            port,
            path: Some(path.into()),
        });
        self
    }

    /// Set the cache capacity.
    #[must_use]
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Load configuration from `path` (or the default locations) and apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly named file is missing or any file is
    /// malformed, or when an override has an unparsable value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                parse_config(&path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    tracing::debug!("Loading configuration from {}", default_path.display());
                    parse_config(default_path)?
                } else {
                    tracing::debug!("No configuration file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.expand_local_path()?;
        Ok(config)
    }

    /// Replace values with those returned by `lookup` for the `QUILT_*`
    /// override keys.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(local_path) = get(LOCAL_PATH_ENV) {
            self.local_path = Some(PathBuf::from(local_path));
        }
        if let Some(cache_size) = get(CACHE_SIZE_ENV) {
            self.cache_size = cache_size
                .parse()
                .with_context(|| format!("{CACHE_SIZE_ENV} must be a number, got '{cache_size}'"))?;
        }
        if let Some(host) = get(REMOTE_HOST_ENV) {
            self.remote.get_or_insert_with(RemoteConfig::default).host = Some(host);
        }
        if let Some(port) = get(REMOTE_PORT_ENV) {
            self.remote.get_or_insert_with(RemoteConfig::default).port = port
                .parse()
                .with_context(|| format!("{REMOTE_PORT_ENV} must be a port number, got '{port}'"))?;
        }
        if let Some(path) = get(REMOTE_PATH_ENV) {
            self.remote.get_or_insert_with(RemoteConfig::default).path = Some(path);
        }
        Ok(())
    }

    /// Expand `~` and environment variables in `local_path`.
    pub fn expand_local_path(&mut self) -> Result<()> {
        let Some(raw) = self.local_path.as_ref().and_then(|p| p.to_str()) else {
            return Ok(());
        };
        let expanded = shellexpand::full(raw)
            .with_context(|| format!("Failed to expand local_path '{raw}'"))?
            .into_owned();
        self.local_path = Some(PathBuf::from(expanded));
        Ok(())
    }

    /// Check the values the service cannot run without.
    ///
    /// # Errors
    ///
    /// [`QuiltError::ConfigError`] when `local_path` is missing or empty or
    /// `cache_size` is 0.
    pub fn validate(&self) -> Result<&Path, QuiltError> {
        let local_path = self
            .local_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| QuiltError::ConfigError {
                message: "local_path is required".to_string(),
            })?;
        if self.cache_size == 0 {
            return Err(QuiltError::ConfigError {
                message: "cache_size must be at least 1".to_string(),
            });
        }
        Ok(local_path)
    }
}

/// A remote store with both host and path present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    host: String,
    port: u16,
    path: String,
}

impl RemoteConfig {
    /// The usable endpoint, or which setting is missing.
    pub fn endpoint(&self) -> Result<RemoteEndpoint, QuiltError> {
        let host = self
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| QuiltError::RemoteNotConfigured {
                missing: "remote.host".to_string(),
            })?;
        let path = self.path.as_deref().ok_or_else(|| QuiltError::RemoteNotConfigured {
            missing: "remote.path".to_string(),
        })?;

        let path = path.trim_end_matches('/');
        let path = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Ok(RemoteEndpoint {
            host: host.to_string(),
            port: self.port,
            path,
        })
    }
}

impl RemoteEndpoint {
    /// `http://host:port/path`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    /// Archive location for `version_name`.
    pub fn archive_url(&self, version_name: &str) -> String {
        format!("{}/{}.{}", self.base_url(), version_name, ARCHIVE_EXTENSION)
    }

    /// Health probe location.
    pub fn health_url(&self) -> String {
        format!("{}/{}", self.base_url(), HEALTH_CHECK_FILE)
    }

    /// Archive location with a `<version>` placeholder, for status output.
    pub fn archive_url_template(&self) -> String {
        self.archive_url("<version>")
    }
}
