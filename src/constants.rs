//! Global constants used throughout the Quilt codebase.
//!
//! File names, defaults and environment variable names that are shared by
//! the loader, the fetch pipeline and the configuration layer live here so
//! they are defined once.

/// Name of the manifest file at the root of every version directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// File extension of remote version archives (`<name>.tgz`).
pub const ARCHIVE_EXTENSION: &str = "tgz";

/// File fetched from the remote archive store by the health probe.
pub const HEALTH_CHECK_FILE: &str = "health_check.txt";

/// Number of loaded versions kept in memory when no capacity is configured.
pub const DEFAULT_CACHE_SIZE: usize = 10;

/// Port used for the remote archive store when none is configured.
pub const DEFAULT_REMOTE_PORT: u16 = 80;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "quilt.toml";

/// Environment variable pointing at an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "QUILT_CONFIG";

/// Environment overrides applied on top of the configuration file.
pub const LOCAL_PATH_ENV: &str = "QUILT_LOCAL_PATH";
/// Overrides `remote.host`.
pub const REMOTE_HOST_ENV: &str = "QUILT_REMOTE_HOST";
/// Overrides `remote.port`.
pub const REMOTE_PORT_ENV: &str = "QUILT_REMOTE_PORT";
/// Overrides `remote.path`.
pub const REMOTE_PATH_ENV: &str = "QUILT_REMOTE_PATH";
/// Overrides `cache_size`.
pub const CACHE_SIZE_ENV: &str = "QUILT_CACHE_SIZE";
