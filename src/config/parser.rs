//! TOML file parsing with path context.
//!
//! Errors carry the file path, so a bad `quilt.toml` reports as
//!
//! ```text
//! Failed to parse config file: /srv/quilt/quilt.toml
//! Caused by:
//!     invalid type: string "ten", expected usize
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML file into `T`.
///
/// # Errors
///
/// Fails when the file cannot be read or does not deserialize into `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use quilt::config::{QuiltConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: QuiltConfig = parse_config(Path::new("quilt.toml"))?;
/// println!("cache holds {} versions", config.cache_size);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
