//! Test utilities for Quilt
//!
//! Helpers shared by unit tests and the integration suite (enabled there with
//! the `test-utils` feature):
//!
//! - [`init_test_logging`] - once-only tracing setup that writes through the
//!   test harness
//! - [`VersionFixture`] - writes version directories and manifests
//!
//! # Example
//!
//! ```rust,no_run
//! use quilt::test_utils::{VersionFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let temp = tempfile::tempdir().unwrap();
//! VersionFixture::standard("1.0.0").write_to(temp.path()).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::VersionFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with
/// neither, logging stays off.
///
/// ```bash
/// RUST_LOG=quilt::fetch=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
