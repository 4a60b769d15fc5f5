//! Quilt - versioned module bundle stitcher
//!
//! Quilt assembles a versioned bundle of source modules into one text
//! artifact on demand. A request names a version and a selection of optional
//! modules; the answer is the version's header, common block, the selected
//! modules with their transitive dependencies (each once, dependencies
//! first) and the footer, with extra content at nine fixed positions.
//!
//! # Architecture Overview
//!
//! One pipeline, leaves first:
//!
//! ```text
//! cache ──▶ disk ──▶ network ──▶ extract ──▶ load ──▶ stitch
//! ```
//!
//! - [`cache`] - bounded LRU of loaded versions, per-name fetch locks
//! - [`version`] - in-memory versions and the manifest-driven loader
//! - [`manifest`] - `manifest.json` parsing and the [`Position`](manifest::Position) enum
//! - [`resolver`] - dependency expansion for one position
//! - [`stitch`] - selectors, overrides and artifact assembly
//! - [`fetch`] - download, extract and load missing versions
//! - [`service`] - the [`Quilt`](service::Quilt) facade tying it together
//!
//! ## Supporting Modules
//! - [`config`] - `quilt.toml` and `QUILT_*` environment overrides
//! - [`core`] - error types and user-facing error rendering
//! - [`cli`] - the `quilt` command line
//! - [`utils`] - filesystem helpers and version name validation
//!
//! # Version Layout
//!
//! ```text
//! {local_path}/1.0.0/
//! ├── manifest.json
//! ├── header.js
//! ├── common.js
//! ├── optional/0.js
//! └── footer.js
//! ```
//!
//! ```json
//! {
//!   "header": "header.js",
//!   "common": ["common.js"],
//!   "optional": {
//!     "optional/0.js": ["8.js"],
//!     "optional/5.js": { "dependancies": [], "position": "before_header" }
//!   },
//!   "footer": "footer.js"
//! }
//! ```
//!
//! Versions missing locally are fetched from
//! `http://<host>:<port><path>/<version>.tgz` and unpacked into `local_path`.
//!
//! # Example
//!
//! ```rust,no_run
//! use quilt::config::QuiltConfig;
//! use quilt::service::Quilt;
//! use quilt::stitch::{Overrides, Selector};
//! use quilt::version::VariantKind;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = QuiltConfig::with_local_path("/srv/quilt").with_remote("archives", 80, "/quilt");
//! let quilt = Quilt::new(config)?;
//!
//! let bundle = quilt
//!     .stitch(&Selector::modules(["0.js"]), "1.0.0", VariantKind::Default, &Overrides::new())
//!     .await?;
//! assert_eq!(bundle, "h\nc\n8\n0\nf1.0.0\n");
//! # Ok(())
//! # }
//! ```

// Core pipeline
pub mod cache;
pub mod fetch;
pub mod manifest;
pub mod resolver;
pub mod service;
pub mod stitch;
pub mod version;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use service::Quilt;
