//! Command-line interface for Quilt.
//!
//! # Available Commands
//!
//! - `stitch` - Print the stitched artifact for a version
//! - `status` - Show the local path, remote template and cached versions
//! - `health` - Probe the remote archive store (exit code 1 when unhealthy)
//!
//! # Global Options
//!
//! - `--config <path>` - Configuration file (default `quilt.toml`, or `QUILT_CONFIG`)
//! - `--verbose` - Debug logging on stderr (otherwise `RUST_LOG`, default `warn`)
//!
//! # Example
//!
//! ```bash
//! quilt stitch 1.0.0 0.js 1.js
//! quilt stitch 1.0.0 --all --debug --before-header '/* bundle */'
//! quilt --config /etc/quilt.toml health
//! ```

mod health;
mod status;
mod stitch;

use crate::config::QuiltConfig;
use crate::service::Quilt;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use health::HealthCommand;
pub use status::StatusCommand;
pub use stitch::StitchCommand;

/// Main CLI application structure for Quilt
#[derive(Parser)]
#[command(
    name = "quilt",
    about = "Quilt - Stitch versioned module bundles",
    version,
    long_about = "Quilt assembles a versioned bundle of source modules into a single artifact, \
                  resolving module dependencies and fetching missing versions from a remote archive store."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr.
    ///
    /// Equivalent to `RUST_LOG=debug`.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "QUILT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch modules of a version and print the result.
    Stitch(StitchCommand),
    /// Show service status.
    Status(StatusCommand),
    /// Check the remote archive store.
    Health(HealthCommand),
}

impl Cli {
    /// Load configuration, build the service and run the subcommand.
    ///
    /// # Errors
    ///
    /// Configuration errors, an unavailable version for `stitch`, or an
    /// unhealthy remote for `health`.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose);

        let config = QuiltConfig::load(self.config.as_deref())?;
        let quilt = Quilt::new(config)?;

        match self.command {
            Commands::Stitch(cmd) => cmd.execute(&quilt).await,
            Commands::Status(cmd) => cmd.execute(&quilt).await,
            Commands::Health(cmd) => cmd.execute(&quilt).await,
        }
    }
}

/// Install the tracing subscriber for the binary.
///
/// Logs go to stderr so `stitch` output on stdout stays clean.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
