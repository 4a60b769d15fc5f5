//! Quilt CLI entry point
//!
//! Parses arguments, runs the command and prints errors with suggestions.
//!
//! - `stitch` - Print the stitched artifact for a version
//! - `status` - Show local path, remote template and cached versions
//! - `health` - Probe the remote archive store

use anyhow::Result;
use clap::Parser;
use quilt::cli;
use quilt::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
