//! `quilt health` - probe the remote archive store.

use crate::core::QuiltError;
use crate::service::Quilt;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Check that the remote archive store answers its health probe.
///
/// Healthy when no remote is configured.
#[derive(Args, Debug)]
pub struct HealthCommand {}

impl HealthCommand {
    /// Print the result; an unhealthy remote is returned as an error.
    pub async fn execute(self, quilt: &Quilt) -> Result<()> {
        match quilt.health().await {
            (true, _) => {
                println!("{} healthy", "✓".green());
                Ok(())
            }
            (false, problem) => Err(QuiltError::NetworkError {
                operation: "health check".to_string(),
                reason: problem.unwrap_or_else(|| "unknown problem".to_string()),
            }
            .into()),
        }
    }
}
