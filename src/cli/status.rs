//! `quilt status` - show service status.

use crate::service::Quilt;
use anyhow::Result;
use clap::Args;

/// Print the local path, the remote archive URL template and the versions
/// held in memory.
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Load these versions first so they show as cached
    #[arg(long, value_name = "VERSION")]
    warm: Vec<String>,
}

impl StatusCommand {
    /// Print status to stdout.
    pub async fn execute(self, quilt: &Quilt) -> Result<()> {
        for name in &self.warm {
            if quilt.get_version(name).await.is_none() {
                tracing::warn!("Could not warm version {}", name);
            }
        }
        print!("{}", quilt.status().await);
        Ok(())
    }
}
