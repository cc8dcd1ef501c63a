//! The `status` command: gate verdict and artifact summary.

use crate::config::Config;
use crate::store::ArtifactStore;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Show whether the artifact is fresh and what it contains.
#[derive(Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let store = ArtifactStore::new(config);

        match store.load() {
            Ok(artifact) => {
                println!("artifact:  {}", config.artifact_path().display());
                println!("generated: {}", artifact.generated_at);
                println!("packages:  {}", artifact.packages.len());
                println!("checksum:  {}", artifact.manifest_checksum);
            }
            Err(_) => {
                println!("artifact:  {}", "absent".yellow());
            }
        }

        if store.needs_refresh()? {
            println!("status:    {}", "refresh needed".yellow());
        } else {
            println!("status:    {}", "up to date".green());
        }
        Ok(())
    }
}
