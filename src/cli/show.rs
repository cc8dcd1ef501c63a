//! The `show` command: one package's record.

use super::ReadContext;
use crate::cache::QueryCache;
use crate::config::Config;
use anyhow::Result;
use clap::Args;

/// Show one package from the analysis artifact.
#[derive(Args)]
pub struct ShowCommand {
    /// Package name (vendor/package)
    name: String,

    /// Print the raw readme content instead of the full record
    #[arg(long)]
    readme: bool,

    /// Print the documentation tree instead of the full record
    #[arg(long)]
    tree: bool,

    /// Print one documentation file by its path inside the package
    #[arg(long, value_name = "RELATIVE_PATH", conflicts_with_all = ["readme", "tree"])]
    file: Option<String>,
}

impl ShowCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let ctx = ReadContext::new(config);

        let op = if self.readme {
            "show:readme"
        } else if self.tree {
            "show:tree"
        } else if self.file.is_some() {
            "show:file"
        } else {
            "show"
        };
        let key = QueryCache::key(op, &[&self.name, self.file.as_deref().unwrap_or("")]);

        let value = ctx.cache.get_or_compute(&key, &ctx.checksum, || {
            let table = ctx.table()?;
            let record = table
                .by_name(&self.name)
                .ok_or_else(|| anyhow::anyhow!("Package not found: {}", self.name))?;

            if self.readme {
                let readme = record
                    .readme()
                    .ok_or_else(|| anyhow::anyhow!("No readme for {}", self.name))?;
                Ok(serde_json::Value::String(readme.raw_content.clone()))
            } else if self.tree {
                Ok(serde_json::to_value(&record.documentation_tree)?)
            } else if let Some(relative_path) = &self.file {
                let doc = table.by_file(&self.name, relative_path).ok_or_else(|| {
                    anyhow::anyhow!("No documentation file {relative_path} in {}", self.name)
                })?;
                Ok(serde_json::Value::String(doc.raw_content.clone()))
            } else {
                Ok(serde_json::to_value(record)?)
            }
        })?;

        match value.as_ref() {
            serde_json::Value::String(s) => println!("{s}"),
            other => println!("{}", serde_json::to_string_pretty(other)?),
        }
        Ok(())
    }
}
