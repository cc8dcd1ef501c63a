//! The `logos` command: packages with discovered logos.

use super::ReadContext;
use crate::cache::QueryCache;
use crate::config::Config;
use anyhow::Result;
use clap::Args;

/// List packages whose logo was discovered (placeholders excluded).
#[derive(Args)]
pub struct LogosCommand {
    /// Maximum number of packages
    #[arg(long)]
    limit: Option<usize>,
}

impl LogosCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let ctx = ReadContext::new(config);
        let key = QueryCache::key(
            "logos",
            &[&self.limit.map(|l| l.to_string()).unwrap_or_default()],
        );

        let rows = ctx.cache.get_or_compute(&key, &ctx.checksum, || {
            let table = ctx.table()?;
            Ok(serde_json::Value::Array(
                table
                    .with_logos(self.limit)
                    .iter()
                    .filter_map(|r| {
                        let logo = r.logo.as_ref()?;
                        Some(serde_json::json!({
                            "name": r.name,
                            "rank": r.rank,
                            "logoUrl": logo.stored_url,
                            "source": logo.source_path,
                        }))
                    })
                    .collect(),
            ))
        })?;

        println!("{}", serde_json::to_string_pretty(rows.as_ref())?);
        Ok(())
    }
}
