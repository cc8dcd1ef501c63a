//! The `top` command: top-N packages by usage rank.

use super::{OutputFormat, ReadContext, listing_value, print_rows};
use crate::cache::QueryCache;
use crate::config::Config;
use anyhow::Result;
use clap::Args;

/// Show the most-used packages.
#[derive(Args)]
pub struct TopCommand {
    /// How many packages to show
    #[arg(default_value_t = 10)]
    count: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

impl TopCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let ctx = ReadContext::new(config);
        let key = QueryCache::key("top", &[&self.count.to_string()]);

        let rows = ctx.cache.get_or_compute(&key, &ctx.checksum, || {
            let table = ctx.table()?;
            Ok(listing_value(&table.top_n(self.count)))
        })?;

        print_rows(rows.as_ref(), self.format)
    }
}
