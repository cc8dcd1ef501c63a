//! The `list` command: filtered, sorted, paginated package listing.

use super::{OutputFormat, ReadContext, listing_value, print_rows};
use crate::cache::QueryCache;
use crate::config::Config;
use crate::core::PackageKind;
use crate::table::{Query, SortDirection};
use anyhow::Result;
use clap::Args;

/// List packages from the analysis artifact.
#[derive(Args)]
pub struct ListCommand {
    /// Restrict to one dependency kind (production or development)
    #[arg(long)]
    kind: Option<String>,

    /// Sort key: rank, name, usage, or kind (unknown keys fall back to rank)
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction for the primary key
    #[arg(long, value_enum, default_value = "asc")]
    direction: Direction,

    /// Maximum number of rows
    #[arg(long)]
    limit: Option<usize>,

    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

/// CLI-facing sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum Direction {
    #[default]
    Asc,
    Desc,
}

impl ListCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let ctx = ReadContext::new(config);

        let kind = self.kind.as_deref().and_then(PackageKind::parse);
        let direction = match self.direction {
            Direction::Asc => SortDirection::Asc,
            Direction::Desc => SortDirection::Desc,
        };
        let query = Query::from_raw(kind, self.sort.as_deref(), direction, self.limit, self.offset);

        let key = QueryCache::key(
            "list",
            &[
                &self.kind.clone().unwrap_or_default(),
                &self.sort.clone().unwrap_or_default(),
                &format!("{direction:?}"),
                &self.limit.map(|l| l.to_string()).unwrap_or_default(),
                &self.offset.to_string(),
            ],
        );

        let rows = ctx.cache.get_or_compute(&key, &ctx.checksum, || {
            let table = ctx.table()?;
            Ok(listing_value(&table.query(&query)))
        })?;

        print_rows(rows.as_ref(), self.format)
    }
}
