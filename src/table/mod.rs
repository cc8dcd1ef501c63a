//! Tabular query adapter over the persisted artifact.
//!
//! The table is loaded fresh from the persisted document per call, never from
//! a long-lived in-memory structure, so orchestrator rewrites are immediately
//! visible to readers. Sort keys are validated against an allow-list; an
//! unrecognized key silently falls back to rank ascending. Name is always the
//! secondary sort key so ordering is deterministic across equal primary
//! values.

use crate::core::PackageKind;
use crate::record::{DependencyRecord, DocFile};
use crate::store::ArtifactStore;
use anyhow::Result;
use std::cmp::Ordering;

/// Allow-listed sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// 1-based usage rank.
    #[default]
    Rank,
    /// Package name.
    Name,
    /// Usage count.
    UsageCount,
    /// Production/development kind.
    Kind,
}

impl SortKey {
    /// Parse a sort key from user input; `None` for anything off the
    /// allow-list.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rank" => Some(Self::Rank),
            "name" => Some(Self::Name),
            "usage" | "usagecount" | "usage_count" => Some(Self::UsageCount),
            "kind" | "type" => Some(Self::Kind),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// One query over the table.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Restrict to one dependency kind.
    pub kind: Option<PackageKind>,
    /// Primary sort key.
    pub sort: SortKey,
    /// Sort direction for the primary key.
    pub direction: SortDirection,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
    /// Rows skipped before the first returned row.
    pub offset: usize,
}

impl Query {
    /// Build a query from raw user input.
    ///
    /// An unrecognized sort key falls back to rank ascending, overriding the
    /// requested direction.
    pub fn from_raw(
        kind: Option<PackageKind>,
        sort: Option<&str>,
        direction: SortDirection,
        limit: Option<usize>,
        offset: usize,
    ) -> Self {
        let (sort, direction) = match sort {
            None => (SortKey::Rank, direction),
            Some(raw) => match SortKey::parse(raw) {
                Some(key) => (key, direction),
                None => (SortKey::Rank, SortDirection::Asc),
            },
        };
        Self {
            kind,
            sort,
            direction,
            limit,
            offset,
        }
    }
}

/// In-memory, schema-typed view over one artifact snapshot.
pub struct PackageTable {
    records: Vec<DependencyRecord>,
    /// Checksum of the manifest the snapshot was built from.
    pub manifest_checksum: String,
}

impl PackageTable {
    /// Load a fresh snapshot from the persisted artifact.
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let artifact = store.load()?;
        Ok(Self {
            manifest_checksum: artifact.manifest_checksum,
            records: artifact.packages.into_values().collect(),
        })
    }

    /// Filter, sort, and paginate.
    pub fn query(&self, query: &Query) -> Vec<&DependencyRecord> {
        let mut rows: Vec<&DependencyRecord> = self
            .records
            .iter()
            .filter(|r| query.kind.is_none_or(|k| r.kind == k))
            .collect();

        rows.sort_by(|a, b| {
            let primary = match query.sort {
                SortKey::Rank => a.rank.cmp(&b.rank),
                SortKey::Name => a.name.cmp(&b.name),
                SortKey::UsageCount => a.usage_count.cmp(&b.usage_count),
                SortKey::Kind => a.kind.cmp(&b.kind),
            };
            let primary = match query.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            // Name as the stable secondary key
            match primary {
                Ordering::Equal => a.name.cmp(&b.name),
                other => other,
            }
        });

        rows.into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// All records, rank ascending.
    pub fn all(&self) -> Vec<&DependencyRecord> {
        self.query(&Query::default())
    }

    /// One record by exact name.
    pub fn by_name(&self, name: &str) -> Option<&DependencyRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// All records of one kind, rank ascending.
    pub fn by_kind(&self, kind: PackageKind) -> Vec<&DependencyRecord> {
        self.query(&Query {
            kind: Some(kind),
            ..Query::default()
        })
    }

    /// Top N records by rank.
    pub fn top_n(&self, n: usize) -> Vec<&DependencyRecord> {
        self.query(&Query {
            limit: Some(n),
            ..Query::default()
        })
    }

    /// Records with a discovered (non-placeholder) logo, rank ascending.
    pub fn with_logos(&self, limit: Option<usize>) -> Vec<&DependencyRecord> {
        let mut rows: Vec<&DependencyRecord> = self
            .records
            .iter()
            .filter(|r| r.logo.as_ref().is_some_and(|l| !l.is_placeholder))
            .collect();
        rows.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.name.cmp(&b.name)));
        rows.into_iter().take(limit.unwrap_or(usize::MAX)).collect()
    }

    /// One documentation file of one package by relative path.
    pub fn by_file(&self, package: &str, relative_path: &str) -> Option<&DocFile> {
        self.by_name(package)?
            .documentation_files
            .iter()
            .find(|f| f.relative_path == relative_path)
    }
}
