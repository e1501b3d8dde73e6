//! Column-family key-value sink.
//!
//! A table holds rows keyed by an opaque string; each row maps
//! `family → qualifier → value`. Writes are not transactional: a failing
//! batch may leave a prefix of its rows behind.

mod json_dir;
mod memory;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default table for dedup output.
pub const DEFAULT_TABLE: &str = "Result";

/// Default column family for dedup output.
pub const DEFAULT_FAMILY: &str = "res";

/// One row write: every cell goes to `family`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowPut {
    pub row_key: String,
    pub family: String,
    pub cells: Vec<(String, String)>,
}

impl RowPut {
    pub fn new(row_key: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            row_key: row_key.into(),
            family: family.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, qualifier: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.push((qualifier.into(), value.into()));
        self
    }
}

/// Stored cells of one row: `family → qualifier → value`.
pub type RowCells = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub families: BTreeSet<String>,
    pub rows: BTreeMap<String, RowCells>,
}

impl Table {
    pub fn with_family(family: &str) -> Self {
        Self {
            families: BTreeSet::from([family.to_string()]),
            rows: BTreeMap::new(),
        }
    }

    /// Apply one put. Cells of an existing row are merged, not replaced.
    pub fn apply(&mut self, table: &str, put: RowPut) -> PipelineResult<()> {
        if !self.families.contains(&put.family) {
            return Err(PipelineError::SinkWrite(format!(
                "table {table} has no column family {}",
                put.family
            )));
        }
        let family = self
            .rows
            .entry(put.row_key)
            .or_default()
            .entry(put.family)
            .or_default();
        family.extend(put.cells);
        Ok(())
    }

    /// Value at `row_key` / `family:qualifier`.
    pub fn get(&self, row_key: &str, family: &str, qualifier: &str) -> Option<&str> {
        self.rows
            .get(row_key)?
            .get(family)?
            .get(qualifier)
            .map(String::as_str)
    }
}

pub trait TableSink {
    /// Drop `table` if it exists, then create it with a single `family`.
    fn recreate_table(&mut self, table: &str, family: &str) -> PipelineResult<()>;

    /// Write `puts` in order. Returns the number of rows written.
    fn put_batch(&mut self, table: &str, puts: Vec<RowPut>) -> PipelineResult<usize>;

    /// Snapshot of the whole table.
    fn scan(&self, table: &str) -> PipelineResult<Table>;
}

fn missing_table(table: &str) -> PipelineError {
    PipelineError::SinkWrite(format!("table {table} does not exist"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_rejects_unknown_family() {
        let mut t = Table::with_family("res");
        let err = t
            .apply("Result", RowPut::new("0", "other").cell("R0", "x"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::SinkWrite(_)));
    }

    #[test]
    fn apply_and_get() -> anyhow::Result<()> {
        let mut t = Table::with_family("res");
        t.apply("Result", RowPut::new("0", "res").cell("R0", "3").cell("R1", "4"))?;
        assert_eq!(t.get("0", "res", "R1"), Some("4"));
        assert_eq!(t.get("1", "res", "R1"), None);
        Ok(())
    }
}
