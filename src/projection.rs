//! Column projection and the composite dedup key.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One projected column: the source index and the label it is stored under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub index: usize,
    pub label: String,
}

impl Column {
    /// A column labelled `R<index>`, the form used on the command line.
    pub fn numbered(index: usize) -> Self {
        Self {
            index,
            label: format!("R{index}"),
        }
    }
}

/// Ordered list of columns to extract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSpec {
    pub columns: Vec<Column>,
}

impl ProjectionSpec {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Projection over `R<i>` labelled columns.
    pub fn of_indices(indices: &[usize]) -> Self {
        Self::new(indices.iter().copied().map(Column::numbered).collect())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }

    /// Largest referenced index, if any column is referenced.
    pub fn max_index(&self) -> Option<usize> {
        self.columns.iter().map(|c| c.index).max()
    }

    /// Extract the configured fields. `None` if `record` is too short.
    pub fn project(&self, record: &Record) -> Option<ProjectedRow> {
        self.columns
            .iter()
            .map(|c| record.field(c.index).map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(ProjectedRow)
    }
}

/// Field values in projection order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectedRow(pub Vec<String>);

impl ProjectedRow {
    /// Fields joined with `,`. Rows with equal field sequences share a key.
    pub fn dedup_key(&self) -> String {
        self.0.join(",")
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

/// Keyed row store used as the dedup set.
///
/// Inserting a row whose key is already present overwrites it; enumeration
/// order is key order, which callers must not rely on for correctness.
#[derive(Clone, Debug, Default)]
pub struct DedupTable {
    rows: BTreeMap<String, ProjectedRow>,
}

impl DedupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key was not present before.
    pub fn insert(&mut self, row: ProjectedRow) -> bool {
        self.rows.insert(row.dedup_key(), row).is_none()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &ProjectedRow> {
        self.rows.values()
    }

    pub fn into_rows(self) -> Vec<ProjectedRow> {
        self.rows.into_values().collect()
    }
}

impl FromIterator<ProjectedRow> for DedupTable {
    fn from_iter<I: IntoIterator<Item = ProjectedRow>>(iter: I) -> Self {
        let mut t = DedupTable::new();
        for row in iter {
            t.insert(row);
        }
        t
    }
}
