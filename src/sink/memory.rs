use super::{RowPut, Table, TableSink, missing_table};
use crate::error::{PipelineError, PipelineResult};
use std::collections::HashMap;

/// In-process store.
///
/// `fail_after(n)` makes the store reject the `(n+1)`-th row it is asked to
/// write, after keeping the first `n`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
    fail_after: Option<usize>,
    written: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fail_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

impl TableSink for MemoryStore {
    fn recreate_table(&mut self, table: &str, family: &str) -> PipelineResult<()> {
        self.tables.insert(table.to_string(), Table::with_family(family));
        Ok(())
    }

    fn put_batch(&mut self, table: &str, puts: Vec<RowPut>) -> PipelineResult<usize> {
        let t = self
            .tables
            .get_mut(table)
            .ok_or_else(|| missing_table(table))?;
        let mut n = 0;
        for put in puts {
            if self.fail_after.is_some_and(|limit| self.written >= limit) {
                return Err(PipelineError::SinkWrite(format!(
                    "injected failure after {} rows",
                    self.written
                )));
            }
            t.apply(table, put)?;
            self.written += 1;
            n += 1;
        }
        Ok(n)
    }

    fn scan(&self, table: &str) -> PipelineResult<Table> {
        self.tables.get(table).cloned().ok_or_else(|| missing_table(table))
    }
}
