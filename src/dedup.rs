//! Filter → project → deduplicate → load.
//!
//! A run reads its input once, sequentially, keeping one [`ProjectedRow`] per
//! distinct projected tuple. The sink table is dropped and recreated before
//! the surviving rows are written under fresh keys `"0"`, `"1"`, ...; the table
//! therefore only ever holds the latest run's output.

use crate::config::{DedupConfig, ShortRowPolicy};
use crate::error::{PipelineError, PipelineResult};
use crate::io::LineSource;
use crate::projection::{DedupTable, ProjectedRow};
use crate::record::{PIPE, Record};
use crate::sink::{RowPut, TableSink};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters from one completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub table: String,
    pub lines_read: usize,
    pub rows_matched: usize,
    pub rows_skipped: usize,
    pub rows_loaded: usize,
}

pub struct DedupPipeline<'a> {
    config: &'a DedupConfig,
}

impl<'a> DedupPipeline<'a> {
    pub fn new(config: &'a DedupConfig) -> Self {
        Self { config }
    }

    /// Read, filter and deduplicate without touching the sink.
    pub fn select(&self, source: &dyn LineSource) -> PipelineResult<(DedupTable, RunResult)> {
        let cfg = self.config;
        if !cfg.filter.op.is_known() {
            warn!(op = %cfg.filter.op, "unknown compare operator; no row will match");
        }
        let needed = cfg.required_fields();
        let mut stats = RunResult {
            table: cfg.table.clone(),
            ..Default::default()
        };
        let mut rows = DedupTable::new();

        for (idx, line) in source.open(&cfg.input)?.enumerate() {
            let line = line?;
            let lineno = idx + 1;
            stats.lines_read += 1;

            let record = Record::parse(&line, PIPE);
            if record.len() < needed {
                match cfg.short_rows {
                    ShortRowPolicy::Abort => {
                        return Err(PipelineError::ShortRecord {
                            line: lineno,
                            needed,
                            found: record.len(),
                        });
                    }
                    ShortRowPolicy::Skip => {
                        warn!(line = lineno, needed, found = record.len(), "skipping short line");
                        stats.rows_skipped += 1;
                        continue;
                    }
                }
            }

            if !cfg.filter.matches(&record, lineno)? {
                continue;
            }
            stats.rows_matched += 1;
            if let Some(row) = cfg.projection.project(&record) {
                rows.insert(row);
            }
        }
        debug!(
            lines = stats.lines_read,
            matched = stats.rows_matched,
            distinct = rows.len(),
            "selection complete"
        );
        Ok((rows, stats))
    }

    /// Run end to end: select, recreate the table, load.
    pub fn run(
        &self,
        source: &dyn LineSource,
        sink: &mut dyn TableSink,
    ) -> PipelineResult<RunResult> {
        let (rows, mut stats) = self.select(source)?;
        stats.rows_loaded = self.load(sink, rows.into_rows())?;
        info!(
            table = %stats.table,
            rows = stats.rows_loaded,
            "load complete"
        );
        Ok(stats)
    }

    /// Drop and recreate the table, then write `rows` keyed `0..n`.
    pub fn load(&self, sink: &mut dyn TableSink, rows: Vec<ProjectedRow>) -> PipelineResult<usize> {
        let cfg = self.config;
        sink.recreate_table(&cfg.table, &cfg.family)?;
        let puts = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| to_put(i, &cfg.family, cfg.projection.labels(), row))
            .collect();
        sink.put_batch(&cfg.table, puts)
    }
}

fn to_put<'l>(
    index: usize,
    family: &str,
    labels: impl Iterator<Item = &'l str>,
    row: ProjectedRow,
) -> RowPut {
    labels
        .zip(row.0)
        .fold(RowPut::new(index.to_string(), family), |put, (label, value)| {
            put.cell(label, value)
        })
}
