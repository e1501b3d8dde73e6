//! Grouped duration averaging over `source destination duration` triplets.
//!
//! [`map_record`] and [`reduce_group`] are the whole of the job's logic; both
//! are pure apart from emission and safe to re-run on the same input. The
//! scheduling around them (splits, shuffle, reduce partitions) comes from the
//! [`Runner`](crate::runner::Runner). Malformed input never fails the job: a
//! line without exactly three fields, or with a non-numeric duration, simply
//! emits nothing.

use crate::collection::from_vec;
use crate::combiners::DurationStats;
use crate::config::AggregateConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::io::{LineSource, expand_inputs, read_lines, write_parts};
use crate::pipeline::Pipeline;
use crate::record::{SPACE, split_fields, split_lines};
use crate::utils::{SumCount, format_fixed, parse_f64};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Digits after the decimal point in the average column.
pub const AVERAGE_DECIMALS: usize = 3;

/// `"<source> <destination>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn new(source: &str, destination: &str) -> Self {
        Self(format!("{source}{SPACE}{destination}"))
    }

    /// Split back into `(source, destination)`; `None` unless there are
    /// exactly two space-separated parts.
    pub fn parts(&self) -> Option<(&str, &str)> {
        let mut it = self.0.split(SPACE);
        match (it.next(), it.next(), it.next()) {
            (Some(s), Some(d), None) => Some((s, d)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Emit `(key, duration)` for each well-formed triplet line in `chunk`.
pub fn map_record<F: FnMut(GroupKey, f64)>(chunk: &str, mut emit: F) {
    for line in split_lines(chunk) {
        let fields = split_fields(line, SPACE);
        let [source, destination, duration] = fields.as_slice() else {
            continue;
        };
        if let Some(d) = parse_f64(duration) {
            emit(GroupKey::new(source, destination), d);
        }
    }
}

/// Fold one group's durations and format its output line.
pub fn reduce_group<I: IntoIterator<Item = f64>>(key: &GroupKey, durations: I) -> Option<String> {
    let mut acc = SumCount::default();
    for d in durations {
        acc.add(d);
    }
    format_group(key, acc)
}

/// `"<source> <destination> <count> <average>"`, or `None` for an empty
/// accumulator or a key that does not split in two.
pub fn format_group(key: &GroupKey, acc: SumCount) -> Option<String> {
    let (source, destination) = key.parts()?;
    let avg = acc.mean()?;
    Some(format!(
        "{source} {destination} {} {}",
        acc.count,
        format_fixed(avg, AVERAGE_DECIMALS)
    ))
}

#[allow(clippy::ptr_arg)]
fn emitted(chunk: &String) -> Vec<(GroupKey, f64)> {
    let mut out = Vec::new();
    map_record(chunk, |k, d| out.push((k, d)));
    out
}

/// Summary of one job run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub input_files: usize,
    pub lines_read: usize,
    pub groups: usize,
    pub parts: Vec<PathBuf>,
}

pub struct AggregateJob<'a> {
    config: &'a AggregateConfig,
}

impl<'a> AggregateJob<'a> {
    pub fn new(config: &'a AggregateConfig) -> Self {
        Self { config }
    }

    /// Group already-loaded lines; one `Vec` of output lines per reduce
    /// partition. Each key appears in exactly one partition.
    pub fn compute(&self, lines: Vec<String>) -> PipelineResult<Vec<Vec<String>>> {
        let p = Pipeline::default();
        let pairs = from_vec(&p, lines).flat_map(emitted);
        let out = if self.config.map_side_combine {
            pairs
                .combine_values(DurationStats)
                .flat_map(|(k, acc): &(GroupKey, SumCount)| {
                    format_group(k, *acc).into_iter().collect::<Vec<String>>()
                })
        } else {
            pairs
                .group_by_key()
                .flat_map(|(k, ds): &(GroupKey, Vec<f64>)| {
                    reduce_group(k, ds.iter().copied()).into_iter().collect::<Vec<String>>()
                })
        };
        Ok(out.collect_partitions(&self.config.runner())?)
    }

    /// Read every input, group, and write part files under the output dir.
    pub fn run(&self, source: &dyn LineSource) -> PipelineResult<JobReport> {
        if self.config.output.exists() {
            return Err(PipelineError::Argument(format!(
                "output directory {} already exists",
                self.config.output.display()
            )));
        }
        let files = expand_inputs(&self.config.inputs)?;
        let lines = read_lines(source, &files)?;
        let lines_read = lines.len();
        debug!(files = files.len(), lines = lines_read, "inputs loaded");

        let parts = self.compute(lines)?;
        let groups = parts.iter().map(Vec::len).sum();
        let written = write_parts(&self.config.output, &parts).map_err(PipelineError::Job)?;
        info!(groups, parts = written.len(), output = %self.config.output.display(), "job complete");

        Ok(JobReport {
            input_files: files.len(),
            lines_read,
            groups,
            parts: written,
        })
    }
}
