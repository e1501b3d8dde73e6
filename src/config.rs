//! Run configuration for both pipelines.
//!
//! Values are built once (usually from command-line arguments) and passed
//! explicitly into the pipeline entry points.

use crate::error::{PipelineError, PipelineResult};
use crate::predicate::{CompareOp, FilterSpec};
use crate::projection::{Column, ProjectionSpec};
use crate::runner::{ExecMode, Runner};
use crate::sink::{DEFAULT_FAMILY, DEFAULT_TABLE};
use crate::utils::parse_f64;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

static COLUMN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^R(\d+)$").expect("static regex"));
static SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^select:R(\d+),([^,]*),([^,]+)$").expect("static regex"));

/// What to do with a line that lacks a referenced column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortRowPolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Drop the line and keep going.
    Skip,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    pub input: PathBuf,
    pub filter: FilterSpec,
    pub projection: ProjectionSpec,
    pub table: String,
    pub family: String,
    #[serde(default)]
    pub short_rows: ShortRowPolicy,
}

impl DedupConfig {
    pub fn new(input: impl Into<PathBuf>, filter: FilterSpec, projection: ProjectionSpec) -> Self {
        Self {
            input: input.into(),
            filter,
            projection,
            table: DEFAULT_TABLE.to_string(),
            family: DEFAULT_FAMILY.to_string(),
            short_rows: ShortRowPolicy::default(),
        }
    }

    /// Build from the three positional tokens
    /// `R=<path> select:R<c>,<op>,<v> distinct:R<a>,R<b>,...`.
    pub fn from_tokens(input: &str, select: &str, distinct: &str) -> PipelineResult<Self> {
        Ok(Self::new(
            parse_input(input)?,
            parse_select(select)?,
            parse_distinct(distinct)?,
        ))
    }

    /// Fields a line needs for this run to read every referenced column.
    pub fn required_fields(&self) -> usize {
        let max = self
            .projection
            .max_index()
            .map_or(self.filter.column, |m| m.max(self.filter.column));
        max.saturating_add(1)
    }
}

fn bad(msg: impl Into<String>) -> PipelineError {
    PipelineError::Argument(msg.into())
}

/// A column index whose field count `index + 1` still fits in `usize`.
fn parse_index(digits: &str, token: &str) -> PipelineResult<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|i| i.checked_add(1).is_some())
        .ok_or_else(|| bad(format!("column index out of range in {token:?}")))
}

/// `R=<path>` → `<path>`.
pub fn parse_input(token: &str) -> PipelineResult<PathBuf> {
    match token.strip_prefix("R=") {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(bad(format!("expected R=<file>, got {token:?}"))),
    }
}

/// `select:R<col>,<op>,<threshold>`. Unknown operators are accepted.
pub fn parse_select(token: &str) -> PipelineResult<FilterSpec> {
    let caps = SELECT
        .captures(token)
        .ok_or_else(|| bad(format!("expected select:R<col>,<op>,<value>, got {token:?}")))?;
    let column = parse_index(&caps[1], token)?;
    let Ok(op) = caps[2].parse::<CompareOp>();
    let threshold =
        parse_f64(&caps[3]).ok_or_else(|| bad(format!("threshold is not numeric in {token:?}")))?;
    Ok(FilterSpec::new(column, op, threshold))
}

/// `distinct:R<a>,R<b>,...`. Labels keep the token text, e.g. `R2`.
pub fn parse_distinct(token: &str) -> PipelineResult<ProjectionSpec> {
    let list = token
        .strip_prefix("distinct:")
        .ok_or_else(|| bad(format!("expected distinct:R<col>,..., got {token:?}")))?;
    let columns = list
        .split(',')
        .map(|c| {
            let caps = COLUMN
                .captures(c)
                .ok_or_else(|| bad(format!("bad column {c:?} in {token:?}")))?;
            Ok(Column {
                index: parse_index(&caps[1], token)?,
                label: c.to_string(),
            })
        })
        .collect::<PipelineResult<Vec<_>>>()?;
    Ok(ProjectionSpec::new(columns))
}

/// Settings for the grouping job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateConfig {
    pub inputs: Vec<String>,
    pub output: PathBuf,
    /// Worker threads; `None` uses one per core.
    pub threads: Option<usize>,
    /// Number of input splits and reduce partitions.
    pub partitions: Option<usize>,
    /// Pre-aggregate per split before the shuffle.
    #[serde(default)]
    pub map_side_combine: bool,
    #[serde(default)]
    pub sequential: bool,
}

impl AggregateConfig {
    pub fn new(inputs: Vec<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            output: output.into(),
            threads: None,
            partitions: None,
            map_side_combine: false,
            sequential: false,
        }
    }

    /// Split positional arguments `<in>... <out>`.
    pub fn from_args(mut args: Vec<String>) -> PipelineResult<Self> {
        if args.len() < 2 {
            return Err(bad("usage: <in> [<in>...] <out>"));
        }
        let output = args.pop().unwrap_or_default();
        Ok(Self::new(args, output))
    }

    pub fn runner(&self) -> Runner {
        if self.sequential {
            return Runner::sequential();
        }
        Runner {
            mode: ExecMode::Parallel {
                threads: self.threads,
                partitions: self.partitions,
            },
            ..Default::default()
        }
    }
}
