//! Relational predicates over a numeric column.
//!
//! `eq` and `ne` compare `f64` values exactly, with all the usual
//! floating-point caveats. An operator string that is not one of the six
//! known names parses into [`CompareOp::Unknown`], which never matches.

use crate::error::{PipelineError, PipelineResult};
use crate::record::Record;
use crate::utils::parse_f64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Gt,
    Ge,
    Eq,
    Ne,
    Le,
    Lt,
    /// Unrecognized operator text; evaluates to `false` for every value.
    Unknown(String),
}

impl CompareOp {
    pub fn is_known(&self) -> bool {
        !matches!(self, CompareOp::Unknown(_))
    }
}

impl FromStr for CompareOp {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "gt" => CompareOp::Gt,
            "ge" => CompareOp::Ge,
            "eq" => CompareOp::Eq,
            "ne" => CompareOp::Ne,
            "le" => CompareOp::Le,
            "lt" => CompareOp::Lt,
            other => CompareOp::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Le => "le",
            CompareOp::Lt => "lt",
            CompareOp::Unknown(s) => s,
        };
        f.write_str(s)
    }
}

/// Evaluate `value <op> threshold`.
#[allow(clippy::float_cmp)]
pub fn compare(op: &CompareOp, threshold: f64, value: f64) -> bool {
    match op {
        CompareOp::Gt => value > threshold,
        CompareOp::Ge => value >= threshold,
        CompareOp::Eq => value == threshold,
        CompareOp::Ne => value != threshold,
        CompareOp::Le => value <= threshold,
        CompareOp::Lt => value < threshold,
        CompareOp::Unknown(_) => false,
    }
}

/// `{column, op, threshold}`, fixed for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: usize,
    pub op: CompareOp,
    pub threshold: f64,
}

impl FilterSpec {
    pub fn new(column: usize, op: CompareOp, threshold: f64) -> Self {
        Self { column, op, threshold }
    }

    /// Parse the compare column of `record` and evaluate the predicate.
    ///
    /// `line` is the 1-based input line number used in error reports.
    pub fn matches(&self, record: &Record, line: usize) -> PipelineResult<bool> {
        let raw = record.field(self.column).ok_or(PipelineError::ShortRecord {
            line,
            needed: self.column.saturating_add(1),
            found: record.len(),
        })?;
        let value = parse_f64(raw).ok_or_else(|| PipelineError::Parse {
            line,
            column: self.column,
            value: raw.to_string(),
        })?;
        Ok(compare(&self.op, self.threshold, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PIPE;

    fn op(s: &str) -> CompareOp {
        s.parse().unwrap()
    }

    #[test]
    fn equal_values_satisfy_inclusive_operators_only() {
        assert!(compare(&op("eq"), 5.0, 5.0));
        assert!(compare(&op("ge"), 5.0, 5.0));
        assert!(compare(&op("le"), 5.0, 5.0));
        assert!(!compare(&op("gt"), 5.0, 5.0));
        assert!(!compare(&op("lt"), 5.0, 5.0));
        assert!(!compare(&op("ne"), 5.0, 5.0));
    }

    #[test]
    fn distinct_values_satisfy_strict_operators() {
        assert!(compare(&op("gt"), 5.0, 9.9));
        assert!(compare(&op("lt"), 5.0, 1.0));
        assert!(compare(&op("ne"), 5.0, 5.1));
        assert!(!compare(&op("eq"), 5.0, 5.1));
        assert!(!compare(&op("le"), 5.0, 9.9));
        assert!(!compare(&op("ge"), 5.0, 1.0));
    }

    #[test]
    fn unknown_operator_never_matches() {
        let zz = op("zz");
        assert_eq!(zz, CompareOp::Unknown("zz".into()));
        assert!(!zz.is_known());
        for v in [-1.0, 0.0, 5.0, 1e9] {
            assert!(!compare(&zz, 5.0, v));
        }
        // operator names are case-sensitive
        assert!(!op("GT").is_known());
    }

    #[test]
    fn exact_equality_inherits_float_rounding() {
        assert!(!compare(&op("eq"), 0.3, 0.1 + 0.2));
    }

    #[test]
    fn filter_spec_reads_column() -> anyhow::Result<()> {
        let spec = FilterSpec::new(2, CompareOp::Gt, 5.0);
        assert!(!spec.matches(&Record::parse("1|2|5.0|x", PIPE), 1)?);
        assert!(spec.matches(&Record::parse("3|4|9.9|y", PIPE), 2)?);
        Ok(())
    }

    #[test]
    fn filter_spec_rejects_non_numeric() {
        let spec = FilterSpec::new(1, CompareOp::Gt, 5.0);
        let err = spec.matches(&Record::parse("1|abc", PIPE), 7).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 7, column: 1, .. }));
    }
}
