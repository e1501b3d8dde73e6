//! # recordbeam
//!
//! Two batch pipelines over delimiter-separated text records, built on a
//! small deferred-execution engine.
//!
//! ## Dedup pipeline
//!
//! Reads `|`-delimited rows, keeps those whose numeric column satisfies a
//! relational predicate (`gt`, `ge`, `eq`, `ne`, `le`, `lt`), projects a list
//! of columns, removes duplicate projected rows and loads the survivors into a
//! column-family table that is dropped and recreated on every run.
//!
//! ```no_run
//! use recordbeam::*;
//!
//! # fn main() -> Result<(), PipelineError> {
//! let cfg = DedupConfig::from_tokens("R=/data/lineitem.tbl", "select:R4,gt,30", "distinct:R1,R2")?;
//! let mut store = MemoryStore::new();
//! let result = DedupPipeline::new(&cfg).run(&LocalFs, &mut store)?;
//! println!("{} rows loaded", result.rows_loaded);
//! # Ok(())
//! # }
//! ```
//!
//! ## Aggregation job
//!
//! Reads `source destination duration` triplets, groups them by
//! `(source, destination)` and writes `source destination count average`
//! lines, one part file per reduce partition. Malformed lines are dropped.
//!
//! ```no_run
//! use recordbeam::*;
//!
//! # fn main() -> Result<(), PipelineError> {
//! let cfg = AggregateConfig::new(vec!["calls/".into()], "out");
//! let report = AggregateJob::new(&cfg).run(&LocalFs)?;
//! println!("{} groups", report.groups);
//! # Ok(())
//! # }
//! ```
//!
//! ## Engine
//!
//! A [`Pipeline`] is a graph of nodes; a [`PCollection<T>`] is a lazy handle to
//! one of them. Stateless transforms (`map`, `filter`, `flat_map`) are fused
//! and run per input split; `group_by_key` and `combine_values` are shuffle
//! barriers that hand each key to exactly one reduce partition.
//!
//! ```
//! use recordbeam::*;
//!
//! let p = Pipeline::default();
//! let counts = from_vec(&p, vec!["a b".to_string(), "b".to_string()])
//!     .flat_map(|s: &String| s.split(' ').map(|w| (w.to_string(), 1u64)).collect::<Vec<_>>())
//!     .combine_values(Count)
//!     .collect_seq_sorted()
//!     .unwrap();
//! assert_eq!(counts, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
//! ```

pub mod aggregate;
pub mod collection;
pub mod combiners;
pub mod config;
pub mod dedup;
pub mod error;
pub mod helpers;
pub mod io;
pub mod logging;
pub mod node;
pub mod partition;
pub mod pipeline;
pub mod predicate;
pub mod projection;
pub mod record;
pub mod runner;
pub mod sink;
pub mod testing;
pub mod utils;

pub use aggregate::{AggregateJob, GroupKey, JobReport, map_record, reduce_group};
pub use collection::{Elem, PCollection, from_vec};
pub use combiners::{CombineFn, Count, DurationStats};
pub use config::{AggregateConfig, DedupConfig, ShortRowPolicy};
pub use dedup::{DedupPipeline, RunResult};
pub use error::{PipelineError, PipelineResult};
pub use helpers::reduce_partition_for;
pub use io::{LineSource, LocalFs, MemorySource};
pub use pipeline::{NodeId, Pipeline};
pub use predicate::{CompareOp, FilterSpec, compare};
pub use projection::{Column, DedupTable, ProjectedRow, ProjectionSpec};
pub use record::Record;
pub use runner::{ExecMode, JobPhase, Runner};
pub use sink::{JsonDirStore, MemoryStore, RowPut, Table, TableSink};
