//! Plan execution.
//!
//! A plan is a linear chain `Source → (Stateless | Shuffle)*`. Execution moves
//! through [`JobPhase`]s: the source is cut into splits, fused stateless stages
//! run per split (mapping), each shuffle node is a barrier that pre-aggregates
//! per split and re-buckets keys into disjoint reduce partitions (grouping),
//! and any stages after the first shuffle run per reduce partition
//! (reducing). The first error from any split or partition fails the run.

use crate::node::{DynOp, Node};
use crate::partition::Partition;
use crate::pipeline::{NodeId, Pipeline};
use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobPhase {
    Idle,
    Mapping,
    Grouping,
    Reducing,
    Done,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobPhase::Idle => "idle",
            JobPhase::Mapping => "mapping",
            JobPhase::Grouping => "grouping",
            JobPhase::Reducing => "reducing",
            JobPhase::Done => "done",
        };
        f.write_str(s)
    }
}

pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
        }
    }
}

impl Runner {
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
    }

    pub fn parallel(threads: Option<usize>, partitions: Option<usize>) -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..Default::default()
        }
    }

    /// Execute and flatten every output partition into one `Vec<T>`.
    pub fn run_collect<T: Send + 'static>(&self, p: &Pipeline, terminal: NodeId) -> Result<Vec<T>> {
        Ok(self
            .run_partitions(p, terminal)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Execute and keep the output partitioning.
    ///
    /// Before any shuffle the partitions are the input splits; after one they
    /// are the reduce partitions, so every key lives in exactly one of them.
    pub fn run_partitions<T: Send + 'static>(
        &self,
        p: &Pipeline,
        terminal: NodeId,
    ) -> Result<Vec<Vec<T>>> {
        let plan = p.chain_to(terminal)?;
        let out = match self.mode {
            ExecMode::Sequential => execute(plan, 1, false)?,
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                let parts = partitions.unwrap_or(self.default_partitions).max(1);
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(t) = threads {
                    builder = builder.num_threads(t);
                }
                let pool = builder.build().context("build worker pool")?;
                pool.install(|| execute(plan, parts, true))?
            }
        };
        out.into_iter()
            .map(|part| {
                part.downcast::<Vec<T>>()
                    .map(|v| *v)
                    .map_err(|_| anyhow!("terminal type mismatch"))
            })
            .collect()
    }
}

fn fuse_stateless(ops: &[Arc<dyn DynOp>], input: Partition) -> Result<Partition> {
    ops.iter().try_fold(input, |acc, op| {
        op.apply(acc).with_context(|| format!("stage {}", op.name()))
    })
}

/// Apply `f` to every partition, in parallel when `par` is set.
fn each<F>(parts: Vec<Partition>, par: bool, f: F) -> Result<Vec<Partition>>
where
    F: Fn(Partition) -> Result<Partition> + Send + Sync,
{
    if par {
        parts.into_par_iter().map(f).collect()
    } else {
        parts.into_iter().map(f).collect()
    }
}

fn execute(plan: Vec<(NodeId, Node)>, parts: usize, par: bool) -> Result<Vec<Partition>> {
    let mut nodes = plan.into_iter();
    let Some((src_id, Node::Source { payload, splitter })) = nodes.next() else {
        bail!("plan must start with a source node");
    };

    let mut phase = JobPhase::Idle;
    let total = splitter.len(payload.as_ref()).unwrap_or(0);
    let mut current = splitter
        .split(payload.as_ref(), parts.min(total.max(1)))
        .ok_or_else(|| anyhow!("source {src_id:?} payload is not Vec<{}>", splitter.elem_name()))?;
    debug!(elements = total, splits = current.len(), "source split");

    let rest: Vec<(NodeId, Node)> = nodes.collect();
    let mut i = 0;
    while i < rest.len() {
        match &rest[i].1 {
            Node::Stateless(_) => {
                let mut ops: Vec<Arc<dyn DynOp>> = Vec::new();
                while let Some((_, Node::Stateless(more))) = rest.get(i) {
                    ops.extend(more.iter().cloned());
                    i += 1;
                }
                if phase == JobPhase::Idle {
                    phase = advance(phase, JobPhase::Mapping);
                }
                current = each(current, par, |chunk| fuse_stateless(&ops, chunk))?;
            }
            Node::Shuffle {
                label,
                local,
                shuffle,
            } => {
                phase = advance(phase, JobPhase::Grouping);
                let locals = each(current, par, |chunk| local(chunk))?;
                current = shuffle(locals, parts).with_context(|| format!("{label} shuffle"))?;
                debug!(node = %label, reduce_partitions = current.len(), "shuffle complete");
                phase = advance(phase, JobPhase::Reducing);
                i += 1;
            }
            Node::Source { .. } => bail!("unexpected additional source in plan"),
        }
    }
    advance(phase, JobPhase::Done);
    Ok(current)
}

fn advance(from: JobPhase, to: JobPhase) -> JobPhase {
    if from != to {
        debug!(%from, %to, "job phase");
    }
    to
}
