use crate::partition::{Partition, SplitOps};
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// An element-wise stage. Consecutive stateless nodes are fused by the runner
/// and applied to each split in turn.
pub trait DynOp: Send + Sync {
    fn apply(&self, input: Partition) -> Result<Partition>;

    fn name(&self) -> &'static str {
        "stateless"
    }
}

/// Per-split pre-aggregation: `Vec<(K, V)>` → `HashMap<K, A>`.
pub type LocalFn = Arc<dyn Fn(Partition) -> Result<Partition> + Send + Sync>;

/// Barrier: merges every split's local map and buckets the keys into `n`
/// disjoint reduce partitions, each a `Vec<(K, O)>` sorted by key.
pub type ShuffleFn = Arc<dyn Fn(Vec<Partition>, usize) -> Result<Vec<Partition>> + Send + Sync>;

#[derive(Clone)]
pub enum Node {
    Source {
        payload: Arc<dyn Any + Send + Sync>,
        splitter: Arc<dyn SplitOps>,
    },
    Stateless(Vec<Arc<dyn DynOp>>),

    /// Group-by-key or combine-by-key, distinguished only by what `local`
    /// accumulates.
    Shuffle {
        label: &'static str,
        local: LocalFn,
        shuffle: ShuffleFn,
    },
}
