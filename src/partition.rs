//! Type-erased partition buffers and source splitting.
//!
//! Nodes exchange `Vec<T>` buffers boxed as [`Partition`] so the plan can be
//! stored without generic parameters. A source node carries a [`SplitOps`]
//! that knows its concrete element type and can cut the payload into splits,
//! one per map task.

use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

/// A boxed `Vec<T>` (or a per-split accumulator map) moving between stages.
pub type Partition = Box<dyn Any + Send + Sync>;

/// Length and splitting for a type-erased `Vec<T>` source payload.
///
/// Both methods return `None` when `data` is not the `Vec<T>` the implementor
/// was built for.
pub trait SplitOps: Send + Sync {
    fn len(&self, data: &dyn Any) -> Option<usize>;

    /// Cut `data` into at most `n` contiguous, order-preserving splits.
    /// Always yields at least one split, possibly empty.
    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>>;

    fn elem_name(&self) -> &'static str;
}

struct VecSplitter<T>(PhantomData<T>);

impl<T: Clone + Send + Sync + 'static> SplitOps for VecSplitter<T> {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<Vec<T>>().map(Vec::len)
    }

    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>> {
        let v = data.downcast_ref::<Vec<T>>()?;
        if n <= 1 || v.len() <= 1 {
            return Some(vec![Box::new(v.clone())]);
        }
        let chunk = v.len().div_ceil(n);
        Some(
            v.chunks(chunk)
                .map(|c| Box::new(c.to_vec()) as Partition)
                .collect(),
        )
    }

    fn elem_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Splitter for sources holding `Vec<T>`.
pub fn splitter_for<T: Clone + Send + Sync + 'static>() -> Arc<dyn SplitOps> {
    Arc::new(VecSplitter::<T>(PhantomData))
}
