//! Combiners for [`combine_values`](crate::PCollection::combine_values).
//!
//! A combiner folds the values of one key into an accumulator. Accumulators
//! built on different splits are merged at the shuffle barrier, so
//! `add_input` and `merge` must agree (merging two partial accumulators gives
//! the same result as feeding all values to one).

use crate::utils::SumCount;

pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;
}

/// Number of values per key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, u64, u64> for Count {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _v: V) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

/// Count and sum of `f64` values per key; the mean is derived by the caller
/// so the count stays available for output.
#[derive(Clone, Copy, Debug, Default)]
pub struct DurationStats;

impl CombineFn<f64, SumCount, SumCount> for DurationStats {
    fn create(&self) -> SumCount {
        SumCount::default()
    }

    fn add_input(&self, acc: &mut SumCount, v: f64) {
        acc.add(v);
    }

    fn merge(&self, acc: &mut SumCount, other: SumCount) {
        acc.merge(other);
    }

    fn finish(&self, acc: SumCount) -> SumCount {
        acc
    }
}
