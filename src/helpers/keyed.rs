use crate::node::Node;
use crate::partition::Partition;
use crate::{Elem, PCollection};
use anyhow::{Result, anyhow};
use std::collections::{BTreeMap, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Reduce partition owning `key` out of `n`. Stable across runs.
pub fn reduce_partition_for<K: Hash>(key: &K, n: usize) -> usize {
    let mut h = DefaultHasher::new();
    key.hash(&mut h);
    (h.finish() % n.max(1) as u64) as usize
}

/// Merge per-split accumulator maps and bucket them into `n` reduce
/// partitions, finishing each accumulator on the way out. Keys are sorted
/// within a partition.
pub(crate) fn redistribute<K, A, O, M, F>(
    parts: Vec<Partition>,
    n: usize,
    merge: M,
    finish: F,
) -> Result<Vec<Partition>>
where
    K: Elem + Eq + Hash + Ord,
    A: Send + Sync + 'static,
    O: Elem,
    M: Fn(&mut A, A),
    F: Fn(A) -> O,
{
    let mut merged: HashMap<K, A> = HashMap::new();
    for p in parts {
        let m = *p
            .downcast::<HashMap<K, A>>()
            .map_err(|_| anyhow!("shuffle: unexpected local map type"))?;
        for (k, a) in m {
            match merged.get_mut(&k) {
                Some(acc) => merge(acc, a),
                None => {
                    merged.insert(k, a);
                }
            }
        }
    }

    let n = n.max(1);
    let mut buckets: Vec<BTreeMap<K, A>> = (0..n).map(|_| BTreeMap::new()).collect();
    for (k, a) in merged {
        buckets[reduce_partition_for(&k, n)].insert(k, a);
    }
    Ok(buckets
        .into_iter()
        .map(|b| {
            let out: Vec<(K, O)> = b.into_iter().map(|(k, a)| (k, finish(a))).collect();
            Box::new(out) as Partition
        })
        .collect())
}

impl<T: Elem> PCollection<T> {
    /// Derive a key and produce `(K, T)`.
    pub fn key_by<K, F>(self, key_fn: F) -> PCollection<(K, T)>
    where
        K: Elem + Eq + Hash,
        F: 'static + Send + Sync + Fn(&T) -> K,
    {
        self.map(move |t| (key_fn(t), t.clone()))
    }
}

impl<K: Elem + Eq + Hash + Ord, V: Elem> PCollection<(K, V)> {
    /// Group values by key: `(K, V)` → `(K, Vec<V>)`.
    ///
    /// All values of one key land in the same reduce partition. Value order
    /// within a group follows split order, which callers should not rely on.
    pub fn group_by_key(self) -> PCollection<(K, Vec<V>)> {
        let local = Arc::new(|p: Partition| -> Result<Partition> {
            let kv = *p
                .downcast::<Vec<(K, V)>>()
                .map_err(|_| anyhow!("group_by_key local: unexpected input type"))?;
            let mut m: HashMap<K, Vec<V>> = HashMap::new();
            for (k, v) in kv {
                m.entry(k).or_default().push(v);
            }
            Ok(Box::new(m) as Partition)
        });

        let shuffle = Arc::new(|parts: Vec<Partition>, n: usize| {
            redistribute::<K, Vec<V>, Vec<V>, _, _>(parts, n, |acc, more| acc.extend(more), |vs| vs)
        });

        self.then(Node::Shuffle {
            label: "group_by_key",
            local,
            shuffle,
        })
    }
}
