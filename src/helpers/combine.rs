use crate::combiners::CombineFn;
use crate::helpers::keyed::redistribute;
use crate::node::Node;
use crate::partition::Partition;
use crate::{Elem, PCollection};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

impl<K: Elem + Eq + Hash + Ord, V: Elem> PCollection<(K, V)> {
    /// Combine-by-key with map-side pre-aggregation.
    ///
    /// Each split folds its own values into one accumulator per key before the
    /// shuffle, so only accumulators cross the barrier.
    pub fn combine_values<C, A, O>(self, comb: C) -> PCollection<(K, O)>
    where
        C: CombineFn<V, A, O>,
        A: Send + Sync + 'static,
        O: Elem,
    {
        let comb = Arc::new(comb);

        let local = {
            let comb = Arc::clone(&comb);
            Arc::new(move |p: Partition| -> Result<Partition> {
                let kv = *p
                    .downcast::<Vec<(K, V)>>()
                    .map_err(|_| anyhow!("combine local: unexpected input type"))?;
                let mut map: HashMap<K, A> = HashMap::new();
                for (k, v) in kv {
                    comb.add_input(map.entry(k).or_insert_with(|| comb.create()), v);
                }
                Ok(Box::new(map) as Partition)
            })
        };

        let shuffle = {
            let comb = Arc::clone(&comb);
            Arc::new(move |parts: Vec<Partition>, n: usize| {
                redistribute::<K, A, O, _, _>(
                    parts,
                    n,
                    |acc, other| comb.merge(acc, other),
                    |acc| comb.finish(acc),
                )
            })
        };

        self.then(Node::Shuffle {
            label: "combine_values",
            local,
            shuffle,
        })
    }
}
