use crate::node::{DynOp, Node};
use crate::partition::Partition;
use crate::pipeline::{NodeId, Pipeline};
use crate::runner::Runner;
use anyhow::{Result, anyhow};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

/// Bound for anything that can flow through a pipeline.
pub trait Elem: 'static + Send + Sync + Clone {}
impl<T> Elem for T where T: 'static + Send + Sync + Clone {}

/// A lazy, typed handle to one node of a [`Pipeline`].
#[derive(Clone)]
pub struct PCollection<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) id: NodeId,
    _t: PhantomData<T>,
}

/// Start a collection from in-memory data.
pub fn from_vec<T: Elem>(p: &Pipeline, data: Vec<T>) -> PCollection<T> {
    let id = p.add_source(data);
    PCollection::at(p.clone(), id)
}

fn downcast_input<T: 'static>(input: Partition, stage: &str) -> Result<Vec<T>> {
    input
        .downcast::<Vec<T>>()
        .map(|v| *v)
        .map_err(|_| anyhow!("{stage}: unexpected input type"))
}

struct MapOp<I, O, F>(F, PhantomData<fn(I) -> O>);
impl<I, O, F> DynOp for MapOp<I, O, F>
where
    I: Elem,
    O: Elem,
    F: Send + Sync + Fn(&I) -> O + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_input::<I>(input, "map")?;
        Ok(Box::new(v.iter().map(|i| self.0(i)).collect::<Vec<O>>()))
    }

    fn name(&self) -> &'static str {
        "map"
    }
}

struct FilterOp<T, P>(P, PhantomData<fn(T)>);
impl<T, P> DynOp for FilterOp<T, P>
where
    T: Elem,
    P: Send + Sync + Fn(&T) -> bool + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_input::<T>(input, "filter")?;
        Ok(Box::new(v.into_iter().filter(|t| self.0(t)).collect::<Vec<T>>()))
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}

struct FlatMapOp<I, O, F>(F, PhantomData<fn(I) -> O>);
impl<I, O, F> DynOp for FlatMapOp<I, O, F>
where
    I: Elem,
    O: Elem,
    F: Send + Sync + Fn(&I) -> Vec<O> + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_input::<I>(input, "flat_map")?;
        let mut out: Vec<O> = Vec::new();
        for i in &v {
            out.extend(self.0(i));
        }
        Ok(Box::new(out))
    }

    fn name(&self) -> &'static str {
        "flat_map"
    }
}

impl<T: Elem> PCollection<T> {
    pub(crate) fn at(pipeline: Pipeline, id: NodeId) -> Self {
        Self {
            pipeline,
            id,
            _t: PhantomData,
        }
    }

    /// Append `node` downstream of this collection.
    pub(crate) fn then<O: Elem>(self, node: Node) -> PCollection<O> {
        let id = self.pipeline.insert_node(node);
        self.pipeline.connect(self.id, id);
        PCollection::at(self.pipeline, id)
    }

    fn stateless<O: Elem>(self, op: Arc<dyn DynOp>) -> PCollection<O> {
        self.then(Node::Stateless(vec![op]))
    }

    pub fn map<O, F>(self, f: F) -> PCollection<O>
    where
        O: Elem,
        F: 'static + Send + Sync + Fn(&T) -> O,
    {
        self.stateless(Arc::new(MapOp::<T, O, F>(f, PhantomData)))
    }

    pub fn filter<F>(self, pred: F) -> PCollection<T>
    where
        F: 'static + Send + Sync + Fn(&T) -> bool,
    {
        self.stateless(Arc::new(FilterOp::<T, F>(pred, PhantomData)))
    }

    pub fn flat_map<O, F>(self, f: F) -> PCollection<O>
    where
        O: Elem,
        F: 'static + Send + Sync + Fn(&T) -> Vec<O>,
    {
        self.stateless(Arc::new(FlatMapOp::<T, O, F>(f, PhantomData)))
    }

    /// `map` with a fallible function; pair with [`collect_fail_fast`](PCollection::collect_fail_fast).
    pub fn try_map<O, E, F>(self, f: F) -> PCollection<Result<O, E>>
    where
        O: Elem,
        E: Elem + Display,
        F: 'static + Send + Sync + Fn(&T) -> Result<O, E>,
    {
        self.map(f)
    }

    pub fn collect_seq(self) -> Result<Vec<T>> {
        Runner::sequential().run_collect::<T>(&self.pipeline, self.id)
    }

    pub fn collect_par(self, threads: Option<usize>, partitions: Option<usize>) -> Result<Vec<T>> {
        Runner::parallel(threads, partitions).run_collect::<T>(&self.pipeline, self.id)
    }

    /// Run with `runner` and keep one `Vec` per output partition.
    pub fn collect_partitions(self, runner: &Runner) -> Result<Vec<Vec<T>>> {
        runner.run_partitions::<T>(&self.pipeline, self.id)
    }
}

impl<T: Elem, E: Elem + Display> PCollection<Result<T, E>> {
    /// Collect sequentially, stopping at the first `Err` element.
    pub fn collect_fail_fast(self) -> Result<Vec<T>> {
        self.collect_seq()?
            .into_iter()
            .map(|r| r.map_err(|e| anyhow!("element failed: {e}")))
            .collect()
    }
}

impl<T: Elem + Ord> PCollection<T> {
    pub fn collect_seq_sorted(self) -> Result<Vec<T>> {
        let mut v = self.collect_seq()?;
        v.sort();
        Ok(v)
    }

    pub fn collect_par_sorted(
        self,
        threads: Option<usize>,
        partitions: Option<usize>,
    ) -> Result<Vec<T>> {
        let mut v = self.collect_par(threads, partitions)?;
        v.sort();
        Ok(v)
    }
}
