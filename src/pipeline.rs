//! The pipeline graph: nodes keyed by [`NodeId`] and the edges between them.

use crate::node::Node;
use crate::partition::splitter_for;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Sequential handle for a node inside one [`Pipeline`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u64);

/// A shared, cloneable computation graph. Clones refer to the same graph.
#[derive(Clone, Default)]
pub struct Pipeline {
    inner: Arc<Mutex<PipelineInner>>,
}

#[derive(Default)]
struct PipelineInner {
    next_id: u64,
    nodes: HashMap<NodeId, Node>,
    edges: Vec<(NodeId, NodeId)>,
}

impl Pipeline {
    fn lock(&self) -> MutexGuard<'_, PipelineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert_node(&self, node: Node) -> NodeId {
        let mut g = self.lock();
        let id = NodeId(g.next_id);
        g.next_id += 1;
        g.nodes.insert(id, node);
        id
    }

    pub(crate) fn connect(&self, from: NodeId, to: NodeId) {
        self.lock().edges.push((from, to));
    }

    pub(crate) fn add_source<T: Clone + Send + Sync + 'static>(&self, data: Vec<T>) -> NodeId {
        self.insert_node(Node::Source {
            payload: Arc::new(data),
            splitter: splitter_for::<T>(),
        })
    }

    /// Walk back from `terminal` to its source, returning the nodes in
    /// execution order. Only linear chains are supported.
    pub(crate) fn chain_to(&self, terminal: NodeId) -> Result<Vec<(NodeId, Node)>> {
        let g = self.lock();
        let mut chain = Vec::new();
        let mut cur = terminal;
        loop {
            let node = g
                .nodes
                .get(&cur)
                .cloned()
                .ok_or_else(|| anyhow!("missing node {cur:?}"))?;
            chain.push((cur, node));
            match g.edges.iter().find(|(_, to)| *to == cur) {
                Some((from, _)) => cur = *from,
                None => break,
            }
        }
        chain.reverse();
        Ok(chain)
    }
}
