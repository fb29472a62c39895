// Concrete directed weighted graph.
//
// Adjacency is stored twice, once keyed by source (`out`) and once keyed by
// target (`inc`), so both successor and predecessor enumeration are a single
// map lookup. Both directions use `BTreeMap`, which gives ascending-`NodeId`
// iteration order for free; the planner relies on that for deterministic
// tie-breaking.
//
// See also: `world.rs` for the traits implemented here.

use crate::error::Result;
use crate::types::{NodeId, WeightedEdge, check_weight};
use crate::world::{Graph, WorldModel};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct DiGraph {
    out: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
    inc: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
    edge_count: usize,
}

impl DiGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a list of edges. Fails on the first edge with a
    /// negative or NaN weight.
    pub fn from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = WeightedEdge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.set_edge(edge.from, edge.to, edge.weight)?;
        }
        Ok(graph)
    }

    /// Number of directed edges, including ones with `+inf` weight.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All edges in `(from, to)` order.
    pub fn edges(&self) -> impl Iterator<Item = WeightedEdge> + '_ {
        self.out.iter().flat_map(|(&from, targets)| {
            targets
                .iter()
                .map(move |(&to, &weight)| WeightedEdge::new(from, to, weight))
        })
    }
}

impl Graph for DiGraph {
    fn contains(&self, id: NodeId) -> bool {
        self.out.contains_key(&id)
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.out.keys().copied()
    }

    fn successors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.out
            .get(&id)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(&to, &w)| (to, w)))
    }

    fn weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.out.get(&from)?.get(&to).copied()
    }

    fn node_count(&self) -> usize {
        self.out.len()
    }
}

impl WorldModel for DiGraph {
    fn add_node(&mut self, id: NodeId) {
        self.out.entry(id).or_default();
        self.inc.entry(id).or_default();
    }

    fn set_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<()> {
        check_weight(from, to, weight)?;
        self.add_node(from);
        self.add_node(to);
        let previous = self.out.entry(from).or_default().insert(to, weight);
        self.inc.entry(to).or_default().insert(from, weight);
        if previous.is_none() {
            self.edge_count += 1;
        }
        Ok(())
    }

    fn predecessors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.inc
            .get(&id)
            .into_iter()
            .flat_map(|sources| sources.iter().map(|(&from, &w)| (from, w)))
    }
}
