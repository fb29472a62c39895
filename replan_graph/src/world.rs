// Graph traits: the read-only view a planner is seeded from, and the
// mutable world model a planner owns.
//
// A planner never touches the caller's source graph after construction.
// It copies it into its own `WorldModel` and edits that copy as edge-cost
// observations arrive, so the world model is the planner's private belief
// about reality rather than ground truth.
//
// Missing edges have no weight (`None`); callers that need a cost for a
// missing edge treat it as `+inf`.

use crate::error::Result;
use crate::types::NodeId;

/// Read-only directed weighted graph.
pub trait Graph {
    /// Whether `id` is a node of this graph.
    fn contains(&self, id: NodeId) -> bool;

    /// All node IDs, in a deterministic order.
    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_;

    /// Outgoing edges of `id` as `(successor, weight)` pairs. Empty for
    /// unknown nodes.
    fn successors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_;

    /// Weight of the edge `from -> to`, or `None` if there is no such edge.
    fn weight(&self, from: NodeId, to: NodeId) -> Option<f64>;

    fn node_count(&self) -> usize;
}

/// The planner's private, incrementally updated copy of the world.
pub trait WorldModel: Graph {
    /// Add a node. Adding an existing node is a no-op.
    fn add_node(&mut self, id: NodeId);

    /// Set the weight of `from -> to`, creating the edge (and either
    /// endpoint) if absent. Negative and NaN weights are rejected and
    /// leave the model untouched.
    fn set_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<()>;

    /// Incoming edges of `id` as `(predecessor, weight)` pairs, where the
    /// weight is that of `predecessor -> id`.
    fn predecessors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_;
}
