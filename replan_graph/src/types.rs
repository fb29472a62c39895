// Core graph types shared across the workspace.
//
// Node identities are compact integers. Weights are plain `f64`: `+inf` is
// a legal weight meaning the edge is currently impassable (this is how
// callers "remove" an edge from a world model), while negative and NaN
// weights are rejected by `check_weight`.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A directed edge with its traversal cost.
///
/// Used both to describe a graph and to report edge-cost changes to a
/// planner; in the latter case `weight` is the new cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
}

impl WeightedEdge {
    pub const fn new(from: NodeId, to: NodeId, weight: f64) -> Self {
        Self { from, to, weight }
    }

    /// The same edge with its cost set to `+inf`.
    pub const fn blocked(from: NodeId, to: NodeId) -> Self {
        Self::new(from, to, f64::INFINITY)
    }

    pub fn check(&self) -> Result<()> {
        check_weight(self.from, self.to, self.weight)
    }
}

/// Reject weights that would break shortest-path optimality.
pub fn check_weight(from: NodeId, to: NodeId, weight: f64) -> Result<()> {
    if weight.is_nan() {
        return Err(GraphError::NanWeight { from, to });
    }
    if weight < 0.0 {
        return Err(GraphError::NegativeWeight { from, to, weight });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_weight_is_legal() {
        assert!(check_weight(NodeId(0), NodeId(1), f64::INFINITY).is_ok());
        assert!(WeightedEdge::blocked(NodeId(0), NodeId(1)).check().is_ok());
    }

    #[test]
    fn negative_and_nan_weights_rejected() {
        assert_eq!(
            check_weight(NodeId(3), NodeId(4), -0.5),
            Err(GraphError::NegativeWeight {
                from: NodeId(3),
                to: NodeId(4),
                weight: -0.5
            })
        );
        assert_eq!(
            check_weight(NodeId(3), NodeId(4), f64::NAN),
            Err(GraphError::NanWeight {
                from: NodeId(3),
                to: NodeId(4)
            })
        );
        // Negative infinity is still negative.
        assert!(check_weight(NodeId(0), NodeId(1), f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(42).to_string(), "n42");
    }

    #[test]
    fn weighted_edge_serializes() {
        let edge = WeightedEdge::new(NodeId(1), NodeId(2), 2.5);
        let json = serde_json::to_string(&edge).unwrap();
        let restored: WeightedEdge = serde_json::from_str(&json).unwrap();
        assert_eq!(edge, restored);
    }
}
