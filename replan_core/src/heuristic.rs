// Heuristics for D* Lite.
//
// D* Lite searches backward from the goal, so the heuristic estimates the
// cost between the *current start* and a node. Optimality needs it to be
// consistent with the world model's edge costs: `h(a, c) <= cost(a, b) +
// h(b, c)` and never more than the true distance. The planner tolerates a
// heuristic that is temporarily inadmissible after edge costs drop, but
// paths reported while that holds may be suboptimal.
//
// See also: `planner.rs`, which evaluates `h(start, node)` for every key
// and accumulates `h(last_start, start)` into the key modifier.

use replan_graph::NodeId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Estimated cost between two nodes.
pub trait Heuristic {
    fn estimate(&self, from: NodeId, to: NodeId) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(NodeId, NodeId) -> f64,
{
    fn estimate(&self, from: NodeId, to: NodeId) -> f64 {
        self(from, to)
    }
}

/// Always estimates zero. Turns D* Lite into an incremental Dijkstra; the
/// fallback when no domain heuristic is available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _from: NodeId, _to: NodeId) -> f64 {
        0.0
    }
}

/// Integer 3D position of a node, for spatial heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs()
    }
}

/// Manhattan distance divided by the fastest possible speed.
///
/// Admissible whenever every edge costs at least its Manhattan length
/// divided by `max_speed`. Nodes without a recorded position estimate 0,
/// which keeps the heuristic admissible for them too.
#[derive(Clone, Debug)]
pub struct ManhattanHeuristic {
    positions: FxHashMap<NodeId, GridPos>,
    max_speed: f64,
}

impl ManhattanHeuristic {
    pub fn new(max_speed: f64) -> Self {
        assert!(max_speed > 0.0, "max_speed must be positive, got {max_speed}");
        Self {
            positions: FxHashMap::default(),
            max_speed,
        }
    }

    pub fn with_positions<I>(max_speed: f64, positions: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, GridPos)>,
    {
        let mut heuristic = Self::new(max_speed);
        heuristic.positions.extend(positions);
        heuristic
    }

    pub fn set_position(&mut self, node: NodeId, pos: GridPos) {
        self.positions.insert(node, pos);
    }

    pub fn position(&self, node: NodeId) -> Option<GridPos> {
        self.positions.get(&node).copied()
    }
}

impl Heuristic for ManhattanHeuristic {
    fn estimate(&self, from: NodeId, to: NodeId) -> f64 {
        match (self.positions.get(&from), self.positions.get(&to)) {
            (Some(&a), Some(&b)) => f64::from(a.manhattan_distance(b)) / self.max_speed,
            _ => 0.0,
        }
    }
}
