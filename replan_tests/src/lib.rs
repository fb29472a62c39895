// Test support for cross-crate replanning tests.
//
// Provides a static Dijkstra oracle over any `WorldModel`, small graph
// builders (corridors, 4-connected grids with positions), and proptest
// strategies for random graphs and edge-change batches. The oracle searches
// backward from the goal over `predecessors`, mirroring the direction the
// planner's `g` values are defined in, so a whole distance table can be
// compared against the planner at once.
//
// Weights produced by the strategies are small integers (or `+inf`), so
// every path sum is exact in `f64` and tests may compare costs with `==`.
// Zero is drawn often enough that random graphs regularly contain
// zero-weight cycles and plateaus.
//
// See also: `tests/` for the integration tests that use these helpers.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use proptest::prelude::*;
use replan_core::{GridPos, ManhattanHeuristic};
use replan_graph::{DiGraph, Graph, NodeId, WeightedEdge, WorldModel};

// ---------------------------------------------------------------------------
// Dijkstra oracle
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    node: NodeId,
    dist: f64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist.total_cmp(&other.dist) == Ordering::Equal && self.node == other.node
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest distance is "greatest".
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shortest distance from every node to `goal`. Nodes that cannot reach
/// the goal map to `+inf`.
pub fn distances_to<M: WorldModel>(world: &M, goal: NodeId) -> BTreeMap<NodeId, f64> {
    let mut dist: BTreeMap<NodeId, f64> =
        world.node_ids().map(|id| (id, f64::INFINITY)).collect();
    let mut open = BinaryHeap::new();
    dist.insert(goal, 0.0);
    open.push(OpenEntry {
        node: goal,
        dist: 0.0,
    });

    while let Some(OpenEntry { node, dist: d }) = open.pop() {
        if d > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        for (pred, weight) in world.predecessors(node) {
            let candidate = d + weight;
            let known = dist.entry(pred).or_insert(f64::INFINITY);
            if candidate < *known {
                *known = candidate;
                open.push(OpenEntry {
                    node: pred,
                    dist: candidate,
                });
            }
        }
    }
    dist
}

/// Shortest-path cost from `from` to `goal`; `+inf` when unreachable.
pub fn shortest_cost<M: WorldModel>(world: &M, from: NodeId, goal: NodeId) -> f64 {
    distances_to(world, goal)
        .get(&from)
        .copied()
        .unwrap_or(f64::INFINITY)
}

/// Sum of the weights along `nodes`, or `None` if some hop has no edge.
pub fn walk_cost<G: Graph>(graph: &G, nodes: &[NodeId]) -> Option<f64> {
    nodes
        .windows(2)
        .map(|hop| graph.weight(hop[0], hop[1]))
        .sum()
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// `0 -> 1 -> ... -> n-1`, every hop weighing `weight`.
pub fn corridor(n: u64, weight: f64) -> DiGraph {
    let mut graph = DiGraph::new();
    for id in 0..n {
        graph.add_node(NodeId(id));
    }
    for id in 1..n {
        graph
            .set_edge(NodeId(id - 1), NodeId(id), weight)
            .expect("corridor weights are valid");
    }
    graph
}

/// Node id of cell `(x, y)` in a grid of width `side`.
pub fn cell(side: u64, x: u64, y: u64) -> NodeId {
    NodeId(y * side + x)
}

/// A `side` x `side` 4-connected grid with unit weights in both directions,
/// plus a Manhattan heuristic over the cell positions. Unit weights keep the
/// heuristic consistent for any later change that only raises weights.
pub fn grid(side: u64) -> (DiGraph, ManhattanHeuristic) {
    let mut graph = DiGraph::new();
    let mut heuristic = ManhattanHeuristic::new(1.0);
    for y in 0..side {
        for x in 0..side {
            let id = cell(side, x, y);
            graph.add_node(id);
            heuristic.set_position(id, GridPos::new(x as i32, y as i32, 0));
            let mut link = |other: NodeId| {
                graph.set_edge(id, other, 1.0).expect("unit weight");
                graph.set_edge(other, id, 1.0).expect("unit weight");
            };
            if x + 1 < side {
                link(cell(side, x + 1, y));
            }
            if y + 1 < side {
                link(cell(side, x, y + 1));
            }
        }
    }
    (graph, heuristic)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Integer weights in `0..=9`: zero about one time in four, `+inf` about
/// one time in ten.
pub fn arb_weight() -> impl Strategy<Value = f64> {
    prop_oneof![
        6 => (1u32..=9).prop_map(f64::from),
        3 => Just(0.0),
        1 => Just(f64::INFINITY),
    ]
}

/// An edge between two of the first `nodes` ids.
pub fn arb_edge(nodes: u64) -> impl Strategy<Value = WeightedEdge> {
    (0..nodes, 0..nodes, arb_weight())
        .prop_map(|(from, to, w)| WeightedEdge::new(NodeId(from), NodeId(to), w))
}

/// A random directed graph over ids `0..nodes`, with every node present
/// even when it has no edges.
pub fn arb_graph(nodes: u64, max_edges: usize) -> impl Strategy<Value = DiGraph> {
    prop::collection::vec(arb_edge(nodes), 0..=max_edges).prop_map(move |edges| {
        let mut graph = DiGraph::from_edges(edges).expect("strategy weights are valid");
        for id in 0..nodes {
            graph.add_node(NodeId(id));
        }
        graph
    })
}

/// Up to `max_batches` non-empty batches of edge changes. Ids range over
/// `0..nodes + 2`, so some changes introduce nodes the planner has not
/// seen yet.
pub fn arb_change_batches(
    nodes: u64,
    max_batches: usize,
) -> impl Strategy<Value = Vec<Vec<WeightedEdge>>> {
    prop::collection::vec(prop::collection::vec(arb_edge(nodes + 2), 1..=4), 0..=max_batches)
}

/// Weight changes on existing grid edges that never drop below 1, so the
/// grid's Manhattan heuristic stays consistent.
pub fn arb_grid_changes(
    side: u64,
    max_changes: usize,
) -> impl Strategy<Value = Vec<WeightedEdge>> {
    let raise = prop_oneof![Just(1.0), Just(2.0), Just(5.0), Just(f64::INFINITY)];
    prop::collection::vec((0..side, 0..side, any::<bool>(), raise), 1..=max_changes).prop_map(
        move |cells| {
            cells
                .into_iter()
                .filter_map(|(x, y, horizontal, w)| {
                    let from = cell(side, x, y);
                    let to = if horizontal {
                        (x + 1 < side).then_some(cell(side, x + 1, y))?
                    } else {
                        (y + 1 < side).then_some(cell(side, x, y + 1))?
                    };
                    Some(WeightedEdge::new(from, to, w))
                })
                .collect()
        },
    )
}
