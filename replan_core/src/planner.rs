// D* Lite incremental replanner.
//
// The planner searches *backward* from the goal. Every node carries two
// cost-to-goal estimates:
// - `g`:   the settled estimate, written only when the node is expanded.
// - `rhs`: the one-step lookahead `min over successors (cost + g)`, with the
//          goal pinned at 0.
// A node is locally consistent when `g == rhs`. The open queue holds
// exactly the inconsistent nodes, keyed by `[min(g, rhs) + h(start, node) +
// k_m, min(g, rhs)]`.
//
// `compute_shortest_path` expands queue entries until the start is settled.
// An overconsistent node (`g > rhs`, a cheaper route was found) is settled
// by copying `rhs` into `g` and relaxing its predecessors. An
// underconsistent node (`g < rhs`, its old route got more expensive) has
// `g` reset to infinity and every predecessor whose `rhs` was derived
// through it recomputes `rhs` from its successors. Either way the work is
// bounded by the edges around nodes whose costs actually changed, which is
// what makes replanning cheap compared to a fresh search.
//
// Costs are `Cost` values: the summed weight plus a hop count that breaks
// weight ties. Zero-weight edges are legal, and without the hop count a
// zero-weight cycle would let its nodes prop up each other's `rhs` after
// the cycle's last exit toward the goal is blocked. With it every edge has
// positive cost, which the settle and reset rules above depend on. The
// public `g`, `rhs`, and `cost_to_goal` accessors report the weight alone.
//
// `k_m` accumulates `h(last_start, start)` every time the start moves and
// the queue keys become stale. Adding it to newly computed keys keeps them
// comparable with keys already in the queue without re-keying the queue.
//
// The planner owns its `WorldModel` outright; edge changes go through
// `update_world` and nothing else writes to the model.
//
// See also: `queue.rs` for the open queue, `heuristic.rs` for heuristics,
// `replan_graph::world` for the `WorldModel` contract.
//
// **Critical constraint: determinism.** Given the same model, heuristic,
// and call sequence, expansion order and reported paths are identical. The
// queue breaks key ties by node ID. The path walk picks the successor with
// the least `cost + g` counting hops, preferring smaller `rhs` and then the
// world model's iteration order on exact ties.

use crate::config::PlannerConfig;
use crate::cost::Cost;
use crate::error::{PlanError, Result};
use crate::heuristic::{Heuristic, ZeroHeuristic};
use crate::key::Key;
use crate::queue::KeyedQueue;
use replan_graph::{Graph, NodeId, WeightedEdge, WorldModel};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

const INF: f64 = f64::INFINITY;

/// Per-node planner state, kept beside the world model rather than inside
/// it so that world-model node types need not know about planning.
#[derive(Clone, Copy, Debug, PartialEq)]
struct NodeState {
    g: Cost,
    rhs: Cost,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            g: Cost::INFINITE,
            rhs: Cost::INFINITE,
        }
    }
}

/// A route from the current position to the goal.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// Node IDs from the current position to the goal (inclusive).
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along `nodes`.
    pub total_cost: f64,
}

/// What `DStarLite::path` found.
#[derive(Clone, Debug, PartialEq)]
pub enum PathOutcome {
    Found(PathResult),
    /// Some node on the walk has no known route to the goal (`rhs = inf`).
    NoPath,
    /// The walk reached a node that believes it can reach the goal but has
    /// no successor to continue through.
    ///
    /// `update_world` keeps every `rhs` equal to its successors' lookahead,
    /// so a finite `rhs` always has a successor to back it and this is not
    /// produced through the planner's own API. It is the walk's fallback if
    /// the model and the planner state ever disagree.
    Disconnected,
}

impl PathOutcome {
    /// `inf` for `NoPath`, NaN for `Disconnected`.
    pub fn total_cost(&self) -> f64 {
        match self {
            PathOutcome::Found(path) => path.total_cost,
            PathOutcome::NoPath => INF,
            PathOutcome::Disconnected => f64::NAN,
        }
    }

    pub fn nodes(&self) -> Option<&[NodeId]> {
        match self {
            PathOutcome::Found(path) => Some(&path.nodes),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }
}

/// Counters for the most recent `compute_shortest_path` pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairStats {
    /// Queue entries whose stored key was stale and got re-keyed.
    pub key_refreshes: usize,
    /// Overconsistent nodes settled (`g = rhs`).
    pub settled: usize,
    /// Underconsistent nodes reset (`g = inf`).
    pub reset: usize,
}

impl RepairStats {
    pub fn expansions(&self) -> usize {
        self.settled + self.reset
    }
}

/// A `g` write made during a repair pass, recorded for the settling tests.
#[cfg(test)]
#[derive(Clone, Copy, Debug, PartialEq)]
enum GWrite {
    Settled(NodeId),
    Reset(NodeId),
}

/// D* Lite planner over a world model `M` with heuristic `H`.
#[derive(Clone, Debug)]
pub struct DStarLite<M: WorldModel, H: Heuristic = ZeroHeuristic> {
    start: NodeId,
    last: NodeId,
    goal: NodeId,
    model: M,
    heuristic: H,
    states: FxHashMap<NodeId, NodeState>,
    queue: KeyedQueue,
    key_modifier: f64,
    config: PlannerConfig,
    last_repair: RepairStats,
    #[cfg(test)]
    g_writes: Vec<GWrite>,
}

impl<M: WorldModel> DStarLite<M, ZeroHeuristic> {
    /// Planner with no heuristic (every estimate is 0) and default config.
    pub fn with_zero_heuristic<G: Graph>(
        start: NodeId,
        goal: NodeId,
        source: &G,
        model: M,
    ) -> Result<Self> {
        Self::new(
            start,
            goal,
            source,
            ZeroHeuristic,
            model,
            PlannerConfig::default(),
        )
    }
}

impl<M: WorldModel, H: Heuristic> DStarLite<M, H> {
    /// Seed `model` from `source` and plan an initial route from `start` to
    /// `goal`.
    ///
    /// Every node and edge of `source` is copied into `model`; `start` and
    /// `goal` are added even if `source` lacks them. Fails on the first
    /// source edge with a negative or NaN weight.
    pub fn new<G: Graph>(
        start: NodeId,
        goal: NodeId,
        source: &G,
        heuristic: H,
        mut model: M,
        config: PlannerConfig,
    ) -> Result<Self> {
        model.add_node(start);
        model.add_node(goal);
        for id in source.node_ids() {
            model.add_node(id);
        }
        for from in source.node_ids() {
            for (to, weight) in source.successors(from) {
                model.set_edge(from, to, weight)?;
            }
        }

        let states = model.node_ids().map(|id| (id, NodeState::default())).collect();
        let mut planner = Self {
            start,
            last: start,
            goal,
            model,
            heuristic,
            states,
            queue: KeyedQueue::new(),
            key_modifier: 0.0,
            config,
            last_repair: RepairStats::default(),
            #[cfg(test)]
            g_writes: Vec::new(),
        };

        planner.state_mut(goal).rhs = Cost::ZERO;
        let goal_key = planner.key_for(goal);
        planner.queue.insert(goal, goal_key);

        debug!(
            %start,
            %goal,
            nodes = planner.model.node_count(),
            "initializing D* Lite planner"
        );
        planner.compute_shortest_path();
        Ok(planner)
    }

    /// The current position.
    pub fn here(&self) -> NodeId {
        self.start
    }

    pub fn goal(&self) -> NodeId {
        self.goal
    }

    /// The planner's private world model.
    pub fn world(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Settled cost-to-goal estimate of `node` (`inf` if unknown).
    pub fn g(&self, node: NodeId) -> f64 {
        self.state(node).g.value()
    }

    /// One-step lookahead cost-to-goal of `node` (`inf` if unknown).
    pub fn rhs(&self, node: NodeId) -> f64 {
        self.state(node).rhs.value()
    }

    /// Optimal cost from the current position to the goal, `inf` if the
    /// goal is unreachable.
    ///
    /// This is `rhs(here)`: the repair loop stops as soon as the start's
    /// `rhs` is correct, which can leave its `g` one expansion behind.
    pub fn cost_to_goal(&self) -> f64 {
        self.rhs(self.start)
    }

    pub fn is_queued(&self, node: NodeId) -> bool {
        self.queue.contains(node)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn key_modifier(&self) -> f64 {
        self.key_modifier
    }

    pub fn last_repair(&self) -> RepairStats {
        self.last_repair
    }

    /// Move one hop toward the goal along the best known route.
    ///
    /// Returns `false` without moving when already at the goal or when no
    /// route is known. The key modifier is not touched here; it catches up
    /// from the last synced position on the next `update_world` or
    /// `move_to`.
    pub fn step(&mut self) -> bool {
        if self.start == self.goal {
            return false;
        }
        if self.state(self.start).rhs.is_infinite() {
            return false;
        }
        match self.best_successor(self.start) {
            Some((next, _)) => {
                trace!(from = %self.start, to = %next, "step");
                self.start = next;
                true
            }
            None => false,
        }
    }

    /// Relocate the current position to `node`, which must already be in
    /// the world model, and repair the plan from there.
    pub fn move_to(&mut self, node: NodeId) -> Result<()> {
        if !self.model.contains(node) {
            return Err(PlanError::UnknownNode(node));
        }
        self.start = node;
        self.sync_key_modifier();
        debug!(to = %node, k_m = self.key_modifier, "moved");
        self.compute_shortest_path();
        Ok(())
    }

    /// Apply a batch of observed edge-cost changes (each edge carries its
    /// new weight) and repair the plan.
    ///
    /// The whole batch is validated first; if any weight is negative or NaN
    /// nothing is applied. Endpoints the model has never seen are added.
    /// An empty batch does nothing.
    pub fn update_world(&mut self, changes: &[WeightedEdge]) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        for change in changes {
            change.check()?;
        }

        self.sync_key_modifier();
        for change in changes {
            let (u, v) = (change.from, change.to);
            for id in [u, v] {
                if !self.model.contains(id) {
                    self.model.add_node(id);
                    self.states.entry(id).or_default();
                }
            }
            let old_cost = self
                .model
                .weight(u, v)
                .map_or(Cost::INFINITE, Cost::edge);
            let cost = Cost::edge(change.weight);
            self.model.set_edge(u, v, change.weight)?;

            if u != self.goal {
                let g_v = self.state(v).g;
                let rhs_u = self.state(u).rhs;
                if old_cost > cost {
                    self.state_mut(u).rhs = rhs_u.min(cost + g_v);
                } else if rhs_u == old_cost + g_v {
                    let best = self.best_successor_cost(u);
                    self.state_mut(u).rhs = best;
                }
            }
            self.update_vertex(u);
        }
        debug!(
            changes = changes.len(),
            k_m = self.key_modifier,
            queued = self.queue.len(),
            "world updated"
        );
        self.compute_shortest_path();
        Ok(())
    }

    /// Walk from the current position to the goal, at each node taking the
    /// successor that minimizes `cost + g`.
    ///
    /// Each hop lands on a node whose `g` is strictly smaller once hops are
    /// counted, so the walk never revisits a node, even across zero-weight
    /// edges. `PlannerConfig::max_path_len` caps its length all the same.
    pub fn path(&self) -> PathOutcome {
        let limit = self
            .config
            .max_path_len
            .unwrap_or_else(|| self.model.node_count());
        let mut u = self.start;
        let mut nodes = vec![u];
        let mut total_cost = 0.0;

        while u != self.goal {
            if self.state(u).rhs.is_infinite() {
                return PathOutcome::NoPath;
            }
            let Some((next, cost)) = self.best_successor(u) else {
                return PathOutcome::Disconnected;
            };
            if nodes.len() >= limit {
                warn!(
                    from = %self.start,
                    goal = %self.goal,
                    limit,
                    "path walk exceeded its length limit; treating goal as unreachable"
                );
                return PathOutcome::NoPath;
            }
            u = next;
            total_cost += cost;
            nodes.push(u);
        }
        PathOutcome::Found(PathResult { nodes, total_cost })
    }

    // -----------------------------------------------------------------------
    // Core D* Lite machinery
    // -----------------------------------------------------------------------

    fn state(&self, id: NodeId) -> NodeState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    fn state_mut(&mut self, id: NodeId) -> &mut NodeState {
        self.states.entry(id).or_default()
    }

    fn key_for(&self, id: NodeId) -> Key {
        let s = self.state(id);
        let k2 = s.g.min(s.rhs);
        Key::new(
            k2.value() + self.heuristic.estimate(self.start, id) + self.key_modifier,
            k2,
        )
    }

    /// Fold the distance travelled since the last sync into `k_m`.
    fn sync_key_modifier(&mut self) {
        self.key_modifier += self.heuristic.estimate(self.last, self.start);
        self.last = self.start;
    }

    /// Reconcile `u`'s queue membership with its consistency.
    fn update_vertex(&mut self, u: NodeId) {
        let s = self.state(u);
        if s.g != s.rhs {
            let key = self.key_for(u);
            self.queue.insert(u, key);
        } else {
            self.queue.remove(u);
        }
    }

    /// `min over successors s' of u (cost(u, s') + g(s'))`.
    fn best_successor_cost(&self, u: NodeId) -> Cost {
        self.model
            .successors(u)
            .map(|(v, w)| Cost::edge(w) + self.state(v).g)
            .min()
            .unwrap_or(Cost::INFINITE)
    }

    /// The successor minimizing `cost + g`, ties going to the smaller `rhs`
    /// and then to the first in model order. Returns the successor and the
    /// edge weight to reach it, or `None` if no successor has a finite
    /// `cost + g`.
    fn best_successor(&self, u: NodeId) -> Option<(NodeId, f64)> {
        let mut best = None;
        let mut best_total = Cost::INFINITE;
        let mut best_rhs = Cost::INFINITE;
        for (v, w) in self.model.successors(u) {
            let s = self.state(v);
            let total = Cost::edge(w) + s.g;
            if total.is_infinite() {
                continue;
            }
            if total < best_total || (total == best_total && s.rhs < best_rhs) {
                best = Some((v, w));
                best_total = total;
                best_rhs = s.rhs;
            }
        }
        best
    }

    fn start_settled(&self) -> bool {
        let s = self.state(self.start);
        let top_not_below_start = match self.queue.top_key() {
            Some(top) => top >= self.key_for(self.start),
            None => true,
        };
        top_not_below_start && s.rhs <= s.g
    }

    fn compute_shortest_path(&mut self) {
        let mut stats = RepairStats::default();
        #[cfg(test)]
        self.g_writes.clear();

        while let Some((u, k_old)) = self.queue.peek() {
            if self.start_settled() {
                break;
            }
            let k_new = self.key_for(u);
            let s = self.state(u);

            if k_old < k_new {
                // Queued before the start moved; not actually due yet.
                self.queue.update(u, k_new);
                stats.key_refreshes += 1;
            } else if s.g > s.rhs {
                self.state_mut(u).g = s.rhs;
                self.queue.remove(u);
                stats.settled += 1;
                #[cfg(test)]
                self.g_writes.push(GWrite::Settled(u));
                trace!(node = %u, g = %s.rhs, "settled");

                let preds: SmallVec<[(NodeId, f64); 8]> = self.model.predecessors(u).collect();
                for (p, w) in preds {
                    if p != self.goal {
                        let ps = self.state_mut(p);
                        ps.rhs = ps.rhs.min(Cost::edge(w) + s.rhs);
                    }
                    self.update_vertex(p);
                }
            } else {
                let g_old = s.g;
                self.state_mut(u).g = Cost::INFINITE;
                stats.reset += 1;
                #[cfg(test)]
                self.g_writes.push(GWrite::Reset(u));
                trace!(node = %u, g_old = %g_old, "reset");

                // `u` itself is included with the zero self-cost, so its own
                // rhs is recomputed if it was derived from its old g.
                let mut affected: SmallVec<[(NodeId, Cost); 8]> = self
                    .model
                    .predecessors(u)
                    .map(|(p, w)| (p, Cost::edge(w)))
                    .collect();
                affected.push((u, Cost::ZERO));
                for (p, cost) in affected {
                    if p != self.goal && self.state(p).rhs == cost + g_old {
                        let best = self.best_successor_cost(p);
                        self.state_mut(p).rhs = best;
                    }
                    self.update_vertex(p);
                }
            }
        }

        debug!(
            expansions = stats.expansions(),
            key_refreshes = stats.key_refreshes,
            queued = self.queue.len(),
            cost_to_goal = self.cost_to_goal(),
            "repair pass complete"
        );
        self.last_repair = stats;
        if self.config.check_invariants {
            self.assert_invariants();
        }
    }

    /// Panics if a node's queue membership disagrees with its consistency,
    /// or if the start is not settled.
    fn assert_invariants(&self) {
        for id in self.model.node_ids() {
            let s = self.state(id);
            let queued = self.queue.contains(id);
            assert_eq!(
                queued,
                s.g != s.rhs,
                "node {id}: queued={queued} but g={} rhs={}",
                s.g,
                s.rhs
            );
        }
        assert!(
            self.start_settled(),
            "repair pass ended with start {} unsettled",
            self.start
        );
        assert_eq!(
            self.state(self.goal).rhs,
            Cost::ZERO,
            "goal rhs must stay 0"
        );
    }
}
