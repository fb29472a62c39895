// Scenario runner: plays a `ScenarioConfig` against a D* Lite planner.
//
// The agent starts at `start` with the initial graph planned. Before each
// move it applies every change batch scheduled for that step, then takes
// one hop along the current best route. The run ends when the agent reaches
// the goal, when no route is known, or after `max_steps` moves.
//
// Moves go through `DStarLite::step`, so the key modifier catches up lazily
// on the next change batch, as a real agent's planner would between sensor
// updates.
//
// See also: `config.rs` for the scenario format, `main.rs` for the CLI.

use replan_core::{DStarLite, Heuristic, ManhattanHeuristic, PathOutcome, RepairStats, ZeroHeuristic};
use replan_graph::{DiGraph, Graph, NodeId, WorldModel};
use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;
use crate::error::Result;

/// The heuristic a scenario selected.
#[derive(Clone, Debug)]
pub enum ScenarioHeuristic {
    Zero(ZeroHeuristic),
    Manhattan(ManhattanHeuristic),
}

impl Heuristic for ScenarioHeuristic {
    fn estimate(&self, from: NodeId, to: NodeId) -> f64 {
        match self {
            ScenarioHeuristic::Zero(h) => h.estimate(from, to),
            ScenarioHeuristic::Manhattan(h) => h.estimate(from, to),
        }
    }
}

impl ScenarioHeuristic {
    pub fn from_config(config: &ScenarioConfig) -> Self {
        match config.manhattan_heuristic() {
            Some(h) => ScenarioHeuristic::Manhattan(h),
            None => ScenarioHeuristic::Zero(ZeroHeuristic),
        }
    }
}

pub type ScenarioPlanner = DStarLite<DiGraph, ScenarioHeuristic>;

/// Outcome of a full scenario run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Every node the agent occupied, starting with `start`.
    pub trail: Vec<NodeId>,
    pub reached_goal: bool,
    /// Sum of the edge weights actually traversed.
    pub travelled_cost: f64,
    /// Non-empty change batches applied.
    pub replans: usize,
    /// Total expansions across the initial plan and every replan.
    pub expansions: usize,
    /// Route from the final position, as the planner sees it.
    pub final_path: PathOutcome,
}

impl RunReport {
    pub fn moves(&self) -> usize {
        self.trail.len().saturating_sub(1)
    }
}

/// Build the initial graph and plan from a scenario.
pub fn build_planner(config: &ScenarioConfig) -> Result<ScenarioPlanner> {
    let mut graph = DiGraph::from_edges(config.initial_edges())?;
    for node in &config.nodes {
        graph.add_node(node.id);
    }
    let heuristic = ScenarioHeuristic::from_config(config);
    let planner = DStarLite::new(
        config.start,
        config.goal,
        &graph,
        heuristic,
        DiGraph::new(),
        config.planner.clone(),
    )?;
    Ok(planner)
}

/// Run a scenario to completion.
pub fn run(config: &ScenarioConfig) -> Result<RunReport> {
    let mut planner = build_planner(config)?;
    info!(
        start = %config.start,
        goal = %config.goal,
        nodes = planner.world().node_count(),
        cost = planner.cost_to_goal(),
        "initial plan"
    );

    let mut trail = vec![planner.here()];
    let mut travelled_cost = 0.0;
    let mut replans = 0;
    let mut expansions = planner.last_repair().expansions();

    let mut step = 0;
    loop {
        for batch in config.changes.iter().filter(|b| b.at_step == step) {
            let edges = batch.weighted_edges();
            if edges.is_empty() {
                continue;
            }
            planner.update_world(&edges)?;
            let RepairStats {
                key_refreshes,
                settled,
                reset,
            } = planner.last_repair();
            replans += 1;
            expansions += settled + reset;
            info!(
                step,
                at = %planner.here(),
                changes = edges.len(),
                cost = planner.cost_to_goal(),
                settled,
                reset,
                key_refreshes,
                "replanned"
            );
        }

        if planner.here() == planner.goal() || step >= config.max_steps {
            break;
        }

        let from = planner.here();
        if !planner.step() {
            warn!(step, at = %from, "no known route to the goal; stopping");
            break;
        }
        let to = planner.here();
        let weight = planner.world().weight(from, to).unwrap_or(f64::INFINITY);
        debug!(step, %from, %to, weight, "moved");
        travelled_cost += weight;
        trail.push(to);
        step += 1;
    }

    let unused = config.changes.iter().filter(|b| b.at_step > step).count();
    if unused > 0 {
        debug!(unused, "change batches scheduled after the run ended");
    }

    let reached_goal = planner.here() == planner.goal();
    if reached_goal {
        info!(moves = step, travelled_cost, replans, "reached goal");
    } else if step >= config.max_steps {
        warn!(max_steps = config.max_steps, at = %planner.here(), "step limit reached");
    }

    Ok(RunReport {
        trail,
        reached_goal,
        travelled_cost,
        replans,
        expansions,
        final_path: planner.path(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChangeBatch, EdgeSpec, HeuristicSpec, NodeSpec};
    use replan_core::{GridPos, PlannerConfig};

    fn edge(from: u64, to: u64, weight: f64) -> EdgeSpec {
        EdgeSpec {
            from: NodeId(from),
            to: NodeId(to),
            weight: Some(weight),
            bidirectional: false,
        }
    }

    fn blocked(from: u64, to: u64) -> EdgeSpec {
        EdgeSpec {
            from: NodeId(from),
            to: NodeId(to),
            weight: None,
            bidirectional: false,
        }
    }

    fn strict() -> PlannerConfig {
        PlannerConfig {
            check_invariants: true,
            max_path_len: None,
        }
    }

    /// 0 -> 1 -> 2 -> 3 -> 4 with unit weights, plus a detour 1 -> 5 -> 2
    /// costing 2 per hop.
    fn corridor(changes: Vec<ChangeBatch>) -> ScenarioConfig {
        ScenarioConfig {
            start: NodeId(0),
            goal: NodeId(4),
            nodes: (0..6)
                .map(|id| NodeSpec {
                    id: NodeId(id),
                    position: None,
                })
                .collect(),
            edges: vec![
                edge(0, 1, 1.0),
                edge(1, 2, 1.0),
                edge(2, 3, 1.0),
                edge(3, 4, 1.0),
                edge(1, 5, 2.0),
                edge(5, 2, 2.0),
            ],
            heuristic: HeuristicSpec::Zero,
            changes,
            max_steps: 100,
            planner: strict(),
        }
    }

    fn ids(raw: &[u64]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn static_run_follows_the_corridor() {
        let report = run(&corridor(vec![])).unwrap();
        assert!(report.reached_goal);
        assert_eq!(report.trail, ids(&[0, 1, 2, 3, 4]));
        assert_eq!(report.travelled_cost, 4.0);
        assert_eq!(report.replans, 0);
        assert_eq!(report.moves(), 4);
        assert_eq!(report.final_path.total_cost(), 0.0);
    }

    #[test]
    fn blocked_edge_mid_run_takes_the_detour() {
        let report = run(&corridor(vec![ChangeBatch {
            at_step: 1,
            edges: vec![blocked(1, 2)],
        }]))
        .unwrap();
        assert!(report.reached_goal);
        assert_eq!(report.trail, ids(&[0, 1, 5, 2, 3, 4]));
        assert_eq!(report.travelled_cost, 7.0);
        assert_eq!(report.replans, 1);
    }

    #[test]
    fn sealed_goal_stops_the_agent() {
        let report = run(&corridor(vec![ChangeBatch {
            at_step: 2,
            edges: vec![blocked(3, 4)],
        }]))
        .unwrap();
        assert!(!report.reached_goal);
        assert_eq!(report.trail, ids(&[0, 1, 2]));
        assert_eq!(report.final_path, PathOutcome::NoPath);
    }

    #[test]
    fn step_limit_ends_the_run() {
        let mut config = corridor(vec![]);
        config.max_steps = 2;
        let report = run(&config).unwrap();
        assert!(!report.reached_goal);
        assert_eq!(report.trail, ids(&[0, 1, 2]));
        assert!(report.final_path.is_found());
    }

    #[test]
    fn late_batches_are_ignored() {
        let report = run(&corridor(vec![ChangeBatch {
            at_step: 50,
            edges: vec![blocked(3, 4)],
        }]))
        .unwrap();
        assert!(report.reached_goal);
        assert_eq!(report.replans, 0);
    }

    #[test]
    fn negative_change_weight_aborts_the_run() {
        let err = run(&corridor(vec![ChangeBatch {
            at_step: 0,
            edges: vec![edge(0, 1, -1.0)],
        }]))
        .unwrap_err();
        assert!(
            matches!(err, crate::error::ScenarioError::Plan(_)),
            "got {err:?}"
        );
    }

    #[test]
    fn negative_initial_weight_is_a_graph_error() {
        let mut config = corridor(vec![]);
        config.edges.push(edge(4, 0, -2.0));
        let err = run(&config).unwrap_err();
        assert!(
            matches!(err, crate::error::ScenarioError::Graph(_)),
            "got {err:?}"
        );
    }

    #[test]
    fn manhattan_grid_replans_around_a_wall() {
        // 3x3 grid, 4-connected, unit weights, start at the top-left corner
        // and goal at the bottom-right.
        let side = 3u64;
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for y in 0..side {
            for x in 0..side {
                let id = y * side + x;
                nodes.push(NodeSpec {
                    id: NodeId(id),
                    position: Some(GridPos::new(x as i32, y as i32, 0)),
                });
                if x + 1 < side {
                    edges.push(EdgeSpec {
                        bidirectional: true,
                        ..edge(id, id + 1, 1.0)
                    });
                }
                if y + 1 < side {
                    edges.push(EdgeSpec {
                        bidirectional: true,
                        ..edge(id, id + side, 1.0)
                    });
                }
            }
        }
        let config = ScenarioConfig {
            start: NodeId(0),
            goal: NodeId(8),
            nodes,
            edges,
            heuristic: HeuristicSpec::Manhattan { max_speed: 1.0 },
            // Wall off the middle column except the bottom row.
            changes: vec![ChangeBatch {
                at_step: 0,
                edges: vec![
                    EdgeSpec {
                        bidirectional: true,
                        ..blocked(0, 1)
                    },
                    EdgeSpec {
                        bidirectional: true,
                        ..blocked(3, 4)
                    },
                ],
            }],
            max_steps: 20,
            planner: strict(),
        };
        let report = run(&config).unwrap();
        assert!(report.reached_goal);
        assert_eq!(report.trail, ids(&[0, 3, 6, 7, 8]));
        assert_eq!(report.travelled_cost, 4.0);
        assert_eq!(report.replans, 1);
    }
}
