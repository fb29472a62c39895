// Scenario definitions, loaded from JSON.
//
// A scenario is a fixed graph, a start and a goal, a heuristic choice, and a
// list of edge-change batches keyed by the step at which the agent observes
// them. Every field except the graph, `start`, and `goal` has a default, so
// a minimal scenario file is just nodes, edges, and endpoints:
//
//   {
//     "start": 0, "goal": 2,
//     "nodes": [{ "id": 0 }, { "id": 1 }, { "id": 2 }],
//     "edges": [{ "from": 0, "to": 1, "weight": 1.0 },
//               { "from": 1, "to": 2, "weight": 1.0 }],
//     "changes": [{ "at_step": 1, "edges": [{ "from": 1, "to": 2 }] }]
//   }
//
// An edge without a `weight` is blocked (infinite cost). JSON has no literal
// for infinity, so this is the only way to express one.
//
// See also: `runner.rs`, which turns a `ScenarioConfig` into a planner and
// plays the change batches against it.

use std::path::Path;

use replan_core::{GridPos, ManhattanHeuristic, PlannerConfig};
use replan_graph::{NodeId, WeightedEdge};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub start: NodeId,
    pub goal: NodeId,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub heuristic: HeuristicSpec,
    #[serde(default)]
    pub changes: Vec<ChangeBatch>,
    /// Upper bound on agent moves before the run gives up.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default)]
    pub planner: PlannerConfig,
}

fn default_max_steps() -> usize {
    1000
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    /// Needed only by the Manhattan heuristic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<GridPos>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: NodeId,
    pub to: NodeId,
    /// `None` means blocked.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Also add the reverse edge with the same weight.
    #[serde(default)]
    pub bidirectional: bool,
}

impl EdgeSpec {
    pub fn weighted_edges(&self) -> impl Iterator<Item = WeightedEdge> + '_ {
        let weight = self.weight.unwrap_or(f64::INFINITY);
        let reverse = self
            .bidirectional
            .then_some(WeightedEdge::new(self.to, self.from, weight));
        std::iter::once(WeightedEdge::new(self.from, self.to, weight)).chain(reverse)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicSpec {
    #[default]
    Zero,
    /// Manhattan distance between node positions divided by `max_speed`.
    Manhattan { max_speed: f64 },
}

/// Edge changes the agent observes just before its `at_step`-th move.
/// Step 0 is before the first move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub at_step: usize,
    pub edges: Vec<EdgeSpec>,
}

impl ChangeBatch {
    pub fn weighted_edges(&self) -> Vec<WeightedEdge> {
        self.edges.iter().flat_map(EdgeSpec::weighted_edges).collect()
    }
}

impl ScenarioConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that serde can't express: positive heuristic speed, unique
    /// node IDs. Edge weights are checked when the graph is built.
    pub fn validate(&self) -> Result<()> {
        match self.heuristic {
            HeuristicSpec::Zero => {}
            // Written so NaN fails too.
            HeuristicSpec::Manhattan { max_speed } => {
                let positive = max_speed > 0.0;
                if !positive {
                    return Err(ScenarioError::Invalid(format!(
                        "manhattan max_speed must be positive, got {max_speed}"
                    )));
                }
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id) {
                return Err(ScenarioError::Invalid(format!(
                    "node {} is listed twice",
                    node.id
                )));
            }
        }
        Ok(())
    }

    pub fn initial_edges(&self) -> Vec<WeightedEdge> {
        self.edges.iter().flat_map(EdgeSpec::weighted_edges).collect()
    }

    /// Manhattan heuristic over the listed positions. `None` for the zero
    /// heuristic.
    pub fn manhattan_heuristic(&self) -> Option<ManhattanHeuristic> {
        match self.heuristic {
            HeuristicSpec::Zero => None,
            HeuristicSpec::Manhattan { max_speed } => Some(ManhattanHeuristic::with_positions(
                max_speed,
                self.nodes
                    .iter()
                    .filter_map(|n| n.position.map(|pos| (n.id, pos))),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "start": 0,
        "goal": 2,
        "nodes": [{ "id": 0 }, { "id": 1 }, { "id": 2 }],
        "edges": [
            { "from": 0, "to": 1, "weight": 1.0 },
            { "from": 1, "to": 2, "weight": 1.0 }
        ]
    }"#;

    #[test]
    fn minimal_scenario_takes_defaults() {
        let config = ScenarioConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.start, NodeId(0));
        assert_eq!(config.goal, NodeId(2));
        assert_eq!(config.heuristic, HeuristicSpec::Zero);
        assert!(config.changes.is_empty());
        assert_eq!(config.max_steps, 1000);
        assert_eq!(config.planner, PlannerConfig::default());
        assert_eq!(config.initial_edges().len(), 2);
    }

    #[test]
    fn missing_weight_is_blocked() {
        let json = r#"{
            "start": 0, "goal": 1,
            "edges": [{ "from": 0, "to": 1 }]
        }"#;
        let config = ScenarioConfig::from_json(json).unwrap();
        let edges = config.initial_edges();
        assert_eq!(edges, vec![WeightedEdge::blocked(NodeId(0), NodeId(1))]);
    }

    #[test]
    fn bidirectional_edges_expand_to_both_directions() {
        let spec = EdgeSpec {
            from: NodeId(3),
            to: NodeId(4),
            weight: Some(2.5),
            bidirectional: true,
        };
        let edges: Vec<_> = spec.weighted_edges().collect();
        assert_eq!(
            edges,
            vec![
                WeightedEdge::new(NodeId(3), NodeId(4), 2.5),
                WeightedEdge::new(NodeId(4), NodeId(3), 2.5),
            ]
        );
    }

    #[test]
    fn manhattan_heuristic_parses_and_uses_positions() {
        let json = r#"{
            "start": 0, "goal": 1,
            "nodes": [
                { "id": 0, "position": { "x": 0, "y": 0, "z": 0 } },
                { "id": 1, "position": { "x": 2, "y": 1, "z": 0 } }
            ],
            "edges": [{ "from": 0, "to": 1, "weight": 3.0 }],
            "heuristic": { "manhattan": { "max_speed": 1.0 } }
        }"#;
        let config = ScenarioConfig::from_json(json).unwrap();
        assert_eq!(config.heuristic, HeuristicSpec::Manhattan { max_speed: 1.0 });
        let h = config.manhattan_heuristic().unwrap();
        assert_eq!(h.position(NodeId(1)), Some(GridPos::new(2, 1, 0)));
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let json = r#"{
            "start": 0, "goal": 1,
            "heuristic": { "manhattan": { "max_speed": 0.0 } }
        }"#;
        let err = ScenarioConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn duplicate_nodes_are_rejected() {
        let json = r#"{
            "start": 0, "goal": 1,
            "nodes": [{ "id": 0 }, { "id": 1 }, { "id": 0 }]
        }"#;
        let err = ScenarioConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = ScenarioConfig::from_json("{ \"start\": 0 ").unwrap_err();
        assert!(matches!(err, ScenarioError::Json(_)), "got {err:?}");
    }

    #[test]
    fn planner_section_overrides_defaults() {
        let json = r#"{
            "start": 0, "goal": 1,
            "max_steps": 5,
            "planner": { "check_invariants": true, "max_path_len": 10 }
        }"#;
        let config = ScenarioConfig::from_json(json).unwrap();
        assert_eq!(config.max_steps, 5);
        assert!(config.planner.check_invariants);
        assert_eq!(config.planner.max_path_len, Some(10));
    }

    #[test]
    fn config_survives_serialization() {
        let config = ScenarioConfig::from_json(MINIMAL).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ScenarioConfig::from_json(&json).unwrap(), config);
    }
}
