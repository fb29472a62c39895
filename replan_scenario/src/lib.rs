// replan_scenario: JSON-driven scenarios for the D* Lite replanner.
//
// Loads a graph, endpoints, heuristic choice, and a timetable of edge-cost
// changes from a JSON file, then walks an agent from start to goal,
// replanning whenever a batch of changes arrives.
//
// Module overview:
// - `config.rs`: `ScenarioConfig` and its JSON format.
// - `runner.rs`: `run` / `build_planner`, `RunReport`, `ScenarioHeuristic`.
// - `error.rs`:  `ScenarioError` and the crate `Result` alias.
//
// The `replan` binary (`main.rs`) is a thin CLI over `run`.

pub mod config;
pub mod error;
pub mod runner;

pub use config::{ChangeBatch, EdgeSpec, HeuristicSpec, NodeSpec, ScenarioConfig};
pub use error::{Result, ScenarioError};
pub use runner::{RunReport, ScenarioHeuristic, ScenarioPlanner, build_planner, run};
