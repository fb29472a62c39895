// replan_core: D* Lite incremental replanning.
//
// Plans a shortest route from a moving start to a fixed goal over a
// directed weighted graph and keeps that route optimal as edge costs
// change, repairing only the part of the search tree a change invalidates
// instead of searching again from scratch.
//
// Module overview:
// - `planner.rs`:   `DStarLite`: initialization, the repair loop, `step`,
//                   `move_to`, `update_world`, and path extraction.
// - `queue.rs`:     `KeyedQueue`: indexed binary heap with update/remove.
// - `key.rs`:       `Key`: lexicographic `[k1, k2]` priority, NaN-checked.
// - `cost.rs`:      `Cost`: route weight with a hop-count tiebreak.
// - `heuristic.rs`: `Heuristic` trait, `ZeroHeuristic`, `ManhattanHeuristic`.
// - `config.rs`:    `PlannerConfig`: invariant checking and walk limits.
// - `error.rs`:     `PlanError` and the crate `Result` alias.
//
// The planner is single-threaded and synchronous: every public method runs
// the repair loop to its fixed point before returning. Hosts that ingest
// observations concurrently must serialize their `update_world` calls.
//
// See also: `replan_graph` for the `WorldModel` contract and `DiGraph`,
// `replan_scenario` for a JSON-driven runner built on this crate.

pub mod config;
mod cost;
pub mod error;
pub mod heuristic;
mod key;
pub mod planner;
mod queue;

pub use config::PlannerConfig;
pub use error::{PlanError, Result};
pub use heuristic::{GridPos, Heuristic, ManhattanHeuristic, ZeroHeuristic};
pub use planner::{DStarLite, PathOutcome, PathResult, RepairStats};
