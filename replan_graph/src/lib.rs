// replan_graph: graph storage for incremental replanning.
//
// This crate holds everything the planner needs to know about a graph and
// nothing about planning itself: node identity, the read-only `Graph` view
// used to seed a planner, the mutable `WorldModel` contract the planner
// owns and edits as edge costs change, and `DiGraph`, a concrete graph that
// satisfies both.
//
// Module overview:
// - `types.rs`:   `NodeId`, `WeightedEdge`, and weight validation.
// - `world.rs`:   `Graph` and `WorldModel` traits.
// - `digraph.rs`: `DiGraph`, BTreeMap-backed adjacency in both directions.
// - `error.rs`:   `GraphError` and the crate `Result` alias.
//
// See also: `replan_core` for the D* Lite planner that consumes these
// traits.
//
// **Critical constraint: determinism.** Successor and predecessor
// enumeration order decides how the planner breaks ties between equal-cost
// routes, so every implementation in this crate iterates in ascending
// `NodeId` order. No `HashMap`.

pub mod digraph;
pub mod error;
pub mod types;
pub mod world;

pub use digraph::DiGraph;
pub use error::{GraphError, Result};
pub use types::{NodeId, WeightedEdge, check_weight};
pub use world::{Graph, WorldModel};
