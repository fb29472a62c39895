// Planner errors.
//
// See also: `replan_graph::error` for the weight checks wrapped here.

use replan_graph::{GraphError, NodeId};
use thiserror::Error;

/// Errors surfaced by planner construction and world updates.
///
/// Only configuration problems are errors. An unreachable goal is a normal
/// planner state, reported through `PathOutcome` and `step()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("world model rejected update: {0}")]
    Graph(#[from] GraphError),

    #[error("node {0} is not in the world model")]
    UnknownNode(NodeId),
}

pub type Result<T> = std::result::Result<T, PlanError>;
