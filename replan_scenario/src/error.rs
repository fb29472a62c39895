// Errors for loading and running scenarios.
//
// See also: `config.rs` for the validation behind `Invalid`, `runner.rs`
// for where graph and planner errors surface.

use replan_core::PlanError;
use replan_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error("scenario graph rejected: {0}")]
    Graph(#[from] GraphError),

    #[error("planner failed: {0}")]
    Plan(#[from] PlanError),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
