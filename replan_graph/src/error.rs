// Errors raised by graph mutation.
//
// Negative and NaN weights are configuration errors: shortest-path
// optimality depends on non-negative costs, so they are rejected at the
// point of mutation and never clamped.

use crate::types::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("negative weight {weight} on edge {from} -> {to}")]
    NegativeWeight {
        from: NodeId,
        to: NodeId,
        weight: f64,
    },

    #[error("NaN weight on edge {from} -> {to}")]
    NanWeight { from: NodeId, to: NodeId },
}

pub type Result<T> = std::result::Result<T, GraphError>;
