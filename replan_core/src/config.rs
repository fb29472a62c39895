// Planner configuration.
//
// Nothing here changes which path the planner finds; these knobs control
// how much self-checking it does and how long a path `path()` will report.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// After every repair pass, verify that a node is queued exactly when
    /// `g != rhs` and that the start is settled. Panics on violation. Costs
    /// a full scan of the world model per pass.
    pub check_invariants: bool,

    /// Longest path (in nodes) that `path()` will walk before giving up and
    /// reporting `NoPath`. `None` uses the world model's node count, which
    /// the walk never exceeds since it cannot revisit a node.
    pub max_path_len: Option<usize>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            check_invariants: cfg!(debug_assertions),
            max_path_len: None,
        }
    }
}
