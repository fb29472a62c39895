// Route costs with a hop-count tiebreak.
//
// A `Cost` is a summed edge weight plus the number of edges summed, ordered
// by weight first and hop count second. Every edge therefore strictly
// increases the cost of any route it extends, zero-weight edges included.
// The repair loop and the greedy path walk both rely on that: with bare
// weights, two nodes on a zero-weight cycle can keep vouching for each
// other's stale `g` after the cycle's exit is cut, and a walk across a
// zero-weight plateau sees equal `cost + g` on every side and can circle it
// forever.
//
// All infinite costs collapse to `Cost::INFINITE`, so "no route" compares
// equal to itself regardless of how it was reached.
//
// See also: `key.rs`, which orders queue entries by these costs.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Cost {
    value: f64,
    hops: u32,
}

impl Cost {
    pub(crate) const ZERO: Cost = Cost {
        value: 0.0,
        hops: 0,
    };

    pub(crate) const INFINITE: Cost = Cost {
        value: f64::INFINITY,
        hops: u32::MAX,
    };

    pub(crate) fn new(value: f64, hops: u32) -> Self {
        if value == f64::INFINITY || hops == u32::MAX {
            return Self::INFINITE;
        }
        // Adding 0.0 turns -0.0 into 0.0 so that `total_cmp` agrees with `==`.
        Self {
            value: value + 0.0,
            hops,
        }
    }

    /// The cost of a single edge of weight `weight`.
    pub(crate) fn edge(weight: f64) -> Self {
        Self::new(weight, 1)
    }

    /// Summed edge weight.
    pub(crate) fn value(self) -> f64 {
        self.value
    }

    pub(crate) fn hops(self) -> u32 {
        self.hops
    }

    pub(crate) fn is_infinite(self) -> bool {
        self.hops == u32::MAX
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost::new(self.value + rhs.value, self.hops.saturating_add(rhs.hops))
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.hops.cmp(&other.hops))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{}/{}", self.value, self.hops)
        }
    }
}
