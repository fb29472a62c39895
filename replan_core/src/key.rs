// Priority keys for the D* Lite open queue.
//
// A key is the pair `[k1, k2]` with `k2 = min(g, rhs)` and
// `k1 = k2 + h(start, node) + k_m`, compared lexicographically. `k2` is a
// `Cost`; `k1` carries the same hop count as `k2` since the heuristic terms
// add weight only. The order is therefore k1's weight, then the hop count,
// then k2's weight.
//
// Weights order with `total_cmp`, which is only a correct order because NaN
// is refused at construction: a NaN key means a heuristic or cost went bad,
// and the search would silently degrade if it were allowed into the queue.

use std::cmp::Ordering;
use std::fmt;

use crate::cost::Cost;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Key {
    pub(crate) k1: f64,
    pub(crate) k2: Cost,
}

impl Key {
    /// Build a key. Panics if either weight is NaN.
    pub(crate) fn new(k1: f64, k2: Cost) -> Self {
        assert!(
            !k1.is_nan() && !k2.value().is_nan(),
            "NaN in planner key [{k1}, {k2}]"
        );
        // Adding 0.0 turns -0.0 into 0.0 so that `total_cmp` agrees with `==`.
        Self { k1: k1 + 0.0, k2 }
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.k1
            .total_cmp(&other.k1)
            .then_with(|| self.k2.hops().cmp(&other.k2.hops()))
            .then_with(|| self.k2.value().total_cmp(&other.k2.value()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.k1, self.k2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k1: f64, k2: f64, hops: u32) -> Key {
        Key::new(k1, Cost::new(k2, hops))
    }

    #[test]
    fn lexicographic_order() {
        assert!(key(1.0, 5.0, 0) < key(2.0, 0.0, 0));
        assert!(key(2.0, 0.0, 0) < key(2.0, 1.0, 0));
        assert_eq!(key(3.0, 3.0, 1).cmp(&key(3.0, 3.0, 1)), Ordering::Equal);
    }

    #[test]
    fn hops_break_k1_ties_before_k2() {
        assert!(key(2.0, 2.0, 1) < key(2.0, 1.0, 2));
        assert!(key(2.0, 1.0, 2) < key(2.0, 2.0, 2));
        assert!(key(1.0, 1.0, 9) < key(2.0, 0.0, 0));
    }

    #[test]
    fn infinity_sorts_last() {
        assert!(key(1e300, 1e300, 5) < Key::new(f64::INFINITY, Cost::ZERO));
        assert!(Key::new(f64::INFINITY, Cost::edge(1.0)) < Key::new(f64::INFINITY, Cost::INFINITE));
    }

    #[test]
    fn negative_zero_equals_zero() {
        let a = key(-0.0, -0.0, 0);
        let b = key(0.0, 0.0, 0);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    #[should_panic(expected = "NaN in planner key")]
    fn nan_key_panics() {
        let _ = Key::new(f64::NAN, Cost::ZERO);
    }

    #[test]
    #[should_panic(expected = "NaN in planner key")]
    fn nan_second_component_panics() {
        let _ = key(0.0, f64::NAN, 0);
    }
}
