// Open queue for D* Lite: an indexed binary min-heap.
//
// `BinaryHeap` only supports push/pop, but the planner has to re-key and
// remove arbitrary nodes as their consistency changes. The heap here is a
// plain `Vec` of entries plus a `NodeId -> slot` index that is kept in sync
// on every swap, giving O(log n) insert, update, and remove and O(1)
// membership tests.
//
// Entries order by `(key, node)`. The node ID tiebreak makes pop order a
// total order, so two planners fed identical inputs expand nodes in
// identical order.
//
// See also: `key.rs` for the key type, `planner.rs` which owns the queue.

use crate::key::Key;
use replan_graph::NodeId;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry {
    node: NodeId,
    key: Key,
}

impl Entry {
    fn precedes(&self, other: &Entry) -> bool {
        (self.key, self.node) < (other.key, other.node)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct KeyedQueue {
    heap: Vec<Entry>,
    slots: FxHashMap<NodeId, usize>,
}

impl KeyedQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert `node` with `key`. If the node is already queued its key is
    /// replaced instead.
    pub(crate) fn insert(&mut self, node: NodeId, key: Key) {
        if self.update(node, key) {
            return;
        }
        let slot = self.heap.len();
        self.heap.push(Entry { node, key });
        self.slots.insert(node, slot);
        self.sift_up(slot);
    }

    /// Change the key of a queued node. Returns `false` if the node is not
    /// queued.
    pub(crate) fn update(&mut self, node: NodeId, key: Key) -> bool {
        let Some(&slot) = self.slots.get(&node) else {
            return false;
        };
        self.heap[slot].key = key;
        self.restore(slot);
        true
    }

    /// Remove a node, returning its key if it was queued.
    pub(crate) fn remove(&mut self, node: NodeId) -> Option<Key> {
        let slot = self.slots.remove(&node)?;
        let last = self.heap.len() - 1;
        let removed = self.heap.swap_remove(slot);
        if slot != last {
            // The entry moved into `slot` came from the bottom of the heap
            // and may belong either above or below it.
            self.slots.insert(self.heap[slot].node, slot);
            self.restore(slot);
        }
        Some(removed.key)
    }

    /// The minimum entry without removing it.
    pub(crate) fn peek(&self) -> Option<(NodeId, Key)> {
        self.heap.first().map(|e| (e.node, e.key))
    }

    pub(crate) fn top_key(&self) -> Option<Key> {
        self.heap.first().map(|e| e.key)
    }

    #[cfg(test)]
    /// Remove and return the minimum entry.
    pub(crate) fn pop(&mut self) -> Option<(NodeId, Key)> {
        let (node, key) = self.peek()?;
        self.remove(node);
        Some((node, key))
    }

    pub(crate) fn contains(&self, node: NodeId) -> bool {
        self.slots.contains_key(&node)
    }

    #[cfg(test)]
    /// The key a node is currently queued with.
    pub(crate) fn key_of(&self, node: NodeId) -> Option<Key> {
        self.slots.get(&node).map(|&slot| self.heap[slot].key)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[cfg(test)]
    /// Queued nodes in heap order (not sorted).
    pub(crate) fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.heap.iter().map(|e| e.node)
    }

    /// Move the entry at `slot` up or down until the heap property holds.
    fn restore(&mut self, slot: usize) {
        let settled = self.sift_up(slot);
        if settled == slot {
            self.sift_down(slot);
        }
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.heap[slot].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.heap[left].precedes(&self.heap[smallest]) {
                smallest = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[smallest]) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].node, a);
        self.slots.insert(self.heap[b].node, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Cost;

    fn k(v: f64) -> Key {
        Key::new(v, Cost::new(v, 0))
    }

    fn drain(queue: &mut KeyedQueue) -> Vec<u64> {
        let mut order = Vec::new();
        while let Some((node, _)) = queue.pop() {
            order.push(node.0);
        }
        order
    }

    #[test]
    fn pops_in_key_order() {
        let mut queue = KeyedQueue::new();
        for (id, key) in [(1, 5.0), (2, 1.0), (3, 3.0), (4, 4.0), (5, 2.0)] {
            queue.insert(NodeId(id), k(key));
        }
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.top_key(), Some(k(1.0)));
        assert_eq!(drain(&mut queue), vec![2, 5, 3, 4, 1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_keys_break_ties_by_node_id() {
        let mut queue = KeyedQueue::new();
        queue.insert(NodeId(9), k(1.0));
        queue.insert(NodeId(2), k(1.0));
        queue.insert(NodeId(5), k(1.0));
        assert_eq!(drain(&mut queue), vec![2, 5, 9]);
    }

    #[test]
    fn second_component_breaks_first_component_ties() {
        let mut queue = KeyedQueue::new();
        queue.insert(NodeId(1), Key::new(4.0, Cost::new(3.0, 0)));
        queue.insert(NodeId(2), Key::new(4.0, Cost::new(1.0, 0)));
        assert_eq!(queue.peek(), Some((NodeId(2), Key::new(4.0, Cost::new(1.0, 0)))));
    }

    #[test]
    fn update_moves_entries_both_ways() {
        let mut queue = KeyedQueue::new();
        for id in 0..8 {
            queue.insert(NodeId(id), k(id as f64));
        }
        // Demote the current minimum, promote the maximum.
        assert!(queue.update(NodeId(0), k(100.0)));
        assert!(queue.update(NodeId(7), k(-1.0)));
        assert_eq!(queue.key_of(NodeId(7)), Some(k(-1.0)));
        assert_eq!(drain(&mut queue), vec![7, 1, 2, 3, 4, 5, 6, 0]);
    }

    #[test]
    fn update_of_absent_node_is_refused() {
        let mut queue = KeyedQueue::new();
        assert!(!queue.update(NodeId(3), k(1.0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn insert_of_queued_node_rekeys() {
        let mut queue = KeyedQueue::new();
        queue.insert(NodeId(1), k(5.0));
        queue.insert(NodeId(2), k(3.0));
        queue.insert(NodeId(1), k(1.0));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Some((NodeId(1), k(1.0))));
    }

    #[test]
    fn remove_from_middle_keeps_heap_valid() {
        let mut queue = KeyedQueue::new();
        for id in 0..20 {
            // Scrambled keys so removal hits interior slots.
            queue.insert(NodeId(id), k(((id * 7) % 20) as f64));
        }
        assert_eq!(queue.remove(NodeId(3)), Some(k(1.0)));
        assert_eq!(queue.remove(NodeId(14)), Some(k(18.0)));
        assert_eq!(queue.remove(NodeId(0)), Some(k(0.0)));
        assert_eq!(queue.remove(NodeId(0)), None);
        assert!(!queue.contains(NodeId(3)));

        let mut keys = Vec::new();
        while let Some((_, key)) = queue.pop() {
            keys.push(key.k1);
        }
        assert_eq!(keys.len(), 17);
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn remove_last_entry() {
        let mut queue = KeyedQueue::new();
        queue.insert(NodeId(1), k(1.0));
        queue.insert(NodeId(2), k(2.0));
        assert_eq!(queue.remove(NodeId(2)), Some(k(2.0)));
        assert_eq!(queue.remove(NodeId(1)), Some(k(1.0)));
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn membership_tracks_nodes() {
        let mut queue = KeyedQueue::new();
        queue.insert(NodeId(4), k(2.0));
        queue.insert(NodeId(6), k(1.0));
        let mut nodes: Vec<_> = queue.nodes().map(|n| n.0).collect();
        nodes.sort_unstable();
        assert_eq!(nodes, vec![4, 6]);
        assert!(queue.contains(NodeId(4)));
        assert!(!queue.contains(NodeId(5)));
    }
}
