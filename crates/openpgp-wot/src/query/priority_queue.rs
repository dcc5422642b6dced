//! A de-duplicating min-priority queue of (key, cost) pairs.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// Pops the key with the lowest cost. Inserting a key that is already
/// queued keeps the cheaper of the two costs. Among equal costs, keys
/// pop in insertion order.
#[derive(Debug)]
pub(crate) struct PairPriorityQueue<K, C> {
    heap: BinaryHeap<Reverse<(C, u64, K)>>,
    queued: HashMap<K, C>,
    sequence: u64,
}

impl<K, C> PairPriorityQueue<K, C>
where
    K: Clone + Eq + Hash + Ord,
    C: Clone + Ord,
{
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            queued: HashMap::new(),
            sequence: 0,
        }
    }

    pub(crate) fn insert_or_update(&mut self, key: K, cost: C) {
        if let Some(current) = self.queued.get(&key) {
            if cost >= *current {
                return;
            }
        }
        self.queued.insert(key.clone(), cost.clone());
        self.heap.push(Reverse((cost, self.sequence, key)));
        self.sequence += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<(K, C)> {
        while let Some(Reverse((cost, _, key))) = self.heap.pop() {
            // Superseded entries stay in the heap until they surface.
            if self.queued.get(&key) == Some(&cost) {
                self.queued.remove(&key);
                return Some((key, cost));
            }
        }
        None
    }
}
