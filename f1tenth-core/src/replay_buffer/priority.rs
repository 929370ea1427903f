//! Sum tree for prioritized sampling.
//!
//! The tree stores one priority per slot of the replay buffer in its leaves
//! and the sum of its children in every inner node, so that the slot
//! covering a given point of the cumulative priority can be found in
//! `O(log n)`. Leaves are padded to a power of two with zero priorities,
//! which keeps the cumulative ranges in slot order.
use super::PerConfig;

/// Priority of a sample, evaluated once when it is inserted.
///
/// Terminal samples and samples with a non-zero reward get
/// `base_priority * boost`, others `base_priority`.
pub fn priority(reward: f32, terminal: bool, config: &PerConfig) -> f32 {
    if terminal || reward != 0.0 {
        config.base_priority * config.boost
    } else {
        config.base_priority
    }
}

/// Priorities of the slots of a replay buffer.
#[derive(Debug, Clone)]
pub struct PriorityIndex {
    capacity: usize,
    leaves: usize,
    tree: Vec<f64>,
}

impl PriorityIndex {
    /// Creates an index where every slot has zero priority.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        let leaves = capacity.next_power_of_two();
        Self {
            capacity,
            leaves,
            tree: vec![0f64; 2 * leaves - 1],
        }
    }

    /// Sum of all priorities.
    pub fn total(&self) -> f64 {
        self.tree[0]
    }

    /// Priority of the `ix`-th slot.
    pub fn get(&self, ix: usize) -> f32 {
        self.tree[ix + self.leaves - 1] as f32
    }

    /// Sets the priority of the `ix`-th slot.
    pub fn set(&mut self, ix: usize, p: f32) {
        debug_assert!(ix < self.capacity);
        debug_assert!(p >= 0.0);

        let mut node = ix + self.leaves - 1;
        let change = p as f64 - self.tree[node];
        self.tree[node] = p as f64;
        while node > 0 {
            node = (node - 1) / 2;
            self.tree[node] += change;
        }
    }

    /// Returns the slot whose cumulative priority range contains `s`,
    /// where `0 <= s < total()`. Slot `i` covers
    /// `[p_0 + .. + p_{i-1}, p_0 + .. + p_i)`.
    ///
    /// Subtrees with zero priority are never entered, so an unpopulated slot
    /// is not returned even when rounding pushes `s` to the upper end.
    pub fn find(&self, s: f64) -> usize {
        let mut node = 0;
        let mut s = s;

        loop {
            let left = 2 * node + 1;
            let right = left + 1;
            if left >= self.tree.len() {
                break;
            }

            if s < self.tree[left] || self.tree[right] <= 0.0 {
                node = left;
            } else {
                s -= self.tree[left];
                node = right;
            }
        }

        node + 1 - self.leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_index_odd() {
        let data = vec![0.5f32, 0.2, 0.8, 0.3, 1.1, 2.5, 3.9];
        let mut index = PriorityIndex::new(8);
        for (ix, &p) in data.iter().enumerate() {
            index.set(ix, p);
        }

        assert!((index.total() - data.iter().sum::<f32>() as f64).abs() < 1e-5);
        assert_eq!(index.find(0.0), 0);
        assert_eq!(index.find(0.4), 0);
        assert_eq!(index.find(0.6), 1);
        assert_eq!(index.find(1.2), 2);
        assert_eq!(index.find(1.6), 3);
        assert_eq!(index.find(2.0), 4);
        assert_eq!(index.find(2.8), 4);
        assert_eq!(index.find(9.29), 6);
        // past the end, the empty 8th slot is skipped
        assert_eq!(index.find(9.31), 6);
    }

    #[test]
    fn test_priority_index_overwrite() {
        let mut index = PriorityIndex::new(3);
        index.set(0, 1.0);
        index.set(1, 1.0);
        index.set(2, 1.0);
        index.set(0, 4.0);
        assert!((index.total() - 6.0).abs() < 1e-9);
        assert_eq!(index.get(0), 4.0);
        assert_eq!(index.find(3.9), 0);
        assert_eq!(index.find(4.1), 1);
        assert_eq!(index.find(5.1), 2);
        // rounding up to the total stays on the last populated slot
        assert_eq!(index.find(6.0), 2);
    }

    #[test]
    fn test_priority_index_slot_order() {
        let data = vec![1.0f32, 5.0, 1.0, 1.0, 5.0];
        let mut index = PriorityIndex::new(5);
        for (ix, &p) in data.iter().enumerate() {
            index.set(ix, p);
        }

        let mut lower = 0.0;
        for (ix, &p) in data.iter().enumerate() {
            assert_eq!(index.get(ix), p);
            assert_eq!(index.find(lower), ix);
            assert_eq!(index.find(lower + p as f64 - 0.01), ix);
            lower += p as f64;
        }
        assert!((index.total() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_priority_index_single_slot() {
        let mut index = PriorityIndex::new(1);
        index.set(0, 2.0);
        assert_eq!(index.total(), 2.0);
        assert_eq!(index.find(1.5), 0);
    }

    #[test]
    fn test_priority_heuristic() {
        let config = PerConfig::default().base_priority(1.0).boost(4.0);
        assert_eq!(priority(0.0, false, &config), 1.0);
        assert_eq!(priority(-1.0, false, &config), 4.0);
        assert_eq!(priority(0.0, true, &config), 4.0);
        assert_eq!(priority(0.5, true, &config), 4.0);
    }
}
