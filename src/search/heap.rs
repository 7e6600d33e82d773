use std::cmp::Ordering;
use crate::scoring::rsv::Rsv;

/// Total order over accumulator slots: by score, then the lower document id
/// ranks higher. Equal scores therefore always resolve the same way.
#[inline]
pub fn rank<T: Rsv>(scores: &[T], a: usize, b: usize) -> Ordering {
    scores[a].total_cmp(&scores[b]).then_with(|| b.cmp(&a))
}

/// Bounded min-heap of slot indices into an accumulator array.
///
/// The heap stores indices, never scores: scores keep changing in place and
/// every operation takes the current score slice. While fewer than `k` slots
/// are tracked the buffer is unordered; `build_min_heap` establishes heap
/// order once it is full.
pub struct TopKHeap {
    slots: Vec<usize>,
    k: usize,
}

impl TopKHeap {
    pub fn new(k: usize) -> Self {
        TopKHeap {
            slots: Vec::with_capacity(k),
            k,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.k
    }

    /// Forget every slot; the buffer keeps its allocation.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Append while filling. Does not maintain heap order.
    #[inline]
    pub fn push(&mut self, slot: usize) {
        debug_assert!(self.slots.len() < self.k, "push into a full top-k buffer");
        self.slots.push(slot);
    }

    pub fn root(&self) -> Option<usize> {
        self.slots.first().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.slots
    }

    pub fn build_min_heap<T: Rsv>(&mut self, scores: &[T]) {
        for i in (0..self.slots.len() / 2).rev() {
            self.sift_down(scores, i);
        }
    }

    /// Restore order after a member's score increased. Returns false if
    /// `slot` is not in the heap.
    pub fn min_update<T: Rsv>(&mut self, scores: &[T], slot: usize) -> bool {
        match self.slots.iter().position(|&s| s == slot) {
            Some(at) => {
                self.sift_down(scores, at);
                true
            }
            None => false,
        }
    }

    /// Evict the root in favour of `slot`.
    pub fn min_insert<T: Rsv>(&mut self, scores: &[T], slot: usize) {
        if self.slots.is_empty() {
            return;
        }
        self.slots[0] = slot;
        self.sift_down(scores, 0);
    }

    /// Order the buffer best-first. Destroys heap order.
    pub fn sort_descending<T: Rsv>(&mut self, scores: &[T]) {
        self.slots.sort_unstable_by(|&a, &b| rank(scores, b, a));
    }

    pub fn is_min_heap<T: Rsv>(&self, scores: &[T]) -> bool {
        (1..self.slots.len()).all(|i| rank(scores, self.slots[(i - 1) / 2], self.slots[i]) != Ordering::Greater)
    }

    fn sift_down<T: Rsv>(&mut self, scores: &[T], mut at: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * at + 1;
            let right = left + 1;
            let mut smallest = at;

            if left < len && rank(scores, self.slots[left], self.slots[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && rank(scores, self.slots[right], self.slots[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == at {
                break;
            }
            self.slots.swap(at, smallest);
            at = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(scores: &[u32], k: usize) -> TopKHeap {
        let mut heap = TopKHeap::new(k);
        for slot in 0..k {
            heap.push(slot);
        }
        heap.build_min_heap(scores);
        heap
    }

    #[test]
    fn test_rank_breaks_ties_by_lower_id() {
        let scores = [5u32, 5, 7];
        assert_eq!(rank(&scores, 0, 1), Ordering::Greater);
        assert_eq!(rank(&scores, 1, 0), Ordering::Less);
        assert_eq!(rank(&scores, 2, 0), Ordering::Greater);
        assert_eq!(rank(&scores, 1, 1), Ordering::Equal);
    }

    #[test]
    fn test_build_min_heap() {
        let scores = [9u32, 4, 7, 1, 8, 3];
        let heap = filled(&scores, 6);
        assert!(heap.is_min_heap(&scores));
        assert_eq!(heap.root(), Some(3));
    }

    #[test]
    fn test_min_update_after_increase() {
        let mut scores = [9u32, 4, 7, 1, 8, 3];
        let mut heap = filled(&scores, 6);
        scores[3] = 20;
        assert!(heap.min_update(&scores, 3));
        assert!(heap.is_min_heap(&scores));
        assert_eq!(heap.root(), Some(5));
        assert!(!heap.min_update(&scores, 99));
    }

    #[test]
    fn test_min_insert_evicts_root() {
        let mut scores = vec![9u32, 4, 7, 1, 8, 3, 0];
        let mut heap = filled(&scores, 6);
        scores[6] = 5;
        heap.min_insert(&scores, 6);
        assert!(heap.is_min_heap(&scores));
        assert!(!heap.as_slice().contains(&3));
        assert_eq!(heap.root(), Some(5));
    }

    #[test]
    fn test_sort_descending() {
        let scores = [2u32, 6, 6, 1];
        let mut heap = filled(&scores, 4);
        heap.sort_descending(&scores);
        assert_eq!(heap.as_slice(), &[1, 2, 0, 3]);
    }

    #[test]
    fn test_clear_keeps_k() {
        let scores = [1u32, 2];
        let mut heap = filled(&scores, 2);
        assert!(heap.is_full());
        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.k(), 2);
    }
}
