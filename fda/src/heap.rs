use core::cmp::Ordering;
use std::collections::BinaryHeap;

/// A candidate sentence and the score it was queued with.
///
/// The score may be stale: it was exact when the entry was pushed, and can only overstate the
/// sentence's current score afterwards.
#[derive(Debug, Clone, Copy)]
pub struct HeapEntry {
    pub index: usize,
    pub score: f32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Higher score first; among equal scores the lower index wins.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Max-heap of training sentence indices keyed by possibly stale scores.
#[derive(Debug, Default)]
pub struct SentenceHeap {
    heap: BinaryHeap<HeapEntry>,
}

impl SentenceHeap {
    /// Builds a heap holding one entry per `(index, score)` pair.
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = (usize, f32)>,
    {
        let entries: Vec<_> = scores
            .into_iter()
            .map(|(index, score)| HeapEntry { index, score })
            .collect();
        Self {
            heap: BinaryHeap::from(entries),
        }
    }

    /// Inserts an entry.
    pub fn push(&mut self, index: usize, score: f32) {
        self.heap.push(HeapEntry { index, score });
    }

    /// Removes and returns the entry with the highest score.
    pub fn pop(&mut self) -> Option<HeapEntry> {
        self.heap.pop()
    }

    /// Gets the entry with the highest score.
    pub fn peek(&self) -> Option<&HeapEntry> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Iterates over the entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &HeapEntry> {
        self.heap.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(heap: &mut SentenceHeap) -> Vec<(usize, f32)> {
        let mut result = vec![];
        while let Some(e) = heap.pop() {
            result.push((e.index, e.score));
        }
        result
    }

    #[test]
    fn test_heap_max_first() {
        let mut heap = SentenceHeap::from_scores([(0, 1.0), (1, 3.0), (2, 2.0)]);

        assert_eq!(3, heap.len());
        assert_eq!(1, heap.peek().unwrap().index);
        assert_eq!(vec![(1, 3.0), (2, 2.0), (0, 1.0)], drain(&mut heap));
        assert!(heap.is_empty());
    }

    #[test]
    fn test_heap_tie_lower_index_first() {
        let mut heap = SentenceHeap::from_scores([(4, 1.0), (2, 1.0), (3, 1.0), (0, 0.5)]);

        assert_eq!(
            vec![(2, 1.0), (3, 1.0), (4, 1.0), (0, 0.5)],
            drain(&mut heap)
        );
    }

    #[test]
    fn test_heap_push_after_pop() {
        let mut heap = SentenceHeap::from_scores([(0, 5.0), (1, 4.0)]);
        let top = heap.pop().unwrap();
        heap.push(top.index, 3.0);

        assert_eq!(vec![(1, 4.0), (0, 3.0)], drain(&mut heap));
    }

    #[test]
    fn test_heap_empty() {
        let mut heap = SentenceHeap::from_scores(Vec::<(usize, f32)>::new());

        assert!(heap.peek().is_none());
        assert!(heap.pop().is_none());
        assert_eq!(0, heap.iter().count());
    }
}
