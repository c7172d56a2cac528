//! Priority queue of pairs waiting to join the pairing.

use super::pairing::{MinutiaPair, Pairing};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug)]
struct QueuedPair {
    /// Candidate edge length that discovered the pair.
    length: i32,
    sequence: u64,
    /// Already-paired end of the edge.
    reference: MinutiaPair,
    pair: MinutiaPair,
}

impl QueuedPair {
    fn key(&self) -> (i32, u64) {
        (self.length, self.sequence)
    }
}

impl PartialEq for QueuedPair {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedPair {}

impl PartialOrd for QueuedPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Pending pairs ordered by edge length, shortest first.
///
/// Equal lengths come out in insertion order.
#[derive(Clone, Debug, Default)]
pub struct PairSelector {
    queue: BinaryHeap<Reverse<QueuedPair>>,
    sequence: u64,
}

impl PairSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.sequence = 0;
    }

    /// Queues `pair`, found along an edge of `length` from `reference`.
    pub fn enqueue(&mut self, reference: MinutiaPair, pair: MinutiaPair, length: i32) {
        self.queue.push(Reverse(QueuedPair {
            length,
            sequence: self.sequence,
            reference,
            pair,
        }));
        self.sequence += 1;
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops leading entries whose minutiae were paired after they were queued.
    ///
    /// An entry that agrees with the pairing corroborates both ends of its
    /// edge, so both get a support count.
    pub fn skip_paired(&mut self, pairing: &mut Pairing) {
        while let Some(Reverse(head)) = self.queue.peek() {
            let head = *head;
            if !pairing.is_probe_paired(head.pair.probe)
                && !pairing.is_candidate_paired(head.pair.candidate)
            {
                break;
            }
            self.queue.pop();
            if pairing.candidate_by_probe(head.pair.probe) == Some(head.pair.candidate) {
                pairing.add_support_by_probe(head.reference.probe);
                pairing.add_support_by_probe(head.pair.probe);
            }
        }
    }

    /// Removes and returns the pending pair with the shortest edge.
    pub fn dequeue(&mut self) -> Option<MinutiaPair> {
        self.queue.pop().map(|Reverse(queued)| queued.pair)
    }
}

#[cfg(test)]
mod tests {
    use super::PairSelector;
    use crate::matching::pairing::{MinutiaPair, Pairing};

    #[test]
    fn shortest_first_then_insertion_order() {
        let root = MinutiaPair::new(0, 0);
        let mut selector = PairSelector::new();
        selector.enqueue(root, MinutiaPair::new(1, 1), 30);
        selector.enqueue(root, MinutiaPair::new(2, 2), 10);
        selector.enqueue(root, MinutiaPair::new(3, 3), 30);
        selector.enqueue(root, MinutiaPair::new(4, 4), 20);
        let order: Vec<_> = std::iter::from_fn(|| selector.dequeue())
            .map(|pair| pair.probe)
            .collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn skip_paired_supports_consistent_entries() {
        let root = MinutiaPair::new(0, 0);
        let mut pairing = Pairing::new(4, 4);
        pairing.add(root);
        pairing.add(MinutiaPair::new(1, 1));

        let mut selector = PairSelector::new();
        selector.enqueue(root, MinutiaPair::new(1, 1), 5);
        selector.enqueue(root, MinutiaPair::new(1, 2), 6);
        selector.enqueue(root, MinutiaPair::new(2, 3), 7);
        selector.skip_paired(&mut pairing);

        assert_eq!(selector.len(), 1);
        assert_eq!(pairing.support(0), 1);
        assert_eq!(pairing.support(1), 1);
        assert_eq!(selector.dequeue(), Some(MinutiaPair::new(2, 3)));
    }
}
