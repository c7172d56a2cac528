//! Working alignment between a probe and a candidate template.

/// Correspondence between a probe minutia and a candidate minutia.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinutiaPair {
    pub probe: usize,
    pub candidate: usize,
}

impl MinutiaPair {
    pub fn new(probe: usize, candidate: usize) -> Self {
        Self { probe, candidate }
    }
}

/// Pairs accepted so far, in growth order, with per-probe support counts.
///
/// The probe and candidate lookups are kept as exact inverses: every minutia
/// takes part in at most one pair.
#[derive(Clone, Debug, Default)]
pub struct Pairing {
    candidate_by_probe: Vec<Option<usize>>,
    probe_by_candidate: Vec<Option<usize>>,
    pairs: Vec<MinutiaPair>,
    support: Vec<usize>,
}

impl Pairing {
    pub fn new(probe_len: usize, candidate_len: usize) -> Self {
        let mut pairing = Self::default();
        pairing.select(probe_len, candidate_len);
        pairing
    }

    /// Sizes the lookups for a new template combination and clears all pairs.
    pub fn select(&mut self, probe_len: usize, candidate_len: usize) {
        self.candidate_by_probe.clear();
        self.candidate_by_probe.resize(probe_len, None);
        self.probe_by_candidate.clear();
        self.probe_by_candidate.resize(candidate_len, None);
        self.support.clear();
        self.support.resize(probe_len, 0);
        self.pairs.clear();
    }

    /// Removes all pairs, touching only the entries they occupied.
    pub fn reset(&mut self) {
        for pair in self.pairs.drain(..) {
            self.candidate_by_probe[pair.probe] = None;
            self.probe_by_candidate[pair.candidate] = None;
            self.support[pair.probe] = 0;
        }
    }

    /// Accepts `pair`; neither of its minutiae may already be paired.
    pub fn add(&mut self, pair: MinutiaPair) {
        debug_assert!(!self.is_probe_paired(pair.probe));
        debug_assert!(!self.is_candidate_paired(pair.candidate));
        self.candidate_by_probe[pair.probe] = Some(pair.candidate);
        self.probe_by_candidate[pair.candidate] = Some(pair.probe);
        self.pairs.push(pair);
    }

    /// Records one more edge corroborating the pair of probe minutia `probe`.
    pub fn add_support_by_probe(&mut self, probe: usize) {
        self.support[probe] += 1;
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pair added most recently; its edges drive the next growth step.
    pub fn last_added(&self) -> Option<MinutiaPair> {
        self.pairs.last().copied()
    }

    pub fn pairs(&self) -> &[MinutiaPair] {
        &self.pairs
    }

    pub fn candidate_by_probe(&self, probe: usize) -> Option<usize> {
        self.candidate_by_probe[probe]
    }

    pub fn probe_by_candidate(&self, candidate: usize) -> Option<usize> {
        self.probe_by_candidate[candidate]
    }

    pub fn is_probe_paired(&self, probe: usize) -> bool {
        self.candidate_by_probe[probe].is_some()
    }

    pub fn is_candidate_paired(&self, candidate: usize) -> bool {
        self.probe_by_candidate[candidate].is_some()
    }

    /// Supporting edges recorded for the pair of probe minutia `probe`.
    pub fn support(&self, probe: usize) -> usize {
        self.support[probe]
    }
}

#[cfg(test)]
mod tests {
    use super::{MinutiaPair, Pairing};

    fn assert_inverse(pairing: &Pairing, probe_len: usize, candidate_len: usize) {
        for probe in 0..probe_len {
            if let Some(candidate) = pairing.candidate_by_probe(probe) {
                assert_eq!(pairing.probe_by_candidate(candidate), Some(probe));
            }
        }
        for candidate in 0..candidate_len {
            if let Some(probe) = pairing.probe_by_candidate(candidate) {
                assert_eq!(pairing.candidate_by_probe(probe), Some(candidate));
            }
        }
    }

    #[test]
    fn lookups_stay_inverse() {
        let mut pairing = Pairing::new(4, 6);
        pairing.add(MinutiaPair::new(0, 5));
        pairing.add(MinutiaPair::new(3, 1));
        pairing.add_support_by_probe(3);
        assert_eq!(pairing.len(), 2);
        assert_eq!(pairing.last_added(), Some(MinutiaPair::new(3, 1)));
        assert_eq!(pairing.support(3), 1);
        assert!(pairing.is_candidate_paired(5));
        assert!(!pairing.is_probe_paired(1));
        assert_inverse(&pairing, 4, 6);
    }

    #[test]
    fn reset_clears_pairs_and_support() {
        let mut pairing = Pairing::new(3, 3);
        pairing.add(MinutiaPair::new(1, 2));
        pairing.add_support_by_probe(1);
        let snapshot = pairing.clone();
        pairing.reset();
        assert!(pairing.is_empty());
        assert_eq!(pairing.support(1), 0);
        assert!(!pairing.is_candidate_paired(2));
        assert_eq!(snapshot.candidate_by_probe(1), Some(2));
        assert_eq!(snapshot.support(1), 1);
        pairing.add(MinutiaPair::new(2, 2));
        assert_inverse(&pairing, 3, 3);
    }
}
