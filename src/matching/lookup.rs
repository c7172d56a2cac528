//! Matching of probe and candidate edge lists.

use super::edge::{EdgeShape, NeighborEdge};
use crate::angle;
use crate::params::tunable;

/// Tolerances for treating two edges as the same.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeLookupConfig {
    pub max_distance_error: i32,
    /// Largest circular difference accepted for either relative angle.
    pub max_angle_error: u8,
}

impl Default for EdgeLookupConfig {
    fn default() -> Self {
        Self {
            max_distance_error: 13,
            max_angle_error: angle::from_degrees(10),
        }
    }
}

tunable!(EdgeLookupConfig {
    param max_distance_error: 0 ..= 50, precision 0, dpi true;
    param max_angle_error: 1 ..= 128, precision 0, dpi false;
});

/// Indices of a matching edge in the probe and the candidate list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgePair {
    pub probe: usize,
    pub candidate: usize,
}

impl EdgeLookupConfig {
    pub fn matches(&self, probe: &EdgeShape, candidate: &EdgeShape) -> bool {
        (probe.length - candidate.length).abs() <= self.max_distance_error
            && self.angle_matches(probe.reference_angle, candidate.reference_angle)
            && self.angle_matches(probe.neighbor_angle, candidate.neighbor_angle)
    }

    fn angle_matches(&self, a: u8, b: u8) -> bool {
        let delta = angle::difference(a, b);
        delta <= self.max_angle_error || delta >= angle::complementary(self.max_angle_error)
    }

    /// Appends to `out` every pair of matching edges, candidate-major.
    ///
    /// Both lists must be sorted by length; a window over the probe list
    /// follows the candidate edge length so each probe edge is compared only
    /// against candidate edges of similar length.
    pub fn find_matching_pairs(
        &self,
        probe: &[NeighborEdge],
        candidate: &[NeighborEdge],
        out: &mut Vec<EdgePair>,
    ) {
        let (mut begin, mut end) = (0, 0);
        for (candidate_index, candidate_edge) in candidate.iter().enumerate() {
            let length = candidate_edge.shape.length;
            while begin < probe.len() && probe[begin].shape.length < length - self.max_distance_error {
                begin += 1;
            }
            end = end.max(begin);
            while end < probe.len() && probe[end].shape.length <= length + self.max_distance_error {
                end += 1;
            }
            for (offset, probe_edge) in probe[begin..end].iter().enumerate() {
                let shape = &probe_edge.shape;
                if self.angle_matches(shape.reference_angle, candidate_edge.shape.reference_angle)
                    && self.angle_matches(shape.neighbor_angle, candidate_edge.shape.neighbor_angle)
                {
                    out.push(EdgePair {
                        probe: begin + offset,
                        candidate: candidate_index,
                    });
                }
            }
        }
    }
}
