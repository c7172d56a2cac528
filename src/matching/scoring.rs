//! Pairing statistics and the linear score computed from them.

use super::pairing::Pairing;
use crate::params::tunable;
use crate::template::Template;

/// Summary of one grown pairing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MatchAnalysis {
    pub pair_count: usize,
    /// Pairs whose minutiae have the same kind.
    pub correct_type_count: usize,
    /// Pairs with at least `min_supporting_edges` supporting edges.
    pub supported_count: usize,
    /// Mean of the paired share of the probe and of the candidate.
    pub pair_fraction: f32,
    /// Edges that grew the pairing plus all supporting edges.
    pub edge_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub pair_count_factor: f32,
    pub pair_fraction_factor: f32,
    pub correct_type_factor: f32,
    pub supported_count_factor: f32,
    pub edge_count_factor: f32,
    pub min_supporting_edges: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pair_count_factor: 0.48,
            pair_fraction_factor: 8.26,
            correct_type_factor: 0.1,
            supported_count_factor: 0.4,
            edge_count_factor: 0.208,
            min_supporting_edges: 1,
        }
    }
}

tunable!(ScoringConfig {
    param pair_count_factor: 0.0 ..= 10.0, precision 2, dpi false;
    param pair_fraction_factor: 0.0 ..= 100.0, precision 2, dpi false;
    param correct_type_factor: 0.0 ..= 10.0, precision 2, dpi false;
    param supported_count_factor: 0.0 ..= 10.0, precision 2, dpi false;
    param edge_count_factor: 0.0 ..= 10.0, precision 3, dpi false;
    param min_supporting_edges: 1 ..= 100, precision 0, dpi false;
});

impl ScoringConfig {
    pub fn analyze(&self, pairing: &Pairing, probe: &Template, candidate: &Template) -> MatchAnalysis {
        let mut analysis = MatchAnalysis {
            pair_count: pairing.len(),
            ..MatchAnalysis::default()
        };
        if pairing.is_empty() {
            return analysis;
        }
        let mut support_total = 0;
        for pair in pairing.pairs() {
            let support = pairing.support(pair.probe);
            support_total += support;
            if support >= self.min_supporting_edges {
                analysis.supported_count += 1;
            }
            if probe.minutiae()[pair.probe].kind == candidate.minutiae()[pair.candidate].kind {
                analysis.correct_type_count += 1;
            }
        }
        analysis.edge_count = analysis.pair_count - 1 + support_total;
        let probe_fraction = analysis.pair_count as f32 / probe.len() as f32;
        let candidate_fraction = analysis.pair_count as f32 / candidate.len() as f32;
        analysis.pair_fraction = (probe_fraction + candidate_fraction) / 2.0;
        analysis
    }

    pub fn score(&self, analysis: &MatchAnalysis) -> f32 {
        self.pair_count_factor * analysis.pair_count as f32
            + self.correct_type_factor * analysis.correct_type_count as f32
            + self.supported_count_factor * analysis.supported_count as f32
            + self.pair_fraction_factor * analysis.pair_fraction
            + self.edge_count_factor * analysis.edge_count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchAnalysis, ScoringConfig};
    use crate::geometry::Point;
    use crate::matching::pairing::{MinutiaPair, Pairing};
    use crate::template::{Minutia, MinutiaKind, Template};

    fn template(kinds: &[MinutiaKind]) -> Template {
        kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| Minutia::new(Point::new(i as i32 * 10, 0), 0, kind))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn analysis_counts_types_support_and_edges() {
        let probe = template(&[MinutiaKind::Ending, MinutiaKind::Bifurcation, MinutiaKind::Ending]);
        let candidate = template(&[MinutiaKind::Ending, MinutiaKind::Ending]);
        let mut pairing = Pairing::new(3, 2);
        pairing.add(MinutiaPair::new(0, 0));
        pairing.add(MinutiaPair::new(1, 1));
        pairing.add_support_by_probe(1);
        pairing.add_support_by_probe(1);

        let analysis = ScoringConfig::default().analyze(&pairing, &probe, &candidate);
        assert_eq!(analysis.pair_count, 2);
        assert_eq!(analysis.correct_type_count, 1);
        assert_eq!(analysis.supported_count, 1);
        assert_eq!(analysis.edge_count, 3);
        assert!((analysis.pair_fraction - (2.0 / 3.0 + 1.0) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn lone_pair_scores_type_and_fraction_terms() {
        let config = ScoringConfig::default();
        let analysis = MatchAnalysis {
            pair_count: 1,
            correct_type_count: 1,
            supported_count: 0,
            pair_fraction: 1.0,
            edge_count: 0,
        };
        assert!((config.score(&analysis) - (0.48 + 0.1 + 8.26)).abs() < 1e-5);
        assert_eq!(config.score(&MatchAnalysis::default()), 0.0);
    }
}
