//! Minutia graph matching.
//!
//! A match grows a pairing from every root pair the root selector offers.
//! Growth follows the edges of the pair added last: edges of similar shape on
//! both sides propose new pairs, which wait in a queue ordered by edge length.
//! Each grown pairing is scored and the best score over all roots is the
//! similarity of the two templates.

mod edge;
mod lookup;
mod pairing;
mod roots;
mod scoring;
mod selector;

pub use edge::{EdgeShape, EdgeTable, EdgeTableConfig, NeighborEdge};
pub use lookup::{EdgeLookupConfig, EdgePair};
pub use pairing::{MinutiaPair, Pairing};
pub use roots::{ExhaustiveRootSelector, RootSelector};
pub use scoring::{MatchAnalysis, ScoringConfig};
pub use selector::PairSelector;

use crate::params::{tunable, Tunable};
use crate::template::Template;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::FingerResult;

#[derive(Clone, Debug, PartialEq)]
pub struct MatcherConfig {
    /// Roots tried per match before giving up on the rest.
    pub max_tried_roots: usize,
    pub edge_table: EdgeTableConfig,
    pub edge_lookup: EdgeLookupConfig,
    pub scoring: ScoringConfig,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_tried_roots: 10_000,
            edge_table: EdgeTableConfig::default(),
            edge_lookup: EdgeLookupConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

tunable!(MatcherConfig {
    param max_tried_roots: 1 ..= 10_000, precision 0, dpi false;
    nested edge_table;
    nested edge_lookup;
    nested scoring;
});

/// Probe template with its edge table, built once and matched many times.
#[derive(Clone, Debug)]
pub struct ProbeIndex {
    template: Template,
    edges: EdgeTable,
}

impl ProbeIndex {
    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn edges(&self) -> &EdgeTable {
        &self.edges
    }
}

/// Scores candidate templates against probe indexes.
///
/// A matcher keeps its working buffers between calls and is therefore
/// `&mut` for matching; use one matcher per thread.
pub struct Matcher {
    config: MatcherConfig,
    roots: Box<dyn RootSelector>,
    candidate_edges: EdgeTable,
    pairing: Pairing,
    selector: PairSelector,
    edge_pairs: Vec<EdgePair>,
    best_pairing: Pairing,
    best_analysis: Option<MatchAnalysis>,
}

impl Matcher {
    /// Validates `config` and uses the exhaustive root selector.
    pub fn new(config: MatcherConfig) -> FingerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            roots: Box::new(ExhaustiveRootSelector),
            candidate_edges: EdgeTable::default(),
            pairing: Pairing::default(),
            selector: PairSelector::new(),
            edge_pairs: Vec::new(),
            best_pairing: Pairing::default(),
            best_analysis: None,
        })
    }

    pub fn with_root_selector(mut self, roots: Box<dyn RootSelector>) -> Self {
        self.roots = roots;
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Builds the reusable probe side of a match.
    pub fn create_index(&self, probe: &Template) -> ProbeIndex {
        ProbeIndex {
            template: probe.clone(),
            edges: EdgeTable::new(probe, &self.config.edge_table),
        }
    }

    /// Similarity of `candidate` to the indexed probe; 0 when either is empty.
    pub fn match_candidate(&mut self, probe: &ProbeIndex, candidate: &Template) -> f32 {
        let _span = trace_span!(
            "match",
            probe = probe.template.len(),
            candidate = candidate.len()
        )
        .entered();
        self.candidate_edges.reset(candidate, &self.config.edge_table);
        self.pairing.select(probe.template.len(), candidate.len());
        self.selector.clear();
        self.best_pairing.select(probe.template.len(), candidate.len());
        self.best_analysis = None;

        let mut best_score = 0.0f32;
        let mut best_root = None;
        let roots = self
            .roots
            .roots(&probe.template, candidate)
            .take(self.config.max_tried_roots);
        for (index, root) in roots.enumerate() {
            let analysis = try_root(
                &self.config,
                probe,
                candidate,
                &self.candidate_edges,
                &mut self.pairing,
                &mut self.selector,
                &mut self.edge_pairs,
                root,
            );
            let score = self.config.scoring.score(&analysis);
            trace_debug!("root", index = index, pairs = analysis.pair_count, score = score);
            if score > best_score {
                best_score = score;
                best_root = Some(index);
                self.best_analysis = Some(analysis);
                self.best_pairing.clone_from(&self.pairing);
            }
        }
        trace_event!(
            "matched",
            best_root = best_root.map_or(-1, |index| index as i64),
            score = best_score
        );
        best_score
    }

    /// Indexes `probe` and matches `candidate` against it.
    pub fn match_templates(&mut self, probe: &Template, candidate: &Template) -> f32 {
        let index = self.create_index(probe);
        self.match_candidate(&index, candidate)
    }

    /// Pairing grown from the best root of the last match.
    pub fn best_pairing(&self) -> &Pairing {
        &self.best_pairing
    }

    /// Statistics of the best root of the last match, if any root scored.
    pub fn best_analysis(&self) -> Option<&MatchAnalysis> {
        self.best_analysis.as_ref()
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::too_many_arguments)]
fn try_root(
    config: &MatcherConfig,
    probe: &ProbeIndex,
    candidate: &Template,
    candidate_edges: &EdgeTable,
    pairing: &mut Pairing,
    selector: &mut PairSelector,
    edge_pairs: &mut Vec<EdgePair>,
    root: MinutiaPair,
) -> MatchAnalysis {
    pairing.reset();
    selector.clear();
    pairing.add(root);
    while let Some(last) = pairing.last_added() {
        collect_edges(config, probe, candidate_edges, pairing, selector, edge_pairs, last);
        selector.skip_paired(pairing);
        match selector.dequeue() {
            Some(pair) => pairing.add(pair),
            None => break,
        }
    }
    config.scoring.analyze(pairing, &probe.template, candidate)
}

/// Queues the unpaired neighbors reachable over edges matching on both sides
/// of `last` and supports neighbors that are already paired consistently.
fn collect_edges(
    config: &MatcherConfig,
    probe: &ProbeIndex,
    candidate_edges: &EdgeTable,
    pairing: &mut Pairing,
    selector: &mut PairSelector,
    edge_pairs: &mut Vec<EdgePair>,
    last: MinutiaPair,
) {
    let probe_star = probe.edges.edges(last.probe);
    let candidate_star = candidate_edges.edges(last.candidate);
    edge_pairs.clear();
    config
        .edge_lookup
        .find_matching_pairs(probe_star, candidate_star, edge_pairs);
    for edge_pair in edge_pairs.iter() {
        let probe_edge = &probe_star[edge_pair.probe];
        let candidate_edge = &candidate_star[edge_pair.candidate];
        let neighbor = MinutiaPair::new(probe_edge.neighbor, candidate_edge.neighbor);
        if !pairing.is_probe_paired(neighbor.probe) && !pairing.is_candidate_paired(neighbor.candidate) {
            selector.enqueue(last, neighbor, candidate_edge.shape.length);
        } else if pairing.candidate_by_probe(neighbor.probe) == Some(neighbor.candidate) {
            pairing.add_support_by_probe(neighbor.probe);
        }
    }
}
