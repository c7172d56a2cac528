//! Starting pairs for pairing growth.

use super::pairing::MinutiaPair;
use crate::template::Template;

/// Source of root pairs for one probe/candidate combination.
///
/// The returned sequence is finite and consumed once; the matcher stops
/// pulling from it after its root budget is spent.
pub trait RootSelector: Send + Sync {
    fn roots<'a>(
        &'a self,
        probe: &'a Template,
        candidate: &'a Template,
    ) -> Box<dyn Iterator<Item = MinutiaPair> + 'a>;
}

/// Every probe minutia against every candidate minutia, candidate-major.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExhaustiveRootSelector;

impl RootSelector for ExhaustiveRootSelector {
    fn roots<'a>(
        &'a self,
        probe: &'a Template,
        candidate: &'a Template,
    ) -> Box<dyn Iterator<Item = MinutiaPair> + 'a> {
        let probe_len = probe.len();
        Box::new(
            (0..candidate.len())
                .flat_map(move |c| (0..probe_len).map(move |p| MinutiaPair::new(p, c))),
        )
    }
}
