//! Fingermatch extracts fingerprint minutiae and scores minutia templates.
//!
//! [`Extractor`] turns a grayscale image into a [`Template`] of ridge endings
//! and bifurcations. [`Matcher`] compares two templates by growing a minutia
//! graph alignment and returns a similarity score. Block-wise extraction work
//! runs on an explicit [`Scheduler`]; the optional `rayon` feature adds a
//! rayon-backed scheduler.

pub mod angle;
pub mod diagnostics;
pub mod extract;
pub mod geometry;
pub mod grid;
pub mod image;
pub mod lowlevel;
pub mod matching;
pub mod params;
pub mod scheduler;
pub mod template;
mod trace;
pub mod util;

pub use diagnostics::{DiagnosticSink, NoopSink, RecordingSink};
pub use extract::{Extractor, ExtractorConfig};
pub use geometry::Point;
pub use image::{ImageView, OwnedImage};
pub use matching::{Matcher, MatcherConfig, ProbeIndex, RootSelector};
pub use params::Tunable;
pub use scheduler::Scheduler;
pub use template::{Minutia, MinutiaKind, Template};
pub use util::{FingerError, FingerResult};

/// Scores `candidate` against `probe` with the default matcher configuration.
///
/// Builds a fresh [`Matcher`] and probe index per call; keep a matcher and a
/// [`ProbeIndex`] around when scoring many candidates.
pub fn match_score(probe: &Template, candidate: &Template) -> FingerResult<f32> {
    let mut matcher = Matcher::new(MatcherConfig::default())?;
    Ok(matcher.match_templates(probe, candidate))
}
