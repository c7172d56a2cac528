//! Intermediate-result logging for the extraction pipeline.
//!
//! Stages hand borrowed views of their outputs to a [`DiagnosticSink`] keyed
//! by component (the stage) and channel (which output of the stage). Sinks
//! observe only; nothing they do can change the extracted template.

use crate::extract::HistogramMap;
use crate::geometry::Point;
use crate::grid::{BinaryMap, BlockMap, Matrix};
use crate::template::Minutia;
use parking_lot::Mutex;

/// Node positions and ridge paths of a skeleton at one point of filtering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonShape {
    /// Positions of live skeleton nodes.
    pub nodes: Vec<Point>,
    /// Pixel paths of live ridges, each listed once.
    pub ridges: Vec<Vec<Point>>,
}

/// Borrowed intermediate result.
#[derive(Clone, Copy, Debug)]
pub enum Diagnostic<'a> {
    Blocks(&'a BlockMap),
    Histogram(&'a HistogramMap),
    Scalars(&'a Matrix<f64>),
    Orientations(&'a Matrix<u8>),
    Mask(&'a BinaryMap),
    Skeleton(&'a SkeletonShape),
    Minutiae(&'a [Minutia]),
}

impl Diagnostic<'_> {
    /// Owned copy of the borrowed data.
    pub fn to_snapshot(&self) -> Snapshot {
        match *self {
            Diagnostic::Blocks(blocks) => Snapshot::Blocks(blocks.clone()),
            Diagnostic::Histogram(histogram) => Snapshot::Histogram(histogram.clone()),
            Diagnostic::Scalars(matrix) => Snapshot::Scalars(matrix.clone()),
            Diagnostic::Orientations(matrix) => Snapshot::Orientations(matrix.clone()),
            Diagnostic::Mask(mask) => Snapshot::Mask(mask.clone()),
            Diagnostic::Skeleton(shape) => Snapshot::Skeleton(shape.clone()),
            Diagnostic::Minutiae(minutiae) => Snapshot::Minutiae(minutiae.to_vec()),
        }
    }

    /// One-line description used by text-based sinks.
    pub fn summary(&self) -> String {
        match *self {
            Diagnostic::Blocks(blocks) => {
                let (x, y) = blocks.block_count();
                format!("{x}x{y} blocks")
            }
            Diagnostic::Histogram(histogram) => {
                format!("{}x{} histograms", histogram.width(), histogram.height())
            }
            Diagnostic::Scalars(matrix) => format!("{}x{} scalars", matrix.width(), matrix.height()),
            Diagnostic::Orientations(matrix) => {
                format!("{}x{} orientations", matrix.width(), matrix.height())
            }
            Diagnostic::Mask(mask) => format!(
                "{}x{} mask, {} set",
                mask.width(),
                mask.height(),
                mask.count_ones()
            ),
            Diagnostic::Skeleton(shape) => {
                format!("{} nodes, {} ridges", shape.nodes.len(), shape.ridges.len())
            }
            Diagnostic::Minutiae(minutiae) => format!("{} minutiae", minutiae.len()),
        }
    }
}

/// Owned counterpart of [`Diagnostic`].
#[derive(Clone, Debug, PartialEq)]
pub enum Snapshot {
    Blocks(BlockMap),
    Histogram(HistogramMap),
    Scalars(Matrix<f64>),
    Orientations(Matrix<u8>),
    Mask(BinaryMap),
    Skeleton(SkeletonShape),
    Minutiae(Vec<Minutia>),
}

/// Receiver of intermediate results.
///
/// Called from worker threads, possibly concurrently for the ridge and valley
/// skeleton branches.
pub trait DiagnosticSink: Send + Sync {
    /// When false, stages skip building diagnostics that need extra work.
    fn enabled(&self) -> bool {
        true
    }

    fn log(&self, component: &str, channel: &str, diagnostic: &Diagnostic<'_>);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn enabled(&self) -> bool {
        false
    }

    fn log(&self, _component: &str, _channel: &str, _diagnostic: &Diagnostic<'_>) {}
}

/// One recorded diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub component: String,
    pub channel: String,
    pub snapshot: Snapshot,
}

/// Keeps owned snapshots of everything logged, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Record>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// First snapshot logged under `component` and `channel`.
    pub fn find(&self, component: &str, channel: &str) -> Option<Snapshot> {
        self.records
            .lock()
            .iter()
            .find(|record| record.component == component && record.channel == channel)
            .map(|record| record.snapshot.clone())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn log(&self, component: &str, channel: &str, diagnostic: &Diagnostic<'_>) {
        let record = Record {
            component: component.to_string(),
            channel: channel.to_string(),
            snapshot: diagnostic.to_snapshot(),
        };
        self.records.lock().push(record);
    }
}

/// Emits a debug event with a summary of each diagnostic.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl DiagnosticSink for TracingSink {
    fn log(&self, component: &str, channel: &str, diagnostic: &Diagnostic<'_>) {
        tracing::debug!(
            component,
            channel,
            summary = %diagnostic.summary(),
            "diagnostic"
        );
    }
}

/// Channel name qualified by a skeleton branch prefix, e.g. `Ridges.Thinned`.
pub(crate) fn channel(prefix: &str, name: &str) -> String {
    format!("{prefix}.{name}")
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, DiagnosticSink, NoopSink, RecordingSink, Snapshot};
    use crate::grid::BinaryMap;

    #[test]
    fn recording_sink_keeps_owned_copies() {
        let sink = RecordingSink::new();
        let mut mask = BinaryMap::new(4, 4);
        mask.set(1, 2, true);
        sink.log("Segmentation", "Mask", &Diagnostic::Mask(&mask));
        mask.set(3, 3, true);

        match sink.find("Segmentation", "Mask") {
            Some(Snapshot::Mask(recorded)) => {
                assert_eq!(recorded.count_ones(), 1);
                assert!(recorded.get(1, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(sink.find("Segmentation", "Other").is_none());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn noop_sink_is_disabled() {
        assert!(!NoopSink.enabled());
        assert!(RecordingSink::new().enabled());
    }
}
