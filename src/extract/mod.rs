//! Minutiae extraction from grayscale fingerprint images.
//!
//! The pipeline runs segmentation, equalization, orientation estimation and
//! directional smoothing on the whole image, binarizes it, then thins and
//! traces the ridge map and the valley map on two parallel branches. Ridge
//! endings come from the ridge skeleton, bifurcations from the valley one.

mod binarize;
mod equalize;
mod histogram;
mod mask;
mod minutiae;
mod orientation;
pub(crate) mod skeleton;
mod smooth;
mod thin;
mod vote;

pub use equalize::EqualizerConfig;
pub use histogram::{HistogramMap, HISTOGRAM_DEPTH};
pub use mask::SegmentationConfig;
pub use orientation::OrientationConfig;
pub use skeleton::{SkeletonConfig, SkeletonKind};
pub use smooth::SmootherConfig;
pub use vote::VoteConfig;

use crate::diagnostics::{self, Diagnostic, DiagnosticSink, NoopSink};
use crate::grid::{BinaryMap, BlockMap, Matrix};
use crate::image::ImageView;
use crate::params::{dpi_ratio, tunable, Tunable};
use crate::scheduler::Scheduler;
use crate::template::{Minutia, Template};
use crate::trace::{trace_event, trace_span};
use crate::util::FingerResult;
use skeleton::Skeleton;
use std::sync::Arc;

/// Extraction parameters calibrated for 500 dpi images.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractorConfig {
    /// Edge length of the square blocks the image is tiled into.
    pub block_size: usize,
    /// Minutiae closer than this to the mask edge are dropped.
    pub inner_mask_border: usize,
    pub segmentation: SegmentationConfig,
    pub equalizer: EqualizerConfig,
    pub orientation: OrientationConfig,
    pub ridge_smoother: SmootherConfig,
    pub orthogonal_smoother: SmootherConfig,
    pub binary_smoother: VoteConfig,
    pub skeleton: SkeletonConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            block_size: 16,
            inner_mask_border: 14,
            segmentation: SegmentationConfig::default(),
            equalizer: EqualizerConfig::default(),
            orientation: OrientationConfig::default(),
            ridge_smoother: SmootherConfig::ridge(),
            orthogonal_smoother: SmootherConfig::orthogonal(),
            binary_smoother: VoteConfig::default(),
            skeleton: SkeletonConfig::default(),
        }
    }
}

tunable!(ExtractorConfig {
    param block_size: 4 ..= 64, precision 0, dpi true;
    param inner_mask_border: 0 ..= 100, precision 0, dpi true;
    nested segmentation;
    nested equalizer;
    nested orientation;
    nested ridge_smoother;
    nested orthogonal_smoother;
    nested binary_smoother;
    nested skeleton;
});

/// Turns fingerprint images into minutia templates.
///
/// The extractor holds no per-image state; one instance can serve any number
/// of images, from several threads at once.
#[derive(Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    scheduler: Scheduler,
    sink: Arc<dyn DiagnosticSink>,
}

impl Extractor {
    /// Validates `config` and runs on the process-wide [`Scheduler::shared`] pool.
    pub fn new(config: ExtractorConfig) -> FingerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scheduler: Scheduler::shared(),
            sink: Arc::new(NoopSink),
        })
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Routes intermediate results to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Extracts the minutiae of `image`, scanned at `dpi`.
    ///
    /// Ridges are expected dark on a light background. Images without
    /// fingerprint content give an empty template.
    pub fn extract(&self, image: ImageView<'_, u8>, dpi: u32) -> FingerResult<Template> {
        let ratio = dpi_ratio(dpi)?;
        let mut config = self.config.clone();
        config.adjust_for_dpi(ratio);
        let scheduler = &self.scheduler;
        let sink = self.sink.as_ref();
        let _span = trace_span!(
            "extract",
            width = image.width(),
            height = image.height(),
            dpi = dpi
        )
        .entered();

        let inverted = invert(image);
        let blocks = BlockMap::new(inverted.width(), inverted.height(), config.block_size)?;
        sink.log("Extractor", "Blocks", &Diagnostic::Blocks(&blocks));
        let (columns, rows) = blocks.block_count();
        trace_event!("blocks", columns = columns, rows = rows);

        let (block_mask, corners) = {
            let _span = trace_span!("segmentation").entered();
            let histogram = histogram::block_histograms(&blocks, &inverted, scheduler)?;
            sink.log("Histogram", "Blocks", &Diagnostic::Histogram(&histogram));
            let corners = histogram::corner_histograms(&blocks, &histogram, scheduler)?;
            let corners = histogram::smooth_corners(&corners, scheduler)?;
            sink.log("Histogram", "Smoothed", &Diagnostic::Histogram(&corners));
            let contrast = mask::clipped_contrast(&blocks, &histogram, &config.segmentation);
            sink.log("Segmentation", "Contrast", &Diagnostic::Scalars(&contrast));
            let block_mask =
                mask::segmentation_mask(&blocks, &contrast, &config.segmentation, scheduler)?;
            sink.log("Segmentation", "Mask", &Diagnostic::Mask(&block_mask));
            trace_event!(
                "segmentation",
                foreground = block_mask.count_ones(),
                blocks = columns * rows
            );
            (block_mask, corners)
        };

        let (binary, pixel_mask) = {
            let _span = trace_span!("binarization").entered();
            let equalized = equalize::equalize(
                &blocks,
                &inverted,
                &corners,
                &block_mask,
                &config.equalizer,
                scheduler,
            )?;
            sink.log("Equalizer", "Output", &Diagnostic::Scalars(&equalized));
            let orientation = orientation::block_orientations(
                &equalized,
                &block_mask,
                &blocks,
                &config.orientation,
                scheduler,
            )?;
            sink.log("Orientation", "Blocks", &Diagnostic::Orientations(&orientation));
            let smoothed = smooth::smooth(
                &equalized,
                &orientation,
                &block_mask,
                &blocks,
                &config.ridge_smoother,
                scheduler,
            )?;
            sink.log("RidgeSmoother", "Output", &Diagnostic::Scalars(&smoothed));
            let orthogonal = smooth::smooth(
                &smoothed,
                &orientation,
                &block_mask,
                &blocks,
                &config.orthogonal_smoother,
                scheduler,
            )?;
            sink.log("OrthogonalSmoother", "Output", &Diagnostic::Scalars(&orthogonal));
            let pixel_mask = block_mask.fill_blocks(&blocks);
            let mut binary = binarize::binarize(&smoothed, &orthogonal, &pixel_mask, scheduler)?;
            sink.log("Binarizer", "Output", &Diagnostic::Mask(&binary));
            binarize::smooth_binary(&mut binary, &pixel_mask, &config.binary_smoother, scheduler)?;
            sink.log("BinarySmoother", "Output", &Diagnostic::Mask(&binary));
            binarize::remove_crosses(&mut binary);
            sink.log("CrossRemover", "Output", &Diagnostic::Mask(&binary));
            (binary, pixel_mask)
        };

        let inner = binarize::inner_mask(&pixel_mask, config.inner_mask_border);
        sink.log("InnerMask", "Output", &Diagnostic::Mask(&inner));
        let mut valleys = binary.inverted();
        valleys.and(&pixel_mask);

        let branch = |map: &BinaryMap, kind: SkeletonKind| {
            skeleton_minutiae(map, kind, &inner, &config.skeleton, sink)
        };
        let (mut minutiae, bifurcations) = scheduler.join(
            || branch(&binary, SkeletonKind::Ridges),
            || branch(&valleys, SkeletonKind::Valleys),
        )?;
        minutiae.extend(bifurcations);

        sink.log("Extractor", "Minutiae", &Diagnostic::Minutiae(&minutiae));
        trace_event!("extracted", minutiae = minutiae.len());
        Ok(Template::new(minutiae))
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

/// Copies the image with intensities flipped so ridges are bright.
fn invert(image: ImageView<'_, u8>) -> Matrix<u8> {
    let (width, height) = (image.width(), image.height());
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        if let Some(row) = image.row(y) {
            pixels.extend(row.iter().map(|&value| 255 - value));
        }
    }
    Matrix::from_vec(width, height, pixels)
}

/// Thins, traces and cleans one binary map, then collects its minutiae.
fn skeleton_minutiae(
    binary: &BinaryMap,
    kind: SkeletonKind,
    inner_mask: &BinaryMap,
    config: &SkeletonConfig,
    sink: &dyn DiagnosticSink,
) -> Vec<Minutia> {
    let prefix = kind.name();
    let _span = trace_span!("skeleton", kind = prefix).entered();
    let thinned = thin::thin(binary, config.thinning_iterations);
    sink.log("Thinner", &diagnostics::channel(prefix, "Output"), &Diagnostic::Mask(&thinned));

    let mut skeleton = skeleton::trace(&thinned, kind);
    log_shape(sink, &skeleton, "Traced");
    skeleton::remove_dots(&mut skeleton);
    skeleton::remove_pores(&mut skeleton, config);
    log_shape(sink, &skeleton, "Pores");
    skeleton::remove_tails(&mut skeleton, config);
    log_shape(sink, &skeleton, "Tails");
    skeleton::remove_fragments(&mut skeleton, config);
    log_shape(sink, &skeleton, "Fragments");
    skeleton::mask_minutiae(&mut skeleton, inner_mask);
    skeleton::remove_branch_minutiae(&mut skeleton, config);

    let minutiae = minutiae::collect(&skeleton, config);
    trace_event!("skeleton", nodes = skeleton.live_nodes().len(), minutiae = minutiae.len());
    minutiae
}

fn log_shape(sink: &dyn DiagnosticSink, skeleton: &Skeleton, stage: &str) {
    if sink.enabled() {
        let shape = skeleton.shape();
        let channel = diagnostics::channel(skeleton.kind.name(), stage);
        sink.log("Skeleton", &channel, &Diagnostic::Skeleton(&shape));
    }
}
