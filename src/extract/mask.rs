//! Block-level segmentation of the fingerprint area from the background.

use super::histogram::{HistogramMap, HISTOGRAM_DEPTH};
use super::vote::{vote, VoteConfig};
use crate::grid::{BinaryMap, BlockMap, Matrix};
use crate::params::tunable;
use crate::scheduler::Scheduler;
use crate::util::FingerResult;

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationConfig {
    /// Fraction of a block's pixels clipped from each end of its histogram.
    pub clipped_contrast: f64,
    /// Blocks below this contrast are background regardless of the rest.
    pub min_absolute_contrast: f64,
    /// Fraction of the average top contrast a block must reach.
    pub min_relative_contrast: f64,
    /// Pixel budget for the blocks sampled for the relative limit.
    pub relative_contrast_sample: usize,
    /// Share of sampled blocks averaged into the relative limit.
    pub relative_contrast_percentile: f64,
    pub contrast_vote: VoteConfig,
    pub block_errors_vote: VoteConfig,
    pub mask_vote: VoteConfig,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            clipped_contrast: 0.08,
            min_absolute_contrast: 17.0 / 255.0,
            min_relative_contrast: 0.34,
            relative_contrast_sample: 168_568,
            relative_contrast_percentile: 0.49,
            contrast_vote: VoteConfig::new(9, 0.86, 7),
            block_errors_vote: VoteConfig::new(1, 0.7, 4),
            mask_vote: VoteConfig::new(7, 0.51, 4),
        }
    }
}

tunable!(SegmentationConfig {
    param clipped_contrast: 0.0 ..= 0.4, precision 3, dpi false;
    param min_absolute_contrast: 0.0 ..= 0.5, precision 3, dpi false;
    param min_relative_contrast: 0.0 ..= 1.0, precision 2, dpi false;
    param relative_contrast_sample: 1 ..= 10_000_000, precision 0, dpi false;
    param relative_contrast_percentile: 0.0 ..= 1.0, precision 2, dpi false;
    nested contrast_vote;
    nested block_errors_vote;
    nested mask_vote;
});

/// Contrast of every block after clipping outliers at both histogram ends.
pub(crate) fn clipped_contrast(
    blocks: &BlockMap,
    histogram: &HistogramMap,
    config: &SegmentationConfig,
) -> Matrix<f64> {
    let (columns, rows) = blocks.block_count();
    let mut contrast = Matrix::new(columns, rows);
    for block in blocks.blocks() {
        let bins = histogram.bins(block);
        let volume: u32 = bins.iter().sum();
        let clip_limit = (volume as f64 * config.clipped_contrast).round() as u32;

        let mut accumulator = 0;
        let mut lower = HISTOGRAM_DEPTH - 1;
        for (i, &count) in bins.iter().enumerate() {
            accumulator += count;
            if accumulator > clip_limit {
                lower = i;
                break;
            }
        }
        accumulator = 0;
        let mut upper = 0;
        for (i, &count) in bins.iter().enumerate().rev() {
            accumulator += count;
            if accumulator > clip_limit {
                upper = i;
                break;
            }
        }
        let spread = upper as f64 - lower as f64;
        *contrast.at_mut(block) = spread / (HISTOGRAM_DEPTH - 1) as f64;
    }
    contrast
}

/// Blocks whose contrast is below the absolute floor.
pub(crate) fn absolute_contrast_mask(contrast: &Matrix<f64>, config: &SegmentationConfig) -> BinaryMap {
    threshold(contrast, config.min_absolute_contrast)
}

/// Blocks whose contrast is far below that of the best blocks.
pub(crate) fn relative_contrast_mask(
    contrast: &Matrix<f64>,
    blocks: &BlockMap,
    config: &SegmentationConfig,
) -> BinaryMap {
    let mut sorted = contrast.as_slice().to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let (width, height) = blocks.pixel_size();
    let pixels_per_block = (width * height / sorted.len()).max(1);
    let sample = sorted.len().min(config.relative_contrast_sample / pixels_per_block);
    let considered = ((sample as f64 * config.relative_contrast_percentile).round() as usize)
        .max(1)
        .min(sorted.len());
    let average = sorted[..considered].iter().sum::<f64>() / considered as f64;
    threshold(contrast, average * config.min_relative_contrast)
}

fn threshold(contrast: &Matrix<f64>, limit: f64) -> BinaryMap {
    let mut mask = BinaryMap::new(contrast.width(), contrast.height());
    for y in 0..contrast.height() {
        for x in 0..contrast.width() {
            if contrast.value(x, y) < limit {
                mask.set(x, y, true);
            }
        }
    }
    mask
}

/// Foreground block mask: `true` where the block contains fingerprint.
pub(crate) fn segmentation_mask(
    blocks: &BlockMap,
    contrast: &Matrix<f64>,
    config: &SegmentationConfig,
    scheduler: &Scheduler,
) -> FingerResult<BinaryMap> {
    let mut mask = absolute_contrast_mask(contrast, config);
    mask.or(&relative_contrast_mask(contrast, blocks, config));
    let contrast_vote = vote(&mask, None, &config.contrast_vote, scheduler)?;
    mask.or(&contrast_vote);
    let errors = vote(&mask, None, &config.block_errors_vote, scheduler)?;
    mask.or(&errors);
    mask.invert();
    for _ in 0..2 {
        let errors = vote(&mask, None, &config.block_errors_vote, scheduler)?;
        mask.or(&errors);
    }
    let final_vote = vote(&mask, None, &config.mask_vote, scheduler)?;
    mask.or(&final_vote);
    Ok(mask)
}
