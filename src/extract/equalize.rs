//! Local histogram equalization over the foreground blocks.

use super::histogram::{HistogramMap, HISTOGRAM_DEPTH};
use crate::geometry::Point;
use crate::grid::{BinaryMap, BlockMap, Matrix};
use crate::params::tunable;
use crate::scheduler::Scheduler;
use crate::util::math::interpolate_2d;
use crate::util::FingerResult;

const RANGE_MIN: f64 = -1.0;
const RANGE_MAX: f64 = 1.0;
const RANGE_SIZE: f64 = RANGE_MAX - RANGE_MIN;

/// Value given to background pixels.
pub(crate) const BACKGROUND: f64 = RANGE_MIN;

/// Bounds on how much equalization may stretch or squash one intensity step.
#[derive(Clone, Debug, PartialEq)]
pub struct EqualizerConfig {
    pub max_scaling: f64,
    pub min_scaling: f64,
}

impl Default for EqualizerConfig {
    fn default() -> Self {
        Self {
            max_scaling: 3.99,
            min_scaling: 0.25,
        }
    }
}

tunable!(EqualizerConfig {
    param max_scaling: 1.0 ..= 10.0, precision 2, dpi false;
    param min_scaling: 0.0 ..= 1.0, precision 2, dpi false;
});

/// Equalizes `image` into `[-1, 1]` inside the block mask.
///
/// Each corner gets its own mapping from its smoothed histogram; pixels
/// interpolate bilinearly between the four corner mappings of their block.
pub(crate) fn equalize(
    blocks: &BlockMap,
    image: &Matrix<u8>,
    corners: &HistogramMap,
    mask: &BinaryMap,
    config: &EqualizerConfig,
    scheduler: &Scheduler,
) -> FingerResult<Matrix<f64>> {
    let width_max = RANGE_SIZE / HISTOGRAM_DEPTH as f64 * config.max_scaling;
    let width_min = RANGE_SIZE / HISTOGRAM_DEPTH as f64 * config.min_scaling;
    let mut limited_min = [0.0; HISTOGRAM_DEPTH];
    let mut limited_max = [0.0; HISTOGRAM_DEPTH];
    for i in 0..HISTOGRAM_DEPTH {
        let above = (HISTOGRAM_DEPTH - 1 - i) as f64;
        limited_min[i] = (i as f64 * width_min + RANGE_MIN).max(RANGE_MAX - above * width_max);
        limited_max[i] = (i as f64 * width_max + RANGE_MIN).min(RANGE_MAX - above * width_min);
    }

    let (corner_columns, _) = blocks.corner_count();
    let mappings = scheduler.map_range(corners.width() * corners.height(), |index| {
        let corner = Point::new((index % corner_columns) as i32, (index / corner_columns) as i32);
        let touches_foreground = [(0, 0), (-1, 0), (0, -1), (-1, -1)]
            .iter()
            .any(|&(dx, dy)| mask.get_or(corner + Point::new(dx, dy), false));
        if !touches_foreground {
            return Vec::new();
        }
        let bins = corners.bins(corner);
        let total: u32 = bins.iter().sum();
        let mut mapping = vec![0.0; HISTOGRAM_DEPTH];
        if total == 0 {
            return mapping;
        }
        let step = RANGE_SIZE / total as f64;
        let mut top = RANGE_MIN;
        for i in 0..HISTOGRAM_DEPTH {
            let band = bins[i] as f64 * step;
            let dequantized = i as f64 / (HISTOGRAM_DEPTH - 1) as f64;
            let equalized = top + dequantized * band;
            top += band;
            mapping[i] = equalized.clamp(limited_min[i], limited_max[i]);
        }
        mapping
    })?;

    let (width, height) = blocks.pixel_size();
    let mut output = Matrix::from_vec(width, height, vec![BACKGROUND; width * height]);
    scheduler.for_each_row_mut(output.as_mut_slice(), width, |rows, band| {
        for (y, row) in rows.zip(band.chunks_mut(width)) {
            let block_y = blocks.block_at(Point::new(0, y as i32)).y;
            for block_x in 0..blocks.block_count().0 as i32 {
                let block = Point::new(block_x, block_y);
                if !mask.at(block) {
                    continue;
                }
                let area = blocks.block_area(block);
                let mapping = |dx: i32, dy: i32| {
                    &mappings[blocks.corner_index(Point::new(block.x + dx, block.y + dy))]
                };
                let (top_left, top_right) = (mapping(0, 0), mapping(1, 0));
                let (bottom_left, bottom_right) = (mapping(0, 1), mapping(1, 1));
                let ry = ((y as i32 - area.y) as f64 + 0.5) / area.height as f64;
                for x in area.left()..area.right() {
                    let bin = *image.get(x as usize, y) as usize;
                    let rx = ((x - area.x) as f64 + 0.5) / area.width as f64;
                    row[x as usize] = interpolate_2d(
                        top_left[bin],
                        top_right[bin],
                        bottom_left[bin],
                        bottom_right[bin],
                        rx,
                        ry,
                    );
                }
            }
        }
    })?;
    Ok(output)
}
