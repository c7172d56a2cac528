//! Directional smoothing along and across the ridge orientation.

use crate::angle;
use crate::geometry::Point;
use crate::grid::{BinaryMap, BlockMap, Matrix};
use crate::params::tunable;
use crate::scheduler::Scheduler;
use crate::util::FingerResult;

/// Oriented line averaging.
///
/// Each block averages its pixels along a line rotated by `angle_offset`
/// (in orientation space) from the block orientation. Line samples sit at
/// radii `radius, radius / step_factor, ...` down to half a pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct SmootherConfig {
    /// Number of precomputed line directions.
    pub resolution: usize,
    pub radius: usize,
    pub step_factor: f64,
    pub angle_offset: u8,
}

impl SmootherConfig {
    /// Smoothing along the ridges.
    pub fn ridge() -> Self {
        Self {
            resolution: 32,
            radius: 7,
            step_factor: 1.1,
            angle_offset: 0,
        }
    }

    /// Smoothing across the ridges.
    pub fn orthogonal() -> Self {
        Self {
            resolution: 11,
            radius: 7,
            step_factor: 1.11,
            angle_offset: angle::B180,
        }
    }
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self::ridge()
    }
}

tunable!(SmootherConfig {
    param resolution: 1 ..= 256, precision 0, dpi false;
    param radius: 1 ..= 50, precision 0, dpi true;
    param step_factor: 1.01 ..= 4.0, precision 2, dpi false;
    param angle_offset: 0 ..= 255, precision 0, dpi false;
});

/// Sample offsets of the line for every direction bucket.
///
/// Each line starts with the origin followed by symmetric point pairs.
pub(crate) fn oriented_lines(config: &SmootherConfig) -> Vec<Vec<Point>> {
    (0..config.resolution)
        .map(|bucket| {
            let orientation = angle::bucket_center(bucket, config.resolution);
            let direction = orientation / 2.0;
            let (dx, dy) = (direction.cos(), direction.sin());
            let mut line = vec![Point::ZERO];
            let mut r = config.radius as f64;
            while r >= 0.5 {
                let sample = Point::new((dx * r).round() as i32, (dy * r).round() as i32);
                if !line.contains(&sample) {
                    line.push(sample);
                    line.push(-sample);
                }
                r /= config.step_factor;
            }
            line
        })
        .collect()
}

/// Averages `input` along oriented lines inside foreground blocks.
///
/// Samples falling outside the image contribute nothing but still count
/// toward the average. Background pixels are zero.
pub(crate) fn smooth(
    input: &Matrix<f64>,
    orientation: &Matrix<u8>,
    mask: &BinaryMap,
    blocks: &BlockMap,
    config: &SmootherConfig,
    scheduler: &Scheduler,
) -> FingerResult<Matrix<f64>> {
    let lines = oriented_lines(config);
    let (width, height) = blocks.pixel_size();
    let bounds = blocks.pixel_rect();
    let mut output = Matrix::new(width, height);
    scheduler.for_each_row_mut(output.as_mut_slice(), width, |rows, band| {
        for (y, row) in rows.zip(band.chunks_mut(width)) {
            let block_y = blocks.block_at(Point::new(0, y as i32)).y;
            for block_x in 0..blocks.block_count().0 as i32 {
                let block = Point::new(block_x, block_y);
                if !mask.at(block) {
                    continue;
                }
                let rotated = angle::add(*orientation.at(block), config.angle_offset);
                let line = &lines[angle::quantize_byte(rotated, lines.len())];
                let area = blocks.block_area(block);
                for x in area.left()..area.right() {
                    let pixel = Point::new(x, y as i32);
                    let sum: f64 = line
                        .iter()
                        .map(|&offset| pixel + offset)
                        .filter(|&source| bounds.contains(source))
                        .map(|source| *input.at(source))
                        .sum();
                    row[x as usize] = sum / line.len() as f64;
                }
            }
        }
    })?;
    Ok(output)
}
