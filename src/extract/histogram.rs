//! Local intensity histograms per block and per block corner.

use crate::geometry::{Point, Rect};
use crate::grid::{BlockMap, Matrix};
use crate::scheduler::Scheduler;
use crate::util::FingerResult;

/// Number of intensity bins.
pub const HISTOGRAM_DEPTH: usize = 256;

/// Grid of 256-bin histograms, one per block or corner.
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramMap {
    width: usize,
    height: usize,
    bins: Vec<u32>,
}

impl HistogramMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bins: vec![0; width * height * HISTOGRAM_DEPTH],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bins of the histogram at grid position `at`.
    pub fn bins(&self, at: Point) -> &[u32] {
        let start = (at.y as usize * self.width + at.x as usize) * HISTOGRAM_DEPTH;
        &self.bins[start..start + HISTOGRAM_DEPTH]
    }

    /// Number of samples in the histogram at `at`.
    pub fn sum(&self, at: Point) -> u32 {
        self.bins(at).iter().sum()
    }
}

/// Per-block histograms of `image`.
pub(crate) fn block_histograms(
    blocks: &BlockMap,
    image: &Matrix<u8>,
    scheduler: &Scheduler,
) -> FingerResult<HistogramMap> {
    let (columns, rows) = blocks.block_count();
    let mut histogram = HistogramMap::new(columns, rows);
    let row_len = columns * HISTOGRAM_DEPTH;
    scheduler.for_each_row_mut(&mut histogram.bins, row_len, |block_rows, band| {
        for (band_row, y) in block_rows.enumerate() {
            for x in 0..columns {
                let block = Point::new(x as i32, y as i32);
                let offset = band_row * row_len + x * HISTOGRAM_DEPTH;
                let bins = &mut band[offset..offset + HISTOGRAM_DEPTH];
                for pixel in blocks.block_area(block).points() {
                    bins[*image.at(pixel) as usize] += 1;
                }
            }
        }
    })?;
    Ok(histogram)
}

/// Corner histograms summing the up to four blocks that touch each corner.
pub(crate) fn corner_histograms(
    blocks: &BlockMap,
    histogram: &HistogramMap,
    scheduler: &Scheduler,
) -> FingerResult<HistogramMap> {
    const AROUND: [Point; 4] = [
        Point::new(0, 0),
        Point::new(-1, 0),
        Point::new(0, -1),
        Point::new(-1, -1),
    ];
    let (columns, rows) = blocks.corner_count();
    accumulate(columns, rows, scheduler, |corner, bins| {
        for relative in AROUND {
            let block = corner + relative;
            if blocks.contains_block(block) {
                add_bins(bins, histogram.bins(block));
            }
        }
    })
}

/// Sums every corner histogram with its eight grid neighbors.
pub(crate) fn smooth_corners(
    corners: &HistogramMap,
    scheduler: &Scheduler,
) -> FingerResult<HistogramMap> {
    let bounds = Rect::sized(corners.width as i32, corners.height as i32);
    accumulate(corners.width, corners.height, scheduler, |corner, bins| {
        for neighbor in Rect::around(corner, 1).intersect(&bounds).points() {
            add_bins(bins, corners.bins(neighbor));
        }
    })
}

fn accumulate<F>(
    width: usize,
    height: usize,
    scheduler: &Scheduler,
    fill: F,
) -> FingerResult<HistogramMap>
where
    F: Fn(Point, &mut [u32]) + Sync,
{
    let mut output = HistogramMap::new(width, height);
    let row_len = width * HISTOGRAM_DEPTH;
    scheduler.for_each_row_mut(&mut output.bins, row_len, |rows, band| {
        for (band_row, y) in rows.enumerate() {
            for x in 0..width {
                let offset = band_row * row_len + x * HISTOGRAM_DEPTH;
                fill(
                    Point::new(x as i32, y as i32),
                    &mut band[offset..offset + HISTOGRAM_DEPTH],
                );
            }
        }
    })?;
    Ok(output)
}

fn add_bins(target: &mut [u32], source: &[u32]) {
    for (sum, &count) in target.iter_mut().zip(source) {
        *sum += count;
    }
}
