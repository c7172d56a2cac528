//! Block orientation field estimation.
//!
//! Every foreground pixel compares itself against pairs of opposite
//! neighbors. When the pixel is brighter than both, the ridge likely runs
//! along the pair's axis and the axis direction is accumulated, weighted by
//! the height of that "hill". Directions live in orientation space (doubled
//! angle) so opposite vectors reinforce instead of cancelling.

use crate::angle;
use crate::geometry::{Point, Rect};
use crate::grid::{BinaryMap, BlockMap, Matrix};
use crate::params::tunable;
use crate::scheduler::Scheduler;
use crate::util::math::interpolate_exponential;
use crate::util::FingerResult;
use std::f64::consts::PI;

#[derive(Clone, Debug, PartialEq)]
pub struct OrientationConfig {
    /// Number of neighbor lists; pixel rows cycle through them.
    pub neighbor_list_split: usize,
    /// Neighbor offsets per list.
    pub neighbors_checked: usize,
    pub min_half_distance: f64,
    pub max_half_distance: f64,
    /// Radius, in blocks, of the smoothing applied to block orientations.
    pub smoothing_radius: usize,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            neighbor_list_split: 50,
            neighbors_checked: 20,
            min_half_distance: 2.0,
            max_half_distance: 6.0,
            smoothing_radius: 1,
        }
    }
}

tunable!(OrientationConfig {
    param neighbor_list_split: 1 ..= 1000, precision 0, dpi false;
    param neighbors_checked: 1 ..= 100, precision 0, dpi false;
    param min_half_distance: 1.0 ..= 20.0, precision 1, dpi true;
    param max_half_distance: 2.0 ..= 50.0, precision 1, dpi true;
    param smoothing_radius: 0 ..= 20, precision 0, dpi false;
});

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Vector {
    x: f64,
    y: f64,
}

impl Vector {
    fn from_angle(radians: f64) -> Self {
        Self {
            x: radians.cos(),
            y: radians.sin(),
        }
    }

    fn add_scaled(&mut self, other: Vector, scale: f64) {
        self.x += other.x * scale;
        self.y += other.y * scale;
    }
}

/// Deterministic generator of the neighbor plan.
struct PlanRandom {
    state: u64,
}

impl PlanRandom {
    const PRIME: u64 = 1_610_612_741;
    const BITS: u32 = 30;
    const MASK: u64 = (1 << Self::BITS) - 1;

    fn new() -> Self {
        Self {
            state: Self::PRIME.wrapping_mul(Self::PRIME).wrapping_mul(Self::PRIME),
        }
    }

    /// Uniform value in `(0, 1)`.
    fn next(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(Self::PRIME);
        ((self.state & Self::MASK) as f64 + 0.5) / (1u64 << Self::BITS) as f64
    }
}

#[derive(Clone, Copy, Debug)]
struct ConsideredNeighbor {
    offset: Point,
    orientation: Vector,
}

fn plan(config: &OrientationConfig) -> Vec<Vec<ConsideredNeighbor>> {
    let mut random = PlanRandom::new();
    let mut splits = Vec::with_capacity(config.neighbor_list_split);
    for _ in 0..config.neighbor_list_split {
        let mut neighbors: Vec<ConsideredNeighbor> = Vec::with_capacity(config.neighbors_checked);
        // Small radii may not admit enough distinct offsets.
        let mut attempts = config.neighbors_checked * 1000;
        while neighbors.len() < config.neighbors_checked && attempts > 0 {
            attempts -= 1;
            let direction = Vector::from_angle(random.next() * PI);
            let distance = interpolate_exponential(
                config.min_half_distance,
                config.max_half_distance,
                random.next(),
            );
            let offset = Point::new(
                (direction.x * distance).round() as i32,
                (direction.y * distance).round() as i32,
            );
            if offset == Point::ZERO
                || offset.y < 0
                || neighbors.iter().any(|known| known.offset == offset)
            {
                continue;
            }
            let axis = angle::atan(offset.x as f64, offset.y as f64);
            let doubled = (2.0 * axis).rem_euclid(angle::PI2);
            neighbors.push(ConsideredNeighbor {
                offset,
                orientation: Vector::from_angle((doubled + PI).rem_euclid(angle::PI2)),
            });
        }
        splits.push(neighbors);
    }
    splits
}

/// Byte orientation of every block; zero outside the mask.
pub(crate) fn block_orientations(
    equalized: &Matrix<f64>,
    mask: &BinaryMap,
    blocks: &BlockMap,
    config: &OrientationConfig,
    scheduler: &Scheduler,
) -> FingerResult<Matrix<u8>> {
    let sums = pixelwise_sums(equalized, mask, blocks, config, scheduler)?;
    let (columns, rows) = blocks.block_count();
    let smoothed = scheduler.map_range(columns * rows, |index| {
        let block = Point::new((index % columns) as i32, (index / columns) as i32);
        let mut sum = Vector::default();
        if mask.at(block) {
            let radius = config.smoothing_radius as i32;
            for neighbor in Rect::around(block, radius).intersect(&blocks.block_rect()).points() {
                if mask.at(neighbor) {
                    sum.add_scaled(*sums.at(neighbor), 1.0);
                }
            }
        }
        if sum == Vector::default() {
            0
        } else {
            angle::to_byte(angle::atan(sum.x, sum.y))
        }
    })?;
    Ok(Matrix::from_vec(columns, rows, smoothed))
}

/// Hill-strength orientation vectors summed over each foreground block.
fn pixelwise_sums(
    image: &Matrix<f64>,
    mask: &BinaryMap,
    blocks: &BlockMap,
    config: &OrientationConfig,
    scheduler: &Scheduler,
) -> FingerResult<Matrix<Vector>> {
    let neighbors = plan(config);
    let width = image.width() as i32;
    let height = image.height() as i32;
    let (columns, rows) = blocks.block_count();
    let mut sums = Matrix::<Vector>::new(columns, rows);
    scheduler.for_each_row_mut(sums.as_mut_slice(), columns, |block_rows, band| {
        for (block_y, row) in block_rows.zip(band.chunks_mut(columns)) {
            for (block_x, sum) in row.iter_mut().enumerate() {
                let block = Point::new(block_x as i32, block_y as i32);
                if !mask.at(block) {
                    continue;
                }
                for pixel in blocks.block_area(block).points() {
                    let list = &neighbors[pixel.y as usize % neighbors.len()];
                    for neighbor in list {
                        let offset = neighbor.offset;
                        let radius = offset.x.abs().max(offset.y.abs());
                        if pixel.y < radius
                            || pixel.y + radius >= height
                            || pixel.x < radius
                            || pixel.x + radius >= width
                        {
                            continue;
                        }
                        let before = *image.at(pixel - offset);
                        let at = *image.at(pixel);
                        let after = *image.at(pixel + offset);
                        let strength = at - before.max(after);
                        if strength > 0.0 {
                            sum.add_scaled(neighbor.orientation, strength);
                        }
                    }
                }
            }
        }
    })?;
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use super::{block_orientations, plan, OrientationConfig, PlanRandom};
    use crate::angle;
    use crate::grid::{BinaryMap, BlockMap, Matrix};
    use crate::scheduler::Scheduler;

    #[test]
    fn random_is_deterministic_and_open_interval() {
        let mut a = PlanRandom::new();
        let mut b = PlanRandom::new();
        for _ in 0..1000 {
            let value = a.next();
            assert_eq!(value, b.next());
            assert!(value > 0.0 && value < 1.0);
        }
    }

    #[test]
    fn plan_offsets_are_unique_and_downward() {
        let config = OrientationConfig::default();
        let lists = plan(&config);
        assert_eq!(lists.len(), 50);
        for list in &lists {
            assert_eq!(list.len(), 20);
            for (i, neighbor) in list.iter().enumerate() {
                assert!(neighbor.offset.y >= 0);
                assert!(neighbor.offset.length_sq() > 0);
                assert!(neighbor.offset.length_sq() <= 7 * 7);
                assert!(list[..i].iter().all(|other| other.offset != neighbor.offset));
            }
        }
    }

    #[test]
    fn horizontal_stripes_give_horizontal_orientation() {
        let (width, height) = (64, 64);
        let pixels = (0..width * height)
            .map(|i| {
                let y = (i / width) as f64;
                (y * std::f64::consts::PI / 4.0).sin()
            })
            .collect();
        let image = Matrix::from_vec(width, height, pixels);
        let blocks = BlockMap::new(width, height, 16).unwrap();
        let mut mask = BinaryMap::new(4, 4);
        mask.invert();

        let orientation = block_orientations(
            &image,
            &mask,
            &blocks,
            &OrientationConfig::default(),
            &Scheduler::pool(2),
        )
        .unwrap();
        let center = orientation.value(1, 1);
        // Horizontal ridges have direction 0, which is also 0 in orientation space.
        assert!(angle::distance(center, 0) <= 12, "orientation {center}");
    }
}
