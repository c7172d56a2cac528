//! Majority vote filter over binary maps.

use crate::grid::binary::set_row_bit;
use crate::grid::BinaryMap;
use crate::params::tunable;
use crate::scheduler::Scheduler;
use crate::util::FingerResult;

/// Square-window majority vote.
///
/// A cell is set when at least `ceil(majority * voters)` cells of the
/// `(2 * radius + 1)²` window around it are set, where `voters` counts only
/// window cells inside the map. Cells closer than `border_distance` to the
/// edge are never set.
#[derive(Clone, Debug, PartialEq)]
pub struct VoteConfig {
    pub radius: usize,
    pub majority: f64,
    pub border_distance: usize,
}

impl VoteConfig {
    pub const fn new(radius: usize, majority: f64, border_distance: usize) -> Self {
        Self {
            radius,
            majority,
            border_distance,
        }
    }
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self::new(2, 0.8, 17)
    }
}

tunable!(VoteConfig {
    param radius: 1 ..= 50, precision 0, dpi false;
    param majority: 0.5 ..= 1.0, precision 2, dpi false;
    param border_distance: 0 ..= 100, precision 0, dpi false;
});

/// Votes over `input`, evaluating only cells set in `mask` when given.
pub(crate) fn vote(
    input: &BinaryMap,
    mask: Option<&BinaryMap>,
    config: &VoteConfig,
    scheduler: &Scheduler,
) -> FingerResult<BinaryMap> {
    let width = input.width();
    let height = input.height();
    let table = SummedArea::new(input);
    let radius = config.radius;
    let border = config.border_distance;

    let mut output = BinaryMap::new(width, height);
    if width <= 2 * border || height <= 2 * border {
        return Ok(output);
    }
    let words_per_row = output.words_per_row();
    scheduler.for_each_row_mut(output.words_mut(), words_per_row, |rows, band| {
        for (y, row) in rows.zip(band.chunks_mut(words_per_row)) {
            if y < border || y >= height - border {
                continue;
            }
            let top = y.saturating_sub(radius);
            let bottom = (y + radius + 1).min(height);
            for x in border..width - border {
                if mask.is_some_and(|mask| !mask.get(x, y)) {
                    continue;
                }
                let left = x.saturating_sub(radius);
                let right = (x + radius + 1).min(width);
                let voters = (bottom - top) * (right - left);
                let ones = table.count(left, top, right, bottom);
                if ones as f64 >= (config.majority * voters as f64).ceil() {
                    set_row_bit(row, x);
                }
            }
        }
    })?;
    Ok(output)
}

/// Summed-area table of set bits.
struct SummedArea {
    stride: usize,
    sums: Vec<u32>,
}

impl SummedArea {
    fn new(input: &BinaryMap) -> Self {
        let stride = input.width() + 1;
        let mut sums = vec![0u32; stride * (input.height() + 1)];
        for y in 0..input.height() {
            let mut row_sum = 0;
            for x in 0..input.width() {
                row_sum += input.get(x, y) as u32;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { stride, sums }
    }

    /// Set bits in `[left, right) × [top, bottom)`.
    fn count(&self, left: usize, top: usize, right: usize, bottom: usize) -> u32 {
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];
        at(right, bottom) + at(left, top) - at(left, bottom) - at(right, top)
    }
}

#[cfg(test)]
mod tests {
    use super::{vote, VoteConfig};
    use crate::grid::BinaryMap;
    use crate::scheduler::Scheduler;

    #[test]
    fn fills_hole_and_clears_island() {
        let mut input = BinaryMap::new(9, 9);
        for y in 0..9 {
            for x in 0..4 {
                input.set(x, y, true);
            }
        }
        input.set(1, 4, false);
        input.set(7, 4, true);
        let config = VoteConfig::new(1, 0.6, 0);
        let output = vote(&input, None, &config, &Scheduler::inline()).unwrap();
        assert!(output.get(1, 4), "hole is outvoted");
        assert!(!output.get(7, 4), "island is outvoted");
        assert!(output.get(0, 0), "corner window is clipped to the map");
        assert!(!output.get(5, 0));
    }

    #[test]
    fn respects_border_and_mask() {
        let mut input = BinaryMap::new(10, 10);
        input.invert();
        let mut mask = BinaryMap::new(10, 10);
        mask.set(5, 5, true);
        mask.set(1, 1, true);
        let config = VoteConfig::new(1, 0.5, 2);
        let output = vote(&input, Some(&mask), &config, &Scheduler::pool(2)).unwrap();
        assert_eq!(output.count_ones(), 1);
        assert!(output.get(5, 5));
    }

    #[test]
    fn schedulers_agree() {
        let mut input = BinaryMap::new(70, 40);
        for y in 0..40 {
            for x in 0..70 {
                input.set(x, y, (x * 7 + y * 13) % 5 < 2);
            }
        }
        let config = VoteConfig::new(2, 0.6, 3);
        let inline = vote(&input, None, &config, &Scheduler::inline()).unwrap();
        let pooled = vote(&input, None, &config, &Scheduler::pool(3)).unwrap();
        assert_eq!(inline, pooled);
    }
}
