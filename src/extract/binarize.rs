//! Binarization and binary-map cleanup.

use super::vote::{vote, VoteConfig};
use crate::grid::binary::set_row_bit;
use crate::grid::{BinaryMap, Matrix};
use crate::scheduler::Scheduler;
use crate::util::FingerResult;

/// Ridge pixels: where the along-ridge average exceeds the across-ridge one.
pub(crate) fn binarize(
    smoothed: &Matrix<f64>,
    orthogonal: &Matrix<f64>,
    pixel_mask: &BinaryMap,
    scheduler: &Scheduler,
) -> FingerResult<BinaryMap> {
    let width = smoothed.width();
    let mut binary = BinaryMap::new(width, smoothed.height());
    let words_per_row = binary.words_per_row();
    scheduler.for_each_row_mut(binary.words_mut(), words_per_row, |rows, band| {
        for (y, row) in rows.zip(band.chunks_mut(words_per_row)) {
            for x in 0..width {
                if pixel_mask.get(x, y) && smoothed.value(x, y) - orthogonal.value(x, y) > 0.0 {
                    set_row_bit(row, x);
                }
            }
        }
    })?;
    Ok(binary)
}

/// Removes small islands, then fills small holes in the cleaned map.
pub(crate) fn smooth_binary(
    binary: &mut BinaryMap,
    pixel_mask: &BinaryMap,
    config: &VoteConfig,
    scheduler: &Scheduler,
) -> FingerResult<()> {
    let islands = vote(&binary.inverted(), Some(pixel_mask), config, scheduler)?;
    binary.and_not(&islands);
    let filled = vote(binary, Some(pixel_mask), config, scheduler)?;
    binary.or(&filled);
    Ok(())
}

/// Clears every 2×2 window whose only set pixels form one diagonal.
///
/// Repeats until no such window is left, since clearing may expose new ones.
pub(crate) fn remove_crosses(binary: &mut BinaryMap) {
    let (width, height) = (binary.width(), binary.height());
    if width < 2 || height < 2 {
        return;
    }
    let mut changed = true;
    while changed {
        changed = false;
        for y in 0..height - 1 {
            for x in 0..width - 1 {
                let top_left = binary.get(x, y);
                let top_right = binary.get(x + 1, y);
                let bottom_left = binary.get(x, y + 1);
                let bottom_right = binary.get(x + 1, y + 1);
                let falling = top_left && bottom_right && !top_right && !bottom_left;
                let rising = top_right && bottom_left && !top_left && !bottom_right;
                if falling || rising {
                    binary.set(x, y, false);
                    binary.set(x + 1, y, false);
                    binary.set(x, y + 1, false);
                    binary.set(x + 1, y + 1, false);
                    changed = true;
                }
            }
        }
    }
}

/// Pixel mask eroded by `border` pixels plus a one-pixel frame.
///
/// Erosion runs in doubling steps so its cost grows with `log(border)`.
pub(crate) fn inner_mask(pixel_mask: &BinaryMap, border: usize) -> BinaryMap {
    let (width, height) = (pixel_mask.width(), pixel_mask.height());
    let mut inner = BinaryMap::new(width, height);
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            inner.set(x, y, pixel_mask.get(x, y));
        }
    }
    if border >= 1 {
        inner = shrink(&inner, 1);
    }
    let mut total = 1;
    let mut step = 1;
    while total + step <= border {
        inner = shrink(&inner, step);
        total += step;
        step *= 2;
    }
    if total < border {
        inner = shrink(&inner, border - total);
    }
    inner
}

/// Keeps pixels whose four axis neighbors at distance `amount` are all set.
pub(crate) fn shrink(mask: &BinaryMap, amount: usize) -> BinaryMap {
    let (width, height) = (mask.width(), mask.height());
    let mut shrunk = BinaryMap::new(width, height);
    if width <= 2 * amount || height <= 2 * amount {
        return shrunk;
    }
    for y in amount..height - amount {
        for x in amount..width - amount {
            let kept = mask.get(x, y - amount)
                && mask.get(x, y + amount)
                && mask.get(x - amount, y)
                && mask.get(x + amount, y);
            shrunk.set(x, y, kept);
        }
    }
    shrunk
}

#[cfg(test)]
mod tests {
    use super::{inner_mask, remove_crosses, shrink, smooth_binary};
    use crate::extract::vote::{vote, VoteConfig};
    use crate::grid::BinaryMap;
    use crate::scheduler::Scheduler;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn full(width: usize, height: usize) -> BinaryMap {
        let mut map = BinaryMap::new(width, height);
        map.invert();
        map
    }

    #[test]
    fn crosses_are_cleared() {
        let mut map = BinaryMap::new(4, 4);
        map.set(1, 1, true);
        map.set(2, 2, true);
        map.set(0, 3, true);
        remove_crosses(&mut map);
        assert!(!map.get(1, 1) && !map.get(2, 2));
        assert!(map.get(0, 3));

        let mut solid = BinaryMap::new(4, 4);
        solid.set(1, 1, true);
        solid.set(2, 2, true);
        solid.set(2, 1, true);
        remove_crosses(&mut solid);
        assert_eq!(solid.count_ones(), 3);
    }

    #[test]
    fn inner_mask_erodes_by_border() {
        let mask = full(40, 40);
        let inner = inner_mask(&mask, 5);
        // One frame pixel plus five eroded pixels on each side.
        assert!(!inner.get(5, 20));
        assert!(inner.get(6, 20));
        assert!(inner.get(33, 20));
        assert!(!inner.get(34, 20));
        assert_eq!(inner.count_ones(), 28 * 28);
    }

    #[test]
    fn inner_mask_of_small_mask_is_empty() {
        assert!(inner_mask(&full(20, 20), 14).is_empty());
        assert!(shrink(&full(3, 3), 2).is_empty());
    }

    #[test]
    fn binary_smoothing_cleans_noise() {
        let mut binary = BinaryMap::new(40, 40);
        for y in 0..40 {
            for x in 0..20 {
                binary.set(x, y, true);
            }
        }
        binary.set(10, 20, false);
        binary.set(30, 20, true);
        let mask = full(40, 40);
        let config = VoteConfig::new(2, 0.8, 3);
        smooth_binary(&mut binary, &mask, &config, &Scheduler::pool(2)).unwrap();
        assert!(binary.get(10, 20));
        assert!(!binary.get(30, 20));
        assert!(binary.get(5, 5));
        assert!(!binary.get(35, 5));
    }

    #[test]
    fn fill_votes_on_the_erased_map() {
        let mut rng = StdRng::seed_from_u64(17);
        let config = VoteConfig::new(1, 0.6, 0);
        let mask = full(24, 24);
        let scheduler = Scheduler::inline();
        for _ in 0..20 {
            let mut binary = BinaryMap::new(24, 24);
            for y in 0..24 {
                for x in 0..24 {
                    binary.set(x, y, rng.random_bool(0.5));
                }
            }
            let mut expected = binary.clone();
            let islands = vote(&expected.inverted(), Some(&mask), &config, &scheduler).unwrap();
            expected.and_not(&islands);
            let filled = vote(&expected, Some(&mask), &config, &scheduler).unwrap();
            expected.or(&filled);

            smooth_binary(&mut binary, &mask, &config, &scheduler).unwrap();
            assert!(binary == expected);
        }
    }

    #[test]
    fn smoothing_leaves_crosses_for_the_next_stage() {
        let mut binary = BinaryMap::new(20, 20);
        binary.set(9, 9, true);
        binary.set(10, 10, true);
        let mask = full(20, 20);
        // Unanimous votes never touch a lone diagonal pair.
        let config = VoteConfig::new(1, 1.0, 0);
        smooth_binary(&mut binary, &mask, &config, &Scheduler::inline()).unwrap();
        assert!(binary.get(9, 9) && binary.get(10, 10));
    }
}
