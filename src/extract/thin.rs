//! Topology-preserving thinning to a one-pixel-wide skeleton.

use crate::geometry::{Point, CORNER_NEIGHBORS};
use crate::grid::BinaryMap;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Neighborhood {
    Skeleton,
    Ending,
    Removable,
}

/// Neighborhood class for each 8-bit neighbor mask.
///
/// Bit order: top-left 1, top 2, top-right 4, left 8, right 16,
/// bottom-left 32, bottom 64, bottom-right 128.
fn neighborhood_types() -> &'static [Neighborhood; 256] {
    static TYPES: OnceLock<[Neighborhood; 256]> = OnceLock::new();
    TYPES.get_or_init(|| {
        let mut types = [Neighborhood::Skeleton; 256];
        for (mask, kind) in types.iter_mut().enumerate() {
            let bit = |b: usize| mask & b != 0;
            let (tl, tc, tr) = (bit(1), bit(2), bit(4));
            let (cl, cr) = (bit(8), bit(16));
            let (bl, bc, br) = (bit(32), bit(64), bit(128));
            let diagonal = !tc && !cl && tl || !cl && !bc && bl || !bc && !cr && br || !cr && !tc && tr;
            let horizontal = !tc && !bc && (tr || cr || br) && (tl || cl || bl);
            let vertical = !cl && !cr && (tl || tc || tr) && (bl || bc || br);
            *kind = if mask.count_ones() == 1 {
                Neighborhood::Ending
            } else if !diagonal && !horizontal && !vertical {
                Neighborhood::Removable
            } else {
                Neighborhood::Skeleton
            };
        }
        types
    })
}

/// An ending whose only neighbor is itself a junction is a spur to remove.
fn is_false_ending(binary: &BinaryMap, ending: Point) -> bool {
    for relative in CORNER_NEIGHBORS {
        let neighbor = ending + relative;
        if binary.get_or(neighbor, false) {
            let count = CORNER_NEIGHBORS
                .iter()
                .filter(|&&second| binary.get_or(neighbor + second, false))
                .count();
            return count > 2;
        }
    }
    false
}

/// Thins `input` in at most `max_iterations` passes.
///
/// Each pass visits pixels in four interleaved parity grids so that no two
/// adjacent pixels are decided in the same sweep. A pixel is either removed
/// or frozen into the output; interior pixels wait for a later pass.
pub(crate) fn thin(input: &BinaryMap, max_iterations: usize) -> BinaryMap {
    let (width, height) = (input.width(), input.height());
    let mut thinned = BinaryMap::new(width, height);
    if width < 3 || height < 3 {
        return thinned;
    }
    let mut partial = BinaryMap::new(width, height);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            partial.set(x, y, input.get(x, y));
        }
    }
    let types = neighborhood_types();
    let mut removed_anything = true;
    let mut iteration = 0;
    while removed_anything && iteration < max_iterations {
        removed_anything = false;
        iteration += 1;
        for (even_y, even_x) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            for y in (1 + even_y..height - 1).step_by(2) {
                for x in (1 + even_x..width - 1).step_by(2) {
                    if !partial.get(x, y) || thinned.get(x, y) {
                        continue;
                    }
                    let interior = partial.get(x, y - 1)
                        && partial.get(x, y + 1)
                        && partial.get(x - 1, y)
                        && partial.get(x + 1, y);
                    if interior {
                        continue;
                    }
                    let neighbors = CORNER_NEIGHBORS
                        .iter()
                        .enumerate()
                        .filter(|(_, &offset)| {
                            partial.get((x as i32 + offset.x) as usize, (y as i32 + offset.y) as usize)
                        })
                        .fold(0usize, |mask, (bit, _)| mask | 1 << bit);
                    let removable = match types[neighbors] {
                        Neighborhood::Removable => true,
                        Neighborhood::Ending => is_false_ending(&partial, Point::new(x as i32, y as i32)),
                        Neighborhood::Skeleton => false,
                    };
                    if removable {
                        removed_anything = true;
                        partial.set(x, y, false);
                    } else {
                        thinned.set(x, y, true);
                    }
                }
            }
        }
    }
    thinned
}

#[cfg(test)]
mod tests {
    use super::{neighborhood_types, thin, Neighborhood};
    use crate::geometry::CORNER_NEIGHBORS;
    use crate::grid::BinaryMap;

    fn neighbor_count(map: &BinaryMap, x: usize, y: usize) -> usize {
        CORNER_NEIGHBORS
            .iter()
            .filter(|o| map.get((x as i32 + o.x) as usize, (y as i32 + o.y) as usize))
            .count()
    }

    #[test]
    fn table_classifies_simple_cases() {
        let types = neighborhood_types();
        assert_eq!(types[2], Neighborhood::Ending);
        // Left and right neighbors: the pixel connects them.
        assert_eq!(types[8 | 16], Neighborhood::Skeleton);
        // Top and top-right: removing keeps them connected.
        assert_eq!(types[2 | 4], Neighborhood::Removable);
    }

    #[test]
    fn thick_bar_thins_to_single_line() {
        let mut bar = BinaryMap::new(30, 12);
        for y in 4..9 {
            for x in 3..27 {
                bar.set(x, y, true);
            }
        }
        let thinned = thin(&bar, 26);
        assert!(!thinned.is_empty());
        for x in 6..24 {
            let column: usize = (0..12).filter(|&y| thinned.get(x, y)).count();
            assert_eq!(column, 1, "column {x}");
        }
        for y in 1..11 {
            for x in 1..29 {
                if thinned.get(x, y) {
                    assert!(neighbor_count(&thinned, x, y) >= 1);
                }
            }
        }
    }
}
