//! Conversion of cleaned skeletons into template minutiae.

use super::skeleton::{Skeleton, SkeletonConfig};
use crate::angle;
use crate::template::Minutia;

/// Valid one-ridge nodes of `skeleton`, in node order.
///
/// The direction points from the ridge sample at `direction_skip` toward the
/// one `direction_sample - 1` points further along. Ridges too short for the
/// full window shift it back toward the node.
pub(crate) fn collect(skeleton: &Skeleton, config: &SkeletonConfig) -> Vec<Minutia> {
    let kind = skeleton.kind.minutia_kind();
    let mut minutiae = Vec::new();
    for id in skeleton.live_nodes() {
        let node = skeleton.node(id);
        if !node.valid || node.ridges.len() != 1 {
            continue;
        }
        let ridge = node.ridges[0];
        let (first, last) = sample_window(skeleton.len(ridge), config);
        let direction = angle::atan_byte(skeleton.point(ridge, first), skeleton.point(ridge, last));
        minutiae.push(Minutia::new(node.position, direction, kind));
    }
    minutiae
}

fn sample_window(len: usize, config: &SkeletonConfig) -> (usize, usize) {
    let mut first = config.direction_skip;
    let mut last = config.direction_skip + config.direction_sample.max(2) - 1;
    if last >= len {
        let shift = last + 1 - len;
        first = first.saturating_sub(shift);
        last -= shift;
    }
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::{collect, sample_window};
    use crate::angle;
    use crate::extract::skeleton::{trace, SkeletonConfig, SkeletonKind};
    use crate::geometry::Point;
    use crate::grid::BinaryMap;
    use crate::template::MinutiaKind;

    #[test]
    fn window_shifts_back_on_short_ridges() {
        let config = SkeletonConfig::default();
        assert_eq!(sample_window(100, &config), (1, 21));
        assert_eq!(sample_window(21, &config), (0, 20));
        assert_eq!(sample_window(5, &config), (0, 4));
    }

    #[test]
    fn line_ends_point_into_the_ridge() {
        let mut map = BinaryMap::new(60, 10);
        for p in Point::new(5, 5).line_to(Point::new(50, 5)) {
            map.set_at(p, true);
        }
        let skeleton = trace(&map, SkeletonKind::Valleys);
        let minutiae = collect(&skeleton, &SkeletonConfig::default());
        assert_eq!(minutiae.len(), 2);
        assert!(minutiae.iter().all(|m| m.kind == MinutiaKind::Bifurcation));
        assert_eq!(minutiae[0].position, Point::new(5, 5));
        assert_eq!(minutiae[0].direction, 0);
        assert_eq!(minutiae[1].position, Point::new(50, 5));
        assert_eq!(minutiae[1].direction, angle::B180);
    }

    #[test]
    fn invalid_nodes_are_skipped() {
        let mut map = BinaryMap::new(60, 10);
        for p in Point::new(5, 5).line_to(Point::new(50, 5)) {
            map.set_at(p, true);
        }
        let mut skeleton = trace(&map, SkeletonKind::Ridges);
        let first = skeleton.live_nodes()[0];
        skeleton.node_mut(first).valid = false;
        let minutiae = collect(&skeleton, &SkeletonConfig::default());
        assert_eq!(minutiae.len(), 1);
        assert_eq!(minutiae[0].kind, MinutiaKind::Ending);
    }
}
