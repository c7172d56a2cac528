//! Skeleton cleanup filters.
//!
//! Each filter assumes the shape left by the ones before it; the extractor
//! applies them in the order they appear in this file.

use super::{Skeleton, SkeletonConfig};
use crate::grid::BinaryMap;

/// Removes nodes left without ridges.
pub(crate) fn remove_dots(skeleton: &mut Skeleton) {
    for id in skeleton.live_nodes() {
        if skeleton.ridge_count(id) == 0 {
            skeleton.remove_node(id);
        }
    }
}

/// Replaces short two-armed loops between two junctions with a straight ridge.
pub(crate) fn remove_pores(skeleton: &mut Skeleton, config: &SkeletonConfig) {
    for id in skeleton.live_nodes() {
        if skeleton.ridge_count(id) != 3 {
            continue;
        }
        for exit in 0..3 {
            let ridges = &skeleton.node(id).ridges;
            let exit_ridge = ridges[exit];
            let arm1 = ridges[(exit + 1) % 3];
            let arm2 = ridges[(exit + 2) % 3];
            let arm_end = skeleton.end_of(arm1);
            let exit_end = skeleton.end_of(exit_ridge);
            if arm_end != skeleton.end_of(arm2)
                || exit_end == arm_end
                || arm_end == Some(id)
                || exit_end == Some(id)
            {
                continue;
            }
            if let Some(end) = arm_end {
                if skeleton.ridge_count(end) == 3
                    && skeleton.len(arm1) <= config.max_pore_arm
                    && skeleton.len(arm2) <= config.max_pore_arm
                {
                    skeleton.detach(arm1);
                    skeleton.detach(arm2);
                    let from = skeleton.node(id).position;
                    let to = skeleton.node(end).position;
                    let merged = skeleton.add_segment(from.line_to(to));
                    skeleton.set_start(merged, Some(id));
                    skeleton.set_end(merged, Some(end));
                }
            }
            break;
        }
    }
    remove_knots(skeleton);
}

/// Joins the two ridges meeting at a node that has exactly two of them.
///
/// The longer ridge absorbs the shorter one.
pub(crate) fn remove_knots(skeleton: &mut Skeleton) {
    for id in skeleton.live_nodes() {
        if skeleton.ridge_count(id) != 2 {
            continue;
        }
        let ridges = &skeleton.node(id).ridges;
        let (first, second) = (ridges[0], ridges[1]);
        if first.flipped() == second {
            continue;
        }
        let (mut extended, mut removed) = (first.flipped(), second);
        if skeleton.len(extended) < skeleton.len(removed) {
            (extended, removed) = (removed.flipped(), extended.flipped());
        }
        let mut points = skeleton.points(extended);
        points.pop();
        points.extend(skeleton.points(removed));
        skeleton.set_points(extended, points);
        skeleton.set_end(extended, skeleton.end_of(removed));
        skeleton.detach(removed);
    }
    remove_dots(skeleton);
}

/// Cuts short dangling ridges hanging off a junction.
pub(crate) fn remove_tails(skeleton: &mut Skeleton, config: &SkeletonConfig) {
    for id in skeleton.live_nodes() {
        if skeleton.ridge_count(id) != 1 {
            continue;
        }
        let ridge = skeleton.node(id).ridges[0];
        let joined = skeleton
            .end_of(ridge)
            .is_some_and(|end| skeleton.ridge_count(end) >= 3);
        if joined && skeleton.len(ridge) < config.shortest_joined_ending {
            skeleton.detach(ridge);
        }
    }
    remove_dots(skeleton);
    remove_knots(skeleton);
}

/// Drops short ridges that connect two endings.
pub(crate) fn remove_fragments(skeleton: &mut Skeleton, config: &SkeletonConfig) {
    for id in skeleton.live_nodes() {
        if skeleton.ridge_count(id) != 1 {
            continue;
        }
        let ridge = skeleton.node(id).ridges[0];
        let isolated = skeleton
            .end_of(ridge)
            .is_some_and(|end| skeleton.ridge_count(end) == 1);
        if isolated && skeleton.len(ridge) < config.min_fragment_length {
            skeleton.detach(ridge);
        }
    }
    remove_dots(skeleton);
}

/// Invalidates nodes outside `inner_mask`.
pub(crate) fn mask_minutiae(skeleton: &mut Skeleton, inner_mask: &BinaryMap) {
    for id in skeleton.live_nodes() {
        let inside = inner_mask.get_or(skeleton.node(id).position, false);
        if !inside {
            skeleton.node_mut(id).valid = false;
        }
    }
}

/// Invalidates junctions and the endings within `min_branch_distance` of one.
pub(crate) fn remove_branch_minutiae(skeleton: &mut Skeleton, config: &SkeletonConfig) {
    let live = skeleton.live_nodes();
    let junctions: Vec<_> = live
        .iter()
        .filter(|&&id| skeleton.ridge_count(id) > 2)
        .map(|&id| skeleton.node(id).position)
        .collect();
    let limit = (config.min_branch_distance * config.min_branch_distance) as i64;
    for id in live {
        let node = skeleton.node(id);
        let invalid = node.ridges.len() > 2
            || junctions
                .iter()
                .any(|&junction| (junction - node.position).length_sq() < limit);
        if invalid {
            skeleton.node_mut(id).valid = false;
        }
    }
}
