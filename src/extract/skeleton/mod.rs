//! Skeleton graph built from a thinned binary map.
//!
//! The graph is an index arena: nodes are skeleton minutiae (ridge endings
//! and junctions), segments are pixel paths between two nodes. A node refers
//! to each attached segment through a [`RidgeRef`] oriented away from it, so
//! a segment that starts and ends at the same node appears twice in its list.

mod filters;
mod trace;

pub(crate) use filters::{
    mask_minutiae, remove_branch_minutiae, remove_dots, remove_fragments, remove_knots,
    remove_pores, remove_tails,
};
pub(crate) use trace::trace;

use crate::diagnostics::SkeletonShape;
use crate::geometry::Point;
use crate::params::tunable;
use crate::template::MinutiaKind;

/// Which binary map a skeleton was traced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkeletonKind {
    Ridges,
    Valleys,
}

impl SkeletonKind {
    /// Diagnostic channel prefix.
    pub fn name(self) -> &'static str {
        match self {
            SkeletonKind::Ridges => "Ridges",
            SkeletonKind::Valleys => "Valleys",
        }
    }

    /// Ridge endings are ridge skeleton ends; bifurcations are valley ends.
    pub fn minutia_kind(self) -> MinutiaKind {
        match self {
            SkeletonKind::Ridges => MinutiaKind::Ending,
            SkeletonKind::Valleys => MinutiaKind::Bifurcation,
        }
    }
}

/// Skeleton cleanup and minutia direction parameters. Lengths are in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonConfig {
    pub thinning_iterations: usize,
    /// Longest arm of a loop still treated as a pore.
    pub max_pore_arm: usize,
    /// Dangling ridges joined to a junction must be at least this long.
    pub shortest_joined_ending: usize,
    /// Free-standing ridges must be at least this long.
    pub min_fragment_length: usize,
    /// Endings closer than this to a junction are not reported.
    pub min_branch_distance: usize,
    /// Ridge points skipped before sampling the minutia direction.
    pub direction_skip: usize,
    /// Ridge points spanned by the minutia direction sample.
    pub direction_sample: usize,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            thinning_iterations: 26,
            max_pore_arm: 41,
            shortest_joined_ending: 21,
            min_fragment_length: 22,
            min_branch_distance: 10,
            direction_skip: 1,
            direction_sample: 21,
        }
    }
}

tunable!(SkeletonConfig {
    param thinning_iterations: 1 ..= 100, precision 0, dpi false;
    param max_pore_arm: 1 ..= 200, precision 0, dpi true;
    param shortest_joined_ending: 1 ..= 200, precision 0, dpi true;
    param min_fragment_length: 1 ..= 200, precision 0, dpi true;
    param min_branch_distance: 0 ..= 100, precision 0, dpi true;
    param direction_skip: 0 ..= 50, precision 0, dpi true;
    param direction_sample: 2 ..= 100, precision 0, dpi true;
});

/// Oriented reference to a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RidgeRef {
    pub segment: usize,
    pub reversed: bool,
}

impl RidgeRef {
    pub fn forward(segment: usize) -> Self {
        Self {
            segment,
            reversed: false,
        }
    }

    pub fn flipped(self) -> Self {
        Self {
            segment: self.segment,
            reversed: !self.reversed,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub position: Point,
    /// Attached segments, each oriented away from this node.
    pub ridges: Vec<RidgeRef>,
    pub alive: bool,
    /// Cleared by filters that reject the node as a reportable minutia.
    pub valid: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Segment {
    pub points: Vec<Point>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub alive: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Skeleton {
    pub kind: SkeletonKind,
    nodes: Vec<Node>,
    segments: Vec<Segment>,
}

impl Skeleton {
    pub fn new(kind: SkeletonKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn add_node(&mut self, position: Point) -> usize {
        self.nodes.push(Node {
            position,
            ridges: Vec::new(),
            alive: true,
            valid: true,
        });
        self.nodes.len() - 1
    }

    /// Adds a detached segment; attach it with `set_start` and `set_end`.
    pub fn add_segment(&mut self, points: Vec<Point>) -> RidgeRef {
        self.segments.push(Segment {
            points,
            start: None,
            end: None,
            alive: true,
        });
        RidgeRef::forward(self.segments.len() - 1)
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Ids of nodes that have not been removed, in creation order.
    pub fn live_nodes(&self) -> Vec<usize> {
        (0..self.nodes.len()).filter(|&id| self.nodes[id].alive).collect()
    }

    pub fn ridge_count(&self, node: usize) -> usize {
        self.nodes[node].ridges.len()
    }

    pub fn start_of(&self, ridge: RidgeRef) -> Option<usize> {
        let segment = &self.segments[ridge.segment];
        if ridge.reversed {
            segment.end
        } else {
            segment.start
        }
    }

    pub fn end_of(&self, ridge: RidgeRef) -> Option<usize> {
        self.start_of(ridge.flipped())
    }

    /// Number of pixels along the ridge.
    pub fn len(&self, ridge: RidgeRef) -> usize {
        self.segments[ridge.segment].points.len()
    }

    /// The `index`-th pixel walking along `ridge`.
    pub fn point(&self, ridge: RidgeRef, index: usize) -> Point {
        let points = &self.segments[ridge.segment].points;
        if ridge.reversed {
            points[points.len() - 1 - index]
        } else {
            points[index]
        }
    }

    /// Pixels of `ridge` in walking order.
    pub fn points(&self, ridge: RidgeRef) -> Vec<Point> {
        let mut points = self.segments[ridge.segment].points.clone();
        if ridge.reversed {
            points.reverse();
        }
        points
    }

    /// Replaces the pixels of `ridge`, given in walking order.
    pub fn set_points(&mut self, ridge: RidgeRef, mut points: Vec<Point>) {
        if ridge.reversed {
            points.reverse();
        }
        self.segments[ridge.segment].points = points;
    }

    /// Moves the start of `ridge` to `node`, keeping node ridge lists in sync.
    pub fn set_start(&mut self, ridge: RidgeRef, node: Option<usize>) {
        let current = self.start_of(ridge);
        if current == node {
            return;
        }
        if let Some(old) = current {
            let ridges = &mut self.nodes[old].ridges;
            if let Some(index) = ridges.iter().position(|&r| r == ridge) {
                ridges.remove(index);
            }
        }
        let segment = &mut self.segments[ridge.segment];
        if ridge.reversed {
            segment.end = node;
        } else {
            segment.start = node;
        }
        if let Some(new) = node {
            self.nodes[new].ridges.push(ridge);
        }
    }

    pub fn set_end(&mut self, ridge: RidgeRef, node: Option<usize>) {
        self.set_start(ridge.flipped(), node);
    }

    /// Detaches `ridge` from both its nodes and drops it.
    pub fn detach(&mut self, ridge: RidgeRef) {
        self.set_start(ridge, None);
        self.set_end(ridge, None);
        self.segments[ridge.segment].alive = false;
    }

    /// Removes a node that no longer has ridges.
    pub fn remove_node(&mut self, id: usize) {
        debug_assert!(self.nodes[id].ridges.is_empty());
        self.nodes[id].alive = false;
    }

    /// Snapshot for diagnostics.
    pub fn shape(&self) -> SkeletonShape {
        SkeletonShape {
            nodes: self
                .nodes
                .iter()
                .filter(|node| node.alive)
                .map(|node| node.position)
                .collect(),
            ridges: self
                .segments
                .iter()
                .filter(|segment| segment.alive)
                .map(|segment| segment.points.clone())
                .collect(),
        }
    }
}
