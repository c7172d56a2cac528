//! Neighbor edges between minutiae of one template.

use crate::angle;
use crate::params::tunable;
use crate::template::{Minutia, Template};

/// Rotation-invariant shape of the edge from a reference minutia to a neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeShape {
    pub length: i32,
    /// Edge direction seen from the reference minutia's direction.
    pub reference_angle: u8,
    /// Reverse edge direction seen from the neighbor's direction.
    pub neighbor_angle: u8,
}

impl EdgeShape {
    pub fn new(reference: &Minutia, neighbor: &Minutia) -> Self {
        let relative = neighbor.position - reference.position;
        let polar = angle::to_polar(relative.x, relative.y);
        Self {
            length: polar.distance,
            reference_angle: angle::difference(reference.direction, polar.angle),
            neighbor_angle: angle::difference(neighbor.direction, angle::opposite(polar.angle)),
        }
    }
}

/// Edge from a reference minutia to the neighbor at index `neighbor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NeighborEdge {
    pub shape: EdgeShape,
    pub neighbor: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeTableConfig {
    /// Neighbors further than this are not connected.
    pub max_distance: i32,
    /// Edges kept per minutia, shortest first.
    pub max_neighbors: usize,
}

impl Default for EdgeTableConfig {
    fn default() -> Self {
        Self {
            max_distance: 226,
            max_neighbors: 9,
        }
    }
}

tunable!(EdgeTableConfig {
    param max_distance: 30 ..= 1500, precision 0, dpi true;
    param max_neighbors: 2 ..= 100, precision 0, dpi false;
});

/// Per-minutia edge lists sorted by ascending length.
///
/// Equal lengths keep neighbor index order.
#[derive(Clone, Debug, Default)]
pub struct EdgeTable {
    rows: Vec<Vec<NeighborEdge>>,
}

impl EdgeTable {
    pub fn new(template: &Template, config: &EdgeTableConfig) -> Self {
        let mut table = Self::default();
        table.reset(template, config);
        table
    }

    /// Rebuilds the table for `template`, reusing the existing allocations.
    pub fn reset(&mut self, template: &Template, config: &EdgeTableConfig) {
        let minutiae = template.minutiae();
        self.rows.truncate(minutiae.len());
        self.rows.resize_with(minutiae.len(), Vec::new);
        let limit = config.max_distance as i64 * config.max_distance as i64;
        for (reference, row) in self.rows.iter_mut().enumerate() {
            row.clear();
            let origin = &minutiae[reference];
            for (neighbor, other) in minutiae.iter().enumerate() {
                if neighbor != reference && (other.position - origin.position).length_sq() <= limit {
                    row.push(NeighborEdge {
                        shape: EdgeShape::new(origin, other),
                        neighbor,
                    });
                }
            }
            row.sort_by_key(|edge| edge.shape.length);
            row.truncate(config.max_neighbors);
        }
    }

    /// Edges of minutia `reference`.
    pub fn edges(&self, reference: usize) -> &[NeighborEdge] {
        &self.rows[reference]
    }

    /// Number of minutiae the table was built for.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
