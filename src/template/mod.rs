//! Minutia templates: the unit of exchange between extraction and matching.

use crate::geometry::Point;

/// Minutia type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinutiaKind {
    /// A ridge ends.
    Ending,
    /// A ridge splits in two.
    Bifurcation,
}

/// Positioned, oriented feature point.
///
/// `direction` is a byte angle pointing from the minutia into the ridge (for
/// endings) or valley (for bifurcations) it terminates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Minutia {
    pub position: Point,
    pub direction: u8,
    pub kind: MinutiaKind,
}

impl Minutia {
    pub fn new(position: Point, direction: u8, kind: MinutiaKind) -> Self {
        Self {
            position,
            direction,
            kind,
        }
    }
}

/// Ordered minutiae of one fingerprint.
///
/// Order is stable and carries no meaning beyond indexing; extraction puts
/// ridge endings before bifurcations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Template {
    minutiae: Vec<Minutia>,
}

impl Template {
    pub fn new(minutiae: Vec<Minutia>) -> Self {
        Self { minutiae }
    }

    pub fn minutiae(&self) -> &[Minutia] {
        &self.minutiae
    }

    pub fn len(&self) -> usize {
        self.minutiae.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutiae.is_empty()
    }

    /// Number of minutiae of the given kind.
    pub fn count(&self, kind: MinutiaKind) -> usize {
        self.minutiae.iter().filter(|m| m.kind == kind).count()
    }

    pub fn into_minutiae(self) -> Vec<Minutia> {
        self.minutiae
    }
}

impl From<Vec<Minutia>> for Template {
    fn from(minutiae: Vec<Minutia>) -> Self {
        Self::new(minutiae)
    }
}

impl<'a> IntoIterator for &'a Template {
    type Item = &'a Minutia;
    type IntoIter = std::slice::Iter<'a, Minutia>;

    fn into_iter(self) -> Self::IntoIter {
        self.minutiae.iter()
    }
}
