use super::{Skeleton, SkeletonKind};
use crate::geometry::{Point, CORNER_NEIGHBORS};
use crate::grid::BinaryMap;

/// Builds the skeleton graph of a thinned map.
///
/// Pixels with one or more than two set neighbors are minutia pixels.
/// Adjacent minutia pixels collapse into a single node at their mean
/// position. Ridges are walked pixel by pixel from each minutia pixel until
/// they reach another one.
pub(crate) fn trace(thinned: &BinaryMap, kind: SkeletonKind) -> Skeleton {
    let (width, height) = (thinned.width(), thinned.height());
    let index = |p: Point| p.y as usize * width + p.x as usize;

    let minutia_pixels: Vec<Point> = thinned
        .rect()
        .points()
        .filter(|&p| thinned.at(p))
        .filter(|&p| {
            let count = neighbor_count(thinned, p);
            count == 1 || count > 2
        })
        .collect();

    let mut clusters = DisjointSet::new(width * height);
    let mut is_minutia = BinaryMap::new(width, height);
    for &pixel in &minutia_pixels {
        is_minutia.set_at(pixel, true);
    }
    for &pixel in &minutia_pixels {
        for relative in CORNER_NEIGHBORS {
            let neighbor = pixel + relative;
            if is_minutia.get_or(neighbor, false) {
                clusters.union(index(pixel), index(neighbor));
            }
        }
    }

    let mut skeleton = Skeleton::new(kind);
    let mut sums: Vec<(i64, i64, i64)> = Vec::new();
    let mut node_of_root = vec![usize::MAX; width * height];
    let mut node_of_pixel = vec![usize::MAX; width * height];
    for &pixel in &minutia_pixels {
        let root = clusters.find(index(pixel));
        if node_of_root[root] == usize::MAX {
            node_of_root[root] = sums.len();
            sums.push((0, 0, 0));
        }
        let node = node_of_root[root];
        node_of_pixel[index(pixel)] = node;
        let sum = &mut sums[node];
        sum.0 += pixel.x as i64;
        sum.1 += pixel.y as i64;
        sum.2 += 1;
    }
    for &(x, y, count) in &sums {
        skeleton.add_node(Point::new((x / count) as i32, (y / count) as i32));
    }

    let mut leads = BinaryMap::new(width, height);
    let max_steps = width * height;
    for &pixel in &minutia_pixels {
        for relative in CORNER_NEIGHBORS {
            let start = pixel + relative;
            if !thinned.get_or(start, false) || is_minutia.at(start) || leads.at(start) {
                continue;
            }
            let Some(points) = walk(thinned, &is_minutia, pixel, start, max_steps) else {
                continue;
            };
            let Some(&end) = points.last() else {
                continue;
            };
            leads.set_at(points[1], true);
            leads.set_at(points[points.len() - 2], true);
            let ridge = skeleton.add_segment(points);
            skeleton.set_start(ridge, Some(node_of_pixel[index(pixel)]));
            skeleton.set_end(ridge, Some(node_of_pixel[index(end)]));
        }
    }

    fix_linking_gaps(&mut skeleton);
    skeleton
}

fn neighbor_count(map: &BinaryMap, at: Point) -> usize {
    CORNER_NEIGHBORS
        .iter()
        .filter(|&&relative| map.get_or(at + relative, false))
        .count()
}

/// Follows the skeleton from `origin` through `start` to the next minutia pixel.
fn walk(
    thinned: &BinaryMap,
    is_minutia: &BinaryMap,
    origin: Point,
    start: Point,
    max_steps: usize,
) -> Option<Vec<Point>> {
    let mut points = vec![origin, start];
    let mut previous = origin;
    let mut current = start;
    while !is_minutia.at(current) {
        if points.len() > max_steps {
            return None;
        }
        let next = CORNER_NEIGHBORS
            .iter()
            .map(|&relative| current + relative)
            .find(|&next| next != previous && thinned.get_or(next, false))?;
        previous = current;
        current = next;
        points.push(current);
    }
    Some(points)
}

/// Connects each ridge to its node when the node sits off the ridge's first pixel.
fn fix_linking_gaps(skeleton: &mut Skeleton) {
    for id in skeleton.live_nodes() {
        let position = skeleton.node(id).position;
        for ridge in skeleton.node(id).ridges.clone() {
            let first = skeleton.point(ridge, 0);
            if first == position {
                continue;
            }
            let filling = first.line_to(position);
            let mut points: Vec<Point> = filling[1..].iter().rev().copied().collect();
            points.extend(skeleton.points(ridge));
            skeleton.set_points(ridge, points);
        }
    }
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut item: usize) -> usize {
        while self.parent[item] != item {
            self.parent[item] = self.parent[self.parent[item]];
            item = self.parent[item];
        }
        item
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[a.max(b)] = a.min(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::trace;
    use crate::extract::skeleton::SkeletonKind;
    use crate::geometry::Point;
    use crate::grid::BinaryMap;

    fn draw(map: &mut BinaryMap, from: Point, to: Point) {
        for p in from.line_to(to) {
            map.set_at(p, true);
        }
    }

    #[test]
    fn straight_line_has_two_endings() {
        let mut map = BinaryMap::new(20, 10);
        draw(&mut map, Point::new(2, 5), Point::new(15, 5));
        let skeleton = trace(&map, SkeletonKind::Ridges);
        let nodes = skeleton.live_nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(skeleton.node(nodes[0]).position, Point::new(2, 5));
        assert_eq!(skeleton.ridge_count(nodes[0]), 1);
        let ridge = skeleton.node(nodes[0]).ridges[0];
        assert_eq!(skeleton.len(ridge), 14);
        assert_eq!(skeleton.end_of(ridge), Some(nodes[1]));
    }

    #[test]
    fn junction_pixels_merge_into_one_node() {
        let mut map = BinaryMap::new(30, 30);
        draw(&mut map, Point::new(2, 15), Point::new(25, 15));
        draw(&mut map, Point::new(14, 16), Point::new(14, 27));
        let skeleton = trace(&map, SkeletonKind::Ridges);
        let nodes = skeleton.live_nodes();
        let junctions: Vec<_> = nodes
            .iter()
            .filter(|&&id| skeleton.ridge_count(id) == 3)
            .collect();
        assert_eq!(junctions.len(), 1);
        let endings = nodes
            .iter()
            .filter(|&&id| skeleton.ridge_count(id) == 1)
            .count();
        assert_eq!(endings, 3);
        let junction = *junctions[0];
        for &ridge in &skeleton.node(junction).ridges {
            assert_eq!(skeleton.point(ridge, 0), skeleton.node(junction).position);
        }
    }
}
