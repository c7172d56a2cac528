//! Integer pixel geometry: points, rectangles, neighborhoods, rasterized lines.
//!
//! Coordinates grow right (`x`) and down (`y`). Points order by row first so
//! sorted point sets enumerate in raster order.

use std::cmp::Ordering;
use std::ops::{Add, Neg, Sub};

/// Integer pixel or grid coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean length.
    pub fn length_sq(self) -> i64 {
        let x = self.x as i64;
        let y = self.y as i64;
        x * x + y * y
    }

    /// Pixels of the straight line from `self` to `to`, both ends included.
    ///
    /// Steps one pixel along the dominant axis and rounds the other one.
    pub fn line_to(self, to: Point) -> Vec<Point> {
        let relative = to - self;
        if relative.x.abs() >= relative.y.abs() {
            if relative.x == 0 {
                return vec![self];
            }
            let sign = relative.x.signum();
            let slope = relative.y as f64 / relative.x as f64;
            (0..=relative.x.abs())
                .map(|i| {
                    let step = sign * i;
                    Point::new(self.x + step, self.y + (step as f64 * slope).round() as i32)
                })
                .collect()
        } else {
            let sign = relative.y.signum();
            let slope = relative.x as f64 / relative.y as f64;
            (0..=relative.y.abs())
                .map(|i| {
                    let step = sign * i;
                    Point::new(self.x + (step as f64 * slope).round() as i32, self.y + step)
                })
                .collect()
        }
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// 4-connected neighbor offsets.
pub const EDGE_NEIGHBORS: [Point; 4] = [
    Point::new(0, -1),
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(0, 1),
];

/// 8-connected neighbor offsets in raster order.
pub const CORNER_NEIGHBORS: [Point; 8] = [
    Point::new(-1, -1),
    Point::new(0, -1),
    Point::new(1, -1),
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(-1, 1),
    Point::new(0, 1),
    Point::new(1, 1),
];

/// Axis-aligned half-open rectangle `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Rectangle spanning `begin` (inclusive) to `end` (exclusive).
    pub fn between(begin: Point, end: Point) -> Self {
        Self::new(begin.x, begin.y, end.x - begin.x, end.y - begin.y)
    }

    /// Square of side `2 * radius + 1` centered at `center`.
    pub fn around(center: Point, radius: i32) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            2 * radius + 1,
            2 * radius + 1,
        )
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn center(&self) -> Point {
        Point::new((self.left() + self.right()) / 2, (self.top() + self.bottom()) / 2)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.y >= self.top()
            && point.x < self.right()
            && point.y < self.bottom()
    }

    /// Rectangle moved by `offset`.
    pub fn shifted(&self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Overlap of two rectangles; empty rectangles have non-positive extent.
    pub fn intersect(&self, other: &Rect) -> Self {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Self::new(left, top, (right - left).max(0), (bottom - top).max(0))
    }

    /// Iterates contained points in raster order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let rect = *self;
        (rect.top()..rect.bottom())
            .flat_map(move |y| (rect.left()..rect.right()).map(move |x| Point::new(x, y)))
    }
}
