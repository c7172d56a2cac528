//! Dense 2D containers used by the extraction stages.
//!
//! `Matrix` holds per-pixel or per-block scalar fields, `BinaryMap` holds
//! masks and binarized images, and `BlockMap` describes the block tiling that
//! localized statistics are computed over.

pub(crate) mod binary;
mod blocks;

pub use binary::BinaryMap;
pub use blocks::BlockMap;

use crate::geometry::{Point, Rect};

/// Row-major dense matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Matrix<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T> Matrix<T> {
    /// Wraps a row-major buffer of exactly `width * height` elements.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "matrix buffer size mismatch");
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::sized(self.width as i32, self.height as i32)
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[y * self.width + x]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        &mut self.data[y * self.width + x]
    }

    pub fn at(&self, point: Point) -> &T {
        self.get(point.x as usize, point.y as usize)
    }

    pub fn at_mut(&mut self, point: Point) -> &mut T {
        self.get_mut(point.x as usize, point.y as usize)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Copy> Matrix<T> {
    pub fn value(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.width + x] = value;
    }
}
