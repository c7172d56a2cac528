use crate::geometry::{Point, Rect};
use crate::util::{FingerError, FingerResult};

/// Block tiling of an image plus the dual grid of block corners.
///
/// Blocks are at most `block_size` pixels wide; per axis there are
/// `ceil(pixels / block_size)` of them with boundaries at `i * pixels / count`,
/// so every pixel falls into exactly one block. The corner grid has one more
/// row and column; a corner's area spans between the centers of the blocks
/// around it and reaches the image edge on the outer corners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMap {
    width: usize,
    height: usize,
    blocks_x: usize,
    blocks_y: usize,
    block_xs: Vec<i32>,
    block_ys: Vec<i32>,
    corner_xs: Vec<i32>,
    corner_ys: Vec<i32>,
}

impl BlockMap {
    pub fn new(width: usize, height: usize, block_size: usize) -> FingerResult<Self> {
        if block_size == 0 {
            return Err(FingerError::InvalidBlockSize(block_size));
        }
        if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(FingerError::InvalidDimensions { width, height });
        }
        let blocks_x = width.div_ceil(block_size);
        let blocks_y = height.div_ceil(block_size);
        let block_xs = boundaries(width, blocks_x);
        let block_ys = boundaries(height, blocks_y);
        let corner_xs = corner_boundaries(&block_xs);
        let corner_ys = corner_boundaries(&block_ys);
        Ok(Self {
            width,
            height,
            blocks_x,
            blocks_y,
            block_xs,
            block_ys,
            corner_xs,
            corner_ys,
        })
    }

    /// Image size in pixels as `(width, height)`.
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of blocks as `(columns, rows)`.
    pub fn block_count(&self) -> (usize, usize) {
        (self.blocks_x, self.blocks_y)
    }

    /// Number of corners as `(columns, rows)`.
    pub fn corner_count(&self) -> (usize, usize) {
        (self.blocks_x + 1, self.blocks_y + 1)
    }

    pub fn pixel_rect(&self) -> Rect {
        Rect::sized(self.width as i32, self.height as i32)
    }

    pub fn block_rect(&self) -> Rect {
        Rect::sized(self.blocks_x as i32, self.blocks_y as i32)
    }

    pub fn corner_rect(&self) -> Rect {
        Rect::sized(self.blocks_x as i32 + 1, self.blocks_y as i32 + 1)
    }

    /// Pixel rectangle of the block at grid position `block`.
    pub fn block_area(&self, block: Point) -> Rect {
        let (x, y) = (block.x as usize, block.y as usize);
        Rect::between(
            Point::new(self.block_xs[x], self.block_ys[y]),
            Point::new(self.block_xs[x + 1], self.block_ys[y + 1]),
        )
    }

    /// Pixel rectangle between the centers of the blocks touching `corner`.
    pub fn corner_area(&self, corner: Point) -> Rect {
        let (x, y) = (corner.x as usize, corner.y as usize);
        Rect::between(
            Point::new(self.corner_xs[x], self.corner_ys[y]),
            Point::new(self.corner_xs[x + 1], self.corner_ys[y + 1]),
        )
    }

    /// Block containing the pixel at `pixel`.
    pub fn block_at(&self, pixel: Point) -> Point {
        Point::new(
            self.block_xs.partition_point(|&bound| bound <= pixel.x) as i32 - 1,
            self.block_ys.partition_point(|&bound| bound <= pixel.y) as i32 - 1,
        )
    }

    pub fn block_center(&self, block: Point) -> Point {
        self.block_area(block).center()
    }

    pub fn contains_block(&self, block: Point) -> bool {
        self.block_rect().contains(block)
    }

    pub fn contains_corner(&self, corner: Point) -> bool {
        self.corner_rect().contains(corner)
    }

    /// Block coordinates in raster order.
    pub fn blocks(&self) -> Vec<Point> {
        self.block_rect().points().collect()
    }

    /// Corner coordinates in raster order.
    pub fn corners(&self) -> Vec<Point> {
        self.corner_rect().points().collect()
    }

    /// Row-major index of a block.
    pub fn block_index(&self, block: Point) -> usize {
        block.y as usize * self.blocks_x + block.x as usize
    }

    /// Row-major index of a corner.
    pub fn corner_index(&self, corner: Point) -> usize {
        corner.y as usize * (self.blocks_x + 1) + corner.x as usize
    }
}

fn boundaries(pixels: usize, count: usize) -> Vec<i32> {
    (0..=count).map(|i| (i * pixels / count) as i32).collect()
}

fn corner_boundaries(block_bounds: &[i32]) -> Vec<i32> {
    let blocks = block_bounds.len() - 1;
    let mut bounds = Vec::with_capacity(blocks + 2);
    bounds.push(0);
    for i in 0..blocks {
        bounds.push((block_bounds[i] + block_bounds[i + 1]) / 2);
    }
    bounds.push(block_bounds[blocks]);
    bounds
}
