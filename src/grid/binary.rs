use crate::geometry::{Point, Rect};
use crate::grid::BlockMap;

const WORD_BITS: usize = 64;

/// 2D bitset.
///
/// Each row starts on a fresh 64-bit word so row bands never share storage;
/// this lets parallel stages write disjoint rows without synchronization.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryMap {
    width: usize,
    height: usize,
    words_per_row: usize,
    words: Vec<u64>,
}

impl BinaryMap {
    pub fn new(width: usize, height: usize) -> Self {
        let words_per_row = width.div_ceil(WORD_BITS);
        Self {
            width,
            height,
            words_per_row,
            words: vec![0; words_per_row * height],
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

    pub fn get(&self, x: usize, y: usize) -> bool {
        let word = self.words[y * self.words_per_row + x / WORD_BITS];
        (word >> (x % WORD_BITS)) & 1 != 0
    }

    pub fn at(&self, point: Point) -> bool {
        self.get(point.x as usize, point.y as usize)
    }

    /// Bit at `point`, or `fallback` outside the map.
    pub fn get_or(&self, point: Point, fallback: bool) -> bool {
        if self.rect().contains(point) {
            self.at(point)
        } else {
            fallback
        }
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        let word = &mut self.words[y * self.words_per_row + x / WORD_BITS];
        let bit = 1u64 << (x % WORD_BITS);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    pub fn set_at(&mut self, point: Point, value: bool) {
        self.set(point.x as usize, point.y as usize, value);
    }

    pub fn and(&mut self, other: &BinaryMap) {
        self.combine(other, |a, b| a & b);
    }

    pub fn or(&mut self, other: &BinaryMap) {
        self.combine(other, |a, b| a | b);
    }

    pub fn and_not(&mut self, other: &BinaryMap) {
        self.combine(other, |a, b| a & !b);
    }

    pub fn invert(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.clear_padding();
    }

    pub fn inverted(&self) -> BinaryMap {
        let mut inverted = self.clone();
        inverted.invert();
        inverted
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Expands a block-resolution map to pixel resolution.
    pub fn fill_blocks(&self, blocks: &BlockMap) -> BinaryMap {
        let (width, height) = blocks.pixel_size();
        let mut pixels = BinaryMap::new(width, height);
        for block in blocks.blocks() {
            if self.at(block) {
                for point in blocks.block_area(block).points() {
                    pixels.set_at(point, true);
                }
            }
        }
        pixels
    }

    /// Words per row in the backing storage.
    pub(crate) fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    /// Mutable backing storage, one `words_per_row` band per row.
    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    fn combine(&mut self, other: &BinaryMap, op: impl Fn(u64, u64) -> u64) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        for (word, &rhs) in self.words.iter_mut().zip(&other.words) {
            *word = op(*word, rhs);
        }
        self.clear_padding();
    }

    fn clear_padding(&mut self) {
        let tail = self.width % WORD_BITS;
        if tail == 0 || self.words_per_row == 0 {
            return;
        }
        let mask = (1u64 << tail) - 1;
        for row in self.words.chunks_mut(self.words_per_row) {
            if let Some(last) = row.last_mut() {
                *last &= mask;
            }
        }
    }
}

/// Sets bit `x` within a single row band returned by `BinaryMap::words_mut`.
pub(crate) fn set_row_bit(row: &mut [u64], x: usize) {
    row[x / WORD_BITS] |= 1u64 << (x % WORD_BITS);
}

impl std::fmt::Debug for BinaryMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryMap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("ones", &self.count_ones())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::BinaryMap;
    use crate::geometry::Point;
    use crate::grid::BlockMap;

    #[test]
    fn bitwise_operations() {
        let mut a = BinaryMap::new(70, 3);
        let mut b = BinaryMap::new(70, 3);
        a.set(1, 1, true);
        a.set(65, 2, true);
        b.set(65, 2, true);
        b.set(3, 0, true);

        let mut and = a.clone();
        and.and(&b);
        assert_eq!(and.count_ones(), 1);
        assert!(and.get(65, 2));

        let mut or = a.clone();
        or.or(&b);
        assert_eq!(or.count_ones(), 3);

        let mut and_not = a.clone();
        and_not.and_not(&b);
        assert_eq!(and_not.count_ones(), 1);
        assert!(and_not.get(1, 1));
    }

    #[test]
    fn invert_ignores_row_padding() {
        let mut map = BinaryMap::new(70, 3);
        map.set(0, 0, true);
        map.invert();
        assert_eq!(map.count_ones(), 70 * 3 - 1);
        assert!(!map.get_or(Point::new(70, 0), false));
    }

    #[test]
    fn fill_blocks_expands_to_pixels() {
        let blocks = BlockMap::new(20, 10, 10).unwrap();
        let mut mask = BinaryMap::new(2, 1);
        mask.set(1, 0, true);
        let pixels = mask.fill_blocks(&blocks);
        assert_eq!(pixels.count_ones(), 100);
        assert!(pixels.get(10, 0));
        assert!(!pixels.get(9, 9));
    }
}
