//! Small numeric helpers shared by the extraction stages.

/// Linear interpolation between `start` and `end`.
pub(crate) fn interpolate(start: f64, end: f64, position: f64) -> f64 {
    start + position * (end - start)
}

/// Bilinear interpolation over four corner values at relative position `(rx, ry)`.
pub(crate) fn interpolate_2d(
    top_left: f64,
    top_right: f64,
    bottom_left: f64,
    bottom_right: f64,
    rx: f64,
    ry: f64,
) -> f64 {
    interpolate(
        interpolate(top_left, top_right, rx),
        interpolate(bottom_left, bottom_right, rx),
        ry,
    )
}

/// Exponential interpolation, `start` at 0 and `end` at 1.
pub(crate) fn interpolate_exponential(start: f64, end: f64, position: f64) -> f64 {
    (end / start).powf(position) * start
}

/// Index of the `i`-th boundary when splitting `[begin, end)` into `count` parts.
pub(crate) fn split_point(begin: usize, end: usize, i: usize, count: usize) -> usize {
    begin + (end - begin) * i / count
}

/// Number of significant bits in `value` (0 for 0).
pub(crate) fn bit_length(value: u32) -> u32 {
    32 - value.leading_zeros()
}
