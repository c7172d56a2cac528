//! Byte-quantized angle arithmetic.
//!
//! A full turn maps onto `0..=255`, so addition and difference are plain
//! wrapping byte arithmetic. Ridge orientation (180°-ambiguous) is stored in
//! "orientation space", where the angle is doubled and again spans a full byte.
//!
//! Trigonometric tables and the Cartesian-to-polar cache are built once per
//! process and are read-only afterwards.

use crate::geometry::Point;
use crate::util::math::bit_length;
use std::f64::consts::PI;
use std::sync::OnceLock;

/// Full turn in radians.
pub const PI2: f64 = 2.0 * PI;
/// Half turn as a byte angle.
pub const B180: u8 = 128;
pub const B90: u8 = B180 / 2;
pub const B60: u8 = B180 / 3;
pub const B45: u8 = B180 / 4;
pub const B30: u8 = B180 / 6;
pub const B15: u8 = B180 / 12;

const POLAR_CACHE_BITS: u32 = 8;
const POLAR_CACHE_RADIUS: usize = 1 << POLAR_CACHE_BITS;

/// Distance and byte direction of an integer vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolarPoint {
    pub distance: i32,
    pub angle: u8,
}

/// Quantizes a radian angle into `resolution` buckets, clamping out-of-range input.
pub fn quantize(radians: f64, resolution: usize) -> usize {
    let bucket = (radians / PI2 * resolution as f64) as i64;
    bucket.clamp(0, resolution as i64 - 1) as usize
}

/// Quantizes a byte angle into `resolution` buckets.
pub fn quantize_byte(angle: u8, resolution: usize) -> usize {
    angle as usize * resolution / 256
}

/// Radian angle at the center of `bucket` out of `resolution`.
pub fn bucket_center(bucket: usize, resolution: usize) -> f64 {
    PI2 * (2 * bucket + 1) as f64 / (2 * resolution) as f64
}

pub fn to_byte(radians: f64) -> u8 {
    quantize(radians, 256) as u8
}

/// Radian value of the center of the byte's 1/256 slice.
pub fn to_radians(angle: u8) -> f64 {
    bucket_center(angle as usize, 256)
}

pub fn add(a: u8, b: u8) -> u8 {
    a.wrapping_add(b)
}

pub fn difference(a: u8, b: u8) -> u8 {
    a.wrapping_sub(b)
}

pub fn complementary(angle: u8) -> u8 {
    angle.wrapping_neg()
}

pub fn opposite(angle: u8) -> u8 {
    angle.wrapping_add(B180)
}

/// Unsigned circular distance, never more than a half turn.
pub fn distance(a: u8, b: u8) -> u8 {
    let diff = difference(a, b);
    if diff <= B180 {
        diff
    } else {
        complementary(diff)
    }
}

/// Doubles a direction into orientation space.
pub fn to_orientation(direction: u8) -> u8 {
    direction.wrapping_mul(2)
}

/// Halves an orientation back to a direction in the upper half turn.
pub fn to_direction(orientation: u8) -> u8 {
    orientation / 2
}

pub fn from_degrees(degrees: i32) -> u8 {
    ((degrees * 256 + 180) / 360) as u8
}

pub fn to_degrees(angle: u8) -> i32 {
    (angle as i32 * 360 + 128) / 256
}

/// Angle of vector `(x, y)` in `[0, 2π)`.
pub fn atan(x: f64, y: f64) -> f64 {
    let angle = y.atan2(x);
    if angle < 0.0 {
        angle + PI2
    } else {
        angle
    }
}

/// Byte angle of the vector pointing from `from` to `to`.
pub fn atan_byte(from: Point, to: Point) -> u8 {
    let relative = to - from;
    to_byte(atan(relative.x as f64, relative.y as f64))
}

struct TrigTables {
    sin: [f64; 256],
    cos: [f64; 256],
}

fn trig_tables() -> &'static TrigTables {
    static TABLES: OnceLock<TrigTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut sin = [0.0; 256];
        let mut cos = [0.0; 256];
        for i in 0..256 {
            let radians = to_radians(i as u8);
            sin[i] = radians.sin();
            cos[i] = radians.cos();
        }
        TrigTables { sin, cos }
    })
}

pub fn sin(angle: u8) -> f64 {
    trig_tables().sin[angle as usize]
}

pub fn cos(angle: u8) -> f64 {
    trig_tables().cos[angle as usize]
}

#[derive(Clone, Copy, Default)]
struct PolarEntry {
    distance: u16,
    angle: u8,
}

fn polar_cache() -> &'static [PolarEntry] {
    static CACHE: OnceLock<Vec<PolarEntry>> = OnceLock::new();
    CACHE.get_or_init(|| {
        let mut cache = vec![PolarEntry::default(); POLAR_CACHE_RADIUS * POLAR_CACHE_RADIUS];
        for y in 0..POLAR_CACHE_RADIUS {
            for x in 0..POLAR_CACHE_RADIUS {
                let entry = &mut cache[y * POLAR_CACHE_RADIUS + x];
                entry.distance = ((x * x + y * y) as f64).sqrt().round() as u16;
                if x > 0 || y > 0 {
                    entry.angle = atan_byte(Point::ZERO, Point::new(x as i32, y as i32));
                }
            }
        }
        cache
    })
}

/// Converts an integer vector to polar form through the cache.
///
/// Vectors are folded into the first quadrant; components beyond the cache
/// radius are shifted down until they fit and the distance is shifted back, so
/// the error for long vectors is bounded by the shift granularity.
pub fn to_polar(dx: i32, dy: i32) -> PolarPoint {
    let mut x = dx;
    let mut y = dy;
    let mut quadrant = 0u8;
    if y < 0 {
        x = -x;
        y = -y;
        quadrant = B180;
    }
    if x < 0 {
        let folded = -x;
        x = y;
        y = folded;
        quadrant = quadrant.wrapping_add(B90);
    }
    let shift = bit_length((x | y) as u32 >> POLAR_CACHE_BITS);
    let entry = polar_cache()[(y >> shift) as usize * POLAR_CACHE_RADIUS + (x >> shift) as usize];
    PolarPoint {
        distance: (entry.distance as i32) << shift,
        angle: entry.angle.wrapping_add(quadrant),
    }
}
