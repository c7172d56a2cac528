use fingermatch::angle;
use fingermatch::geometry::Point;
use fingermatch::grid::BlockMap;
use fingermatch::FingerError;

#[test]
fn byte_angles_round_trip() {
    for byte in 0..=255u8 {
        assert_eq!(angle::to_byte(angle::to_radians(byte)), byte);
    }
}

#[test]
fn distance_is_symmetric_and_bounded() {
    for a in (0..=255u8).step_by(7) {
        for b in (0..=255u8).step_by(5) {
            let d = angle::distance(a, b);
            assert_eq!(d, angle::distance(b, a));
            assert!(d <= angle::B180);
            assert_eq!(angle::distance(a, angle::add(a, d)), d);
        }
    }
}

#[test]
fn polar_matches_direct_computation() {
    for &(dx, dy) in &[(3, 4), (-12, 5), (0, -30), (200, -90), (-700, -240)] {
        let polar = angle::to_polar(dx, dy);
        let exact = ((dx * dx + dy * dy) as f64).sqrt();
        let tolerance = if exact > 255.0 { exact / 64.0 } else { 0.5 };
        assert!((polar.distance as f64 - exact).abs() <= tolerance, "{dx},{dy}");
        let direct = angle::atan_byte(Point::ZERO, Point::new(dx, dy));
        assert!(angle::distance(polar.angle, direct) <= 2, "{dx},{dy}");
    }
}

#[test]
fn blocks_tile_the_image_exactly_once() {
    for &(width, height) in &[(1, 1), (17, 5), (64, 64), (250, 333), (500, 31)] {
        for block_size in [1, 3, 8, 16, 33] {
            let blocks = BlockMap::new(width, height, block_size).unwrap();
            let mut covered = vec![0u8; width * height];
            for block in blocks.blocks() {
                let area = blocks.block_area(block);
                assert!(area.width <= block_size as i32 && area.height <= block_size as i32);
                for p in area.points() {
                    covered[p.y as usize * width + p.x as usize] += 1;
                    assert_eq!(blocks.block_at(p), block);
                }
            }
            assert!(covered.iter().all(|&count| count == 1));
            let (columns, rows) = blocks.block_count();
            assert_eq!(blocks.corner_count(), (columns + 1, rows + 1));
        }
    }
}

#[test]
fn degenerate_grids_are_rejected() {
    assert_eq!(BlockMap::new(10, 10, 0), Err(FingerError::InvalidBlockSize(0)));
    assert_eq!(
        BlockMap::new(0, 10, 4),
        Err(FingerError::InvalidDimensions {
            width: 0,
            height: 10
        })
    );
}
