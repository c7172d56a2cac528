#![cfg(feature = "rayon")]

use fingermatch::{Extractor, ExtractorConfig, OwnedImage, Scheduler};

fn make_print(width: usize, height: usize) -> OwnedImage {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let wave = ((x as f64 * 0.7 + y as f64 * 0.2 + (y as f64 * 0.05).sin() * 6.0) / 1.4).sin();
            data.push((128.0 + 110.0 * wave) as u8);
        }
    }
    OwnedImage::new(data, width, height).unwrap()
}

#[test]
fn rayon_matches_inline() {
    let image = make_print(176, 144);
    let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
    let inline = extractor
        .clone()
        .with_scheduler(Scheduler::inline())
        .extract(image.view(), 500)
        .unwrap();
    let parallel = extractor
        .with_scheduler(Scheduler::rayon())
        .extract(image.view(), 500)
        .unwrap();
    assert_eq!(inline, parallel);
}
