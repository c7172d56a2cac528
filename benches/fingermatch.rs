use fingermatch::{
    Extractor, ExtractorConfig, Matcher, MatcherConfig, Minutia, MinutiaKind, OwnedImage, Point,
    Scheduler, Template,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::f64::consts::PI;
use std::hint::black_box;

fn make_print(width: usize, height: usize) -> OwnedImage {
    let (cx, cy) = (width as f64 * 0.45, height as f64 * 0.55);
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            let phase = 2.0 * PI * (dx * dx + dy * dy).sqrt() / 9.0 + dy.atan2(dx) * 1.5;
            data.push((128.0 + 100.0 * phase.sin()) as u8);
        }
    }
    OwnedImage::new(data, width, height).unwrap()
}

fn make_template(count: usize, seed: u32) -> Template {
    (0..count as u32)
        .map(|i| {
            let hash = (i.wrapping_mul(2_654_435_761) ^ seed).rotate_left(13);
            let x = (hash % 320) as i32;
            let y = ((hash >> 9) % 380) as i32;
            let kind = if hash & 1 == 0 {
                MinutiaKind::Ending
            } else {
                MinutiaKind::Bifurcation
            };
            Minutia::new(Point::new(x, y), (hash >> 20) as u8, kind)
        })
        .collect::<Vec<_>>()
        .into()
}

fn bench_extraction(c: &mut Criterion) {
    let image = make_print(320, 384);
    let inline = Extractor::new(ExtractorConfig::default()).unwrap();
    c.bench_function("extract_320x384_inline", |b| {
        b.iter(|| black_box(inline.extract(image.view(), 500).unwrap()));
    });

    let pooled = Extractor::new(ExtractorConfig::default())
        .unwrap()
        .with_scheduler(Scheduler::new());
    c.bench_function("extract_320x384_pool", |b| {
        b.iter(|| black_box(pooled.extract(image.view(), 500).unwrap()));
    });
}

fn bench_matching(c: &mut Criterion) {
    let probe = make_template(40, 0x5eed);
    let unrelated = make_template(40, 0xbeef);
    let mut matcher = Matcher::new(MatcherConfig::default()).unwrap();
    let index = matcher.create_index(&probe);

    c.bench_function("match_self_40", |b| {
        b.iter(|| black_box(matcher.match_candidate(&index, &probe)));
    });
    c.bench_function("match_unrelated_40", |b| {
        b.iter(|| black_box(matcher.match_candidate(&index, &unrelated)));
    });
    c.bench_function("create_index_40", |b| {
        b.iter(|| black_box(matcher.create_index(&probe)));
    });
}

criterion_group!(benches, bench_extraction, bench_matching);
criterion_main!(benches);
