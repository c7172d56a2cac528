use fingermatch::lowlevel::{MinutiaPair, Pairing};
use fingermatch::{match_score, Matcher, MatcherConfig, Minutia, MinutiaKind, Point, Template};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random template with minutiae at least `spacing` pixels apart.
fn random_template(rng: &mut StdRng, count: usize, size: i32, spacing: i64) -> Template {
    let mut minutiae: Vec<Minutia> = Vec::with_capacity(count);
    while minutiae.len() < count {
        let position = Point::new(rng.random_range(0..size), rng.random_range(0..size));
        if minutiae
            .iter()
            .any(|m| (m.position - position).length_sq() < spacing * spacing)
        {
            continue;
        }
        let kind = if rng.random_bool(0.5) {
            MinutiaKind::Ending
        } else {
            MinutiaKind::Bifurcation
        };
        minutiae.push(Minutia::new(position, rng.random(), kind));
    }
    Template::new(minutiae)
}

/// Rotates positions and directions by `quarter_turns * 90°` and shifts them.
fn rotated(template: &Template, quarter_turns: u8, shift: Point) -> Template {
    template
        .minutiae()
        .iter()
        .map(|m| {
            let mut p = m.position;
            for _ in 0..quarter_turns {
                p = Point::new(-p.y, p.x);
            }
            Minutia::new(
                p + shift,
                m.direction.wrapping_add(quarter_turns.wrapping_mul(64)),
                m.kind,
            )
        })
        .collect::<Vec<_>>()
        .into()
}

#[test]
fn self_match_beats_partial_overlap() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let probe = random_template(&mut rng, 30, 300, 15);
        let subset: Template = probe.minutiae()[..20].to_vec().into();
        let own = match_score(&probe, &probe).unwrap();
        let partial = match_score(&probe, &subset).unwrap();
        assert!(own >= partial, "{own} < {partial}");
        assert!(partial > 0.0);
    }
}

#[test]
fn self_match_beats_unrelated_templates() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut matcher = Matcher::new(MatcherConfig::default()).unwrap();
    let probe = random_template(&mut rng, 25, 300, 15);
    let index = matcher.create_index(&probe);
    let own = matcher.match_candidate(&index, &probe);
    assert!(matcher.best_pairing().len() > 1);
    for _ in 0..5 {
        let other = random_template(&mut rng, 25, 300, 15);
        assert!(matcher.match_candidate(&index, &other) < own);
    }
}

#[test]
fn rotation_and_translation_are_tolerated() {
    let mut rng = StdRng::seed_from_u64(23);
    let probe = random_template(&mut rng, 20, 250, 20);
    let turned = rotated(&probe, 1, Point::new(400, 30));
    let unrelated = random_template(&mut rng, 20, 250, 20);
    let turned_score = match_score(&probe, &turned).unwrap();
    assert!(turned_score > match_score(&probe, &unrelated).unwrap());
}

#[test]
fn asymmetric_scores_are_both_valid() {
    let mut rng = StdRng::seed_from_u64(5);
    let a = random_template(&mut rng, 18, 250, 12);
    let extra = random_template(&mut rng, 6, 250, 12);
    let b: Template = a.minutiae()[4..]
        .iter()
        .chain(&extra)
        .copied()
        .collect::<Vec<_>>()
        .into();
    let forward = match_score(&a, &b).unwrap();
    let backward = match_score(&b, &a).unwrap();
    assert!(forward.is_finite() && forward > 0.0);
    assert!(backward.is_finite() && backward > 0.0);
}

#[test]
fn single_minutia_templates_score_positive() {
    let minutia = Minutia::new(Point::new(40, 50), 30, MinutiaKind::Ending);
    let probe = Template::new(vec![minutia]);
    let score = match_score(&probe, &probe).unwrap();
    assert!((score - (0.48 + 0.1 + 8.26)).abs() < 1e-4, "{score}");
}

#[test]
fn empty_template_scores_zero() {
    let mut rng = StdRng::seed_from_u64(3);
    let some = random_template(&mut rng, 10, 200, 10);
    assert_eq!(match_score(&Template::default(), &some).unwrap(), 0.0);
    assert_eq!(match_score(&some, &Template::default()).unwrap(), 0.0);
}

#[test]
fn pairing_lookups_remain_inverse() {
    let mut rng = StdRng::seed_from_u64(99);
    let (probe_len, candidate_len) = (40, 55);
    let mut pairing = Pairing::new(probe_len, candidate_len);
    for round in 0..20 {
        if round % 5 == 0 {
            pairing.reset();
        }
        for _ in 0..30 {
            let pair = MinutiaPair::new(
                rng.random_range(0..probe_len),
                rng.random_range(0..candidate_len),
            );
            if !pairing.is_probe_paired(pair.probe)
                && !pairing.is_candidate_paired(pair.candidate)
            {
                pairing.add(pair);
            }
        }
        for probe in 0..probe_len {
            if let Some(candidate) = pairing.candidate_by_probe(probe) {
                assert_eq!(pairing.probe_by_candidate(candidate), Some(probe));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for pair in pairing.pairs() {
            assert!(seen.insert(("p", pair.probe)));
            assert!(seen.insert(("c", pair.candidate)));
        }
    }
}
