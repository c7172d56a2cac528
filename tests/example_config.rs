//! The CLI's example config must stay loadable by the library.

use fingermatch::{ExtractorConfig, Matcher, MatcherConfig, Tunable};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractorSection {
    block_size: Option<f64>,
    inner_mask_border: Option<f64>,
    overrides: BTreeMap<String, f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MatcherSection {
    max_tried_roots: Option<f64>,
    max_distance: Option<f64>,
    max_neighbors: Option<f64>,
    max_distance_error: Option<f64>,
    max_angle_error: Option<f64>,
    overrides: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ExampleConfig {
    dpi: u32,
    extractor: ExtractorSection,
    matcher: MatcherSection,
}

fn load_example() -> ExampleConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fingermatch-cli/config.example.json");
    let text = fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn apply<T: Tunable>(config: &mut T, values: impl IntoIterator<Item = (String, f64)>) {
    for (path, value) in values {
        config
            .set_parameter(&path, value)
            .unwrap_or_else(|err| panic!("{path}: {err}"));
    }
}

#[test]
fn example_extractor_section_is_valid() {
    let example = load_example();
    assert_eq!(example.dpi, 500);
    let section = example.extractor;
    let mut config = ExtractorConfig::default();
    let named = [
        ("block_size", section.block_size),
        ("inner_mask_border", section.inner_mask_border),
    ];
    apply(
        &mut config,
        named
            .into_iter()
            .filter_map(|(path, value)| value.map(|v| (path.to_string(), v)))
            .chain(section.overrides),
    );
    assert!(config.validate().is_ok());
}

#[test]
fn example_matcher_section_is_valid() {
    let section = load_example().matcher;
    let mut config = MatcherConfig::default();
    let named = [
        ("max_tried_roots", section.max_tried_roots),
        ("edge_table.max_distance", section.max_distance),
        ("edge_table.max_neighbors", section.max_neighbors),
        ("edge_lookup.max_distance_error", section.max_distance_error),
        ("edge_lookup.max_angle_error", section.max_angle_error),
    ];
    apply(
        &mut config,
        named
            .into_iter()
            .filter_map(|(path, value)| value.map(|v| (path.to_string(), v)))
            .chain(section.overrides),
    );
    assert_eq!(config, MatcherConfig::default());
    assert!(Matcher::new(config).is_ok());
}
