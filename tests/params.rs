use fingermatch::lowlevel::dpi_ratio;
use fingermatch::{ExtractorConfig, FingerError, Matcher, MatcherConfig, Tunable};

#[test]
fn matcher_parameters_cover_nested_configs() {
    let paths: Vec<String> = MatcherConfig::default()
        .parameters()
        .into_iter()
        .map(|p| p.path)
        .collect();
    for expected in [
        "max_tried_roots",
        "edge_table.max_distance",
        "edge_table.max_neighbors",
        "edge_lookup.max_distance_error",
        "edge_lookup.max_angle_error",
        "scoring.pair_fraction_factor",
    ] {
        assert!(paths.iter().any(|p| p == expected), "missing {expected}");
    }
}

#[test]
fn unknown_and_out_of_range_parameters_are_rejected() {
    let mut config = MatcherConfig::default();
    assert!(matches!(
        config.set_parameter("edge_table.nonsense", 1.0),
        Err(FingerError::UnknownParameter(_))
    ));
    match config.set_parameter("edge_lookup.max_angle_error", 200.0) {
        Err(FingerError::ParameterOutOfRange { name, .. }) => {
            assert_eq!(name, "edge_lookup.max_angle_error")
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(config, MatcherConfig::default());
}

#[test]
fn doubling_resolution_doubles_distances_only() {
    let mut config = MatcherConfig::default();
    config.adjust_for_dpi(dpi_ratio(1000).unwrap());
    let defaults = MatcherConfig::default();
    assert_eq!(config.edge_table.max_distance, 2 * defaults.edge_table.max_distance);
    assert_eq!(
        config.edge_lookup.max_distance_error,
        2 * defaults.edge_lookup.max_distance_error
    );
    assert_eq!(config.edge_table.max_neighbors, defaults.edge_table.max_neighbors);
    assert_eq!(config.edge_lookup.max_angle_error, defaults.edge_lookup.max_angle_error);
    assert!(Matcher::new(config).is_ok());
}

#[test]
fn extractor_parameters_report_dpi_tags() {
    let parameters = ExtractorConfig::default().parameters();
    let block = parameters.iter().find(|p| p.path == "block_size").unwrap();
    assert!(block.dpi_scaled);
    assert_eq!(block.value, 16.0);
    let clip = parameters
        .iter()
        .find(|p| p.path == "segmentation.clipped_contrast")
        .unwrap();
    assert!(!clip.dpi_scaled);
    assert!(parameters.iter().all(|p| p.lower <= p.value && p.value <= p.upper));
}

#[test]
fn zero_dpi_has_no_ratio() {
    assert_eq!(dpi_ratio(0), Err(FingerError::InvalidDpi(0)));
    assert_eq!(dpi_ratio(500), Ok(1.0));
}
