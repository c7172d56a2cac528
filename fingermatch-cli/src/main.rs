use clap::Parser;
use fingermatch::diagnostics::TracingSink;
use fingermatch::image::io::load_gray_image;
use fingermatch::{
    Extractor, ExtractorConfig, Matcher, MatcherConfig, Minutia, MinutiaKind, Template, Tunable,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Fingermatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Print every tunable parameter with its range and exit.
    #[arg(long)]
    print_parameters: bool,
    /// Enable tracing output, including per-stage extraction diagnostics.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ExtractorConfigJson {
    block_size: usize,
    inner_mask_border: usize,
    /// Dotted parameter paths, e.g. `segmentation.mask_vote.radius`.
    overrides: BTreeMap<String, f64>,
}

impl Default for ExtractorConfigJson {
    fn default() -> Self {
        let cfg = ExtractorConfig::default();
        Self {
            block_size: cfg.block_size,
            inner_mask_border: cfg.inner_mask_border,
            overrides: BTreeMap::new(),
        }
    }
}

impl ExtractorConfigJson {
    fn build(&self) -> fingermatch::FingerResult<ExtractorConfig> {
        let mut cfg = ExtractorConfig {
            block_size: self.block_size,
            inner_mask_border: self.inner_mask_border,
            ..ExtractorConfig::default()
        };
        for (path, &value) in &self.overrides {
            cfg.set_parameter(path, value)?;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatcherConfigJson {
    max_tried_roots: usize,
    max_distance: i32,
    max_neighbors: usize,
    max_distance_error: i32,
    max_angle_error: u8,
    overrides: BTreeMap<String, f64>,
}

impl Default for MatcherConfigJson {
    fn default() -> Self {
        let cfg = MatcherConfig::default();
        Self {
            max_tried_roots: cfg.max_tried_roots,
            max_distance: cfg.edge_table.max_distance,
            max_neighbors: cfg.edge_table.max_neighbors,
            max_distance_error: cfg.edge_lookup.max_distance_error,
            max_angle_error: cfg.edge_lookup.max_angle_error,
            overrides: BTreeMap::new(),
        }
    }
}

impl MatcherConfigJson {
    /// Builds the matcher config, scaling distances from 500 dpi to `dpi`.
    fn build(&self, dpi: u32) -> fingermatch::FingerResult<MatcherConfig> {
        let mut cfg = MatcherConfig {
            max_tried_roots: self.max_tried_roots,
            ..MatcherConfig::default()
        };
        cfg.edge_table.max_distance = self.max_distance;
        cfg.edge_table.max_neighbors = self.max_neighbors;
        cfg.edge_lookup.max_distance_error = self.max_distance_error;
        cfg.edge_lookup.max_angle_error = self.max_angle_error;
        for (path, &value) in &self.overrides {
            cfg.set_parameter(path, value)?;
        }
        cfg.adjust_for_dpi(fingermatch::params::dpi_ratio(dpi)?);
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    probe_path: String,
    candidate_path: Option<String>,
    dpi: u32,
    output_path: Option<String>,
    extractor: ExtractorConfigJson,
    matcher: MatcherConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_path: String::new(),
            candidate_path: None,
            dpi: fingermatch::params::REFERENCE_DPI,
            output_path: None,
            extractor: ExtractorConfigJson::default(),
            matcher: MatcherConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum KindRecord {
    Ending,
    Bifurcation,
}

#[derive(Debug, Serialize)]
struct MinutiaRecord {
    x: i32,
    y: i32,
    direction: u8,
    kind: KindRecord,
}

impl From<&Minutia> for MinutiaRecord {
    fn from(value: &Minutia) -> Self {
        Self {
            x: value.position.x,
            y: value.position.y,
            direction: value.direction,
            kind: match value.kind {
                MinutiaKind::Ending => KindRecord::Ending,
                MinutiaKind::Bifurcation => KindRecord::Bifurcation,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct TemplateRecord {
    minutiae: Vec<MinutiaRecord>,
}

impl From<&Template> for TemplateRecord {
    fn from(value: &Template) -> Self {
        Self {
            minutiae: value.minutiae().iter().map(MinutiaRecord::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    probe: TemplateRecord,
    candidate: Option<TemplateRecord>,
    score: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ParameterRecord {
    path: String,
    value: f64,
    lower: f64,
    upper: f64,
    dpi_scaled: bool,
}

fn parameter_records(prefix: &str, parameters: Vec<fingermatch::params::Parameter>) -> Vec<ParameterRecord> {
    parameters
        .into_iter()
        .map(|p| ParameterRecord {
            path: format!("{prefix}.{}", p.path),
            value: p.value,
            lower: p.lower,
            upper: p.upper,
            dpi_scaled: p.dpi_scaled,
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("fingermatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }
    if cli.print_parameters {
        let mut records = parameter_records("extractor", ExtractorConfig::default().parameters());
        records.extend(parameter_records("matcher", MatcherConfig::default().parameters()));
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.probe_path.is_empty() {
        return Err("probe_path must be set in the config".into());
    }

    let mut extractor = Extractor::new(config.extractor.build()?)?;
    if cli.trace {
        extractor = extractor.with_sink(Arc::new(TracingSink));
    }

    let probe_image = load_gray_image(&config.probe_path)?;
    let probe = extractor.extract(probe_image.view(), config.dpi)?;
    tracing::info!(minutiae = probe.len(), "probe extracted");

    let mut candidate = None;
    let mut score = None;
    if let Some(path) = &config.candidate_path {
        let candidate_image = load_gray_image(path)?;
        let template = extractor.extract(candidate_image.view(), config.dpi)?;
        tracing::info!(minutiae = template.len(), "candidate extracted");
        let mut matcher = Matcher::new(config.matcher.build(config.dpi)?)?;
        score = Some(matcher.match_templates(&probe, &template));
        candidate = Some(template);
    }

    let output = Output {
        probe: TemplateRecord::from(&probe),
        candidate: candidate.as_ref().map(TemplateRecord::from),
        score,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
