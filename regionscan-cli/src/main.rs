use clap::Parser;
use regionscan::image::io::{load_image, save_image};
use regionscan::{
    CloseMergePolicy, ColorConfig, ColorDetector, ColorRange, DetectionResult, MatchConfig,
    MergeStrategy, Region, Summary, TemplateDetector,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "RegionScan CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    #[default]
    Colors,
    Objects,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CloseMergeConfig {
    KeepFirst,
    Union,
}

impl From<CloseMergeConfig> for CloseMergePolicy {
    fn from(value: CloseMergeConfig) -> Self {
        match value {
            CloseMergeConfig::KeepFirst => CloseMergePolicy::KeepFirst,
            CloseMergeConfig::Union => CloseMergePolicy::Union,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MergeStrategyConfig {
    Sweep,
    Cluster,
}

impl From<MergeStrategyConfig> for MergeStrategy {
    fn from(value: MergeStrategyConfig) -> Self {
        match value {
            MergeStrategyConfig::Sweep => MergeStrategy::Sweep,
            MergeStrategyConfig::Cluster => MergeStrategy::Cluster,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ColorRangeJson {
    name: String,
    lower: [u8; 3],
    upper: [u8; 3],
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ColorsJson {
    /// Empty selects the built-in Red/Yellow/Green/Blue table.
    ranges: Vec<ColorRangeJson>,
    min_coverage_percent: f64,
    kernel_size: usize,
    min_area: f64,
    max_center_distance: f64,
    merge_policy: CloseMergeConfig,
}

impl Default for ColorsJson {
    fn default() -> Self {
        let cfg = ColorConfig::default();
        Self {
            ranges: Vec::new(),
            min_coverage_percent: cfg.min_coverage_percent,
            kernel_size: cfg.kernel_size,
            min_area: cfg.min_area,
            max_center_distance: cfg.max_center_distance,
            merge_policy: CloseMergeConfig::KeepFirst,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ObjectsJson {
    scales: Vec<f32>,
    rotations_deg: Vec<f32>,
    threshold: f32,
    min_template_size: usize,
    fill_value: u8,
    min_var_i: f32,
    merge: MergeStrategyConfig,
    parallel: bool,
    num_threads: Option<usize>,
}

impl Default for ObjectsJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            scales: cfg.scales,
            rotations_deg: cfg.rotations_deg,
            threshold: cfg.threshold,
            min_template_size: cfg.min_template_size,
            fill_value: cfg.fill_value,
            min_var_i: cfg.min_var_i,
            merge: MergeStrategyConfig::Sweep,
            parallel: cfg.parallel,
            num_threads: cfg.num_threads,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    mode: Mode,
    image_path: String,
    template_path: String,
    output_image_path: Option<String>,
    report_path: Option<String>,
    colors: ColorsJson,
    objects: ObjectsJson,
}

#[derive(Debug, Serialize)]
struct ImageSize {
    width: usize,
    height: usize,
}

#[derive(Debug, Serialize)]
struct ColorCount {
    name: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct RegionRecord {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coverage_percent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f32>,
}

impl From<&Region> for RegionRecord {
    fn from(value: &Region) -> Self {
        Self {
            x: value.rect.x,
            y: value.rect.y,
            width: value.rect.width,
            height: value.rect.height,
            label: value.label.clone(),
            coverage_percent: value.coverage.map(|c| c * 100.0),
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    file_name: String,
    processing_time_ms: u128,
    image_size: ImageSize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    counts: Vec<ColorCount>,
    detected_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_score: Option<f32>,
    regions: Vec<RegionRecord>,
}

impl Report {
    fn new(image_path: &str, result: &DetectionResult) -> Self {
        let file_name = Path::new(image_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| image_path.to_string());
        let (width, height) = result.source_size();
        let (counts, best_score) = match result.summary() {
            Summary::ColorCounts(counts) => (
                counts
                    .iter()
                    .map(|(name, count)| ColorCount {
                        name: name.clone(),
                        count: *count,
                    })
                    .collect(),
                None,
            ),
            Summary::Matches { best_score, .. } => (Vec::new(), *best_score),
        };
        Self {
            file_name,
            processing_time_ms: result.processing_time_ms(),
            image_size: ImageSize { width, height },
            counts,
            detected_count: result.detected_count(),
            best_score,
            regions: result.regions().iter().map(RegionRecord::from).collect(),
        }
    }
}

fn run_colors(config: &Config) -> Result<DetectionResult, Box<dyn std::error::Error>> {
    let ranges = if config.colors.ranges.is_empty() {
        ColorRange::reference_table()
    } else {
        config
            .colors
            .ranges
            .iter()
            .map(|r| ColorRange::new(r.name.clone(), r.lower, r.upper))
            .collect::<Result<Vec<_>, _>>()?
    };
    let colors = &config.colors;
    let detector = ColorDetector::new(ColorConfig {
        kernel_size: colors.kernel_size,
        min_area: colors.min_area,
        max_center_distance: colors.max_center_distance,
        min_coverage_percent: colors.min_coverage_percent,
        merge_policy: colors.merge_policy.into(),
        ..ColorConfig::default()
    });
    let image = load_image(&config.image_path)?;
    Ok(detector.detect(&image, &ranges)?)
}

fn run_objects(config: Config) -> Result<DetectionResult, Box<dyn std::error::Error>> {
    if config.template_path.is_empty() {
        return Err("template_path must be set in objects mode".into());
    }
    let objects = config.objects;
    let detector = TemplateDetector::new(MatchConfig {
        scales: objects.scales,
        rotations_deg: objects.rotations_deg,
        threshold: objects.threshold,
        min_template_size: objects.min_template_size,
        fill_value: objects.fill_value,
        min_var_i: objects.min_var_i,
        merge: objects.merge.into(),
        parallel: objects.parallel,
        num_threads: objects.num_threads,
        ..MatchConfig::default()
    });
    let image = load_image(&config.image_path)?;
    let template = load_image(&config.template_path)?;
    Ok(detector.detect(&image, &template)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("regionscan=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let image_path = config.image_path.clone();
    let output_image_path = config.output_image_path.clone();
    let report_path = config.report_path.clone();
    let result = match config.mode {
        Mode::Colors => run_colors(&config)?,
        Mode::Objects => run_objects(config)?,
    };

    if let Some(path) = output_image_path {
        save_image(result.annotated_image(), path)?;
    }

    let report = Report::new(&image_path, &result);
    let json = serde_json::to_string_pretty(&report)?;
    match report_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
