//! Detector pipelines and their shared result type.
//!
//! Both pipelines follow the same shape: candidates are generated, filtered,
//! merged, then drawn onto an RGB clone of the source image.

mod color;
mod template;

pub use color::{ColorConfig, ColorDetector};
pub use template::{MatchConfig, TemplateDetector};

use crate::color::ColorRange;
use crate::geometry::Region;
use crate::image::Image;
use crate::util::RegionScanResult;
use std::time::Duration;

/// Detector-specific part of a [`DetectionResult`].
#[derive(Clone, Debug, PartialEq)]
pub enum Summary {
    /// Accepted regions per color, in color-table order.
    ColorCounts(Vec<(String, usize)>),
    /// Merged template matches.
    Matches {
        /// Number of merged regions.
        count: usize,
        /// Highest correlation among them.
        best_score: Option<f32>,
    },
}

/// Outcome of one analysis call.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    annotated: Image,
    duration: Duration,
    source_size: (usize, usize),
    regions: Vec<Region>,
    summary: Summary,
}

impl DetectionResult {
    pub(crate) fn new(
        annotated: Image,
        duration: Duration,
        source_size: (usize, usize),
        regions: Vec<Region>,
        summary: Summary,
    ) -> Self {
        Self {
            annotated,
            duration,
            source_size,
            regions,
            summary,
        }
    }

    /// RGB clone of the source with boxes and labels drawn on it.
    pub fn annotated_image(&self) -> &Image {
        &self.annotated
    }

    /// Consumes the result and returns the annotated image.
    pub fn into_annotated_image(self) -> Image {
        self.annotated
    }

    /// Wall-clock time spent in the call.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Wall-clock time in whole milliseconds.
    pub fn processing_time_ms(&self) -> u128 {
        self.duration.as_millis()
    }

    /// `(width, height)` of the source image.
    pub fn source_size(&self) -> (usize, usize) {
        self.source_size
    }

    /// Accepted regions in detection order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Detector-specific summary.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Per-color counts for color detections.
    pub fn color_counts(&self) -> Option<&[(String, usize)]> {
        match &self.summary {
            Summary::ColorCounts(counts) => Some(counts),
            Summary::Matches { .. } => None,
        }
    }

    /// Count for one color name, if the run included it.
    pub fn count_for(&self, name: &str) -> Option<usize> {
        self.color_counts()?
            .iter()
            .find(|(label, _)| label == name)
            .map(|&(_, count)| count)
    }

    /// Number of reported regions.
    pub fn detected_count(&self) -> usize {
        self.regions.len()
    }
}

/// Runs color detection with default cleanup parameters.
pub fn detect_color_regions(
    image: &Image,
    ranges: &[ColorRange],
    min_coverage_percent: f64,
) -> RegionScanResult<DetectionResult> {
    let detector = ColorDetector::new(ColorConfig {
        min_coverage_percent,
        ..ColorConfig::default()
    });
    detector.detect(image, ranges)
}

/// Runs template detection; `None` selects the reference defaults.
pub fn detect_template_matches(
    image: &Image,
    template: &Image,
    scales: Option<&[f32]>,
    rotations_deg: Option<&[f32]>,
    threshold: Option<f32>,
) -> RegionScanResult<DetectionResult> {
    let mut cfg = MatchConfig::default();
    if let Some(scales) = scales {
        cfg.scales = scales.to_vec();
    }
    if let Some(rotations) = rotations_deg {
        cfg.rotations_deg = rotations.to_vec();
    }
    if let Some(threshold) = threshold {
        cfg.threshold = threshold;
    }
    TemplateDetector::new(cfg).detect(image, template)
}
