//! Fixed-range color segmentation.

use crate::annotate::{draw_label, draw_rect, BLACK, GREEN};
use crate::color::{image_to_hsv, ColorRange, Hsv};
use crate::components::outermost_components;
use crate::detect::{DetectionResult, Summary};
use crate::geometry::Region;
use crate::image::Image;
use crate::merge::{reduce_close, CloseMergePolicy};
use crate::morph::{clean, StructuringElement};
use crate::trace::{trace_event, trace_span};
use crate::util::{RegionScanError, RegionScanResult};
use std::time::Instant;

/// Parameters of the color pipeline.
#[derive(Clone, Debug)]
pub struct ColorConfig {
    /// Odd side of the square element used by close and open.
    pub kernel_size: usize,
    /// Components with a filled area below this are noise.
    pub min_area: f64,
    /// Candidates whose centers are closer than this are reduced to one.
    pub max_center_distance: f64,
    /// Regions covering less of their box than this (0-100) are rejected.
    pub min_coverage_percent: f64,
    /// What happens to the later of two close candidates.
    pub merge_policy: CloseMergePolicy,
    /// Box outline color.
    pub box_color: [u8; 3],
    /// Label text color.
    pub label_color: [u8; 3],
    /// Box outline thickness in pixels.
    pub thickness: usize,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            min_area: 500.0,
            max_center_distance: 20.0,
            min_coverage_percent: 0.0,
            merge_policy: CloseMergePolicy::KeepFirst,
            box_color: GREEN,
            label_color: BLACK,
            thickness: 2,
        }
    }
}

impl ColorConfig {
    fn validate(&self) -> RegionScanResult<()> {
        if !(0.0..=100.0).contains(&self.min_coverage_percent) {
            return Err(RegionScanError::InvalidInput(
                "min_coverage_percent must be within 0..=100",
            ));
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(RegionScanError::InvalidInput("min_area must be >= 0"));
        }
        if !self.max_center_distance.is_finite() || self.max_center_distance < 0.0 {
            return Err(RegionScanError::InvalidInput(
                "max_center_distance must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Formats the annotation text for an accepted region.
pub(crate) fn coverage_label(name: &str, coverage: f32) -> String {
    format!("{name}: {:.2}%", coverage * 100.0)
}

/// Detects regions of named colors.
#[derive(Clone, Debug, Default)]
pub struct ColorDetector {
    cfg: ColorConfig,
}

impl ColorDetector {
    /// Creates a detector with the given configuration.
    pub fn new(cfg: ColorConfig) -> Self {
        Self { cfg }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ColorConfig {
        &self.cfg
    }

    /// Finds accepted regions for one range, without annotating.
    ///
    /// `hsv` is the row-major HSV conversion of a `width x height` image.
    pub fn regions_for_range(
        &self,
        hsv: &[Hsv],
        width: usize,
        height: usize,
        range: &ColorRange,
    ) -> RegionScanResult<Vec<Region>> {
        let _span = trace_span!("color_range", color = range.name()).entered();
        let element = StructuringElement::square(self.cfg.kernel_size)?;

        let mask = clean(&range.mask(hsv, width, height)?, element);
        let components = outermost_components(&mask);
        // Last-scanned components lead, so the lowest of two close blobs anchors
        // the reduction.
        let sized: Vec<_> = components
            .iter()
            .rev()
            .filter(|c| c.filled_area as f64 >= self.cfg.min_area)
            .map(|c| c.rect)
            .collect();
        let reduced = reduce_close(&sized, self.cfg.max_center_distance, self.cfg.merge_policy);

        let mut accepted = Vec::with_capacity(reduced.len());
        for rect in reduced {
            let Some(rect) = rect.clamp_to(width, height) else {
                continue;
            };
            let coverage = mask.coverage(&rect);
            if f64::from(coverage) * 100.0 >= self.cfg.min_coverage_percent {
                accepted.push(
                    Region::new(rect)
                        .with_label(range.name())
                        .with_coverage(coverage),
                );
            }
        }

        trace_event!(
            "color_candidates",
            components = components.len(),
            sized = sized.len(),
            accepted = accepted.len()
        );
        Ok(accepted)
    }

    /// Runs every range against `image` and annotates a clone of it.
    pub fn detect(&self, image: &Image, ranges: &[ColorRange]) -> RegionScanResult<DetectionResult> {
        let start = Instant::now();
        let _span = trace_span!("color_detect", ranges = ranges.len()).entered();
        self.cfg.validate()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(RegionScanError::EmptyImage { what: "source" });
        }

        let (width, height) = image.size();
        let hsv = image_to_hsv(image);
        let mut canvas = image.to_rgb_image()?;
        let mut regions = Vec::new();
        let mut counts = Vec::with_capacity(ranges.len());

        for range in ranges {
            let found = self.regions_for_range(&hsv, width, height, range)?;
            for region in &found {
                draw_rect(&mut canvas, &region.rect, self.cfg.box_color, self.cfg.thickness);
                let label = coverage_label(range.name(), region.coverage.unwrap_or(0.0));
                draw_label(&mut canvas, &region.rect, &label, self.cfg.label_color);
            }
            counts.push((range.name().to_string(), found.len()));
            regions.extend(found);
        }

        Ok(DetectionResult::new(
            Image::from_rgb_image(canvas),
            start.elapsed(),
            (width, height),
            regions,
            Summary::ColorCounts(counts),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{coverage_label, ColorConfig, ColorDetector};
    use crate::color::{image_to_hsv, ColorRange};
    use crate::geometry::Rect;
    use crate::image::{Image, PixelFormat};
    use crate::merge::CloseMergePolicy;

    fn canvas(width: usize, height: usize, squares: &[(usize, usize, usize, [u8; 3])]) -> Image {
        let mut data = vec![0u8; width * height * 3];
        for &(x0, y0, side, rgb) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    let idx = (y * width + x) * 3;
                    data[idx..idx + 3].copy_from_slice(&rgb);
                }
            }
        }
        Image::new(data, width, height, PixelFormat::Rgb).unwrap()
    }

    #[test]
    fn label_has_two_decimals() {
        assert_eq!(coverage_label("Red", 0.98765), "Red: 98.77%");
        assert_eq!(coverage_label("Blue", 1.0), "Blue: 100.00%");
    }

    #[test]
    fn small_specks_are_discarded() {
        let img = canvas(100, 100, &[(10, 10, 20, [255, 0, 0]), (60, 60, 30, [255, 0, 0])]);
        let table = ColorRange::reference_table();
        let result = ColorDetector::default().detect(&img, &table).unwrap();
        // 20x20 = 400 px is below the 500 px minimum.
        assert_eq!(result.count_for("Red"), Some(1));
        assert_eq!(result.count_for("Blue"), Some(0));
        assert_eq!(result.regions()[0].rect.x, 60);
    }

    #[test]
    fn close_policy_controls_geometry() {
        // Centers are about 31 px apart and the 6 px gap survives the 5x5 close.
        // The lower square is scanned last and anchors the reduction.
        let img = canvas(
            120,
            80,
            &[(10, 10, 24, [255, 0, 0]), (40, 16, 24, [255, 0, 0])],
        );
        let red = ColorRange::reference_table().remove(0);
        let hsv = image_to_hsv(&img);

        let keep_first = ColorDetector::new(ColorConfig {
            max_center_distance: 40.0,
            ..ColorConfig::default()
        });
        let regions = keep_first.regions_for_range(&hsv, 120, 80, &red).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect, Rect::new(40, 16, 24, 24));

        let union = ColorDetector::new(ColorConfig {
            max_center_distance: 40.0,
            merge_policy: CloseMergePolicy::Union,
            ..ColorConfig::default()
        });
        let regions = union.regions_for_range(&hsv, 120, 80, &red).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect.x, 10);
        assert_eq!(regions[0].rect.width, 54);
        assert_eq!(regions[0].rect.height, 30);
    }

    #[test]
    fn lower_of_two_stacked_blobs_survives() {
        let img = canvas(
            80,
            100,
            &[(20, 10, 25, [0, 0, 255]), (24, 40, 25, [0, 0, 255])],
        );
        let blue = ColorRange::reference_table().remove(3);
        let hsv = image_to_hsv(&img);
        let detector = ColorDetector::new(ColorConfig {
            max_center_distance: 40.0,
            ..ColorConfig::default()
        });
        let regions = detector.regions_for_range(&hsv, 80, 100, &blue).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect, Rect::new(24, 40, 25, 25));
    }

    #[test]
    fn coverage_outside_range_is_rejected() {
        let img = canvas(10, 10, &[]);
        let detector = ColorDetector::new(ColorConfig {
            min_coverage_percent: 120.0,
            ..ColorConfig::default()
        });
        let err = detector.detect(&img, &ColorRange::reference_table()).unwrap_err();
        assert!(err.is_input_error());
    }
}
