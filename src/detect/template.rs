//! Multi-scale, multi-rotation template matching.

use crate::annotate::{draw_rect, GREEN};
use crate::detect::{DetectionResult, Summary};
use crate::geometry::Region;
use crate::image::{Image, ImageView};
use crate::kernel::{zncc_scan, ScanParams};
use crate::merge::{merge_overlapping, sort_candidates, Candidate, MergeStrategy};
use crate::template::{
    default_rotations, scale_template, TemplatePlan, TransformGrid, DEFAULT_SCALES,
};
use crate::template::rotate::rotate_u8_bilinear;
use crate::trace::{trace_event, trace_span};
use crate::util::{RegionScanError, RegionScanResult};
use std::time::Instant;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Template matching configuration.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Resize factors applied to the template.
    pub scales: Vec<f32>,
    /// Rotations in degrees, counter-clockwise as displayed.
    pub rotations_deg: Vec<f32>,
    /// Minimum correlation for a placement to become a candidate.
    pub threshold: f32,
    /// Scaled templates narrower or shorter than this are skipped.
    pub min_template_size: usize,
    /// Value for pixels exposed by rotation.
    pub fill_value: u8,
    /// Minimum per-pixel variance of an image window.
    pub min_var_i: f32,
    /// How overlapping candidates are grouped.
    pub merge: MergeStrategy,
    /// Process scales on the rayon pool when the feature is enabled.
    pub parallel: bool,
    /// Dedicated pool size; `None` uses the global pool.
    pub num_threads: Option<usize>,
    /// Box outline color.
    pub box_color: [u8; 3],
    /// Box outline thickness in pixels.
    pub thickness: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            scales: DEFAULT_SCALES.to_vec(),
            rotations_deg: default_rotations(),
            threshold: 0.8,
            min_template_size: 10,
            fill_value: 0,
            min_var_i: 1e-3,
            merge: MergeStrategy::Sweep,
            parallel: true,
            num_threads: None,
            box_color: GREEN,
            thickness: 2,
        }
    }
}

impl MatchConfig {
    fn validate(&self) -> RegionScanResult<TransformGrid> {
        if !self.threshold.is_finite() {
            return Err(RegionScanError::InvalidInput("threshold must be finite"));
        }
        if !self.min_var_i.is_finite() || self.min_var_i < 0.0 {
            return Err(RegionScanError::InvalidInput("min_var_i must be >= 0"));
        }
        if self.num_threads == Some(0) {
            return Err(RegionScanError::InvalidInput("num_threads must be > 0"));
        }
        TransformGrid::new(&self.scales, &self.rotations_deg)
    }

    fn scan_params(&self) -> ScanParams {
        ScanParams {
            min_var_i: self.min_var_i,
            min_score: self.threshold,
        }
    }
}

/// Locates a pattern image inside a scene.
#[derive(Clone, Debug, Default)]
pub struct TemplateDetector {
    cfg: MatchConfig,
}

impl TemplateDetector {
    /// Creates a detector with the given configuration.
    pub fn new(cfg: MatchConfig) -> Self {
        Self { cfg }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Gathers every above-threshold placement over the whole grid.
    ///
    /// The result is sorted the way the overlap merge expects, so the order
    /// does not depend on how scales were scheduled.
    pub fn collect_candidates(
        &self,
        image: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
    ) -> RegionScanResult<Vec<Candidate>> {
        let grid = self.cfg.validate()?;
        let _span = trace_span!(
            "collect_candidates",
            scales = grid.scales().len(),
            rotations = grid.rotations_deg().len()
        )
        .entered();

        let mut candidates = self.run_scales(image, template, &grid)?;
        sort_candidates(&mut candidates);
        trace_event!("raw_candidates", count = candidates.len());
        Ok(candidates)
    }

    #[cfg(feature = "rayon")]
    fn run_scales(
        &self,
        image: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
        grid: &TransformGrid,
    ) -> RegionScanResult<Vec<Candidate>> {
        if !self.cfg.parallel {
            return self.run_scales_seq(image, template, grid);
        }
        match self.cfg.num_threads {
            None => self.run_scales_par(image, template, grid),
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|err| RegionScanError::ThreadPool {
                        reason: err.to_string(),
                    })?;
                pool.install(|| self.run_scales_par(image, template, grid))
            }
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn run_scales(
        &self,
        image: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
        grid: &TransformGrid,
    ) -> RegionScanResult<Vec<Candidate>> {
        self.run_scales_seq(image, template, grid)
    }

    #[cfg(feature = "rayon")]
    fn run_scales_par(
        &self,
        image: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
        grid: &TransformGrid,
    ) -> RegionScanResult<Vec<Candidate>> {
        let results: Vec<_> = grid
            .scales()
            .par_iter()
            .map(|&scale| self.scan_scale(image, template, scale, grid.rotations_deg()))
            .collect();

        let mut out = Vec::new();
        for result in results {
            out.extend(result?);
        }
        Ok(out)
    }

    fn run_scales_seq(
        &self,
        image: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
        grid: &TransformGrid,
    ) -> RegionScanResult<Vec<Candidate>> {
        let mut out = Vec::new();
        for &scale in grid.scales() {
            out.extend(self.scan_scale(image, template, scale, grid.rotations_deg())?);
        }
        Ok(out)
    }

    /// Scans every rotation of one scale; degenerate variants are skipped.
    fn scan_scale(
        &self,
        image: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
        scale: f32,
        rotations_deg: &[f32],
    ) -> RegionScanResult<Vec<Candidate>> {
        let _span = trace_span!("scan_scale", scale = scale).entered();
        let scaled = match scale_template(template, scale, self.cfg.min_template_size) {
            Ok(scaled) => scaled,
            Err(RegionScanError::DegenerateTemplate { reason }) => {
                trace_event!("scale_skipped", reason = reason);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let params = self.cfg.scan_params();
        let mut out = Vec::new();
        for &angle in rotations_deg {
            let rotated;
            let variant = if angle == 0.0 {
                scaled.view()
            } else {
                rotated = rotate_u8_bilinear(scaled.view(), angle, self.cfg.fill_value);
                rotated.view()
            };
            let hits = TemplatePlan::from_view(variant).and_then(|plan| zncc_scan(image, &plan, params));
            match hits {
                Ok(hits) => out.extend(hits),
                Err(RegionScanError::DegenerateTemplate { reason }) => {
                    trace_event!("variant_skipped", rotation = angle, reason = reason);
                }
                Err(err) => return Err(err),
            }
        }
        trace_event!("scale_candidates", count = out.len());
        Ok(out)
    }

    /// Finds, merges and draws every occurrence of `template` in `image`.
    pub fn detect(&self, image: &Image, template: &Image) -> RegionScanResult<DetectionResult> {
        let start = Instant::now();
        let _span = trace_span!("template_detect").entered();

        let scene = image.to_gray();
        let pattern = template.to_gray();
        let candidates = self.collect_candidates(scene.view(), pattern.view())?;
        let merged = merge_overlapping(candidates, self.cfg.merge);
        trace_event!("merged_candidates", count = merged.len());

        let mut canvas = image.to_rgb_image()?;
        let mut regions = Vec::with_capacity(merged.len());
        for candidate in &merged {
            draw_rect(&mut canvas, &candidate.rect, self.cfg.box_color, self.cfg.thickness);
            regions.push(Region::new(candidate.rect).with_score(candidate.score));
        }
        let best_score = merged.iter().map(|c| c.score).reduce(f32::max);

        Ok(DetectionResult::new(
            Image::from_rgb_image(canvas),
            start.elapsed(),
            image.size(),
            regions,
            Summary::Matches {
                count: merged.len(),
                best_score,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchConfig, TemplateDetector};
    use crate::detect::Summary;
    use crate::geometry::Rect;
    use crate::image::{Image, ImageView, OwnedImage};
    use crate::util::RegionScanError;

    fn textured(width: usize, height: usize) -> OwnedImage {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (((x * 29) ^ (y * 17) ^ (x * y * 3)) & 0xFF) as u8))
            .collect();
        OwnedImage::new(data, width, height).unwrap()
    }

    fn crop(src: &OwnedImage, x: usize, y: usize, w: usize, h: usize) -> OwnedImage {
        let roi = src.view().roi(x, y, w, h).unwrap();
        OwnedImage::from_view(roi).unwrap()
    }

    fn exact_cfg() -> MatchConfig {
        MatchConfig {
            scales: vec![1.0],
            rotations_deg: vec![0.0],
            threshold: 0.99,
            parallel: false,
            ..MatchConfig::default()
        }
    }

    #[test]
    fn finds_exact_crop() {
        let scene = textured(64, 48);
        let patch = crop(&scene, 20, 12, 16, 14);
        let detector = TemplateDetector::new(exact_cfg());
        let result = detector
            .detect(&Image::from_gray(scene), &Image::from_gray(patch))
            .unwrap();
        assert_eq!(result.detected_count(), 1);
        assert_eq!(result.regions()[0].rect, Rect::new(20, 12, 16, 14));
        match result.summary() {
            Summary::Matches { count, best_score } => {
                assert_eq!(*count, 1);
                assert!(best_score.unwrap() > 0.999);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn too_small_scales_are_skipped() {
        let scene = textured(40, 40);
        let patch = crop(&scene, 5, 5, 12, 12);
        let detector = TemplateDetector::new(MatchConfig {
            scales: vec![0.5],
            ..exact_cfg()
        });
        let hits = detector
            .collect_candidates(scene.view(), patch.view())
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn template_larger_than_scene_yields_nothing() {
        let scene = textured(20, 20);
        let patch = textured(30, 30);
        let detector = TemplateDetector::new(exact_cfg());
        let hits = detector
            .collect_candidates(scene.view(), patch.view())
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn flat_template_yields_nothing() {
        let scene = textured(40, 40);
        let flat = vec![128u8; 15 * 15];
        let detector = TemplateDetector::new(exact_cfg());
        let hits = detector
            .collect_candidates(scene.view(), ImageView::from_slice(&flat, 15, 15).unwrap())
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let scene = textured(20, 20);
        let detector = TemplateDetector::new(MatchConfig {
            scales: Vec::new(),
            ..exact_cfg()
        });
        let err = detector
            .collect_candidates(scene.view(), scene.view())
            .unwrap_err();
        assert!(matches!(err, RegionScanError::InvalidTransform { .. }));

        let detector = TemplateDetector::new(MatchConfig {
            num_threads: Some(0),
            ..exact_cfg()
        });
        let err = detector
            .collect_candidates(scene.view(), scene.view())
            .unwrap_err();
        assert_eq!(err, RegionScanError::InvalidInput("num_threads must be > 0"));
    }
}
