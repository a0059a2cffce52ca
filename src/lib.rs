//! RegionScan finds regions of interest in still images.
//!
//! Two detectors share one result type:
//!
//! - [`ColorDetector`] segments fixed HSV ranges, cleans the masks with
//!   morphology and reports the outermost regions with their fill coverage.
//! - [`TemplateDetector`] locates a pattern over a grid of scales and
//!   rotations using normalized cross-correlation, then merges overlapping
//!   hits.
//!
//! Scales are searched in parallel with the `rayon` feature (on by default).
//! Masks, outlines and labels are processed with `imageproc`. PNG and JPEG
//! decoding and encoding live behind `image-io`; spans and events are emitted
//! with `tracing`.

pub mod annotate;
pub mod color;
pub mod components;
pub mod detect;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod merge;
pub mod morph;
pub mod template;
mod trace;
pub mod util;

pub use color::{ColorRange, Hsv};
pub use detect::{
    detect_color_regions, detect_template_matches, ColorConfig, ColorDetector, DetectionResult,
    MatchConfig, Summary, TemplateDetector,
};
pub use geometry::{Rect, Region};
pub use crate::image::{Image, ImageView, OwnedImage, PixelFormat};
pub use merge::{Candidate, CloseMergePolicy, MergeStrategy};
pub use morph::{Mask, StructuringElement};
pub use template::{TemplatePlan, TransformGrid, TransformSpec};
pub use util::{RegionScanError, RegionScanResult};
