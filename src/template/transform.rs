//! Scale/rotation search grid and template transformation.

use crate::image::resize::{resize_bilinear, scaled_size};
use crate::image::{ImageView, OwnedImage};
use crate::template::angles::AngleGrid;
use crate::template::rotate::rotate_u8_bilinear;
use crate::util::math::normalize_deg;
use crate::util::{RegionScanError, RegionScanResult};

/// Scales searched when the caller supplies none.
pub const DEFAULT_SCALES: [f32; 3] = [1.0, 0.8, 0.6];

/// Rotation step used for the default rotation list.
pub const DEFAULT_ROTATION_STEP_DEG: f32 = 10.0;

/// Every 10 degrees from 0 to 350.
pub fn default_rotations() -> Vec<f32> {
    AngleGrid::full(DEFAULT_ROTATION_STEP_DEG)
        .map(|grid| grid.iter().collect())
        .unwrap_or_default()
}

/// One point of the search grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformSpec {
    scale: f32,
    rotation_deg: f32,
}

impl TransformSpec {
    /// Creates a transform; the rotation is normalized to `[0, 360)`.
    pub fn new(scale: f32, rotation_deg: f32) -> RegionScanResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RegionScanError::InvalidTransform {
                reason: "scale must be finite and > 0",
            });
        }
        if !rotation_deg.is_finite() {
            return Err(RegionScanError::InvalidTransform {
                reason: "rotation must be finite",
            });
        }
        Ok(Self {
            scale,
            rotation_deg: normalize_deg(rotation_deg),
        })
    }

    /// Resize factor applied before rotating.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rotation in degrees, counter-clockwise as displayed.
    pub fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }
}

/// Cartesian product of scales and rotations.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformGrid {
    scales: Vec<f32>,
    rotations_deg: Vec<f32>,
}

impl TransformGrid {
    /// Validates and stores the grid axes.
    pub fn new(scales: &[f32], rotations_deg: &[f32]) -> RegionScanResult<Self> {
        if scales.is_empty() {
            return Err(RegionScanError::InvalidTransform {
                reason: "scale list is empty",
            });
        }
        if rotations_deg.is_empty() {
            return Err(RegionScanError::InvalidTransform {
                reason: "rotation list is empty",
            });
        }
        let mut normalized = Vec::with_capacity(rotations_deg.len());
        for &scale in scales {
            TransformSpec::new(scale, 0.0)?;
        }
        for &angle in rotations_deg {
            normalized.push(TransformSpec::new(1.0, angle)?.rotation_deg());
        }
        Ok(Self {
            scales: scales.to_vec(),
            rotations_deg: normalized,
        })
    }

    /// The default 3 x 36 grid.
    pub fn reference() -> Self {
        Self {
            scales: DEFAULT_SCALES.to_vec(),
            rotations_deg: default_rotations(),
        }
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.scales.len() * self.rotations_deg.len()
    }

    /// Returns true when the grid has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the scale axis.
    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Returns the rotation axis in degrees.
    pub fn rotations_deg(&self) -> &[f32] {
        &self.rotations_deg
    }

    /// All transforms sharing one scale, in rotation order.
    pub fn for_scale(&self, scale: f32) -> impl Iterator<Item = TransformSpec> + '_ {
        self.rotations_deg.iter().map(move |&rotation_deg| TransformSpec {
            scale,
            rotation_deg,
        })
    }

    /// Iterates scale-major over every grid point.
    pub fn iter(&self) -> impl Iterator<Item = TransformSpec> + '_ {
        self.scales.iter().flat_map(move |&scale| self.for_scale(scale))
    }
}

/// Resizes a template for one scale of the grid.
///
/// Returns [`RegionScanError::DegenerateTemplate`] when either scaled
/// dimension is below `min_size`; rotation keeps the size, so the check holds
/// for every rotation of that scale.
pub fn scale_template(
    tpl: ImageView<'_, u8>,
    scale: f32,
    min_size: usize,
) -> RegionScanResult<OwnedImage> {
    let (width, height) = scaled_size(tpl.width(), tpl.height(), scale);
    if width < min_size.max(1) || height < min_size.max(1) {
        return Err(RegionScanError::DegenerateTemplate {
            reason: "scaled template below minimum size",
        });
    }
    resize_bilinear(tpl, width, height)
}

/// Resizes then rotates a template, filling exposed pixels with `fill`.
pub fn transform_template(
    tpl: ImageView<'_, u8>,
    transform: TransformSpec,
    fill: u8,
    min_size: usize,
) -> RegionScanResult<OwnedImage> {
    let scaled = scale_template(tpl, transform.scale(), min_size)?;
    if transform.rotation_deg() == 0.0 {
        return Ok(scaled);
    }
    Ok(rotate_u8_bilinear(scaled.view(), transform.rotation_deg(), fill))
}
