//! Evenly spaced rotation angles.

use crate::util::math::normalize_deg;
use crate::util::{RegionScanError, RegionScanResult};

/// Discrete angle grid over `[start_deg, end_deg)` with a fixed step.
#[derive(Clone, Debug)]
pub struct AngleGrid {
    start_deg: f32,
    step_deg: f32,
    len: usize,
}

impl AngleGrid {
    /// Creates a full turn starting at 0 degrees.
    pub fn full(step_deg: f32) -> RegionScanResult<Self> {
        Self::new(0.0, 360.0, step_deg)
    }

    /// Creates a grid over `[start_deg, end_deg)` with a positive step.
    pub fn new(start_deg: f32, end_deg: f32, step_deg: f32) -> RegionScanResult<Self> {
        if !start_deg.is_finite() || !end_deg.is_finite() || !step_deg.is_finite() {
            return Err(RegionScanError::InvalidTransform {
                reason: "non-finite angle grid parameters",
            });
        }
        if step_deg <= 0.0 {
            return Err(RegionScanError::InvalidTransform {
                reason: "angle step must be > 0",
            });
        }
        if end_deg <= start_deg {
            return Err(RegionScanError::InvalidTransform {
                reason: "angle range is empty",
            });
        }

        // Counting by index keeps float drift from adding a sample at the end.
        let mut len = 0usize;
        while start_deg + (len as f32) * step_deg < end_deg - step_deg * 1e-4 {
            len += 1;
        }

        Ok(Self {
            start_deg,
            step_deg,
            len,
        })
    }

    /// Returns the number of angles.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the grid has no angles.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the step in degrees.
    pub fn step_deg(&self) -> f32 {
        self.step_deg
    }

    /// Returns the angle at `idx`, normalized to `[0, 360)`.
    pub fn angle_at(&self, idx: usize) -> f32 {
        debug_assert!(idx < self.len);
        normalize_deg(self.start_deg + (idx as f32) * self.step_deg)
    }

    /// Iterates over all angles.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).map(|idx| self.angle_at(idx))
    }
}
