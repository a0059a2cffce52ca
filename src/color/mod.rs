//! Named HSV color ranges and mask construction.

mod hsv;

pub use hsv::{image_to_hsv, rgb_to_hsv, Hsv};

use crate::morph::Mask;
use crate::util::{RegionScanError, RegionScanResult};

/// Largest hue value accepted in a bound (hue samples never exceed 179).
pub const HUE_MAX: u8 = 180;

/// A named, inclusive lower/upper bound pair in HSV space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorRange {
    name: String,
    lower: Hsv,
    upper: Hsv,
}

impl ColorRange {
    /// Creates a range from `[h, s, v]` bounds.
    ///
    /// Fails when a lower component exceeds its upper counterpart or a hue
    /// bound exceeds [`HUE_MAX`].
    pub fn new(name: impl Into<String>, lower: [u8; 3], upper: [u8; 3]) -> RegionScanResult<Self> {
        let name = name.into();
        if lower.iter().zip(upper.iter()).any(|(lo, hi)| lo > hi) {
            return Err(RegionScanError::InvalidColorRange {
                name,
                reason: "lower bound exceeds upper bound",
            });
        }
        if upper[0] > HUE_MAX {
            return Err(RegionScanError::InvalidColorRange {
                name,
                reason: "hue bound exceeds 180",
            });
        }
        Ok(Self {
            name,
            lower: Hsv {
                h: lower[0],
                s: lower[1],
                v: lower[2],
            },
            upper: Hsv {
                h: upper[0],
                s: upper[1],
                v: upper[2],
            },
        })
    }

    /// The default Red/Yellow/Green/Blue table.
    pub fn reference_table() -> Vec<ColorRange> {
        [
            ("Red", [0, 100, 100], [10, 255, 255]),
            ("Yellow", [20, 100, 100], [30, 255, 255]),
            ("Green", [35, 100, 100], [85, 255, 255]),
            ("Blue", [100, 100, 100], [140, 255, 255]),
        ]
        .into_iter()
        .map(|(name, lower, upper)| ColorRange {
            name: name.to_string(),
            lower: Hsv {
                h: lower[0],
                s: lower[1],
                v: lower[2],
            },
            upper: Hsv {
                h: upper[0],
                s: upper[1],
                v: upper[2],
            },
        })
        .collect()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lower bound.
    pub fn lower(&self) -> Hsv {
        self.lower
    }

    /// Returns the upper bound.
    pub fn upper(&self) -> Hsv {
        self.upper
    }

    /// Returns true when every component lies within the bounds.
    pub fn contains(&self, px: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&px.h)
            && (self.lower.s..=self.upper.s).contains(&px.s)
            && (self.lower.v..=self.upper.v).contains(&px.v)
    }

    /// Builds the binary mask of pixels inside the range.
    ///
    /// `hsv` is the row-major HSV conversion of a `width x height` image.
    pub fn mask(&self, hsv: &[Hsv], width: usize, height: usize) -> RegionScanResult<Mask> {
        let bits = hsv.iter().map(|&px| u8::from(self.contains(px))).collect();
        Mask::new(bits, width, height)
    }
}
