//! RGB to HSV conversion with the 8-bit hue convention.
//!
//! Hue is stored halved so it fits a byte: `H` in `[0, 180)`, `S` and `V` in
//! `[0, 255]`. Achromatic pixels get `H = 0`, black gets `S = 0`.

use crate::image::Image;
use palette::{FromColor, Srgb};

/// One HSV sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hsv {
    /// Hue in half-degrees, `[0, 180)`.
    pub h: u8,
    /// Saturation, `[0, 255]`.
    pub s: u8,
    /// Value, `[0, 255]`.
    pub v: u8,
}

impl Hsv {
    /// Returns the sample as `[h, s, v]`.
    pub fn to_array(self) -> [u8; 3] {
        [self.h, self.s, self.v]
    }
}

/// Converts one RGB pixel.
///
/// The conversion itself is `palette`'s sRGB to HSV; the result is rescaled
/// to bytes with the hue halved.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let rgb = Srgb::new(r, g, b).into_format::<f32>();
    let hsv: palette::Hsv = palette::Hsv::from_color(rgb);

    let mut h = (hsv.hue.into_positive_degrees() / 2.0).round();
    if h >= 180.0 {
        h -= 180.0;
    }
    Hsv {
        h: h as u8,
        s: (hsv.saturation * 255.0).round().clamp(0.0, 255.0) as u8,
        v: (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8,
    }
}

/// Converts every pixel of an image, row-major.
pub fn image_to_hsv(img: &Image) -> Vec<Hsv> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        for x in 0..img.width() {
            let [r, g, b] = img.rgb_at(x, y).unwrap_or([0, 0, 0]);
            out.push(rgb_to_hsv(r, g, b));
        }
    }
    out
}
