//! Caller-facing 8-bit images in gray or interleaved RGB layout.
//!
//! Detectors read an [`Image`] and draw on an `image::RgbImage` copy of it.

use crate::image::OwnedImage;
use crate::util::{RegionScanError, RegionScanResult};
use image::RgbImage;

/// Sample layout of an [`Image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One luma sample per pixel.
    Gray,
    /// Interleaved red, green, blue samples.
    Rgb,
}

impl PixelFormat {
    /// Number of interleaved samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
        }
    }
}

/// Owned 8-bit image in gray or RGB layout.
///
/// Detectors only read the source image and draw onto clones of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl Image {
    /// Wraps a row-major interleaved buffer.
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> RegionScanResult<Self> {
        let needed = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.channels()))
            .filter(|&n| n > 0)
            .ok_or(RegionScanError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(RegionScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(RegionScanError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Creates an image filled with a single RGB color.
    pub fn filled_rgb(width: usize, height: usize, rgb: [u8; 3]) -> RegionScanResult<Self> {
        let pixels = width
            .checked_mul(height)
            .ok_or(RegionScanError::InvalidDimensions { width, height })?;
        let data = rgb.iter().copied().cycle().take(pixels * 3).collect();
        Self::new(data, width, height, PixelFormat::Rgb)
    }

    /// Wraps a gray plane without copying.
    pub fn from_gray(plane: OwnedImage) -> Self {
        let (width, height) = (plane.width(), plane.height());
        Self {
            data: plane.into_data(),
            width,
            height,
            format: PixelFormat::Gray,
        }
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the pixel layout.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the interleaved sample buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the pixel at `(x, y)` as RGB; gray samples are replicated.
    pub fn rgb_at(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * self.format.channels();
        Some(match self.format {
            PixelFormat::Gray => [self.data[idx]; 3],
            PixelFormat::Rgb => [self.data[idx], self.data[idx + 1], self.data[idx + 2]],
        })
    }

    /// Converts to a luma plane using ITU-R BT.601 weights.
    pub fn to_gray(&self) -> OwnedImage {
        let data = match self.format {
            PixelFormat::Gray => self.data.clone(),
            PixelFormat::Rgb => self
                .data
                .chunks_exact(3)
                .map(|px| luma(px[0], px[1], px[2]))
                .collect(),
        };
        OwnedImage {
            data,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns an RGB copy, expanding gray samples to three channels.
    pub fn to_rgb(&self) -> Image {
        match self.format {
            PixelFormat::Rgb => self.clone(),
            PixelFormat::Gray => Image {
                data: self.data.iter().flat_map(|&v| [v, v, v]).collect(),
                width: self.width,
                height: self.height,
                format: PixelFormat::Rgb,
            },
        }
    }

    /// Returns an `image::RgbImage` copy to draw on, expanding gray samples.
    pub fn to_rgb_image(&self) -> RegionScanResult<RgbImage> {
        let invalid = RegionScanError::InvalidDimensions {
            width: self.width,
            height: self.height,
        };
        let width = u32::try_from(self.width).map_err(|_| invalid.clone())?;
        let height = u32::try_from(self.height).map_err(|_| invalid.clone())?;
        RgbImage::from_raw(width, height, self.to_rgb().data).ok_or(invalid)
    }

    /// Wraps a drawn-on `image::RgbImage` without copying.
    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width: width as usize,
            height: height as usize,
            format: PixelFormat::Rgb,
        }
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((sum + 500) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::{Image, PixelFormat};
    use crate::util::RegionScanError;

    #[test]
    fn rejects_empty_and_short_buffers() {
        assert_eq!(
            Image::new(Vec::new(), 0, 0, PixelFormat::Rgb).unwrap_err(),
            RegionScanError::InvalidDimensions {
                width: 0,
                height: 0
            }
        );
        assert_eq!(
            Image::new(vec![0; 5], 1, 2, PixelFormat::Rgb).unwrap_err(),
            RegionScanError::BufferTooSmall { needed: 6, got: 5 }
        );
    }

    #[test]
    fn gray_conversion_uses_luma_weights() {
        let img = Image::new(vec![255, 0, 0, 0, 255, 0, 255, 255, 255], 3, 1, PixelFormat::Rgb)
            .unwrap();
        let gray = img.to_gray();
        assert_eq!(gray.data(), &[76u8, 150, 255]);
    }

    #[test]
    fn gray_expands_to_rgb() {
        let img = Image::new(vec![7, 9], 2, 1, PixelFormat::Gray).unwrap();
        let rgb = img.to_rgb();
        assert_eq!(rgb.format(), PixelFormat::Rgb);
        assert_eq!(rgb.data(), &[7u8, 7, 7, 9, 9, 9]);
        assert_eq!(img.rgb_at(1, 0), Some([9, 9, 9]));
        assert_eq!(img.rgb_at(2, 0), None);
    }

    #[test]
    fn drawing_canvas_is_always_rgb() {
        let img = Image::new(vec![10, 20, 30, 40], 2, 2, PixelFormat::Gray).unwrap();
        let canvas = img.to_rgb_image().unwrap();
        assert_eq!(canvas.dimensions(), (2, 2));
        assert_eq!(canvas.get_pixel(1, 1).0, [40, 40, 40]);
        let back = Image::from_rgb_image(canvas);
        assert_eq!(back, img.to_rgb());
    }
}
