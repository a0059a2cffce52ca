//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Decoding failures and
//! empty images surface as input errors.

use crate::image::{Image, PixelFormat};
use crate::util::{RegionScanError, RegionScanResult};
use std::path::Path;

/// Converts a decoded image, keeping gray sources single-channel.
pub fn image_from_dynamic(img: &image::DynamicImage) -> RegionScanResult<Image> {
    use image::DynamicImage;

    if img.width() == 0 || img.height() == 0 {
        return Err(RegionScanError::EmptyImage {
            what: "decoded image",
        });
    }
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img {
        DynamicImage::ImageLuma8(gray) => {
            Image::new(gray.as_raw().clone(), width, height, PixelFormat::Gray)
        }
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            Image::new(img.to_luma8().into_raw(), width, height, PixelFormat::Gray)
        }
        _ => Image::new(img.to_rgb8().into_raw(), width, height, PixelFormat::Rgb),
    }
}

/// Converts an [`Image`] into a `DynamicImage` for encoding.
pub fn image_to_dynamic(img: &Image) -> RegionScanResult<image::DynamicImage> {
    let width = u32::try_from(img.width()).map_err(|_| RegionScanError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| RegionScanError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let data = img.data().to_vec();
    let dynamic = match img.format() {
        PixelFormat::Gray => image::GrayImage::from_raw(width, height, data)
            .map(image::DynamicImage::ImageLuma8),
        PixelFormat::Rgb => {
            image::RgbImage::from_raw(width, height, data).map(image::DynamicImage::ImageRgb8)
        }
    };
    dynamic.ok_or(RegionScanError::BufferTooSmall {
        needed: img.width() * img.height() * img.format().channels(),
        got: img.data().len(),
    })
}

/// Decodes an in-memory PNG or JPEG.
pub fn decode_image(bytes: &[u8]) -> RegionScanResult<Image> {
    if bytes.is_empty() {
        return Err(RegionScanError::EmptyImage {
            what: "encoded buffer",
        });
    }
    let img = image::load_from_memory(bytes).map_err(|err| RegionScanError::ImageIo {
        reason: err.to_string(),
    })?;
    image_from_dynamic(&img)
}

/// Loads an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> RegionScanResult<Image> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| RegionScanError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    })?;
    image_from_dynamic(&img)
}

/// Saves an image; the format follows the file extension.
pub fn save_image<P: AsRef<Path>>(img: &Image, path: P) -> RegionScanResult<()> {
    let path = path.as_ref();
    image_to_dynamic(img)?
        .save(path)
        .map_err(|err| RegionScanError::ImageIo {
            reason: format!("{}: {err}", path.display()),
        })
}
