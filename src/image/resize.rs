//! Bilinear resampling for single-channel planes.
//!
//! Destination pixel centers map to source coordinates with
//! `src = (dst + 0.5) * (src_len / dst_len) - 0.5`, clamped to the valid range,
//! so downscaling by an integer factor samples between source pixels rather
//! than snapping to the top-left one.

use crate::image::{ImageView, OwnedImage};
use crate::util::{RegionScanError, RegionScanResult};

/// Returns the destination size for scaling `(width, height)` by `scale`.
///
/// Dimensions are rounded to the nearest integer and may be zero for very
/// small scales; callers decide whether such a size is usable.
pub fn scaled_size(width: usize, height: usize, scale: f32) -> (usize, usize) {
    let w = (width as f32 * scale).round().max(0.0) as usize;
    let h = (height as f32 * scale).round().max(0.0) as usize;
    (w, h)
}

/// Resizes a plane to `dst_width x dst_height` with bilinear interpolation.
pub fn resize_bilinear(
    src: ImageView<'_, u8>,
    dst_width: usize,
    dst_height: usize,
) -> RegionScanResult<OwnedImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(RegionScanError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }
    let src_width = src.width();
    let src_height = src.height();
    if src_width == dst_width && src_height == dst_height {
        return OwnedImage::from_view(src);
    }

    let sx = src_width as f32 / dst_width as f32;
    let sy = src_height as f32 / dst_height as f32;
    let max_x = (src_width - 1) as f32;
    let max_y = (src_height - 1) as f32;

    // Horizontal taps are identical for every row.
    let x_taps: Vec<(usize, usize, f32)> = (0..dst_width)
        .map(|x| {
            let fx = ((x as f32 + 0.5) * sx - 0.5).clamp(0.0, max_x);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            (x0, x1, fx - x0 as f32)
        })
        .collect();

    let mut out = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        let fy = ((y as f32 + 0.5) * sy - 0.5).clamp(0.0, max_y);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(src_height - 1);
        let wy = fy - y0 as f32;
        let (row0, row1) = match (src.row(y0), src.row(y1)) {
            (Some(r0), Some(r1)) => (r0, r1),
            _ => {
                return Err(RegionScanError::BufferTooSmall {
                    needed: (y1 + 1) * src.stride(),
                    got: src.as_slice().len(),
                })
            }
        };
        for &(x0, x1, wx) in &x_taps {
            let top = row0[x0] as f32 * (1.0 - wx) + row0[x1] as f32 * wx;
            let bottom = row1[x0] as f32 * (1.0 - wx) + row1[x1] as f32 * wx;
            let value = top * (1.0 - wy) + bottom * wy;
            out.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    OwnedImage::new(out, dst_width, dst_height)
}
