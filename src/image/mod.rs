//! Image buffers and views.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! `OwnedImage` is a contiguous single-channel plane (luma, masks, template
//! variants) and `Image` is the caller-facing gray or RGB buffer.

use crate::util::{RegionScanError, RegionScanResult};

mod buffer;
#[cfg(feature = "image-io")]
pub mod io;
pub mod resize;

pub use buffer::{Image, PixelFormat};

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> RegionScanResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> RegionScanResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(RegionScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Iterates over all rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> RegionScanResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(RegionScanError::InvalidDimensions { width, height });
        }
        let out_of_bounds = RegionScanError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        let data = self
            .data
            .get(start..)
            .ok_or(RegionScanError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;
        ImageView::new(data, width, height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> RegionScanResult<usize> {
    if width == 0 || height == 0 {
        return Err(RegionScanError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(RegionScanError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(RegionScanError::InvalidDimensions { width, height })
}

/// Owned contiguous single-channel `u8` image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Creates an owned plane from a row-major buffer of exactly `width * height` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> RegionScanResult<Self> {
        let needed = width
            .checked_mul(height)
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
        })
    }

    /// Creates a plane of the given size filled with `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> RegionScanResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(RegionScanError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a (possibly strided) view into a contiguous plane.
    pub fn from_view(view: ImageView<'_, u8>) -> RegionScanResult<Self> {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for row in view.rows() {
            data.extend_from_slice(row);
        }
        Self::new(data, view.width(), view.height())
    }

    /// Returns a borrowed view of the plane.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
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

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Wraps `data` with this plane's dimensions.
    pub(crate) fn same_size(&self, data: Vec<u8>) -> OwnedImage {
        debug_assert_eq!(data.len(), self.data.len());
        OwnedImage {
            data,
            width: self.width,
            height: self.height,
        }
    }

    /// Consumes the plane and returns its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageView, OwnedImage};
    use crate::util::RegionScanError;

    #[test]
    fn roi_shares_stride_and_checks_bounds() {
        let data: Vec<u8> = (0u8..20).collect();
        let view = ImageView::from_slice(&data, 5, 4).unwrap();
        let roi = view.roi(1, 1, 3, 2).unwrap();
        assert_eq!(roi.stride(), 5);
        assert_eq!(roi.row(0).unwrap(), &[6u8, 7, 8]);
        assert_eq!(roi.row(1).unwrap(), &[11u8, 12, 13]);
        assert_eq!(roi.rows().count(), 2);

        let err = view.roi(3, 0, 3, 1).unwrap_err();
        assert!(matches!(err, RegionScanError::RoiOutOfBounds { .. }));
    }

    #[test]
    fn owned_from_view_compacts_rows() {
        let data: Vec<u8> = (0u8..12).collect();
        let view = ImageView::new(&data, 2, 3, 4).unwrap();
        let owned = OwnedImage::from_view(view).unwrap();
        assert_eq!(owned.data(), &[0u8, 1, 4, 5, 8, 9]);
    }

    #[test]
    fn owned_rejects_wrong_length() {
        assert_eq!(
            OwnedImage::new(vec![0; 5], 2, 2).unwrap_err(),
            RegionScanError::InvalidDimensions {
                width: 2,
                height: 2
            }
        );
        assert_eq!(
            OwnedImage::new(Vec::new(), 0, 3).unwrap_err(),
            RegionScanError::InvalidDimensions {
                width: 0,
                height: 3
            }
        );
    }
}
