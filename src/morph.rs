//! Binary masks and rectangular morphology.
//!
//! Erosion and dilation run through `imageproc::morphology` with the
//! chessboard (`LInf`) norm, which makes the structuring element an odd square
//! centered on the pixel. Pixels outside the image do not take part: erosion
//! never eats in from the border and dilation never grows out of it.

use crate::geometry::Rect;
use crate::image::{ImageView, OwnedImage};
use crate::util::{RegionScanError, RegionScanResult};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Binary image with one byte per pixel, `1` for foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    plane: OwnedImage,
}

impl Mask {
    /// Creates a mask from row-major bits; any non-zero byte counts as set.
    pub fn new(bits: Vec<u8>, width: usize, height: usize) -> RegionScanResult<Self> {
        check_extent(width, height)?;
        let bits = bits.into_iter().map(|b| u8::from(b != 0)).collect();
        Ok(Self {
            plane: OwnedImage::new(bits, width, height)?,
        })
    }

    /// Creates an all-zero mask.
    pub fn zeros(width: usize, height: usize) -> RegionScanResult<Self> {
        check_extent(width, height)?;
        Ok(Self {
            plane: OwnedImage::filled(width, height, 0)?,
        })
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.plane.width()
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.plane.height()
    }

    /// Returns the row-major bits.
    pub fn data(&self) -> &[u8] {
        self.plane.data()
    }

    /// Returns a borrowed view of the bits.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.plane.view()
    }

    /// Returns true when the pixel is set; out-of-bounds pixels are unset.
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.view().get(x, y).is_some_and(|&b| b != 0)
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.data().iter().filter(|&&b| b != 0).count()
    }

    /// Number of set pixels inside `rect`, clipped to the mask.
    pub fn count_set_in(&self, rect: &Rect) -> usize {
        let Some(clipped) = rect.clamp_to(self.width(), self.height()) else {
            return 0;
        };
        let view = self.view();
        (clipped.y..clipped.bottom())
            .filter_map(|y| view.row(y))
            .map(|row| {
                row[clipped.x..clipped.right()]
                    .iter()
                    .filter(|&&b| b != 0)
                    .count()
            })
            .sum()
    }

    /// Fraction of set pixels inside `rect`, in `[0, 1]`.
    pub fn coverage(&self, rect: &Rect) -> f32 {
        if rect.is_empty() {
            return 0.0;
        }
        self.count_set_in(rect) as f32 / rect.area() as f32
    }

    fn to_gray_image(&self) -> Option<GrayImage> {
        let levels = self.data().iter().map(|&b| if b != 0 { 255 } else { 0 }).collect();
        GrayImage::from_raw(self.width() as u32, self.height() as u32, levels)
    }

    fn from_gray_image(&self, gray: GrayImage) -> Self {
        let bits = gray.into_raw().into_iter().map(|v| u8::from(v != 0)).collect();
        Self {
            plane: self.plane.same_size(bits),
        }
    }
}

fn check_extent(width: usize, height: usize) -> RegionScanResult<()> {
    if u32::try_from(width).is_err() || u32::try_from(height).is_err() {
        return Err(RegionScanError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Square structuring element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructuringElement {
    size: usize,
}

impl StructuringElement {
    /// Largest supported side: the radius has to fit a `u8`.
    pub const MAX_SIZE: usize = 2 * u8::MAX as usize + 1;

    /// Creates a `size x size` square element; `size` must be odd.
    pub fn square(size: usize) -> RegionScanResult<Self> {
        if size % 2 == 0 {
            return Err(RegionScanError::InvalidInput(
                "structuring element size must be odd",
            ));
        }
        if size > Self::MAX_SIZE {
            return Err(RegionScanError::InvalidInput(
                "structuring element size must be <= 511",
            ));
        }
        Ok(Self { size })
    }

    /// Side length in pixels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Chessboard distance from the center to the edge of the square.
    fn radius(&self) -> u8 {
        (self.size / 2) as u8
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self { size: 5 }
    }
}

fn apply(mask: &Mask, op: impl FnOnce(&GrayImage) -> GrayImage) -> Mask {
    match mask.to_gray_image() {
        Some(gray) => mask.from_gray_image(op(&gray)),
        None => mask.clone(),
    }
}

/// Minimum filter: a pixel stays set only if its whole neighborhood is set.
pub fn erode(mask: &Mask, element: StructuringElement) -> Mask {
    apply(mask, |gray| morphology::erode(gray, Norm::LInf, element.radius()))
}

/// Maximum filter: a pixel becomes set if any neighbor is set.
pub fn dilate(mask: &Mask, element: StructuringElement) -> Mask {
    apply(mask, |gray| morphology::dilate(gray, Norm::LInf, element.radius()))
}

/// Dilate then erode; fills gaps narrower than the element.
pub fn close(mask: &Mask, element: StructuringElement) -> Mask {
    apply(mask, |gray| morphology::close(gray, Norm::LInf, element.radius()))
}

/// Erode then dilate; removes specks smaller than the element.
pub fn open(mask: &Mask, element: StructuringElement) -> Mask {
    apply(mask, |gray| morphology::open(gray, Norm::LInf, element.radius()))
}

/// The cleanup applied to every color mask: close, then open.
pub fn clean(mask: &Mask, element: StructuringElement) -> Mask {
    open(&close(mask, element), element)
}

#[cfg(test)]
mod tests {
    use super::{clean, close, dilate, erode, open, Mask, StructuringElement};
    use crate::geometry::Rect;

    fn square_mask(w: usize, h: usize, rect: Rect) -> Mask {
        let mut bits = vec![0u8; w * h];
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                bits[y * w + x] = 1;
            }
        }
        Mask::new(bits, w, h).unwrap()
    }

    #[test]
    fn empty_mask_stays_empty() {
        let mask = Mask::zeros(32, 24).unwrap();
        let cleaned = clean(&mask, StructuringElement::default());
        assert_eq!(cleaned, mask);
        assert_eq!(cleaned.count_set(), 0);
    }

    #[test]
    fn erode_and_dilate_grow_by_reach() {
        let mask = square_mask(20, 20, Rect::new(5, 5, 6, 6));
        let element = StructuringElement::square(3).unwrap();
        assert_eq!(dilate(&mask, element), square_mask(20, 20, Rect::new(4, 4, 8, 8)));
        assert_eq!(erode(&mask, element), square_mask(20, 20, Rect::new(6, 6, 4, 4)));
    }

    #[test]
    fn border_does_not_erode() {
        let full = square_mask(8, 8, Rect::new(0, 0, 8, 8));
        let eroded = erode(&full, StructuringElement::default());
        assert_eq!(eroded.count_set(), 64);
    }

    #[test]
    fn open_removes_specks_and_close_fills_gaps() {
        let element = StructuringElement::default();
        let mut bits = square_mask(30, 30, Rect::new(5, 5, 10, 10)).data().to_vec();
        bits[25 * 30 + 25] = 1;
        let speckled = Mask::new(bits, 30, 30).unwrap();
        assert_eq!(open(&speckled, element), square_mask(30, 30, Rect::new(5, 5, 10, 10)));

        let mut bits = square_mask(30, 30, Rect::new(5, 5, 10, 10)).data().to_vec();
        bits[10 * 30 + 10] = 0;
        let holed = Mask::new(bits, 30, 30).unwrap();
        assert_eq!(close(&holed, element), square_mask(30, 30, Rect::new(5, 5, 10, 10)));
    }

    #[test]
    fn coverage_counts_inside_box() {
        let mask = square_mask(10, 10, Rect::new(0, 0, 5, 10));
        assert!((mask.coverage(&Rect::new(0, 0, 10, 10)) - 0.5).abs() < 1e-6);
        assert_eq!(mask.count_set_in(&Rect::new(8, 8, 5, 5)), 0);
    }

    #[test]
    fn element_must_be_an_odd_square() {
        assert!(StructuringElement::square(0).is_err());
        assert!(StructuringElement::square(4).is_err());
        assert!(StructuringElement::square(513).is_err());
        assert_eq!(StructuringElement::square(1).unwrap().size(), 1);
        assert_eq!(StructuringElement::square(511).unwrap().size(), 511);
    }

    #[test]
    fn unit_element_leaves_mask_unchanged() {
        let mask = square_mask(12, 12, Rect::new(3, 4, 5, 2));
        let element = StructuringElement::square(1).unwrap();
        assert_eq!(dilate(&mask, element), mask);
        assert_eq!(clean(&mask, element), mask);
    }
}
