//! Drawing bounding boxes and labels onto result images.
//!
//! Outlines and text go through `imageproc`. Labels use the bundled DejaVu
//! Sans face. All drawing is clipped to the image; nothing here can fail.

use crate::geometry::Rect;
use crate::trace::trace_event;
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size as glyph_extent};
use imageproc::rect::Rect as PixelRect;

/// Box color used by both detectors.
pub const GREEN: [u8; 3] = [0, 255, 0];
/// Label color used by the color detector.
pub const BLACK: [u8; 3] = [0, 0, 0];

/// Gap between the top edge of a box and the bottom of its label.
pub const LABEL_OFFSET: usize = 10;

/// Pixel height labels are rendered at.
pub const LABEL_SCALE: f32 = 14.0;

static LABEL_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

fn label_font() -> Option<FontRef<'static>> {
    match FontRef::try_from_slice(LABEL_FONT) {
        Ok(font) => Some(font),
        Err(_) => {
            trace_event!("label_font_unreadable", bytes = LABEL_FONT.len());
            None
        }
    }
}

/// Draws the outline of `rect`, growing inwards by `thickness` pixels.
pub fn draw_rect(img: &mut RgbImage, rect: &Rect, rgb: [u8; 3], thickness: usize) {
    let (width, height) = img.dimensions();
    let Some(rect) = rect.clamp_to(width as usize, height as usize) else {
        return;
    };
    for inset in 0..thickness.max(1) {
        if rect.width <= 2 * inset || rect.height <= 2 * inset {
            break;
        }
        let ring = PixelRect::at((rect.x + inset) as i32, (rect.y + inset) as i32)
            .of_size((rect.width - 2 * inset) as u32, (rect.height - 2 * inset) as u32);
        draw_hollow_rect_mut(img, ring, Rgb(rgb));
    }
}

/// Pixel size of `text` rendered at `scale` pixels high.
pub fn text_size(text: &str, scale: f32) -> (usize, usize) {
    let Some(font) = label_font() else {
        return (0, 0);
    };
    let (w, h) = glyph_extent(PxScale::from(scale), &font, text);
    (w as usize, h as usize)
}

/// Draws `text` with its top-left corner at `(x, y)`.
pub fn draw_text(
    img: &mut RgbImage,
    text: &str,
    x: usize,
    y: usize,
    rgb: [u8; 3],
    scale: f32,
) {
    let Some(font) = label_font() else {
        return;
    };
    draw_text_mut(
        img,
        Rgb(rgb),
        x as i32,
        y as i32,
        PxScale::from(scale),
        &font,
        text,
    );
}

/// Draws a label whose bottom sits [`LABEL_OFFSET`] pixels above `rect`.
///
/// Labels that would leave the image are pushed back inside it.
pub fn draw_label(img: &mut RgbImage, rect: &Rect, text: &str, rgb: [u8; 3]) {
    let (width, height) = img.dimensions();
    let (text_w, text_h) = text_size(text, LABEL_SCALE);
    let top = rect.y.saturating_sub(LABEL_OFFSET + text_h);
    let top = top.min((height as usize).saturating_sub(text_h));
    let left = rect.x.min((width as usize).saturating_sub(text_w));
    draw_text(img, text, left, top, rgb, LABEL_SCALE);
}
