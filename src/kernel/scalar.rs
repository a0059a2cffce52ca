//! Scalar reference kernel for score evaluation.

use crate::geometry::Rect;
use crate::image::ImageView;
use crate::kernel::{ScanParams, SCORE_EPSILON};
use crate::merge::Candidate;
use crate::template::TemplatePlan;
use crate::util::{RegionScanError, RegionScanResult};

/// Summed-area tables of pixel values and squared pixel values.
///
/// Entry `(x, y)` holds the sum over the rectangle `[0, x) x [0, y)`, so any
/// window sum is four lookups.
struct IntegralImage {
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    fn new(image: ImageView<'_, u8>) -> Self {
        let stride = image.width() + 1;
        let len = stride * (image.height() + 1);
        let mut sum = vec![0u64; len];
        let mut sum_sq = vec![0u64; len];
        for (y, row) in image.rows().enumerate() {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }
        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// Returns `(sum, sum of squares)` over the window.
    fn window(&self, x: usize, y: usize, width: usize, height: usize) -> (f64, f64) {
        let top = y * self.stride;
        let bottom = (y + height) * self.stride;
        let (left, right) = (x, x + width);
        let area = |table: &[u64]| {
            (table[bottom + right] + table[top + left] - table[top + right] - table[bottom + left])
                as f64
        };
        (area(&self.sum), area(&self.sum_sq))
    }
}

fn window_dot(image: ImageView<'_, u8>, tpl: &TemplatePlan, x: usize, y: usize) -> Option<f64> {
    let tpl_width = tpl.width();
    let t_prime = tpl.t_prime();
    let mut dot = 0.0f64;
    for ty in 0..tpl.height() {
        let img_row = &image.row(y + ty)?[x..x + tpl_width];
        let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
        for (&t, &value) in tpl_row.iter().zip(img_row) {
            dot += t * f64::from(value);
        }
    }
    Some(dot)
}

fn finish_score(
    tpl: &TemplatePlan,
    dot: f64,
    sum_i: f64,
    sum_i2: f64,
    min_var_i: f32,
) -> Option<f32> {
    let n = (tpl.width() * tpl.height()) as f64;
    // sum(t') == 0, so sum(t' * i) == sum(t' * i').
    let var_i = sum_i2 - sum_i * sum_i / n;
    if var_i / n <= f64::from(min_var_i) {
        return None;
    }
    let score = dot / (tpl.var_t() * var_i).sqrt();
    score.is_finite().then(|| score.clamp(-1.0, 1.0) as f32)
}

/// Computes the score of the template placed with its top-left at `(x, y)`.
///
/// Returns `None` when the placement does not fit or the window is flatter
/// than `min_var_i`.
pub fn zncc_score_at(
    image: ImageView<'_, u8>,
    tpl: &TemplatePlan,
    x: usize,
    y: usize,
    min_var_i: f32,
) -> Option<f32> {
    let tpl_width = tpl.width();
    let tpl_height = tpl.height();
    if x + tpl_width > image.width() || y + tpl_height > image.height() {
        return None;
    }

    let mut sum_i = 0.0f64;
    let mut sum_i2 = 0.0f64;
    for ty in 0..tpl_height {
        for &value in &image.row(y + ty)?[x..x + tpl_width] {
            let v = f64::from(value);
            sum_i += v;
            sum_i2 += v * v;
        }
    }
    let dot = window_dot(image, tpl, x, y)?;
    finish_score(tpl, dot, sum_i, sum_i2, min_var_i)
}

/// Scans every placement and returns the ones scoring at least `min_score`.
///
/// Window statistics come from summed-area tables built once per call.
/// Candidates come out in raster order of their top-left corner, sized to
/// the template.
pub fn zncc_scan(
    image: ImageView<'_, u8>,
    tpl: &TemplatePlan,
    params: ScanParams,
) -> RegionScanResult<Vec<Candidate>> {
    let img_width = image.width();
    let img_height = image.height();
    let tpl_width = tpl.width();
    let tpl_height = tpl.height();
    if img_width < tpl_width || img_height < tpl_height {
        return Err(RegionScanError::DegenerateTemplate {
            reason: "template larger than image",
        });
    }

    let max_x = img_width - tpl_width;
    let max_y = img_height - tpl_height;
    let threshold = params.min_score - SCORE_EPSILON;
    let integral = IntegralImage::new(image);

    let mut out = Vec::new();
    for y in 0..=max_y {
        for x in 0..=max_x {
            let (sum_i, sum_i2) = integral.window(x, y, tpl_width, tpl_height);
            let Some(dot) = window_dot(image, tpl, x, y) else {
                continue;
            };
            let Some(score) = finish_score(tpl, dot, sum_i, sum_i2, params.min_var_i) else {
                continue;
            };
            if score >= threshold {
                out.push(Candidate {
                    rect: Rect::new(x, y, tpl_width, tpl_height),
                    score,
                });
            }
        }
    }
    Ok(out)
}
