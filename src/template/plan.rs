//! Template plan precomputation for normalized cross-correlation.

use crate::image::ImageView;
use crate::util::{RegionScanError, RegionScanResult};

/// Precomputed statistics and zero-mean buffer for one template variant.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f64,
    var_t: f64,
    t_prime: Vec<f64>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Fails with [`RegionScanError::DegenerateTemplate`] when every pixel has
    /// the same value, since the correlation is undefined for a flat template.
    pub fn from_view(tpl: ImageView<'_, u8>) -> RegionScanResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = (width * height) as f64;

        let sum: f64 = tpl
            .rows()
            .flat_map(|row| row.iter())
            .map(|&v| f64::from(v))
            .sum();
        let mean = sum / count;

        let t_prime: Vec<f64> = tpl
            .rows()
            .flat_map(|row| row.iter())
            .map(|&v| f64::from(v) - mean)
            .collect();
        let var_t: f64 = t_prime.iter().map(|v| v * v).sum();
        if var_t / count <= 1e-8 {
            return Err(RegionScanError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            mean,
            var_t,
            t_prime,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f64] {
        &self.t_prime
    }
}

#[cfg(test)]
mod tests {
    use super::TemplatePlan;
    use crate::image::ImageView;
    use crate::util::RegionScanError;

    #[test]
    fn plan_matches_known_stats() {
        let data = [0u8, 1, 2, 3];
        let plan = TemplatePlan::from_view(ImageView::from_slice(&data, 2, 2).unwrap()).unwrap();
        assert!((plan.mean() - 1.5).abs() < 1e-12);
        assert!((plan.var_t() - 5.0).abs() < 1e-12);
        assert_eq!(plan.t_prime(), &[-1.5, -0.5, 0.5, 1.5]);
    }

    #[test]
    fn flat_template_is_degenerate() {
        let data = [9u8; 16];
        let err = TemplatePlan::from_view(ImageView::from_slice(&data, 4, 4).unwrap()).unwrap_err();
        assert_eq!(
            err,
            RegionScanError::DegenerateTemplate {
                reason: "zero variance"
            }
        );
    }
}
