//! Correlation kernels.
//!
//! The score is the zero-mean normalized cross-correlation
//! `sum(t' * i') / sqrt(sum(t'^2) * sum(i'^2))`, where `t'` and `i'` are the
//! template and the image window minus their means. It lies in `[-1, 1]`.

mod scalar;

pub use scalar::{zncc_scan, zncc_score_at};

/// Tolerance applied when comparing scores against the threshold, so an exact
/// match still passes a threshold of `1.0` despite float rounding.
pub const SCORE_EPSILON: f32 = 1e-5;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Minimum per-pixel variance of the image window; flatter windows are skipped.
    pub min_var_i: f32,
    /// Minimum score for a placement to be reported.
    pub min_score: f32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            min_var_i: 1e-3,
            min_score: 0.8,
        }
    }
}
