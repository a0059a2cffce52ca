//! Error types for regionscan.

use thiserror::Error;

/// Result alias for regionscan operations.
pub type RegionScanResult<T> = std::result::Result<T, RegionScanError>;

/// Errors that can occur when running the detectors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegionScanError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// An image or view has a zero or overflowing dimension.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer is shorter than the dimensions require.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// A requested rectangle does not fit inside the image.
    #[error(
        "roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A required image is missing or has no pixels.
    #[error("empty image: {what}")]
    EmptyImage { what: &'static str },
    /// The image could not be read, decoded or encoded.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
    /// A color range has inverted or out-of-range bounds.
    #[error("invalid color range {name:?}: {reason}")]
    InvalidColorRange { name: String, reason: &'static str },
    /// A scale or rotation parameter is unusable.
    #[error("invalid transform: {reason}")]
    InvalidTransform { reason: &'static str },
    /// A transformed template cannot be correlated (too small, too large or flat).
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// The dedicated worker pool could not be created.
    #[error("thread pool: {reason}")]
    ThreadPool { reason: String },
}

impl RegionScanError {
    /// Returns true for errors caused by the caller's images or parameters.
    ///
    /// Input errors abort a single call and are never retried; the remaining
    /// variants indicate an internal or resource failure.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            RegionScanError::RoiOutOfBounds { .. }
                | RegionScanError::DegenerateTemplate { .. }
                | RegionScanError::ThreadPool { .. }
        )
    }
}
