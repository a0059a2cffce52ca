//! Reference patterns and their transformed variants.
//!
//! A pattern is resized per scale, rotated per angle and then turned into a
//! [`TemplatePlan`] holding the statistics the correlation kernel needs.

mod angles;
mod plan;
pub mod rotate;
mod transform;

pub use angles::AngleGrid;
pub use plan::TemplatePlan;
pub use transform::{
    default_rotations, scale_template, transform_template, TransformGrid, TransformSpec,
    DEFAULT_ROTATION_STEP_DEG, DEFAULT_SCALES,
};
