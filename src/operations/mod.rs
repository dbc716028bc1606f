//! CSG set operators
//!
//! Hard operators are exact combinations of their operands; the smooth
//! variants round the seam within a threshold-wide band.

mod intersection;
mod smooth;
mod subtraction;
mod union;

pub use intersection::sdf_intersection;
pub use smooth::{
    blend_half_width, sdf_smooth_intersection, sdf_smooth_subtraction, sdf_smooth_union,
    smooth_max, smooth_min,
};
pub use subtraction::sdf_subtraction;
pub use union::sdf_union;

use crate::types::SetOp;

/// Combine two distances with a hard operator
#[inline]
pub fn apply_op(op: SetOp, lhs: f32, rhs: f32) -> f32 {
    match op {
        SetOp::Union => sdf_union(lhs, rhs),
        SetOp::Diff => sdf_subtraction(lhs, rhs),
        SetOp::Inter => sdf_intersection(lhs, rhs),
    }
}

/// Combine two distances with a smooth operator
#[inline]
pub fn apply_blend(op: SetOp, threshold: f32, lhs: f32, rhs: f32) -> f32 {
    match op {
        SetOp::Union => sdf_smooth_union(lhs, rhs, threshold),
        SetOp::Diff => sdf_smooth_subtraction(lhs, rhs, threshold),
        SetOp::Inter => sdf_smooth_intersection(lhs, rhs, threshold),
    }
}
