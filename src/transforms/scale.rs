//! Uniform scale
//!
//! The child is evaluated at `point / factor` and its distance multiplied
//! by `factor`, which keeps the result a true distance.

use glam::Vec3;

/// Map a query point into the local space of a child scaled by `factor`
#[inline(always)]
pub fn transform_scale(point: Vec3, factor: f32) -> Vec3 {
    point / factor
}
