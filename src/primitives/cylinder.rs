//! Cylinder brush
//!
//! Capped cylinder whose axis runs along Z.

use glam::{Vec2, Vec3};

/// Signed distance to a capped cylinder along the Z axis
///
/// # Arguments
/// * `point` - Point to evaluate
/// * `radius` - Cylinder radius
/// * `extent` - Half of the cylinder length
#[inline(always)]
pub fn sdf_cylinder(point: Vec3, radius: f32, extent: f32) -> f32 {
    let d = Vec2::new(point.truncate().length() - radius, point.z.abs() - extent);
    d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
}
