//! Cone brushes
//!
//! Both cones run along Z and are centered on the origin. The plain cone is
//! a capped cone whose upper radius is zero.

use glam::{Vec2, Vec3};

/// Signed distance to a capped cone along the Z axis
///
/// # Arguments
/// * `point` - Point to evaluate
/// * `radius_low` - Radius at `z = -half_height`
/// * `radius_high` - Radius at `z = +half_height`
/// * `half_height` - Half the distance between the caps
#[inline(always)]
pub fn sdf_coninder(point: Vec3, radius_low: f32, radius_high: f32, half_height: f32) -> f32 {
    let h = half_height;
    let q = Vec2::new(point.truncate().length(), point.z);
    let k1 = Vec2::new(radius_high, h);
    let k2 = Vec2::new(radius_high - radius_low, 2.0 * h);

    let cap_radius = if q.y < 0.0 { radius_low } else { radius_high };
    let ca = Vec2::new(q.x - q.x.min(cap_radius), q.y.abs() - h);
    let t = ((k1 - q).dot(k2) / k2.dot(k2)).clamp(0.0, 1.0);
    let cb = q - k1 + k2 * t;

    let s = if cb.x < 0.0 && ca.y < 0.0 { -1.0 } else { 1.0 };
    s * ca.dot(ca).min(cb.dot(cb)).sqrt()
}

/// Signed distance to a cone along the Z axis, apex at `+height / 2`
#[inline(always)]
pub fn sdf_cone(point: Vec3, radius: f32, height: f32) -> f32 {
    sdf_coninder(point, radius, 0.0, height * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cone_apex_and_rim() {
        assert!(sdf_cone(Vec3::new(0.0, 0.0, 1.0), 1.0, 2.0).abs() < 0.0001);
        assert!(sdf_cone(Vec3::new(1.0, 0.0, -1.0), 1.0, 2.0).abs() < 0.0001);
        assert!(sdf_cone(Vec3::ZERO, 1.0, 2.0) < 0.0);
    }

    #[test]
    fn test_cone_below_base() {
        let d = sdf_cone(Vec3::new(0.0, 0.0, -1.5), 1.0, 2.0);
        assert!((d - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_coninder_equal_radii_is_cylinder() {
        let d = sdf_coninder(Vec3::new(0.0, 1.5, 0.0), 1.0, 1.0, 2.0);
        assert!((d - 0.5).abs() < 0.0001);
        let d = sdf_coninder(Vec3::new(0.0, 0.0, 3.0), 1.0, 1.0, 2.0);
        assert!((d - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_coninder_caps() {
        // Wider at the bottom
        assert!(sdf_coninder(Vec3::new(0.9, 0.0, -0.99), 1.0, 0.25, 1.0) < 0.0);
        assert!(sdf_coninder(Vec3::new(0.9, 0.0, 0.99), 1.0, 0.25, 1.0) > 0.0);
        let d = sdf_coninder(Vec3::new(0.0, 0.0, 1.5), 1.0, 0.25, 1.0);
        assert!((d - 0.5).abs() < 0.0001);
    }
}
