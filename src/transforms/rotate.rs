//! Rotation
//!
//! Rotations are stored as unit quaternions, so the inverse is the conjugate.

use glam::{Quat, Vec3};

/// Map a query point into the local space of a child rotated by `rotation`
#[inline(always)]
pub fn transform_rotate(point: Vec3, rotation: Quat) -> Vec3 {
    rotation.conjugate() * point
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_quarter_turn() {
        let q = Quat::from_rotation_z(FRAC_PI_2);
        // A child rotated +90 degrees about Z: world +Y is local +X
        let local = transform_rotate(Vec3::Y, q);
        assert!((local - Vec3::X).length() < 0.0001);
    }

    #[test]
    fn test_rotate_keeps_length() {
        let q = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0);
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!((transform_rotate(p, q).length() - p.length()).abs() < 0.0001);
    }
}
