//! Torus brush
//!
//! The torus lies in the XY plane and wraps around the Z axis.

use glam::{Vec2, Vec3};

/// Signed distance to a torus in the XY plane centered at origin
///
/// # Arguments
/// * `point` - Point to evaluate
/// * `major_radius` - Distance from center of torus to center of tube
/// * `minor_radius` - Radius of the tube
#[inline(always)]
pub fn sdf_torus(point: Vec3, major_radius: f32, minor_radius: f32) -> f32 {
    let q = Vec2::new(point.truncate().length() - major_radius, point.z);
    q.length() - minor_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_hole() {
        let d = sdf_torus(Vec3::ZERO, 2.0, 0.5);
        assert!((d - 1.5).abs() < 0.0001);
    }

    #[test]
    fn test_torus_tube_center() {
        let d = sdf_torus(Vec3::new(0.0, 2.0, 0.0), 2.0, 0.5);
        assert!((d + 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_torus_surface_along_z() {
        let d = sdf_torus(Vec3::new(2.0, 0.0, 0.5), 2.0, 0.5);
        assert!(d.abs() < 0.0001);
    }

    #[test]
    fn test_torus_not_in_xz_plane() {
        // A point on the XZ ring would be far outside an XY torus
        let d = sdf_torus(Vec3::new(0.0, 0.0, 2.0), 2.0, 0.5);
        assert!(d > 1.0);
    }
}
