//! Box brush

use glam::Vec3;

/// Signed distance to an axis-aligned box centered at origin
///
/// # Arguments
/// * `point` - Point to evaluate
/// * `half_extents` - Half-size on each axis
///
/// # Returns
/// Signed distance (negative inside, positive outside)
#[inline(always)]
pub fn sdf_box3d(point: Vec3, half_extents: Vec3) -> f32 {
    let q = point.abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_center() {
        let d = sdf_box3d(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert!((d + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_box_face() {
        let d = sdf_box3d(Vec3::new(0.0, 0.0, 4.0), Vec3::new(1.0, 2.0, 3.0));
        assert!((d - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_box_corner_distance() {
        let d = sdf_box3d(Vec3::new(2.0, 2.0, 2.0), Vec3::ONE);
        assert!((d - 3.0_f32.sqrt()).abs() < 0.0001);
    }
}
