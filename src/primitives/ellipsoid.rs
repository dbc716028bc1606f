//! Ellipsoid brush
//!
//! Approximate distance using Inigo Quilez's `k0*(k0-1)/k1` bound.

use glam::Vec3;

/// Approximate SDF for an ellipsoid centered at origin
///
/// # Arguments
/// * `p` - Point to evaluate
/// * `radii` - Semi-axes lengths (x, y, z)
#[inline(always)]
pub fn sdf_ellipsoid(p: Vec3, radii: Vec3) -> f32 {
    let radii = radii.max(Vec3::splat(1e-10));
    let k0 = (p / radii).length();
    let k1 = (p / (radii * radii)).length();
    if k1 < 1e-10 {
        return -radii.min_element();
    }
    k0 * (k0 - 1.0) / k1
}
