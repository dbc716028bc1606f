//! Intersection operation

/// Intersection of two SDFs (maximum distance)
#[inline(always)]
pub fn sdf_intersection(d1: f32, d2: f32) -> f32 {
    d1.max(d2)
}
