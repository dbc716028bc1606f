//! Smooth set operators
//!
//! Polynomial smooth min/max. Inside the transition band `|a - b| < k` the
//! result deviates from the hard operator by at most `k / 4`; segmentation
//! pads blend overlaps by exactly that amount.

/// Largest distance between a blended result and its hard counterpart
#[inline(always)]
pub fn blend_half_width(k: f32) -> f32 {
    k * 0.25
}

/// Polynomial smooth minimum
#[inline(always)]
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    let k = k.max(1e-10);
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

/// Polynomial smooth maximum
#[inline(always)]
pub fn smooth_max(a: f32, b: f32, k: f32) -> f32 {
    let k = k.max(1e-10);
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.max(b) + h * h * k * 0.25
}

/// Smooth union of two SDFs
#[inline(always)]
pub fn sdf_smooth_union(d1: f32, d2: f32, k: f32) -> f32 {
    smooth_min(d1, d2, k)
}

/// Smooth intersection of two SDFs
#[inline(always)]
pub fn sdf_smooth_intersection(d1: f32, d2: f32, k: f32) -> f32 {
    smooth_max(d1, d2, k)
}

/// Smooth subtraction of B from A
#[inline(always)]
pub fn sdf_smooth_subtraction(d1: f32, d2: f32, k: f32) -> f32 {
    smooth_max(d1, -d2, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_union_matches_min_far_apart() {
        assert_eq!(sdf_smooth_union(1.0, 3.0, 0.5), 1.0);
    }

    #[test]
    fn test_smooth_union_deviation_bounded() {
        let k = 0.8;
        let d = sdf_smooth_union(0.2, 0.2, k);
        assert!((0.2 - d - blend_half_width(k)).abs() < 1e-6);
    }

    #[test]
    fn test_smooth_union_symmetry() {
        let a = sdf_smooth_union(0.5, 0.8, 0.3);
        let b = sdf_smooth_union(0.8, 0.5, 0.3);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_smooth_subtraction_never_below_hard() {
        for i in 0..20 {
            let d1 = -1.0 + i as f32 * 0.1;
            let hard = d1.max(0.1);
            assert!(sdf_smooth_subtraction(d1, -0.1, 0.5) >= hard);
        }
    }

    #[test]
    fn test_smooth_intersection_above_max() {
        assert!(sdf_smooth_intersection(0.1, 0.2, 0.5) >= 0.2);
    }
}
