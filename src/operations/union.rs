//! Union operation

/// Union of two SDFs (minimum distance)
#[inline(always)]
pub fn sdf_union(d1: f32, d2: f32) -> f32 {
    d1.min(d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        assert_eq!(sdf_union(1.0, 2.0), 1.0);
        assert_eq!(sdf_union(-0.5, 2.0), -0.5);
    }
}
