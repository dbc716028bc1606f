//! Subtraction (cut) operation

/// Subtract the second shape from the first
#[inline(always)]
pub fn sdf_subtraction(d1: f32, d2: f32) -> f32 {
    d1.max(-d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtraction_carves_inside() {
        // Inside both: the cut wins
        assert_eq!(sdf_subtraction(-1.0, -0.25), 0.25);
        // Outside the cutter: the base is unchanged
        assert_eq!(sdf_subtraction(-1.0, 2.0), -1.0);
    }
}
