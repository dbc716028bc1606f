//! Translation

use glam::Vec3;

/// Map a query point into the local space of a child moved by `offset`
#[inline(always)]
pub fn transform_translate(point: Vec3, offset: Vec3) -> Vec3 {
    point - offset
}
