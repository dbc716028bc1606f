//! Primitive distance functions
//!
//! One file per brush. [`sdf_brush`] and [`sdf_unbound`] dispatch over the
//! node payloads so callers never match on parameter lists themselves.

mod box3d;
mod cone;
mod cylinder;
mod ellipsoid;
mod plane;
mod sphere;
mod torus;

pub use box3d::sdf_box3d;
pub use cone::{sdf_cone, sdf_coninder};
pub use cylinder::sdf_cylinder;
pub use ellipsoid::sdf_ellipsoid;
pub use plane::sdf_plane;
pub use sphere::sdf_sphere;
pub use torus::sdf_torus;

use crate::types::{Brush, Unbound};
use glam::Vec3;

/// Evaluate a brush in its local space
#[inline]
pub fn sdf_brush(point: Vec3, brush: &Brush) -> f32 {
    match *brush {
        Brush::Sphere { radius } => sdf_sphere(point, radius),
        Brush::Ellipsoid { radii } => sdf_ellipsoid(point, radii),
        Brush::Box { extents } => sdf_box3d(point, extents),
        Brush::Torus {
            major_radius,
            minor_radius,
        } => sdf_torus(point, major_radius, minor_radius),
        Brush::Cylinder { radius, extent } => sdf_cylinder(point, radius, extent),
        Brush::Cone { radius, height } => sdf_cone(point, radius, height),
        Brush::Coninder {
            radius_low,
            radius_high,
            height,
        } => sdf_coninder(point, radius_low, radius_high, height * 0.5),
    }
}

/// Evaluate an unbounded shape in its local space
#[inline]
pub fn sdf_unbound(point: Vec3, shape: &Unbound) -> f32 {
    match *shape {
        Unbound::Plane { normal, distance } => sdf_plane(point, normal, distance),
    }
}
