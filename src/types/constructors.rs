//! Builder API for CSG trees
//!
//! Brushes and parameterized nodes validate their inputs and return
//! `Result`; plain set operators cannot fail.

use super::{Brush, CsgError, CsgNode, CsgTree, SetOp, Transform, Unbound};
use glam::{Quat, Vec3};

impl CsgTree {
    // === Brushes ===

    /// Sphere of `radius` centered at the origin
    pub fn sphere(radius: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Brush(Brush::Sphere { radius }))
    }

    /// Ellipsoid with semi-axis radii
    pub fn ellipsoid(rx: f32, ry: f32, rz: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Brush(Brush::Ellipsoid {
            radii: Vec3::new(rx, ry, rz),
        }))
    }

    /// Axis-aligned box with half-extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Brush(Brush::Box {
            extents: Vec3::new(hx, hy, hz),
        }))
    }

    /// Torus in the XY plane around the Z axis
    pub fn torus(major_radius: f32, minor_radius: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Brush(Brush::Torus {
            major_radius,
            minor_radius,
        }))
    }

    /// Capped cylinder along the Z axis
    pub fn cylinder(radius: f32, extent: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Brush(Brush::Cylinder { radius, extent }))
    }

    /// Cone along the Z axis with its base at `-height / 2`
    pub fn cone(radius: f32, height: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Brush(Brush::Cone { radius, height }))
    }

    /// Capped cone along the Z axis from `radius_low` to `radius_high`
    pub fn coninder(radius_low: f32, radius_high: f32, height: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Brush(Brush::Coninder {
            radius_low,
            radius_high,
            height,
        }))
    }

    /// Half-space `dot(p, normal) <= distance`
    pub fn plane(normal: Vec3, distance: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Unbound(Unbound::Plane { normal, distance }))
    }

    // === Set operators ===

    /// Hard set operator over two operands
    pub fn combine(op: SetOp, lhs: CsgTree, rhs: CsgTree) -> Self {
        Self::from_valid(CsgNode::Op { op, lhs, rhs })
    }

    /// Union with another tree
    pub fn union(self, other: CsgTree) -> Self {
        Self::combine(SetOp::Union, self, other)
    }

    /// Subtract another tree
    pub fn diff(self, other: CsgTree) -> Self {
        Self::combine(SetOp::Diff, self, other)
    }

    /// Intersect with another tree
    pub fn inter(self, other: CsgTree) -> Self {
        Self::combine(SetOp::Inter, self, other)
    }

    /// Smooth set operator with blend width `threshold`
    pub fn blend(op: SetOp, threshold: f32, lhs: CsgTree, rhs: CsgTree) -> Result<Self, CsgError> {
        Self::new(CsgNode::BlendOp {
            op,
            threshold,
            lhs,
            rhs,
        })
    }

    /// Smooth union with another tree
    pub fn blend_union(self, other: CsgTree, threshold: f32) -> Result<Self, CsgError> {
        Self::blend(SetOp::Union, threshold, self, other)
    }

    /// Smooth subtraction of another tree
    pub fn blend_diff(self, other: CsgTree, threshold: f32) -> Result<Self, CsgError> {
        Self::blend(SetOp::Diff, threshold, self, other)
    }

    /// Smooth intersection with another tree
    pub fn blend_inter(self, other: CsgTree, threshold: f32) -> Result<Self, CsgError> {
        Self::blend(SetOp::Inter, threshold, self, other)
    }

    // === Modifiers ===

    /// Apply a transform, folding it into a matching transform at the root
    pub fn transformed(self, transform: Transform) -> Result<Self, CsgError> {
        if let CsgNode::Transform {
            transform: inner,
            child,
        } = self.node()
        {
            let folded = match (*inner, transform) {
                (Transform::Translate(a), Transform::Translate(b)) => {
                    Some(Transform::Translate(a + b))
                }
                // The outer rotation applies after the inner one
                (Transform::Rotate(a), Transform::Rotate(b)) => Some(Transform::Rotate(b * a)),
                (Transform::Scale(a), Transform::Scale(b)) => Some(Transform::Scale(a * b)),
                _ => None,
            };
            if let Some(folded) = folded {
                return Self::new(CsgNode::Transform {
                    transform: folded,
                    child: child.clone(),
                });
            }
        }
        Self::new(CsgNode::Transform {
            transform,
            child: self,
        })
    }

    /// Move by an offset
    pub fn translate(self, x: f32, y: f32, z: f32) -> Result<Self, CsgError> {
        self.transformed(Transform::Translate(Vec3::new(x, y, z)))
    }

    /// Rotate by a quaternion (normalized on construction)
    pub fn rotate(self, rotation: Quat) -> Result<Self, CsgError> {
        self.transformed(Transform::Rotate(rotation))
    }

    /// Rotate by Euler angles in radians (XYZ order)
    pub fn rotate_euler(self, x: f32, y: f32, z: f32) -> Result<Self, CsgError> {
        self.rotate(Quat::from_euler(glam::EulerRot::XYZ, x, y, z))
    }

    /// Scale uniformly about the origin
    pub fn scale(self, factor: f32) -> Result<Self, CsgError> {
        self.transformed(Transform::Scale(factor))
    }

    /// Offset the surface outward by `radius` (inward when negative)
    pub fn flate(self, radius: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Flate {
            radius,
            child: self,
        })
    }

    /// Assign a material color
    pub fn paint(self, r: f32, g: f32, b: f32) -> Result<Self, CsgError> {
        Self::new(CsgNode::Paint {
            color: Vec3::new(r, g, b),
            child: self,
        })
    }
}
