//! CPU evaluation of CSG trees
//!
//! Recursive distance, gradient and material sampling. The scheduler's draw
//! phase and the tests use these as the reference for the generated GLSL.

use crate::operations::{apply_blend, apply_op};
use crate::primitives::{sdf_brush, sdf_unbound};
use crate::types::{CsgNode, CsgTree, SetOp};
use glam::Vec3;

/// Color returned where no paint applies
pub const NULL_COLOR: Vec3 = Vec3::ONE;

/// Evaluate a tree at a single point
///
/// # Arguments
/// * `tree` - The tree root
/// * `point` - Point to evaluate
///
/// # Returns
/// Signed distance bound (negative inside)
pub fn eval(tree: &CsgTree, point: Vec3) -> f32 {
    match tree.node() {
        CsgNode::Brush(brush) => sdf_brush(point, brush),
        CsgNode::Unbound(shape) => sdf_unbound(point, shape),
        CsgNode::Op { op, lhs, rhs } => apply_op(*op, eval(lhs, point), eval(rhs, point)),
        CsgNode::BlendOp {
            op,
            threshold,
            lhs,
            rhs,
        } => apply_blend(*op, *threshold, eval(lhs, point), eval(rhs, point)),
        CsgNode::Transform { transform, child } => {
            eval(child, transform.apply_inverse(point)) * transform.distance_scale()
        }
        CsgNode::Paint { child, .. } => eval(child, point),
        CsgNode::Flate { radius, child } => eval(child, point) - radius,
    }
}

/// Material color at a point
///
/// Subtraction takes the color of its left operand; other set operators
/// take the color of whichever operand is nearer. The outermost paint wins.
pub fn sample_color(tree: &CsgTree, point: Vec3) -> Vec3 {
    match tree.node() {
        CsgNode::Brush(_) | CsgNode::Unbound(_) => NULL_COLOR,
        CsgNode::Op { op, lhs, rhs } | CsgNode::BlendOp { op, lhs, rhs, .. } => {
            if *op == SetOp::Diff || eval(lhs, point) <= eval(rhs, point) {
                sample_color(lhs, point)
            } else {
                sample_color(rhs, point)
            }
        }
        CsgNode::Transform { transform, child } => {
            sample_color(child, transform.apply_inverse(point))
        }
        CsgNode::Paint { color, .. } => *color,
        CsgNode::Flate { child, .. } => sample_color(child, point),
    }
}

/// Unnormalized central-difference gradient
#[inline]
pub fn gradient(tree: &CsgTree, point: Vec3, epsilon: f32) -> Vec3 {
    let ex = Vec3::new(epsilon, 0.0, 0.0);
    let ey = Vec3::new(0.0, epsilon, 0.0);
    let ez = Vec3::new(0.0, 0.0, epsilon);

    Vec3::new(
        eval(tree, point + ex) - eval(tree, point - ex),
        eval(tree, point + ey) - eval(tree, point - ey),
        eval(tree, point + ez) - eval(tree, point - ez),
    ) / (2.0 * epsilon)
}

/// Surface normal by central differences
///
/// Falls back to +Z where the gradient vanishes.
pub fn normal(tree: &CsgTree, point: Vec3, epsilon: f32) -> Vec3 {
    let grad = gradient(tree, point, epsilon);
    let len_sq = grad.length_squared();
    if !(len_sq >= 1e-20) {
        return Vec3::Z;
    }
    grad / len_sq.sqrt()
}
