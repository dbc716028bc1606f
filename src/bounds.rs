//! Culling bounds of a cluster subtree
//!
//! [`culling_bounds`] bounds the solid a subtree can produce, with one
//! exception: a plain (non-blended) union is bounded by the *intersection*
//! of its operand bounds. Clusters tagged with a union come from overlap
//! regions, where the intersection is the region that matters for tile
//! selection. It is never used for evaluation.
//!
//! Blend padding matches segmentation: a blended union can add material up
//! to `k + k / 4` around the operand overlap. Blended subtraction and
//! intersection only remove material, so they keep their hard bound.

use crate::aabb::{primitives, Aabb};
use crate::operations::blend_half_width;
use crate::types::{CsgNode, CsgTree, SetOp, Transform};

/// Bound used only to select tiles; plain unions use the intersection
pub fn culling_bounds(tree: &CsgTree) -> Aabb {
    match tree.node() {
        CsgNode::Brush(brush) => primitives::brush_aabb(brush),
        CsgNode::Unbound(shape) => primitives::unbound_aabb(shape),
        CsgNode::Op { op, lhs, rhs } => {
            let (l, r) = (culling_bounds(lhs), culling_bounds(rhs));
            match op {
                SetOp::Union | SetOp::Inter => l.intersect(&r),
                SetOp::Diff => l,
            }
        }
        CsgNode::BlendOp {
            op,
            threshold,
            lhs,
            rhs,
        } => {
            let (l, r) = (culling_bounds(lhs), culling_bounds(rhs));
            match op {
                SetOp::Union => {
                    let k = *threshold;
                    let liminal = l.intersect(&r).pad(k + blend_half_width(k));
                    let combined = l.hull(&r);
                    if liminal.is_valid() {
                        combined.hull(&liminal)
                    } else {
                        combined
                    }
                }
                SetOp::Diff => l,
                SetOp::Inter => l.intersect(&r),
            }
        }
        CsgNode::Transform { transform, child } => {
            let inner = culling_bounds(child);
            if !inner.is_valid() {
                return inner;
            }
            match *transform {
                Transform::Translate(offset) => inner.translate(offset),
                Transform::Rotate(rotation) => inner.rotate(rotation),
                Transform::Scale(factor) => inner.scale(factor),
            }
        }
        CsgNode::Paint { child, .. } => culling_bounds(child),
        // Inexact child distances can undershoot, so grow by twice the radius
        CsgNode::Flate { radius, child } => {
            let inner = culling_bounds(child);
            if inner.is_valid() {
                inner.pad(2.0 * radius.max(0.0))
            } else {
                inner
            }
        }
    }
}
