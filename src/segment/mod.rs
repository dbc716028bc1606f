//! Cluster segmentation
//!
//! Decomposes a CSG tree into disjoint boxes, each tagged with the smallest
//! subtree that evaluates to the right sign inside it.
//!
//! # Rules
//!
//! - **Leaf**: one box from the closed-form bound.
//! - **Transform / Paint**: recurse, move each box, rewrap each subtree.
//!   Rotated boxes that come to overlap collapse into their hull, tagged with
//!   the whole transform node.
//! - **Flate**: one box, the hull of the child's pieces grown by twice a
//!   positive radius, tagged with the whole node.
//! - **Union**: the overlap of both operand bounds is cut out of every piece
//!   and tagged with a union of the operands local to it. A union of a tree
//!   with itself is the tree.
//! - **Diff**: only the left operand's pieces survive; the overlap (clamped
//!   to the left bound) is tagged with the difference.
//! - **Inter**: one box, the bound intersection, tagged with the whole node.
//!
//! Blends widen the overlap: by the transition half-width `k / 4` for
//! subtraction and intersection, and by the liminal region `k + k / 4` for
//! union, where the smooth minimum can go negative between two shapes.

mod cluster;

pub use cluster::{Cluster, ClusterSet};

use crate::aabb::{primitives, Aabb, SubtreeAabb};
use crate::config::SegmentConfig;
use crate::operations::blend_half_width;
use crate::types::{CsgNode, CsgTree, SetOp, Transform};
use log::debug;

/// Segmentation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentError {
    /// Some region has no finite bound (an unbounded shape was not
    /// intersected with a bounded one)
    #[error("{regions} region(s) have no finite bound, first: {first:?}")]
    InfiniteBounds {
        /// Number of unbounded regions
        regions: usize,
        /// The first offending box
        first: Aabb,
    },
}

/// Segment a tree with the default configuration
pub fn segment(tree: &CsgTree) -> Result<Vec<SubtreeAabb>, SegmentError> {
    segment_with(tree, &SegmentConfig::default())
}

/// Segment a tree
///
/// Invalid boxes are dropped. Any remaining box with an infinite coordinate
/// is an error.
pub fn segment_with(
    tree: &CsgTree,
    config: &SegmentConfig,
) -> Result<Vec<SubtreeAabb>, SegmentError> {
    let segmenter = Segmenter { config };
    let pieces: Vec<SubtreeAabb> = segmenter
        .segments(tree)
        .into_iter()
        .filter(|piece| piece.aabb.is_valid())
        .collect();

    let mut unbounded = pieces.iter().filter(|piece| !piece.aabb.is_finite());
    if let Some(first) = unbounded.next() {
        return Err(SegmentError::InfiniteBounds {
            regions: 1 + unbounded.count(),
            first: first.aabb,
        });
    }

    debug!(
        "segmented {} node(s) into {} region(s)",
        tree.node_count(),
        pieces.len()
    );
    Ok(pieces)
}

/// True when every piece subtree of `tree` is negative only where `tree`
/// itself is, so a union of pieces can stand in for the tree
///
/// Subtractions break this: a piece carrying only the left operand is
/// negative inside the carved region.
pub fn union_exact(tree: &CsgTree) -> bool {
    match tree.node() {
        CsgNode::Brush(_) | CsgNode::Unbound(_) => true,
        CsgNode::Op { op, lhs, rhs } | CsgNode::BlendOp { op, lhs, rhs, .. } => match op {
            SetOp::Union => union_exact(lhs) && union_exact(rhs),
            SetOp::Inter => true,
            SetOp::Diff => false,
        },
        CsgNode::Transform { child, .. } | CsgNode::Paint { child, .. } => union_exact(child),
        CsgNode::Flate { .. } => true,
    }
}

/// Hull of a list of pieces, `Aabb::EMPTY` when there are none
fn bound(pieces: &[SubtreeAabb]) -> Aabb {
    pieces
        .iter()
        .fold(Aabb::EMPTY, |acc, piece| acc.hull(&piece.aabb))
}

/// Stand-in for `side` inside `region`
///
/// The union of the side's piece subtrees that touch the region, or the side
/// itself when its pieces do not compose back by union.
fn local_subtree(side: &CsgTree, pieces: &[SubtreeAabb], region: &Aabb) -> CsgTree {
    if !union_exact(side) {
        return side.clone();
    }
    SubtreeAabb::merge_all(pieces.iter().filter(|piece| piece.aabb.overlaps(region)))
        .map(|merged| merged.subtree)
        .unwrap_or_else(|| side.clone())
}

/// Rebuild a single-child node around a new child, reusing `parent` when
/// the child is unchanged
fn rewrap(parent: &CsgTree, old_child: &CsgTree, new_child: CsgTree) -> CsgTree {
    if CsgTree::ptr_eq(old_child, &new_child) || *old_child == new_child {
        return parent.clone();
    }
    match parent.node() {
        CsgNode::Transform { transform, .. } => CsgTree::from_valid(CsgNode::Transform {
            transform: *transform,
            child: new_child,
        }),
        CsgNode::Paint { color, .. } => CsgTree::from_valid(CsgNode::Paint {
            color: *color,
            child: new_child,
        }),
        _ => parent.clone(),
    }
}

/// Rebuild a binary hard operator, reusing `parent` when nothing changed
fn rebuild_op(parent: &CsgTree, op: SetOp, lhs: CsgTree, rhs: CsgTree) -> CsgTree {
    match parent.node() {
        CsgNode::Op {
            lhs: old_lhs,
            rhs: old_rhs,
            ..
        } if *old_lhs == lhs && *old_rhs == rhs => parent.clone(),
        _ => CsgTree::combine(op, lhs, rhs),
    }
}

struct Segmenter<'a> {
    config: &'a SegmentConfig,
}

impl Segmenter<'_> {
    fn segments(&self, tree: &CsgTree) -> Vec<SubtreeAabb> {
        match tree.node() {
            CsgNode::Brush(brush) => {
                vec![SubtreeAabb::new(primitives::brush_aabb(brush), tree.clone())]
            }
            CsgNode::Unbound(shape) => {
                vec![SubtreeAabb::new(primitives::unbound_aabb(shape), tree.clone())]
            }
            CsgNode::Transform { transform, child } => self.transformed(tree, transform, child),
            CsgNode::Paint { child, .. } => self
                .segments(child)
                .into_iter()
                .map(|piece| SubtreeAabb::new(piece.aabb, rewrap(tree, child, piece.subtree)))
                .collect(),
            CsgNode::Flate { radius, child } => {
                let region = bound(&self.segments(child));
                if region.is_valid() {
                    vec![SubtreeAabb::new(region.pad(2.0 * radius.max(0.0)), tree.clone())]
                } else {
                    Vec::new()
                }
            }
            CsgNode::Op { op, lhs, rhs } => match op {
                SetOp::Union if lhs == rhs => self.segments(lhs),
                SetOp::Union => self.union(tree, lhs, rhs, None),
                SetOp::Diff => self.diff(tree, lhs, rhs, None),
                SetOp::Inter => self.inter(tree, lhs, rhs, None),
            },
            CsgNode::BlendOp {
                op,
                threshold,
                lhs,
                rhs,
            } => match op {
                SetOp::Union => self.union(tree, lhs, rhs, Some(*threshold)),
                SetOp::Diff => self.diff(tree, lhs, rhs, Some(*threshold)),
                SetOp::Inter => self.inter(tree, lhs, rhs, Some(*threshold)),
            },
        }
    }

    fn transformed(
        &self,
        tree: &CsgTree,
        transform: &Transform,
        child: &CsgTree,
    ) -> Vec<SubtreeAabb> {
        let mut pieces: Vec<SubtreeAabb> = self
            .segments(child)
            .into_iter()
            .map(|piece| {
                let aabb = match *transform {
                    Transform::Translate(offset) => piece.aabb.translate(offset),
                    Transform::Rotate(rotation) => piece.aabb.rotate(rotation),
                    Transform::Scale(factor) => piece.aabb.scale(factor),
                };
                SubtreeAabb::new(aabb, rewrap(tree, child, piece.subtree))
            })
            .filter(|piece| piece.aabb.is_valid())
            .collect();

        if let Transform::Rotate(_) = transform {
            collapse_overlaps(&mut pieces, tree);
        }
        pieces
    }

    /// Pieces of `side` with `region` cut out
    fn clipped(&self, side: &[SubtreeAabb], region: &Aabb) -> Vec<SubtreeAabb> {
        side.iter()
            .flat_map(|piece| {
                piece
                    .aabb
                    .clip(region, self.config.mutual_clip)
                    .into_iter()
                    .filter(Aabb::is_valid)
                    .map(|aabb| SubtreeAabb::new(aabb, piece.subtree.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn union(
        &self,
        tree: &CsgTree,
        lhs: &CsgTree,
        rhs: &CsgTree,
        threshold: Option<f32>,
    ) -> Vec<SubtreeAabb> {
        let left = self.segments(lhs);
        let right = self.segments(rhs);

        let contact = bound(&left).intersect(&bound(&right));
        let overlap = match threshold {
            Some(k) => contact.pad(k + blend_half_width(k)),
            None => contact,
        };
        if !overlap.is_valid() {
            return left.into_iter().chain(right).collect();
        }

        let tag = match threshold {
            Some(_) => tree.clone(),
            None => rebuild_op(
                tree,
                SetOp::Union,
                local_subtree(lhs, &left, &overlap),
                local_subtree(rhs, &right, &overlap),
            ),
        };

        let mut pieces = self.clipped(&left, &overlap);
        pieces.extend(self.clipped(&right, &overlap));
        pieces.push(SubtreeAabb::new(overlap, tag));
        pieces
    }

    fn diff(
        &self,
        tree: &CsgTree,
        lhs: &CsgTree,
        rhs: &CsgTree,
        threshold: Option<f32>,
    ) -> Vec<SubtreeAabb> {
        let left = self.segments(lhs);
        let right = self.segments(rhs);

        let lm = bound(&left);
        let pad = threshold.map(blend_half_width).unwrap_or(0.0);
        let overlap = lm.intersect(&bound(&right)).pad(pad).intersect(&lm);
        if !overlap.is_valid() {
            return left;
        }

        let tag = match threshold {
            Some(_) => tree.clone(),
            None => rebuild_op(
                tree,
                SetOp::Diff,
                local_subtree(lhs, &left, &overlap),
                local_subtree(rhs, &right, &overlap),
            ),
        };

        let mut pieces = self.clipped(&left, &overlap);
        pieces.push(SubtreeAabb::new(overlap, tag));
        pieces
    }

    fn inter(
        &self,
        tree: &CsgTree,
        lhs: &CsgTree,
        rhs: &CsgTree,
        threshold: Option<f32>,
    ) -> Vec<SubtreeAabb> {
        let pad = threshold.map(blend_half_width).unwrap_or(0.0);
        let region = bound(&self.segments(lhs))
            .intersect(&bound(&self.segments(rhs)))
            .pad(pad);
        if region.is_valid() {
            vec![SubtreeAabb::new(region, tree.clone())]
        } else {
            Vec::new()
        }
    }
}

/// Merge overlapping boxes until all are disjoint
///
/// Every merged box is tagged with `whole`, which is exact everywhere.
fn collapse_overlaps(pieces: &mut Vec<SubtreeAabb>, whole: &CsgTree) {
    loop {
        let pair = (0..pieces.len()).find_map(|i| {
            (i + 1..pieces.len())
                .find(|&j| pieces[i].aabb.overlaps(&pieces[j].aabb))
                .map(|j| (i, j))
        });
        let Some((i, j)) = pair else {
            return;
        };
        let absorbed = pieces.remove(j);
        pieces[i] = SubtreeAabb::new(pieces[i].aabb.hull(&absorbed.aabb), whole.clone());
    }
}
