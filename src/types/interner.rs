//! Hash-consing for CSG trees
//!
//! Trees built independently by an authoring layer are often structurally
//! identical. Interning maps each structure to one shared allocation so
//! later equality checks reduce to pointer comparisons.

use super::{CsgNode, CsgTree};
use std::collections::HashSet;

/// Table of canonical tree handles
#[derive(Debug, Default)]
pub struct CsgInterner {
    table: HashSet<CsgTree>,
}

impl CsgInterner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct structures seen
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Return the canonical handle for `tree`, interning every subtree
    pub fn intern(&mut self, tree: &CsgTree) -> CsgTree {
        if let Some(existing) = self.table.get(tree) {
            return existing.clone();
        }

        let rebuilt = match tree.node() {
            CsgNode::Brush(_) | CsgNode::Unbound(_) => tree.clone(),
            CsgNode::Op { op, lhs, rhs } => CsgTree::from_valid(CsgNode::Op {
                op: *op,
                lhs: self.intern(lhs),
                rhs: self.intern(rhs),
            }),
            CsgNode::BlendOp {
                op,
                threshold,
                lhs,
                rhs,
            } => CsgTree::from_valid(CsgNode::BlendOp {
                op: *op,
                threshold: *threshold,
                lhs: self.intern(lhs),
                rhs: self.intern(rhs),
            }),
            CsgNode::Transform { transform, child } => CsgTree::from_valid(CsgNode::Transform {
                transform: *transform,
                child: self.intern(child),
            }),
            CsgNode::Paint { color, child } => CsgTree::from_valid(CsgNode::Paint {
                color: *color,
                child: self.intern(child),
            }),
            CsgNode::Flate { radius, child } => CsgTree::from_valid(CsgNode::Flate {
                radius: *radius,
                child: self.intern(child),
            }),
        };

        self.table.insert(rebuilt.clone());
        rebuilt
    }
}
