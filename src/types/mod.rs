//! Core types for Tangerine
//!
//! Defines the CSG expression tree. A tree is an immutable, reference counted
//! value: identical subtrees compare equal, hash equal, and can be shared by any
//! number of parents.
//!
//! Every [`CsgTree`] handle carries a structural hash computed once at
//! construction, so equality checks on large shared trees are cheap in the
//! common case (pointer identity or hash mismatch).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

mod constructors;
mod expr;
mod interner;

pub use expr::EXPR_KINDS;
pub use interner::CsgInterner;

/// Model errors raised while constructing a tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CsgError {
    /// The expression kind is not a known brush, operator or modifier
    #[error("unknown expression kind: {0}")]
    UnknownKind(String),

    /// Wrong number of child expressions
    #[error("{kind} expects {expected} operand(s), got {found}")]
    WrongArity {
        /// Expression kind
        kind: String,
        /// Required operand count
        expected: usize,
        /// Supplied operand count
        found: usize,
    },

    /// Wrong number of scalar parameters
    #[error("{kind} expects {expected} parameter(s), got {found}")]
    WrongParamCount {
        /// Expression kind
        kind: String,
        /// Required parameter count
        expected: usize,
        /// Supplied parameter count
        found: usize,
    },

    /// A parameter is out of range or not finite
    #[error("invalid {kind} parameter: {reason}")]
    InvalidParameter {
        /// Expression kind
        kind: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

/// Closed-form bounded shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Brush {
    /// Sphere centered at origin
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Ellipsoid with semi-axis radii
    Ellipsoid {
        /// Semi-axis radii (x, y, z)
        radii: Vec3,
    },
    /// Axis-aligned box
    Box {
        /// Half-extents along each axis
        extents: Vec3,
    },
    /// Torus lying in the XY plane around the Z axis
    Torus {
        /// Distance from center to tube center
        major_radius: f32,
        /// Tube radius
        minor_radius: f32,
    },
    /// Capped cylinder along the Z axis
    Cylinder {
        /// Cylinder radius
        radius: f32,
        /// Half the cylinder length
        extent: f32,
    },
    /// Cone along the Z axis, base at `-height / 2`, apex at `+height / 2`
    Cone {
        /// Base radius
        radius: f32,
        /// Full height, base to apex
        height: f32,
    },
    /// Capped cone along the Z axis, centered on the origin
    Coninder {
        /// Radius of the cap at `-height / 2`
        radius_low: f32,
        /// Radius of the cap at `+height / 2`
        radius_high: f32,
        /// Full height, cap to cap
        height: f32,
    },
}

impl Brush {
    /// Name used by the expression builder and the code generator
    pub fn name(&self) -> &'static str {
        match self {
            Brush::Sphere { .. } => "sphere",
            Brush::Ellipsoid { .. } => "ellipsoid",
            Brush::Box { .. } => "box",
            Brush::Torus { .. } => "torus",
            Brush::Cylinder { .. } => "cylinder",
            Brush::Cone { .. } => "cone",
            Brush::Coninder { .. } => "coninder",
        }
    }

    /// Scalar parameters in declaration order
    pub fn params(&self) -> Vec<f32> {
        match *self {
            Brush::Sphere { radius } => vec![radius],
            Brush::Ellipsoid { radii } => radii.to_array().to_vec(),
            Brush::Box { extents } => extents.to_array().to_vec(),
            Brush::Torus {
                major_radius,
                minor_radius,
            } => vec![major_radius, minor_radius],
            Brush::Cylinder { radius, extent } => vec![radius, extent],
            Brush::Cone { radius, height } => vec![radius, height],
            Brush::Coninder {
                radius_low,
                radius_high,
                height,
            } => vec![radius_low, radius_high, height],
        }
    }

    fn validate(&self) -> Result<(), CsgError> {
        let kind = self.name();
        for value in self.params() {
            if !value.is_finite() || value <= 0.0 {
                return Err(CsgError::InvalidParameter {
                    kind,
                    reason: format!("expected a positive finite value, got {}", value),
                });
            }
        }
        Ok(())
    }
}

/// Shapes without a finite bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unbound {
    /// Half-space: solid where `dot(p, normal) - distance <= 0`
    Plane {
        /// Unit plane normal
        normal: Vec3,
        /// Signed distance from origin along the normal
        distance: f32,
    },
}

impl Unbound {
    /// Name used by the expression builder and the code generator
    pub fn name(&self) -> &'static str {
        match self {
            Unbound::Plane { .. } => "plane",
        }
    }

    fn canonical(self) -> Result<Self, CsgError> {
        match self {
            Unbound::Plane { normal, distance } => {
                let length = normal.length();
                if !normal.is_finite() || !distance.is_finite() || length < 1e-8 {
                    return Err(CsgError::InvalidParameter {
                        kind: "plane",
                        reason: format!("normal {:?} / distance {} is degenerate", normal, distance),
                    });
                }
                Ok(Unbound::Plane {
                    normal: unit_or_keep(normal, length),
                    distance,
                })
            }
        }
    }
}

/// Divide by `length` unless already unit, so loading a saved tree
/// reproduces it bit for bit
fn unit_or_keep<T: std::ops::Div<f32, Output = T>>(value: T, length: f32) -> T {
    if (length - 1.0).abs() <= 1e-6 {
        value
    } else {
        value / length
    }
}

/// Boolean set operator family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOp {
    /// min(lhs, rhs)
    Union,
    /// max(lhs, -rhs)
    Diff,
    /// max(lhs, rhs)
    Inter,
}

impl SetOp {
    /// Expression name of the hard operator
    pub fn name(self) -> &'static str {
        match self {
            SetOp::Union => "union",
            SetOp::Diff => "diff",
            SetOp::Inter => "inter",
        }
    }

    /// Expression name of the blended operator
    pub fn blend_name(self) -> &'static str {
        match self {
            SetOp::Union => "blend_union",
            SetOp::Diff => "blend_diff",
            SetOp::Inter => "blend_inter",
        }
    }
}

/// Similarity transform applied to a child tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Move the child by an offset
    Translate(Vec3),
    /// Rotate the child by a unit quaternion
    Rotate(Quat),
    /// Scale the child uniformly about the origin
    Scale(f32),
}

impl Transform {
    /// Map a parent-space point into the child's local space
    #[inline]
    pub fn apply_inverse(&self, point: Vec3) -> Vec3 {
        match *self {
            Transform::Translate(offset) => crate::transforms::transform_translate(point, offset),
            Transform::Rotate(rotation) => crate::transforms::transform_rotate(point, rotation),
            Transform::Scale(factor) => crate::transforms::transform_scale(point, factor),
        }
    }

    /// Factor turning a child-space distance into a parent-space one
    #[inline]
    pub fn distance_scale(&self) -> f32 {
        match *self {
            Transform::Scale(factor) => factor,
            Transform::Translate(_) | Transform::Rotate(_) => 1.0,
        }
    }

    fn canonical(self) -> Result<Self, CsgError> {
        match self {
            Transform::Translate(offset) if offset.is_finite() => Ok(self),
            Transform::Translate(offset) => Err(CsgError::InvalidParameter {
                kind: "move",
                reason: format!("offset {:?} is not finite", offset),
            }),
            Transform::Rotate(rotation) => {
                let length = rotation.length();
                if !rotation.is_finite() || length < 1e-8 {
                    return Err(CsgError::InvalidParameter {
                        kind: "rotate",
                        reason: format!("quaternion {:?} is degenerate", rotation),
                    });
                }
                Ok(Transform::Rotate(unit_or_keep(rotation, length)))
            }
            Transform::Scale(factor) if factor.is_finite() && factor > 0.0 => Ok(self),
            Transform::Scale(factor) => Err(CsgError::InvalidParameter {
                kind: "scale",
                reason: format!("factor must be positive, got {}", factor),
            }),
        }
    }
}

/// A node of the CSG expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsgNode {
    /// Bounded primitive
    Brush(Brush),
    /// Unbounded primitive
    Unbound(Unbound),
    /// Hard set operator
    Op {
        /// Operator family
        op: SetOp,
        /// Left operand
        lhs: CsgTree,
        /// Right operand
        rhs: CsgTree,
    },
    /// Smooth set operator
    BlendOp {
        /// Operator family
        op: SetOp,
        /// Blend width, always positive
        threshold: f32,
        /// Left operand
        lhs: CsgTree,
        /// Right operand
        rhs: CsgTree,
    },
    /// Translation, rotation or uniform scale
    Transform {
        /// The transform
        transform: Transform,
        /// Transformed subtree
        child: CsgTree,
    },
    /// Material color; does not change the distance
    Paint {
        /// Linear RGB color
        color: Vec3,
        /// Painted subtree
        child: CsgTree,
    },
    /// Offset surface: grows the child by `radius`, or shrinks it when
    /// negative
    Flate {
        /// Offset distance
        radius: f32,
        /// Offset subtree
        child: CsgTree,
    },
}

impl CsgNode {
    fn canonical(self) -> Result<Self, CsgError> {
        match self {
            CsgNode::Brush(brush) => {
                brush.validate()?;
                Ok(CsgNode::Brush(brush))
            }
            CsgNode::Unbound(shape) => Ok(CsgNode::Unbound(shape.canonical()?)),
            CsgNode::BlendOp {
                op,
                threshold,
                lhs,
                rhs,
            } => {
                if !threshold.is_finite() || threshold <= 0.0 {
                    return Err(CsgError::InvalidParameter {
                        kind: "blend",
                        reason: format!("threshold must be positive, got {}", threshold),
                    });
                }
                Ok(CsgNode::BlendOp {
                    op,
                    threshold,
                    lhs,
                    rhs,
                })
            }
            CsgNode::Transform { transform, child } => Ok(CsgNode::Transform {
                transform: transform.canonical()?,
                child,
            }),
            CsgNode::Paint { color, child } => {
                if !color.is_finite() {
                    return Err(CsgError::InvalidParameter {
                        kind: "paint",
                        reason: format!("color {:?} is not finite", color),
                    });
                }
                Ok(CsgNode::Paint { color, child })
            }
            CsgNode::Flate { radius, child } => {
                if !radius.is_finite() {
                    return Err(CsgError::InvalidParameter {
                        kind: "flate",
                        reason: format!("radius {} is not finite", radius),
                    });
                }
                Ok(CsgNode::Flate { radius, child })
            }
            op @ CsgNode::Op { .. } => Ok(op),
        }
    }

    /// Child subtrees, left to right
    pub fn children(&self) -> impl Iterator<Item = &CsgTree> {
        let (first, second) = match self {
            CsgNode::Brush(_) | CsgNode::Unbound(_) => (None, None),
            CsgNode::Op { lhs, rhs, .. } | CsgNode::BlendOp { lhs, rhs, .. } => {
                (Some(lhs), Some(rhs))
            }
            CsgNode::Transform { child, .. }
            | CsgNode::Paint { child, .. }
            | CsgNode::Flate { child, .. } => (Some(child), None),
        };
        first.into_iter().chain(second)
    }
}

#[inline]
fn hash_f32<H: Hasher>(value: f32, state: &mut H) {
    // +0.0 and -0.0 compare equal, so they must hash equal
    (value + 0.0).to_bits().hash(state);
}

fn hash_vec3<H: Hasher>(value: Vec3, state: &mut H) {
    hash_f32(value.x, state);
    hash_f32(value.y, state);
    hash_f32(value.z, state);
}

fn structural_hash(node: &CsgNode) -> u64 {
    let mut state = DefaultHasher::new();
    match node {
        CsgNode::Brush(brush) => {
            0u8.hash(&mut state);
            brush.name().hash(&mut state);
            for value in brush.params() {
                hash_f32(value, &mut state);
            }
        }
        CsgNode::Unbound(Unbound::Plane { normal, distance }) => {
            1u8.hash(&mut state);
            hash_vec3(*normal, &mut state);
            hash_f32(*distance, &mut state);
        }
        CsgNode::Op { op, lhs, rhs } => {
            2u8.hash(&mut state);
            op.hash(&mut state);
            lhs.hash.hash(&mut state);
            rhs.hash.hash(&mut state);
        }
        CsgNode::BlendOp {
            op,
            threshold,
            lhs,
            rhs,
        } => {
            3u8.hash(&mut state);
            op.hash(&mut state);
            hash_f32(*threshold, &mut state);
            lhs.hash.hash(&mut state);
            rhs.hash.hash(&mut state);
        }
        CsgNode::Transform { transform, child } => {
            4u8.hash(&mut state);
            match transform {
                Transform::Translate(offset) => {
                    0u8.hash(&mut state);
                    hash_vec3(*offset, &mut state);
                }
                Transform::Rotate(rotation) => {
                    1u8.hash(&mut state);
                    for value in rotation.to_array() {
                        hash_f32(value, &mut state);
                    }
                }
                Transform::Scale(factor) => {
                    2u8.hash(&mut state);
                    hash_f32(*factor, &mut state);
                }
            }
            child.hash.hash(&mut state);
        }
        CsgNode::Paint { color, child } => {
            5u8.hash(&mut state);
            hash_vec3(*color, &mut state);
            child.hash.hash(&mut state);
        }
        CsgNode::Flate { radius, child } => {
            6u8.hash(&mut state);
            hash_f32(*radius, &mut state);
            child.hash.hash(&mut state);
        }
    }
    state.finish()
}

/// Shared, immutable handle to a CSG node
///
/// Cloning is a reference count bump. Use the builder methods
/// (`CsgTree::sphere`, `union`, `translate`, ...) or
/// [`CsgTree::from_expr`] to create trees.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "CsgNode", try_from = "CsgNode")]
pub struct CsgTree {
    inner: Arc<CsgNode>,
    hash: u64,
    node_count: u32,
}

impl CsgTree {
    /// Validate and wrap a node
    ///
    /// Plane normals and rotation quaternions are normalized; every other
    /// parameter must already be in range.
    pub fn new(node: CsgNode) -> Result<Self, CsgError> {
        Ok(Self::from_valid(node.canonical()?))
    }

    /// Wrap a node whose parameters are already canonical
    pub(crate) fn from_valid(node: CsgNode) -> Self {
        let hash = structural_hash(&node);
        let node_count = 1 + node.children().map(|c| c.node_count).sum::<u32>();
        CsgTree {
            inner: Arc::new(node),
            hash,
            node_count,
        }
    }

    /// The root node
    #[inline]
    pub fn node(&self) -> &CsgNode {
        &self.inner
    }

    /// Structural hash (equal trees always share it)
    #[inline]
    pub fn structural_hash(&self) -> u64 {
        self.hash
    }

    /// Number of nodes, counting shared subtrees once per reference
    #[inline]
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    /// True when both handles point at the same allocation
    #[inline]
    pub fn ptr_eq(a: &CsgTree, b: &CsgTree) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl PartialEq for CsgTree {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || (self.hash == other.hash && self.inner == other.inner)
    }
}

// Parameters are validated finite, so float equality is reflexive here.
impl Eq for CsgTree {}

impl Hash for CsgTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for CsgTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.node(), f)
    }
}

impl From<CsgTree> for CsgNode {
    fn from(tree: CsgTree) -> Self {
        Arc::try_unwrap(tree.inner).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl TryFrom<CsgNode> for CsgTree {
    type Error = CsgError;

    fn try_from(node: CsgNode) -> Result<Self, Self::Error> {
        CsgTree::new(node)
    }
}
