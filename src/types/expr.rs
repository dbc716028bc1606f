//! Expression builder
//!
//! Name/parameter/children entry point for authoring bindings, plus an
//! s-expression `Display` that prints trees in the same vocabulary.

use super::{Brush, CsgError, CsgNode, CsgTree, SetOp, Transform, Unbound};
use glam::{Quat, Vec3};
use std::fmt;

/// Every kind accepted by [`CsgTree::from_expr`], with (parameter, operand) counts
pub const EXPR_KINDS: &[(&str, usize, usize)] = &[
    ("sphere", 1, 0),
    ("ellipsoid", 3, 0),
    ("box", 3, 0),
    ("torus", 2, 0),
    ("cylinder", 2, 0),
    ("cone", 2, 0),
    ("coninder", 3, 0),
    ("plane", 4, 0),
    ("union", 0, 2),
    ("diff", 0, 2),
    ("inter", 0, 2),
    ("blend_union", 1, 2),
    ("blend_diff", 1, 2),
    ("blend_inter", 1, 2),
    ("move", 3, 1),
    ("rotate", 4, 1),
    ("scale", 1, 1),
    ("flate", 1, 1),
    ("paint", 3, 1),
];

impl CsgTree {
    /// Build a node from its kind name, scalar parameters and operands
    ///
    /// `plane` takes `(nx, ny, nz, distance)` and `rotate` takes a quaternion
    /// as `(x, y, z, w)`. Transforms coalesce like the builder methods.
    pub fn from_expr(kind: &str, params: &[f32], children: &[CsgTree]) -> Result<Self, CsgError> {
        let &(_, param_count, arity) = EXPR_KINDS
            .iter()
            .find(|(name, _, _)| *name == kind)
            .ok_or_else(|| CsgError::UnknownKind(kind.to_string()))?;

        if children.len() != arity {
            return Err(CsgError::WrongArity {
                kind: kind.to_string(),
                expected: arity,
                found: children.len(),
            });
        }
        if params.len() != param_count {
            return Err(CsgError::WrongParamCount {
                kind: kind.to_string(),
                expected: param_count,
                found: params.len(),
            });
        }

        let p = params;
        let operand = |i: usize| children[i].clone();
        match kind {
            "sphere" => Self::sphere(p[0]),
            "ellipsoid" => Self::ellipsoid(p[0], p[1], p[2]),
            "box" => Self::cuboid(p[0], p[1], p[2]),
            "torus" => Self::torus(p[0], p[1]),
            "cylinder" => Self::cylinder(p[0], p[1]),
            "cone" => Self::cone(p[0], p[1]),
            "coninder" => Self::coninder(p[0], p[1], p[2]),
            "plane" => Self::plane(Vec3::new(p[0], p[1], p[2]), p[3]),
            "union" => Ok(operand(0).union(operand(1))),
            "diff" => Ok(operand(0).diff(operand(1))),
            "inter" => Ok(operand(0).inter(operand(1))),
            "blend_union" => Self::blend(SetOp::Union, p[0], operand(0), operand(1)),
            "blend_diff" => Self::blend(SetOp::Diff, p[0], operand(0), operand(1)),
            "blend_inter" => Self::blend(SetOp::Inter, p[0], operand(0), operand(1)),
            "move" => operand(0).translate(p[0], p[1], p[2]),
            "rotate" => operand(0).rotate(Quat::from_xyzw(p[0], p[1], p[2], p[3])),
            "scale" => operand(0).scale(p[0]),
            "flate" => operand(0).flate(p[0]),
            "paint" => operand(0).paint(p[0], p[1], p[2]),
            _ => Err(CsgError::UnknownKind(kind.to_string())),
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, values: &[f32]) -> fmt::Result {
    for value in values {
        write!(f, " {}", value)?;
    }
    Ok(())
}

impl fmt::Display for CsgTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            CsgNode::Brush(brush) => {
                write!(f, "({}", brush.name())?;
                write_params(f, &brush.params())?;
                write!(f, ")")
            }
            CsgNode::Unbound(shape @ Unbound::Plane { normal, distance }) => {
                write!(f, "({}", shape.name())?;
                write_params(f, &[normal.x, normal.y, normal.z, *distance])?;
                write!(f, ")")
            }
            CsgNode::Op { op, lhs, rhs } => write!(f, "({} {} {})", op.name(), lhs, rhs),
            CsgNode::BlendOp {
                op,
                threshold,
                lhs,
                rhs,
            } => write!(f, "({} {} {} {})", op.blend_name(), threshold, lhs, rhs),
            CsgNode::Transform { transform, child } => {
                match transform {
                    Transform::Translate(t) => {
                        write!(f, "(move")?;
                        write_params(f, &t.to_array())?;
                    }
                    Transform::Rotate(q) => {
                        write!(f, "(rotate")?;
                        write_params(f, &q.to_array())?;
                    }
                    Transform::Scale(factor) => write!(f, "(scale {}", factor)?,
                }
                write!(f, " {})", child)
            }
            CsgNode::Paint { color, child } => {
                write!(f, "(paint")?;
                write_params(f, &color.to_array())?;
                write!(f, " {})", child)
            }
            CsgNode::Flate { radius, child } => write!(f, "(flate {} {})", radius, child),
        }
    }
}

impl fmt::Display for Brush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name())?;
        write_params(f, &self.params())?;
        write!(f, ")")
    }
}
