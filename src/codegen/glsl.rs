//! GLSL lowering of CSG subtrees
//!
//! Each node kind becomes a call to a small helper function. Operands are
//! lowered first and passed as arguments, so a subtree is one nested
//! expression. Only the helpers a model actually references are emitted,
//! in first-use order.

use crate::types::{Brush, CsgNode, CsgTree, SetOp, Transform, Unbound};
use glam::{Quat, Vec3};

/// GLSL float literal
///
/// Shortest text that reads back as the same `f32`, always with a decimal
/// point so GLSL types it as a float.
pub(crate) fn float_literal(value: f32) -> String {
    let text = format!("{:?}", value);
    match text.find('e') {
        Some(at) if !text[..at].contains('.') => format!("{}.0{}", &text[..at], &text[at..]),
        None if !text.contains('.') => format!("{}.0", text),
        _ => text,
    }
}

pub(crate) fn vec3_literal(value: Vec3) -> String {
    format!(
        "vec3({}, {}, {})",
        float_literal(value.x),
        float_literal(value.y),
        float_literal(value.z)
    )
}

fn vec4_literal(value: Quat) -> String {
    format!(
        "vec4({}, {}, {}, {})",
        float_literal(value.x),
        float_literal(value.y),
        float_literal(value.z),
        float_literal(value.w)
    )
}

/// Lowering state for one compilation unit
#[derive(Debug, Default)]
pub(crate) struct GlslTranspiler {
    /// Helper functions referenced so far
    helper_functions: Vec<&'static str>,
}

impl GlslTranspiler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn ensure_helper(&mut self, name: &'static str) {
        if !self.helper_functions.contains(&name) {
            self.helper_functions.push(name);
        }
    }

    /// Names of the helpers referenced so far
    pub(crate) fn helper_names(&self) -> &[&'static str] {
        &self.helper_functions
    }

    /// Source of every referenced helper
    pub(crate) fn helper_source(&self) -> String {
        let mut source = String::new();
        for name in &self.helper_functions {
            if let Some(body) = helper_body(name) {
                source.push_str(body);
                source.push_str("\n\n");
            }
        }
        source
    }

    /// Lower a tree to a distance expression over `point`
    pub(crate) fn distance_expr(&mut self, tree: &CsgTree, point: &str) -> String {
        match tree.node() {
            CsgNode::Brush(brush) => self.brush_call(brush, point),
            CsgNode::Unbound(Unbound::Plane { normal, distance }) => {
                self.ensure_helper("PlaneBrush");
                format!(
                    "PlaneBrush({}, {}, {})",
                    point,
                    vec3_literal(*normal),
                    float_literal(*distance)
                )
            }
            CsgNode::Op { op, lhs, rhs } => {
                let name = match op {
                    SetOp::Union => "UnionOp",
                    SetOp::Diff => "CutOp",
                    SetOp::Inter => "IntersectionOp",
                };
                let l = self.distance_expr(lhs, point);
                let r = self.distance_expr(rhs, point);
                self.ensure_helper(name);
                format!("{}({}, {})", name, l, r)
            }
            CsgNode::BlendOp {
                op,
                threshold,
                lhs,
                rhs,
            } => {
                let name = match op {
                    SetOp::Union => "SmoothUnionOp",
                    SetOp::Diff => "SmoothCutOp",
                    SetOp::Inter => "SmoothIntersectionOp",
                };
                let l = self.distance_expr(lhs, point);
                let r = self.distance_expr(rhs, point);
                self.ensure_helper(name);
                format!("{}({}, {}, {})", name, l, r, float_literal(*threshold))
            }
            CsgNode::Transform { transform, child } => match *transform {
                Transform::Translate(offset) => {
                    let local = format!("({} - {})", point, vec3_literal(offset));
                    self.distance_expr(child, &local)
                }
                Transform::Rotate(rotation) => {
                    self.ensure_helper("QuaternionTransform");
                    let local = format!(
                        "QuaternionTransform({}, {})",
                        point,
                        vec4_literal(rotation.conjugate())
                    );
                    self.distance_expr(child, &local)
                }
                Transform::Scale(factor) => {
                    let factor = float_literal(factor);
                    let local = format!("({} / {})", point, factor);
                    format!("({} * {})", self.distance_expr(child, &local), factor)
                }
            },
            // Color is resolved outside the distance function
            CsgNode::Paint { child, .. } => self.distance_expr(child, point),
            CsgNode::Flate { radius, child } => {
                let inner = self.distance_expr(child, point);
                self.ensure_helper("FlateOp");
                format!("FlateOp({}, {})", inner, float_literal(*radius))
            }
        }
    }

    fn brush_call(&mut self, brush: &Brush, point: &str) -> String {
        match *brush {
            Brush::Sphere { radius } => {
                self.ensure_helper("SphereBrush");
                format!("SphereBrush({}, {})", point, float_literal(radius))
            }
            Brush::Ellipsoid { radii } => {
                self.ensure_helper("EllipsoidBrush");
                format!("EllipsoidBrush({}, {})", point, vec3_literal(radii))
            }
            Brush::Box { extents } => {
                self.ensure_helper("BoxBrush");
                format!("BoxBrush({}, {})", point, vec3_literal(extents))
            }
            Brush::Torus {
                major_radius,
                minor_radius,
            } => {
                self.ensure_helper("TorusBrush");
                format!(
                    "TorusBrush({}, {}, {})",
                    point,
                    float_literal(major_radius),
                    float_literal(minor_radius)
                )
            }
            Brush::Cylinder { radius, extent } => {
                self.ensure_helper("CylinderBrush");
                format!(
                    "CylinderBrush({}, {}, {})",
                    point,
                    float_literal(radius),
                    float_literal(extent)
                )
            }
            Brush::Cone { radius, height } => {
                self.ensure_helper("ConeBrush");
                format!(
                    "ConeBrush({}, {}, {})",
                    point,
                    float_literal(radius),
                    float_literal(height)
                )
            }
            Brush::Coninder {
                radius_low,
                radius_high,
                height,
            } => {
                self.ensure_helper("ConinderBrush");
                format!(
                    "ConinderBrush({}, {}, {}, {})",
                    point,
                    float_literal(radius_low),
                    float_literal(radius_high),
                    float_literal(height * 0.5)
                )
            }
        }
    }
}

fn helper_body(name: &str) -> Option<&'static str> {
    let body = match name {
        "SphereBrush" => HELPER_SPHERE,
        "EllipsoidBrush" => HELPER_ELLIPSOID,
        "BoxBrush" => HELPER_BOX,
        "TorusBrush" => HELPER_TORUS,
        "CylinderBrush" => HELPER_CYLINDER,
        "ConeBrush" => HELPER_CONE,
        "ConinderBrush" => HELPER_CONINDER,
        "PlaneBrush" => HELPER_PLANE,
        "UnionOp" => HELPER_UNION,
        "CutOp" => HELPER_CUT,
        "IntersectionOp" => HELPER_INTERSECTION,
        "SmoothUnionOp" => HELPER_SMOOTH_UNION,
        "SmoothCutOp" => HELPER_SMOOTH_CUT,
        "SmoothIntersectionOp" => HELPER_SMOOTH_INTERSECTION,
        "FlateOp" => HELPER_FLATE,
        "QuaternionTransform" => HELPER_QUATERNION_TRANSFORM,
        _ => return None,
    };
    Some(body)
}

const HELPER_SPHERE: &str = r#"float SphereBrush(vec3 Point, float Radius) {
    return length(Point) - Radius;
}"#;

const HELPER_ELLIPSOID: &str = r#"float EllipsoidBrush(vec3 Point, vec3 Radii) {
    float K0 = length(Point / Radii);
    float K1 = length(Point / (Radii * Radii));
    return K1 < 1e-10 ? -min(Radii.x, min(Radii.y, Radii.z)) : K0 * (K0 - 1.0) / K1;
}"#;

const HELPER_BOX: &str = r#"float BoxBrush(vec3 Point, vec3 Extents) {
    vec3 Q = abs(Point) - Extents;
    return length(max(Q, vec3(0.0))) + min(max(Q.x, max(Q.y, Q.z)), 0.0);
}"#;

const HELPER_TORUS: &str = r#"float TorusBrush(vec3 Point, float MajorRadius, float MinorRadius) {
    vec2 Q = vec2(length(Point.xy) - MajorRadius, Point.z);
    return length(Q) - MinorRadius;
}"#;

const HELPER_CYLINDER: &str = r#"float CylinderBrush(vec3 Point, float Radius, float Extent) {
    vec2 D = vec2(length(Point.xy) - Radius, abs(Point.z) - Extent);
    return min(max(D.x, D.y), 0.0) + length(max(D, vec2(0.0)));
}"#;

const HELPER_CONE: &str = r#"float ConeBrush(vec3 Point, float Radius, float Height) {
    float HalfHeight = Height * 0.5;
    vec2 Q = vec2(length(Point.xy), Point.z);
    vec2 K1 = vec2(0.0, HalfHeight);
    vec2 K2 = vec2(-Radius, Height);
    vec2 CA = vec2(Q.x - min(Q.x, Q.y < 0.0 ? Radius : 0.0), abs(Q.y) - HalfHeight);
    vec2 CB = Q - K1 + K2 * clamp(dot(K1 - Q, K2) / dot(K2, K2), 0.0, 1.0);
    float S = (CB.x < 0.0 && CA.y < 0.0) ? -1.0 : 1.0;
    return S * sqrt(min(dot(CA, CA), dot(CB, CB)));
}"#;

const HELPER_CONINDER: &str = r#"float ConinderBrush(vec3 Point, float RadiusLow, float RadiusHigh, float HalfHeight) {
    vec2 Q = vec2(length(Point.xy), Point.z);
    vec2 K1 = vec2(RadiusHigh, HalfHeight);
    vec2 K2 = vec2(RadiusHigh - RadiusLow, 2.0 * HalfHeight);
    vec2 CA = vec2(Q.x - min(Q.x, Q.y < 0.0 ? RadiusLow : RadiusHigh), abs(Q.y) - HalfHeight);
    vec2 CB = Q - K1 + K2 * clamp(dot(K1 - Q, K2) / dot(K2, K2), 0.0, 1.0);
    float S = (CB.x < 0.0 && CA.y < 0.0) ? -1.0 : 1.0;
    return S * sqrt(min(dot(CA, CA), dot(CB, CB)));
}"#;

const HELPER_PLANE: &str = r#"float PlaneBrush(vec3 Point, vec3 Normal, float Distance) {
    return dot(Point, Normal) - Distance;
}"#;

const HELPER_UNION: &str = r#"float UnionOp(float LHS, float RHS) {
    return min(LHS, RHS);
}"#;

const HELPER_CUT: &str = r#"float CutOp(float LHS, float RHS) {
    return max(LHS, -RHS);
}"#;

const HELPER_INTERSECTION: &str = r#"float IntersectionOp(float LHS, float RHS) {
    return max(LHS, RHS);
}"#;

const HELPER_SMOOTH_UNION: &str = r#"float SmoothUnionOp(float LHS, float RHS, float Threshold) {
    float H = max(Threshold - abs(LHS - RHS), 0.0) / Threshold;
    return min(LHS, RHS) - H * H * Threshold * 0.25;
}"#;

const HELPER_SMOOTH_CUT: &str = r#"float SmoothCutOp(float LHS, float RHS, float Threshold) {
    float H = max(Threshold - abs(LHS + RHS), 0.0) / Threshold;
    return max(LHS, -RHS) + H * H * Threshold * 0.25;
}"#;

const HELPER_SMOOTH_INTERSECTION: &str = r#"float SmoothIntersectionOp(float LHS, float RHS, float Threshold) {
    float H = max(Threshold - abs(LHS - RHS), 0.0) / Threshold;
    return max(LHS, RHS) + H * H * Threshold * 0.25;
}"#;

const HELPER_FLATE: &str = r#"float FlateOp(float Dist, float Radius) {
    return Dist - Radius;
}"#;

const HELPER_QUATERNION_TRANSFORM: &str = r#"vec3 QuaternionTransform(vec3 Point, vec4 Quat) {
    vec3 T = 2.0 * cross(Quat.xyz, Point);
    return Point + Quat.w * T + cross(Quat.xyz, T);
}"#;
