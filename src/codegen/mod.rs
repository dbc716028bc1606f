//! Shader source generation for compiled models
//!
//! A [`ClusterSet`] becomes two GLSL fragments:
//!
//! - `cluster_data`: the cluster count and the per-cluster bound tables
//!   (`SubtreeBounds`, `SubtreeCullingBounds`), needed by every stage that
//!   selects or tests clusters.
//! - `cluster_dist`: one `SubtreeN` function per unique subtree plus the
//!   `SubtreeDist` dispatcher, needed only by the drawing stage.
//!
//! Clusters are numbered by flattening the set box by box, in the same order
//! as [`ClusterSet::to_segments`]. Every index shares its subtree's function,
//! so the dispatcher stacks several `case` labels onto one `return`.

mod glsl;

use crate::aabb::Aabb;
use crate::bounds::culling_bounds;
use crate::segment::ClusterSet;
use glsl::{float_literal, GlslTranspiler};
use log::debug;

/// Generated shader fragments for one model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedSources {
    /// Number of flattened (subtree, box) pairs
    pub cluster_count: usize,
    /// Number of distinct subtree functions
    pub subtree_count: usize,
    /// Bounds tables
    pub cluster_data: String,
    /// Distance functions and dispatcher
    pub cluster_dist: String,
}

/// Emit shader sources for a cluster set
pub fn generate(set: &ClusterSet) -> GeneratedSources {
    let mut transpiler = GlslTranspiler::new();

    let mut functions = String::new();
    for (index, cluster) in set.clusters().iter().enumerate() {
        let body = transpiler.distance_expr(&cluster.subtree, "Point");
        functions.push_str(&format!(
            "float Subtree{}(vec3 Point) {{\n    return {};\n}}\n\n",
            index, body
        ));
    }

    // (subtree index, box) per flattened cluster
    let flattened: Vec<(usize, Aabb)> = set
        .clusters()
        .iter()
        .enumerate()
        .flat_map(|(i, c)| c.boxes.iter().map(move |b| (i, *b)))
        .collect();

    let cluster_data = emit_cluster_data(set, &flattened);

    let mut cluster_dist = String::new();
    cluster_dist.push_str(&transpiler.helper_source());
    cluster_dist.push_str(&functions);
    cluster_dist.push_str(&emit_dispatcher(set.len(), &flattened));

    debug!(
        "generated {} cluster(s) over {} subtree function(s), {} helper(s)",
        flattened.len(),
        set.len(),
        transpiler.helper_names().len()
    );

    GeneratedSources {
        cluster_count: flattened.len(),
        subtree_count: set.len(),
        cluster_data,
        cluster_dist,
    }
}

fn emit_cluster_data(set: &ClusterSet, flattened: &[(usize, Aabb)]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "const uint ClusterCount = {}u;\nconst uint SubtreeCount = {}u;\n\n",
        flattened.len(),
        set.len()
    ));
    out.push_str("#ifndef TANGERINE_AABB\n#define TANGERINE_AABB\n");
    out.push_str("struct AABB {\n    vec3 Min;\n    vec3 Max;\n};\n#endif\n\n");

    let culling: Vec<Aabb> = set
        .clusters()
        .iter()
        .map(|c| culling_bounds(&c.subtree))
        .collect();

    out.push_str("AABB SubtreeBounds(uint ClusterIndex) {\n    switch (ClusterIndex) {\n");
    for (flat, (_, aabb)) in flattened.iter().enumerate() {
        out.push_str(&format!(
            "        case {}u: return {};\n",
            flat,
            aabb_literal(aabb)
        ));
    }
    out.push_str(&format!(
        "        default: return {};\n    }}\n}}\n\n",
        EMPTY_AABB_LITERAL
    ));

    out.push_str("AABB SubtreeCullingBounds(uint ClusterIndex) {\n    switch (ClusterIndex) {\n");
    for (flat, (subtree, aabb)) in flattened.iter().enumerate() {
        let narrow = aabb.intersect(&culling[*subtree]);
        out.push_str(&format!(
            "        case {}u: return {};\n",
            flat,
            aabb_literal(&narrow)
        ));
    }
    out.push_str(&format!(
        "        default: return {};\n    }}\n}}\n",
        EMPTY_AABB_LITERAL
    ));
    out
}

fn emit_dispatcher(subtree_count: usize, flattened: &[(usize, Aabb)]) -> String {
    let mut out =
        String::from("float SubtreeDist(uint ClusterIndex, vec3 Point) {\n    switch (ClusterIndex) {\n");
    for subtree in 0..subtree_count {
        let labels: Vec<usize> = flattened
            .iter()
            .enumerate()
            .filter(|(_, (s, _))| *s == subtree)
            .map(|(flat, _)| flat)
            .collect();
        if labels.is_empty() {
            continue;
        }
        for flat in labels {
            out.push_str(&format!("        case {}u:\n", flat));
        }
        out.push_str(&format!("            return Subtree{}(Point);\n", subtree));
    }
    out.push_str("        default:\n            return uintBitsToFloat(0x7FC00000u);\n");
    out.push_str("    }\n}\n");
    out
}

const EMPTY_AABB_LITERAL: &str = "AABB(vec3(0.0), vec3(0.0))";

/// Box literal rounded outward to the printed precision
fn aabb_literal(aabb: &Aabb) -> String {
    if !aabb.is_valid() || !aabb.is_finite() {
        return EMPTY_AABB_LITERAL.to_string();
    }
    let low = aabb.low.to_array().map(float_literal);
    let high = aabb.high.to_array().map(float_literal);
    format!(
        "AABB(vec3({}, {}, {}), vec3({}, {}, {}))",
        low[0], low[1], low[2], high[0], high[1], high[2]
    )
}
