//! Integration tests: Shader source generation
//!
//! Verifies the generated dispatchers line up with the cluster table and
//! that only referenced helpers are emitted.

mod common;

use common::*;
use tangerine::prelude::*;

const HELPERS: [&str; 16] = [
    "SphereBrush",
    "EllipsoidBrush",
    "BoxBrush",
    "TorusBrush",
    "CylinderBrush",
    "ConeBrush",
    "ConinderBrush",
    "PlaneBrush",
    "UnionOp",
    "CutOp",
    "IntersectionOp",
    "SmoothUnionOp",
    "SmoothCutOp",
    "SmoothIntersectionOp",
    "FlateOp",
    "QuaternionTransform",
];

fn sources(tree: &CsgTree) -> GeneratedSources {
    compile(tree, &SegmentConfig::default()).unwrap().sources
}

/// True when `name(` appears as a whole identifier
fn calls(source: &str, name: &str) -> bool {
    let pattern = format!("{}(", name);
    source.match_indices(&pattern).any(|(at, _)| {
        source[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_alphanumeric())
    })
}

#[test]
fn every_used_helper_is_defined_once() {
    for tree in hard_shapes().iter().chain(blended_shapes().iter()) {
        let dist = sources(tree).cluster_dist;
        for name in HELPERS {
            let definitions = dist.matches(&format!("float {}(", name)).count()
                + dist.matches(&format!("vec3 {}(", name)).count();
            if calls(&dist, name) {
                assert_eq!(definitions, 1, "{} used but defined {} times", name, definitions);
            } else {
                assert_eq!(definitions, 0, "{} defined but never used", name);
            }
        }
    }
}

#[test]
fn unused_helpers_are_omitted() {
    let dist = sources(&test_pair()).cluster_dist;
    assert!(dist.contains("float SphereBrush("));
    assert!(dist.contains("float UnionOp("));
    for name in ["BoxBrush", "TorusBrush", "CutOp", "SmoothUnionOp", "QuaternionTransform"] {
        assert!(!dist.contains(name), "{} should not be emitted", name);
    }
}

#[test]
fn dispatch_tables_match_cluster_table() {
    for tree in hard_shapes() {
        let model = compile(&tree, &SegmentConfig::default()).unwrap();
        let src = &model.sources;
        assert_eq!(src.cluster_count, model.table.len());
        assert_eq!(src.subtree_count, model.table.subtrees().len());
        assert!(src
            .cluster_data
            .contains(&format!("const uint ClusterCount = {}u;", src.cluster_count)));

        for i in 0..src.subtree_count {
            assert!(src.cluster_dist.contains(&format!("float Subtree{}(vec3 Point)", i)));
        }
        assert!(!src
            .cluster_dist
            .contains(&format!("float Subtree{}(vec3 Point)", src.subtree_count)));

        for i in 0..src.cluster_count {
            let label = format!("case {}u:", i);
            assert_eq!(src.cluster_dist.matches(&label).count(), 1);
        }
    }
}

#[test]
fn failure_defaults_are_detectable() {
    let src = sources(&test_carved());
    assert!(src
        .cluster_dist
        .contains("default:\n            return uintBitsToFloat(0x7FC00000u);"));
    assert_eq!(
        src.cluster_data
            .matches("default: return AABB(vec3(0.0), vec3(0.0));")
            .count(),
        2
    );
}

#[test]
fn rotation_lowers_through_quaternion_helper() {
    let src = sources(&test_rotated());
    assert!(src.cluster_dist.contains("QuaternionTransform(Point, vec4("));
    assert!(src.cluster_dist.contains("vec3 QuaternionTransform(vec3 Point, vec4 Quat)"));
}

#[test]
fn blend_threshold_is_passed_through() {
    let src = sources(&test_blended());
    assert!(src.cluster_dist.contains("SmoothUnionOp("));
    assert!(src.cluster_dist.contains(", 0.3)"));
}

#[test]
fn modifiers_lower_to_helpers() {
    let src = sources(&test_modified());
    assert!(calls(&src.cluster_dist, "FlateOp"));
    assert!(calls(&src.cluster_dist, "ConeBrush"));
    assert!(calls(&src.cluster_dist, "ConinderBrush"));
    // Scale divides the point and multiplies the distance back
    assert!(src.cluster_dist.contains(" / 1.5)"));
    assert!(src.cluster_dist.contains(" * 1.5)"));
}
