//! Common test helpers for tangerine integration tests

#![allow(dead_code)]

use glam::Vec3;
use tangerine::prelude::*;

// ============================================================================
// Standard test shapes
// ============================================================================

/// Unit sphere at origin
pub fn test_sphere() -> CsgTree {
    CsgTree::sphere(1.0).unwrap()
}

/// Two unit spheres overlapping around the origin
pub fn test_pair() -> CsgTree {
    CsgTree::sphere(1.0)
        .unwrap()
        .translate(-0.5, 0.0, 0.0)
        .unwrap()
        .union(CsgTree::sphere(1.0).unwrap().translate(0.5, 0.0, 0.0).unwrap())
}

/// Sphere with a cylinder bored through it along Z
pub fn test_carved() -> CsgTree {
    CsgTree::sphere(1.0)
        .unwrap()
        .diff(CsgTree::cylinder(0.4, 1.5).unwrap())
}

/// Union-only shape: a row of spheres, a box and a torus, partly overlapping
pub fn test_union_cluster() -> CsgTree {
    let row = (0..4).fold(None, |acc: Option<CsgTree>, i| {
        let s = CsgTree::sphere(0.6)
            .unwrap()
            .translate(i as f32 * 0.9, 0.0, 0.0)
            .unwrap();
        Some(match acc {
            Some(tree) => tree.union(s),
            None => s,
        })
    });
    row.unwrap()
        .union(CsgTree::cuboid(0.5, 0.5, 0.5).unwrap().translate(0.0, 0.8, 0.3).unwrap())
        .union(CsgTree::torus(0.8, 0.2).unwrap().translate(2.0, 0.0, 0.4).unwrap())
}

/// Hard-operator shape mixing every node kind except blends
pub fn test_mixed() -> CsgTree {
    let body = CsgTree::cuboid(1.0, 0.6, 0.4)
        .unwrap()
        .union(CsgTree::sphere(0.7).unwrap().translate(1.0, 0.0, 0.0).unwrap())
        .paint(0.9, 0.3, 0.1)
        .unwrap();
    let hole = CsgTree::cylinder(0.25, 1.0)
        .unwrap()
        .translate(0.3, 0.0, 0.0)
        .unwrap();
    let cap = CsgTree::ellipsoid(0.5, 0.5, 0.8)
        .unwrap()
        .inter(CsgTree::cuboid(1.0, 1.0, 0.5).unwrap())
        .translate(-1.2, 0.0, 0.0)
        .unwrap();
    body.diff(hole)
        .union(cap)
        .rotate(glam::Quat::from_rotation_z(0.6))
        .unwrap()
}

/// Rotated union whose pieces overlap after rotation
pub fn test_rotated() -> CsgTree {
    CsgTree::sphere(0.5)
        .unwrap()
        .translate(-0.75, 0.0, 0.0)
        .unwrap()
        .union(CsgTree::sphere(0.5).unwrap().translate(0.75, 0.0, 0.0).unwrap())
        .rotate(glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_4))
        .unwrap()
}

/// Smooth union of a sphere and a box with threshold 0.3
pub fn test_blended() -> CsgTree {
    CsgTree::sphere(0.8)
        .unwrap()
        .blend_union(
            CsgTree::cuboid(0.5, 0.5, 0.5).unwrap().translate(1.0, 0.0, 0.0).unwrap(),
            0.3,
        )
        .unwrap()
}

/// Box with a smooth spherical bite out of one face
pub fn test_blended_cut() -> CsgTree {
    CsgTree::cuboid(0.8, 0.8, 0.8)
        .unwrap()
        .blend_diff(CsgTree::sphere(0.6).unwrap().translate(0.8, 0.0, 0.0).unwrap(), 0.3)
        .unwrap()
}

/// Smooth intersection of a sphere and an offset box
pub fn test_blended_inter() -> CsgTree {
    CsgTree::sphere(1.0)
        .unwrap()
        .blend_inter(CsgTree::cuboid(0.7, 0.7, 0.7).unwrap().translate(0.3, 0.0, 0.0).unwrap(), 0.25)
        .unwrap()
}

/// Slab carved by a smooth union of two spheres
pub fn test_cut_by_blend() -> CsgTree {
    let cutter = CsgTree::sphere(0.4)
        .unwrap()
        .translate(-0.5, 0.0, 0.5)
        .unwrap()
        .blend_union(CsgTree::sphere(0.4).unwrap().translate(0.2, 0.0, 0.5).unwrap(), 0.3)
        .unwrap();
    CsgTree::cuboid(1.0, 0.6, 0.6).unwrap().diff(cutter)
}

/// Inflated cone next to a scaled capped cone
pub fn test_modified() -> CsgTree {
    CsgTree::cone(0.8, 1.6)
        .unwrap()
        .flate(0.1)
        .unwrap()
        .union(
            CsgTree::coninder(0.5, 0.3, 1.0)
                .unwrap()
                .scale(1.5)
                .unwrap()
                .translate(1.0, 0.0, 0.0)
                .unwrap(),
        )
}

/// Hard-operator shapes for coverage checks
pub fn hard_shapes() -> Vec<CsgTree> {
    vec![
        test_sphere(),
        test_pair(),
        test_carved(),
        test_union_cluster(),
        test_mixed(),
        test_rotated(),
        test_modified(),
    ]
}

/// Shapes with a smooth operator somewhere in the tree
pub fn blended_shapes() -> Vec<CsgTree> {
    vec![
        test_blended(),
        test_blended_cut(),
        test_blended_inter(),
        test_cut_by_blend(),
    ]
}

// ============================================================================
// Points
// ============================================================================

/// Seeded uniform points inside a box
pub fn random_points(bound: &Aabb, count: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let size = bound.high - bound.low;
    (0..count)
        .map(|_| bound.low + size * Vec3::new(rng.f32(), rng.f32(), rng.f32()))
        .collect()
}

// ============================================================================
// Scenes
// ============================================================================

/// Perspective camera on +Z looking at the origin
pub fn front_view(width: u32, height: u32, distance: f32) -> ViewInfo {
    ViewInfo::look_at(
        Vec3::new(0.0, 0.0, distance),
        Vec3::ZERO,
        Vec3::Y,
        std::f32::consts::FRAC_PI_2,
        width,
        height,
        0.1,
        100.0,
    )
    .unwrap()
}

/// Route `log` output through the test harness; safe to call repeatedly
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Context holding one model placed once at the origin
pub fn single_model_context(tree: &CsgTree, config: SchedulerConfig) -> RendererContext {
    init_logging();
    let mut context = RendererContext::new(config).unwrap();
    let model = compile(tree, &SegmentConfig::default()).unwrap();
    let index = context.add_model(model);
    context.add_instance(Instance::new(index)).unwrap();
    context
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert two f32 values are close within tolerance
pub fn assert_close(a: f32, b: f32, tol: f32, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff={}, tol={})",
        msg,
        a,
        b,
        (a - b).abs(),
        tol
    );
}
