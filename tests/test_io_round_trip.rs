//! Integration tests: I/O round-trip consistency
//!
//! Verifies JSON save/load of trees and configuration documents.

mod common;

use common::*;
use glam::Vec3;
use std::path::PathBuf;
use tangerine::io::{from_json_string, read_json, to_json_string, write_json};
use tangerine::prelude::*;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("tangerine_test_io");
    std::fs::create_dir_all(&dir).ok();
    dir
}

// ============================================================================
// Tree files
// ============================================================================

#[test]
fn json_file_round_trip_every_shape() {
    let mut shapes = hard_shapes();
    shapes.extend(blended_shapes());

    for (index, tree) in shapes.iter().enumerate() {
        let path = temp_dir().join(format!("shape_{}.json", index));
        write_json(tree, std::fs::File::create(&path).unwrap()).unwrap();
        let loaded = read_json(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(&loaded, tree, "shape {} changed on reload", index);

        let points = random_points(&Aabb::new(Vec3::splat(-3.0), Vec3::splat(3.0)), 300, index as u64);
        for p in points {
            assert_eq!(eval(tree, p), eval(&loaded, p), "shape {} at {:?}", index, p);
        }

        std::fs::remove_file(&path).ok();
    }
}

#[test]
fn reloaded_tree_compiles_to_same_sources() {
    let tree = test_mixed();
    let loaded = from_json_string(&to_json_string(&tree).unwrap()).unwrap();
    let a = compile(&tree, &SegmentConfig::default()).unwrap();
    let b = compile(&loaded, &SegmentConfig::default()).unwrap();
    assert_eq!(a.sources, b.sources);
    assert_eq!(a.table, b.table);
}

#[test]
fn malformed_documents_are_rejected() {
    assert!(from_json_string("not json").is_err());
    assert!(from_json_string("{}").is_err());

    // Serialized form of a valid sphere, edited to carry a negative radius
    let json = to_json_string(&test_sphere()).unwrap();
    let broken = json.replacen("1.0", "-1.0", 1);
    assert_ne!(json, broken);
    assert!(from_json_string(&broken).is_err());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_documents_override_defaults() {
    let config = SchedulerConfig::from_json_str(
        r#"{ "tile_size": 8, "segment_capacity": 64, "occlusion_culling": true }"#,
    )
    .unwrap();
    assert_eq!(config.tile_size, 8);
    assert_eq!(config.segment_capacity, Some(64));
    assert!(config.occlusion_culling);
    assert_eq!(config.max_trace_steps, SchedulerConfig::default().max_trace_steps);

    assert!(SchedulerConfig::from_json_str(r#"{ "tile_size": 0 }"#).is_err());
    assert!(SchedulerConfig::from_json_str(r#"{ "hit_epsilon": -1.0 }"#).is_err());

    let segment = SegmentConfig::from_json_str(r#"{ "mutual_clip": true }"#).unwrap();
    assert!(segment.mutual_clip);
    assert!(segment.coalesce);
}
