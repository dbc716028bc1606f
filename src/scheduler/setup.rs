//! Setup phase: project cluster boxes to clip-space rectangles

use super::{RendererContext, ViewInfo};
use crate::aabb::Aabb;
use glam::{Mat4, Vec2};
use rayon::prelude::*;

/// Screen footprint of a box in NDC, with its nearest depth
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRect {
    /// Lower-left corner
    pub min: Vec2,
    /// Upper-right corner
    pub max: Vec2,
    /// Smallest NDC depth of the box, for occlusion tests
    pub near_depth: f32,
}

impl ClipRect {
    /// The whole screen, at the near plane
    pub const FULL_SCREEN: ClipRect = ClipRect {
        min: Vec2::NEG_ONE,
        max: Vec2::ONE,
        near_depth: 0.0,
    };

    /// Overlapping part of two rects, keeping this rect's depth
    pub fn intersect(&self, other: &ClipRect) -> Option<ClipRect> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.cmple(max).all() {
            Some(ClipRect {
                min,
                max,
                near_depth: self.near_depth,
            })
        } else {
            None
        }
    }
}

/// A (cluster, instance) pair that survived setup
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedCluster {
    /// Flattened cluster index within the instance's model
    pub cluster_id: u32,
    /// Instance index in the renderer context
    pub instance_id: u32,
    /// Screen footprint
    pub rect: ClipRect,
}

/// Project a local box through `local_to_clip`
///
/// Returns `None` for an empty box, a box entirely behind the eye, or one
/// entirely past the far plane. A box straddling the eye plane gets the
/// full screen.
pub fn project_box(aabb: &Aabb, local_to_clip: Mat4) -> Option<ClipRect> {
    if !aabb.is_valid() || !aabb.is_finite() {
        return None;
    }

    let clips = aabb.corners().map(|corner| local_to_clip * corner.extend(1.0));
    let behind = clips.iter().filter(|clip| clip.w <= 0.0).count();
    if behind == clips.len() {
        return None;
    }
    if behind > 0 {
        return Some(ClipRect::FULL_SCREEN);
    }

    let mut min = Vec2::INFINITY;
    let mut max = Vec2::NEG_INFINITY;
    let mut near_depth = f32::INFINITY;
    for clip in &clips {
        let ndc = clip.truncate() / clip.w;
        min = min.min(ndc.truncate());
        max = max.max(ndc.truncate());
        near_depth = near_depth.min(ndc.z);
    }
    if near_depth > 1.0 {
        return None;
    }
    Some(ClipRect {
        min,
        max,
        near_depth: near_depth.max(0.0),
    })
}

/// Project every (cluster, instance) pair
///
/// Uses the culling bound when narrow union culling is on, the evaluation
/// bound otherwise. Excluded pairs are left out.
pub fn setup(context: &RendererContext, view: &ViewInfo) -> Vec<ProjectedCluster> {
    let world_to_clip = view.world_to_clip();
    let narrow = context.config().narrow_union_culling;

    context
        .instances()
        .par_iter()
        .enumerate()
        .flat_map_iter(|(instance_id, instance)| {
            let local_to_clip = world_to_clip * instance.local_to_world();
            let entries = context
                .models()
                .get(instance.model)
                .map(|model| model.table.entries())
                .unwrap_or(&[]);
            entries
                .iter()
                .enumerate()
                .filter_map(move |(cluster_id, entry)| {
                    let aabb = if narrow { entry.culling } else { entry.aabb };
                    project_box(&aabb, local_to_clip).map(|rect| ProjectedCluster {
                        cluster_id: cluster_id as u32,
                        instance_id: instance_id as u32,
                        rect,
                    })
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn view() -> ViewInfo {
        ViewInfo::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            32,
            32,
            0.1,
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_centered_box_projects_inside() {
        let rect = project_box(&Aabb::symmetric(Vec3::ONE), view().world_to_clip()).unwrap();
        assert!(rect.min.x < 0.0 && rect.max.x > 0.0);
        assert!(rect.min.x > -1.0 && rect.max.x < 1.0);
        assert!((rect.min.x + rect.max.x).abs() < 1e-5);
        assert!(rect.near_depth > 0.0 && rect.near_depth < 1.0);
    }

    #[test]
    fn test_behind_and_straddling() {
        let m = view().world_to_clip();
        let behind = Aabb::new(Vec3::new(-1.0, -1.0, 6.0), Vec3::new(1.0, 1.0, 8.0));
        assert_eq!(project_box(&behind, m), None);

        let straddle = Aabb::new(Vec3::new(-1.0, -1.0, 4.0), Vec3::new(1.0, 1.0, 6.0));
        assert_eq!(project_box(&straddle, m), Some(ClipRect::FULL_SCREEN));
    }

    #[test]
    fn test_empty_box_excluded() {
        assert_eq!(project_box(&Aabb::EMPTY, view().world_to_clip()), None);
    }

    #[test]
    fn test_rect_intersect() {
        let a = ClipRect {
            min: Vec2::new(-1.0, -1.0),
            max: Vec2::new(0.0, 0.0),
            near_depth: 0.5,
        };
        let b = ClipRect {
            min: Vec2::new(-0.5, -0.5),
            max: Vec2::new(1.0, 1.0),
            near_depth: 0.1,
        };
        let hit = a.intersect(&b).unwrap();
        assert_eq!(hit.min, Vec2::new(-0.5, -0.5));
        assert_eq!(hit.max, Vec2::ZERO);
        assert_eq!(hit.near_depth, 0.5);

        let c = ClipRect {
            min: Vec2::new(0.5, 0.5),
            ..b
        };
        assert_eq!(a.intersect(&c), None);
    }
}
