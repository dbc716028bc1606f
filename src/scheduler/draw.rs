//! Draw phase: sphere-trace each heap entry into the G-buffer

use super::cull::{TileHeap, TileHeapEntry};
use super::gbuffer::{GBuffer, Sample};
use super::tally::DrawArgs;
use super::{RendererContext, ViewInfo};
use crate::aabb::Aabb;
use crate::config::SchedulerConfig;
use crate::model::ClusterTable;
use glam::{Mat4, Vec3};
use rayon::prelude::*;

/// Entry and exit distances of a ray through a box, if it hits
pub fn ray_box(origin: Vec3, direction: Vec3, aabb: &Aabb) -> Option<(f32, f32)> {
    let inv = direction.recip();
    let t0 = (aabb.low - origin) * inv;
    let t1 = (aabb.high - origin) * inv;
    let near = t0.min(t1).max_element().max(0.0);
    let far = t0.max(t1).min_element();
    if near <= far {
        Some((near, far))
    } else {
        None
    }
}

/// Result of one trace in local space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceHit {
    /// Ray parameter at the hit
    pub t: f32,
    /// Absolute distance at the hit
    pub error: f32,
    /// Iterations used
    pub steps: u32,
}

/// Sphere-trace one cluster between `t_near` and `t_far`
///
/// A NaN distance or an exhausted budget is a miss.
pub fn trace(
    table: &ClusterTable,
    cluster: usize,
    origin: Vec3,
    direction: Vec3,
    (t_near, t_far): (f32, f32),
    config: &SchedulerConfig,
) -> Option<TraceHit> {
    let mut t = t_near;
    for steps in 0..config.max_trace_steps {
        let d = table.dist(cluster, origin + direction * t);
        if d.is_nan() {
            return None;
        }
        if d < config.hit_epsilon {
            return Some(TraceHit {
                t,
                error: d.abs(),
                steps,
            });
        }
        t += d;
        if t > t_far {
            return None;
        }
    }
    None
}

/// A pixel sample waiting for the depth test
#[derive(Clone, Copy, Debug)]
struct Fragment {
    x: u32,
    y: u32,
    sample: Sample,
}

fn shade_entry(
    context: &RendererContext,
    view: &ViewInfo,
    entry: &TileHeapEntry,
) -> Vec<Fragment> {
    let config = context.config();
    let Some(instance) = context.instances().get(entry.instance_id as usize) else {
        return Vec::new();
    };
    let Some(model) = context.models().get(instance.model) else {
        return Vec::new();
    };
    let cluster = entry.cluster_id as usize;
    let aabb = model.table.bounds(cluster);
    if !aabb.is_valid() {
        return Vec::new();
    }

    let (tiles_x, _) = config.tile_grid(view.width, view.height);
    let tile_x = entry.tile_id % tiles_x;
    let tile_y = entry.tile_id / tiles_x;
    let x_range = (tile_x * config.tile_size)..((tile_x + 1) * config.tile_size).min(view.width);
    let y_range = (tile_y * config.tile_size)..((tile_y + 1) * config.tile_size).min(view.height);

    let world_to_local: Mat4 = instance.world_to_local();
    let local_to_world: Mat4 = instance.local_to_world();
    let mut fragments = Vec::new();

    for y in y_range {
        for x in x_range.clone() {
            let (origin, direction) = view.pixel_ray(x, y);
            let local_origin = world_to_local.transform_point3(origin);
            let local_dir = world_to_local.transform_vector3(direction);
            let Some(span) = ray_box(local_origin, local_dir, &aabb) else {
                continue;
            };
            let Some(hit) = trace(&model.table, cluster, local_origin, local_dir, span, config)
            else {
                continue;
            };

            let local = local_origin + local_dir * hit.t;
            let position = local_to_world.transform_point3(local);
            let depth = view.depth_of(position);
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }
            let normal = local_to_world
                .transform_vector3(model.table.normal(cluster, local, config.normal_epsilon))
                .normalize_or_zero();

            fragments.push(Fragment {
                x,
                y,
                sample: Sample {
                    depth,
                    position,
                    normal,
                    error: hit.error,
                    cluster: entry.cluster_id,
                    instance: entry.instance_id,
                    color: model.table.color(cluster, local),
                },
            });
        }
    }
    fragments
}

/// Trace one tallied segment and depth-test the results into `gbuffer`
///
/// Tracing runs in parallel over heap entries; the depth test is a
/// sequential pass over the traced fragments. Returns the number of
/// fragments that were written.
pub fn draw(
    context: &RendererContext,
    view: &ViewInfo,
    heap: &TileHeap,
    args: &DrawArgs,
    gbuffer: &mut GBuffer,
) -> u32 {
    let start = (args.instance_offset as usize).min(heap.entries().len());
    let end = (start + args.instance_count as usize).min(heap.entries().len());
    let window = &heap.entries()[start..end];

    let fragments: Vec<Fragment> = window
        .par_iter()
        .flat_map_iter(|entry| shade_entry(context, view, entry))
        .collect();

    fragments
        .iter()
        .filter(|f| gbuffer.resolve(f.x, f.y, &f.sample))
        .count() as u32
}
