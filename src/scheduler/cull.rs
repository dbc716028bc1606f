//! Cull phase: per-tile cluster selection into the tile heap

use super::setup::{ClipRect, ProjectedCluster};
use super::{RendererContext, ViewInfo};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use log::trace;
use rayon::prelude::*;

/// One visible (tile, cluster, instance) triple
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct TileHeapEntry {
    /// Row-major tile index, row 0 at the top
    pub tile_id: u32,
    /// Flattened cluster index within the instance's model
    pub cluster_id: u32,
    /// Instance index
    pub instance_id: u32,
}

/// Heap counters as laid out in the storage buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TileHeapInfo {
    /// Entries reserved per segment
    pub heap_size: u32,
    /// First entry of the next segment
    pub segment_start: u32,
    /// Number of entries appended this frame
    pub stack_ptr: u32,
    /// Tiles on screen
    pub tile_count: u32,
}

/// Append-only work queue for one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileHeap {
    entries: Vec<TileHeapEntry>,
    segment_start: u32,
    capacity: u32,
}

impl TileHeap {
    /// Heap over existing entries, with the given per-segment capacity
    pub fn from_entries(entries: Vec<TileHeapEntry>, capacity: u32) -> Self {
        TileHeap {
            entries,
            segment_start: 0,
            capacity: capacity.max(1),
        }
    }

    /// All appended entries
    pub fn entries(&self) -> &[TileHeapEntry] {
        &self.entries
    }

    /// Number of appended entries
    #[inline]
    pub fn stack_ptr(&self) -> u32 {
        self.entries.len() as u32
    }

    /// First entry of the next segment
    #[inline]
    pub fn segment_start(&self) -> u32 {
        self.segment_start
    }

    /// Entries drawn per segment
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Entries not yet tallied
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.stack_ptr().saturating_sub(self.segment_start)
    }

    pub(crate) fn set_segment_start(&mut self, start: u32) {
        self.segment_start = start;
    }

    /// Counter block for upload
    pub fn info(&self, tile_count: u32) -> TileHeapInfo {
        TileHeapInfo {
            heap_size: self.capacity,
            segment_start: self.segment_start,
            stack_ptr: self.stack_ptr(),
            tile_count,
        }
    }
}

/// NDC rectangle of a tile, clamped to the screen
pub fn tile_rect(tile_x: u32, tile_y: u32, tile_size: u32, width: u32, height: u32) -> ClipRect {
    let x0 = (tile_x * tile_size).min(width) as f32;
    let x1 = ((tile_x + 1) * tile_size).min(width) as f32;
    let y0 = (tile_y * tile_size).min(height) as f32;
    let y1 = ((tile_y + 1) * tile_size).min(height) as f32;
    let (w, h) = (width as f32, height as f32);
    ClipRect {
        min: Vec2::new(x0 / w * 2.0 - 1.0, 1.0 - y1 / h * 2.0),
        max: Vec2::new(x1 / w * 2.0 - 1.0, 1.0 - y0 / h * 2.0),
        near_depth: 0.0,
    }
}

/// Test every (tile, projected cluster) lane and append the hits
///
/// Lanes are folded into per-worker lists and concatenated at the reduce
/// step. With occlusion culling on, the overlap of a tile and a rect is
/// also tested against the previous frame's depth pyramid when its size
/// matches the screen.
pub fn cull(
    context: &RendererContext,
    view: &ViewInfo,
    projected: &[ProjectedCluster],
) -> TileHeap {
    let config = context.config();
    let (tiles_x, tiles_y) = config.tile_grid(view.width, view.height);
    let pyramid = context
        .previous_pyramid()
        .filter(|_| config.occlusion_culling)
        .filter(|p| p.width() == view.width && p.height() == view.height);

    let entries: Vec<TileHeapEntry> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .fold(Vec::new, |mut acc, tile_id| {
            let tile = tile_rect(
                tile_id % tiles_x,
                tile_id / tiles_x,
                config.tile_size,
                view.width,
                view.height,
            );
            for item in projected {
                let Some(hit) = item.rect.intersect(&tile) else {
                    continue;
                };
                if pyramid.is_some_and(|p| p.is_occluded(&hit)) {
                    continue;
                }
                acc.push(TileHeapEntry {
                    tile_id,
                    cluster_id: item.cluster_id,
                    instance_id: item.instance_id,
                });
            }
            acc
        })
        .reduce(Vec::new, |mut a, mut b| {
            a.append(&mut b);
            a
        });

    trace!(
        "cull: {} tile(s) x {} rect(s) -> {} entr(ies)",
        tiles_x * tiles_y,
        projected.len(),
        entries.len()
    );
    TileHeap::from_entries(entries, config.capacity_for(view.width, view.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_rect_corners() {
        // 48x32 screen, 16px tiles: 3 columns, 2 rows
        let top_left = tile_rect(0, 0, 16, 48, 32);
        assert_eq!(top_left.min, Vec2::new(-1.0, 0.0));
        assert!((top_left.max - Vec2::new(-1.0 / 3.0, 1.0)).length() < 1e-6);

        let bottom_right = tile_rect(2, 1, 16, 48, 32);
        assert_eq!(bottom_right.max.x, 1.0);
        assert_eq!(bottom_right.min.y, -1.0);
    }

    #[test]
    fn test_partial_tile_clamped() {
        let edge = tile_rect(1, 0, 16, 20, 16);
        assert_eq!(edge.max.x, 1.0);
        assert!(edge.min.x < 1.0);
    }

    #[test]
    fn test_heap_counters() {
        let entries = vec![TileHeapEntry::default(); 5];
        let mut heap = TileHeap::from_entries(entries, 0);
        assert_eq!(heap.capacity(), 1);
        assert_eq!(heap.remaining(), 5);
        heap.set_segment_start(3);
        assert_eq!(heap.remaining(), 2);
        let info = heap.info(6);
        assert_eq!(info.stack_ptr, 5);
        assert_eq!(info.segment_start, 3);
        assert_eq!(bytemuck::bytes_of(&info).len(), 16);
        assert_eq!(std::mem::size_of::<TileHeapEntry>(), 12);
    }
}
