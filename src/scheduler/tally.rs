//! Tally phase: turn the next heap segment into indirect draw arguments

use super::cull::TileHeap;
use bytemuck::{Pod, Zeroable};

/// Vertices of the unit cube drawn per heap entry
pub const CUBE_VERTEX_COUNT: u32 = 36;

/// Indirect draw arguments plus the heap offset the draw reads from
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArgs {
    /// Vertices per instance
    pub vertex_count: u32,
    /// Heap entries in this segment
    pub instance_count: u32,
    /// First vertex
    pub first_vertex: u32,
    /// First instance
    pub base_instance: u32,
    /// Heap index of the segment's first entry
    pub instance_offset: u32,
}

/// Emit arguments for `[start, min(start + capacity, stack_ptr))` and
/// advance the segment start
///
/// Returns `None` once the heap is drained.
pub fn tally(heap: &mut TileHeap) -> Option<DrawArgs> {
    let start = heap.segment_start();
    let end = start.saturating_add(heap.capacity()).min(heap.stack_ptr());
    if start >= end {
        return None;
    }
    heap.set_segment_start(end);
    Some(DrawArgs {
        vertex_count: CUBE_VERTEX_COUNT,
        instance_count: end - start,
        first_vertex: 0,
        base_instance: 0,
        instance_offset: start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TileHeapEntry;

    fn heap(len: u32, capacity: u32) -> TileHeap {
        let entries = (0..len)
            .map(|i| TileHeapEntry {
                tile_id: i,
                cluster_id: 0,
                instance_id: 0,
            })
            .collect();
        TileHeap::from_entries(entries, capacity)
    }

    #[test]
    fn test_drains_in_bounded_segments() {
        let mut h = heap(7, 3);
        let segments: Vec<DrawArgs> = std::iter::from_fn(|| tally(&mut h)).collect();
        let offsets: Vec<u32> = segments.iter().map(|s| s.instance_offset).collect();
        let counts: Vec<u32> = segments.iter().map(|s| s.instance_count).collect();
        assert_eq!(offsets, vec![0, 3, 6]);
        assert_eq!(counts, vec![3, 3, 1]);
        assert_eq!(h.remaining(), 0);
        assert!(segments.iter().all(|s| s.vertex_count == CUBE_VERTEX_COUNT));
    }

    #[test]
    fn test_empty_heap() {
        assert_eq!(tally(&mut heap(0, 4)), None);
    }

    #[test]
    fn test_single_segment_when_capacity_suffices() {
        let mut h = heap(4, 4);
        assert_eq!(tally(&mut h).map(|a| a.instance_count), Some(4));
        assert_eq!(tally(&mut h), None);
    }
}
