//! Clusters: segmentation pieces grouped by subtree

use super::{segment_with, SegmentError};
use crate::aabb::{Aabb, SubtreeAabb};
use crate::config::SegmentConfig;
use crate::types::CsgTree;
use glam::Vec3;
use log::debug;

/// A subtree and the disjoint boxes where it is the local distance function
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Local distance function
    pub subtree: CsgTree,
    /// Regions, never duplicated
    pub boxes: Vec<Aabb>,
}

impl Cluster {
    /// Hull of all boxes
    pub fn bound(&self) -> Aabb {
        self.boxes.iter().fold(Aabb::EMPTY, |acc, b| acc.hull(b))
    }
}

/// Output of the spatial compiler: every cluster of one model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
}

impl ClusterSet {
    /// Segment a tree and group the result
    pub fn build(tree: &CsgTree, config: &SegmentConfig) -> Result<Self, SegmentError> {
        let pieces = segment_with(tree, config)?;
        let set = Self::from_segments(&pieces, config.coalesce);
        debug!(
            "{} region(s) grouped into {} cluster(s) with {} box(es)",
            pieces.len(),
            set.clusters.len(),
            set.box_count()
        );
        Ok(set)
    }

    /// Group pieces by subtree in first-appearance order
    ///
    /// With `coalesce` set, boxes of the same cluster that share a complete
    /// face are merged until no pair does.
    pub fn from_segments(pieces: &[SubtreeAabb], coalesce: bool) -> Self {
        let mut clusters: Vec<Cluster> = Vec::new();
        for piece in pieces.iter().filter(|p| p.aabb.is_valid()) {
            match clusters.iter_mut().find(|c| c.subtree == piece.subtree) {
                Some(cluster) => {
                    if !cluster.boxes.contains(&piece.aabb) {
                        cluster.boxes.push(piece.aabb);
                    }
                }
                None => clusters.push(Cluster {
                    subtree: piece.subtree.clone(),
                    boxes: vec![piece.aabb],
                }),
            }
        }

        if coalesce {
            for cluster in &mut clusters {
                merge_faces(&mut cluster.boxes);
            }
        }
        ClusterSet { clusters }
    }

    /// Flatten back into tagged boxes, cluster by cluster
    pub fn to_segments(&self) -> Vec<SubtreeAabb> {
        self.clusters
            .iter()
            .flat_map(|c| {
                c.boxes
                    .iter()
                    .map(move |b| SubtreeAabb::new(*b, c.subtree.clone()))
            })
            .collect()
    }

    /// All clusters
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Number of clusters (unique subtrees)
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True when the model has no volume
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Total number of boxes
    pub fn box_count(&self) -> usize {
        self.clusters.iter().map(|c| c.boxes.len()).sum()
    }

    /// Hull of every box
    pub fn bound(&self) -> Aabb {
        self.clusters
            .iter()
            .fold(Aabb::EMPTY, |acc, c| acc.hull(&c.bound()))
    }

    /// Every (cluster index, box) whose box contains `point`
    pub fn locate(&self, point: Vec3) -> Vec<(usize, Aabb)> {
        self.clusters
            .iter()
            .enumerate()
            .flat_map(|(i, c)| {
                c.boxes
                    .iter()
                    .filter(move |b| b.contains_point(point))
                    .map(move |b| (i, *b))
            })
            .collect()
    }
}

/// Merge face-adjacent boxes to a fixpoint, keeping first-seen order
fn merge_faces(boxes: &mut Vec<Aabb>) {
    loop {
        let mut merged = None;
        'search: for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                if let Some(hull) = boxes[i].face_merge(&boxes[j]) {
                    merged = Some((i, j, hull));
                    break 'search;
                }
            }
        }
        match merged {
            Some((i, j, hull)) => {
                boxes.remove(j);
                boxes[i] = hull;
            }
            None => return,
        }
    }
}
