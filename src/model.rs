//! Compiled models
//!
//! [`compile`] runs the whole spatial compiler on one tree: segmentation,
//! clustering and shader generation. The resulting [`CompiledModel`] also
//! carries a [`ClusterTable`], the CPU twin of the generated dispatchers,
//! which the reference scheduler evaluates.

use crate::aabb::Aabb;
use crate::bounds::culling_bounds;
use crate::codegen::{generate, GeneratedSources};
use crate::config::SegmentConfig;
use crate::eval::{eval, normal, sample_color};
use crate::segment::{ClusterSet, SegmentError};
use crate::types::{CsgInterner, CsgTree};
use glam::Vec3;
use log::info;

/// One flattened cluster: a box and the index of its subtree
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterEntry {
    /// Index into [`ClusterTable::subtrees`]
    pub subtree: usize,
    /// Region where the subtree is the local distance function
    pub aabb: Aabb,
    /// `aabb` narrowed by the culling bound of the subtree
    pub culling: Aabb,
}

/// Flattened cluster index, numbered like the generated dispatchers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterTable {
    subtrees: Vec<CsgTree>,
    entries: Vec<ClusterEntry>,
}

impl ClusterTable {
    /// Flatten a cluster set box by box
    ///
    /// Subtrees are interned, so structure repeated across clusters is
    /// held once.
    pub fn from_clusters(set: &ClusterSet) -> Self {
        let mut interner = CsgInterner::new();
        let subtrees: Vec<CsgTree> = set
            .clusters()
            .iter()
            .map(|c| interner.intern(&c.subtree))
            .collect();
        let entries = set
            .clusters()
            .iter()
            .enumerate()
            .flat_map(|(subtree, cluster)| {
                let narrow = culling_bounds(&cluster.subtree);
                cluster.boxes.iter().map(move |aabb| ClusterEntry {
                    subtree,
                    aabb: *aabb,
                    culling: aabb.intersect(&narrow),
                })
            })
            .collect();
        ClusterTable { subtrees, entries }
    }

    /// Number of flattened clusters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no clusters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unique subtrees
    pub fn subtrees(&self) -> &[CsgTree] {
        &self.subtrees
    }

    /// All flattened clusters
    pub fn entries(&self) -> &[ClusterEntry] {
        &self.entries
    }

    /// Subtree of a cluster
    pub fn subtree(&self, cluster: usize) -> Option<&CsgTree> {
        self.entries
            .get(cluster)
            .and_then(|entry| self.subtrees.get(entry.subtree))
    }

    /// Distance through the cluster's subtree, NaN for an unknown index
    pub fn dist(&self, cluster: usize, point: Vec3) -> f32 {
        match self.subtree(cluster) {
            Some(tree) => eval(tree, point),
            None => f32::NAN,
        }
    }

    /// Finite-difference normal through the cluster's subtree
    pub fn normal(&self, cluster: usize, point: Vec3, epsilon: f32) -> Vec3 {
        match self.subtree(cluster) {
            Some(tree) => normal(tree, point, epsilon),
            None => Vec3::ZERO,
        }
    }

    /// Material color through the cluster's subtree
    pub fn color(&self, cluster: usize, point: Vec3) -> Vec3 {
        match self.subtree(cluster) {
            Some(tree) => sample_color(tree, point),
            None => crate::eval::NULL_COLOR,
        }
    }

    /// Evaluation bound, empty for an unknown index
    pub fn bounds(&self, cluster: usize) -> Aabb {
        self.entries
            .get(cluster)
            .map_or(Aabb::EMPTY, |entry| entry.aabb)
    }

    /// Selection bound, empty for an unknown index
    pub fn culling_bounds(&self, cluster: usize) -> Aabb {
        self.entries
            .get(cluster)
            .map_or(Aabb::EMPTY, |entry| entry.culling)
    }
}

/// A tree after spatial compilation
#[derive(Clone, Debug)]
pub struct CompiledModel {
    /// Source tree
    pub tree: CsgTree,
    /// Clusters grouped by subtree
    pub clusters: ClusterSet,
    /// Flattened cluster index
    pub table: ClusterTable,
    /// Generated shader sources
    pub sources: GeneratedSources,
}

impl CompiledModel {
    /// Number of flattened clusters
    pub fn cluster_count(&self) -> usize {
        self.table.len()
    }

    /// Hull of every cluster box
    pub fn bound(&self) -> Aabb {
        self.clusters.bound()
    }
}

/// Segment, cluster and generate sources for a tree
pub fn compile(tree: &CsgTree, config: &SegmentConfig) -> Result<CompiledModel, SegmentError> {
    let clusters = ClusterSet::build(tree, config)?;
    let table = ClusterTable::from_clusters(&clusters);
    let sources = generate(&clusters);
    info!(
        "compiled {} node(s) into {} cluster(s) over {} subtree(s)",
        tree.node_count(),
        table.len(),
        clusters.len()
    );
    Ok(CompiledModel {
        tree: tree.clone(),
        clusters,
        table,
        sources,
    })
}
