//! # Tangerine
//!
//! Spatial compiler and tiled cluster scheduler for CSG models built from
//! signed distance functions.
//!
//! ## Pipeline
//!
//! - **Types**: immutable, structurally hashed CSG trees
//! - **Segmentation**: split a tree into disjoint boxes, each tagged with the
//!   smallest subtree that is correct inside it
//! - **Code generation**: one GLSL distance function per unique subtree plus
//!   dispatch and bounds tables
//! - **Scheduler**: per-frame Setup, Cull, Tally and Draw over screen tiles,
//!   resolved into a G-buffer by depth test
//!
//! ## Example
//!
//! ```rust
//! use tangerine::prelude::*;
//!
//! let tree = CsgTree::sphere(1.0)
//!     .unwrap()
//!     .diff(CsgTree::cylinder(0.5, 2.0).unwrap())
//!     .translate(0.0, 0.0, -3.0)
//!     .unwrap();
//!
//! let model = compile(&tree, &SegmentConfig::default()).unwrap();
//! assert!(model.sources.cluster_dist.contains("CutOp"));
//!
//! let mut context = RendererContext::new(SchedulerConfig::default()).unwrap();
//! let index = context.add_model(model);
//! context.add_instance(Instance::new(index)).unwrap();
//!
//! let view = ViewInfo::look_at(
//!     glam::Vec3::new(0.0, 0.0, 2.0),
//!     glam::Vec3::new(0.0, 0.0, -3.0),
//!     glam::Vec3::Y,
//!     1.0,
//!     64,
//!     64,
//!     0.1,
//!     100.0,
//! )
//! .unwrap();
//! let mut gbuffer = GBuffer::new(64, 64);
//! let stats = render_frame(&mut context, &view, &mut gbuffer, &CancelToken::new()).unwrap();
//! assert!(stats.samples_written > 0);
//! ```

#![warn(missing_docs)]

pub mod aabb;
pub mod bounds;
pub mod codegen;
pub mod config;
pub mod depth_pyramid;
pub mod eval;
pub mod io;
pub mod model;
pub mod operations;
pub mod primitives;
pub mod scheduler;
pub mod segment;
pub mod transforms;
pub mod types;

pub use model::{compile, CompiledModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors from any stage, for callers that drive the whole pipeline
#[derive(Debug, thiserror::Error)]
pub enum TangerineError {
    /// Malformed expression
    #[error(transparent)]
    Csg(#[from] types::CsgError),

    /// Tree cannot be segmented
    #[error(transparent)]
    Segment(#[from] segment::SegmentError),

    /// Renderer setup or frame failure
    #[error(transparent)]
    Scheduler(#[from] scheduler::SchedulerError),

    /// Bad configuration
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// Serialization failure
    #[error(transparent)]
    Io(#[from] io::IoError),
}

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::aabb::{Aabb, SubtreeAabb};
    pub use crate::bounds::culling_bounds;
    pub use crate::codegen::{generate, GeneratedSources};
    pub use crate::config::{SchedulerConfig, SegmentConfig};
    pub use crate::depth_pyramid::DepthPyramid;
    pub use crate::eval::{eval, gradient, normal, sample_color};
    pub use crate::model::{compile, ClusterTable, CompiledModel};
    pub use crate::scheduler::{
        render_frame, CancelToken, DrawArgs, FrameStats, GBuffer, Instance, RendererContext,
        TileHeap, TileHeapEntry, ViewInfo,
    };
    pub use crate::segment::{segment, segment_with, Cluster, ClusterSet};
    pub use crate::types::{Brush, CsgError, CsgNode, CsgTree, SetOp, Transform, Unbound};
    pub use crate::TangerineError;
}
