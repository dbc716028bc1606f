//! Tiled cluster scheduler
//!
//! CPU reference of the per-frame GPU pipeline. Each frame walks
//! **Setup → Cull → Tally → Draw**, repeating Tally/Draw until the tile heap
//! is drained:
//!
//! - [`setup`]: project every (cluster, instance) box to a clip rect
//! - [`cull`]: append a [`TileHeapEntry`] for every tile a rect touches
//! - [`tally`]: cut the next bounded segment of the heap into [`DrawArgs`]
//! - [`draw`]: sphere-trace each entry of the segment into the [`GBuffer`]
//!
//! Visibility is settled by the G-buffer depth test, so neither Cull's
//! output order nor segment boundaries change the final image.

pub mod cull;
pub mod draw;
pub mod gbuffer;
pub mod setup;
pub mod tally;
mod view;

pub use crate::config::SchedulerConfig;
pub use cull::{cull, TileHeap, TileHeapEntry, TileHeapInfo};
pub use draw::draw;
pub use gbuffer::{GBuffer, Sample, NO_SAMPLE};
pub use setup::{setup, ClipRect, ProjectedCluster};
pub use tally::{tally, DrawArgs};
pub use view::{Instance, ViewInfo, ViewInfoUpload};

use crate::config::ConfigError;
use crate::depth_pyramid::DepthPyramid;
use crate::model::CompiledModel;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scheduler errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An instance names a model that was never added
    #[error("instance refers to model {model}, but only {models} are loaded")]
    UnknownModel {
        /// Requested model index
        model: usize,
        /// Number of loaded models
        models: usize,
    },

    /// Zero-sized screen
    #[error("screen must be at least 1x1, got {width}x{height}")]
    EmptyScreen {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },

    /// Camera matrices are unusable
    #[error("invalid view: {0}")]
    InvalidView(String),

    /// The G-buffer does not match the view
    #[error("G-buffer is {found:?} but the view is {expected:?}")]
    ScreenMismatch {
        /// View dimensions
        expected: (u32, u32),
        /// G-buffer dimensions
        found: (u32, u32),
    },
}

/// Stage of the frame state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// Project cluster boxes
    Setup,
    /// Fill the tile heap
    Cull,
    /// Cut the next heap segment
    Tally,
    /// Trace a segment
    Draw,
    /// Heap drained
    Done,
}

/// Whole-frame cancellation flag, checked between dispatches
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once cancelled
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What a frame did
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Entries appended by Cull
    pub visible_triples: u32,
    /// Arguments of every Tally/Draw segment, in order
    pub segments: Vec<DrawArgs>,
    /// Fragments that passed the depth test
    pub samples_written: u32,
    /// True when the frame stopped early
    pub cancelled: bool,
}

/// Renderer state shared by every phase
#[derive(Debug)]
pub struct RendererContext {
    models: Vec<CompiledModel>,
    instances: Vec<Instance>,
    config: SchedulerConfig,
    previous_pyramid: Option<DepthPyramid>,
}

impl RendererContext {
    /// Empty context with a validated config
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(RendererContext {
            models: Vec::new(),
            instances: Vec::new(),
            config,
            previous_pyramid: None,
        })
    }

    /// Add a compiled model; returns its index
    pub fn add_model(&mut self, model: CompiledModel) -> usize {
        self.models.push(model);
        self.models.len() - 1
    }

    /// Add an instance of a loaded model; returns its index
    pub fn add_instance(&mut self, instance: Instance) -> Result<usize, SchedulerError> {
        if instance.model >= self.models.len() {
            return Err(SchedulerError::UnknownModel {
                model: instance.model,
                models: self.models.len(),
            });
        }
        self.instances.push(instance);
        Ok(self.instances.len() - 1)
    }

    /// Mutable access for per-frame transform updates
    pub fn instance_mut(&mut self, index: usize) -> Option<&mut Instance> {
        self.instances.get_mut(index)
    }

    /// Drop every model and instance, as on reload
    pub fn clear(&mut self) {
        self.models.clear();
        self.instances.clear();
        self.previous_pyramid = None;
    }

    /// Loaded models
    pub fn models(&self) -> &[CompiledModel] {
        &self.models
    }

    /// Placed instances
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Scheduler options
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Depth pyramid of the last completed frame, when occlusion culling is on
    pub fn previous_pyramid(&self) -> Option<&DepthPyramid> {
        self.previous_pyramid.as_ref()
    }
}

/// Run one frame into `gbuffer`
///
/// The G-buffer is cleared first. On cancellation the frame stops before
/// the next dispatch and the buffer holds whatever was drawn so far.
pub fn render_frame(
    context: &mut RendererContext,
    view: &ViewInfo,
    gbuffer: &mut GBuffer,
    cancel: &CancelToken,
) -> Result<FrameStats, SchedulerError> {
    if (gbuffer.width(), gbuffer.height()) != (view.width, view.height) {
        return Err(SchedulerError::ScreenMismatch {
            expected: (view.width, view.height),
            found: (gbuffer.width(), gbuffer.height()),
        });
    }
    gbuffer.clear();

    let mut stats = FrameStats::default();
    let mut phase = FramePhase::Setup;
    let mut projected = Vec::new();
    let mut heap = TileHeap::from_entries(Vec::new(), 1);
    let mut pending = None;

    while phase != FramePhase::Done {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            debug!("frame cancelled before {:?}", phase);
            return Ok(stats);
        }
        phase = match phase {
            FramePhase::Setup => {
                projected = setup(context, view);
                FramePhase::Cull
            }
            FramePhase::Cull => {
                heap = cull(context, view, &projected);
                stats.visible_triples = heap.stack_ptr();
                FramePhase::Tally
            }
            FramePhase::Tally => match tally(&mut heap) {
                Some(args) => {
                    pending = Some(args);
                    FramePhase::Draw
                }
                None => FramePhase::Done,
            },
            FramePhase::Draw => {
                if let Some(args) = pending.take() {
                    stats.samples_written += draw(context, view, &heap, &args, gbuffer);
                    stats.segments.push(args);
                }
                FramePhase::Tally
            }
            FramePhase::Done => FramePhase::Done,
        };
    }

    if context.config.occlusion_culling {
        context.previous_pyramid = Some(DepthPyramid::from_gbuffer(gbuffer));
    }
    debug!(
        "frame: {} rect(s), {} heap entr(ies), {} segment(s), {} sample(s)",
        projected.len(),
        stats.visible_triples,
        stats.segments.len(),
        stats.samples_written
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentConfig;
    use crate::model::compile;
    use crate::types::CsgTree;
    use glam::{Quat, Vec3};

    fn sphere_scene(config: SchedulerConfig) -> (RendererContext, ViewInfo) {
        let mut context = RendererContext::new(config).unwrap();
        let model = compile(&CsgTree::sphere(1.0).unwrap(), &SegmentConfig::default()).unwrap();
        let index = context.add_model(model);
        context.add_instance(Instance::new(index)).unwrap();
        let view = ViewInfo::look_at(
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::ZERO,
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            32,
            32,
            0.1,
            50.0,
        )
        .unwrap();
        (context, view)
    }

    #[test]
    fn test_sphere_frame() {
        let (mut context, view) = sphere_scene(SchedulerConfig::default());
        let mut gbuffer = GBuffer::new(32, 32);
        let stats = render_frame(&mut context, &view, &mut gbuffer, &CancelToken::new()).unwrap();
        assert!(!stats.cancelled);
        assert!(stats.visible_triples >= 1);
        assert!(!stats.segments.is_empty());

        let center = gbuffer.sample(16, 16).unwrap();
        assert_eq!(center.cluster, 0);
        assert!((center.position.z - 1.0).abs() < 0.05);
        assert!(center.normal.z > 0.95);
        assert_eq!(center.color, Vec3::ONE);
        assert!(gbuffer.sample(0, 0).is_none());
    }

    #[test]
    fn test_cancelled_frame_draws_nothing() {
        let (mut context, view) = sphere_scene(SchedulerConfig::default());
        let mut gbuffer = GBuffer::new(32, 32);
        let cancel = CancelToken::new();
        cancel.cancel();
        let stats = render_frame(&mut context, &view, &mut gbuffer, &cancel).unwrap();
        assert!(stats.cancelled);
        assert_eq!(gbuffer.covered(), 0);
    }

    #[test]
    fn test_mismatched_gbuffer() {
        let (mut context, view) = sphere_scene(SchedulerConfig::default());
        let mut gbuffer = GBuffer::new(8, 8);
        assert!(matches!(
            render_frame(&mut context, &view, &mut gbuffer, &CancelToken::new()),
            Err(SchedulerError::ScreenMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_model_rejected() {
        let mut context = RendererContext::new(SchedulerConfig::default()).unwrap();
        assert_eq!(
            context.add_instance(Instance::new(0)),
            Err(SchedulerError::UnknownModel {
                model: 0,
                models: 0
            })
        );
    }

    #[test]
    fn test_instance_moves_image() {
        let (mut context, view) = sphere_scene(SchedulerConfig::default());
        if let Some(instance) = context.instance_mut(0) {
            instance.set_transform(Quat::IDENTITY, Vec3::new(20.0, 0.0, 0.0));
        }
        let mut gbuffer = GBuffer::new(32, 32);
        let stats = render_frame(&mut context, &view, &mut gbuffer, &CancelToken::new()).unwrap();
        assert_eq!(stats.visible_triples, 0);
        assert_eq!(gbuffer.covered(), 0);
    }

    #[test]
    fn test_occlusion_keeps_pyramid() {
        let config = SchedulerConfig {
            occlusion_culling: true,
            ..SchedulerConfig::default()
        };
        let (mut context, view) = sphere_scene(config);
        let mut gbuffer = GBuffer::new(32, 32);
        render_frame(&mut context, &view, &mut gbuffer, &CancelToken::new()).unwrap();
        let pyramid = context.previous_pyramid().unwrap();
        assert_eq!((pyramid.width(), pyramid.height()), (32, 32));

        // The same frame again is not occluded by itself
        let first = gbuffer.clone();
        render_frame(&mut context, &view, &mut gbuffer, &CancelToken::new()).unwrap();
        assert_eq!(first, gbuffer);
    }
}
