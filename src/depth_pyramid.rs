//! Hierarchical depth for occlusion culling
//!
//! Level 0 is a copy of a G-buffer's depth. Every further level halves the
//! resolution, rounding up, and keeps the farthest depth of the up to 2x2
//! texels below it. Pixels without a sample hold `f32::INFINITY`, so they
//! never occlude anything.

use crate::scheduler::{ClipRect, GBuffer};
use rayon::prelude::*;

/// Slack in NDC depth before a rect counts as behind the pyramid
///
/// A cluster's own surface lies inside its box, so its nearest box depth
/// and the depth it wrote last frame can differ only by rounding. Without
/// the slack a cluster would cull itself on alternate frames.
pub const OCCLUSION_DEPTH_BIAS: f32 = 1e-5;

#[derive(Clone, Debug, PartialEq)]
struct DepthLevel {
    width: u32,
    height: u32,
    texels: Vec<f32>,
}

impl DepthLevel {
    #[inline]
    fn at(&self, x: u32, y: u32) -> f32 {
        self.texels[(y * self.width + x) as usize]
    }

    fn reduce(&self) -> DepthLevel {
        let width = self.width.div_ceil(2);
        let height = self.height.div_ceil(2);
        let mut texels = vec![0.0; (width * height) as usize];
        texels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as u32;
                for (x, texel) in row.iter_mut().enumerate() {
                    let x = x as u32;
                    let x1 = (2 * x + 1).min(self.width - 1);
                    let y1 = (2 * y + 1).min(self.height - 1);
                    *texel = self
                        .at(2 * x, 2 * y)
                        .max(self.at(x1, 2 * y))
                        .max(self.at(2 * x, y1))
                        .max(self.at(x1, y1));
                }
            });
        DepthLevel {
            width,
            height,
            texels,
        }
    }
}

/// Max-reduced depth mip chain
#[derive(Clone, Debug, PartialEq)]
pub struct DepthPyramid {
    levels: Vec<DepthLevel>,
}

impl DepthPyramid {
    /// Build from a row-major depth image
    ///
    /// Returns `None` when the dimensions do not match the slice or are zero.
    pub fn build(width: u32, height: u32, depth: &[f32]) -> Option<Self> {
        if width == 0 || height == 0 || depth.len() != (width * height) as usize {
            return None;
        }
        Some(Self::reduce_from(DepthLevel {
            width,
            height,
            texels: depth.to_vec(),
        }))
    }

    /// Build from a G-buffer's depth channel
    pub fn from_gbuffer(gbuffer: &GBuffer) -> Self {
        Self::reduce_from(DepthLevel {
            width: gbuffer.width(),
            height: gbuffer.height(),
            texels: gbuffer.depth().to_vec(),
        })
    }

    fn reduce_from(base: DepthLevel) -> Self {
        let mut levels = vec![base];
        while let Some(last) = levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = last.reduce();
            levels.push(next);
        }
        DepthPyramid { levels }
    }

    /// Width of level 0
    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    /// Height of level 0
    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    /// Number of levels, the last one being 1x1
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Dimensions of a level
    pub fn level_size(&self, level: usize) -> Option<(u32, u32)> {
        self.levels.get(level).map(|l| (l.width, l.height))
    }

    /// Farthest depth over an inclusive pixel rectangle of level 0
    ///
    /// Reads the coarsest level at which the rectangle spans at most 2x2
    /// texels. Corners may be given in either order.
    pub fn farthest_in_rect(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> f32 {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        let mut level = 0;
        while level + 1 < self.levels.len()
            && ((x1 >> level) - (x0 >> level) > 1 || (y1 >> level) - (y0 >> level) > 1)
        {
            level += 1;
        }
        let data = &self.levels[level];
        let (lx0, lx1) = ((x0 >> level).min(data.width - 1), (x1 >> level).min(data.width - 1));
        let (ly0, ly1) = ((y0 >> level).min(data.height - 1), (y1 >> level).min(data.height - 1));

        let mut farthest = f32::NEG_INFINITY;
        for y in ly0..=ly1 {
            for x in lx0..=lx1 {
                farthest = farthest.max(data.at(x, y));
            }
        }
        farthest
    }

    /// True when everything under `rect` is nearer than its nearest depth
    ///
    /// The comparison allows [`OCCLUSION_DEPTH_BIAS`] of slack. Rects
    /// entirely off screen are never occluded.
    pub fn is_occluded(&self, rect: &ClipRect) -> bool {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let px0 = ((rect.min.x + 1.0) * 0.5 * w).floor().max(0.0);
        let px1 = ((rect.max.x + 1.0) * 0.5 * w).ceil().min(w) - 1.0;
        let py0 = ((1.0 - rect.max.y) * 0.5 * h).floor().max(0.0);
        let py1 = ((1.0 - rect.min.y) * 0.5 * h).ceil().min(h) - 1.0;
        if !(px0 <= px1 && py0 <= py1) {
            return false;
        }
        let farthest = self.farthest_in_rect(px0 as u32, py0 as u32, px1 as u32, py1 as u32);
        rect.near_depth > farthest + OCCLUSION_DEPTH_BIAS
    }
}
