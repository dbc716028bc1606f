//! Per-pixel surface samples

use glam::Vec3;

/// Cluster/instance id of a pixel with no sample
pub const NO_SAMPLE: u32 = u32::MAX;

/// One resolved surface point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// NDC depth
    pub depth: f32,
    /// World-space position
    pub position: Vec3,
    /// World-space unit normal
    pub normal: Vec3,
    /// Absolute distance left when the trace stopped
    pub error: f32,
    /// Flattened cluster index
    pub cluster: u32,
    /// Instance index
    pub instance: u32,
    /// Material color
    pub color: Vec3,
}

impl Sample {
    /// True when this sample should replace `other` in the depth test
    ///
    /// Nearer wins; equal depths go to the smaller (cluster, instance).
    #[inline]
    pub fn wins_over(&self, other_depth: f32, other_cluster: u32, other_instance: u32) -> bool {
        if self.depth != other_depth {
            return self.depth < other_depth;
        }
        (self.cluster, self.instance) < (other_cluster, other_instance)
    }
}

/// Screen-sized surface buffers, one entry per pixel, rows from the top
#[derive(Clone, Debug, PartialEq)]
pub struct GBuffer {
    width: u32,
    height: u32,
    depth: Vec<f32>,
    position: Vec<Vec3>,
    normal: Vec<Vec3>,
    error: Vec<f32>,
    cluster: Vec<u32>,
    instance: Vec<u32>,
    color: Vec<Vec3>,
}

impl GBuffer {
    /// Cleared buffer
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        GBuffer {
            width,
            height,
            depth: vec![f32::INFINITY; len],
            position: vec![Vec3::ZERO; len],
            normal: vec![Vec3::ZERO; len],
            error: vec![0.0; len],
            cluster: vec![NO_SAMPLE; len],
            instance: vec![NO_SAMPLE; len],
            color: vec![Vec3::ZERO; len],
        }
    }

    /// Reset every pixel to "no sample"
    pub fn clear(&mut self) {
        self.depth.fill(f32::INFINITY);
        self.position.fill(Vec3::ZERO);
        self.normal.fill(Vec3::ZERO);
        self.error.fill(0.0);
        self.cluster.fill(NO_SAMPLE);
        self.instance.fill(NO_SAMPLE);
        self.color.fill(Vec3::ZERO);
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth channel, `f32::INFINITY` where nothing was hit
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Cluster channel, [`NO_SAMPLE`] where nothing was hit
    pub fn clusters(&self) -> &[u32] {
        &self.cluster
    }

    /// Number of pixels holding a sample
    pub fn covered(&self) -> usize {
        self.cluster.iter().filter(|&&c| c != NO_SAMPLE).count()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Sample at a pixel, if any
    pub fn sample(&self, x: u32, y: u32) -> Option<Sample> {
        let i = self.index(x, y)?;
        if self.cluster[i] == NO_SAMPLE {
            return None;
        }
        Some(Sample {
            depth: self.depth[i],
            position: self.position[i],
            normal: self.normal[i],
            error: self.error[i],
            cluster: self.cluster[i],
            instance: self.instance[i],
            color: self.color[i],
        })
    }

    /// Depth-test a sample into a pixel; true when it was written
    pub fn resolve(&mut self, x: u32, y: u32, sample: &Sample) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if !sample.wins_over(self.depth[i], self.cluster[i], self.instance[i]) {
            return false;
        }
        self.depth[i] = sample.depth;
        self.position[i] = sample.position;
        self.normal[i] = sample.normal;
        self.error[i] = sample.error;
        self.cluster[i] = sample.cluster;
        self.instance[i] = sample.instance;
        self.color[i] = sample.color;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(depth: f32, cluster: u32) -> Sample {
        Sample {
            depth,
            position: Vec3::ZERO,
            normal: Vec3::Z,
            error: 0.0,
            cluster,
            instance: 0,
            color: Vec3::ONE,
        }
    }

    #[test]
    fn test_nearest_wins_either_order() {
        let (near, far) = (sample(0.2, 1), sample(0.7, 0));
        let mut a = GBuffer::new(2, 2);
        a.resolve(1, 0, &near);
        a.resolve(1, 0, &far);
        let mut b = GBuffer::new(2, 2);
        b.resolve(1, 0, &far);
        b.resolve(1, 0, &near);
        assert_eq!(a, b);
        assert_eq!(a.sample(1, 0).unwrap().cluster, 1);
        assert_eq!(a.covered(), 1);
    }

    #[test]
    fn test_tie_goes_to_smaller_cluster() {
        let mut g = GBuffer::new(1, 1);
        assert!(g.resolve(0, 0, &sample(0.5, 3)));
        assert!(g.resolve(0, 0, &sample(0.5, 2)));
        assert!(!g.resolve(0, 0, &sample(0.5, 4)));
        assert_eq!(g.sample(0, 0).unwrap().cluster, 2);
    }

    #[test]
    fn test_out_of_range_and_clear() {
        let mut g = GBuffer::new(2, 1);
        assert!(!g.resolve(2, 0, &sample(0.1, 0)));
        assert!(g.sample(0, 5).is_none());
        g.resolve(0, 0, &sample(0.1, 0));
        g.clear();
        assert_eq!(g, GBuffer::new(2, 1));
    }
}
