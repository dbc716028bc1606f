//! Camera and instance transforms

use super::SchedulerError;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Camera state for one frame
///
/// Projection follows glam's right-handed convention with NDC depth in
/// `[0, 1]`. Pixel rows are numbered from the top of the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewInfo {
    /// World to camera space
    pub world_to_view: Mat4,
    /// Camera to world space
    pub view_to_world: Mat4,
    /// Camera to clip space
    pub view_to_clip: Mat4,
    /// Clip to camera space
    pub clip_to_view: Mat4,
    /// Eye position in world space
    pub camera_origin: Vec3,
    /// Screen width in pixels
    pub width: u32,
    /// Screen height in pixels
    pub height: u32,
    /// Host clock, uploaded as-is
    pub current_time: f32,
}

impl ViewInfo {
    /// Build from explicit matrices
    pub fn new(
        world_to_view: Mat4,
        view_to_clip: Mat4,
        width: u32,
        height: u32,
    ) -> Result<Self, SchedulerError> {
        if width == 0 || height == 0 {
            return Err(SchedulerError::EmptyScreen { width, height });
        }
        for (name, matrix) in [("world_to_view", world_to_view), ("view_to_clip", view_to_clip)] {
            let det = matrix.determinant();
            if !matrix.is_finite() || det == 0.0 || !det.is_finite() {
                return Err(SchedulerError::InvalidView(format!(
                    "{} is not invertible",
                    name
                )));
            }
        }
        let view_to_world = world_to_view.inverse();
        Ok(ViewInfo {
            world_to_view,
            view_to_world,
            view_to_clip,
            clip_to_view: view_to_clip.inverse(),
            camera_origin: view_to_world.transform_point3(Vec3::ZERO),
            width,
            height,
            current_time: 0.0,
        })
    }

    /// Perspective camera at `eye` looking at `target`
    #[allow(clippy::too_many_arguments)]
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        width: u32,
        height: u32,
        near: f32,
        far: f32,
    ) -> Result<Self, SchedulerError> {
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(SchedulerError::InvalidView(format!(
                "depth range {}..{} must satisfy 0 < near < far",
                near, far
            )));
        }
        if !(fov_y > 0.0 && fov_y < std::f32::consts::PI) {
            return Err(SchedulerError::InvalidView(format!(
                "vertical field of view {} out of range",
                fov_y
            )));
        }
        let forward = target - eye;
        if forward.length_squared() < 1e-12 || forward.cross(up).length_squared() < 1e-12 {
            return Err(SchedulerError::InvalidView(
                "eye, target and up do not define an orientation".into(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(SchedulerError::EmptyScreen { width, height });
        }
        let aspect = width as f32 / height as f32;
        ViewInfo::new(
            Mat4::look_at_rh(eye, target, up),
            Mat4::perspective_rh(fov_y, aspect, near, far),
            width,
            height,
        )
    }

    /// World to clip space
    #[inline]
    pub fn world_to_clip(&self) -> Mat4 {
        self.view_to_clip * self.world_to_view
    }

    /// Clip to world space
    #[inline]
    pub fn clip_to_world(&self) -> Mat4 {
        self.view_to_world * self.clip_to_view
    }

    /// NDC coordinates of a pixel center
    #[inline]
    pub fn pixel_ndc(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / self.height as f32 * 2.0,
        )
    }

    /// World-space ray through a pixel center, as (origin, unit direction)
    ///
    /// The origin is the pixel's point on the near plane, so the ray is
    /// correct for orthographic projections as well as perspective ones.
    pub fn pixel_ray(&self, x: u32, y: u32) -> (Vec3, Vec3) {
        let ndc = self.pixel_ndc(x, y);
        let clip_to_world = self.clip_to_world();
        let near = clip_to_world.project_point3(ndc.extend(0.0));
        let far = clip_to_world.project_point3(ndc.extend(1.0));
        (near, (far - near).normalize())
    }

    /// NDC depth of a world-space point
    #[inline]
    pub fn depth_of(&self, world: Vec3) -> f32 {
        let clip = self.world_to_clip() * world.extend(1.0);
        clip.z / clip.w
    }

    /// GPU upload layout
    pub fn upload(&self) -> ViewInfoUpload {
        let (w, h) = (self.width as f32, self.height as f32);
        ViewInfoUpload {
            world_to_view: self.world_to_view.to_cols_array_2d(),
            view_to_world: self.view_to_world.to_cols_array_2d(),
            view_to_clip: self.view_to_clip.to_cols_array_2d(),
            clip_to_view: self.clip_to_view.to_cols_array_2d(),
            camera_origin: self.camera_origin.extend(1.0).to_array(),
            screen_size: Vec4::new(w, h, 1.0 / w, 1.0 / h).to_array(),
            current_time: [self.current_time, 0.0, 0.0, 0.0],
        }
    }
}

/// `ViewInfo` as laid out in the uniform buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ViewInfoUpload {
    /// World to camera space, column major
    pub world_to_view: [[f32; 4]; 4],
    /// Camera to world space
    pub view_to_world: [[f32; 4]; 4],
    /// Camera to clip space
    pub view_to_clip: [[f32; 4]; 4],
    /// Clip to camera space
    pub clip_to_view: [[f32; 4]; 4],
    /// Eye position, w = 1
    pub camera_origin: [f32; 4],
    /// (width, height, 1 / width, 1 / height)
    pub screen_size: [f32; 4],
    /// Time in x, rest padding
    pub current_time: [f32; 4],
}

/// One placement of a compiled model
///
/// Transforms are rigid (rotation and translation only) so local distances
/// stay valid in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    /// Index of the model in the renderer context
    pub model: usize,
    local_to_world: Mat4,
    world_to_local: Mat4,
}

impl Instance {
    /// Instance at the origin
    pub fn new(model: usize) -> Self {
        Instance {
            model,
            local_to_world: Mat4::IDENTITY,
            world_to_local: Mat4::IDENTITY,
        }
    }

    /// Instance with a rigid placement
    pub fn with_transform(model: usize, rotation: Quat, translation: Vec3) -> Self {
        let mut instance = Instance::new(model);
        instance.set_transform(rotation, translation);
        instance
    }

    /// Replace the placement
    pub fn set_transform(&mut self, rotation: Quat, translation: Vec3) {
        let rotation = rotation.normalize();
        self.local_to_world = Mat4::from_rotation_translation(rotation, translation);
        self.world_to_local =
            Mat4::from_rotation_translation(rotation.conjugate(), -(rotation.conjugate() * translation));
    }

    /// Model to world space
    #[inline]
    pub fn local_to_world(&self) -> Mat4 {
        self.local_to_world
    }

    /// World to model space
    #[inline]
    pub fn world_to_local(&self) -> Mat4 {
        self.world_to_local
    }
}
