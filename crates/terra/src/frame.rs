//! Per-frame loop: render, spin, pick, settle the camera, schedule.

use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::geometry::SphereMesh;
use crate::sampler::{InteractionState, SurfaceSampler};
use crate::shading::TerrainUniforms;
use glam::{Mat4, Vec2};
use std::f32::consts::TAU;

/// Globe spin per frame, radians about +Y.
pub const DEFAULT_ROTATION_STEP: f32 = 0.002;

/// Everything a frame reads or advances. Owned by the caller so the loop can
/// be driven without a window or device.
pub struct GlobeScene {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub interaction: InteractionState,
    pub sampler: SurfaceSampler,
    /// Globe rotation about +Y, radians in `[0, 2π)`.
    pub rotation: f32,
    /// Output size in pixels.
    pub viewport: Vec2,
}

impl GlobeScene {
    pub fn new(scaffold: SphereMesh, width: u32, height: u32) -> Self {
        let mut camera = PerspectiveCamera::default();
        camera.set_viewport(width, height);

        Self {
            camera,
            controls: OrbitControls::new(),
            interaction: InteractionState::new(),
            sampler: SurfaceSampler::new(scaffold),
            rotation: 0.0,
            viewport: Vec2::new(width.max(1) as f32, height.max(1) as f32),
        }
    }

    /// Transform of the globe group (scaffold and terrain share it).
    pub fn model(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation)
    }

    /// Recomputes the projection for a new output size. Idempotent; zero
    /// sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.set_viewport(width, height);
            self.viewport = Vec2::new(width as f32, height as f32);
        }
    }

    pub fn terrain_uniforms(&self) -> TerrainUniforms {
        TerrainUniforms::new(&self.camera, &self.model(), &self.interaction, self.viewport)
    }
}

/// Receives the scene once per frame.
pub trait FrameSink {
    type Error;

    fn submit(&mut self, scene: &GlobeScene) -> Result<(), Self::Error>;
}

/// Requests the next iteration, e.g. from the display's refresh signal.
pub trait FrameScheduler {
    fn request_next_frame(&mut self);
}

pub struct FrameDriver {
    rotation_step: f32,
    frames: u64,
}

impl FrameDriver {
    pub fn new(rotation_step: f32) -> Self {
        Self {
            rotation_step,
            frames: 0,
        }
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn rotation_step(&self) -> f32 {
        self.rotation_step
    }

    /// Runs one iteration, strictly in order: submit the frame, advance the
    /// globe rotation, resolve the pointer, settle the orbit damping, request
    /// the next frame.
    ///
    /// A failed submit does not skip the rest of the iteration; its error is
    /// returned once the next frame has been requested.
    pub fn tick<S, R>(
        &mut self,
        scene: &mut GlobeScene,
        sink: &mut S,
        scheduler: &mut R,
    ) -> Result<(), S::Error>
    where
        S: FrameSink,
        R: FrameScheduler,
    {
        let submitted = sink.submit(scene);

        // Kept in [0, 2π) so the step never rounds away in f32.
        scene.rotation = (scene.rotation + self.rotation_step).rem_euclid(TAU);

        let model = scene.model();
        scene
            .sampler
            .resolve(&mut scene.interaction, &scene.camera, &model);

        scene.controls.update(&mut scene.camera);

        self.frames += 1;
        scheduler.request_next_frame();

        if self.frames % 600 == 0 {
            log::debug!(
                "frame {} | rotation {:.3} rad | uv {:?}",
                self.frames,
                scene.rotation,
                scene.interaction.surface_uv()
            );
        }

        submitted
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_STEP)
    }
}
