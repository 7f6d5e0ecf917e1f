//! Resolves the pointer to a texture coordinate on the globe surface.

use crate::camera::PerspectiveCamera;
use crate::geometry::SphereMesh;
use crate::raycast::{raycast_mesh, SurfaceHit};
use glam::{Mat4, Vec2};

/// Pointer and resolved surface coordinate, shared between input handling,
/// the per-frame sampler and uniform packing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    /// Normalized device coordinate, `[-1, 1]` on both axes, `y` up.
    /// `None` until the pointer first moves.
    pointer: Option<Vec2>,
    /// Last texture coordinate the pointer hit. `None` until the first hit.
    surface_uv: Option<Vec2>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    #[inline]
    pub fn surface_uv(&self) -> Option<Vec2> {
        self.surface_uv
    }

    /// Records a pointer position; the latest value wins.
    pub fn set_pointer(&mut self, ndc: Vec2) {
        self.pointer = Some(ndc);
    }

    /// Records a pointer position given in window pixels (origin top-left).
    pub fn set_pointer_px(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.set_pointer(pixels_to_ndc(x, y, width, height));
    }
}

/// Window pixels (origin top-left, `y` down) to normalized device coordinates.
pub fn pixels_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    let w = width.max(1.0);
    let h = height.max(1.0);
    Vec2::new(x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
}

/// Casts the pointer ray against the reference sphere mesh only. The dense
/// terrain point cloud has no surface to hit.
pub struct SurfaceSampler {
    mesh: SphereMesh,
}

impl SurfaceSampler {
    pub fn new(mesh: SphereMesh) -> Self {
        Self { mesh }
    }

    #[inline]
    pub fn mesh(&self) -> &SphereMesh {
        &self.mesh
    }

    /// Nearest surface hit under `ndc`, if any.
    pub fn pick(&self, ndc: Vec2, camera: &PerspectiveCamera, model: &Mat4) -> Option<SurfaceHit> {
        let ray = camera.ray_from_ndc(ndc);
        raycast_mesh(&self.mesh, model, &ray)
    }

    /// Updates `state.surface_uv` from the current pointer.
    ///
    /// On a miss the previous coordinate is kept, so the highlight does not
    /// snap away when the pointer leaves the globe's silhouette. Returns the
    /// hit, if there was one.
    ///
    /// Seam triangles of the mesh carry `u` past 1; the stored coordinate is
    /// wrapped back into `[0, 1)` so it lines up with the terrain points.
    pub fn resolve(
        &self,
        state: &mut InteractionState,
        camera: &PerspectiveCamera,
        model: &Mat4,
    ) -> Option<SurfaceHit> {
        let ndc = state.pointer?;
        let mut hit = self.pick(ndc, camera, model)?;
        hit.uv.x = hit.uv.x.rem_euclid(1.0);
        state.surface_uv = Some(hit.uv);
        log::trace!("pointer ({:.3}, {:.3}) -> uv ({:.4}, {:.4})", ndc.x, ndc.y, hit.uv.x, hit.uv.y);
        Some(hit)
    }
}
