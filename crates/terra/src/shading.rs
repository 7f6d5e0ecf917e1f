//! Terrain point shading.
//!
//! The GPU runs `terrain_points.wgsl`; this module holds the constants it is
//! fed with, the uniform block layout, and a CPU rendition of both stages so
//! the displacement, highlight and culling rules can be checked without a
//! device. Both read the same [`TerrainUniforms`].

use crate::camera::PerspectiveCamera;
use crate::geometry::PointSample;
use crate::sampler::InteractionState;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

/// Terrain sprite edge length in pixels.
pub const POINT_SIZE_PX: f32 = 4.0;
/// Texture-space radius of the cursor bulge and glow.
pub const PROXIMITY_THRESHOLD: f32 = 0.04;
/// View-space depth offset per unit of elevation.
pub const ELEVATION_SCALE: f32 = 0.35;
/// Bulge depth per unit of texture distance inside the threshold.
pub const BULGE_SCALE: f32 = 10.0;
/// Highlight blend weight per unit of texture distance inside the threshold.
pub const GLOW_SCALE: f32 = 50.0;

/// Anything that can be sampled at a texture coordinate (`v` up).
pub trait TextureSampler {
    fn sample(&self, uv: Vec2) -> Vec4;
}

impl<F> TextureSampler for F
where
    F: Fn(Vec2) -> Vec4,
{
    fn sample(&self, uv: Vec2) -> Vec4 {
        self(uv)
    }
}

/// The four maps the terrain stages read.
pub struct TerrainMaps<'a> {
    pub elevation: &'a dyn TextureSampler,
    pub surface_color: &'a dyn TextureSampler,
    pub highlight: &'a dyn TextureSampler,
    pub ocean_mask: &'a dyn TextureSampler,
}

/// Uniform set shared by the vertex and fragment stages.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainUniforms {
    pub model_view: Mat4,
    pub projection: Mat4,
    pub normal_matrix: Mat3,
    /// `None` disables both the bulge and the glow.
    pub interaction_uv: Option<Vec2>,
    pub viewport: Vec2,
    pub point_size_px: f32,
    pub threshold: f32,
    pub elevation_scale: f32,
    pub bulge_scale: f32,
    pub glow_scale: f32,
}

impl TerrainUniforms {
    pub fn new(
        camera: &PerspectiveCamera,
        model: &Mat4,
        interaction: &InteractionState,
        viewport: Vec2,
    ) -> Self {
        let model_view = camera.view() * *model;
        Self {
            model_view,
            projection: camera.projection(),
            normal_matrix: Mat3::from_mat4(model_view).inverse().transpose(),
            interaction_uv: interaction.surface_uv(),
            viewport,
            point_size_px: POINT_SIZE_PX,
            threshold: PROXIMITY_THRESHOLD,
            elevation_scale: ELEVATION_SCALE,
            bulge_scale: BULGE_SCALE,
            glow_scale: GLOW_SCALE,
        }
    }

    /// Texture distance from `uv` to the interaction coordinate; infinite
    /// while it is unset.
    #[inline]
    pub fn proximity(&self, uv: Vec2) -> f32 {
        self.interaction_uv
            .map_or(f32::INFINITY, |i| wrapped_uv_distance(i, uv))
    }

    pub fn to_std140(&self) -> TerrainUniformsStd140 {
        let (uv, active) = match self.interaction_uv {
            Some(uv) => (uv, 1.0),
            None => (Vec2::ZERO, 0.0),
        };

        TerrainUniformsStd140 {
            model_view: self.model_view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(self.normal_matrix).to_cols_array_2d(),
            interaction: [uv.x, uv.y, active, 0.0],
            params: [
                self.point_size_px,
                self.threshold,
                self.elevation_scale,
                self.bulge_scale,
            ],
            viewport: [self.viewport.x, self.viewport.y, self.glow_scale, 0.0],
        }
    }
}

/// Uniform block as laid out in `terrain_points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniformsStd140 {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Upper 3x3 used; mat3 columns are padded to vec4 in uniforms anyway.
    pub normal_matrix: [[f32; 4]; 4],
    /// `uv.x, uv.y, active (0|1), _`.
    pub interaction: [f32; 4],
    /// `point_size_px, threshold, elevation_scale, bulge_scale`.
    pub params: [f32; 4],
    /// `width, height, glow_scale, _`.
    pub viewport: [f32; 4],
}

// Buffer size must match the WGSL struct.
const _: [(); 240] = [(); core::mem::size_of::<TerrainUniformsStd140>()];

/// Distance between two texture coordinates with `u` wrapping at the
/// `0 / 1` meridian.
#[inline]
pub fn wrapped_uv_distance(a: Vec2, b: Vec2) -> f32 {
    let du = (a.x - b.x).abs().rem_euclid(1.0);
    Vec2::new(du.min(1.0 - du), a.y - b.y).length()
}

/// Extra depth offset towards the camera for a point `distance` away from
/// the interaction coordinate. Zero at and beyond the threshold, growing
/// linearly to `threshold * scale` at the centre.
#[inline]
pub fn proximity_displacement(distance: f32, threshold: f32, scale: f32) -> f32 {
    if distance < threshold {
        (threshold - distance) * scale
    } else {
        0.0
    }
}

/// Blend weight towards the highlight map. Same falloff as the bulge; not
/// clamped, so values past 1 extrapolate beyond the highlight color.
#[inline]
pub fn highlight_weight(distance: f32, threshold: f32, scale: f32) -> f32 {
    proximity_displacement(distance, threshold, scale)
}

/// 1.0 when the view-space normal faces the eye, else 0.0.
#[inline]
pub fn visibility(view_pos: Vec3, view_normal: Vec3) -> f32 {
    let facing = (-view_pos.normalize()).dot(view_normal.normalize());
    if facing >= 0.0 {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub point_size_px: f32,
    pub uv: Vec2,
    pub visibility: f32,
    pub proximity: f32,
}

pub fn vertex_stage(u: &TerrainUniforms, maps: &TerrainMaps<'_>, point: &PointSample) -> VertexOutput {
    let uv = point.uv();
    let position = point.position();

    let mut view_pos = u.model_view * position.extend(1.0);
    let elevation = maps.elevation.sample(uv).x;
    let view_normal = u.normal_matrix * position;
    let visibility = visibility(view_pos.xyz(), view_normal);

    view_pos.z += u.elevation_scale * elevation;

    let proximity = u.proximity(uv);
    view_pos.z += proximity_displacement(proximity, u.threshold, u.bulge_scale);

    VertexOutput {
        clip_position: u.projection * view_pos,
        point_size_px: u.point_size_px,
        uv,
        visibility,
        proximity,
    }
}

/// Final RGBA of a point, or `None` when the fragment is discarded.
pub fn fragment_stage(u: &TerrainUniforms, maps: &TerrainMaps<'_>, input: &VertexOutput) -> Option<Vec4> {
    if (input.visibility + 0.1).floor() == 0.0 {
        return None;
    }

    let alpha = 1.0 - maps.ocean_mask.sample(input.uv).x;
    let mut base = maps.surface_color.sample(input.uv).xyz();
    if input.proximity < u.threshold {
        let highlight = maps.highlight.sample(input.uv).xyz();
        base = base.lerp(highlight, highlight_weight(input.proximity, u.threshold, u.glow_scale));
    }

    Some(base.extend(alpha))
}
