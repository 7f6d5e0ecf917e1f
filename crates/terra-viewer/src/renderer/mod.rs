//! Owns the GPU context, the depth target and every pipeline, and records one
//! frame: scaffold, terrain, stars, then the optional HUD.

pub mod context;
pub mod pipelines;
pub mod targets;
pub mod textures;

use self::{
    context::GfxContext,
    pipelines::{
        scaffold::{ScaffoldPipeline, ScaffoldUniforms},
        starfield::{StarFieldPipeline, StarUniforms},
        terrain::TerrainPipeline,
    },
    targets::{DepthTarget, DEPTH_FORMAT},
    textures::GlobeTextures,
};
use crate::ui::HudFrame;
use std::sync::Arc;
use terra::{GlobeScene, PointSample, SphereMesh, StarSample};
use winit::window::Window;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

pub struct Renderer {
    pub gfx: GfxContext,
    pub depth: DepthTarget,
    pub textures: GlobeTextures,
    pub scaffold: ScaffoldPipeline,
    pub terrain: TerrainPipeline,
    pub stars: StarFieldPipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        scaffold: &SphereMesh,
        points: &[PointSample],
        stars: &[StarSample],
    ) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let color_fmt = gfx.format();

        let depth = DepthTarget::new(&gfx.device, gfx.size);
        let textures = GlobeTextures::new(&gfx.device, &gfx.queue);

        let scaffold = ScaffoldPipeline::new(&gfx.device, color_fmt, DEPTH_FORMAT, scaffold);
        let terrain = TerrainPipeline::new(&gfx.device, color_fmt, DEPTH_FORMAT, points, &textures);
        let stars = StarFieldPipeline::new(&gfx.device, color_fmt, DEPTH_FORMAT, stars, &textures);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, color_fmt, None, 1);

        Ok(Self {
            gfx,
            depth,
            textures,
            scaffold,
            terrain,
            stars,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.depth.resize(&self.gfx.device, new_size);
        }
    }

    /// Draws `scene` to the next swapchain image and presents it.
    pub fn render(
        &mut self,
        scene: &GlobeScene,
        hud: Option<&HudFrame>,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let model = scene.model();
        self.scaffold.prepare(
            &self.gfx.queue,
            &ScaffoldUniforms::new(scene.camera.view_proj(), model),
        );
        self.terrain.prepare(
            &self.gfx.device,
            &self.gfx.queue,
            &scene.terrain_uniforms().to_std140(),
            &self.textures,
        );
        self.stars.prepare(
            &self.gfx.device,
            &self.gfx.queue,
            &StarUniforms::new(&scene.camera, scene.viewport),
            &self.textures,
        );

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Globe Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.scaffold.draw(&mut pass);
            self.terrain.draw(&mut pass);
            self.stars.draw(&mut pass);
        }

        if let Some(hud) = hud {
            self.draw_hud(&mut encoder, &swap_view, hud);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn draw_hud(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        swap_view: &wgpu::TextureView,
        hud: &HudFrame,
    ) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gfx.config.width, self.gfx.config.height],
            pixels_per_point: hud.pixels_per_point,
        };

        for (id, delta) in &hud.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            encoder,
            &hud.shapes,
            &screen_descriptor,
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("HUD Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut pass, &hud.shapes, &screen_descriptor);
        }

        for id in &hud.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
