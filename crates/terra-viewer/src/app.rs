use crate::{
    assets::{AssetKind, AssetLoader},
    config::Config,
    input::InputController,
    renderer::Renderer,
    ui::{Hud, HudStats},
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use terra::{
    geometry::point_cloud, FrameDriver, FrameScheduler, FrameSink, GlobeScene, SphereMesh,
    StarFieldGenerator,
};
use winit::{event::WindowEvent, window::Window};

pub struct App {
    pub renderer: Renderer,
    pub scene: GlobeScene,
    pub driver: FrameDriver,
    pub input: InputController,
    pub hud: Hud,
    assets: AssetLoader,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let started = Instant::now();

        let scaffold = SphereMesh::icosphere(config.scaffold_detail);
        let points = point_cloud(config.point_detail);

        let mut rng = match config.star_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let stars = StarFieldGenerator::new(config.star_params()).generate(&mut rng);

        log::info!(
            "Globe: {} scaffold triangles (detail {}), {} terrain points (detail {}), {} stars, built in {:.0?}",
            scaffold.triangle_count(),
            config.scaffold_detail,
            points.len(),
            config.point_detail,
            stars.len(),
            started.elapsed()
        );

        let renderer = Renderer::new(window.clone(), &scaffold, &points, &stars).await?;
        let size = renderer.gfx.size;

        let scene = GlobeScene::new(scaffold, size.width, size.height);
        let hud = Hud::new(&window, config.hud);
        let assets = AssetLoader::spawn(&config.assets_dir);

        Ok(Self {
            renderer,
            scene,
            driver: FrameDriver::new(config.rotation_step),
            input: InputController::new(),
            hud,
            assets,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.scene.resize(new_size.width, new_size.height);
        }
    }

    /// Returns true when the overlay consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        if self.hud.on_window_event(window, event) {
            return true;
        }

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        self.input.handle_event(event, &mut self.scene);
        false
    }

    /// One display refresh.
    pub fn frame(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        self.upload_finished_textures();

        let mut presenter = Presenter {
            renderer: &mut self.renderer,
            hud: &mut self.hud,
            window,
            frames: self.driver.frames(),
        };
        let mut scheduler = RedrawScheduler { window };

        self.driver
            .tick(&mut self.scene, &mut presenter, &mut scheduler)
    }

    fn upload_finished_textures(&mut self) {
        for asset in self.assets.poll() {
            let uploaded = asset.result.and_then(|image| {
                self.renderer.textures.replace(
                    &self.renderer.gfx.device,
                    &self.renderer.gfx.queue,
                    asset.kind,
                    &asset.path,
                    &image,
                )
            });
            if let Err(e) = uploaded {
                log::warn!("{e}; keeping the placeholder");
            }
        }
    }
}

/// Renders the scene and the overlay to the window surface.
struct Presenter<'a> {
    renderer: &'a mut Renderer,
    hud: &'a mut Hud,
    window: &'a Window,
    frames: u64,
}

impl FrameSink for Presenter<'_> {
    type Error = wgpu::SurfaceError;

    fn submit(&mut self, scene: &GlobeScene) -> Result<(), Self::Error> {
        let stats = HudStats {
            frames: self.frames,
            rotation: scene.rotation,
            pointer: scene.interaction.pointer(),
            surface_uv: scene.interaction.surface_uv(),
            textures_ready: self.renderer.textures.loaded_count(),
            textures_total: AssetKind::ALL.len(),
            points: self.renderer.terrain.instance_count(),
            stars: self.renderer.stars.instance_count(),
        };
        let hud = self.hud.run(self.window, &stats);
        self.renderer.render(scene, hud.as_ref())
    }
}

/// Ties the next frame to the window's next redraw.
pub struct RedrawScheduler<'a> {
    window: &'a Window,
}

impl FrameScheduler for RedrawScheduler<'_> {
    fn request_next_frame(&mut self) {
        self.window.request_redraw();
    }
}
