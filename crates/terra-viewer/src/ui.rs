use glam::Vec2;
use winit::{event::WindowEvent, window::Window};

/// Numbers shown in the diagnostics overlay.
#[derive(Debug, Clone, Default)]
pub struct HudStats {
    pub frames: u64,
    pub rotation: f32,
    pub pointer: Option<Vec2>,
    pub surface_uv: Option<Vec2>,
    pub textures_ready: usize,
    pub textures_total: usize,
    pub points: u32,
    pub stars: u32,
}

/// Tessellated overlay, ready for the egui render pass.
pub struct HudFrame {
    pub shapes: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

pub struct Hud {
    ctx: egui::Context,
    state: egui_winit::State,
    enabled: bool,
}

impl Hud {
    pub fn new(window: &Window, enabled: bool) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(ctx.clone(), ctx.viewport_id(), window, None, None);
        Self {
            ctx,
            state,
            enabled,
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns whether egui consumed the event.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.enabled && self.state.on_window_event(window, event).consumed
    }

    /// Builds this frame's overlay, or `None` when the HUD is off.
    pub fn run(&mut self, window: &Window, stats: &HudStats) -> Option<HudFrame> {
        if !self.enabled {
            return None;
        }

        let input = self.state.take_egui_input(window);
        self.ctx.begin_frame(input);
        draw_hud(&self.ctx, stats);
        let output = self.ctx.end_frame();
        self.state
            .handle_platform_output(window, output.platform_output);

        let pixels_per_point = self.ctx.pixels_per_point();
        Some(HudFrame {
            shapes: self.ctx.tessellate(output.shapes, pixels_per_point),
            textures_delta: output.textures_delta,
            pixels_per_point,
        })
    }
}

pub fn format_coord(v: Option<Vec2>) -> String {
    match v {
        Some(v) => format!("({:.3}, {:.3})", v.x, v.y),
        None => "unset".to_owned(),
    }
}

pub fn draw_hud(ctx: &egui::Context, stats: &HudStats) {
    egui::Window::new("Terra")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.label(format!("frame {}", stats.frames));
            ui.label(format!(
                "rotation {:.1}°",
                stats.rotation.to_degrees().rem_euclid(360.0)
            ));
            ui.separator();
            ui.label(format!("pointer {}", format_coord(stats.pointer)));
            ui.label(format!("surface uv {}", format_coord(stats.surface_uv)));
            ui.separator();
            ui.label(format!("{} terrain points", stats.points));
            ui.label(format!("{} stars", stats.stars));
            ui.label(format!(
                "textures {}/{}",
                stats.textures_ready, stats.textures_total
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_format_or_read_unset() {
        assert_eq!(format_coord(None), "unset");
        assert_eq!(format_coord(Some(Vec2::new(0.75, 0.5))), "(0.750, 0.500)");
    }

    #[test]
    fn hud_lays_out_headless() {
        let ctx = egui::Context::default();
        let stats = HudStats {
            frames: 12,
            surface_uv: Some(Vec2::new(0.25, 0.5)),
            textures_total: 5,
            ..Default::default()
        };
        // New windows spend their first frame measuring themselves.
        let _ = ctx.run(egui::RawInput::default(), |ctx| draw_hud(ctx, &stats));
        let output = ctx.run(egui::RawInput::default(), |ctx| draw_hud(ctx, &stats));
        assert!(!output.shapes.is_empty());
    }
}
