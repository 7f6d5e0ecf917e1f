//! Window events to pointer, orbit and zoom changes on the scene.

use terra::GlobeScene;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pixels per wheel "line" for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 120.0;

/// Translates window pointer events into the pointer coordinate and orbit
/// input of a [`GlobeScene`].
#[derive(Debug, Default)]
pub struct InputController {
    dragging: bool,
    last_cursor: Option<(f32, f32)>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one window event. Returns whether it was a pointer event.
    pub fn handle_event(&mut self, event: &WindowEvent, scene: &mut GlobeScene) -> bool {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                if *button == MouseButton::Left {
                    self.set_dragging(*state == ElementState::Pressed);
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32, scene);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports "up" as positive.
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.wheel(lines, scene);
                true
            }
            _ => false,
        }
    }

    pub fn set_dragging(&mut self, pressed: bool) {
        self.dragging = pressed;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer moved to `(x, y)` window pixels.
    pub fn cursor_moved(&mut self, x: f32, y: f32, scene: &mut GlobeScene) {
        let size = scene.viewport;
        scene.interaction.set_pointer_px(x, y, size.x, size.y);

        if let Some((lx, ly)) = self.last_cursor {
            if self.dragging {
                scene.controls.rotate_by_pixels(x - lx, y - ly, size.y);
            }
        }
        self.last_cursor = Some((x, y));
    }

    /// Wheel moved by `lines`, positive away from the user.
    pub fn wheel(&mut self, lines: f32, scene: &mut GlobeScene) {
        scene.controls.zoom_by_wheel(-lines);
    }
}
