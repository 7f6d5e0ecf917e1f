//! Entry point for the Terra globe viewer.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use terra_viewer::{app::App, config::Config};
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::debug!("{config:?}");

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Terra")
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );

    let mut app = pollster::block_on(App::new(window.clone(), &config))?;

    // Every later frame is requested by the one before it.
    window.request_redraw();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);

        let Event::WindowEvent { window_id, event } = event else {
            return;
        };
        if window_id != window.id() || app.handle_event(&window, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    elwt.exit();
                }
            }
            WindowEvent::RedrawRequested => match app.frame(&window) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let size = app.renderer.gfx.size;
                    app.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory, exiting.");
                    elwt.exit();
                }
                Err(e) => log::warn!("Frame dropped: {e:?}"),
            },
            _ => {}
        }
    })?;

    Ok(())
}
