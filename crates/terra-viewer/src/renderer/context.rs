use anyhow::{anyhow, Result};
use std::sync::Arc;
use winit::window::Window;

/// Device, queue and the window surface.
pub struct GfxContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
}

impl GfxContext {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        // 'static surface: the Arc pins the window.
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no GPU adapter can present to this window"))?;

        let info = adapter.get_info();
        // Earth maps come in 8k and 10k widths; take whatever texture size the
        // adapter allows rather than the portable 8192.
        let limits = wgpu::Limits::default().using_resolution(adapter.limits());
        log::info!(
            "Adapter: {} ({:?}, {:?}), max texture {}",
            info.name,
            info.device_type,
            info.backend,
            limits.max_texture_dimension_2d
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Terra Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits,
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface_format(&caps.formats)
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    /// Reconfigures the swapchain. Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}

/// First sRGB format on offer, so shader output can stay linear; otherwise
/// whatever the surface lists first.
pub fn surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn swapchain_prefers_srgb() {
        assert_eq!(
            surface_format(&[F::Bgra8Unorm, F::Rgba16Float, F::Bgra8UnormSrgb]),
            Some(F::Bgra8UnormSrgb)
        );
        assert_eq!(surface_format(&[F::Rgba8Unorm]), Some(F::Rgba8Unorm));
        assert_eq!(surface_format(&[]), None);
    }
}
