//! GPU copies of the globe images, one slot per [`AssetKind`].

use crate::assets::{check_texture_size, AssetError, AssetKind};
use image::RgbaImage;
use std::path::Path;

/// Opaque black; what every slot shows until its image arrives.
const PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 0, 255];

pub fn texture_format(kind: AssetKind) -> wgpu::TextureFormat {
    if kind.is_color() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

pub struct TextureSlot {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
    pub loaded: bool,
}

pub struct GlobeTextures {
    slots: Vec<TextureSlot>,
    pub sampler: wgpu::Sampler,
    generation: u64,
}

impl GlobeTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let slots = AssetKind::ALL
            .iter()
            .map(|&kind| upload(device, queue, kind, 1, 1, &PLACEHOLDER_TEXEL, false))
            .collect();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Globe Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            slots,
            sampler,
            generation: 0,
        }
    }

    #[inline]
    pub fn view(&self, kind: AssetKind) -> &wgpu::TextureView {
        &self.slots[kind.index()].view
    }

    #[inline]
    pub fn slot(&self, kind: AssetKind) -> &TextureSlot {
        &self.slots[kind.index()]
    }

    /// Bumped on every [`GlobeTextures::replace`]; bind groups built against
    /// an older value are stale.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.loaded).count()
    }

    /// Swaps the placeholder (or a previous image) for `image`. Images past
    /// the device's texture limit leave the slot untouched.
    pub fn replace(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        kind: AssetKind,
        path: &Path,
        image: &RgbaImage,
    ) -> Result<(), AssetError> {
        check_texture_size(path, image, device.limits().max_texture_dimension_2d)?;
        let (w, h) = image.dimensions();
        self.slots[kind.index()] = upload(device, queue, kind, w, h, image.as_raw(), true);
        self.generation += 1;
        log::info!("Texture {} ready ({}x{})", kind.file_name(), w, h);
        Ok(())
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    kind: AssetKind,
    width: u32,
    height: u32,
    rgba: &[u8],
    loaded: bool,
) -> TextureSlot {
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(kind.file_name()),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: texture_format(kind),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        extent,
    );

    TextureSlot {
        view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        _texture: texture,
        size: (width, height),
        loaded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_maps_decode_as_srgb() {
        assert_eq!(
            texture_format(AssetKind::SurfaceColor),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            texture_format(AssetKind::StarSprite),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        // Height and mask values must reach the shader untouched.
        assert_eq!(texture_format(AssetKind::Elevation), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(texture_format(AssetKind::OceanMask), wgpu::TextureFormat::Rgba8Unorm);
    }
}
