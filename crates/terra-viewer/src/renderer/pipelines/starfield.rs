// Background stars: additive, size-attenuated round sprites.

use super::terrain::{quad_buffer, QUAD_LAYOUT};
use crate::assets::AssetKind;
use crate::renderer::textures::GlobeTextures;
use glam::Vec2;
use terra::starfield::{StarSample, STAR_OPACITY, STAR_SIZE};
use terra::PerspectiveCamera;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarUniforms {
    pub view: [[f32; 4]; 4],       // 64 B
    pub projection: [[f32; 4]; 4], // +64 -> 128
    /// `size (world units), opacity, viewport_w, viewport_h`.
    pub params: [f32; 4],          // +16 -> 144
}

// Buffer size must match the WGSL struct.
const _: [(); 144] = [(); core::mem::size_of::<StarUniforms>()];

impl StarUniforms {
    pub fn new(camera: &PerspectiveCamera, viewport: Vec2) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            projection: camera.projection().to_cols_array_2d(),
            params: [STAR_SIZE, STAR_OPACITY, viewport.x, viewport.y],
        }
    }
}

/// `src * src_alpha + dst`.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub struct StarFieldPipeline {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    bound_generation: u64,
    quad_vb: wgpu::Buffer,
    instances: wgpu::Buffer,
    instance_count: u32,
}

impl StarFieldPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
        stars: &[StarSample],
        textures: &GlobeTextures,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Star Uniform Buffer"),
            size: std::mem::size_of::<StarUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Star BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Star WGSL"),
            source: wgpu::ShaderSource::Wgsl(STAR_WGSL.into()),
        });

        // Zero-sized buffers cannot be bound; an empty field just skips drawing.
        let padding = [0u8; std::mem::size_of::<StarSample>()];
        let contents: &[u8] = if stars.is_empty() {
            &padding
        } else {
            bytemuck::cast_slice(stars)
        };
        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Instances"),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Star Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Star Field Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[
                    QUAD_LAYOUT,
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<StarSample>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                shader_location: 1,
                                offset: 0,
                                format: wgpu::VertexFormat::Float32x3,
                            },
                            wgpu::VertexAttribute {
                                shader_location: 2,
                                offset: 12,
                                format: wgpu::VertexFormat::Float32x3,
                            },
                        ],
                    },
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(ADDITIVE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let bind_group = Self::bind(device, &layout, &uniform_buffer, textures);

        Self {
            pipeline,
            layout,
            uniform_buffer,
            bind_group,
            bound_generation: textures.generation(),
            quad_vb: quad_buffer(device, "Star Quad VB"),
            instances,
            instance_count: stars.len() as u32,
        }
    }

    fn bind(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        textures: &GlobeTextures,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Star Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        textures.view(AssetKind::StarSprite),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&textures.sampler),
                },
            ],
        })
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &StarUniforms,
        textures: &GlobeTextures,
    ) {
        if textures.generation() != self.bound_generation {
            self.bind_group = Self::bind(device, &self.layout, &self.uniform_buffer, textures);
            self.bound_generation = textures.generation();
        }
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        if self.instance_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.set_vertex_buffer(1, self.instances.slice(..));
        rpass.draw(0..6, 0..self.instance_count);
    }
}

pub const STAR_WGSL: &str = r#"
struct StarUniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    // size, opacity, viewport_w, viewport_h
    params: vec4<f32>,
};
@group(0) @binding(0) var<uniform> U: StarUniforms;
@group(0) @binding(1) var sprite: texture_2d<f32>;
@group(0) @binding(2) var sprite_sampler: sampler;

struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) sprite_uv: vec2<f32>,
    @location(1) @interpolate(flat) color: vec3<f32>,
}

@vertex
fn vs_main(
    @location(0) corner: vec2<f32>,
    @location(1) position: vec3<f32>,
    @location(2) color: vec3<f32>,
) -> VSOut {
    let view_pos = U.view * vec4<f32>(position, 1.0);

    // Perspective attenuation: world-space size projected at this depth.
    let size_px = U.params.x * (U.params.w * 0.5) / max(-view_pos.z, 1e-6);

    var clip = U.projection * view_pos;
    clip = vec4<f32>(clip.xy + corner * (size_px / U.params.zw) * clip.w, clip.zw);

    var out: VSOut;
    out.clip = clip;
    out.sprite_uv = vec2<f32>(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    let texel = textureSample(sprite, sprite_sampler, in.sprite_uv);
    return vec4<f32>(in.color * texel.rgb, texel.a * U.params.y);
}
"#;
