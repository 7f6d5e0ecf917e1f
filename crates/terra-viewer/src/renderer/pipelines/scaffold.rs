// Translucent wireframe of the picking mesh.

use glam::Mat4;
use terra::starfield::srgb_to_linear;
use terra::SphereMesh;
use wgpu::util::DeviceExt;

/// `0x00aaff`.
pub const SCAFFOLD_RGB: u32 = 0x00aaff;
pub const SCAFFOLD_OPACITY: f32 = 0.12;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScaffoldUniforms {
    pub model_view_proj: [[f32; 4]; 4], // 64 B
    /// Linear RGB + opacity.
    pub color: [f32; 4],                // +16 -> 80
}

const _: [(); 80] = [(); core::mem::size_of::<ScaffoldUniforms>()];

/// Hex sRGB color to linear RGBA.
pub fn hex_to_linear(rgb: u32, alpha: f32) -> [f32; 4] {
    let channel = |shift: u32| srgb_to_linear(((rgb >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0), alpha]
}

impl ScaffoldUniforms {
    pub fn new(view_proj: Mat4, model: Mat4) -> Self {
        Self {
            model_view_proj: (view_proj * model).to_cols_array_2d(),
            color: hex_to_linear(SCAFFOLD_RGB, SCAFFOLD_OPACITY),
        }
    }
}

pub struct ScaffoldPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    lines: wgpu::Buffer,
    vertex_count: u32,
}

impl ScaffoldPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
        mesh: &SphereMesh,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scaffold Uniform Buffer"),
            size: std::mem::size_of::<ScaffoldUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scaffold BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scaffold Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let segments = mesh.wireframe_segments();
        let lines = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scaffold Lines"),
            contents: bytemuck::cast_slice(&segments),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scaffold WGSL"),
            source: wgpu::ShaderSource::Wgsl(SCAFFOLD_WGSL.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scaffold Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scaffold Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                    }],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(depth_fmt)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            lines,
            vertex_count: segments.len() as u32,
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, uniforms: &ScaffoldUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.lines.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }
}

/// The wireframe occludes like an opaque mesh. Its flat faces sit inside the
/// unit sphere, so terrain points on the sphere still pass in front of it.
fn depth_state(format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::LessEqual,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub const SCAFFOLD_WGSL: &str = r#"
struct ScaffoldUniforms {
    model_view_proj: mat4x4<f32>,
    color: vec4<f32>,
};
@group(0) @binding(0) var<uniform> U: ScaffoldUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return U.model_view_proj * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return U.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wireframe_writes_depth() {
        let state = depth_state(wgpu::TextureFormat::Depth32Float);
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::LessEqual);
    }

    #[test]
    fn wireframe_lies_inside_the_point_shell() {
        // Chord midpoints of the scaffold are nearer the centre than any
        // terrain point, so depth writes never hide the terrain.
        let mesh = terra::SphereMesh::icosphere(16);
        let segments = mesh.wireframe_segments();
        for pair in segments.chunks_exact(2) {
            let mid = (glam::Vec3::from(pair[0]) + glam::Vec3::from(pair[1])) * 0.5;
            assert!(mid.length() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn scaffold_color_is_linearized() {
        let [r, g, b, a] = hex_to_linear(SCAFFOLD_RGB, SCAFFOLD_OPACITY);
        assert_eq!(r, 0.0);
        // 0xaa = 170 -> ~0.402 linear.
        assert!((g - 0.402).abs() < 1e-3);
        assert!((b - 1.0).abs() < 1e-5);
        assert_eq!(a, 0.12);
    }
}
