use std::borrow::Cow;
use tracing::warn;

use crate::mesh::{RevolvedMesh, ShapeKind};
use crate::renderer::camera::{Camera, CameraUniform};

/// Highest segment count the resolution sliders offer; the buffers below
/// are sized so a mesh at this resolution always fits.
pub const MAX_SEGMENTS: u32 = 256;

const MAX_SHAPE_VERTICES: usize = (MAX_SEGMENTS as usize + 1) * (MAX_SEGMENTS as usize + 1);
const MAX_SHAPE_INDICES: usize = 6 * MAX_SEGMENTS as usize * MAX_SEGMENTS as usize;
const MAX_SWARM_INSTANCES: usize = MAX_SHAPE_VERTICES;
const MAX_GRID_VERTICES: usize = 2_000;

/// Per-draw uniform slots, addressed with dynamic offsets.
pub const MAX_DRAW_SLOTS: u32 = 16;
const DRAW_UNIFORM_STRIDE: u64 = 256;

pub const SHADE_SOLID: u32 = 0;
pub const SHADE_NORMALS: u32 = 1;
pub const SHADE_PHONG: u32 = 2;
pub const SHADE_PHONG_POINT: u32 = 3;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    /// rgb + shininess in w
    pub color: [f32; 4],
    /// point light world position, w unused
    pub light: [f32; 4],
    /// shade mode in x
    pub mode: [u32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SwarmInstance {
    pub offset: [f32; 3],
    pub color: [f32; 3],
}

/// One draw in the scene's draw list; `slot` selects the uniform written
/// for it this frame.
#[derive(Clone, Copy)]
pub enum DrawCall {
    Mesh {
        shape: ShapeKind,
        slot: u32,
        wireframe: bool,
    },
    Swarm {
        shape: ShapeKind,
        slot: u32,
    },
}

/// GPU-resident copy of one generated mesh. Uploaded whole on every
/// (re)generation, never mutated in between.
pub struct ShapeBuffers {
    pub position_buffer: wgpu::Buffer,
    pub normal_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl ShapeBuffers {
    fn new(device: &wgpu::Device, label: &str) -> Self {
        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Position Buffer")),
            size: (MAX_SHAPE_VERTICES * 3 * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let normal_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Normal Buffer")),
            size: (MAX_SHAPE_VERTICES * 3 * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            size: (MAX_SHAPE_INDICES * 4) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            position_buffer,
            normal_buffer,
            index_buffer,
            index_count: 0,
        }
    }

    pub fn upload(&mut self, queue: &wgpu::Queue, mesh: &RevolvedMesh) {
        let (vertex_count, indices) = clamp_to_capacity(mesh);

        queue.write_buffer(
            &self.position_buffer,
            0,
            bytemuck::cast_slice(&mesh.positions[..vertex_count]),
        );
        queue.write_buffer(
            &self.normal_buffer,
            0,
            bytemuck::cast_slice(&mesh.normals[..vertex_count]),
        );
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));

        self.index_count = indices.len() as u32;
    }
}

/// Clamps a mesh to the buffer capacities. Oversized meshes keep only the
/// whole triangles whose vertices all made it into the upload range, so no
/// uploaded index ever points past the uploaded vertices.
fn clamp_to_capacity(mesh: &RevolvedMesh) -> (usize, Cow<'_, [u32]>) {
    let vertex_count = mesh.positions.len().min(MAX_SHAPE_VERTICES);
    if vertex_count == mesh.positions.len() && mesh.indices.len() <= MAX_SHAPE_INDICES {
        return (vertex_count, Cow::Borrowed(&mesh.indices));
    }

    let mut indices = Vec::with_capacity(MAX_SHAPE_INDICES);
    for tri in mesh.indices.chunks_exact(3) {
        if indices.len() + 3 > MAX_SHAPE_INDICES {
            break;
        }
        if tri.iter().all(|&i| (i as usize) < vertex_count) {
            indices.extend_from_slice(tri);
        }
    }

    warn!(
        vertices = mesh.positions.len(),
        kept_vertices = vertex_count,
        indices = mesh.indices.len(),
        kept_indices = indices.len(),
        "mesh exceeds GPU buffer capacity, dropping overflow triangles"
    );

    (vertex_count, Cow::Owned(indices))
}

pub struct SceneBuffers {
    shapes: [ShapeBuffers; 4],

    pub swarm_instance_buffer: wgpu::Buffer,
    pub swarm_instance_count: u32,

    pub grid_vertex_buffer: wgpu::Buffer,
    pub grid_vertex_count: u32,
}

impl SceneBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let shapes = ShapeKind::ALL.map(|kind| ShapeBuffers::new(device, kind.label()));

        let swarm_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Swarm Instance Buffer"),
            size: (MAX_SWARM_INSTANCES * std::mem::size_of::<SwarmInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let grid_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Grid Vertex Buffer"),
            size: (MAX_GRID_VERTICES * 3 * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            shapes,
            swarm_instance_buffer,
            swarm_instance_count: 0,
            grid_vertex_buffer,
            grid_vertex_count: 0,
        }
    }

    pub fn shape(&self, kind: ShapeKind) -> &ShapeBuffers {
        &self.shapes[kind.index()]
    }

    pub fn upload_shape(&mut self, queue: &wgpu::Queue, kind: ShapeKind, mesh: &RevolvedMesh) {
        self.shapes[kind.index()].upload(queue, mesh);
    }

    pub fn upload_swarm(&mut self, queue: &wgpu::Queue, instances: &[SwarmInstance]) {
        let count = instances.len().min(MAX_SWARM_INSTANCES);
        if count < instances.len() {
            warn!(
                instances = instances.len(),
                kept = count,
                "swarm exceeds instance buffer capacity"
            );
        }
        queue.write_buffer(
            &self.swarm_instance_buffer,
            0,
            bytemuck::cast_slice(&instances[..count]),
        );
        self.swarm_instance_count = count as u32;
    }

    pub fn upload_grid(&mut self, queue: &wgpu::Queue, vertices: &[f32]) {
        let vertex_count = vertices.len().min(MAX_GRID_VERTICES * 3);
        queue.write_buffer(
            &self.grid_vertex_buffer,
            0,
            bytemuck::cast_slice(&vertices[..vertex_count]),
        );
        self.grid_vertex_count = (vertex_count / 3) as u32;
    }
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pub pipeline_mesh: wgpu::RenderPipeline,
    pub pipeline_wireframe: wgpu::RenderPipeline,
    pub pipeline_swarm: wgpu::RenderPipeline,
    pub pipeline_grid: wgpu::RenderPipeline,

    pub camera_buffer: wgpu::Buffer,
    pub draw_uniform_buffer: wgpu::Buffer,
    pub scene_bind_group: wgpu::BindGroup,

    pub buffers: SceneBuffers,

    pub depth_texture: wgpu::TextureView,
}

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

fn swarm_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SwarmInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    }
}

fn depth_stencil_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

impl GpuState {
    pub async fn new(window: std::sync::Arc<winit::window::Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let draw_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: MAX_DRAW_SLOTS as u64 * DRAW_UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
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
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &draw_uniform_buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(DRAW_UNIFORM_STRIDE),
                    }),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let color_target = [Some(wgpu::ColorTargetState {
            format: config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let pipeline_mesh = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[position_layout(), normal_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &color_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Wireframe reuses the triangle index buffer as a line strip.
        let pipeline_wireframe = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Wireframe Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[position_layout(), normal_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &color_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let pipeline_swarm = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Swarm Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_swarm"),
                buffers: &[position_layout(), normal_layout(), swarm_instance_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &color_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let pipeline_grid = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Grid Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_grid"),
                buffers: &[position_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_grid"),
                targets: &color_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let buffers = SceneBuffers::new(&device);
        let depth_texture = Self::create_depth_texture(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline_mesh,
            pipeline_wireframe,
            pipeline_swarm,
            pipeline_grid,
            camera_buffer,
            draw_uniform_buffer,
            scene_bind_group,
            buffers,
            depth_texture,
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Self::create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn update_camera(&self, camera: &Camera) {
        let uniform = CameraUniform::from_camera(camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = if enabled {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self.surface.configure(&self.device, &self.config);
    }

    pub fn write_draw_uniform(&self, slot: u32, uniform: &DrawUniform) {
        if slot >= MAX_DRAW_SLOTS {
            warn!(slot, "draw uniform slot out of range, skipping write");
            return;
        }
        self.queue.write_buffer(
            &self.draw_uniform_buffer,
            slot as u64 * DRAW_UNIFORM_STRIDE,
            bytemuck::cast_slice(&[*uniform]),
        );
    }

    pub fn render_scene(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        draws: &[DrawCall],
        show_grid: bool,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if show_grid && self.buffers.grid_vertex_count > 0 {
            render_pass.set_pipeline(&self.pipeline_grid);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[0]);
            render_pass.set_vertex_buffer(0, self.buffers.grid_vertex_buffer.slice(..));
            render_pass.draw(0..self.buffers.grid_vertex_count, 0..1);
        }

        for draw in draws {
            match *draw {
                DrawCall::Mesh {
                    shape,
                    slot,
                    wireframe,
                } => {
                    let buffers = self.buffers.shape(shape);
                    if buffers.index_count == 0 {
                        continue;
                    }

                    render_pass.set_pipeline(if wireframe {
                        &self.pipeline_wireframe
                    } else {
                        &self.pipeline_mesh
                    });
                    render_pass.set_bind_group(
                        0,
                        &self.scene_bind_group,
                        &[slot * DRAW_UNIFORM_STRIDE as u32],
                    );
                    render_pass.set_vertex_buffer(0, buffers.position_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, buffers.normal_buffer.slice(..));
                    render_pass
                        .set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..buffers.index_count, 0, 0..1);
                }
                DrawCall::Swarm { shape, slot } => {
                    let buffers = self.buffers.shape(shape);
                    if buffers.index_count == 0 || self.buffers.swarm_instance_count == 0 {
                        continue;
                    }

                    render_pass.set_pipeline(&self.pipeline_swarm);
                    render_pass.set_bind_group(
                        0,
                        &self.scene_bind_group,
                        &[slot * DRAW_UNIFORM_STRIDE as u32],
                    );
                    render_pass.set_vertex_buffer(0, buffers.position_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, buffers.normal_buffer.slice(..));
                    render_pass.set_vertex_buffer(2, self.buffers.swarm_instance_buffer.slice(..));
                    render_pass
                        .set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(
                        0..buffers.index_count,
                        0,
                        0..self.buffers.swarm_instance_count,
                    );
                }
            }
        }
    }
}

pub fn generate_grid_vertices(size: f32, divisions: u32) -> Vec<f32> {
    let mut vertices = Vec::new();
    let step = size * 2.0 / divisions as f32;
    let half = size;

    for i in 0..=divisions {
        let pos = -half + i as f32 * step;
        vertices.extend_from_slice(&[pos, 0.0, -half, pos, 0.0, half]);
        vertices.extend_from_slice(&[-half, 0.0, pos, half, 0.0, pos]);
    }

    vertices.extend_from_slice(&[0.0, -half, 0.0, 0.0, half, 0.0]);

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{curves, revolve};

    #[test]
    fn buffers_fit_meshes_at_the_slider_maximum() {
        let mesh = revolve(curves::spikes, MAX_SEGMENTS, MAX_SEGMENTS).unwrap();
        assert!(mesh.vertex_count() <= MAX_SHAPE_VERTICES);
        assert!(mesh.indices.len() <= MAX_SHAPE_INDICES);
        assert!(mesh.vertex_count() <= MAX_SWARM_INSTANCES);

        let (vertex_count, indices) = clamp_to_capacity(&mesh);
        assert_eq!(vertex_count, mesh.vertex_count());
        assert_eq!(indices.len(), mesh.indices.len());
    }

    #[test]
    fn index_capacity_holds_whole_triangles() {
        assert_eq!(MAX_SHAPE_INDICES % 3, 0);
    }

    #[test]
    fn oversized_mesh_keeps_only_valid_whole_triangles() {
        let mesh = revolve(curves::spikes, 300, 300).unwrap();
        assert!(mesh.vertex_count() > MAX_SHAPE_VERTICES);

        let (vertex_count, indices) = clamp_to_capacity(&mesh);
        assert_eq!(vertex_count, MAX_SHAPE_VERTICES);
        assert!(indices.len() <= MAX_SHAPE_INDICES);
        assert_eq!(indices.len() % 3, 0);
        for &index in indices.iter() {
            assert!((index as usize) < vertex_count);
        }
    }
}
