use anyhow::Context;
use glam::Vec3;

use crate::math::mesh::{Material, rgb_to_f32};
use crate::renderer::buffers::{
    LineBuffer, MeshBuffers, StageBufferPool, VertexBuffers, normal_layout, position_layout,
};
use crate::renderer::camera::{Camera, CameraUniform};
use crate::scene::{Lights, SceneObject, TerrainPlot};

const CLEAR_COLOR: wgpu::Color = wgpu::Color::WHITE;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 4],
    pub color: [f32; 4],
    pub ambient: [f32; 4],
}

impl LightUniform {
    pub fn from_lights(lights: &Lights) -> Self {
        let dir = lights.directional_position.normalize_or(Vec3::Y);
        Self {
            direction: [dir.x, dir.y, dir.z, 0.0],
            color: linear_rgba(lights.directional_color, 1.0),
            ambient: linear_rgba(lights.ambient_color, 1.0),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub color: [f32; 4],
    pub offset: [f32; 3],
    pub shininess: f32,
}

impl ObjectUniform {
    pub fn new(material: Material, offset: Vec3) -> Self {
        Self {
            color: linear_rgba(material.color, material.opacity),
            offset: offset.to_array(),
            shininess: material.shininess,
        }
    }
}

/// Hex sRGB colour to linear RGBA for an sRGB render target.
fn linear_rgba(color: u32, alpha: f32) -> [f32; 4] {
    let [r, g, b] = rgb_to_f32(color).map(|c| c.powf(2.2));
    [r, g, b, alpha]
}

struct ObjectBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ObjectBinding {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, uniform: ObjectUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pipeline_opaque: wgpu::RenderPipeline,
    pipeline_transparent: wgpu::RenderPipeline,
    pipeline_lines: wgpu::RenderPipeline,

    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,

    land_object: ObjectBinding,
    water_object: ObjectBinding,
    marker_object: ObjectBinding,
    axes_object: ObjectBinding,

    terrain: Option<StageBufferPool>,
    axes: Option<LineBuffer>,
    marker: Option<MeshBuffers>,

    depth_texture: wgpu::TextureView,
}

impl GpuState {
    pub async fn new(window: std::sync::Arc<winit::window::Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

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
            .context("failed to open GPU device")?;

        log::info!("using adapter {}", adapter.get_info().name);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Buffer"),
            size: std::mem::size_of::<LightUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(
            &light_buffer,
            0,
            bytemuck::cast_slice(&[LightUniform::from_lights(&Lights::default())]),
        );

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[uniform_entry(0), uniform_entry(1)],
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
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let object_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Object Bind Group Layout"),
                entries: &[uniform_entry(0)],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout, &object_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_buffers = [position_layout(), normal_layout()];
        let line_buffers = [position_layout()];

        let pipeline_opaque = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            PipelineKind {
                label: "Opaque Mesh Pipeline",
                vs: "vs_mesh",
                fs: "fs_mesh",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: true,
            },
        );

        let pipeline_transparent = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            PipelineKind {
                label: "Transparent Mesh Pipeline",
                vs: "vs_mesh",
                fs: "fs_mesh",
                buffers: &mesh_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: false,
            },
        );

        let pipeline_lines = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            PipelineKind {
                label: "Axes Pipeline",
                vs: "vs_line",
                fs: "fs_line",
                buffers: &line_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
                depth_write: true,
            },
        );

        let land_object = ObjectBinding::new(&device, &object_bind_group_layout, "Land Object");
        let water_object = ObjectBinding::new(&device, &object_bind_group_layout, "Water Object");
        let marker_object = ObjectBinding::new(&device, &object_bind_group_layout, "Marker Object");
        let axes_object = ObjectBinding::new(&device, &object_bind_group_layout, "Axes Object");

        land_object.write(&queue, ObjectUniform::new(Material::LAND, Vec3::ZERO));
        water_object.write(&queue, ObjectUniform::new(Material::WATER, Vec3::ZERO));
        axes_object.write(&queue, ObjectUniform::new(Material::AXES, Vec3::ZERO));

        let depth_texture = Self::create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline_opaque,
            pipeline_transparent,
            pipeline_lines,
            camera_buffer,
            light_buffer,
            scene_bind_group,
            land_object,
            water_object,
            marker_object,
            axes_object,
            terrain: None,
            axes: None,
            marker: None,
            depth_texture,
        })
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
            format: DEPTH_FORMAT,
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

    pub fn update_lights(&self, lights: &Lights) {
        let uniform = LightUniform::from_lights(lights);
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Brings GPU buffers in line with the plot: re-uploads terrain when a
    /// new dataset was installed and moves the selection marker.
    pub fn sync(&mut self, plot: &TerrainPlot) {
        let uploaded = self.terrain.as_ref().map(|t| t.generation());

        match (plot.land_mesh(), plot.stages()) {
            (Some(land), Some(stages)) if uploaded != Some(plot.generation()) => {
                self.terrain = Some(StageBufferPool::upload(
                    &self.device,
                    &self.queue,
                    land,
                    stages.meshes(),
                    plot.generation(),
                ));
                self.axes = Some(LineBuffer::upload(&self.device, &self.queue, plot.axes_lines()));
            }
            (None, _) | (_, None) => {
                self.terrain = None;
                self.axes = None;
            }
            _ => {}
        }

        if let Some(marker) = plot.selection_marker() {
            if self.marker.is_none() {
                self.marker = Some(MeshBuffers::upload(
                    &self.device,
                    &self.queue,
                    &marker.mesh,
                    "Selection Marker",
                ));
            }
            let material = Material {
                color: marker.color,
                opacity: 1.0,
                shininess: 30.0,
            };
            self.marker_object
                .write(&self.queue, ObjectUniform::new(material, marker.position));
        }
    }

    /// Draws every attached scene object in one pass over a white background.
    pub fn render_scene(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        plot: &TerrainPlot,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Terrain Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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

        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        let scene = plot.scene();

        if scene.contains(SceneObject::Axes) {
            if let Some(axes) = &self.axes {
                render_pass.set_pipeline(&self.pipeline_lines);
                render_pass.set_bind_group(1, &self.axes_object.bind_group, &[]);
                render_pass.set_vertex_buffer(0, axes.buffer.slice(..));
                render_pass.draw(0..axes.vertex_count, 0..1);
            }
        }

        let Some(terrain) = &self.terrain else {
            return;
        };

        if scene.contains(SceneObject::Land) {
            render_pass.set_pipeline(&self.pipeline_opaque);
            render_pass.set_bind_group(1, &self.land_object.bind_group, &[]);
            draw_shared(&mut render_pass, terrain, &terrain.land);
        }

        if scene.contains(SceneObject::SelectionMarker) {
            if let Some(marker) = &self.marker {
                render_pass.set_pipeline(&self.pipeline_opaque);
                render_pass.set_bind_group(1, &self.marker_object.bind_group, &[]);
                render_pass.set_vertex_buffer(0, marker.vertices.positions.slice(..));
                render_pass.set_vertex_buffer(1, marker.vertices.normals.slice(..));
                render_pass.set_index_buffer(marker.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..marker.index_count, 0, 0..1);
            }
        }

        // transparent water last
        render_pass.set_pipeline(&self.pipeline_transparent);
        render_pass.set_bind_group(1, &self.water_object.bind_group, &[]);
        for stage in scene.attached_water() {
            if let Some(buffers) = terrain.stage(stage) {
                draw_shared(&mut render_pass, terrain, buffers);
            }
        }
    }
}

fn draw_shared(render_pass: &mut wgpu::RenderPass<'_>, pool: &StageBufferPool, buffers: &VertexBuffers) {
    render_pass.set_vertex_buffer(0, buffers.positions.slice(..));
    render_pass.set_vertex_buffer(1, buffers.normals.slice(..));
    render_pass.set_index_buffer(pool.indices.slice(..), wgpu::IndexFormat::Uint32);
    render_pass.draw_indexed(0..pool.index_count, 0, 0..1);
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

struct PipelineKind<'a> {
    label: &'a str,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    kind: PipelineKind<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(kind.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(kind.vs),
            buffers: kind.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(kind.fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: kind.topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: kind.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 32);
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
    }

    #[test]
    fn light_points_towards_source() {
        let u = LightUniform::from_lights(&Lights::default());
        assert!(u.direction[1] > 0.0 && u.direction[2] < 0.0);
        assert_eq!(u.color, [1.0, 1.0, 1.0, 1.0]);
    }
}
