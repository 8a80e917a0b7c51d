//! GPU presentation of the scene.
//!
//! The simulation draws into a [`SceneBatch`]; each redraw uploads its
//! triangles and circle instances and replays its draw runs with two render
//! pipelines. Colors are treated like a 2D canvas: blending happens on the
//! sRGB-encoded values when the surface offers a non-sRGB format.

mod batch;

pub use batch::{CircleInstance, DrawRun, SceneBatch, ShapeVertex};

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use winit::window::Window;

use crate::error::GpuError;

/// Shapes and circles in pixel space.
pub(crate) const SCENE_SHADER: &str = r#"
struct Globals {
    viewport: vec2<f32>,
    srgb_target: u32,
    _pad: u32,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

fn to_clip(pixel: vec2<f32>) -> vec4<f32> {
    let ndc = pixel / globals.viewport * 2.0 - 1.0;
    return vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
}

fn srgb_to_linear(c: vec3<f32>) -> vec3<f32> {
    let low = c / 12.92;
    let high = pow((c + 0.055) / 1.055, vec3<f32>(2.4));
    return select(high, low, c <= vec3<f32>(0.04045));
}

// Premultiplied, in the target's encoding.
fn encode(color: vec4<f32>) -> vec4<f32> {
    var rgb = color.rgb;
    if globals.srgb_target != 0u {
        rgb = srgb_to_linear(rgb);
    }
    return vec4<f32>(rgb * color.a, color.a);
}

struct ShapeOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_shape(
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
) -> ShapeOutput {
    var out: ShapeOutput;
    out.clip_position = to_clip(position);
    out.color = color;
    return out;
}

@fragment
fn fs_shape(in: ShapeOutput) -> @location(0) vec4<f32> {
    return encode(in.color);
}

struct CircleOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) offset: vec2<f32>,
    @location(1) @interpolate(flat) radius: f32,
    @location(2) @interpolate(flat) blur: f32,
    @location(3) @interpolate(flat) color: vec4<f32>,
    @location(4) @interpolate(flat) glow: vec4<f32>,
};

@vertex
fn vs_circle(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) center: vec2<f32>,
    @location(1) radius: f32,
    @location(2) blur: f32,
    @location(3) color: vec4<f32>,
    @location(4) glow: vec4<f32>,
) -> CircleOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );
    // Disk plus its antialiased edge, or the glow's reach.
    let extent = radius + max(1.0, blur * 1.5);
    let offset = corners[vertex_index] * extent;

    var out: CircleOutput;
    out.clip_position = to_clip(center + offset);
    out.offset = offset;
    out.radius = radius;
    out.blur = blur;
    out.color = color;
    out.glow = glow;
    return out;
}

@fragment
fn fs_circle(in: CircleOutput) -> @location(0) vec4<f32> {
    let d = length(in.offset);
    let disk = clamp(in.radius + 0.5 - d, 0.0, 1.0) * in.color.a;

    var halo = 0.0;
    if in.blur > 0.0 && d > in.radius {
        let sigma = in.blur * 0.5;
        let e = d - in.radius;
        halo = exp(-(e * e) / (2.0 * sigma * sigma)) * in.glow.a;
    }

    let core = encode(vec4<f32>(in.color.rgb, disk));
    let shadow = encode(vec4<f32>(in.glow.rgb, halo));
    let result = core + shadow * (1.0 - core.a);
    if result.a <= 0.0 {
        discard;
    }
    return result;
}
"#;

/// Uniforms shared by both pipelines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct Globals {
    viewport: [f32; 2],
    /// Nonzero when the target re-encodes to sRGB on write.
    srgb_target: u32,
    _pad: u32,
}

impl Globals {
    fn new(config: &wgpu::SurfaceConfiguration) -> Self {
        Self {
            viewport: [config.width as f32, config.height as f32],
            srgb_target: config.format.is_srgb() as u32,
            _pad: 0,
        }
    }
}

/// Prefer a non-sRGB format so blending matches a 2D canvas; an sRGB-only
/// surface still gets correct colors through `Globals::srgb_target`.
fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// Vertex buffer that grows to fit each upload.
struct GrowBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: wgpu::BufferAddress,
}

impl GrowBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: wgpu::BufferAddress) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &'static str,
        size: wgpu::BufferAddress,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let needed = bytes.len() as wgpu::BufferAddress;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("{} grown to {} bytes", self.label, self.capacity);
        }
        queue.write_buffer(&self.buffer, 0, bytes);
    }
}

fn scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
    entry: (&str, &str),
    buffer: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(entry.0),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(entry.1),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    shape_pipeline: wgpu::RenderPipeline,
    circle_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shape_buffer: GrowBuffer,
    circle_buffer: GrowBuffer,
}

impl GpuState {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format =
            choose_surface_format(&surface_caps.formats).ok_or(GpuError::NoSurfaceFormat)?;
        if surface_format.is_srgb() {
            log::warn!(
                "Surface only offers sRGB formats ({:?}); blending happens in linear space",
                surface_format
            );
        }

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

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<Globals>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let shape_pipeline = scene_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            "Shape Pipeline",
            ("vs_shape", "fs_shape"),
            ShapeVertex::layout(),
            config.format,
        );
        let circle_pipeline = scene_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            "Circle Pipeline",
            ("vs_circle", "fs_circle"),
            CircleInstance::layout(),
            config.format,
        );

        let shape_buffer = GrowBuffer::new(&device, "Shape Vertex Buffer", 64 * 1024);
        let circle_buffer = GrowBuffer::new(&device, "Circle Instance Buffer", 64 * 1024);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            shape_pipeline,
            circle_pipeline,
            globals_buffer,
            globals_bind_group,
            shape_buffer,
            circle_buffer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload `batch` and replay its draw runs onto the next surface texture.
    pub fn render(&mut self, batch: &SceneBatch) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::new(&self.config)),
        );
        self.shape_buffer
            .upload(&self.device, &self.queue, bytemuck::cast_slice(batch.vertices()));
        self.circle_buffer
            .upload(&self.device, &self.queue, bytemuck::cast_slice(batch.circles()));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for run in batch.runs() {
                match run {
                    DrawRun::Shapes(vertices) => {
                        render_pass.set_pipeline(&self.shape_pipeline);
                        render_pass.set_vertex_buffer(0, self.shape_buffer.buffer.slice(..));
                        render_pass.draw(vertices.clone(), 0..1);
                    }
                    DrawRun::Circles(instances) => {
                        render_pass.set_pipeline(&self.circle_pipeline);
                        render_pass.set_vertex_buffer(0, self.circle_buffer.buffer.slice(..));
                        render_pass.draw(0..6, instances.clone());
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
