//! SDF-based WebGPU render pipeline
//!
//! Renders the whole scene in the fragment shader using signed distance
//! fields. The draw list is flattened into two uniform buffers each frame.

use std::sync::Once;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::scene::{DrawCommand, Scene};
use super::theme::Color;

/// Maximum number of obstacle rectangles the shader reads
pub const MAX_RECTS: usize = 32;

static RECT_OVERFLOW: Once = Once::new();

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2],  // offset 0
    pub arena_size: [f32; 2],  // offset 8
    pub backdrop: [f32; 4],    // offset 16
    pub arena_color: [f32; 4], // offset 32
    pub ball_color: [f32; 4],  // offset 48
    pub ball_center: [f32; 2], // offset 64
    pub ball_radius: f32,      // offset 72
    pub rect_count: u32,       // offset 76
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RectData {
    pub min: [f32; 2],
    pub max: [f32; 2],
    pub color: [f32; 4],
}

/// Flatten a scene into shader uniforms.
///
/// Colors are encoded for the surface: linear when `srgb_target` is set,
/// sRGB values otherwise. Obstacles past [`MAX_RECTS`] are dropped (warned
/// about once). Anything missing from the scene is left fully transparent.
pub fn scene_uniforms(
    scene: &Scene,
    resolution: (u32, u32),
    backdrop: Color,
    srgb_target: bool,
) -> (Globals, [RectData; MAX_RECTS]) {
    let mut globals = Globals {
        resolution: [resolution.0 as f32, resolution.1 as f32],
        backdrop: backdrop.to_target(srgb_target),
        ..Zeroable::zeroed()
    };
    let mut rects = [RectData::zeroed(); MAX_RECTS];
    let mut count = 0;

    for command in &scene.commands {
        match *command {
            DrawCommand::Fill { size, color } => {
                globals.arena_size = size.to_array();
                globals.arena_color = color.to_target(srgb_target);
            }
            DrawCommand::Rect {
                origin,
                size,
                color,
            } => {
                if count < MAX_RECTS {
                    rects[count] = RectData {
                        min: origin.to_array(),
                        max: (origin + size).to_array(),
                        color: color.to_target(srgb_target),
                    };
                } else {
                    RECT_OVERFLOW.call_once(|| {
                        log::warn!("Scene has more than {} rectangles, extras skipped", MAX_RECTS);
                    });
                }
                count += 1;
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => {
                globals.ball_center = center.to_array();
                globals.ball_radius = radius;
                globals.ball_color = color.to_target(srgb_target);
            }
        }
    }

    globals.rect_count = count.min(MAX_RECTS) as u32;
    (globals, rects)
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    rects_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    backdrop: Color,
    srgb_target: bool,
    pub size: (u32, u32),
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        backdrop: Color,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        // The browser WebGPU backend offers no sRGB surface formats
        let srgb_target = surface_format.is_srgb();
        log::info!("Using surface format: {:?} (srgb: {})", surface_format, srgb_target);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let (globals, rects) = scene_uniforms(&Scene::default(), (width, height), backdrop, srgb_target);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let rects_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rects"),
            contents: bytemuck::cast_slice(&rects),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: rects_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            rects_buffer,
            bind_group,
            backdrop,
            srgb_target,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload the scene and draw one frame
    pub fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let (globals, rects) = scene_uniforms(scene, self.size, self.backdrop, self.srgb_target);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue
            .write_buffer(&self.rects_buffer, 0, bytemuck::cast_slice(&rects));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let [r, g, b, _] = globals.backdrop;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
