//! WebGPU point-sprite render pipeline
//!
//! Each field vertex becomes one instance; the vertex shader expands it into
//! a screen-aligned quad sized by the eased particle size, and the fragment
//! shader blends color A and color B by the vertex's ratio. Sprites add up
//! (additive blending, no depth test).

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::vertex::{PointInstance, fill_instances};
use super::{Renderer, SceneView};
use crate::consts::{CAMERA_BASE_FOV, CAMERA_FAR, CAMERA_NEAR};
use crate::platform::Viewport;

/// Vertices emitted per sprite (two triangles)
const QUAD_VERTICES: u32 = 6;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4], // offset 0
    color_a: [f32; 4],        // offset 64
    color_b: [f32; 4],        // offset 80
    resolution: [f32; 2],     // offset 96
    particle_size: f32,       // offset 104
    elapsed: f32,             // offset 108
}

const _: () = assert!(std::mem::size_of::<Globals>() == 112);

// ============================================================================
// POINT RENDER STATE
// ============================================================================

pub struct PointRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    // Per-field instance storage, rebuilt when the field is replaced
    instance_buffer: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instance_generation: Option<u64>,
    scratch: Vec<PointInstance>,

    projection: Mat4,
    /// Drawing buffer size in physical pixels
    pub size: (u32, u32),
    pixel_ratio: f64,
    alive: bool,
}

impl PointRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("noise-planes-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!("Surface config: {}x{}, format {:?}", width, height, surface_format);
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                color_a: [1.0; 4],
                color_b: [1.0; 4],
                resolution: [width as f32, height as f32],
                particle_size: 1.0,
                elapsed: 0.0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("points_bind_group_layout"),
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
            label: Some("points_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("points_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[PointInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState {
                        color: additive,
                        alpha: additive,
                    }),
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

        let aspect = width as f32 / height.max(1) as f32;
        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            bind_group,
            instance_buffer: None,
            instance_capacity: 0,
            instance_generation: None,
            scratch: Vec::new(),
            projection: Mat4::perspective_rh(
                CAMERA_BASE_FOV.to_radians(),
                aspect,
                CAMERA_NEAR,
                CAMERA_FAR,
            ),
            size: (width, height),
            pixel_ratio: 1.0,
            alive: true,
        }
    }

    /// Physical pixels per CSS pixel for later viewport updates
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn release_instances(&mut self) {
        if let Some(buffer) = self.instance_buffer.take() {
            buffer.destroy();
        }
        self.instance_capacity = 0;
        self.instance_generation = None;
    }

    /// Make sure the instance buffer belongs to `generation` and can hold
    /// `count` instances
    fn prepare_instances(&mut self, generation: u64, count: usize) {
        let stale = self.instance_generation != Some(generation);
        if stale || count > self.instance_capacity {
            self.release_instances();
            let capacity = count.max(1);
            self.instance_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("point_instances"),
                size: (std::mem::size_of::<PointInstance>() * capacity) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.instance_capacity = capacity;
            self.instance_generation = Some(generation);
            log::debug!("Allocated instance buffer for field #{} ({} points)", generation, count);
        }
    }

    /// Upload the frame and draw it
    pub fn render(&mut self, view: &SceneView<'_>) -> Result<(), wgpu::SurfaceError> {
        let material = view.material;
        let globals = Globals {
            view_proj: (self.projection * view.view).to_cols_array_2d(),
            color_a: material.color_a.to_rgba(),
            color_b: material.color_b.to_rgba(),
            resolution: [self.size.0 as f32, self.size.1 as f32],
            particle_size: material.particle_size,
            elapsed: material.elapsed_ms,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let count = view.vertex_count();
        if count > 0 {
            self.prepare_instances(view.generation, count);
            fill_instances(&mut self.scratch, view.positions, view.color_ratios);
            if let Some(buffer) = &self.instance_buffer {
                self.queue
                    .write_buffer(buffer, 0, bytemuck::cast_slice(&self.scratch));
            }
        }

        let output = self.surface.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("points_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("points_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let (Some(buffer), true) = (&self.instance_buffer, count > 0) {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..QUAD_VERTICES, 0..count as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Renderer for PointRenderState {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        let (w, h) = Viewport::new(width, height).physical(self.pixel_ratio);
        self.resize(w, h);
    }

    fn update_projection(&mut self, fov: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_rh(fov.to_radians(), aspect, near, far);
    }

    fn clear_and_draw(&mut self, view: &SceneView<'_>) {
        match self.render(view) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.resize(self.size.0, self.size.1);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    fn release_field(&mut self, generation: u64) {
        if self.instance_generation == Some(generation) {
            self.release_instances();
            log::debug!("Released instance buffer for field #{}", generation);
        }
    }

    fn teardown(&mut self) {
        self.release_instances();
        self.scratch = Vec::new();
        self.alive = false;
        log::info!("Point renderer torn down");
    }
}
