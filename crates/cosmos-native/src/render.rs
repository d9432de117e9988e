use cosmos_core::{
    icosphere_edges, Camera, ParticleInstance, Scene, BLOBS_WGSL, CLUSTER_WGSL, LIGHT_COUNT,
    PARTICLES_WGSL, SHELL_COLOR, SHELL_DETAIL,
};
use glam::Vec3;
use wgpu::util::DeviceExt;

/// Uniform block shared by the cluster and particle shaders.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    light_pos: [[f32; 4]; LIGHT_COUNT],
    light_color: [[f32; 4]; LIGHT_COUNT],
    params: [f32; 4],
    shell: [[f32; 4]; 4],
    shell_color: [f32; 4],
}

// position, scale, color, opacity
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 1,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32,
        offset: 12,
        shader_location: 2,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 16,
        shader_location: 3,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32,
        offset: 28,
        shader_location: 4,
    },
];

const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    blob_pipeline: wgpu::RenderPipeline,
    shell_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    blob_buffer: wgpu::Buffer,
    shell_vb: wgpu::Buffer,
    shell_vertex_count: u32,
    line_vb: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    blob_bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn shader_module(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

/// What differs between the scene's render pipelines.
struct PipelineDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    module: &'a wgpu::ShaderModule,
    /// Vertex and fragment entry points.
    entry: (&'a str, &'a str),
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    blend: wgpu::BlendState,
}

fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    desc: PipelineDesc,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.module,
            entry_point: Some(desc.entry.0),
            buffers: desc.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: desc.module,
            entry_point: Some(desc.entry.1),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

impl<'w> GpuState<'w> {
    /// Allocate every GPU buffer at its final size; `scene` fixes the
    /// segment and instance capacities.
    pub async fn new(window: &'w winit::window::Window, scene: &Scene) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        log::info!("[gpu] {:?} surface {}x{}", format, config.width, config.height);

        let cluster_shader = shader_module(&device, "cluster", CLUSTER_WGSL);
        let particle_shader = shader_module(&device, "particles", PARTICLES_WGSL);
        let blob_shader = shader_module(&device, "blobs", BLOBS_WGSL);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let blob_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blob_uniforms"),
            contents: bytemuck::bytes_of(scene.blobs.uniforms()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shell_edges = icosphere_edges(SHELL_DETAIL);
        let shell_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shell_vb"),
            contents: bytemuck::cast_slice(&shell_edges),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let line_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_vb"),
            size: (std::mem::size_of::<Vec3>() * scene.cluster.vertex_capacity()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Quad vertices for two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_vb"),
            size: (std::mem::size_of::<ParticleInstance>() * scene.flock.len().max(1)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_layout = uniform_layout(&device, "scene_bgl", wgpu::ShaderStages::VERTEX_FRAGMENT);
        let blob_layout = uniform_layout(&device, "blob_bgl", wgpu::ShaderStages::FRAGMENT);
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let blob_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blob_bg"),
            layout: &blob_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: blob_buffer.as_entire_binding(),
            }],
        });

        let scene_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&scene_layout],
            push_constant_ranges: &[],
        });
        let blob_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blob_pl"),
            bind_group_layouts: &[&blob_layout],
            push_constant_ranges: &[],
        });

        let line_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vec3>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            }],
        }];
        let particle_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: ParticleInstance
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &INSTANCE_ATTRIBUTES,
            },
        ];

        let blob_pipeline = build_pipeline(
            &device,
            format,
            PipelineDesc {
                label: "blob_pipeline",
                layout: &blob_pl,
                module: &blob_shader,
                entry: ("vs_fullscreen", "fs_blobs"),
                buffers: &[],
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: wgpu::BlendState::ALPHA_BLENDING,
            },
        );
        let shell_pipeline = build_pipeline(
            &device,
            format,
            PipelineDesc {
                label: "shell_pipeline",
                layout: &scene_pl,
                module: &cluster_shader,
                entry: ("vs_shell", "fs_shell"),
                buffers: &line_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
                blend: wgpu::BlendState::ALPHA_BLENDING,
            },
        );
        let line_pipeline = build_pipeline(
            &device,
            format,
            PipelineDesc {
                label: "line_pipeline",
                layout: &scene_pl,
                module: &cluster_shader,
                entry: ("vs_main", "fs_main"),
                buffers: &line_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
                blend: wgpu::BlendState::ALPHA_BLENDING,
            },
        );
        let particle_pipeline = build_pipeline(
            &device,
            format,
            PipelineDesc {
                label: "particle_pipeline",
                layout: &scene_pl,
                module: &particle_shader,
                entry: ("vs_main", "fs_main"),
                buffers: &particle_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: ADDITIVE_BLENDING,
            },
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            blob_pipeline,
            shell_pipeline,
            line_pipeline,
            particle_pipeline,
            uniform_buffer,
            blob_buffer,
            shell_vb,
            shell_vertex_count: shell_edges.len() as u32,
            line_vb,
            quad_vb,
            instance_vb,
            scene_bind_group,
            blob_bind_group,
            width: size.width.max(1),
            height: size.height.max(1),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn uniforms(&self, scene: &Scene) -> Uniforms {
        let camera = Camera::scene_default(self.width as f32 / self.height as f32);
        let (right, up) = camera.billboard_axes();
        let lights = *scene.lights();
        Uniforms {
            view_proj: camera.view_proj().to_cols_array_2d(),
            model: scene.cluster.model_matrix().to_cols_array_2d(),
            camera_right: right.extend(0.0).to_array(),
            camera_up: up.extend(0.0).to_array(),
            light_pos: lights.map(|l| l.position.extend(l.intensity).to_array()),
            light_color: lights.map(|l| [l.color[0], l.color[1], l.color[2], l.range]),
            params: [scene.time().elapsed, scene.cluster.radius(), 0.0, 0.0],
            shell: scene.cluster.shell_matrix().to_cols_array_2d(),
            shell_color: SHELL_COLOR,
        }
    }

    pub fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms(scene)),
        );
        self.queue
            .write_buffer(&self.blob_buffer, 0, bytemuck::bytes_of(scene.blobs.uniforms()));

        let vertex_count = scene.cluster.vertex_count() as u32;
        if vertex_count > 0 {
            self.queue.write_buffer(
                &self.line_vb,
                0,
                bytemuck::cast_slice(scene.cluster.segments()),
            );
        }
        let instances = scene.flock.instances();
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(instances));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // background metaballs, then the shell and cluster, then additive particles
            rpass.set_pipeline(&self.blob_pipeline);
            rpass.set_bind_group(0, &self.blob_bind_group, &[]);
            rpass.draw(0..3, 0..1);

            rpass.set_bind_group(0, &self.scene_bind_group, &[]);
            rpass.set_pipeline(&self.shell_pipeline);
            rpass.set_vertex_buffer(0, self.shell_vb.slice(..));
            rpass.draw(0..self.shell_vertex_count, 0..1);

            if vertex_count > 0 {
                rpass.set_pipeline(&self.line_pipeline);
                rpass.set_vertex_buffer(0, self.line_vb.slice(..));
                rpass.draw(0..vertex_count, 0..1);
            }

            if !instances.is_empty() {
                rpass.set_pipeline(&self.particle_pipeline);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
                rpass.draw(0..6, 0..instances.len() as u32);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_the_wgsl_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 384);
        assert_eq!(std::mem::offset_of!(Uniforms, params), 288);
        assert_eq!(std::mem::offset_of!(Uniforms, shell), 304);
        assert_eq!(std::mem::offset_of!(Uniforms, shell_color), 368);
    }

    #[test]
    fn instance_attributes_follow_particle_instance() {
        let offsets = [
            std::mem::offset_of!(ParticleInstance, position),
            std::mem::offset_of!(ParticleInstance, scale),
            std::mem::offset_of!(ParticleInstance, color),
            std::mem::offset_of!(ParticleInstance, opacity),
        ];
        for (attr, offset) in INSTANCE_ATTRIBUTES.iter().zip(offsets) {
            assert_eq!(attr.offset, offset as u64);
        }
    }
}
