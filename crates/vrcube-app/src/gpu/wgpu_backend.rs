use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use vrcube_engine::core::RenderTarget;
use vrcube_engine::device::{DriverErrorLog, Gpu};

use crate::error::RenderError;

use super::backend::{AttributeBinding, BufferKind, GpuBackend, ResourceBundle, VertexLayout};
use super::shader::{self, FRAGMENT_ENTRY, ShaderSource, VERTEX_ENTRY};
use super::uniforms::FrameUniforms;

/// Vertex buffer slots: one per attribute block plus the instance buffer.
const REQUIRED_VERTEX_BUFFERS: u32 = 4;
/// Three per-vertex attributes plus four instance matrix columns.
const REQUIRED_VERTEX_ATTRIBUTES: u32 = 7;

const ATTRIBUTE_STRIDE: u64 = std::mem::size_of::<glam::Vec3>() as u64;
const INSTANCE_STRIDE: u64 = std::mem::size_of::<glam::Mat4>() as u64;

/// Linked shader stages with their uniform block.
pub struct WgpuProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Render pipeline with the vertex buffer ranges it reads.
pub struct WgpuVertexArray {
    pipeline: wgpu::RenderPipeline,
    attributes: Vec<AttributeBinding>,
}

/// [`GpuBackend`] over the device of one window.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    driver_errors: DriverErrorLog,
    clear_color: wgpu::Color,
}

impl WgpuBackend {
    pub fn for_gpu(gpu: &Gpu, clear_color: wgpu::Color) -> Self {
        Self {
            device: gpu.device().clone(),
            queue: gpu.queue().clone(),
            color_format: gpu.surface_format(),
            depth_format: gpu.depth_format(),
            driver_errors: gpu.driver_errors().clone(),
            clear_color,
        }
    }

    fn check_limits(&self) -> Result<(), RenderError> {
        let limits = self.device.limits();
        if limits.max_vertex_buffers < REQUIRED_VERTEX_BUFFERS {
            return Err(RenderError::MissingFeature(format!(
                "{REQUIRED_VERTEX_BUFFERS} vertex buffers (device supports {})",
                limits.max_vertex_buffers
            )));
        }
        if limits.max_vertex_attributes < REQUIRED_VERTEX_ATTRIBUTES {
            return Err(RenderError::MissingFeature(format!(
                "{REQUIRED_VERTEX_ATTRIBUTES} vertex attributes (device supports {})",
                limits.max_vertex_attributes
            )));
        }
        Ok(())
    }

    /// Runs `f` inside a validation error scope.
    fn scoped<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        let error = pollster::block_on(scope.pop());
        (value, error)
    }

    fn allocate(
        &self,
        label: &str,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> Result<wgpu::Buffer, RenderError> {
        let (buffer, error) = self.scoped(|| {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            })
        });
        match error {
            Some(err) => Err(RenderError::BufferAllocation {
                label: label.to_string(),
                size,
                log: err.to_string(),
            }),
            None => Ok(buffer),
        }
    }

    fn create_module(&self, source: &ShaderSource) -> Result<wgpu::ShaderModule, RenderError> {
        let (module, error) = self.scoped(|| {
            self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(source.label.as_str()),
                source: wgpu::ShaderSource::Wgsl(source.wgsl.as_str().into()),
            })
        });
        match error {
            Some(err) => Err(RenderError::ShaderCompile {
                stage: source.stage,
                log: err.to_string(),
            }),
            None => Ok(module),
        }
    }
}

impl GpuBackend for WgpuBackend {
    type Program = WgpuProgram;
    type Buffer = wgpu::Buffer;
    type VertexArray = WgpuVertexArray;
    type Target<'t> = RenderTarget<'t>;

    fn create_program(
        &self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<WgpuProgram, RenderError> {
        self.check_limits()?;

        let vs = shader::compile(vertex)?;
        let fs = shader::compile(fragment)?;
        shader::link(&vs, &fs)?;

        let vertex_module = self.create_module(vertex)?;
        let fragment_module = self.create_module(fragment)?;

        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("vrcube uniforms bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(FrameUniforms::SIZE),
                    },
                    count: None,
                }],
            });

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("vrcube pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let uniforms = self.allocate(
            "vrcube uniforms",
            FrameUniforms::SIZE,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )?;

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vrcube uniforms bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        Ok(WgpuProgram {
            vertex: vertex_module,
            fragment: fragment_module,
            layout,
            uniforms,
            bind_group,
        })
    }

    fn create_buffer(&self, kind: BufferKind, size: u64, label: &str) -> Result<wgpu::Buffer, RenderError> {
        let usage = match kind {
            BufferKind::Vertex | BufferKind::Instance => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        self.allocate(label, size, usage | wgpu::BufferUsages::COPY_DST)
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, bytes: &[u8]) -> Result<(), RenderError> {
        self.queue.write_buffer(buffer, offset, bytes);
        Ok(())
    }

    fn create_vertex_array(
        &self,
        program: &WgpuProgram,
        layout: &VertexLayout,
    ) -> Result<WgpuVertexArray, RenderError> {
        let attribute_sets: Vec<[wgpu::VertexAttribute; 1]> = layout
            .attributes
            .iter()
            .map(|a| {
                [wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: a.location,
                }]
            })
            .collect();

        let instance_columns: [wgpu::VertexAttribute; 4] =
            std::array::from_fn(|i| wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: (i * 16) as u64,
                shader_location: layout.instance_location + i as u32,
            });

        let mut buffers: Vec<wgpu::VertexBufferLayout<'_>> = attribute_sets
            .iter()
            .map(|attributes| wgpu::VertexBufferLayout {
                array_stride: ATTRIBUTE_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();
        buffers.push(wgpu::VertexBufferLayout {
            array_stride: INSTANCE_STRIDE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &instance_columns,
        });

        let (pipeline, error) = self.scoped(|| {
            self.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("vrcube cube pipeline"),
                    layout: Some(&program.layout),

                    vertex: wgpu::VertexState {
                        module: &program.vertex,
                        entry_point: Some(VERTEX_ENTRY),
                        compilation_options: Default::default(),
                        buffers: &buffers,
                    },

                    fragment: Some(wgpu::FragmentState {
                        module: &program.fragment,
                        entry_point: Some(FRAGMENT_ENTRY),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: self.color_format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),

                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: Some(wgpu::Face::Back),
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },

                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: self.depth_format,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),

                    multiview_mask: None,
                    cache: None,
                })
        });

        if let Some(err) = error {
            return Err(RenderError::ProgramLink {
                log: err.to_string(),
            });
        }

        Ok(WgpuVertexArray {
            pipeline,
            attributes: layout.attributes.clone(),
        })
    }

    fn draw(
        &self,
        target: &mut RenderTarget<'_>,
        resources: &ResourceBundle<Self>,
        uniforms: &FrameUniforms,
    ) -> Result<(), RenderError> {
        let program = &resources.program;
        let vertex_array = &resources.vertex_array;

        // Copied inside the encoder: each pass of a frame reads its own uniforms.
        let staging = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vrcube uniforms staging"),
            contents: bytemuck::bytes_of(uniforms),
            usage: wgpu::BufferUsages::COPY_SRC,
        });
        target
            .encoder
            .copy_buffer_to_buffer(&staging, 0, &program.uniforms, 0, FrameUniforms::SIZE);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vrcube cube pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&vertex_array.pipeline);
        rpass.set_bind_group(0, &program.bind_group, &[]);

        let mut slot = 0;
        for attr in &vertex_array.attributes {
            rpass.set_vertex_buffer(
                slot,
                resources
                    .vertex_buffer
                    .slice(attr.offset..attr.offset + attr.size),
            );
            slot += 1;
        }
        rpass.set_vertex_buffer(slot, resources.instance_buffer.slice(..));
        rpass.set_index_buffer(resources.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let draw = resources.draw;
        rpass.draw_indexed(0..draw.index_count, 0, 0..draw.instance_count);
        Ok(())
    }

    fn take_driver_errors(&self) -> Vec<String> {
        self.driver_errors.drain()
    }

    fn release(&self, resources: ResourceBundle<Self>) {
        resources.vertex_buffer.destroy();
        resources.index_buffer.destroy();
        resources.instance_buffer.destroy();
        resources.program.uniforms.destroy();
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;
    use vrcube_engine::core::ContextId;

    use super::*;
    use crate::config::{ColorScheme, SceneConfig};
    use crate::registry::{ContextResourceRegistry, SlotState};
    use crate::scene::{CubeGeometry, SceneState};

    const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    fn noop_backend(limits: wgpu::Limits) -> WgpuBackend {
        let (device, queue) = wgpu::Device::noop(&wgpu::DeviceDescriptor {
            label: Some("vrcube test device"),
            required_limits: limits,
            ..Default::default()
        });
        let driver_errors = DriverErrorLog::new();
        driver_errors.attach(&device);

        WgpuBackend {
            device,
            queue,
            color_format: COLOR_FORMAT,
            depth_format: DEPTH_FORMAT,
            driver_errors,
            clear_color: wgpu::Color::BLACK,
        }
    }

    fn white_scene() -> SceneState {
        let config = SceneConfig {
            color_scheme: ColorScheme::Uniform,
            ..SceneConfig::default()
        };
        let mut scene = SceneState::initialize(&config, &CubeGeometry::new(config.color_scheme)).unwrap();
        scene.update(0.0).unwrap();
        scene
    }

    fn attachment(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("vrcube test attachment"),
                size: wgpu::Extent3d {
                    width: 64,
                    height: 64,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[test]
    fn context_initializes_and_draws_twice_in_one_frame() {
        let backend = noop_backend(wgpu::Limits::default());
        let device = backend.device.clone();
        let queue = backend.queue.clone();

        let registry = ContextResourceRegistry::new();
        let scene = white_scene();
        registry.initialize_context(ContextId(0), backend, &scene).unwrap();
        assert_eq!(registry.state(ContextId(0)), SlotState::Initialized);

        let color = attachment(&device, COLOR_FORMAT);
        let depth = attachment(&device, DEPTH_FORMAT);
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        {
            let mut target = RenderTarget::new(&mut encoder, &color, &depth);
            let left = Mat4::from_translation(glam::Vec3::X);
            let right = Mat4::from_translation(-glam::Vec3::X);
            for view in [left, right] {
                registry
                    .draw_context(ContextId(0), &mut target, view, Mat4::IDENTITY, &scene)
                    .unwrap();
            }
        }
        queue.submit([encoder.finish()]);

        let error = pollster::block_on(scope.pop());
        assert!(error.is_none(), "validation failed: {error:?}");
        assert_eq!(registry.release_all(), 1);
    }

    #[test]
    fn oversized_buffer_fails_initialization() {
        let limits = wgpu::Limits {
            // Room for the uniform block, not for the vertex attributes.
            max_buffer_size: 600,
            ..wgpu::Limits::default()
        };
        let registry = ContextResourceRegistry::new();
        let scene = white_scene();

        let err = registry
            .initialize_context(ContextId(0), noop_backend(limits), &scene)
            .unwrap_err();

        match &err {
            RenderError::BufferAllocation { label, size, .. } => {
                assert_eq!(label, "vrcube vertices");
                assert_eq!(*size, 3 * 24 * 12);
            }
            other => panic!("expected allocation error, got {other}"),
        }
        assert!(err.is_fatal());
        assert_eq!(registry.state(ContextId(0)), SlotState::Unallocated);
        assert!(matches!(
            registry.initialize_context(ContextId(0), noop_backend(wgpu::Limits::default()), &scene),
            Err(RenderError::InitializationFailed(ContextId(0)))
        ));
    }

    #[test]
    fn too_few_vertex_buffers_is_a_missing_feature() {
        let limits = wgpu::Limits {
            max_vertex_buffers: REQUIRED_VERTEX_BUFFERS - 1,
            ..wgpu::Limits::default()
        };
        let backend = noop_backend(limits);

        let err = backend
            .create_program(&ShaderSource::cube_vertex(), &ShaderSource::cube_fragment())
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::MissingFeature(_)));
        assert!(err.is_fatal());
    }
}
