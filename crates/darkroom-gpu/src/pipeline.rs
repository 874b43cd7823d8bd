//! The full-mode adjustment pipeline.
//!
//! One fragment-shader pass over a full-screen triangle renders the bound
//! image into an `Rgba32Float` target, which is then read back. The image
//! texture, target and mask layers live as long as the binding; the curve
//! texture and uniform buffer live as long as the pipeline.

use darkroom_core::RenderError;
use darkroom_core::image::PhotoImage;
use darkroom_core::mask::MAX_LOCAL_MASKS;
use darkroom_core::pipeline::{FrameRenderer, FrameRequest, PipelineParams, RenderMode};

use crate::GpuError;
use crate::buffers::{CurveTexture, GpuImageHandle, MaskTexture};
use crate::context::GpuContext;
use crate::readback::Readback;
use crate::uniforms::AdjustUniformsGpu;

/// GPU resources tied to the currently bound image.
struct BoundImage {
    image: GpuImageHandle,
    masks: MaskTexture,
    bind_group: wgpu::BindGroup,
}

impl BoundImage {
    fn destroy(&self) {
        self.image.destroy();
        self.masks.destroy();
    }
}

/// Full-mode [`FrameRenderer`] on a wgpu device.
pub struct GpuAdjustmentPipeline {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    curve: CurveTexture,
    bound: Option<BoundImage>,
    readback: Readback,
    released: bool,
}

fn texture_entry(binding: u32, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

impl GpuAdjustmentPipeline {
    /// Compile the adjustment shader and allocate per-pipeline resources.
    pub fn new(context: GpuContext) -> Result<Self, GpuError> {
        let device = &context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("darkroom_adjust_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/adjust.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("darkroom_adjust_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<AdjustUniformsGpu>() as u64,
                        ),
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureViewDimension::D2),
                texture_entry(2, wgpu::TextureViewDimension::D1),
                texture_entry(3, wgpu::TextureViewDimension::D2Array),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("darkroom_adjust_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("darkroom_adjust_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba32Float,
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
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("darkroom_adjust_uniforms"),
            size: std::mem::size_of::<AdjustUniformsGpu>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let curve = CurveTexture::new(device);

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::Shader(err.to_string()));
        }

        tracing::info!(adapter = %context.adapter_name, "adjustment pipeline ready");
        Ok(Self {
            context,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            curve,
            bound: None,
            readback: Readback::new(),
            released: false,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    fn create_bind_group(&self, image: &GpuImageHandle, masks: &MaskTexture) -> wgpu::BindGroup {
        self.context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("darkroom_adjust_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&image.source_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&self.curve.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&masks.view),
                },
            ],
        })
    }

    /// Reallocate the mask array when the number of rendered layers changes.
    fn ensure_mask_layers(&mut self, layers: u32) {
        let Some(bound) = &self.bound else {
            return;
        };
        if bound.masks.layers == layers {
            return;
        }
        let masks = MaskTexture::new(
            &self.context.device,
            bound.image.width,
            bound.image.height,
            layers,
        );
        let bind_group = self.create_bind_group(&bound.image, &masks);
        tracing::debug!(layers, "resized mask layers");
        if let Some(bound) = &mut self.bound {
            bound.masks.destroy();
            bound.masks = masks;
            bound.bind_group = bind_group;
        }
    }

    fn unbind(&mut self) {
        if let Some(bound) = self.bound.take() {
            bound.destroy();
        }
    }
}

impl FrameRenderer for GpuAdjustmentPipeline {
    fn mode(&self) -> RenderMode {
        RenderMode::Full
    }

    fn bind_image(&mut self, image: &PhotoImage) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        if image.is_empty() {
            return Err(RenderError::EmptyImage);
        }
        self.context.check_size(image.width, image.height)?;
        self.unbind();

        let handle = GpuImageHandle::upload(&self.context.device, &self.context.queue, image);
        let masks = MaskTexture::new(&self.context.device, image.width, image.height, 0);
        let bind_group = self.create_bind_group(&handle, &masks);
        tracing::debug!(width = image.width, height = image.height, "bound image to GPU pipeline");
        self.bound = Some(BoundImage {
            image: handle,
            masks,
            bind_group,
        });
        Ok(())
    }

    fn render(&mut self, request: &FrameRequest<'_>) -> Result<PhotoImage, RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        self.ensure_mask_layers(request.layers.len().min(MAX_LOCAL_MASKS) as u32);
        let Some(bound) = &self.bound else {
            return Err(RenderError::NoImage);
        };
        let device = &self.context.device;
        let queue = &self.context.queue;

        let params = PipelineParams::from_state(request.state, request.seed);
        if let Some(lut) = &params.curve {
            self.curve.upload(queue, lut);
        }
        bound.masks.upload(queue, request.layers);
        let uniforms = AdjustUniformsGpu::from_params(
            &params,
            [bound.image.width, bound.image.height],
            request.layers,
        );
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("darkroom_adjust_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("darkroom_adjust_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &bound.image.target_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bound.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.readback.copy_to_staging(device, &mut encoder, &bound.image);
        queue.submit(std::iter::once(encoder.finish()));
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::Shader(err.to_string()).into());
        }

        Ok(self.readback.read_image(device, &bound.image)?)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.unbind();
        self.readback = Readback::new();
        self.curve.texture.destroy();
        self.released = true;
        tracing::debug!("GPU pipeline released");
    }
}

impl Drop for GpuAdjustmentPipeline {
    fn drop(&mut self) {
        self.release();
    }
}
