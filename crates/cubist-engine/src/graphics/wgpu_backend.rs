use std::num::NonZeroU64;

use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::coords::SurfaceSize;
use crate::device::{Gpu, SurfaceErrorAction, DEPTH_FORMAT};
use crate::shader::{ProgramLayout, ShaderProgram, StageSet, UniformKind};

use super::handle::next_index;
use super::{
    BufferHandle, BufferKind, DrawCall, FilterMode, Frame, FrameStatus, GraphicsContext,
    GraphicsError, ProgramHandle, TextureHandle, TextureOptions, UniformValue,
};

const MAT4_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

struct LinkedProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    layout: ProgramLayout,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// Device objects created through [`WgpuContext`], owned by the application
/// so they outlive any single frame.
#[derive(Default)]
pub struct GpuResources {
    programs: Vec<LinkedProgram>,
    buffers: Vec<wgpu::Buffer>,
    textures: Vec<GpuTexture>,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    fn program(&self, handle: ProgramHandle) -> Result<&LinkedProgram, GraphicsError> {
        self.programs
            .get(handle.index())
            .ok_or(GraphicsError::UnknownProgram(handle))
    }

    fn buffer(&self, handle: BufferHandle) -> Result<&wgpu::Buffer, GraphicsError> {
        self.buffers
            .get(handle.index())
            .ok_or(GraphicsError::UnknownBuffer(handle))
    }

    fn texture(&self, handle: TextureHandle) -> Result<&GpuTexture, GraphicsError> {
        self.textures
            .get(handle.index())
            .ok_or(GraphicsError::UnknownTexture(handle))
    }
}

/// On-screen [`GraphicsContext`] for one frame callback.
///
/// Borrows the window's [`Gpu`] and the application's [`GpuResources`].
pub struct WgpuContext<'a, 'w> {
    window: &'a Window,
    gpu: &'a mut Gpu<'w>,
    resources: &'a mut GpuResources,
}

/// A draw with all its device objects resolved, ready to record.
struct PreparedDraw<'r> {
    pipeline: &'r wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertex_buffers: Vec<&'r wgpu::Buffer>,
    index_buffer: &'r wgpu::Buffer,
    index_count: u32,
}

impl<'a, 'w> WgpuContext<'a, 'w> {
    pub fn new(window: &'a Window, gpu: &'a mut Gpu<'w>, resources: &'a mut GpuResources) -> Self {
        Self {
            window,
            gpu,
            resources,
        }
    }
}

impl GraphicsContext for WgpuContext<'_, '_> {
    fn surface_size(&self) -> SurfaceSize {
        self.gpu.size()
    }

    fn link_program(&mut self, program: &ShaderProgram) -> Result<ProgramHandle, GraphicsError> {
        let layout = program.layout();
        let device = self.gpu.device();

        if let Some(slot) = layout.uniforms.iter().find(|u| u.location.group != 0) {
            return Err(GraphicsError::Link(format!(
                "uniform `{}` is in group {}; only group 0 is supported",
                slot.name, slot.location.group
            )));
        }

        let mut entries = Vec::new();
        for slot in &layout.uniforms {
            let visibility = shader_stages(slot.visibility);
            match slot.kind {
                UniformKind::Matrix4 => entries.push(wgpu::BindGroupLayoutEntry {
                    binding: slot.location.binding,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(MAT4_SIZE),
                    },
                    count: None,
                }),
                UniformKind::Texture2d { sampler } => {
                    entries.push(wgpu::BindGroupLayoutEntry {
                        binding: slot.location.binding,
                        visibility,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    });
                    entries.push(wgpu::BindGroupLayoutEntry {
                        binding: sampler.binding,
                        visibility,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    });
                }
            }
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cubist program bgl"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cubist program pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cubist vertex stage"),
            source: wgpu::ShaderSource::Wgsl(program.vertex().source.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cubist fragment stage"),
            source: wgpu::ShaderSource::Wgsl(program.fragment().source.as_str().into()),
        });

        // One tightly packed buffer per attribute.
        let attributes = layout
            .attributes
            .iter()
            .map(|slot| {
                Ok([wgpu::VertexAttribute {
                    format: float_format(slot.components).ok_or_else(|| {
                        GraphicsError::Link(format!(
                            "attribute `{}` has {} components",
                            slot.name, slot.components
                        ))
                    })?,
                    offset: 0,
                    shader_location: slot.location.0,
                }])
            })
            .collect::<Result<Vec<_>, GraphicsError>>()?;

        let vertex_buffers: Vec<wgpu::VertexBufferLayout<'_>> = attributes
            .iter()
            .map(|attr| wgpu::VertexBufferLayout {
                array_stride: attr[0].format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attr,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cubist program pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(program.vertex().entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(program.fragment().entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.surface_format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let handle = ProgramHandle::new(next_index(self.resources.programs.len()));
        self.resources.programs.push(LinkedProgram {
            pipeline,
            bind_group_layout,
            layout: layout.clone(),
        });
        Ok(handle)
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
        contents: &[u8],
    ) -> Result<BufferHandle, GraphicsError> {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            });

        let handle = BufferHandle::new(next_index(self.resources.buffers.len()));
        self.resources.buffers.push(buffer);
        Ok(handle)
    }

    fn create_texture(
        &mut self,
        image: &RgbaImage,
        options: TextureOptions,
    ) -> Result<TextureHandle, GraphicsError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(GraphicsError::EmptyImage);
        }

        let flipped;
        let pixels = if options.flip_y {
            flipped = image::imageops::flip_vertical(image);
            &flipped
        } else {
            image
        };

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let device = self.gpu.device();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cubist model texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cubist model sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter(options.mag_filter),
            min_filter: filter(options.min_filter),
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let handle = TextureHandle::new(next_index(self.resources.textures.len()));
        self.resources.textures.push(GpuTexture {
            _texture: texture,
            view,
            sampler,
        });
        Ok(handle)
    }

    fn submit(&mut self, frame: &Frame) -> Result<FrameStatus, GraphicsError> {
        let surface = self.gpu.size();
        if surface.is_empty() {
            return Ok(FrameStatus::Skipped);
        }

        // Resolve every draw before acquiring, so a bad frame never holds a
        // surface texture.
        let resources: &GpuResources = &*self.resources;
        let prepared = frame
            .draws
            .iter()
            .map(|draw| prepare_draw(self.gpu.device(), resources, draw))
            .collect::<Result<Vec<_>, _>>()?;

        let mut gpu_frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface unavailable: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(GraphicsError::SurfaceOutOfMemory),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        Ok(FrameStatus::Skipped)
                    }
                };
            }
        };
        let gpu: &Gpu<'_> = &*self.gpu;

        // The viewport must stay inside the render target.
        let width = frame.viewport.width.min(surface.width).max(1);
        let height = frame.viewport.height.min(surface.height).max(1);

        {
            let mut rpass = gpu_frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cubist frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu_frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear.color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear.depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);

            for draw in &prepared {
                rpass.set_pipeline(draw.pipeline);
                rpass.set_bind_group(0, &draw.bind_group, &[]);
                for (slot, buffer) in draw.vertex_buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                rpass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.window.pre_present_notify();
        gpu.submit(gpu_frame);

        Ok(FrameStatus::Presented)
    }
}

fn prepare_draw<'r>(
    device: &wgpu::Device,
    resources: &'r GpuResources,
    draw: &DrawCall,
) -> Result<PreparedDraw<'r>, GraphicsError> {
    let program = resources.program(draw.program)?;
    draw.validate(&program.layout)?;

    // Matrices get a fresh buffer per draw so several draws of one program
    // in a frame do not overwrite each other.
    let mut matrix_buffers = Vec::new();
    for slot in &program.layout.uniforms {
        if let Some(UniformValue::Mat4(m)) = draw.uniform(slot.location) {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cubist matrix ubo"),
                contents: bytemuck::cast_slice(&m.to_cols_array()),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            matrix_buffers.push((slot.location.binding, buffer));
        }
    }

    let mut entries = Vec::new();
    for (binding, buffer) in &matrix_buffers {
        entries.push(wgpu::BindGroupEntry {
            binding: *binding,
            resource: buffer.as_entire_binding(),
        });
    }
    for slot in &program.layout.uniforms {
        if let (UniformKind::Texture2d { sampler }, Some(UniformValue::TextureUnit(unit))) =
            (slot.kind, draw.uniform(slot.location))
        {
            let handle = draw
                .texture_at(unit)
                .ok_or(GraphicsError::EmptyTextureUnit(unit))?;
            let texture = resources.texture(handle)?;
            entries.push(wgpu::BindGroupEntry {
                binding: slot.location.binding,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: sampler.binding,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }
    }

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("cubist draw bind group"),
        layout: &program.bind_group_layout,
        entries: &entries,
    });

    // Slot order follows the pipeline's attribute order.
    let vertex_buffers = program
        .layout
        .attributes
        .iter()
        .map(|slot| {
            let binding = draw
                .attribute(slot.location)
                .ok_or_else(|| GraphicsError::UnboundAttribute(slot.name.clone()))?;
            resources.buffer(binding.buffer)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PreparedDraw {
        pipeline: &program.pipeline,
        bind_group,
        vertex_buffers,
        index_buffer: resources.buffer(draw.indices.buffer)?,
        index_count: draw.indices.count,
    })
}

fn shader_stages(set: StageSet) -> wgpu::ShaderStages {
    let mut stages = wgpu::ShaderStages::NONE;
    if set.vertex {
        stages |= wgpu::ShaderStages::VERTEX;
    }
    if set.fragment {
        stages |= wgpu::ShaderStages::FRAGMENT;
    }
    stages
}

fn float_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

fn filter(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}
