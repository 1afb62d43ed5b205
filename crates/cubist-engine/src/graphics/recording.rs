use image::RgbaImage;

use crate::coords::SurfaceSize;
use crate::shader::{ProgramLayout, ShaderProgram};

use super::handle::next_index;
use super::{
    BufferHandle, BufferKind, Frame, FrameStatus, GraphicsContext, GraphicsError, ProgramHandle,
    TextureHandle, TextureOptions,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBuffer {
    pub kind: BufferKind,
    pub label: String,
    pub contents: Vec<u8>,
}

impl RecordedBuffer {
    /// Contents reinterpreted as `f32`s (vertex buffers).
    pub fn floats(&self) -> Vec<f32> {
        self.contents
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    /// Contents reinterpreted as `u16`s (index buffers).
    pub fn indices(&self) -> Vec<u16> {
        self.contents
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTexture {
    pub width: u32,
    pub height: u32,
    pub options: TextureOptions,
}

/// A headless [`GraphicsContext`] that records every call.
///
/// Frames are validated against the linked program's layout the same way the
/// wgpu backend validates them, then stored instead of drawn.
#[derive(Debug, Default)]
pub struct RecordingContext {
    size: SurfaceSize,
    programs: Vec<ProgramLayout>,
    buffers: Vec<RecordedBuffer>,
    textures: Vec<RecordedTexture>,
    frames: Vec<Frame>,
}

impl RecordingContext {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    pub fn programs(&self) -> &[ProgramLayout] {
        &self.programs
    }

    pub fn buffers(&self) -> &[RecordedBuffer] {
        &self.buffers
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&RecordedBuffer> {
        self.buffers.get(handle.index())
    }

    pub fn textures(&self) -> &[RecordedTexture] {
        &self.textures
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Draw calls across all submitted frames.
    pub fn draw_count(&self) -> usize {
        self.frames.iter().map(|f| f.draws.len()).sum()
    }

    fn check_handles(&self, frame: &Frame) -> Result<(), GraphicsError> {
        for draw in &frame.draws {
            let layout = self
                .programs
                .get(draw.program.index())
                .ok_or(GraphicsError::UnknownProgram(draw.program))?;
            draw.validate(layout)?;

            let buffers = draw
                .attributes
                .iter()
                .map(|a| a.buffer)
                .chain(std::iter::once(draw.indices.buffer));
            for buffer in buffers {
                if self.buffer(buffer).is_none() {
                    return Err(GraphicsError::UnknownBuffer(buffer));
                }
            }

            for binding in &draw.textures {
                if self.textures.get(binding.texture.index()).is_none() {
                    return Err(GraphicsError::UnknownTexture(binding.texture));
                }
            }
        }
        Ok(())
    }
}

impl GraphicsContext for RecordingContext {
    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn link_program(&mut self, program: &ShaderProgram) -> Result<ProgramHandle, GraphicsError> {
        let handle = ProgramHandle::new(next_index(self.programs.len()));
        self.programs.push(program.layout().clone());
        Ok(handle)
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
        contents: &[u8],
    ) -> Result<BufferHandle, GraphicsError> {
        let handle = BufferHandle::new(next_index(self.buffers.len()));
        self.buffers.push(RecordedBuffer {
            kind,
            label: label.to_string(),
            contents: contents.to_vec(),
        });
        Ok(handle)
    }

    fn create_texture(
        &mut self,
        image: &RgbaImage,
        options: TextureOptions,
    ) -> Result<TextureHandle, GraphicsError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(GraphicsError::EmptyImage);
        }
        let handle = TextureHandle::new(next_index(self.textures.len()));
        self.textures.push(RecordedTexture {
            width: image.width(),
            height: image.height(),
            options,
        });
        Ok(handle)
    }

    fn submit(&mut self, frame: &Frame) -> Result<FrameStatus, GraphicsError> {
        if self.size.is_empty() {
            return Ok(FrameStatus::Skipped);
        }
        self.check_handles(frame)?;
        self.frames.push(frame.clone());
        Ok(FrameStatus::Presented)
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::graphics::{DrawCall, IndexBinding, UniformBinding, UniformValue, VertexBinding};
    use crate::shader::ProgramSources;

    fn plain_program() -> ShaderProgram {
        let sources = ProgramSources::plain();
        ShaderProgram::build(&sources.vertex, &sources.fragment).unwrap()
    }

    fn setup() -> (RecordingContext, ProgramHandle, DrawCall) {
        let mut ctx = RecordingContext::new(SurfaceSize::new(100, 50));
        let program = plain_program();
        let handle = ctx.link_program(&program).unwrap();
        let positions = ctx
            .create_buffer(BufferKind::Vertex, "positions", bytemuck::cast_slice(&[0f32; 9]))
            .unwrap();
        let indices = ctx
            .create_buffer(BufferKind::Index, "indices", bytemuck::cast_slice(&[0u16, 1, 2]))
            .unwrap();

        let layout = program.layout();
        let draw = DrawCall {
            program: handle,
            uniforms: vec![
                UniformBinding {
                    location: layout.bind_matrix("uPMatrix").unwrap(),
                    value: UniformValue::Mat4(Mat4::IDENTITY),
                },
                UniformBinding {
                    location: layout.bind_matrix("uMVMatrix").unwrap(),
                    value: UniformValue::Mat4(Mat4::IDENTITY),
                },
            ],
            attributes: vec![VertexBinding {
                location: layout.bind_attribute("aPos", 3).unwrap(),
                buffer: positions,
                components: 3,
            }],
            textures: Vec::new(),
            indices: IndexBinding {
                buffer: indices,
                count: 3,
            },
        };
        (ctx, handle, draw)
    }

    fn frame(draw: DrawCall) -> Frame {
        Frame {
            viewport: SurfaceSize::new(100, 50),
            clear: Default::default(),
            draws: vec![draw],
        }
    }

    #[test]
    fn records_buffers_and_frames() {
        let (mut ctx, _, draw) = setup();
        assert_eq!(ctx.submit(&frame(draw)), Ok(FrameStatus::Presented));

        assert_eq!(ctx.buffers()[0].floats(), vec![0.0; 9]);
        assert_eq!(ctx.buffers()[1].indices(), vec![0, 1, 2]);
        assert_eq!(ctx.frames().len(), 1);
        assert_eq!(ctx.draw_count(), 1);
    }

    #[test]
    fn missing_uniform_is_rejected() {
        let (mut ctx, _, mut draw) = setup();
        draw.uniforms.pop();
        assert_eq!(
            ctx.submit(&frame(draw)),
            Err(GraphicsError::UnboundUniform("uMVMatrix".into()))
        );
        assert!(ctx.frames().is_empty());
    }

    #[test]
    fn wrong_component_count_is_rejected() {
        let (mut ctx, _, mut draw) = setup();
        draw.attributes[0].components = 4;
        assert!(matches!(
            ctx.submit(&frame(draw)),
            Err(GraphicsError::AttributeComponents { declared: 3, bound: 4, .. })
        ));
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let (mut ctx, _, mut draw) = setup();
        draw.indices.buffer = BufferHandle::new(99);
        assert_eq!(
            ctx.submit(&frame(draw)),
            Err(GraphicsError::UnknownBuffer(BufferHandle::new(99)))
        );

        let (mut ctx, _, mut draw) = setup();
        draw.program = ProgramHandle::new(7);
        assert_eq!(
            ctx.submit(&frame(draw)),
            Err(GraphicsError::UnknownProgram(ProgramHandle::new(7)))
        );
    }

    #[test]
    fn empty_image_cannot_become_a_texture() {
        let mut ctx = RecordingContext::new(SurfaceSize::new(1, 1));
        assert_eq!(
            ctx.create_texture(&RgbaImage::new(0, 4), TextureOptions::bilinear()),
            Err(GraphicsError::EmptyImage)
        );
    }
}
