use image::RgbaImage;
use thiserror::Error;

use crate::coords::SurfaceSize;
use crate::shader::ShaderProgram;

use super::{BufferHandle, Frame, ProgramHandle, TextureHandle};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// How a texture is uploaded and sampled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureOptions {
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    /// Upload rows bottom-up, so texture coordinate (0, 0) is the image's
    /// bottom-left corner.
    pub flip_y: bool,
}

impl TextureOptions {
    /// Linear filtering both ways, bottom-left origin.
    pub const fn bilinear() -> Self {
        Self {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            flip_y: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// Surface was unavailable (minimized, lost or timed out); nothing was drawn.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphicsError {
    #[error("unknown program handle {0:?}")]
    UnknownProgram(ProgramHandle),

    #[error("unknown buffer handle {0:?}")]
    UnknownBuffer(BufferHandle),

    #[error("unknown texture handle {0:?}")]
    UnknownTexture(TextureHandle),

    #[error("program cannot be linked on this device: {0}")]
    Link(String),

    #[error("attribute `{0}` has no vertex buffer bound")]
    UnboundAttribute(String),

    #[error("attribute `{name}` expects {declared} components, buffer has {bound}")]
    AttributeComponents {
        name: String,
        declared: u32,
        bound: u32,
    },

    #[error("uniform `{0}` has no value")]
    UnboundUniform(String),

    #[error("uniform `{0}` was given a value of the wrong kind")]
    UniformValue(String),

    #[error("no texture bound to unit {0}")]
    EmptyTextureUnit(u32),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("surface is out of memory")]
    SurfaceOutOfMemory,
}

/// The explicit render context every pipeline operation goes through.
///
/// Resources are created once and addressed by handle afterwards; a frame is
/// submitted as a whole. Implemented by the on-screen wgpu backend and by
/// [`RecordingContext`](super::RecordingContext).
pub trait GraphicsContext {
    /// Current drawable size in physical pixels.
    fn surface_size(&self) -> SurfaceSize;

    /// Turns a built program into a device pipeline.
    fn link_program(&mut self, program: &ShaderProgram) -> Result<ProgramHandle, GraphicsError>;

    /// Creates a buffer with static contents.
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        label: &str,
        contents: &[u8],
    ) -> Result<BufferHandle, GraphicsError>;

    fn create_texture(
        &mut self,
        image: &RgbaImage,
        options: TextureOptions,
    ) -> Result<TextureHandle, GraphicsError>;

    /// Clears, draws and presents one frame.
    fn submit(&mut self, frame: &Frame) -> Result<FrameStatus, GraphicsError>;
}
