//! Graphics context wrapper.
//!
//! [`GraphicsContext`] is the one object every pipeline operation goes
//! through: resources are created up front and addressed by handle, frames
//! are submitted whole. [`WgpuContext`] draws to the window;
//! [`RecordingContext`] records calls for headless tests.

mod context;
mod frame;
mod handle;
mod recording;
mod wgpu_backend;

pub use context::{
    BufferKind, FilterMode, FrameStatus, GraphicsContext, GraphicsError, TextureOptions,
};
pub use frame::{
    ClearState, DrawCall, Frame, IndexBinding, TextureBinding, UniformBinding, UniformValue,
    VertexBinding,
};
pub use handle::{BufferHandle, ProgramHandle, TextureHandle};
pub use recording::{RecordedBuffer, RecordedTexture, RecordingContext};
pub use wgpu_backend::{GpuResources, WgpuContext};
