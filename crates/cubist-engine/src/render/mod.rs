//! Renderer: per-frame matrices, input binding and the indexed draw.

mod projection;
mod renderer;

pub use projection::{FrameState, Projection};
pub use renderer::{RenderError, Renderer, TEXTURE_UNIT};
