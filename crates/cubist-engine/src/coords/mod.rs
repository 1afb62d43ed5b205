//! Small value types shared by the device layer and the renderer.

mod color;
mod surface;

pub use color::Color;
pub use surface::SurfaceSize;
