//! Model loader: cube geometry, transform and the device buffers behind them.

pub mod cube;
mod geometry;
mod loader;
mod transform;

pub use geometry::{Geometry, GeometryError, VertexAttributes};
pub use loader::{Model, ModelBuffers, ModelError};
pub use transform::Transform;
