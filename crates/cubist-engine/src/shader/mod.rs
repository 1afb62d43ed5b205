//! Shader program builder.
//!
//! Stages are WGSL. Each stage is parsed and validated with naga, its
//! interface reflected, and the pair linked by checking that every fragment
//! input is written by the vertex stage and that shared bindings agree.
//! Attribute and uniform names resolve by exact match and fail fast.

mod error;
mod program;
mod reflect;
mod sources;

pub use error::{ShaderError, Stage};
pub use program::{
    AttributeLocation, AttributeSlot, ProgramLayout, ShaderProgram, StageSet, StageSource,
    UniformKind, UniformLocation, UniformSlot,
};
pub use sources::ProgramSources;
