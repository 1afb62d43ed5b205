use std::fmt;

use thiserror::Error;

/// A programmable pipeline stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub(crate) fn naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        })
    }
}

/// Failure while building a shader program or resolving its inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    /// The stage failed to parse or validate. `diagnostic` is the compiler output.
    #[error("{stage} shader failed to compile:\n{diagnostic}")]
    Compile { stage: Stage, diagnostic: String },

    #[error("{stage} shader declares no {stage} entry point")]
    MissingEntryPoint { stage: Stage },

    /// The two stages do not fit together.
    #[error("program link failed: {0}")]
    Link(String),

    #[error("no attribute named `{0}` in the vertex stage")]
    UnknownAttribute(String),

    #[error("no uniform named `{0}` in the program")]
    UnknownUniform(String),

    #[error("attribute `{name}` has {declared} components, {bound} bound")]
    AttributeMismatch {
        name: String,
        declared: u32,
        bound: u32,
    },

    #[error("uniform `{name}` is a {declared}, used as a {expected}")]
    UniformMismatch {
        name: String,
        declared: &'static str,
        expected: &'static str,
    },
}
