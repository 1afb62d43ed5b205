/// A vertex + fragment source pair, ready for [`ShaderProgram::build`](super::ShaderProgram::build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSources {
    pub vertex: String,
    pub fragment: String,
}

impl ProgramSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Position only; every fragment is white.
    pub fn plain() -> Self {
        Self::new(
            include_str!("wgsl/plain.vert.wgsl"),
            include_str!("wgsl/plain.frag.wgsl"),
        )
    }

    /// Position + per-vertex RGBA color.
    pub fn colored() -> Self {
        Self::new(
            include_str!("wgsl/colored.vert.wgsl"),
            include_str!("wgsl/colored.frag.wgsl"),
        )
    }

    /// Position + texture coordinates, sampled from `uSampler`.
    pub fn textured() -> Self {
        Self::new(
            include_str!("wgsl/textured.vert.wgsl"),
            include_str!("wgsl/textured.frag.wgsl"),
        )
    }
}
