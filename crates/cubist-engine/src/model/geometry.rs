use thiserror::Error;

/// The optional second per-vertex stream.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexAttributes {
    None,
    /// RGBA per vertex.
    Colors(Vec<[f32; 4]>),
    /// UV per vertex, (0, 0) at the image's bottom-left corner.
    TexCoords(Vec<[f32; 2]>),
}

impl VertexAttributes {
    fn len(&self) -> Option<usize> {
        match self {
            VertexAttributes::None => None,
            VertexAttributes::Colors(c) => Some(c.len()),
            VertexAttributes::TexCoords(t) => Some(t.len()),
        }
    }

    /// Shader attribute name and component count of this stream.
    pub fn shader_input(&self) -> Option<(&'static str, u32)> {
        match self {
            VertexAttributes::None => None,
            VertexAttributes::Colors(_) => Some(("aCol", 4)),
            VertexAttributes::TexCoords(_) => Some(("aTex", 2)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },

    #[error("{found} per-vertex attributes for {expected} vertices")]
    AttributeCount { expected: usize, found: usize },

    #[error("{0} vertices cannot be addressed by u16 indices")]
    TooManyVertices(usize),
}

/// Validated triangle-list geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<[f32; 3]>,
    attributes: VertexAttributes,
    indices: Vec<u16>,
}

impl Geometry {
    pub fn new(
        positions: Vec<[f32; 3]>,
        attributes: VertexAttributes,
        indices: Vec<u16>,
    ) -> Result<Self, GeometryError> {
        let vertex_count = positions.len();
        if vertex_count > usize::from(u16::MAX) + 1 {
            return Err(GeometryError::TooManyVertices(vertex_count));
        }
        if indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| usize::from(i) >= vertex_count) {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        if let Some(found) = attributes.len() {
            if found != vertex_count {
                return Err(GeometryError::AttributeCount {
                    expected: vertex_count,
                    found,
                });
            }
        }

        Ok(Self {
            positions,
            attributes,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn attributes(&self) -> &VertexAttributes {
        &self.attributes
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Positions flattened to `x, y, z, x, y, z, ...`.
    pub fn position_floats(&self) -> &[f32] {
        self.positions.as_flattened()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<[f32; 3]> {
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
    }

    #[test]
    fn accepts_a_single_triangle() {
        let g = Geometry::new(triangle(), VertexAttributes::None, vec![0, 1, 2]).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.position_floats().len(), 9);
    }

    #[test]
    fn rejects_partial_triangles() {
        let err = Geometry::new(triangle(), VertexAttributes::None, vec![0, 1]).unwrap_err();
        assert_eq!(err, GeometryError::PartialTriangle(2));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = Geometry::new(triangle(), VertexAttributes::None, vec![0, 1, 3]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn rejects_short_color_stream() {
        let colors = VertexAttributes::Colors(vec![[1.0; 4]; 2]);
        let err = Geometry::new(triangle(), colors, vec![0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::AttributeCount {
                expected: 3,
                found: 2
            }
        );
    }
}
