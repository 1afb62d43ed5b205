//! The unit cube drawn by every variant: 24 vertices (4 per face, so each
//! face can carry its own color and texture coordinates) and 12 triangles.

use super::geometry::{Geometry, VertexAttributes};

const POSITIONS: [[f32; 3]; 24] = [
    // front
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    // back
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    // top
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    // bottom
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    // right
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    // left
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
];

/// One color per face, in face order.
const FACE_COLORS: [[f32; 4]; 6] = [
    [1.0, 0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [1.0, 0.5, 0.5, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
];

const TEX_COORDS: [[f32; 2]; 24] = [
    // front
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
    // back
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
    [0.0, 0.0],
    // top
    [0.0, 1.0],
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    // bottom
    [1.0, 1.0],
    [0.0, 1.0],
    [0.0, 0.0],
    [1.0, 0.0],
    // right
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
    [0.0, 0.0],
    // left
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// Two triangles per face: (0, 1, 2) and (0, 2, 3) of its four vertices.
fn indices() -> Vec<u16> {
    (0..6u16)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b, b + 2, b + 3]
        })
        .collect()
}

fn build(attributes: VertexAttributes) -> Geometry {
    match Geometry::new(POSITIONS.to_vec(), attributes, indices()) {
        Ok(geometry) => geometry,
        Err(err) => unreachable!("built-in cube is malformed: {err}"),
    }
}

/// Positions only.
pub fn plain() -> Geometry {
    build(VertexAttributes::None)
}

/// Each face a solid color.
pub fn colored() -> Geometry {
    let colors = FACE_COLORS
        .iter()
        .flat_map(|&c| std::iter::repeat_n(c, 4))
        .collect();
    build(VertexAttributes::Colors(colors))
}

/// The full image mapped onto every face.
pub fn textured() -> Geometry {
    build(VertexAttributes::TexCoords(TEX_COORDS.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_24_vertices_and_12_triangles() {
        for g in [plain(), colored(), textured()] {
            assert_eq!(g.vertex_count(), 24);
            assert_eq!(g.indices().len(), 36);
            assert_eq!(g.position_floats().len(), 72);
        }
    }

    #[test]
    fn colored_faces_are_uniform() {
        let VertexAttributes::Colors(colors) = colored().attributes().clone() else {
            panic!("colored cube lost its colors");
        };
        for (face, quad) in colors.chunks(4).enumerate() {
            assert!(quad.iter().all(|&c| c == FACE_COLORS[face]));
        }
    }

    #[test]
    fn every_face_spans_the_whole_texture() {
        for quad in TEX_COORDS.chunks(4) {
            let mut corners = quad.to_vec();
            corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(corners, vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
        }
    }
}
