use image::RgbaImage;
use thiserror::Error;

use crate::graphics::{
    BufferHandle, BufferKind, GraphicsContext, GraphicsError, TextureHandle, TextureOptions,
};

use super::geometry::{Geometry, VertexAttributes};
use super::transform::Transform;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model buffers were already created")]
    AlreadyInitialized,

    #[error("textured model initialized without an image")]
    MissingTexture,

    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}

/// Device objects backing a model. Created by [`Model::init`], never rewritten.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ModelBuffers {
    pub positions: BufferHandle,
    /// Colors or texture coordinates, when the geometry has them.
    pub attributes: Option<BufferHandle>,
    pub indices: BufferHandle,
    pub texture: Option<TextureHandle>,
}

/// Geometry plus transform, with device buffers once initialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    geometry: Geometry,
    pub transform: Transform,
    buffers: Option<ModelBuffers>,
}

impl Model {
    pub fn new(geometry: Geometry, transform: Transform) -> Self {
        Self {
            geometry,
            transform,
            buffers: None,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn buffers(&self) -> Option<&ModelBuffers> {
        self.buffers.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn index_count(&self) -> u32 {
        u32::try_from(self.geometry.indices().len()).unwrap_or(u32::MAX)
    }

    /// Uploads the geometry (and the texture, for textured geometry) once.
    ///
    /// `texture_image` is required when the geometry carries texture
    /// coordinates and ignored otherwise.
    pub fn init<C>(&mut self, ctx: &mut C, texture_image: Option<&RgbaImage>) -> Result<(), ModelError>
    where
        C: GraphicsContext + ?Sized,
    {
        if self.buffers.is_some() {
            return Err(ModelError::AlreadyInitialized);
        }

        let textured = matches!(self.geometry.attributes(), VertexAttributes::TexCoords(_));
        let image = match (textured, texture_image) {
            (true, None) => return Err(ModelError::MissingTexture),
            (true, Some(image)) => Some(image),
            (false, _) => None,
        };

        let positions = ctx.create_buffer(
            BufferKind::Vertex,
            "cube positions",
            bytemuck::cast_slice(self.geometry.position_floats()),
        )?;

        let indices = ctx.create_buffer(
            BufferKind::Index,
            "cube indices",
            bytemuck::cast_slice(self.geometry.indices()),
        )?;

        let attributes = match self.geometry.attributes() {
            VertexAttributes::None => None,
            VertexAttributes::Colors(colors) => Some(ctx.create_buffer(
                BufferKind::Vertex,
                "cube colors",
                bytemuck::cast_slice(colors.as_flattened()),
            )?),
            VertexAttributes::TexCoords(coords) => Some(ctx.create_buffer(
                BufferKind::Vertex,
                "cube texture coords",
                bytemuck::cast_slice(coords.as_flattened()),
            )?),
        };

        let texture = match image {
            Some(image) => Some(ctx.create_texture(image, TextureOptions::bilinear())?),
            None => None,
        };

        log::debug!(
            "model initialized: {} vertices, {} indices, texture: {}",
            self.geometry.vertex_count(),
            self.geometry.indices().len(),
            texture.is_some()
        );

        self.buffers = Some(ModelBuffers {
            positions,
            attributes,
            indices,
            texture,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::coords::SurfaceSize;
    use crate::graphics::RecordingContext;
    use crate::model::cube;

    fn ctx() -> RecordingContext {
        RecordingContext::new(SurfaceSize::new(800, 600))
    }

    #[test]
    fn colored_cube_uploads_three_buffers() {
        let mut ctx = ctx();
        let mut model = Model::new(cube::colored(), Transform::default());
        model.init(&mut ctx, None).unwrap();

        let buffers = model.buffers().copied().unwrap();
        assert_eq!(ctx.buffers().len(), 3);
        assert!(ctx.textures().is_empty());

        let positions = ctx.buffer(buffers.positions).unwrap();
        assert_eq!(positions.kind, BufferKind::Vertex);
        assert_eq!(positions.floats().len(), 72);

        let colors = ctx.buffer(buffers.attributes.unwrap()).unwrap();
        assert_eq!(colors.floats().len(), 24 * 4);

        let indices = ctx.buffer(buffers.indices).unwrap();
        assert_eq!(indices.kind, BufferKind::Index);
        assert_eq!(indices.indices(), cube::colored().indices());
    }

    #[test]
    fn textured_cube_requires_an_image() {
        let mut ctx = ctx();
        let mut model = Model::new(cube::textured(), Transform::default());
        assert_eq!(model.init(&mut ctx, None), Err(ModelError::MissingTexture));
        assert!(ctx.buffers().is_empty());
        assert!(!model.is_initialized());
    }

    #[test]
    fn textured_cube_uploads_flipped_bilinear_texture() {
        let mut ctx = ctx();
        let image = RgbaImage::new(4, 2);
        let mut model = Model::new(cube::textured(), Transform::default());
        model.init(&mut ctx, Some(&image)).unwrap();

        assert_eq!(ctx.textures().len(), 1);
        let texture = &ctx.textures()[0];
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.options, TextureOptions::bilinear());
        assert!(texture.options.flip_y);
    }

    #[test]
    fn second_init_is_rejected_and_uploads_nothing() {
        let mut ctx = ctx();
        let mut model = Model::new(cube::plain(), Transform::at(Vec3::new(0.0, 0.0, -10.0)));
        model.init(&mut ctx, None).unwrap();
        let uploaded = ctx.buffers().len();

        assert_eq!(model.init(&mut ctx, None), Err(ModelError::AlreadyInitialized));
        assert_eq!(ctx.buffers().len(), uploaded);
    }
}
