use thiserror::Error;

use crate::graphics::{
    ClearState, DrawCall, Frame, FrameStatus, GraphicsContext, GraphicsError, IndexBinding,
    ProgramHandle, TextureBinding, UniformBinding, UniformValue, VertexBinding,
};
use crate::model::Model;
use crate::shader::{AttributeLocation, ShaderError, ShaderProgram, UniformLocation};

use super::projection::{FrameState, Projection};

/// Texture unit the model's texture is bound to.
pub const TEXTURE_UNIT: u32 = 0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error("model has no device buffers; call Model::init first")]
    Uninitialized,

    #[error("program samples `uSampler` but the model has no texture")]
    MissingTexture,
}

/// Shader inputs resolved once, by name.
#[derive(Debug, Copy, Clone)]
struct ProgramInputs {
    projection: UniformLocation,
    model_view: UniformLocation,
    position: AttributeLocation,
    /// Color or texture-coordinate attribute with its component count.
    extra: Option<(AttributeLocation, u32)>,
    sampler: Option<UniformLocation>,
}

/// Draws one model per frame with a linked program.
#[derive(Debug)]
pub struct Renderer {
    program: ProgramHandle,
    inputs: ProgramInputs,
    projection: Projection,
    clear: ClearState,
    last_frame: Option<FrameState>,
}

impl Renderer {
    /// Resolves the inputs `model` needs from `program` and links it.
    ///
    /// Any name the program does not declare fails here rather than at draw time.
    pub fn new<C>(ctx: &mut C, program: &ShaderProgram, model: &Model) -> Result<Self, RenderError>
    where
        C: GraphicsContext + ?Sized,
    {
        let layout = program.layout();
        let extra_input = model.geometry().attributes().shader_input();

        let inputs = ProgramInputs {
            projection: layout.bind_matrix("uPMatrix")?,
            model_view: layout.bind_matrix("uMVMatrix")?,
            position: layout.bind_attribute("aPos", 3)?,
            extra: extra_input
                .map(|(name, components)| {
                    layout
                        .bind_attribute(name, components)
                        .map(|location| (location, components))
                })
                .transpose()?,
            sampler: match extra_input {
                Some(("aTex", _)) => Some(layout.bind_texture("uSampler")?),
                _ => None,
            },
        };

        let program = ctx.link_program(program)?;

        Ok(Self {
            program,
            inputs,
            projection: Projection::default(),
            clear: ClearState::default(),
            last_frame: None,
        })
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Matrices used by the most recent [`draw_frame`](Self::draw_frame).
    pub fn last_frame_state(&self) -> Option<&FrameState> {
        self.last_frame.as_ref()
    }

    /// Clears and draws `model` at its current transform.
    pub fn draw_frame<C>(&mut self, ctx: &mut C, model: &Model) -> Result<FrameStatus, RenderError>
    where
        C: GraphicsContext + ?Sized,
    {
        let buffers = model.buffers().ok_or(RenderError::Uninitialized)?;

        let viewport = ctx.surface_size();
        let state = FrameState::compute(&self.projection, viewport, &model.transform);

        let mut uniforms = vec![
            UniformBinding {
                location: self.inputs.projection,
                value: UniformValue::Mat4(state.projection),
            },
            UniformBinding {
                location: self.inputs.model_view,
                value: UniformValue::Mat4(state.model_view),
            },
        ];

        let mut attributes = vec![VertexBinding {
            location: self.inputs.position,
            buffer: buffers.positions,
            components: 3,
        }];
        if let (Some((location, components)), Some(buffer)) = (self.inputs.extra, buffers.attributes)
        {
            attributes.push(VertexBinding {
                location,
                buffer,
                components,
            });
        }

        let mut textures = Vec::new();
        if let Some(location) = self.inputs.sampler {
            let texture = buffers.texture.ok_or(RenderError::MissingTexture)?;
            textures.push(TextureBinding {
                unit: TEXTURE_UNIT,
                texture,
            });
            uniforms.push(UniformBinding {
                location,
                value: UniformValue::TextureUnit(TEXTURE_UNIT),
            });
        }

        let frame = Frame {
            viewport,
            clear: self.clear,
            draws: vec![DrawCall {
                program: self.program,
                uniforms,
                attributes,
                textures,
                indices: IndexBinding {
                    buffer: buffers.indices,
                    count: model.index_count(),
                },
            }],
        };

        self.last_frame = Some(state);
        Ok(ctx.submit(&frame)?)
    }

    /// Submits a frame that only clears the surface.
    pub fn clear_frame<C>(ctx: &mut C) -> Result<FrameStatus, GraphicsError>
    where
        C: GraphicsContext + ?Sized,
    {
        let viewport = ctx.surface_size();
        ctx.submit(&Frame {
            viewport,
            clear: ClearState::default(),
            draws: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat3, Vec3, Vec4};
    use image::RgbaImage;

    use super::*;
    use crate::coords::SurfaceSize;
    use crate::graphics::RecordingContext;
    use crate::model::{Transform, cube};
    use crate::shader::ProgramSources;

    fn program(sources: ProgramSources) -> ShaderProgram {
        ShaderProgram::build(&sources.vertex, &sources.fragment).unwrap()
    }

    fn ready(model: &mut Model, image: Option<&RgbaImage>) -> RecordingContext {
        let mut ctx = RecordingContext::new(SurfaceSize::new(800, 600));
        model.init(&mut ctx, image).unwrap();
        ctx
    }

    #[test]
    fn draws_every_index_once_per_frame() {
        let mut model = Model::new(cube::colored(), Transform::at(Vec3::new(0.0, 0.0, -10.0)));
        let mut ctx = ready(&mut model, None);
        let mut renderer = Renderer::new(&mut ctx, &program(ProgramSources::colored()), &model).unwrap();

        assert_eq!(renderer.draw_frame(&mut ctx, &model), Ok(FrameStatus::Presented));

        let frame = ctx.last_frame().unwrap();
        assert_eq!(frame.viewport, SurfaceSize::new(800, 600));
        assert_eq!(frame.clear, ClearState::default());
        assert_eq!(frame.draws.len(), 1);

        let draw = &frame.draws[0];
        assert_eq!(draw.indices.count, 36);
        let components: Vec<u32> = draw.attributes.iter().map(|a| a.components).collect();
        assert_eq!(components, vec![3, 4]);
        assert!(draw.textures.is_empty());
    }

    #[test]
    fn first_frame_without_rotation_is_pure_translation() {
        let mut model = Model::new(cube::plain(), Transform::at(Vec3::new(0.0, 0.0, -10.0)));
        let mut ctx = ready(&mut model, None);
        let mut renderer = Renderer::new(&mut ctx, &program(ProgramSources::plain()), &model).unwrap();
        renderer.draw_frame(&mut ctx, &model).unwrap();

        let mv = renderer.last_frame_state().unwrap().model_view;
        assert_eq!(Mat3::from_mat4(mv), Mat3::IDENTITY);
        assert_eq!(mv.w_axis, Vec4::new(0.0, 0.0, -10.0, 1.0));
    }

    #[test]
    fn textured_draw_binds_unit_zero() {
        let image = RgbaImage::new(2, 2);
        let mut model = Model::new(cube::textured(), Transform::default());
        let mut ctx = ready(&mut model, Some(&image));
        let mut renderer = Renderer::new(&mut ctx, &program(ProgramSources::textured()), &model).unwrap();
        renderer.draw_frame(&mut ctx, &model).unwrap();

        let draw = &ctx.last_frame().unwrap().draws[0];
        assert_eq!(draw.textures.len(), 1);
        assert_eq!(draw.textures[0].unit, TEXTURE_UNIT);
        assert!(draw
            .uniforms
            .iter()
            .any(|u| u.value == UniformValue::TextureUnit(TEXTURE_UNIT)));
    }

    #[test]
    fn mismatched_program_fails_at_construction() {
        let mut model = Model::new(cube::colored(), Transform::default());
        let mut ctx = ready(&mut model, None);
        let err = Renderer::new(&mut ctx, &program(ProgramSources::plain()), &model).unwrap_err();
        assert_eq!(err, RenderError::Shader(ShaderError::UnknownAttribute("aCol".into())));
        assert!(ctx.programs().is_empty());
    }

    #[test]
    fn uninitialized_model_is_rejected() {
        let model = Model::new(cube::plain(), Transform::default());
        let mut ctx = RecordingContext::new(SurfaceSize::new(10, 10));
        let mut renderer = Renderer::new(&mut ctx, &program(ProgramSources::plain()), &model).unwrap();
        assert_eq!(renderer.draw_frame(&mut ctx, &model), Err(RenderError::Uninitialized));
        assert!(ctx.frames().is_empty());
    }

    #[test]
    fn clear_frame_submits_no_draws() {
        let mut ctx = RecordingContext::new(SurfaceSize::new(64, 32));
        assert_eq!(Renderer::clear_frame(&mut ctx), Ok(FrameStatus::Presented));
        assert_eq!(ctx.frames().len(), 1);
        assert_eq!(ctx.draw_count(), 0);
    }

    #[test]
    fn minimized_surface_skips_the_frame() {
        let mut model = Model::new(cube::plain(), Transform::default());
        let mut ctx = ready(&mut model, None);
        let mut renderer = Renderer::new(&mut ctx, &program(ProgramSources::plain()), &model).unwrap();
        ctx.resize(SurfaceSize::new(0, 0));
        assert_eq!(renderer.draw_frame(&mut ctx, &model), Ok(FrameStatus::Skipped));
        assert!(ctx.frames().is_empty());
    }
}
