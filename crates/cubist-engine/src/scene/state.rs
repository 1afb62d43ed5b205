use glam::Vec3;
use thiserror::Error;

use crate::animation::{AnimationDriver, CancelToken, Tick};
use crate::assets::{ImageLoadError, ImageSet, PendingImages};
use crate::graphics::{FrameStatus, GraphicsContext, GraphicsError};
use crate::model::{Model, ModelError, Transform};
use crate::render::{RenderError, Renderer};
use crate::shader::{ShaderError, ShaderProgram};

use super::Variant;

/// Key the textured variant's image is registered under.
pub const TEXTURE_KEY: &str = "texture";

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub variant: Variant,
    /// Where the cube sits in view space.
    pub offset: Vec3,
    pub cancel: CancelToken,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            offset: Vec3::new(0.0, 0.0, -10.0),
            cancel: CancelToken::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("image loading failed")]
    Images(#[from] ImageLoadError),

    #[error("no image was loaded under `{0}`")]
    MissingImage(&'static str),

    #[error("shader program failed to build")]
    Shader(#[from] ShaderError),

    #[error("model setup failed")]
    Model(#[from] ModelError),

    #[error("drawing failed")]
    Render(#[from] RenderError),

    #[error("drawing failed")]
    Graphics(#[from] GraphicsError),

    #[error("scene halted after an earlier startup error")]
    Halted,
}

/// What one call to [`Scene::frame`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SceneStatus {
    /// Images are still loading; nothing was submitted.
    Waiting,
    Drawn(FrameStatus),
    /// The cancel token fired; nothing was submitted.
    Stopped,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Running,
    Halted,
}

struct Cube {
    model: Model,
    renderer: Renderer,
}

enum State {
    Loading(PendingImages),
    /// `None` renders the blank variant.
    Running(Option<Box<Cube>>),
    Halted,
}

/// Startup sequencing plus the per-frame tick and draw.
///
/// Nothing touches the graphics context until the image handle resolves.
/// The first frame after that builds the program, links it, uploads the
/// model and draws; every later frame ticks the driver and draws.
pub struct Scene {
    variant: Variant,
    offset: Vec3,
    driver: AnimationDriver,
    state: State,
}

impl Scene {
    pub fn new(config: SceneConfig, images: PendingImages) -> Self {
        Self {
            variant: config.variant,
            offset: config.offset,
            driver: AnimationDriver::new(config.cancel),
            state: State::Loading(images),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Loading(_) => Phase::Loading,
            State::Running(_) => Phase::Running,
            State::Halted => Phase::Halted,
        }
    }

    /// The cube, once it has been set up.
    pub fn model(&self) -> Option<&Model> {
        match &self.state {
            State::Running(Some(cube)) => Some(&cube.model),
            _ => None,
        }
    }

    pub fn renderer(&self) -> Option<&Renderer> {
        match &self.state {
            State::Running(Some(cube)) => Some(&cube.renderer),
            _ => None,
        }
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    /// Runs one display refresh.
    ///
    /// A startup failure moves the scene to [`Phase::Halted`]; every later
    /// call returns [`SceneError::Halted`].
    pub fn frame<C>(&mut self, ctx: &mut C) -> Result<SceneStatus, SceneError>
    where
        C: GraphicsContext + ?Sized,
    {
        if let State::Loading(pending) = &mut self.state {
            let Some(result) = pending.try_take() else {
                return Ok(SceneStatus::Waiting);
            };
            match result.map_err(SceneError::from).and_then(|images| self.start(ctx, &images)) {
                Ok(cube) => self.state = State::Running(cube),
                Err(err) => {
                    self.state = State::Halted;
                    return Err(err);
                }
            }
        }

        let cube = match &mut self.state {
            State::Running(cube) => cube,
            State::Halted => return Err(SceneError::Halted),
            State::Loading(_) => return Ok(SceneStatus::Waiting),
        };

        match cube {
            Some(cube) => {
                if self.driver.tick(&mut cube.model.transform) == Tick::Stopped {
                    return Ok(SceneStatus::Stopped);
                }
                let status = cube.renderer.draw_frame(ctx, &cube.model)?;
                Ok(SceneStatus::Drawn(status))
            }
            None => {
                if self.driver.cancel_token().is_cancelled() {
                    return Ok(SceneStatus::Stopped);
                }
                Ok(SceneStatus::Drawn(Renderer::clear_frame(ctx)?))
            }
        }
    }

    fn start<C>(&self, ctx: &mut C, images: &ImageSet) -> Result<Option<Box<Cube>>, SceneError>
    where
        C: GraphicsContext + ?Sized,
    {
        let (Some(sources), Some(geometry)) = (self.variant.sources(), self.variant.geometry())
        else {
            log::info!("scene ready: {} (clear only)", self.variant);
            return Ok(None);
        };

        let program = ShaderProgram::build(&sources.vertex, &sources.fragment)?;

        let mut model = Model::new(geometry, Transform::at(self.offset));
        let renderer = Renderer::new(ctx, &program, &model)?;

        let image = if self.variant.needs_texture() {
            Some(
                images
                    .get(TEXTURE_KEY)
                    .ok_or(SceneError::MissingImage(TEXTURE_KEY))?,
            )
        } else {
            None
        };
        model.init(ctx, image)?;

        log::info!("scene ready: {}", self.variant);
        Ok(Some(Box::new(Cube { model, renderer })))
    }
}
