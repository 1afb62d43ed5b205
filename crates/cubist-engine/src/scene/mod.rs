//! Scene: startup sequencing for one variant of the spinning cube.

mod state;
mod variant;

pub use state::{Phase, Scene, SceneConfig, SceneError, SceneStatus, TEXTURE_KEY};
pub use variant::{UnknownVariant, Variant};
