//! Animation driver: per-refresh rotation with an injectable stop signal.

mod cancel;
mod driver;

pub use cancel::CancelToken;
pub use driver::{AnimationDriver, ROTATION_STEP, Tick};
