//! Time subsystem.
//!
//! Frame timing utilities, decoupled from the runtime:
//! - one `FrameClock` per window; call `tick()` once per presented frame
//! - `FrameStats` turns the ticks into periodic frame-rate reports

mod frame_clock;

pub use frame_clock::{FrameClock, FrameReport, FrameStats, FrameTime};
