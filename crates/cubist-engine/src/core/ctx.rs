use winit::window::Window;

use crate::animation::CancelToken;
use crate::device::Gpu;
use crate::graphics::{GpuResources, WgpuContext};
use crate::time::FrameTime;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub cancel: &'a CancelToken,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Graphics context for this frame over the app's long-lived `resources`.
    pub fn graphics<'s>(&'s mut self, resources: &'s mut GpuResources) -> WgpuContext<'s, 'w> {
        WgpuContext::new(self.window, self.gpu, resources)
    }
}
