use cubist_engine::core::{App, AppControl, FrameCtx};
use cubist_engine::graphics::GpuResources;
use cubist_engine::scene::{Scene, SceneStatus};
use cubist_engine::time::FrameStats;

/// Drives the scene from the runtime's frame callback.
pub struct ViewerApp {
    scene: Scene,
    resources: GpuResources,
    stats: FrameStats,
    failure: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            resources: GpuResources::new(),
            stats: FrameStats::default(),
            failure: None,
        }
    }

    /// The error that stopped the loop, if any.
    pub fn into_failure(self) -> Option<anyhow::Error> {
        self.failure
    }
}

impl App for ViewerApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(report) = self.stats.record(&ctx.time) {
            log::debug!(
                "{} frames, {:.1} fps, mean dt {:.2} ms",
                report.frames,
                report.fps,
                report.mean_dt * 1000.0
            );
        }

        let variant = self.scene.variant();
        let mut gfx = ctx.graphics(&mut self.resources);

        match self.scene.frame(&mut gfx) {
            Ok(SceneStatus::Waiting) | Ok(SceneStatus::Drawn(_)) => AppControl::Continue,
            Ok(SceneStatus::Stopped) => AppControl::Exit,
            Err(err) => {
                let err = anyhow::Error::new(err).context(format!("{variant} scene failed"));
                self.failure = Some(err);
                AppControl::Exit
            }
        }
    }
}
