use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots, one clock per window.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// report a multi-second frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling frame statistics, reported once per `window` of wall time.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window: Duration,
    started: Option<Instant>,
    frames: u32,
    dt_sum: f32,
}

/// One reporting window's worth of statistics.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub frames: u32,
    pub fps: f32,
    pub mean_dt: f32,
}

impl FrameStats {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            started: None,
            frames: 0,
            dt_sum: 0.0,
        }
    }

    /// Records a frame; returns a report when the window has elapsed.
    pub fn record(&mut self, time: &FrameTime) -> Option<FrameReport> {
        let started = *self.started.get_or_insert(time.now);
        self.frames += 1;
        self.dt_sum += time.dt;

        let elapsed = time.now.saturating_duration_since(started);
        if elapsed < self.window {
            return None;
        }

        let secs = elapsed.as_secs_f32().max(f32::EPSILON);
        let report = FrameReport {
            frames: self.frames,
            fps: self.frames as f32 / secs,
            mean_dt: self.dt_sum / self.frames as f32,
        };

        self.started = Some(time.now);
        self.frames = 0;
        self.dt_sum = 0.0;
        Some(report)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_counts_up_from_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }

    #[test]
    fn dt_is_clamped_after_a_stall() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.tick_at(start + Duration::from_secs(3));
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn dt_has_a_floor() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.tick_at(start);
        assert!(ft.dt > 0.0);
    }

    #[test]
    fn stats_report_once_per_window() {
        let mut clock = FrameClock::new();
        let mut stats = FrameStats::new(Duration::from_millis(100));
        let start = clock.last;

        let mut reports = Vec::new();
        for i in 1..=20u64 {
            let ft = clock.tick_at(start + Duration::from_millis(i * 10));
            if let Some(r) = stats.record(&ft) {
                reports.push(r);
            }
        }

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].frames, 11);
        assert!((reports[0].fps - 110.0).abs() < 1.0);
    }
}
