use web_time::{Duration, Instant};

/// Frame interval tracking with a smoothed FPS estimate.
///
/// The render loop is paced by the host (vsync / animation frames), so this
/// only observes intervals; it never throttles.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Timestamp of the previous frame, `None` before the first frame.
    last_frame: Option<Instant>,
    /// Interval between the two most recent frames.
    last_delta: Duration,
    /// Smoothed FPS using exponential moving average.
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0).
    smoothing: f32,
}

impl FrameTiming {
    /// Timer with the default 5% smoothing factor.
    pub fn new() -> Self {
        Self {
            last_frame: None,
            last_delta: Duration::ZERO,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Record a frame at `now` and return the interval since the previous one.
    pub fn record(&mut self, now: Instant) -> Duration {
        let delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        self.last_delta = delta;

        let frame_time = delta.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        delta
    }

    /// Interval between the two most recent frames.
    pub fn last_delta(&self) -> Duration {
        self.last_delta
    }

    /// Current FPS (smoothed).
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_zero_delta() {
        let mut timing = FrameTiming::new();
        assert_eq!(timing.record(Instant::now()), Duration::ZERO);
        assert_eq!(timing.fps(), 60.0);
    }

    #[test]
    fn fps_moves_toward_observed_rate() {
        let mut timing = FrameTiming::new();
        let start = Instant::now();
        for i in 0..200 {
            let _ = timing.record(start + Duration::from_millis(i * 33));
        }
        assert_eq!(timing.last_delta(), Duration::from_millis(33));
        assert!((timing.fps() - 30.3).abs() < 1.0, "fps = {}", timing.fps());
    }
}
