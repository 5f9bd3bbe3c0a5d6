//! Per-frame driver: idle animation, render, failure latch.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error};
use web_time::{Duration, Instant};

use crate::renderer::{RenderFailure, SceneRenderer};
use crate::scene::Scene;
use crate::scroll::{Property, ScrollTimeline};
use crate::util::frame_timing::FrameTiming;

/// What a call to [`RenderLoop::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// A frame was drawn.
    Rendered,
    /// The host asked the loop to stop; nothing was drawn.
    Stopped,
    /// A previous frame failed; the loop no longer draws.
    Halted,
}

/// Cloneable flag the host uses to stop the loop from anywhere.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request that the loop stop before its next frame.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives one frame per host callback (vsync, animation frame) until
/// stopped or until a frame fails.
///
/// A render failure is terminal: the loop logs it, returns it once, and
/// reports [`LoopStatus::Halted`] from then on.
#[derive(Debug, Default)]
pub struct RenderLoop {
    start: Option<Instant>,
    stop: StopHandle,
    halted: bool,
    timing: FrameTiming,
}

impl RenderLoop {
    /// Loop that has not drawn yet. The clock starts on the first frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stops this loop.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether a frame has failed.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Time since the first frame.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.start
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start))
    }

    /// Smoothed frame rate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// Advance to `now` and draw one frame.
    ///
    /// With `idle_spin` set, the model's Y rotation follows elapsed time
    /// (`t mod 2π` radians) unless a scroll track currently drives it.
    pub fn tick<R: SceneRenderer + ?Sized>(
        &mut self,
        now: Instant,
        scene: &mut Scene,
        timeline: &ScrollTimeline,
        idle_spin: bool,
        renderer: &mut R,
    ) -> Result<LoopStatus, RenderFailure> {
        if self.halted {
            return Ok(LoopStatus::Halted);
        }
        if self.stop.is_stopped() {
            return Ok(LoopStatus::Stopped);
        }

        let start = *self.start.get_or_insert(now);
        let _ = self.timing.record(now);

        if idle_spin && !timeline.is_driving(&Property::RotationY) {
            if let Some(model) = scene.model_mut() {
                let t = now.saturating_duration_since(start).as_secs_f32();
                model.transform_mut().rotation.y = t % TAU;
            }
        }

        match renderer.render(scene) {
            Ok(()) => Ok(LoopStatus::Rendered),
            Err(e) => {
                error!("Render loop halted: {e}");
                debug!("Last frame interval {:?}", self.timing.last_delta());
                self.halted = true;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::options::Options;
    use crate::renderer::RecordingRenderer;
    use crate::scene::{box_mesh, Model};
    use crate::scroll::{InterpolationConfig, PageLayout, TrackConfig};

    fn scene_with_model(options: &Options) -> Scene {
        let mut scene = Scene::new(options);
        let _ = scene
            .attach_model(Model::centered(vec![box_mesh(Vec3::splat(-1.0), Vec3::ONE)]))
            .unwrap();
        scene
    }

    fn rotation_y(renderer: &RecordingRenderer, frame: usize) -> f32 {
        renderer.frames()[frame].model.unwrap().rotation.y
    }

    #[test]
    fn idle_spin_follows_elapsed_time() {
        let options = Options::preview();
        let mut scene = scene_with_model(&options);
        let timeline = ScrollTimeline::new();
        let mut renderer = RecordingRenderer::new();
        let mut render_loop = RenderLoop::new();

        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(7);
        for now in [t0, t0 + Duration::from_millis(500), later] {
            let status = render_loop
                .tick(now, &mut scene, &timeline, true, &mut renderer)
                .unwrap();
            assert_eq!(status, LoopStatus::Rendered);
        }

        assert_eq!(rotation_y(&renderer, 0), 0.0);
        assert!((rotation_y(&renderer, 1) - 0.5).abs() < 1e-5);
        assert!((rotation_y(&renderer, 2) - 7.0 % TAU).abs() < 1e-5);
        assert_eq!(render_loop.elapsed(later), Duration::from_secs(7));
    }

    #[test]
    fn idle_spin_yields_to_scroll_track() {
        let options = Options::preview();
        let mut scene = scene_with_model(&options);
        let mut timeline = ScrollTimeline::new();
        timeline
            .register(
                TrackConfig::absolute("turn", 0.0, 100.0)
                    .with(InterpolationConfig::between(Property::RotationY, 0.0, 1.0)),
                &PageLayout::new(720.0),
            )
            .unwrap();
        timeline.on_scroll_position_changed(50.0, scene.model_mut());

        let mut renderer = RecordingRenderer::new();
        let mut render_loop = RenderLoop::new();
        let t0 = Instant::now();
        let _ = render_loop
            .tick(t0, &mut scene, &timeline, true, &mut renderer)
            .unwrap();
        let _ = render_loop
            .tick(t0 + Duration::from_secs(2), &mut scene, &timeline, true, &mut renderer)
            .unwrap();

        assert_eq!(rotation_y(&renderer, 1), 0.5);
    }

    #[test]
    fn halts_after_render_failure() {
        let options = Options::preview();
        let mut scene = Scene::new(&options);
        let timeline = ScrollTimeline::new();
        let mut renderer = RecordingRenderer::failing_after(2);
        let mut render_loop = RenderLoop::new();
        let now = Instant::now();

        let mut tick = |scene: &mut Scene, renderer: &mut RecordingRenderer| {
            render_loop.tick(now, scene, &timeline, false, renderer)
        };
        assert_eq!(tick(&mut scene, &mut renderer), Ok(LoopStatus::Rendered));
        assert_eq!(tick(&mut scene, &mut renderer), Ok(LoopStatus::Rendered));
        assert_eq!(
            tick(&mut scene, &mut renderer),
            Err(RenderFailure::SurfaceLost)
        );
        assert_eq!(tick(&mut scene, &mut renderer), Ok(LoopStatus::Halted));
        assert_eq!(renderer.frames().len(), 2);
    }

    #[test]
    fn stop_handle_stops_before_drawing() {
        let options = Options::preview();
        let mut scene = Scene::new(&options);
        let timeline = ScrollTimeline::new();
        let mut renderer = RecordingRenderer::new();
        let mut render_loop = RenderLoop::new();
        let handle = render_loop.stop_handle();

        handle.clone().stop();
        assert!(handle.is_stopped());
        let status = render_loop
            .tick(Instant::now(), &mut scene, &timeline, false, &mut renderer)
            .unwrap();
        assert_eq!(status, LoopStatus::Stopped);
        assert!(renderer.frames().is_empty());
        assert!(!render_loop.is_halted());
    }
}
