//! Scene engine: owns the scene and every controller that mutates it.
//!
//! One [`SceneEngine`] ties the pieces together on the host's event loop:
//!
//! - the asset pipeline fills the scene's model slot when a load completes
//!   ([`poll_assets`](SceneEngine::poll_assets)),
//! - scroll positions drive the timeline and the surface FSM in the same
//!   batch ([`on_scroll`](SceneEngine::on_scroll)),
//! - window resizes update the camera, the renderer and every
//!   layout-derived scroll range ([`on_resize`](SceneEngine::on_resize)),
//! - the render loop draws one frame per host tick
//!   ([`frame`](SceneEngine::frame)).
//!
//! All of these run on one thread, so a frame always sees a consistent
//! scene.

/// Frame driver, idle animation and stop handle.
pub mod render_loop;

use log::{info, warn};
use web_time::Instant;

pub use self::render_loop::{LoopStatus, RenderLoop, StopHandle};
use crate::assets::{AssetPipeline, AssetRequest, PendingModel};
use crate::error::EngineError;
use crate::options::Options;
use crate::renderer::{RenderFailure, SceneRenderer};
use crate::scene::{Model, Scene};
use crate::scroll::{
    PageLayout, ScrollSource, ScrollTimeline, SurfacePositionFsm, SurfaceState,
    SurfaceTransition,
};
use crate::viewport::{SurfaceSize, ViewportController};

/// The scene plus the controllers that drive it, generic over the renderer.
#[derive(Debug)]
pub struct SceneEngine<R: SceneRenderer> {
    options: Options,
    scene: Scene,
    viewport: ViewportController,
    layout: PageLayout,
    timeline: ScrollTimeline,
    surface: Option<SurfacePositionFsm>,
    surface_events: Vec<SurfaceTransition>,
    pending: Option<PendingModel>,
    render_loop: RenderLoop,
    renderer: R,
}

impl<R: SceneRenderer> SceneEngine<R> {
    /// Build the scene from `options` and register every configured scroll
    /// track against a layout for the configured window size.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if a track or the surface
    /// trigger is invalid for that layout.
    pub fn new(options: Options, mut renderer: R) -> Result<Self, EngineError> {
        let mut scene = Scene::new(&options);
        let mut viewport = ViewportController::new(&options.viewport);
        let size = viewport.resize(
            scene.camera_mut(),
            options.viewport.width,
            options.viewport.height,
            1.0,
        );
        renderer.resize(size);

        let layout = PageLayout::stacked(size.height as f32, &options.layout.sections);
        let mut timeline = ScrollTimeline::new();
        for track in &options.scroll.tracks {
            timeline.register(track.clone(), &layout)?;
        }
        let surface = options
            .scroll
            .surface
            .clone()
            .map(|trigger| SurfacePositionFsm::from_trigger(trigger, &layout))
            .transpose()?;

        info!(
            "Scene engine ready: {} scroll tracks, surface threshold {:?}",
            timeline.len(),
            surface.as_ref().map(SurfacePositionFsm::threshold)
        );
        Ok(Self {
            options,
            scene,
            viewport,
            layout,
            timeline,
            surface,
            surface_events: Vec::new(),
            pending: None,
            render_loop: RenderLoop::new(),
            renderer,
        })
    }

    // -- Assets --

    /// Start loading the configured model in the background.
    ///
    /// # Errors
    ///
    /// Fails if a model is already attached or the loader thread cannot be
    /// spawned.
    pub fn start_load(&mut self, pipeline: &AssetPipeline) -> Result<(), EngineError> {
        if self.scene.has_model() {
            return Err(EngineError::ModelAlreadyAttached);
        }
        let request = AssetRequest::from_options(&self.options);
        self.pending = Some(pipeline.load(request)?);
        Ok(())
    }

    /// Whether a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Attach the model if the background load has completed. Returns
    /// `None` while nothing has completed, and the load outcome exactly
    /// once.
    pub fn poll_assets(&mut self) -> Option<Result<(), EngineError>> {
        let result = self.pending.as_mut()?.try_take()?;
        self.pending = None;
        Some(result.map_err(EngineError::from).and_then(|model| self.attach_model(model)))
    }

    /// Attach a loaded model and bring it up to the current scroll state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ModelAlreadyAttached`] on a second model.
    pub fn attach_model(&mut self, model: Model) -> Result<(), EngineError> {
        let model = self.scene.attach_model(model)?;
        self.timeline.bind(model);
        self.timeline.apply(model);
        info!("Model attached ({} meshes)", model.meshes().len());
        Ok(())
    }

    // -- Scroll --

    /// Feed a scroll position to the timeline and the surface FSM.
    pub fn on_scroll(&mut self, position: f32) {
        self.timeline
            .on_scroll_position_changed(position, self.scene.model_mut());
        if let Some(transition) = self.surface.as_mut().and_then(|fsm| fsm.update(position)) {
            self.surface_events.push(transition);
        }
    }

    /// Poll `source` and apply its position if it changed. Returns whether
    /// it did.
    pub fn pull_scroll(&mut self, source: &mut impl ScrollSource) -> bool {
        source.poll().is_some_and(|position| {
            self.on_scroll(position);
            true
        })
    }

    /// Step scrubbed tracks toward their targets without a new position.
    /// Hosts call this once per frame in which the scroll source was quiet.
    /// Returns whether any track still lags.
    pub fn settle(&mut self) -> bool {
        self.timeline.settle(self.scene.model_mut())
    }

    /// Surface transitions since the previous call, oldest first.
    pub fn drain_surface_events(&mut self) -> Vec<SurfaceTransition> {
        std::mem::take(&mut self.surface_events)
    }

    /// Current surface mode, if a surface trigger is configured.
    #[must_use]
    pub fn surface_state(&self) -> Option<SurfaceState> {
        self.surface.as_ref().map(SurfacePositionFsm::state)
    }

    /// Latest value written to a named external property.
    #[must_use]
    pub fn track_value(&self, name: &str) -> Option<f32> {
        self.timeline.value(name)
    }

    /// Whether a pinned track is holding its section in place.
    #[must_use]
    pub fn pinned(&self, name: &str) -> bool {
        self.timeline.pinned(name)
    }

    // -- Viewport --

    /// Apply a window size. Updates the camera and renderer, rebuilds the
    /// page layout and re-resolves every scroll range against it. Ranges
    /// that no longer resolve keep their previous values.
    pub fn on_resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> SurfaceSize {
        let size = self
            .viewport
            .resize(self.scene.camera_mut(), width, height, device_pixel_ratio);
        self.renderer.resize(size);

        self.layout = PageLayout::stacked(size.height as f32, &self.options.layout.sections);
        if let Err(e) = self.timeline.refresh(&self.layout) {
            warn!("Scroll ranges partly stale after resize: {e}");
        }
        if let Some(fsm) = &mut self.surface {
            if let Err(e) = fsm.refresh(&self.layout) {
                warn!("Surface threshold stale after resize: {e}");
            }
        }
        if let Some(position) = self.timeline.position() {
            self.on_scroll(position);
        }
        size
    }

    /// Current page layout.
    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    // -- Frames --

    /// Draw one frame at `now`. See [`RenderLoop::tick`].
    pub fn frame(&mut self, now: Instant) -> Result<LoopStatus, RenderFailure> {
        self.render_loop.tick(
            now,
            &mut self.scene,
            &self.timeline,
            self.options.animation.idle_spin,
            &mut self.renderer,
        )
    }

    /// Handle that stops the render loop.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.render_loop.stop_handle()
    }

    /// The render loop.
    #[must_use]
    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    // -- Accessors --

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scroll timeline.
    #[must_use]
    pub fn timeline(&self) -> &ScrollTimeline {
        &self.timeline
    }

    /// The options the engine was built with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
