//! Standalone window backed by winit.
//!
//! The window stands in for the page: mouse wheel and paging keys move a
//! [`WheelScroll`] over the configured section layout, and the scene renders
//! onto a transparent surface.
//!
//! ```no_run
//! # use scrollscape::Viewer;
//! Viewer::builder()
//!     .with_asset_root("assets")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use log::{debug, error, info};
use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    assets::AssetPipeline,
    engine::{LoopStatus, SceneEngine},
    error::EngineError,
    gpu::render_context::RenderContext,
    options::Options,
    renderer::GpuRenderer,
    scroll::WheelScroll,
};

/// Fraction of the viewport a page key scrolls.
const PAGE_FRACTION: f32 = 0.9;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    asset_root: Option<String>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            asset_root: None,
            title: "Scrollscape".into(),
        }
    }

    /// Override the default (page) options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Override the asset root from the options: a directory, or a base
    /// URL with the `http` feature.
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        let mut options = self.options.unwrap_or_default();
        if let Some(root) = self.asset_root {
            options.assets.root = root;
        }
        Viewer {
            options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays the scroll-driven scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed or a frame fails.
    ///
    /// # Errors
    ///
    /// Returns the first GPU, configuration or render failure.
    pub fn run(self) -> Result<(), EngineError> {
        let event_loop =
            EventLoop::new().map_err(|e| EngineError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let pipeline = AssetPipeline::for_root(&self.options.assets.root);
        let mut app = ViewerApp {
            window: None,
            engine: None,
            wheel: WheelScroll::new(0.0),
            pipeline,
            options: Some(self.options),
            title: self.title,
            failure: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| EngineError::Viewer(e.to_string()))?;
        app.failure.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<SceneEngine<GpuRenderer>>,
    wheel: WheelScroll,
    pipeline: AssetPipeline,
    options: Option<Options>,
    title: String,
    failure: Option<EngineError>,
}

/// Logical size and device pixel ratio of the window's client area.
fn logical_size(window: &Window) -> (u32, u32, f32) {
    let scale = window.scale_factor();
    let inner = window.inner_size();
    let logical = inner.to_logical::<f64>(scale);
    (
        logical.width.round() as u32,
        logical.height.round() as u32,
        scale as f32,
    )
}

impl ViewerApp {
    fn init(&mut self, window: &Arc<Window>) -> Result<SceneEngine<GpuRenderer>, EngineError> {
        let options = self.options.take().unwrap_or_default();
        let inner = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            Arc::clone(window),
            (inner.width, inner.height),
        ))?;
        let renderer = GpuRenderer::new(context, options.viewport.clear_color);
        let mut engine = SceneEngine::new(options, renderer)?;

        let (width, height, ratio) = logical_size(window);
        let _ = engine.on_resize(width, height, ratio);
        self.wheel.set_max(engine.layout().max_scroll());
        engine.start_load(&self.pipeline)?;
        Ok(engine)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: EngineError) {
        error!("{e}");
        self.failure = Some(e);
        event_loop.exit();
    }

    fn resize(&mut self) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine) else {
            return;
        };
        let (width, height, ratio) = logical_size(window);
        let size = engine.on_resize(width, height, ratio);
        debug!("Resized to {}x{} @{}", size.width, size.height, size.pixel_ratio);
        self.wheel.set_max(engine.layout().max_scroll());
    }

    fn handle_key(&mut self, code: KeyCode) {
        let page = self
            .engine
            .as_ref()
            .map_or(0.0, |e| e.layout().viewport_height() * PAGE_FRACTION);
        match code {
            KeyCode::ArrowDown => self.wheel.scroll_lines(-1.0),
            KeyCode::ArrowUp => self.wheel.scroll_lines(1.0),
            KeyCode::PageDown | KeyCode::Space => self.wheel.scroll_by(page),
            KeyCode::PageUp => self.wheel.scroll_by(-page),
            KeyCode::Home => self.wheel.scroll_to(0.0),
            KeyCode::End => self.wheel.scroll_to(f32::MAX),
            _ => return,
        }
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        if let Some(Err(e)) = engine.poll_assets() {
            // The scene keeps rendering without a model.
            error!("Continuing without a model: {e}");
        }
        let scrolled = engine.pull_scroll(&mut self.wheel);
        if !scrolled {
            // Let scrubbed tracks catch up with the last position.
            let _ = engine.settle();
        }
        if scrolled {
            for transition in engine.drain_surface_events() {
                info!("Surface {transition:?}");
            }
            debug!(
                "scroll {:?}: showreel_scale={:?} pinned={} about_reveal={:?}",
                engine.timeline().position(),
                engine.track_value("showreel_scale"),
                engine.pinned("showreel"),
                engine.track_value("about_reveal"),
            );
        }

        match engine.frame(Instant::now()) {
            Ok(LoopStatus::Rendered) => {}
            Ok(LoopStatus::Stopped | LoopStatus::Halted) => {
                event_loop.exit();
                return;
            }
            Err(e) => {
                self.fail(event_loop, EngineError::Render(e));
                return;
            }
        }

        // Keep drawing while something animates on its own.
        let animating = engine.options().animation.idle_spin
            || engine.is_loading()
            || engine.timeline().is_settling();
        if animating {
            if let Some(w) = &self.window {
                w.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self
            .options
            .as_ref()
            .map_or((1280, 720), |o| (o.viewport.width, o.viewport.height));
        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_transparent(true)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, EngineError::Viewer(e.to_string()));
                return;
            }
        };

        match self.init(&window) {
            Ok(engine) => {
                window.request_redraw();
                self.window = Some(window);
                self.engine = Some(engine);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(engine) = &self.engine {
                engine.stop_handle().stop();
            }
            event_loop.exit();
            return;
        }

        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            WindowEvent::MouseWheel { delta, .. } => {
                match delta {
                    MouseScrollDelta::LineDelta(_, y) => self.wheel.scroll_lines(y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        let ratio = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                        self.wheel.scroll_by(-(pos.y / ratio) as f32);
                    }
                }
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code);
                }
            }

            _ => (),
        }
    }
}

