//! Scroll position sources.

/// Producer of page scroll positions.
///
/// Only the latest position matters: implementations coalesce any number of
/// changes into one pending value, and consumers poll it once per event-loop
/// turn.
pub trait ScrollSource {
    /// Position reported since the previous poll, if it changed.
    fn poll(&mut self) -> Option<f32>;
}

/// Pixels scrolled per wheel line.
const DEFAULT_LINE_HEIGHT: f32 = 48.0;

/// Wheel and keyboard scrolling over a page of known height, without
/// smoothing physics.
#[derive(Debug, Clone)]
pub struct WheelScroll {
    position: f32,
    max: f32,
    line_height: f32,
    pending: bool,
}

impl WheelScroll {
    /// Source at the top of a page that can scroll `max` pixels.
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self {
            position: 0.0,
            max: max.max(0.0),
            line_height: DEFAULT_LINE_HEIGHT,
            pending: true,
        }
    }

    /// Builder-style: pixels per wheel line.
    #[must_use]
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    /// Update the scroll limit, e.g. after a resize. The position is clamped
    /// into the new limit.
    pub fn set_max(&mut self, max: f32) {
        self.max = max.max(0.0);
        self.scroll_to(self.position);
    }

    /// Wheel movement in lines. Positive `lines` scrolls up the page, matching
    /// winit's `LineDelta` sign.
    pub fn scroll_lines(&mut self, lines: f32) {
        self.scroll_by(-lines * self.line_height);
    }

    /// Move by a pixel delta (positive scrolls down the page).
    pub fn scroll_by(&mut self, pixels: f32) {
        self.scroll_to(self.position + pixels);
    }

    /// Jump to an absolute position, clamped to the page.
    pub fn scroll_to(&mut self, position: f32) {
        let clamped = position.clamp(0.0, self.max);
        if clamped != self.position {
            self.position = clamped;
            self.pending = true;
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> f32 {
        self.position
    }
}

impl ScrollSource for WheelScroll {
    fn poll(&mut self) -> Option<f32> {
        std::mem::take(&mut self.pending).then_some(self.position)
    }
}
