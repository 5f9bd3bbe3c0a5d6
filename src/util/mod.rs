//! Shared utilities: bounding boxes, easing curves, and frame timing.

pub mod bounds;
pub mod easing;
/// Frame interval measurement for render-loop diagnostics.
pub mod frame_timing;
