//! Viewport sizing: camera aspect and render-surface dimensions.

use crate::camera::Camera;
use crate::options::ViewportOptions;

/// Render surface dimensions after a resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Logical width in CSS/window pixels.
    pub width: u32,
    /// Logical height in CSS/window pixels.
    pub height: u32,
    /// Device pixel ratio after clamping.
    pub pixel_ratio: f32,
}

impl SurfaceSize {
    /// Backing-store width in physical pixels.
    #[must_use]
    pub fn physical_width(&self) -> u32 {
        physical(self.width, self.pixel_ratio)
    }

    /// Backing-store height in physical pixels.
    #[must_use]
    pub fn physical_height(&self) -> u32 {
        physical(self.height, self.pixel_ratio)
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

fn physical(logical: u32, ratio: f32) -> u32 {
    ((logical as f32 * ratio).round() as u32).max(1)
}

/// Keeps the camera projection and surface size in step with the window.
#[derive(Debug, Clone)]
pub struct ViewportController {
    max_pixel_ratio: f32,
    size: Option<SurfaceSize>,
}

impl ViewportController {
    /// Controller with the configured pixel-ratio cap.
    #[must_use]
    pub fn new(options: &ViewportOptions) -> Self {
        Self {
            max_pixel_ratio: options.max_pixel_ratio.max(1.0),
            size: None,
        }
    }

    /// Apply a window size: update the camera aspect and return the surface
    /// size the renderer should use. Zero dimensions (minimized windows) are
    /// treated as 1 so the aspect stays finite. Repeating a call with the
    /// same arguments yields the same camera and size.
    pub fn resize(
        &mut self,
        camera: &mut Camera,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    ) -> SurfaceSize {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(self.max_pixel_ratio)
        } else {
            1.0
        };
        let size = SurfaceSize {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio: ratio,
        };
        camera.aspect = size.aspect();
        self.size = Some(size);
        size
    }

    /// Size from the most recent resize.
    #[must_use]
    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }
}
