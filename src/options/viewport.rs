use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Viewport", inline)]
#[serde(default)]
/// Render surface sizing and clearing.
pub struct ViewportOptions {
    /// Upper bound on the device pixel ratio used for the backing store.
    #[schemars(title = "Max Pixel Ratio", range(min = 1.0, max = 4.0), extend("step" = 0.5))]
    pub max_pixel_ratio: f32,
    /// Clear color (RGBA, premultiplied). Transparent so page content
    /// behind the surface shows through.
    pub clear_color: [f32; 4],
    /// Initial window width in logical pixels (native viewer only).
    #[schemars(skip)]
    pub width: u32,
    /// Initial window height in logical pixels (native viewer only).
    #[schemars(skip)]
    pub height: u32,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            width: 1280,
            height: 720,
        }
    }
}
