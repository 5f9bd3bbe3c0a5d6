use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Uniform light applied to every surface regardless of orientation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(inline)]
#[serde(default)]
pub struct AmbientLightOptions {
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Intensity multiplier.
    #[schemars(title = "Ambient", range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub intensity: f32,
}

impl Default for AmbientLightOptions {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

/// Light arriving from a position toward the origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(inline)]
#[serde(default)]
pub struct DirectionalLightOptions {
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Intensity multiplier.
    #[schemars(title = "Key Light", range(min = 0.0, max = 8.0), extend("step" = 0.05))]
    pub intensity: f32,
    /// Light position; the light shines from here toward the origin.
    pub position: [f32; 3],
}

impl Default for DirectionalLightOptions {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 2.0,
            position: [-2.0, 0.0, 0.0],
        }
    }
}

/// Scene lights.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
pub struct LightingOptions {
    /// Ambient term.
    pub ambient: AmbientLightOptions,
    /// Key light.
    pub directional: DirectionalLightOptions,
}
