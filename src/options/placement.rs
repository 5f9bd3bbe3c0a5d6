use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Placement", inline)]
#[serde(default)]
/// Where the centered model is placed in the scene.
pub struct PlacementOptions {
    /// Translation added after the model is centered on the origin.
    pub offset: [f32; 3],
    /// Euler rotation (XYZ, radians) set on the model root.
    pub rotation: [f32; 3],
}
