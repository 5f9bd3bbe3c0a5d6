use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Animation", inline)]
#[serde(default)]
/// Procedural animation outside the scroll timeline.
pub struct AnimationOptions {
    /// Spin the model about Y at one radian per second while no scroll track
    /// is driving its Y rotation.
    #[schemars(title = "Idle Spin")]
    pub idle_spin: bool,
}
