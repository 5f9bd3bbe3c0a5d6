use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scroll::{TrackConfig, TriggerSpec};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Scroll", inline)]
#[serde(default)]
/// Scroll tracks and the surface hand-off trigger.
pub struct ScrollOptions {
    /// Tracks registered in order at startup.
    pub tracks: Vec<TrackConfig>,
    /// Point past which the render surface scrolls with the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<TriggerSpec>,
}
