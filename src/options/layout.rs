use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One page section, in viewport heights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SectionOptions {
    /// Section name referenced by track triggers.
    pub name: String,
    /// Height as a multiple of the viewport height.
    pub height: f32,
}

impl SectionOptions {
    /// Section with the given name and height.
    #[must_use]
    pub fn new(name: &str, height: f32) -> Self {
        Self {
            name: name.to_owned(),
            height,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Layout", inline)]
#[serde(default)]
/// Page sections stacked top to bottom.
pub struct LayoutOptions {
    /// Sections in page order.
    pub sections: Vec<SectionOptions>,
}
