use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assets::ColorSpace;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Assets", inline)]
#[serde(default)]
/// Which model and textures to load, relative to `root`.
pub struct AssetOptions {
    /// Directory (or base URL with the `http` feature) assets resolve against.
    pub root: String,
    /// glTF model path.
    pub model: String,
    /// Color map applied to every mesh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_texture: Option<String>,
    /// Normal map applied to every mesh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<String>,
    /// Color space of the color map.
    pub texture_color_space: ColorSpace,
    /// Color space declared for the normal map. Passed to the GPU as-is;
    /// sRGB matches how the page's assets are authored.
    pub normal_color_space: ColorSpace,
    /// Whether color map rows are flipped vertically on upload. glTF UVs
    /// already put the origin at the top-left, so this is normally off. The
    /// normal map is always uploaded unflipped.
    pub flip_y: bool,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            root: "assets".to_owned(),
            model: "astro/astro.gltf".to_owned(),
            color_texture: Some("astro/A_C_02.jpg".to_owned()),
            normal_texture: Some("astro/A_N_02.jpg".to_owned()),
            texture_color_space: ColorSpace::Srgb,
            normal_color_space: ColorSpace::Srgb,
            flip_y: false,
        }
    }
}
