//! Scene, asset and scroll configuration with TOML preset support.
//!
//! One [`Options`] value describes a whole page scene: camera, lights, which
//! asset to load and where to place it, the page sections trigger points
//! refer to, and the scroll tracks. Options serialize to/from TOML for the
//! presets stored in `assets/presets/`. Two profiles are built in:
//! [`Options::page`], the full scroll-driven page, and [`Options::preview`],
//! a single-section scene with the model spinning in place.

mod animation;
mod assets;
mod camera;
mod layout;
mod lighting;
mod placement;
mod scroll;
mod viewport;

use std::path::Path;

pub use animation::AnimationOptions;
pub use assets::AssetOptions;
pub use camera::CameraOptions;
pub use layout::{LayoutOptions, SectionOptions};
pub use lighting::{AmbientLightOptions, DirectionalLightOptions, LightingOptions};
pub use placement::PlacementOptions;
use schemars::JsonSchema;
pub use scroll::ScrollOptions;
use serde::{Deserialize, Serialize};
pub use viewport::ViewportOptions;

use crate::error::EngineError;
use crate::scroll::{
    InterpolationConfig, Property, TrackConfig, TrackEnd, TriggerSpec,
};
use crate::util::easing::EasingFunction;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[placement]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct Options {
    /// Perspective camera.
    pub camera: CameraOptions,
    /// Scene lights.
    pub lighting: LightingOptions,
    /// Surface sizing and clearing.
    pub viewport: ViewportOptions,
    /// Model and texture locations.
    pub assets: AssetOptions,
    /// Model placement after centering.
    pub placement: PlacementOptions,
    /// Procedural animation.
    pub animation: AnimationOptions,
    /// Page sections.
    pub layout: LayoutOptions,
    /// Scroll tracks and surface trigger.
    pub scroll: ScrollOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self::page()
    }
}

impl Options {
    /// Full page profile: model placed off to the right, drifting left and
    /// turning as the page scrolls from the hero section to `about`, with
    /// the surface released at `about`.
    #[must_use]
    pub fn page() -> Self {
        let model_drift = TrackConfig {
            name: "model-drift".to_owned(),
            start: TriggerSpec::on("page1", "top 0%"),
            end: TrackEnd::Point(TriggerSpec::on("about", "top 0")),
            scrub: 0.0,
            pin: false,
            interpolations: vec![
                InterpolationConfig::to(Property::PositionX, -5.0),
                InterpolationConfig::to(Property::RotationY, 1.0),
            ],
        };
        let showreel = TrackConfig {
            name: "showreel".to_owned(),
            start: TriggerSpec::on("showreel", "center center"),
            end: TrackEnd::Relative { relative: 100.0 },
            scrub: 1.0,
            pin: true,
            interpolations: vec![InterpolationConfig::between(
                Property::External("showreel_scale".to_owned()),
                0.5,
                1.0,
            )],
        };
        let about_reveal = TrackConfig {
            name: "about-reveal".to_owned(),
            start: TriggerSpec::on("about", "top 90%"),
            end: TrackEnd::Point(TriggerSpec::on("about", "top 70%")),
            scrub: 1.0,
            pin: false,
            interpolations: vec![InterpolationConfig {
                property: Property::External("about_reveal".to_owned()),
                from: Some(0.0),
                to: 1.0,
                ease: EasingFunction::CubicOut,
            }],
        };

        Self {
            camera: CameraOptions::default(),
            lighting: LightingOptions::default(),
            viewport: ViewportOptions::default(),
            assets: AssetOptions::default(),
            placement: PlacementOptions {
                offset: [3.0, -2.0, 0.0],
                rotation: [0.0, -2.0, 0.0],
            },
            animation: AnimationOptions { idle_spin: false },
            layout: LayoutOptions {
                sections: vec![
                    SectionOptions::new("page1", 1.0),
                    SectionOptions::new("showreel", 1.0),
                    SectionOptions::new("about", 1.5),
                    SectionOptions::new("work", 1.0),
                    SectionOptions::new("contact", 1.0),
                ],
            },
            scroll: ScrollOptions {
                tracks: vec![model_drift, showreel, about_reveal],
                surface: Some(TriggerSpec::on("about", "top 20%")),
            },
        }
    }

    /// Preview profile: the model centered slightly below the origin,
    /// spinning in place, with no scroll tracks.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            placement: PlacementOptions {
                offset: [0.0, -0.5, 0.0],
                rotation: [0.0, 0.0, 0.0],
            },
            animation: AnimationOptions { idle_spin: true },
            layout: LayoutOptions {
                sections: vec![SectionOptions::new("preview", 1.0)],
            },
            scroll: ScrollOptions::default(),
            ..Self::page()
        }
    }

    /// Generate JSON Schema describing the options tree.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Write the JSON Schema to `path`, pretty-printed, for editors that
    /// validate preset files.
    pub fn write_json_schema(path: &Path) -> Result<(), EngineError> {
        let content = serde_json::to_string_pretty(&Self::json_schema())
            .map_err(|e| EngineError::OptionsParse(e.to_string()))?;
        std::fs::write(path, content).map_err(EngineError::Io)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(EngineError::Io)?;
        toml::from_str(&content)
            .map_err(|e| EngineError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EngineError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(EngineError::Io)?;
        }
        std::fs::write(path, content).map_err(EngineError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_round_trips_through_toml() {
        let opts = Options::page();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[placement]
offset = [1.0, 2.0, 3.0]
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.placement.offset, [1.0, 2.0, 3.0]);
        // Placement rotation falls back to the section default, the rest to
        // the page profile.
        assert_eq!(opts.placement.rotation, [0.0, 0.0, 0.0]);
        assert_eq!(opts.camera.fovy, 75.0);
        assert_eq!(opts.scroll.tracks.len(), 3);
    }

    #[test]
    fn preview_differs_only_in_scene_setup() {
        let page = Options::page();
        let preview = Options::preview();
        assert_eq!(preview.camera, page.camera);
        assert_eq!(preview.lighting, page.lighting);
        assert_eq!(preview.assets, page.assets);
        assert!(preview.animation.idle_spin);
        assert!(!page.animation.idle_spin);
        assert!(preview.scroll.tracks.is_empty());
        assert!(preview.scroll.surface.is_none());
    }

    #[test]
    fn tracks_parse_from_toml() {
        let toml_str = r#"
[[scroll.tracks]]
name = "spin"
start = { position = "0" }
end = { relative = 400.0 }
scrub = 0.5

[[scroll.tracks.interpolations]]
property = "rotation_y"
to = 3.14

[[scroll.tracks.interpolations]]
property = { external = "fade" }
from = 1.0
to = 0.0
ease = "quadratic_out"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        let track = &opts.scroll.tracks[0];
        assert_eq!(track.name, "spin");
        assert_eq!(track.end, TrackEnd::Relative { relative: 400.0 });
        assert_eq!(track.interpolations[0].property, Property::RotationY);
        assert_eq!(track.interpolations[0].from, None);
        assert_eq!(
            track.interpolations[1].property,
            Property::External("fade".into())
        );
        assert_eq!(track.interpolations[1].ease, EasingFunction::QuadraticOut);
    }

    #[test]
    fn save_load_and_list_presets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preview.toml");
        Options::preview().save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, Options::preview());
        assert_eq!(
            Options::list_presets(&dir.path().join("nested")),
            vec!["preview".to_owned()]
        );
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "camera = 3").unwrap();
        assert!(matches!(
            Options::load(&path),
            Err(EngineError::OptionsParse(_))
        ));
    }

    #[test]
    fn schema_file_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.schema.json");
        Options::write_json_schema(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["properties"]["scroll"].is_object());
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        for section in
            ["camera", "lighting", "viewport", "assets", "placement", "animation", "layout", "scroll"]
        {
            assert!(props.contains_key(section), "missing {section}");
        }
        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("znear").is_none());
    }

    #[test]
    fn shipped_presets_match_profiles() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/presets");
        assert_eq!(Options::load(&dir.join("page.toml")).unwrap(), Options::page());
        assert_eq!(
            Options::load(&dir.join("preview.toml")).unwrap(),
            Options::preview()
        );
    }
}
