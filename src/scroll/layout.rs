//! Page layout and trigger-point resolution.
//!
//! Scroll ranges are authored relative to page sections ("when the top of
//! `about` reaches 20% down the viewport") and resolved here to absolute
//! scroll offsets in pixels. A [`PageLayout`] is a snapshot of where each
//! section sits; it changes whenever the viewport resizes, at which point
//! every range is resolved again.

use rustc_hash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigurationError;
use crate::options::SectionOptions;

/// Vertical extent of one named page section, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Offset of the section's top edge from the top of the page.
    pub top: f32,
    /// Section height.
    pub height: f32,
}

/// Snapshot of section positions plus the viewport height they were measured
/// against.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    viewport_height: f32,
    page_height: f32,
    anchors: FxHashMap<String, Anchor>,
}

impl PageLayout {
    /// Empty layout for a viewport of the given height. Only page-absolute
    /// trigger points resolve against it until sections are added.
    #[must_use]
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            page_height: viewport_height,
            anchors: FxHashMap::default(),
        }
    }

    /// Sections stacked top to bottom, each `height` viewport-heights tall.
    #[must_use]
    pub fn stacked(viewport_height: f32, sections: &[SectionOptions]) -> Self {
        let mut layout = Self::new(viewport_height);
        let mut top = 0.0;
        for section in sections {
            let height = section.height * viewport_height;
            layout.insert(&section.name, Anchor { top, height });
            top += height;
        }
        layout.page_height = top.max(viewport_height);
        layout
    }

    /// Add or replace a section.
    pub fn insert(&mut self, name: &str, anchor: Anchor) {
        let bottom = anchor.top + anchor.height;
        let _ = self.anchors.insert(name.to_owned(), anchor);
        self.page_height = self.page_height.max(bottom);
    }

    /// Section by name.
    #[must_use]
    pub fn anchor(&self, name: &str) -> Option<Anchor> {
        self.anchors.get(name).copied()
    }

    /// Viewport height the layout was measured against.
    #[must_use]
    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Total page height.
    #[must_use]
    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f32 {
        (self.page_height - self.viewport_height).max(0.0)
    }
}

/// A point on the page where a range starts or ends.
///
/// `position` holds two edge keywords: the first locates a line on the
/// trigger section, the second a line on the viewport. The resolved scroll
/// offset is the one at which those two lines coincide. Each keyword is
/// `top`, `center`, `bottom`, a percentage (`20%`) or a pixel length (`40px`
/// or bare `40`). A missing viewport keyword means the viewport top.
///
/// Without a `trigger` the point is page-absolute: `position = "150"`
/// resolves to scroll offset 150.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TriggerSpec {
    /// Section the first keyword refers to; `None` for page-absolute points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// Edge keywords, e.g. `"top 20%"` or `"center center"`.
    pub position: String,
}

impl TriggerSpec {
    /// Point on a named section.
    #[must_use]
    pub fn on(trigger: &str, position: &str) -> Self {
        Self {
            trigger: Some(trigger.to_owned()),
            position: position.to_owned(),
        }
    }

    /// Page-absolute scroll offset.
    #[must_use]
    pub fn absolute(offset: f32) -> Self {
        Self {
            trigger: None,
            position: format!("{offset}px"),
        }
    }

    /// Resolve to a scroll offset. `owner` names the track or trigger being
    /// resolved and is only used in error reports.
    pub fn resolve(
        &self,
        layout: &PageLayout,
        owner: &str,
    ) -> Result<f32, ConfigurationError> {
        let anchor = match &self.trigger {
            Some(name) => layout.anchor(name).ok_or_else(|| {
                ConfigurationError::UnknownTrigger {
                    track: owner.to_owned(),
                    trigger: name.clone(),
                }
            })?,
            None => Anchor {
                top: 0.0,
                height: 0.0,
            },
        };

        let invalid = || ConfigurationError::InvalidPosition {
            track: owner.to_owned(),
            position: self.position.clone(),
        };

        let mut words = self.position.split_whitespace();
        let element = words.next().ok_or_else(invalid)?;
        let viewport = words.next().unwrap_or("top");
        if words.next().is_some() {
            return Err(invalid());
        }

        let element_edge = edge_offset(element, anchor.height).ok_or_else(invalid)?;
        let viewport_edge =
            edge_offset(viewport, layout.viewport_height).ok_or_else(invalid)?;
        Ok(anchor.top + element_edge - viewport_edge)
    }
}

/// Where a range ends: another trigger point, or a distance past the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TrackEnd {
    /// Fixed distance in pixels after the resolved start.
    Relative {
        /// Range length in pixels.
        relative: f32,
    },
    /// Independent trigger point, possibly on a different section than the
    /// start.
    Point(TriggerSpec),
}

impl TrackEnd {
    /// Resolve to a scroll offset given the already-resolved start.
    pub fn resolve(
        &self,
        start: f32,
        layout: &PageLayout,
        owner: &str,
    ) -> Result<f32, ConfigurationError> {
        match self {
            Self::Relative { relative } => Ok(start + relative),
            Self::Point(point) => point.resolve(layout, owner),
        }
    }
}

/// Offset of an edge keyword within a box of `extent` pixels.
fn edge_offset(word: &str, extent: f32) -> Option<f32> {
    let offset = match word {
        "top" => 0.0,
        "center" => extent * 0.5,
        "bottom" => extent,
        _ => {
            if let Some(pct) = word.strip_suffix('%') {
                extent * pct.parse::<f32>().ok()? / 100.0
            } else {
                word.strip_suffix("px").unwrap_or(word).parse::<f32>().ok()?
            }
        }
    };
    offset.is_finite().then_some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(vh: f32) -> PageLayout {
        PageLayout::stacked(
            vh,
            &[
                SectionOptions::new("page1", 1.0),
                SectionOptions::new("showreel", 1.0),
                SectionOptions::new("about", 1.5),
            ],
        )
    }

    #[test]
    fn stacked_sections_accumulate() {
        let layout = page(800.0);
        assert_eq!(layout.anchor("page1").unwrap().top, 0.0);
        assert_eq!(layout.anchor("showreel").unwrap().top, 800.0);
        assert_eq!(layout.anchor("about").unwrap().top, 1600.0);
        assert_eq!(layout.page_height(), 2800.0);
        assert_eq!(layout.max_scroll(), 2000.0);
    }

    #[test]
    fn top_percent_subtracts_viewport_fraction() {
        let layout = page(800.0);
        let at = TriggerSpec::on("about", "top 20%").resolve(&layout, "t").unwrap();
        assert!((at - (1600.0 - 160.0)).abs() < 1e-3);
    }

    #[test]
    fn center_center_aligns_midlines() {
        let layout = page(800.0);
        let at = TriggerSpec::on("showreel", "center center")
            .resolve(&layout, "t")
            .unwrap();
        assert!((at - 800.0).abs() < 1e-3);
    }

    #[test]
    fn single_keyword_defaults_to_viewport_top() {
        let layout = page(800.0);
        let a = TriggerSpec::on("about", "top").resolve(&layout, "t").unwrap();
        let b = TriggerSpec::on("about", "top 0").resolve(&layout, "t").unwrap();
        assert_eq!(a, 1600.0);
        assert_eq!(a, b);
    }

    #[test]
    fn absolute_points_ignore_sections() {
        let layout = PageLayout::new(600.0);
        assert_eq!(TriggerSpec::absolute(150.0).resolve(&layout, "t").unwrap(), 150.0);
        assert_eq!(TriggerSpec::absolute(-10.0).resolve(&layout, "t").unwrap(), -10.0);
    }

    #[test]
    fn relative_end_adds_to_start() {
        let layout = page(800.0);
        let end = TrackEnd::Relative { relative: 100.0 };
        assert_eq!(end.resolve(800.0, &layout, "t").unwrap(), 900.0);
    }

    #[test]
    fn unknown_trigger_is_rejected() {
        let layout = page(800.0);
        let err = TriggerSpec::on("footer", "top top").resolve(&layout, "slide");
        assert!(matches!(
            err,
            Err(ConfigurationError::UnknownTrigger { ref trigger, .. }) if trigger == "footer"
        ));
    }

    #[test]
    fn malformed_positions_are_rejected() {
        let layout = page(800.0);
        for bad in ["", "top middle", "top 20% extra", "nan%"] {
            let err = TriggerSpec::on("about", bad).resolve(&layout, "t");
            assert!(
                matches!(err, Err(ConfigurationError::InvalidPosition { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn track_end_deserializes_both_shapes() {
        #[derive(Deserialize)]
        struct Wrapper {
            a: TrackEnd,
            b: TrackEnd,
        }
        let w: Wrapper = toml::from_str(
            r#"
a = { relative = 100.0 }
b = { trigger = "about", position = "top 0" }
"#,
        )
        .unwrap();
        assert_eq!(w.a, TrackEnd::Relative { relative: 100.0 });
        assert_eq!(w.b, TrackEnd::Point(TriggerSpec::on("about", "top 0")));
    }
}
