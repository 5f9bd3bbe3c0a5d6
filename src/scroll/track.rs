//! Scroll tracks: one scroll range mapped to progress and on to property
//! values.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::layout::{PageLayout, TrackEnd, TriggerSpec};
use super::ConfigurationError;
use crate::scene::Transform;
use crate::util::easing::EasingFunction;

/// Displayed progress closer than this to the target snaps onto it.
const SETTLE_EPSILON: f32 = 1e-4;

/// A value a track can drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Model root position, X axis.
    PositionX,
    /// Model root position, Y axis.
    PositionY,
    /// Model root position, Z axis.
    PositionZ,
    /// Model root rotation about X (radians).
    RotationX,
    /// Model root rotation about Y (radians).
    RotationY,
    /// Model root rotation about Z (radians).
    RotationZ,
    /// Named value read by an overlay collaborator instead of the model.
    External(String),
}

impl Property {
    /// Current value of a model property; `None` for external values.
    #[must_use]
    pub fn read(&self, transform: &Transform) -> Option<f32> {
        match self {
            Self::PositionX => Some(transform.position.x),
            Self::PositionY => Some(transform.position.y),
            Self::PositionZ => Some(transform.position.z),
            Self::RotationX => Some(transform.rotation.x),
            Self::RotationY => Some(transform.rotation.y),
            Self::RotationZ => Some(transform.rotation.z),
            Self::External(_) => None,
        }
    }

    /// Write a model property. Returns `false` for external values, which do
    /// not live on the model.
    pub fn write(&self, transform: &mut Transform, value: f32) -> bool {
        let slot = match self {
            Self::PositionX => &mut transform.position.x,
            Self::PositionY => &mut transform.position.y,
            Self::PositionZ => &mut transform.position.z,
            Self::RotationX => &mut transform.rotation.x,
            Self::RotationY => &mut transform.rotation.y,
            Self::RotationZ => &mut transform.rotation.z,
            Self::External(_) => return false,
        };
        *slot = value;
        true
    }
}

/// One property interpolation owned by a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InterpolationConfig {
    /// Property being driven.
    pub property: Property,
    /// Value at progress 0. When absent, the model's value at attach time is
    /// used (external values then start at 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f32>,
    /// Value at progress 1.
    pub to: f32,
    /// Curve applied to displayed progress.
    #[serde(default)]
    pub ease: EasingFunction,
}

impl InterpolationConfig {
    /// Linear interpolation from the attach-time value to `to`.
    #[must_use]
    pub fn to(property: Property, to: f32) -> Self {
        Self {
            property,
            from: None,
            to,
            ease: EasingFunction::Linear,
        }
    }

    /// Linear interpolation between two fixed values.
    #[must_use]
    pub fn between(property: Property, from: f32, to: f32) -> Self {
        Self {
            property,
            from: Some(from),
            to,
            ease: EasingFunction::Linear,
        }
    }
}

/// Declarative description of a track, as found in option files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrackConfig {
    /// Unique track name.
    pub name: String,
    /// Where progress 0 is reached.
    pub start: TriggerSpec,
    /// Where progress 1 is reached.
    pub end: TrackEnd,
    /// Smoothing lag between raw and displayed progress. 0 snaps; larger
    /// values follow more slowly (see [`Scrub`]).
    #[serde(default)]
    pub scrub: f32,
    /// Whether this track pins overlay content while active.
    #[serde(default)]
    pub pin: bool,
    /// Values written from displayed progress.
    #[serde(default)]
    pub interpolations: Vec<InterpolationConfig>,
}

impl TrackConfig {
    /// Track over page-absolute offsets `start..end` with instantaneous scrub.
    #[must_use]
    pub fn absolute(name: &str, start: f32, end: f32) -> Self {
        Self {
            name: name.to_owned(),
            start: TriggerSpec::absolute(start),
            end: TrackEnd::Point(TriggerSpec::absolute(end)),
            scrub: 0.0,
            pin: false,
            interpolations: Vec::new(),
        }
    }

    /// Builder-style: add an interpolation.
    #[must_use]
    pub fn with(mut self, interpolation: InterpolationConfig) -> Self {
        self.interpolations.push(interpolation);
        self
    }

    /// Builder-style: set the scrub lag.
    #[must_use]
    pub fn with_scrub(mut self, scrub: f32) -> Self {
        self.scrub = scrub;
        self
    }

    /// Builder-style: mark as a pin track.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }
}

/// Exponential smoothing between raw and displayed progress.
///
/// Each scroll update moves the displayed value by `1 / (1 + lag)` of the
/// remaining distance, so a lag of 0 snaps and a lag of 1 covers half the gap
/// per update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrub {
    lag: f32,
}

impl Scrub {
    /// Snap straight to raw progress.
    pub const INSTANT: Self = Self { lag: 0.0 };

    /// Scrub with the given lag. Negative or non-finite lags are rejected.
    pub fn new(lag: f32, track: &str) -> Result<Self, ConfigurationError> {
        if lag.is_finite() && lag >= 0.0 {
            Ok(Self { lag })
        } else {
            Err(ConfigurationError::InvalidScrub {
                track: track.to_owned(),
                scrub: lag,
            })
        }
    }

    /// Fraction of the remaining gap covered per update.
    #[must_use]
    pub fn coefficient(&self) -> f32 {
        1.0 / (1.0 + self.lag)
    }

    /// Next displayed value moving from `displayed` toward `target`.
    #[must_use]
    pub fn step(&self, displayed: f32, target: f32) -> f32 {
        let next = displayed + (target - displayed) * self.coefficient();
        if (target - next).abs() < SETTLE_EPSILON {
            target
        } else {
            next
        }
    }
}

/// Resolved scroll range in page pixels. Always `end > start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRange {
    start: f32,
    end: f32,
}

impl ScrollRange {
    /// Validate a range.
    pub fn new(start: f32, end: f32, track: &str) -> Result<Self, ConfigurationError> {
        if start.is_finite() && end.is_finite() && end > start {
            Ok(Self { start, end })
        } else {
            Err(ConfigurationError::InvalidRange {
                track: track.to_owned(),
                start,
                end,
            })
        }
    }

    /// Scroll offset where progress is 0.
    #[must_use]
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Scroll offset where progress is 1.
    #[must_use]
    pub fn end(&self) -> f32 {
        self.end
    }

    /// `clamp((position - start) / (end - start), 0, 1)`.
    #[must_use]
    pub fn progress(&self, position: f32) -> f32 {
        ((position - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    /// Whether `position` lies inside the range, boundaries included.
    #[must_use]
    pub fn contains(&self, position: f32) -> bool {
        position >= self.start && position <= self.end
    }

    /// Whether the two ranges share any scroll offset.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Interpolation with its start value fixed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoundInterpolation {
    pub(crate) config: InterpolationConfig,
    pub(crate) from: f32,
}

impl BoundInterpolation {
    pub(crate) fn value(&self, progress: f32) -> f32 {
        let t = self.config.ease.evaluate(progress);
        self.from + (self.config.to - self.from) * t
    }
}

/// Runtime state of a registered track.
#[derive(Debug, Clone)]
pub struct ScrollTrack {
    config: TrackConfig,
    range: ScrollRange,
    scrub: Scrub,
    pub(crate) interpolations: Vec<BoundInterpolation>,
    /// Raw progress from the most recent position.
    target: f32,
    /// Smoothed progress actually written.
    displayed: f32,
    /// Displayed progress at the last write; `None` forces the next write.
    written: Option<f32>,
    /// Whether the most recent position was inside the range.
    active: bool,
}

impl ScrollTrack {
    /// Validate `config` and resolve its range against `layout`.
    pub fn new(config: TrackConfig, layout: &PageLayout) -> Result<Self, ConfigurationError> {
        let scrub = Scrub::new(config.scrub, &config.name)?;
        let range = resolve_range(&config, layout)?;
        let interpolations = config
            .interpolations
            .iter()
            .map(|i| BoundInterpolation {
                from: i.from.unwrap_or(0.0),
                config: i.clone(),
            })
            .collect();
        Ok(Self {
            config,
            range,
            scrub,
            interpolations,
            target: 0.0,
            displayed: 0.0,
            written: None,
            active: false,
        })
    }

    /// Track name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Declarative configuration the track was built from.
    #[must_use]
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// Resolved range.
    #[must_use]
    pub fn range(&self) -> ScrollRange {
        self.range
    }

    /// Raw (target) progress.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.target
    }

    /// Smoothed progress.
    #[must_use]
    pub fn displayed_progress(&self) -> f32 {
        self.displayed
    }

    /// Whether the last position was within the range.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether this is a pin track currently holding its content.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.config.pin && self.active
    }

    /// Whether any interpolation targets `property`.
    #[must_use]
    pub fn targets(&self, property: &Property) -> bool {
        self.interpolations.iter().any(|i| &i.config.property == property)
    }

    /// Advance to a new scroll position. Returns the displayed progress to
    /// write, or `None` when nothing changed since the last write (which is
    /// the case for a track that has settled outside its range).
    pub(crate) fn advance(&mut self, position: f32) -> Option<f32> {
        self.active = self.range.contains(position);
        self.target = self.range.progress(position);
        self.displayed = self.scrub.step(self.displayed, self.target);
        if self.written == Some(self.displayed) {
            return None;
        }
        self.written = Some(self.displayed);
        Some(self.displayed)
    }

    /// Capture attach-time start values for interpolations without `from`.
    pub(crate) fn bind(&mut self, transform: &Transform) {
        for interp in &mut self.interpolations {
            if interp.config.from.is_none() {
                interp.from = interp.config.property.read(transform).unwrap_or(0.0);
            }
        }
        self.written = None;
    }

    /// Re-resolve the range. On failure the previous range stays in effect.
    pub(crate) fn refresh(&mut self, layout: &PageLayout) -> Result<(), ConfigurationError> {
        self.range = resolve_range(&self.config, layout)?;
        self.written = None;
        Ok(())
    }

    /// Record the current displayed progress as written and return it.
    pub(crate) fn take_write(&mut self) -> f32 {
        self.written = Some(self.displayed);
        self.displayed
    }
}

fn resolve_range(config: &TrackConfig, layout: &PageLayout) -> Result<ScrollRange, ConfigurationError> {
    let start = config.start.resolve(layout, &config.name)?;
    let end = config.end.resolve(start, layout, &config.name)?;
    ScrollRange::new(start, end, &config.name)
}
