//! Scroll-driven animation.
//!
//! The host reports scroll offsets through a [`ScrollSource`](input); the
//! [`ScrollTimeline`] turns each offset into per-track progress and writes
//! interpolated values onto the model, and the [`SurfacePositionFsm`] flips
//! the render surface between fixed and absolute positioning once the page
//! scrolls past a threshold.

use std::fmt;

pub mod input;
pub mod layout;
pub mod surface;
pub mod timeline;
pub mod track;

pub use input::{ScrollSource, WheelScroll};
pub use layout::{Anchor, PageLayout, TrackEnd, TriggerSpec};
pub use surface::{SurfacePositionFsm, SurfaceState, SurfaceTransition};
pub use timeline::ScrollTimeline;
pub use track::{
    InterpolationConfig, Property, Scrub, ScrollRange, ScrollTrack,
    TrackConfig,
};

/// Invalid scroll configuration. Raised when a track or trigger is
/// registered, or when a layout change makes a range unresolvable.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Resolved range is empty, inverted or not finite.
    InvalidRange {
        /// Track name.
        track: String,
        /// Resolved start offset.
        start: f32,
        /// Resolved end offset.
        end: f32,
    },
    /// Two tracks registered under the same name.
    DuplicateTrack(String),
    /// A trigger names a section the layout does not contain.
    UnknownTrigger {
        /// Track (or surface trigger) being resolved.
        track: String,
        /// Missing section name.
        trigger: String,
    },
    /// A position string could not be parsed.
    InvalidPosition {
        /// Track (or surface trigger) being resolved.
        track: String,
        /// Offending position string.
        position: String,
    },
    /// Scrub lag is negative or not finite.
    InvalidScrub {
        /// Track name.
        track: String,
        /// Offending value.
        scrub: f32,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { track, start, end } => write!(
                f,
                "track '{track}': range {start}..{end} is empty or inverted"
            ),
            Self::DuplicateTrack(name) => {
                write!(f, "track '{name}' is already registered")
            }
            Self::UnknownTrigger { track, trigger } => {
                write!(f, "track '{track}': unknown trigger section '{trigger}'")
            }
            Self::InvalidPosition { track, position } => {
                write!(f, "track '{track}': cannot parse position '{position}'")
            }
            Self::InvalidScrub { track, scrub } => {
                write!(f, "track '{track}': scrub must be >= 0, got {scrub}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}
