//! Fixed/absolute positioning of the render surface.
//!
//! The canvas stays fixed to the viewport until the page scrolls past a
//! threshold, then is released to scroll away with the content from where it
//! stood. Scrolling back above the threshold re-fixes it. The machine keeps no
//! history beyond its two modes.

use log::debug;

use super::layout::{PageLayout, TriggerSpec};
use super::ConfigurationError;

/// Name reported in errors from the surface trigger.
const SURFACE_OWNER: &str = "surface";

/// Positioning mode of the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceState {
    /// Pinned to the viewport. Initial state.
    Fixed,
    /// Scrolls with the page, placed at `top` page pixels.
    Absolute {
        /// Scroll position captured when the threshold was crossed.
        top: f32,
    },
}

impl SurfaceState {
    /// CSS `position` value for this state.
    #[must_use]
    pub fn css_position(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Absolute { .. } => "absolute",
        }
    }

    /// CSS `top` value for this state.
    #[must_use]
    pub fn css_top(&self) -> String {
        match self {
            Self::Fixed => "0px".to_owned(),
            Self::Absolute { top } => format!("{top}px"),
        }
    }

    /// Offset of the surface top from the page top.
    #[must_use]
    pub fn top(&self) -> f32 {
        match self {
            Self::Fixed => 0.0,
            Self::Absolute { top } => *top,
        }
    }
}

/// A mode change, reported once per crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceTransition {
    /// Crossed the threshold moving forward.
    EnterThreshold {
        /// Captured top offset.
        top: f32,
    },
    /// Crossed back above the threshold.
    LeaveThreshold,
}

/// Two-state machine driven by the same scroll signal as the timeline.
#[derive(Debug, Clone)]
pub struct SurfacePositionFsm {
    threshold: f32,
    trigger: Option<TriggerSpec>,
    state: SurfaceState,
}

impl SurfacePositionFsm {
    /// Machine with a page-absolute threshold.
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            trigger: None,
            state: SurfaceState::Fixed,
        }
    }

    /// Machine whose threshold follows a trigger point on the page.
    pub fn from_trigger(
        trigger: TriggerSpec,
        layout: &PageLayout,
    ) -> Result<Self, ConfigurationError> {
        let threshold = trigger.resolve(layout, SURFACE_OWNER)?;
        Ok(Self {
            threshold,
            trigger: Some(trigger),
            state: SurfaceState::Fixed,
        })
    }

    /// Feed a scroll position. Returns the transition taken, if any.
    pub fn update(&mut self, position: f32) -> Option<SurfaceTransition> {
        let transition = match self.state {
            SurfaceState::Fixed if position >= self.threshold => {
                self.state = SurfaceState::Absolute { top: position };
                SurfaceTransition::EnterThreshold { top: position }
            }
            SurfaceState::Absolute { .. } if position < self.threshold => {
                self.state = SurfaceState::Fixed;
                SurfaceTransition::LeaveThreshold
            }
            _ => return None,
        };
        debug!("Surface {transition:?} at {position:.1}");
        Some(transition)
    }

    /// Re-resolve a trigger-based threshold. The mode is left as is; the
    /// next [`update`](Self::update) compares against the new threshold.
    pub fn refresh(&mut self, layout: &PageLayout) -> Result<(), ConfigurationError> {
        if let Some(trigger) = &self.trigger {
            self.threshold = trigger.resolve(layout, SURFACE_OWNER)?;
        }
        Ok(())
    }

    /// Current mode.
    #[must_use]
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Current threshold in page pixels.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SectionOptions;

    #[test]
    fn hysteresis_sequence() {
        let th = 500.0;
        let mut fsm = SurfacePositionFsm::new(th);
        let mut modes = Vec::new();
        let mut captured = None;
        for p in [0.0, th - 1.0, th + 1.0, th - 1.0] {
            if let Some(SurfaceTransition::EnterThreshold { top }) = fsm.update(p) {
                captured = Some(top);
            }
            modes.push(fsm.state().css_position());
        }
        assert_eq!(modes, ["fixed", "fixed", "absolute", "fixed"]);
        assert_eq!(captured, Some(th + 1.0));
        assert_eq!(fsm.state().top(), 0.0);
    }

    #[test]
    fn transitions_fire_once_per_crossing() {
        let mut fsm = SurfacePositionFsm::new(100.0);
        assert_eq!(
            fsm.update(120.0),
            Some(SurfaceTransition::EnterThreshold { top: 120.0 })
        );
        assert_eq!(fsm.update(300.0), None);
        assert_eq!(fsm.state(), SurfaceState::Absolute { top: 120.0 });
        assert_eq!(fsm.update(50.0), Some(SurfaceTransition::LeaveThreshold));
        assert_eq!(fsm.update(10.0), None);
    }

    #[test]
    fn reentry_captures_fresh_offset() {
        let mut fsm = SurfacePositionFsm::new(100.0);
        let _ = fsm.update(150.0);
        let _ = fsm.update(90.0);
        let _ = fsm.update(110.0);
        assert_eq!(fsm.state(), SurfaceState::Absolute { top: 110.0 });
        assert_eq!(fsm.state().css_top(), "110px");
    }

    #[test]
    fn trigger_threshold_follows_layout() {
        let sections = [SectionOptions::new("page1", 1.0), SectionOptions::new("about", 1.0)];
        let trigger = TriggerSpec::on("about", "top 20%");
        let mut fsm =
            SurfacePositionFsm::from_trigger(trigger, &PageLayout::stacked(1000.0, &sections))
                .unwrap();
        assert!((fsm.threshold() - 800.0).abs() < 1e-3);

        fsm.refresh(&PageLayout::stacked(500.0, &sections)).unwrap();
        assert!((fsm.threshold() - 400.0).abs() < 1e-3);
    }

    #[test]
    fn unknown_trigger_is_rejected() {
        let err = SurfacePositionFsm::from_trigger(
            TriggerSpec::on("nowhere", "top top"),
            &PageLayout::new(800.0),
        );
        assert!(matches!(err, Err(ConfigurationError::UnknownTrigger { .. })));
    }
}
