//! Scroll timeline: every registered track driven from one scroll position.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use super::layout::PageLayout;
use super::track::{Property, ScrollTrack, TrackConfig};
use super::ConfigurationError;
use crate::scene::Model;

/// Ordered set of scroll tracks sharing one scroll position.
///
/// Progress is a pure function of the latest position (plus the scrub state
/// of each track), so any number of updates may arrive between two frames;
/// the last one wins. Tracks outside their range are written before active
/// ones, so a track that has settled at an end value never overrides one
/// that is scrolling. Within each group tracks are applied in registration
/// order, which decides the winner when two tracks write the same property
/// over overlapping ranges.
#[derive(Debug, Default)]
pub struct ScrollTimeline {
    tracks: Vec<ScrollTrack>,
    position: Option<f32>,
    external: FxHashMap<String, f32>,
}

impl ScrollTimeline {
    /// Empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a track. Errors are reported here rather than as
    /// NaN progress later.
    pub fn register(
        &mut self,
        config: TrackConfig,
        layout: &PageLayout,
    ) -> Result<(), ConfigurationError> {
        if self.track(&config.name).is_some() {
            return Err(ConfigurationError::DuplicateTrack(config.name));
        }
        let track = ScrollTrack::new(config, layout)?;
        let range = track.range();
        debug!(
            "Registered track '{}' over {:.1}..{:.1}",
            track.name(),
            range.start(),
            range.end()
        );

        for other in &self.tracks {
            if !other.range().overlaps(&range) {
                continue;
            }
            for interp in &track.interpolations {
                if other.targets(&interp.config.property) {
                    warn!(
                        "Tracks '{}' and '{}' both drive {:?} over overlapping \
                         ranges; '{}' is applied last",
                        other.name(),
                        track.name(),
                        interp.config.property,
                        track.name()
                    );
                }
            }
        }

        self.tracks.push(track);
        Ok(())
    }

    /// Recompute every track for a new scroll position and write the values
    /// of tracks whose displayed progress changed. Model properties are
    /// skipped while no model is attached; [`apply`](Self::apply) catches
    /// them up later.
    pub fn on_scroll_position_changed(
        &mut self,
        position: f32,
        mut model: Option<&mut Model>,
    ) {
        self.position = Some(position);
        let changed: Vec<Option<f32>> = self
            .tracks
            .iter_mut()
            .map(|track| track.advance(position))
            .collect();

        let mut settled: Vec<&Property> = Vec::new();
        for (track, progress) in self.tracks.iter().zip(&changed) {
            if let (false, Some(progress)) = (track.is_active(), *progress) {
                write_track(track, progress, model.as_deref_mut(), &mut self.external);
                settled.extend(track.interpolations.iter().map(|i| &i.config.property));
            }
        }
        // An unchanged active track still rewrites anything a settling track
        // just touched.
        for (track, progress) in self.tracks.iter().zip(&changed) {
            if !track.is_active() {
                continue;
            }
            let progress = match *progress {
                Some(progress) => progress,
                None if settled.iter().any(|p| track.targets(p)) => track.displayed_progress(),
                None => continue,
            };
            write_track(track, progress, model.as_deref_mut(), &mut self.external);
        }
    }

    /// Advance every lagging track one more scrub step at the last known
    /// position. Returns whether any track still lags afterwards.
    pub fn settle(&mut self, model: Option<&mut Model>) -> bool {
        let Some(position) = self.position else {
            return false;
        };
        if !self.is_settling() {
            return false;
        }
        self.on_scroll_position_changed(position, model);
        self.is_settling()
    }

    /// Whether any track's displayed progress has not yet caught up with its
    /// raw progress.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.tracks
            .iter()
            .any(|t| t.displayed_progress() != t.progress())
    }

    /// Capture start values from a freshly attached model for interpolations
    /// that did not declare one.
    pub fn bind(&mut self, model: &Model) {
        for track in &mut self.tracks {
            track.bind(model.transform());
        }
    }

    /// Write every track's current displayed progress onto `model`, whether
    /// or not it changed, tracks outside their range first. Does nothing before the first scroll position is
    /// known.
    pub fn apply(&mut self, model: &mut Model) {
        if self.position.is_none() {
            return;
        }
        for active in [false, true] {
            for track in self.tracks.iter_mut().filter(|t| t.is_active() == active) {
                let progress = track.take_write();
                write_track(track, progress, Some(&mut *model), &mut self.external);
            }
        }
    }

    /// Re-resolve every range against a new layout. Tracks that fail keep
    /// their previous range; the first failure is returned after all tracks
    /// have been tried.
    pub fn refresh(&mut self, layout: &PageLayout) -> Result<(), ConfigurationError> {
        let mut first_error = None;
        for track in &mut self.tracks {
            if let Err(e) = track.refresh(layout) {
                warn!("Keeping previous range for '{}': {e}", track.name());
                let _ = first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Latest scroll position, if any has been reported.
    #[must_use]
    pub fn position(&self) -> Option<f32> {
        self.position
    }

    /// Raw progress of a named track.
    #[must_use]
    pub fn progress(&self, name: &str) -> Option<f32> {
        self.track(name).map(ScrollTrack::progress)
    }

    /// Smoothed progress of a named track.
    #[must_use]
    pub fn displayed_progress(&self, name: &str) -> Option<f32> {
        self.track(name).map(ScrollTrack::displayed_progress)
    }

    /// Whether a named pin track currently holds its content.
    #[must_use]
    pub fn pinned(&self, name: &str) -> bool {
        self.track(name).is_some_and(ScrollTrack::is_pinned)
    }

    /// Last written value of an external property.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f32> {
        self.external.get(name).copied()
    }

    /// Whether some track targeting `property` has the current position
    /// inside its range. Procedural animation of the same property yields
    /// while this holds.
    #[must_use]
    pub fn is_driving(&self, property: &Property) -> bool {
        self.tracks
            .iter()
            .any(|t| t.is_active() && t.targets(property))
    }

    /// Track by name.
    #[must_use]
    pub fn track(&self, name: &str) -> Option<&ScrollTrack> {
        self.tracks.iter().find(|t| t.name() == name)
    }

    /// Registered tracks in application order.
    pub fn tracks(&self) -> impl Iterator<Item = &ScrollTrack> {
        self.tracks.iter()
    }

    /// Number of registered tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no tracks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn write_track(
    track: &ScrollTrack,
    progress: f32,
    mut model: Option<&mut Model>,
    external: &mut FxHashMap<String, f32>,
) {
    for interp in &track.interpolations {
        let value = interp.value(progress);
        match &interp.config.property {
            Property::External(name) => {
                let _ = external.insert(name.clone(), value);
            }
            property => {
                if let Some(model) = model.as_deref_mut() {
                    let _ = property.write(model.transform_mut(), value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SectionOptions;
    use crate::scroll::layout::{TrackEnd, TriggerSpec};
    use crate::scroll::track::InterpolationConfig;

    fn drift() -> TrackConfig {
        TrackConfig::absolute("drift", 0.0, 100.0)
            .with(InterpolationConfig::between(Property::PositionX, 0.0, -5.0))
    }

    fn x(model: &Model) -> f32 {
        model.transform().position.x
    }

    #[test]
    fn end_to_end_position_scenario() {
        let mut timeline = ScrollTimeline::new();
        timeline.register(drift(), &PageLayout::new(800.0)).unwrap();
        let mut model = Model::default();

        timeline.on_scroll_position_changed(50.0, Some(&mut model));
        assert!((x(&model) + 2.5).abs() < 1e-5);

        timeline.on_scroll_position_changed(150.0, Some(&mut model));
        assert!((x(&model) + 5.0).abs() < 1e-5);
        assert_eq!(timeline.progress("drift"), Some(1.0));

        timeline.on_scroll_position_changed(-10.0, Some(&mut model));
        assert!(x(&model).abs() < 1e-5);
        assert_eq!(timeline.progress("drift"), Some(0.0));
    }

    #[test]
    fn last_update_wins_between_frames() {
        let mut timeline = ScrollTimeline::new();
        timeline.register(drift(), &PageLayout::new(800.0)).unwrap();
        let mut model = Model::default();
        for p in [10.0, 90.0, 30.0, 20.0] {
            timeline.on_scroll_position_changed(p, Some(&mut model));
        }
        assert!((x(&model) + 1.0).abs() < 1e-5);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut timeline = ScrollTimeline::new();
        let layout = PageLayout::new(800.0);
        timeline.register(drift(), &layout).unwrap();
        assert_eq!(
            timeline.register(drift(), &layout),
            Err(ConfigurationError::DuplicateTrack("drift".into()))
        );
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn inverted_range_is_rejected_at_registration() {
        let mut timeline = ScrollTimeline::new();
        let err = timeline.register(
            TrackConfig::absolute("bad", 100.0, 100.0),
            &PageLayout::new(800.0),
        );
        assert!(matches!(err, Err(ConfigurationError::InvalidRange { .. })));
        assert!(timeline.is_empty());
    }

    #[test]
    fn overlapping_tracks_apply_in_registration_order() {
        let mut timeline = ScrollTimeline::new();
        let layout = PageLayout::new(800.0);
        timeline.register(drift(), &layout).unwrap();
        timeline
            .register(
                TrackConfig::absolute("late", 0.0, 100.0)
                    .with(InterpolationConfig::between(Property::PositionX, 10.0, 20.0)),
                &layout,
            )
            .unwrap();
        let mut model = Model::default();
        timeline.on_scroll_position_changed(50.0, Some(&mut model));
        assert!((x(&model) - 15.0).abs() < 1e-5);
    }

    #[test]
    fn active_track_wins_over_settled_neighbour() {
        let mut timeline = ScrollTimeline::new();
        let layout = PageLayout::new(800.0);
        timeline.register(drift(), &layout).unwrap();
        timeline
            .register(
                TrackConfig::absolute("further", 200.0, 300.0)
                    .with(InterpolationConfig::between(Property::PositionX, -6.0, -10.0)),
                &layout,
            )
            .unwrap();
        let mut model = Model::default();

        timeline.on_scroll_position_changed(250.0, Some(&mut model));
        assert!((x(&model) + 8.0).abs() < 1e-5);

        // "further" drops back to its start value, "drift" is inside its range.
        timeline.on_scroll_position_changed(50.0, Some(&mut model));
        assert!((x(&model) + 2.5).abs() < 1e-5);

        // Back onto drift's end boundary: drift is unchanged but still wins.
        timeline.on_scroll_position_changed(150.0, Some(&mut model));
        timeline.on_scroll_position_changed(250.0, Some(&mut model));
        timeline.on_scroll_position_changed(100.0, Some(&mut model));
        assert!((x(&model) + 5.0).abs() < 1e-5);

        let mut late = Model::default();
        timeline.apply(&mut late);
        assert!((x(&late) + 5.0).abs() < 1e-5);
    }

    #[test]
    fn settle_catches_up_without_new_positions() {
        let mut timeline = ScrollTimeline::new();
        timeline
            .register(drift().with_scrub(1.0), &PageLayout::new(800.0))
            .unwrap();
        let mut model = Model::default();
        assert!(!timeline.settle(Some(&mut model)));

        timeline.on_scroll_position_changed(100.0, Some(&mut model));
        assert!(timeline.is_settling());
        let mut steps = 0;
        while timeline.settle(Some(&mut model)) {
            steps += 1;
            assert!(steps < 100, "scrub never settled");
        }
        assert_eq!(timeline.displayed_progress("drift"), Some(1.0));
        assert!((x(&model) + 5.0).abs() < 1e-5);
        assert!(!timeline.settle(Some(&mut model)));
    }

    #[test]
    fn scrubbed_track_lags_behind_raw_progress() {
        let mut timeline = ScrollTimeline::new();
        timeline
            .register(drift().with_scrub(1.0), &PageLayout::new(800.0))
            .unwrap();
        let mut model = Model::default();
        timeline.on_scroll_position_changed(100.0, Some(&mut model));
        assert_eq!(timeline.progress("drift"), Some(1.0));
        assert_eq!(timeline.displayed_progress("drift"), Some(0.5));
        assert!((x(&model) + 2.5).abs() < 1e-5);

        timeline.on_scroll_position_changed(100.0, Some(&mut model));
        assert_eq!(timeline.displayed_progress("drift"), Some(0.75));
    }

    #[test]
    fn external_values_and_pins() {
        let mut timeline = ScrollTimeline::new();
        timeline
            .register(
                TrackConfig::absolute("showreel", 200.0, 300.0)
                    .pinned()
                    .with(InterpolationConfig::between(
                        Property::External("showreel_scale".into()),
                        0.5,
                        1.0,
                    )),
                &PageLayout::new(800.0),
            )
            .unwrap();
        timeline.on_scroll_position_changed(250.0, None);
        assert_eq!(timeline.value("showreel_scale"), Some(0.75));
        assert!(timeline.pinned("showreel"));

        timeline.on_scroll_position_changed(400.0, None);
        assert_eq!(timeline.value("showreel_scale"), Some(1.0));
        assert!(!timeline.pinned("showreel"));
        assert!(!timeline.pinned("missing"));
    }

    #[test]
    fn bind_and_apply_catch_up_after_late_attach() {
        let mut timeline = ScrollTimeline::new();
        timeline
            .register(
                TrackConfig::absolute("drift", 0.0, 100.0)
                    .with(InterpolationConfig::to(Property::PositionX, -5.0)),
                &PageLayout::new(800.0),
            )
            .unwrap();
        timeline.on_scroll_position_changed(50.0, None);

        let mut model = Model::default();
        model.transform_mut().position.x = 3.0;
        timeline.bind(&model);
        timeline.apply(&mut model);
        assert!((x(&model) + 1.0).abs() < 1e-5);
    }

    #[test]
    fn apply_before_any_scroll_leaves_model_alone() {
        let mut timeline = ScrollTimeline::new();
        timeline.register(drift(), &PageLayout::new(800.0)).unwrap();
        let mut model = Model::default();
        model.transform_mut().position.x = 3.0;
        timeline.apply(&mut model);
        assert_eq!(x(&model), 3.0);
    }

    #[test]
    fn driving_only_inside_range() {
        let mut timeline = ScrollTimeline::new();
        timeline
            .register(
                TrackConfig::absolute("spin", 100.0, 200.0)
                    .with(InterpolationConfig::to(Property::RotationY, 1.0)),
                &PageLayout::new(800.0),
            )
            .unwrap();
        assert!(!timeline.is_driving(&Property::RotationY));
        timeline.on_scroll_position_changed(150.0, None);
        assert!(timeline.is_driving(&Property::RotationY));
        assert!(!timeline.is_driving(&Property::PositionX));
        timeline.on_scroll_position_changed(250.0, None);
        assert!(!timeline.is_driving(&Property::RotationY));
    }

    #[test]
    fn refresh_follows_layout_and_keeps_range_on_failure() {
        let sections = [SectionOptions::new("intro", 1.0), SectionOptions::new("about", 1.0)];
        let mut timeline = ScrollTimeline::new();
        let config = TrackConfig {
            name: "drift".into(),
            start: TriggerSpec::on("intro", "top top"),
            end: TrackEnd::Point(TriggerSpec::on("about", "top top")),
            scrub: 0.0,
            pin: false,
            interpolations: Vec::new(),
        };
        timeline
            .register(config, &PageLayout::stacked(800.0, &sections))
            .unwrap();
        assert_eq!(timeline.track("drift").unwrap().range().end(), 800.0);

        timeline
            .refresh(&PageLayout::stacked(600.0, &sections))
            .unwrap();
        assert_eq!(timeline.track("drift").unwrap().range().end(), 600.0);

        let err = timeline.refresh(&PageLayout::stacked(600.0, &sections[..1]));
        assert!(matches!(err, Err(ConfigurationError::UnknownTrigger { .. })));
        assert_eq!(timeline.track("drift").unwrap().range().end(), 600.0);
    }
}
