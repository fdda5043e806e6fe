//! Crosshair synchronization across stacked tracks.
//!
//! The controller is a two-state machine. `transition` is pure; `handle`
//! applies it and turns the new state into the full list of surface commands
//! for the event, ending with exactly one redraw request.

use crate::render::readout::{format_value_label, Readout};
use crate::render::surface::{Marker, SurfaceCommand};
use crate::render::time_axis::Range;
use crate::state::channel::Track;
use crate::state::data_series::Sample;

/// Pointer input delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved. `track` is the plotting area under it, `None` when the
    /// pointer is over the figure but between or beside the tracks.
    Move {
        axis_x: f64,
        axis_y: f64,
        track: Option<usize>,
    },
    /// Pointer left the figure.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CrosshairState {
    #[default]
    Idle,
    Active(f64),
}

impl CrosshairState {
    pub fn is_active(&self) -> bool {
        matches!(self, CrosshairState::Active(_))
    }

    pub fn current_time(&self) -> Option<f64> {
        match self {
            CrosshairState::Active(t) => Some(*t),
            CrosshairState::Idle => None,
        }
    }
}

/// Next crosshair state for an event against the visible time domain.
///
/// A move inside the domain but off every track (the gaps between stacked
/// tracks) keeps the current state.
pub fn transition(state: CrosshairState, event: PointerEvent, domain: Range) -> CrosshairState {
    match event {
        PointerEvent::Move { axis_x, track, .. } if axis_x.is_finite() && domain.contains(axis_x) => {
            match track {
                Some(_) => CrosshairState::Active(axis_x),
                None => state,
            }
        }
        PointerEvent::Move { .. } | PointerEvent::Leave => CrosshairState::Idle,
    }
}

fn is_off_track(event: PointerEvent) -> bool {
    matches!(event, PointerEvent::Move { track: None, .. })
}

#[derive(Debug, Clone, Default)]
pub struct CrosshairController {
    state: CrosshairState,
    readout: Readout,
}

impl CrosshairController {
    pub fn new(readout: Readout) -> Self {
        Self {
            state: CrosshairState::Idle,
            readout,
        }
    }

    pub fn state(&self) -> CrosshairState {
        self.state
    }

    /// Process one pointer event. `Idle -> Idle` and a state held over a
    /// track gap produce no commands.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        domain: Range,
        tracks: &mut [Track],
    ) -> Vec<SurfaceCommand> {
        let previous = self.state;
        let was_active = previous.is_active();
        self.state = transition(previous, event, domain);
        if is_off_track(event) && self.state == previous {
            return Vec::new();
        }

        match self.state {
            CrosshairState::Active(t) => self.show(t, tracks),
            CrosshairState::Idle if was_active => self.hide(tracks),
            CrosshairState::Idle => Vec::new(),
        }
    }

    fn show(&self, t: f64, tracks: &mut [Track]) -> Vec<SurfaceCommand> {
        let mut commands = Vec::with_capacity(tracks.len() + 3);
        // The first live track is the reference time base for the cursor
        // line and the readout.
        let mut reference: Option<Sample> = None;

        for (i, track) in tracks.iter_mut().enumerate() {
            let marker = match track {
                Track::Live(view) => match view.locate(t) {
                    Ok(sample) => {
                        reference.get_or_insert(sample);
                        sample.value.map(|value| Marker {
                            time: sample.time,
                            value,
                            label: format_value_label(view.spec().name(), value),
                        })
                    }
                    Err(e) => {
                        tracing::debug!("No sample for {}: {e}", view.spec().name());
                        None
                    }
                },
                Track::Placeholder { .. } => None,
            };
            commands.push(SurfaceCommand::SetMarker { track: i, marker });
        }

        commands.push(SurfaceCommand::SetCursorLine(reference.map(|s| s.time)));
        commands.push(SurfaceCommand::SetText {
            content: reference.map(|s| self.readout.format_time(s.time, s.index)),
            anchor: self.readout.anchor,
        });
        commands.push(SurfaceCommand::RequestRedraw);
        commands
    }

    fn hide(&self, tracks: &mut [Track]) -> Vec<SurfaceCommand> {
        let mut commands = Vec::with_capacity(tracks.len() + 3);
        for (i, track) in tracks.iter_mut().enumerate() {
            if let Track::Live(view) = track {
                view.clear();
            }
            commands.push(SurfaceCommand::SetMarker {
                track: i,
                marker: None,
            });
        }
        commands.push(SurfaceCommand::SetCursorLine(None));
        commands.push(SurfaceCommand::SetText {
            content: None,
            anchor: self.readout.anchor,
        });
        commands.push(SurfaceCommand::RequestRedraw);
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::time_axis::TimeAxis;
    use crate::state::channel::ChannelSpec;
    use crate::state::data_series::SampleSeries;

    fn live(name: &str, times: &[f64], values: &[f64]) -> Track {
        let series = SampleSeries::new(times.to_vec(), values.to_vec()).unwrap();
        Track::bind(ChannelSpec::new(name, name, [0.0, 100.0]), series)
    }

    fn empty(name: &str) -> Track {
        Track::bind(ChannelSpec::new(name, name, [0.0, 100.0]), SampleSeries::empty())
    }

    fn at(axis_x: f64) -> PointerEvent {
        PointerEvent::Move {
            axis_x,
            axis_y: 0.0,
            track: Some(0),
        }
    }

    fn gap(axis_x: f64) -> PointerEvent {
        PointerEvent::Move {
            axis_x,
            axis_y: f64::NAN,
            track: None,
        }
    }

    fn markers(commands: &[SurfaceCommand]) -> Vec<Option<(f64, f64)>> {
        commands
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::SetMarker { marker, .. } => {
                    Some(marker.as_ref().map(|m| (m.time, m.value)))
                }
                _ => None,
            })
            .collect()
    }

    fn text(commands: &[SurfaceCommand]) -> Option<Option<String>> {
        commands.iter().find_map(|c| match c {
            SurfaceCommand::SetText { content, .. } => Some(content.clone()),
            _ => None,
        })
    }

    fn redraws(commands: &[SurfaceCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::RequestRedraw))
            .count()
    }

    fn domain() -> Range {
        Range::new(0.0, 2.0)
    }

    #[test]
    fn transition_table() {
        let d = domain();
        let idle = CrosshairState::Idle;
        let active = CrosshairState::Active(1.0);
        assert_eq!(transition(idle, at(1.2), d), CrosshairState::Active(1.2));
        assert_eq!(transition(active, at(0.3), d), CrosshairState::Active(0.3));
        assert_eq!(transition(active, at(2.5), d), idle);
        assert_eq!(transition(active, at(f64::NAN), d), idle);
        assert_eq!(transition(active, PointerEvent::Leave, d), idle);
        assert_eq!(transition(idle, PointerEvent::Leave, d), idle);
        assert_eq!(transition(active, gap(1.7), d), active);
        assert_eq!(transition(idle, gap(1.7), d), idle);
        assert_eq!(transition(active, gap(2.5), d), idle);
    }

    #[test]
    fn crossing_gap_between_tracks_keeps_markers() {
        let mut tracks = vec![
            live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0]),
            live("Boost", &[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]),
        ];
        let mut controller = CrosshairController::default();
        controller.handle(at(1.0), domain(), &mut tracks);

        let commands = controller.handle(gap(1.0), domain(), &mut tracks);
        assert!(commands.is_empty());
        assert_eq!(controller.state(), CrosshairState::Active(1.0));
        if let Track::Live(view) = &tracks[1] {
            assert_eq!(view.highlighted(), Some(1));
        }

        // Entering the next track refreshes from the held state.
        let commands = controller.handle(at(1.0), domain(), &mut tracks);
        assert_eq!(markers(&commands), [Some((1.0, 20.0)), Some((1.0, 2.0))]);
    }

    #[test]
    fn gap_outside_domain_still_hides() {
        let mut tracks = vec![live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0])];
        let mut controller = CrosshairController::default();
        controller.handle(at(1.0), domain(), &mut tracks);

        // Left of the tracks, over the y tick labels.
        let commands = controller.handle(gap(-0.3), domain(), &mut tracks);
        assert_eq!(controller.state(), CrosshairState::Idle);
        assert_eq!(markers(&commands), [None]);
        assert_eq!(redraws(&commands), 1);
    }

    #[test]
    fn move_updates_every_track_with_one_redraw() {
        let mut tracks = vec![
            live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0]),
            live("Boost", &[0.0, 0.5, 1.0, 1.5, 2.0], &[1.0, 2.0, 3.0, 4.0, 5.0]),
        ];
        let mut controller = CrosshairController::default();
        let commands = controller.handle(at(1.4), domain(), &mut tracks);

        assert_eq!(controller.state(), CrosshairState::Active(1.4));
        assert_eq!(markers(&commands), [Some((1.0, 20.0)), Some((1.5, 4.0))]);
        assert_eq!(redraws(&commands), 1);
        assert_eq!(commands.last(), Some(&SurfaceCommand::RequestRedraw));
    }

    #[test]
    fn readout_shows_snapped_time_not_cursor_time() {
        let mut tracks = vec![live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0])];
        let mut controller = CrosshairController::default();
        let commands = controller.handle(at(1.4), domain(), &mut tracks);

        assert_eq!(
            text(&commands),
            Some(Some("t = 1.000 s   (index 1)".to_string()))
        );
        assert!(commands.contains(&SurfaceCommand::SetCursorLine(Some(1.0))));
    }

    #[test]
    fn marker_carries_value_label() {
        let mut tracks = vec![live("RPM", &[0.0, 1.0], &[900.0, 1500.0])];
        let commands = CrosshairController::default().handle(at(0.9), domain(), &mut tracks);
        let label = commands.iter().find_map(|c| match c {
            SurfaceCommand::SetMarker { marker: Some(m), .. } => Some(m.label.clone()),
            _ => None,
        });
        assert_eq!(label.as_deref(), Some("RPM: 1500"));
    }

    #[test]
    fn empty_channel_does_not_block_others() {
        let mut tracks = vec![
            live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0]),
            empty("IAT"),
            live("AFR", &[0.0, 2.0], &[14.7, 12.0]),
        ];
        let mut controller = CrosshairController::default();
        let commands = controller.handle(at(1.9), domain(), &mut tracks);

        assert_eq!(
            markers(&commands),
            [Some((2.0, 30.0)), None, Some((2.0, 12.0))]
        );
        assert_eq!(redraws(&commands), 1);
    }

    #[test]
    fn missing_value_hides_only_that_marker() {
        let mut tracks = vec![
            live("Boost", &[0.0, 1.0], &[f64::NAN, 5.0]),
            live("RPM", &[0.0, 1.0], &[900.0, 1000.0]),
        ];
        let commands = CrosshairController::default().handle(at(0.2), domain(), &mut tracks);
        assert_eq!(markers(&commands), [None, Some((0.0, 900.0))]);
        if let Track::Live(view) = &tracks[0] {
            assert_eq!(view.highlighted(), Some(0));
        }
    }

    #[test]
    fn repeated_move_is_idempotent() {
        let mut tracks = vec![live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0])];
        let mut controller = CrosshairController::default();
        let first = controller.handle(at(0.7), domain(), &mut tracks);
        let second = controller.handle(at(0.7), domain(), &mut tracks);
        assert_eq!(first, second);
        assert_eq!(controller.state(), CrosshairState::Active(0.7));
    }

    #[test]
    fn leave_always_hides_everything() {
        let mut tracks = vec![
            live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0]),
            empty("IAT"),
        ];
        let mut controller = CrosshairController::default();
        controller.handle(at(1.0), domain(), &mut tracks);

        let commands = controller.handle(PointerEvent::Leave, domain(), &mut tracks);
        assert_eq!(controller.state(), CrosshairState::Idle);
        assert_eq!(markers(&commands), [None, None]);
        assert!(commands.contains(&SurfaceCommand::SetCursorLine(None)));
        assert_eq!(text(&commands), Some(None));
        assert_eq!(redraws(&commands), 1);
        if let Track::Live(view) = &tracks[0] {
            assert_eq!(view.highlighted(), None);
        }

        // Already idle: nothing left to hide.
        let again = controller.handle(PointerEvent::Leave, domain(), &mut tracks);
        assert!(again.is_empty());
        assert_eq!(controller.state(), CrosshairState::Idle);
    }

    #[test]
    fn out_of_domain_move_goes_idle() {
        let mut tracks = vec![live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0])];
        let mut controller = CrosshairController::default();
        controller.handle(at(1.0), domain(), &mut tracks);
        let commands = controller.handle(at(-0.5), domain(), &mut tracks);
        assert_eq!(controller.state(), CrosshairState::Idle);
        assert_eq!(markers(&commands), [None]);
    }

    #[test]
    fn move_after_pan_outside_new_domain_goes_idle() {
        let mut tracks = vec![live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0])];
        let mut axis = TimeAxis::new(Range::new(0.0, 2.0));
        let mut controller = CrosshairController::default();
        controller.handle(at(1.0), axis.domain(), &mut tracks);

        axis.pan_by(5.0);
        assert_eq!(axis.domain(), Range::new(5.0, 7.0));
        controller.handle(at(1.0), axis.domain(), &mut tracks);
        assert_eq!(controller.state(), CrosshairState::Idle);
    }

    #[test]
    fn zoomed_out_cursor_clamps_to_last_sample() {
        let mut tracks = vec![live("RPM", &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0])];
        let commands =
            CrosshairController::default().handle(at(3.5), Range::new(-2.0, 4.0), &mut tracks);
        assert_eq!(markers(&commands), [Some((2.0, 30.0))]);
    }
}
