use crate::data::loader::LogTable;
use crate::render::crosshair::{CrosshairController, CrosshairState, PointerEvent};
use crate::render::surface::{RenderSurface, SurfaceCommand};
use crate::render::time_axis::{AxisInput, TimeAxis};
use crate::state::channel::Track;
use crate::state::layout::ViewerConfig;

/// Everything the UI collected during one event tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub axis: Vec<AxisInput>,
    pub pointer: Option<PointerEvent>,
}

/// Per-window viewer state: the tracks, the shared time domain and the
/// crosshair. Event handlers receive it explicitly; nothing is global.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    title: String,
    tracks: Vec<Track>,
    axis: Option<TimeAxis>,
    crosshair: CrosshairController,
}

impl ViewerSession {
    /// Build the stacked tracks for a log. Channels missing from the log
    /// become placeholders and are reported once here.
    pub fn build(title: String, table: &LogTable, config: &ViewerConfig) -> Self {
        let available = table.column_set();
        let tracks: Vec<Track> = config
            .channels
            .iter()
            .cloned()
            .map(|spec| Track::build(spec, table, &available))
            .collect();

        for track in &tracks {
            if let Some(note) = track.placeholder_note() {
                tracing::warn!("Track {}: {note}", track.spec().name());
            }
        }
        if tracks.iter().any(|t| !t.is_live()) {
            tracing::debug!("Columns in log: {:?}", available.sorted_names());
        }

        Self::from_tracks(title, tracks, config)
    }

    pub fn from_tracks(title: String, tracks: Vec<Track>, config: &ViewerConfig) -> Self {
        let axis = TimeAxis::from_ranges(
            tracks
                .iter()
                .filter_map(Track::series)
                .filter_map(|s| s.time_range()),
        );
        if axis.is_none() {
            tracing::warn!("No channel of \"{title}\" has data; crosshair disabled");
        }
        Self {
            title,
            tracks,
            axis,
            crosshair: CrosshairController::new(config.readout.clone()),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn axis(&self) -> Option<&TimeAxis> {
        self.axis.as_ref()
    }

    pub fn crosshair_state(&self) -> CrosshairState {
        self.crosshair.state()
    }

    /// Hand every live track's series to the surface once.
    pub fn draw_lines<S: RenderSurface>(&self, surface: &mut S) {
        for (i, track) in self.tracks.iter().enumerate() {
            if let Some(series) = track.series() {
                surface.draw_line(i, series);
            }
        }
    }

    /// Process one tick. Pan/zoom inputs are applied to the shared domain
    /// before the pointer event so the crosshair never reads a stale range.
    pub fn handle_frame(&mut self, input: FrameInput) -> Vec<SurfaceCommand> {
        let Some(axis) = self.axis.as_mut() else {
            return Vec::new();
        };

        let mut domain_changed = false;
        for axis_input in input.axis {
            domain_changed |= axis.apply(axis_input);
        }
        let domain = axis.domain();

        let mut commands = match input.pointer {
            Some(event) => self.crosshair.handle(event, domain, &mut self.tracks),
            None => Vec::new(),
        };
        if domain_changed && !commands.contains(&SurfaceCommand::RequestRedraw) {
            commands.push(SurfaceCommand::RequestRedraw);
        }
        commands
    }
}
