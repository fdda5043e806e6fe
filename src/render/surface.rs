//! Commands the viewer core sends to whatever draws the tracks.

use crate::render::readout::ReadoutAnchor;
use crate::state::data_series::SampleSeries;

/// Current-position marker on one track.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub time: f64,
    pub value: f64,
    pub label: String,
}

/// One visual update. A batch always ends with a single `RequestRedraw`.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    /// Show (`Some`) or hide (`None`) the marker of a track.
    SetMarker { track: usize, marker: Option<Marker> },
    /// Vertical cursor line through every track.
    SetCursorLine(Option<f64>),
    /// Readout text; `None` hides it.
    SetText {
        content: Option<String>,
        anchor: ReadoutAnchor,
    },
    RequestRedraw,
}

/// A rendering surface that can draw stacked tracks.
pub trait RenderSurface {
    fn draw_line(&mut self, track: usize, series: &SampleSeries);
    fn set_marker(&mut self, track: usize, marker: Option<Marker>);
    fn set_cursor_line(&mut self, time: Option<f64>);
    fn set_text(&mut self, content: Option<String>, anchor: ReadoutAnchor);
    fn request_redraw(&mut self);

    fn apply(&mut self, commands: Vec<SurfaceCommand>) {
        for command in commands {
            match command {
                SurfaceCommand::SetMarker { track, marker } => self.set_marker(track, marker),
                SurfaceCommand::SetCursorLine(time) => self.set_cursor_line(time),
                SurfaceCommand::SetText { content, anchor } => self.set_text(content, anchor),
                SurfaceCommand::RequestRedraw => self.request_redraw(),
            }
        }
    }
}
