use crate::processing::downsampling;
use crate::render::crosshair::PointerEvent;
use crate::render::readout::ReadoutAnchor;
use crate::render::surface::{Marker, RenderSurface};
use crate::render::time_axis::{self, AxisInput, Range, TimeAxis};
use crate::state::channel::Track;
use crate::state::data_series::{color_for_index, SampleSeries};
use crate::state::session::{FrameInput, ViewerSession};
use crate::state::theme::Theme;

const LEFT_MARGIN: f32 = 70.0;
const RIGHT_MARGIN: f32 = 20.0;
const TOP_MARGIN: f32 = 6.0;
const BOTTOM_MARGIN: f32 = 40.0;
const TRACK_GAP: f32 = 8.0;
const MIN_TRACK_HEIGHT: f32 = 60.0;

/// Stacked-track figure painted with egui. Holds what the crosshair last
/// asked it to show; the session owns the data and the time domain.
#[derive(Debug, Default)]
pub struct TrackCanvas {
    /// Tracks whose line is drawn. The samples stay in the session.
    lines: Vec<bool>,
    markers: Vec<Option<Marker>>,
    cursor_line: Option<f64>,
    readout: Option<(String, ReadoutAnchor)>,
    redraw_requested: bool,
    last_pointer: Option<PointerEvent>,
}

impl TrackCanvas {
    /// Clear everything and size the canvas for `track_count` tracks.
    pub fn reset(&mut self, track_count: usize) {
        *self = Self {
            lines: vec![false; track_count],
            markers: vec![None; track_count],
            ..Self::default()
        };
    }

    /// Returns whether a redraw was requested and not yet painted.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn marker(&self, track: usize) -> Option<&Marker> {
        self.markers.get(track).and_then(Option::as_ref)
    }

    /// Run one frame: collect pan/zoom and pointer input, let the session
    /// process it, apply the resulting commands and paint the new state.
    pub fn show(&mut self, ui: &mut egui::Ui, session: &mut ViewerSession, theme: &Theme) {
        let Some(axis) = session.axis() else {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("No plottable channels in this log").strong().size(16.0));
            });
            return;
        };

        let value_ranges: Vec<Range> = session
            .tracks()
            .iter()
            .map(|t| t.spec().value_range())
            .collect();
        let figure_height = ui
            .available_height()
            .max(value_ranges.len() as f32 * (MIN_TRACK_HEIGHT + TRACK_GAP) + BOTTOM_MARGIN);
        let figure_rect = ui
            .allocate_space(egui::Vec2::new(ui.available_width(), figure_height))
            .1;
        let plot_rects = track_rects(figure_rect, value_ranges.len());
        if plot_rects.is_empty() {
            return;
        }

        // --- Interaction: one response over the whole figure ---
        let response = ui.interact(figure_rect, ui.id().with("track_canvas"), egui::Sense::click_and_drag());
        let input = self.collect_input(ui, &response, axis, figure_rect, &plot_rects, &value_ranges);

        let commands = session.handle_frame(input);
        self.apply(commands);

        self.paint(&ui.painter_at(figure_rect), session, figure_rect, &plot_rects, theme);
        self.redraw_requested = false;
    }

    fn collect_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        axis: &TimeAxis,
        figure_rect: egui::Rect,
        plot_rects: &[egui::Rect],
        value_ranges: &[Range],
    ) -> FrameInput {
        let mut input = FrameInput::default();
        let plot_left = plot_rects[0].left();
        let plot_width = plot_rects[0].width();

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            if delta.x != 0.0 {
                input.axis.push(AxisInput::Pan {
                    dx_px: delta.x,
                    width_px: plot_width,
                });
            }
        }

        let scroll = ui.input(|i| if response.hovered() { i.smooth_scroll_delta.y } else { 0.0 });
        if scroll.abs() > 0.0 {
            if let Some(pos) = response.hover_pos() {
                input.axis.push(AxisInput::Zoom {
                    center: axis.screen_to_time(pos.x, plot_left, plot_width),
                    factor: time_axis::zoom_factor_from_scroll(scroll),
                });
            }
        }

        if response.double_clicked() || ui.input(|i| i.key_pressed(egui::Key::Home)) {
            input.axis.push(AxisInput::Reset);
        }

        // Map the pointer with the domain this frame's inputs will produce.
        let mut projected = axis.clone();
        for axis_input in &input.axis {
            projected.apply(*axis_input);
        }

        let hover = ui
            .input(|i| i.pointer.hover_pos())
            .filter(|pos| figure_rect.contains(*pos));
        let pointer = match hover {
            Some(pos) => {
                let track = plot_rects.iter().position(|r| r.contains(pos));
                let axis_y = track
                    .map(|i| y_to_value(pos.y, value_ranges[i], plot_rects[i]))
                    .unwrap_or(f64::NAN);
                PointerEvent::Move {
                    axis_x: projected.screen_to_time(pos.x, plot_left, plot_width),
                    axis_y,
                    track,
                }
            }
            None => PointerEvent::Leave,
        };
        if !input.axis.is_empty() || self.last_pointer != Some(pointer) {
            if self.last_pointer.is_some() || pointer != PointerEvent::Leave {
                input.pointer = Some(pointer);
            }
            self.last_pointer = Some(pointer);
        }
        input
    }

    fn paint(
        &self,
        painter: &egui::Painter,
        session: &ViewerSession,
        figure_rect: egui::Rect,
        plot_rects: &[egui::Rect],
        theme: &Theme,
    ) {
        let Some(axis) = session.axis() else {
            return;
        };
        let domain = axis.domain();
        let text_color = theme.text_color();
        let dim_color = text_color.gamma_multiply(0.6);
        let x_ticks = time_axis::ticks(domain);

        for (i, (track, &plot_rect)) in session.tracks().iter().zip(plot_rects).enumerate() {
            let color = color_for_index(i);
            let value_range = track.spec().value_range();

            painter.rect_filled(plot_rect, 0.0, theme.plot_bg());
            paint_grid(painter, axis, plot_rect, value_range, &x_ticks, theme);
            painter.rect_stroke(
                plot_rect,
                0.0,
                egui::Stroke::new(1.0, theme.border_color()),
                egui::StrokeKind::Outside,
            );

            painter.text(
                egui::Pos2::new(plot_rect.left() + 6.0, plot_rect.top() + 4.0),
                egui::Align2::LEFT_TOP,
                track.spec().axis_label(),
                egui::FontId::proportional(12.0),
                color,
            );

            let drawn = self.lines.get(i).copied().unwrap_or(false);
            match track.series().filter(|_| drawn) {
                Some(series) => paint_line(painter, axis, series, value_range, plot_rect, color),
                None => {
                    let note = track.placeholder_note().unwrap_or_default();
                    painter.text(
                        plot_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("{} unavailable: {note}", track.spec().name()),
                        egui::FontId::proportional(12.0),
                        dim_color,
                    );
                }
            }
        }

        if let Some(t) = self.cursor_line.filter(|&t| domain.contains(t)) {
            for plot_rect in plot_rects {
                let x = axis.time_to_screen(t, plot_rect.left(), plot_rect.width());
                painter.vline(x, plot_rect.y_range(), egui::Stroke::new(1.0, theme.cursor_color()));
            }
        }

        for (i, (track, &plot_rect)) in session.tracks().iter().zip(plot_rects).enumerate() {
            let Some(marker) = self.marker(i) else {
                continue;
            };
            if let Some(pos) = marker_position(axis, marker, track.spec().value_range(), plot_rect) {
                paint_marker(&painter.with_clip_rect(plot_rect), pos, &marker.label, plot_rect, color_for_index(i), theme);
            }
        }

        if let (Some(&last_rect), Some(step)) = (plot_rects.last(), time_axis::tick_step(domain)) {
            for &t in &x_ticks {
                let x = axis.time_to_screen(t, last_rect.left(), last_rect.width());
                painter.text(
                    egui::Pos2::new(x, last_rect.bottom() + 4.0),
                    egui::Align2::CENTER_TOP,
                    time_axis::tick_label(t, step),
                    egui::FontId::proportional(10.0),
                    dim_color,
                );
            }
            painter.text(
                egui::Pos2::new(last_rect.center().x, figure_rect.bottom() - 4.0),
                egui::Align2::CENTER_BOTTOM,
                "Time (s)",
                egui::FontId::proportional(12.0),
                text_color,
            );
        }

        if let Some((text, anchor)) = &self.readout {
            paint_readout(painter, text, *anchor, figure_rect, theme);
        }
    }
}

impl RenderSurface for TrackCanvas {
    fn draw_line(&mut self, track: usize, _series: &SampleSeries) {
        if track >= self.lines.len() {
            self.lines.resize(track + 1, false);
        }
        self.lines[track] = true;
    }

    fn set_marker(&mut self, track: usize, marker: Option<Marker>) {
        if track >= self.markers.len() {
            self.markers.resize(track + 1, None);
        }
        self.markers[track] = marker;
    }

    fn set_cursor_line(&mut self, time: Option<f64>) {
        self.cursor_line = time;
    }

    fn set_text(&mut self, content: Option<String>, anchor: ReadoutAnchor) {
        self.readout = content.map(|text| (text, anchor));
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }
}

/// Split the figure into equal-height plot areas, top to bottom.
pub fn track_rects(figure: egui::Rect, count: usize) -> Vec<egui::Rect> {
    if count == 0 {
        return Vec::new();
    }
    let left = figure.left() + LEFT_MARGIN;
    let right = (figure.right() - RIGHT_MARGIN).max(left + 1.0);
    let usable = figure.height() - TOP_MARGIN - BOTTOM_MARGIN - TRACK_GAP * (count - 1) as f32;
    let height = (usable / count as f32).max(1.0);

    (0..count)
        .map(|i| {
            let top = figure.top() + TOP_MARGIN + i as f32 * (height + TRACK_GAP);
            egui::Rect::from_min_max(egui::Pos2::new(left, top), egui::Pos2::new(right, top + height))
        })
        .collect()
}

fn value_to_y(value: f64, range: Range, rect: egui::Rect) -> f32 {
    let frac = if range.span() > 0.0 {
        (value - range.min) / range.span()
    } else {
        0.5
    };
    rect.bottom() - (frac as f32) * rect.height()
}

fn y_to_value(y: f32, range: Range, rect: egui::Rect) -> f64 {
    let frac = (rect.bottom() - y) as f64 / rect.height() as f64;
    range.min + frac * range.span()
}

/// Screen position of a marker, or `None` when its snapped sample lies
/// outside the visible domain. Off-scale values pin to the track edge.
fn marker_position(axis: &TimeAxis, marker: &Marker, value_range: Range, plot_rect: egui::Rect) -> Option<egui::Pos2> {
    if !axis.domain().contains(marker.time) {
        return None;
    }
    let x = axis.time_to_screen(marker.time, plot_rect.left(), plot_rect.width());
    let y = value_to_y(marker.value, value_range, plot_rect).clamp(plot_rect.top(), plot_rect.bottom());
    Some(egui::Pos2::new(x, y))
}

fn paint_grid(
    painter: &egui::Painter,
    axis: &TimeAxis,
    plot_rect: egui::Rect,
    value_range: Range,
    x_ticks: &[f64],
    theme: &Theme,
) {
    let stroke = egui::Stroke::new(1.0, theme.grid_color());
    for &t in x_ticks {
        let x = axis.time_to_screen(t, plot_rect.left(), plot_rect.width());
        painter.vline(x, plot_rect.y_range(), stroke);
    }

    let Some(step) = time_axis::tick_step(value_range) else {
        return;
    };
    let dim_color = theme.text_color().gamma_multiply(0.6);
    for v in time_axis::ticks(value_range) {
        let y = value_to_y(v, value_range, plot_rect);
        painter.hline(plot_rect.x_range(), y, stroke);
        painter.text(
            egui::Pos2::new(plot_rect.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            time_axis::tick_label(v, step),
            egui::FontId::proportional(10.0),
            dim_color,
        );
    }
}

fn paint_line(
    painter: &egui::Painter,
    axis: &TimeAxis,
    series: &SampleSeries,
    value_range: Range,
    plot_rect: egui::Rect,
    color: egui::Color32,
) {
    let clipped = painter.with_clip_rect(plot_rect);
    let budget = (plot_rect.width() as usize * 2).max(64);
    for run in downsampling::line_runs_for_view(series, axis.domain(), budget) {
        let points: Vec<egui::Pos2> = run
            .iter()
            .map(|&[t, v]| {
                egui::Pos2::new(
                    axis.time_to_screen(t, plot_rect.left(), plot_rect.width()),
                    value_to_y(v, value_range, plot_rect),
                )
            })
            .collect();
        if points.len() == 1 {
            clipped.circle_filled(points[0], 1.5, color);
        } else {
            clipped.line(points, egui::Stroke::new(1.5, color));
        }
    }
}

/// Dot plus a boxed value label. `painter` is clipped to the track.
fn paint_marker(
    painter: &egui::Painter,
    pos: egui::Pos2,
    label: &str,
    plot_rect: egui::Rect,
    color: egui::Color32,
    theme: &Theme,
) {
    painter.circle_filled(pos, 4.0, color);
    painter.circle_stroke(pos, 4.0, egui::Stroke::new(1.0, egui::Color32::WHITE));

    let font = egui::FontId::proportional(11.0);
    let galley = painter.layout_no_wrap(label.to_string(), font.clone(), color);
    let size = galley.rect.size();
    let mut text_pos = egui::Pos2::new(pos.x + 8.0, pos.y - size.y - 6.0);
    if text_pos.x + size.x > plot_rect.right() {
        text_pos.x = pos.x - size.x - 8.0;
    }
    text_pos.y = text_pos.y.max(plot_rect.top() + 2.0);

    let bg_rect = egui::Rect::from_min_size(
        egui::Pos2::new(text_pos.x - 4.0, text_pos.y - 2.0),
        egui::Vec2::new(size.x + 8.0, size.y + 4.0),
    );
    painter.rect_filled(bg_rect, 3.0, theme.label_bg());
    painter.rect_stroke(bg_rect, 3.0, egui::Stroke::new(0.5, color), egui::StrokeKind::Outside);
    painter.text(text_pos, egui::Align2::LEFT_TOP, label, font, color);
}

fn paint_readout(painter: &egui::Painter, text: &str, anchor: ReadoutAnchor, figure: egui::Rect, theme: &Theme) {
    let pos = egui::Pos2::new(
        figure.left() + anchor.x * figure.width(),
        figure.top() + anchor.y * figure.height(),
    );
    let font = egui::FontId::monospace(12.0);
    let galley = painter.layout_no_wrap(text.to_string(), font.clone(), theme.text_color());
    let size = galley.rect.size();
    let bg_rect = egui::Rect::from_min_size(
        egui::Pos2::new(pos.x - 4.0, pos.y - size.y - 2.0),
        egui::Vec2::new(size.x + 8.0, size.y + 4.0),
    );
    painter.rect_filled(bg_rect, 3.0, theme.label_bg());
    painter.text(pos, egui::Align2::LEFT_BOTTOM, text, font, theme.text_color());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_log;
    use crate::render::surface::SurfaceCommand;
    use crate::state::layout::ViewerConfig;

    fn figure() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::Vec2::new(800.0, 600.0))
    }

    fn marker_at(time: f64, value: f64) -> Marker {
        Marker {
            time,
            value,
            label: format!("Speed: {value}"),
        }
    }

    #[test]
    fn tracks_stack_without_overlap() {
        let rects = track_rects(figure(), 4);
        assert_eq!(rects.len(), 4);
        for pair in rects.windows(2) {
            assert!(pair[0].bottom() < pair[1].top());
            assert_eq!(pair[0].left(), pair[1].left());
            assert_eq!(pair[0].width(), pair[1].width());
        }
        assert!(rects[3].bottom() <= figure().bottom() - BOTTOM_MARGIN + 0.01);
        assert!(track_rects(figure(), 0).is_empty());
    }

    #[test]
    fn value_mapping_inverts() {
        let rect = track_rects(figure(), 1)[0];
        let range = Range::new(0.0, 25.0);
        let y = value_to_y(10.0, range, rect);
        assert!((y_to_value(y, range, rect) - 10.0).abs() < 1e-3);
        assert_eq!(value_to_y(0.0, range, rect), rect.bottom());
    }

    #[test]
    fn markers_outside_zoomed_domain_are_not_placed() {
        let rect = track_rects(figure(), 1)[0];
        let mut axis = TimeAxis::new(Range::new(0.0, 1.0));
        axis.zoom_about(0.5, 0.2);
        let speed = Range::new(0.0, 120.0);

        // A sparse channel snaps to t = 0, left of the visible [0.4, 0.6].
        assert_eq!(marker_position(&axis, &marker_at(0.0, 30.0), speed, rect), None);

        let pos = marker_position(&axis, &marker_at(0.45, 30.0), speed, rect).unwrap();
        assert!(rect.x_range().contains(pos.x), "{pos:?} outside {rect:?}");
        assert!(rect.y_range().contains(pos.y));
    }

    #[test]
    fn off_scale_marker_pins_to_track_edge() {
        let rect = track_rects(figure(), 1)[0];
        let axis = TimeAxis::new(Range::new(0.0, 1.0));
        let pos = marker_position(&axis, &marker_at(0.5, 500.0), Range::new(0.0, 120.0), rect).unwrap();
        assert_eq!(pos.y, rect.top());
    }

    #[test]
    fn canvas_records_commands_until_redraw_taken() {
        let mut canvas = TrackCanvas::default();
        canvas.reset(2);
        canvas.apply(vec![
            SurfaceCommand::SetMarker {
                track: 1,
                marker: Some(marker_at(1.0, 5.0)),
            },
            SurfaceCommand::SetCursorLine(Some(1.0)),
            SurfaceCommand::SetText {
                content: Some("t = 1.000 s   (index 1)".to_string()),
                anchor: ReadoutAnchor::default(),
            },
            SurfaceCommand::RequestRedraw,
        ]);
        assert!(canvas.marker(0).is_none());
        assert_eq!(canvas.marker(1).map(|m| m.time), Some(1.0));
        assert_eq!(canvas.cursor_line, Some(1.0));
        assert_eq!(
            canvas.readout.as_ref().map(|(text, _)| text.as_str()),
            Some("t = 1.000 s   (index 1)")
        );
        assert!(canvas.take_redraw());
        assert!(!canvas.take_redraw());

        canvas.reset(2);
        assert_eq!(canvas.cursor_line, None);
        assert!(canvas.readout.is_none());
    }

    #[test]
    fn canvas_keeps_track_indices_not_samples() {
        let series = SampleSeries::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        let mut canvas = TrackCanvas::default();
        canvas.reset(3);
        canvas.draw_line(2, &series);
        assert_eq!(canvas.lines, [false, false, true]);
    }

    #[test]
    fn pointer_frame_is_painted_with_its_own_commands() {
        let table = parse_log("timestamp,RPM,ECU Boost\n0.0,900,0.5\n1.0,2500,8.0\n2.0,4800,17.5\n").unwrap();
        let mut session = ViewerSession::build("run".to_string(), &table, &ViewerConfig::default());
        let mut canvas = TrackCanvas::default();
        canvas.reset(session.tracks().len());
        session.draw_lines(&mut canvas);
        let theme = Theme::default();

        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(figure()),
            events: vec![egui::Event::PointerMoved(egui::Pos2::new(400.0, 50.0))],
            ..Default::default()
        };
        let output = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| canvas.show(ui, &mut session, &theme));
        });

        assert!(session.crosshair_state().is_active());
        assert!(canvas.cursor_line.is_some());
        assert!(canvas.marker(0).is_some());
        // Commands were applied and painted inside the same frame.
        assert!(!canvas.take_redraw());
        assert!(!output.shapes.is_empty());
    }
}
