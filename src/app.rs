use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::data::loader::{self, LogTable};
use crate::error::LoadError;
use crate::render::surface::RenderSurface;
use crate::render::time_axis::AxisInput;
use crate::state::layout::ViewerConfig;
use crate::state::session::{FrameInput, ViewerSession};
use crate::state::theme::Theme;
use crate::ui::track_canvas::TrackCanvas;

type LoadSlot = Arc<Mutex<Option<Result<LogTable, LoadError>>>>;

/// Pending async file load result.
struct PendingLoad {
    path: PathBuf,
    result: LoadSlot,
}

/// The log viewer window.
pub struct TunerlogApp {
    config: ViewerConfig,
    session: Option<ViewerSession>,
    canvas: TrackCanvas,
    theme: Theme,
    /// An error message shown in the footer until dismissed.
    error_message: Option<String>,
    pending_load: Option<PendingLoad>,
}

impl TunerlogApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig, initial_log: Option<PathBuf>) -> Self {
        let theme = Theme::default();
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(20.0));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
        ctx.set_visuals(theme.visuals());

        let mut app = Self {
            config,
            session: None,
            canvas: TrackCanvas::default(),
            theme,
            error_message: None,
            pending_load: None,
        };
        if let Some(path) = initial_log {
            app.load_file(&path);
        }
        app
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JB4 Logs", &["csv"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(&path);
        }
    }

    /// Parse a log on a worker thread so the UI stays responsive.
    fn load_file(&mut self, path: &Path) {
        let path_buf = path.to_path_buf();
        let result: LoadSlot = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        std::thread::spawn(move || {
            let loaded = loader::load_file(&path_buf);
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(loaded);
            }
        });

        self.pending_load = Some(PendingLoad {
            path: path.to_path_buf(),
            result,
        });
    }

    fn poll_pending_load(&mut self) {
        let Some(pending) = &self.pending_load else {
            return;
        };
        let finished = match pending.result.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => Some(Err(LoadError::Io(std::io::Error::other("loader thread panicked")))),
        };
        let Some(result) = finished else {
            return;
        };
        let path = pending.path.clone();
        self.pending_load = None;

        match result {
            Ok(table) => self.show_log(&path, &table),
            Err(e) => {
                tracing::error!("Failed to load {}: {e}", path.display());
                self.error_message = Some(format!("Failed to load file: {e}"));
            }
        }
    }

    fn show_log(&mut self, path: &Path, table: &LogTable) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let session = ViewerSession::build(format!("JB4 Log: {file_name}"), table, &self.config);

        self.canvas.reset(session.tracks().len());
        session.draw_lines(&mut self.canvas);
        self.canvas.request_redraw();
        self.error_message = None;
        self.session = Some(session);
    }
}

impl eframe::App for TunerlogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.theme.visuals());

        let mut dropped_paths: Vec<PathBuf> = Vec::new();
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    let is_csv = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
                    if is_csv {
                        dropped_paths.push(path.clone());
                    }
                }
            }
        });
        // Only the last dropped log is shown; one window holds one session.
        if let Some(path) = dropped_paths.pop() {
            self.load_file(&path);
        }

        self.poll_pending_load();

        let mut open_clicked = false;
        let mut reset_clicked = false;
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Tunerlog");
                    ui.separator();
                    if ui.button("Open Log").clicked() {
                        open_clicked = true;
                    }
                    let zoomed = self
                        .session
                        .as_ref()
                        .and_then(ViewerSession::axis)
                        .is_some_and(|axis| axis.is_zoomed());
                    if ui
                        .add_enabled(zoomed, egui::Button::new("Reset View"))
                        .on_hover_text("Show the whole log (double-click or Home)")
                        .clicked()
                    {
                        reset_clicked = true;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.theme = self.theme.toggle();
                            tracing::debug!("Theme set to {}", self.theme.label());
                        }
                    });
                });
            });

        if open_clicked {
            self.open_file_dialog();
        }

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match &self.session {
                        Some(session) => {
                            let live = session.tracks().iter().filter(|t| t.is_live()).count();
                            ui.label(
                                egui::RichText::new(format!("{live} of {} channels", session.tracks().len())).weak(),
                            );
                            if let Some(t) = session.crosshair_state().current_time() {
                                ui.separator();
                                ui.label(egui::RichText::new(format!("pointer {t:.3} s")).weak());
                            }
                        }
                        None => {
                            ui.label(egui::RichText::new("No log loaded").weak());
                        }
                    }

                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        if reset_clicked {
            if let Some(session) = self.session.as_mut() {
                let commands = session.handle_frame(FrameInput {
                    axis: vec![AxisInput::Reset],
                    pointer: None,
                });
                self.canvas.apply(commands);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| match &mut self.session {
            Some(session) => {
                ui.vertical_centered(|ui| {
                    ui.heading(session.title());
                });
                self.canvas.show(ui, session, &self.theme);
                if session.crosshair_state().is_active() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
                }
            }
            None => {
                ui.add_space(40.0);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("No log loaded").strong().size(16.0));
                    ui.add_space(6.0);
                    ui.label(
                        egui::RichText::new("Click \"Open Log\" above or drag-and-drop a JB4 .csv file.").weak(),
                    );
                });
            }
        });

        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading log...");
                    });
                });
            ctx.request_repaint();
        }

        if self.canvas.take_redraw() {
            ctx.request_repaint();
        }
    }
}
