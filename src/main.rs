mod app;
mod data;
mod error;
mod processing;
mod render;
mod state;
mod ui;

use app::TunerlogApp;
use clap::Parser;
use eframe::egui;
use eframe::egui_wgpu;
use state::layout::{CliArgs, ViewerConfig};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();
    let config = match &args.layout {
        Some(path) => ViewerConfig::load(path).unwrap_or_else(|e| {
            tracing::error!("Failed to read layout {}: {e}; using the default tracks", path.display());
            ViewerConfig::default()
        }),
        None => ViewerConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tunerlog")
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "Tunerlog",
        options,
        Box::new(move |cc| Ok(Box::new(TunerlogApp::new(cc, config, args.log)))),
    )
}
