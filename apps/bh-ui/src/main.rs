#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod views;

use app::BenchmarkHealthApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Benchmark Health"),
        ..Default::default()
    };

    eframe::run_native(
        "Benchmark Health",
        options,
        Box::new(|cc| Ok(Box::new(BenchmarkHealthApp::new(cc)))),
    )
}
