mod app;
mod color;
mod state;
mod ui;

use app::RustySpectraApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Any arguments are mode tables to open on start-up.
    let files: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Spectra – Vibrational Spectrum Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(RustySpectraApp::with_files(&files)))),
    )
}
