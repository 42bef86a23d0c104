#![deny(missing_docs)]

//! Entry point for the egui-based anomaly viewer.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use anomaly_lens::config::{self, ViewerConfig};
use anomaly_lens::egui_app::controller::AnomalyController;
use anomaly_lens::egui_app::ui::{AnomalyLensApp, MIN_VIEWPORT_SIZE};
use anomaly_lens::logging::{self, ConsoleStream};
use eframe::egui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init(ConsoleStream::Stdout) {
        eprintln!("Logging disabled: {err}");
    }

    let config = match config::load_or_default() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Using default configuration: {err}");
            ViewerConfig::default()
        }
    };
    let title = config.title.clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size(MIN_VIEWPORT_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| match AnomalyController::from_config(config) {
            Ok(controller) => Ok(Box::new(AnomalyLensApp::new(controller))),
            Err(err) => Ok(Box::new(LaunchError {
                message: err.to_string(),
            })),
        }),
    )?;
    Ok(())
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start viewer");
                ui.label(&self.message);
            });
        });
    }
}
