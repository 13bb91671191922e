//! Entry point for the voicedeck desktop app.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use eframe::egui;
use voicedeck::audio::AudioPlayer;
use voicedeck::egui_app::controller::EguiController;
use voicedeck::egui_app::ui::{EguiApp, MIN_VIEWPORT_SIZE};
use voicedeck::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let viewport = egui::ViewportBuilder::default()
        .with_title("voicedeck")
        .with_inner_size(egui::vec2(820.0, 640.0))
        .with_min_inner_size(MIN_VIEWPORT_SIZE);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "voicedeck",
        native_options,
        Box::new(|_cc| {
            let app: Box<dyn eframe::App> = match EguiController::from_disk(|config| {
                Box::new(AudioPlayer::new(config.volume))
            }) {
                Ok(controller) => Box::new(EguiApp::new(controller)),
                Err(err) => Box::new(LaunchError {
                    message: format!("Failed to prepare app directory: {err}"),
                }),
            };
            Ok(app)
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
                ui.heading("Failed to start UI");
                ui.label(&self.message);
            });
        });
    }
}
