use eframe::egui;

use crate::app::app_core::DriverImuApp;
use crate::app::state::{NoticeLevel, Screen};

pub fn render_status_bar(app: &DriverImuApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("status_bar")
        .min_height(32.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Status:");

                let (status_text, status_color) = match &app.screen {
                    Screen::LabelSelection(_) => ("Selecting", egui::Color32::from_rgb(0, 100, 200)),
                    Screen::Measurement(screen) if screen.recorder.is_recording() => {
                        ("Recording", egui::Color32::from_rgb(0, 150, 0))
                    }
                    Screen::Measurement(screen) if screen.recorder.is_active() => {
                        ("Idle", egui::Color32::from_rgb(255, 165, 0))
                    }
                    Screen::Measurement(_) => ("Paused", egui::Color32::from_rgb(150, 0, 0)),
                };
                ui.colored_label(status_color, status_text);

                if let Screen::Measurement(screen) = &app.screen {
                    ui.separator();
                    ui.label(format!("Source: {}", screen.recorder.source_name()));
                    ui.separator();
                    ui.label(format!(
                        "Sampling: {:.0} Hz",
                        1_000_000.0 / app.config.sensors.sampling_period_us as f64
                    ));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Storage: {}", app.config.storage.root_dir.display()));
                });
            });
            ui.add_space(4.0);
        });
}

pub fn render_notice_bar(app: &DriverImuApp, ctx: &egui::Context) {
    if app.notices.is_empty() {
        return;
    }
    egui::TopBottomPanel::bottom("notice_bar")
        .min_height(25.0)
        .show(ctx, |ui| {
            ui.add_space(3.0);
            for notice in app.notices.iter() {
                let color = match notice.level {
                    NoticeLevel::Info => egui::Color32::from_rgb(0, 100, 200),
                    NoticeLevel::Warn => egui::Color32::from_rgb(200, 120, 0),
                    NoticeLevel::Error => egui::Color32::from_rgb(180, 0, 0),
                };
                ui.colored_label(color, &notice.text);
            }
            ui.add_space(3.0);
        });
}
