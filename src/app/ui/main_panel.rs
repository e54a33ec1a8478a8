use std::time::Instant;

use eframe::egui;

use crate::app::app_core::DriverImuApp;
use crate::app::state::Screen;
use crate::utils::format_reading;

enum Action {
    Toggle,
    Back,
}

pub fn render_measurement_panel(app: &mut DriverImuApp, ctx: &egui::Context) {
    let mut action = None;

    egui::CentralPanel::default().show(ctx, |ui| {
        let Screen::Measurement(screen) = &app.screen else {
            return;
        };

        ui.horizontal(|ui| {
            if ui.button("◀ Back").clicked() {
                action = Some(Action::Back);
            }
            ui.separator();
            match screen.recorder.selection() {
                Some(selection) => ui.label(format!("Label: {}", selection)),
                None => ui.colored_label(egui::Color32::from_rgb(150, 0, 0), "No label selected"),
            };
            ui.separator();
            ui.label(egui::RichText::new(&screen.frame.clock).monospace());
        });
        ui.add_space(10.0);

        egui::Grid::new("readings")
            .num_columns(4)
            .spacing([24.0, 6.0])
            .striped(true)
            .show(ui, |ui| {
                for (kind, value) in &screen.frame.readings {
                    ui.strong(kind.display_name());
                    for axis in value.to_array() {
                        ui.monospace(format_reading(axis, kind.unit()));
                    }
                    ui.end_row();
                }
            });

        ui.add_space(10.0);
        let toggle_text = if screen.recorder.is_recording() {
            "⏹ Stop measurement"
        } else {
            "⏺ Start measurement"
        };
        if ui.button(toggle_text).clicked() {
            action = Some(Action::Toggle);
        }
        if let Some(path) = screen.recorder.session_path() {
            ui.label(format!("Writing {} ({} rows)", path.display(), screen.recorder.session_rows()));
        }

        ui.separator();
        egui::ScrollArea::vertical().show(ui, |ui| {
            screen.trace.ui(ui, &app.config.display);
        });
    });

    let now = Instant::now();
    match action {
        Some(Action::Toggle) => app.toggle_recording(now),
        Some(Action::Back) => app.back_to_selector(now),
        None => {}
    }
}
