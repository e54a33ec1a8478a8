use eframe::egui;

use crate::app::app_core::DriverImuApp;

/// Confirmation naming the full path of the file just saved.
pub fn render_saved_dialog(app: &mut DriverImuApp, ctx: &egui::Context) {
    let Some(path) = &app.saved_dialog else {
        return;
    };
    let mut dismissed = false;

    egui::Window::new("Saved")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Recording saved to:");
            ui.monospace(path.display().to_string());
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        app.saved_dialog = None;
    }
}
