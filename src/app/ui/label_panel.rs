use std::time::Instant;

use eframe::egui;

use crate::app::app_core::DriverImuApp;
use crate::app::state::Screen;
use crate::types::Category;

pub fn render_label_panel(app: &mut DriverImuApp, ctx: &egui::Context) {
    let mut proceed = false;

    egui::CentralPanel::default().show(ctx, |ui| {
        let Screen::LabelSelection(selector) = &mut app.screen else {
            return;
        };

        ui.heading("Driving label");
        ui.add_space(10.0);

        ui.label("Category");
        ui.horizontal(|ui| {
            for category in Category::ALL {
                let checked = selector.category() == Some(category);
                if ui.radio(checked, category.dir_name()).clicked() {
                    selector.select_category(category);
                }
            }
        });

        ui.add_space(10.0);
        ui.label("Label");
        if selector.labels().is_empty() {
            ui.weak("Choose a category first");
        } else {
            let selected = selector.selected_label();
            let mut clicked = None;
            ui.vertical(|ui| {
                for (index, label) in selector.labels().iter().enumerate() {
                    if ui.radio(selected == Some(*label), *label).clicked() {
                        clicked = Some(index);
                    }
                }
            });
            if let Some(index) = clicked {
                selector.select_label(index);
            }
        }

        ui.add_space(20.0);
        if ui.button("Start").clicked() {
            proceed = true;
        }
    });

    if proceed {
        app.proceed_from_selector(Instant::now());
    }
}
