pub mod label_panel;
pub mod main_panel;
pub mod saved_dialog;
pub mod status_bar;

pub use label_panel::render_label_panel;
pub use main_panel::render_measurement_panel;
pub use saved_dialog::render_saved_dialog;
pub use status_bar::{render_notice_bar, render_status_bar};
