use std::time::Instant;

use chrono::Local;
use eframe::egui;
use log::info;

use super::app_core::DriverImuApp;
use super::state::{MeasurementScreen, NoticeLevel, Screen};
use crate::recorder::RecorderError;
use crate::selector::LabelSelector;
use crate::types::{SavedRecording, Selection, ToggleOutcome};

impl DriverImuApp {
    /// Minimized or closing windows count as an inactive screen.
    pub fn handle_visibility(&mut self, ctx: &egui::Context, now: Instant) {
        let (minimized, closing) = ctx.input(|i| {
            let viewport = i.viewport();
            (viewport.minimized.unwrap_or(false), viewport.close_requested())
        });
        self.set_visible(!(minimized || closing), now);
    }

    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        info!("Window {}", if visible { "shown" } else { "hidden" });
        if visible {
            self.activate_measurement(now);
        } else {
            self.deactivate_measurement(now);
        }
    }

    /// Pumps sensor events and the refresh cadence of the measurement screen.
    pub fn handle_measurement(&mut self, now: Instant) {
        let Screen::Measurement(screen) = &mut self.screen else {
            return;
        };
        if let Err(e) = screen.update(now) {
            self.notices
                .push(NoticeLevel::Error, format!("Recording stopped: {}", e), now);
        }
    }

    /// Label selector "Start" button.
    pub fn proceed_from_selector(&mut self, now: Instant) {
        let Screen::LabelSelection(selector) = &self.screen else {
            return;
        };
        match selector.proceed() {
            Ok(selection) => {
                let (category, label) = LabelSelector::params(&selection);
                self.enter_measurement(Some(&category), Some(&label), now);
            }
            Err(e) => self.notices.push(NoticeLevel::Warn, e.to_string(), now),
        }
    }

    /// Opens the measurement screen with the opaque selection parameters.
    pub fn enter_measurement(&mut self, category: Option<&str>, label: Option<&str>, now: Instant) {
        let selection = Selection::from_params(category, label);
        match &selection {
            Some(selection) => self
                .notices
                .push(NoticeLevel::Info, format!("Selected label: {}", selection.label()), now),
            None => info!("Measurement opened without a label selection"),
        }

        let source = (self.source_factory)(&self.config);
        self.screen = Screen::Measurement(Box::new(MeasurementScreen::new(&self.config, source, selection)));
        if self.visible {
            self.activate_measurement(now);
        }
    }

    /// Back button: closes the measurement screen and returns to the selector.
    pub fn back_to_selector(&mut self, now: Instant) {
        self.deactivate_measurement(now);
        self.screen = Screen::LabelSelection(LabelSelector::new());
    }

    fn activate_measurement(&mut self, now: Instant) {
        let Screen::Measurement(screen) = &mut self.screen else {
            return;
        };
        match screen.activate(now) {
            Ok(activation) => {
                for kind in activation.missing_optional {
                    self.notices
                        .push(NoticeLevel::Warn, format!("This device has no {}.", kind), now);
                }
            }
            Err(e @ RecorderError::RequiredSensorUnavailable(_)) => {
                self.notices.push(NoticeLevel::Error, e.to_string(), now);
                self.screen = Screen::LabelSelection(LabelSelector::new());
            }
            Err(e) => {
                self.notices
                    .push(NoticeLevel::Error, format!("Cannot start sensors: {}", e), now);
            }
        }
    }

    fn deactivate_measurement(&mut self, now: Instant) {
        let Screen::Measurement(screen) = &mut self.screen else {
            return;
        };
        let result = screen.deactivate();
        self.report_stop(result, now);
    }

    /// Start/stop measurement button.
    pub fn toggle_recording(&mut self, now: Instant) {
        let Screen::Measurement(screen) = &mut self.screen else {
            return;
        };
        match screen.recorder.toggle(Local::now()) {
            Ok(ToggleOutcome::Started(path)) => {
                self.notices.push(
                    NoticeLevel::Info,
                    format!("Measurement started: {}", path.display()),
                    now,
                );
            }
            Ok(ToggleOutcome::Stopped(saved)) => self.report_stop(Ok(Some(saved)), now),
            Ok(ToggleOutcome::Refused) => {
                self.notices
                    .push(NoticeLevel::Warn, "Select a category and label first.", now);
            }
            Err(e) => {
                self.notices
                    .push(NoticeLevel::Error, format!("Cannot start measurement: {}", e), now);
            }
        }
    }

    fn report_stop(&mut self, result: Result<Option<SavedRecording>, RecorderError>, now: Instant) {
        match result {
            Ok(Some(saved)) => {
                self.notices.push(
                    NoticeLevel::Info,
                    format!("Measurement stopped ({} rows).", saved.rows),
                    now,
                );
                self.saved_dialog = Some(saved.path);
            }
            Ok(None) => {}
            Err(e) => {
                self.notices
                    .push(NoticeLevel::Error, format!("Saving failed: {}", e), now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::sensor::testing::ManualSensorSource;
    use crate::sensor::SensorSource;
    use crate::types::{Category, SensorKind};

    fn app_with(available: &'static [SensorKind], root: &std::path::Path) -> DriverImuApp {
        let mut config = AppConfig::default();
        config.storage.root_dir = root.to_path_buf();
        DriverImuApp::with_source_factory(
            config,
            Box::new(move |_: &AppConfig| -> Box<dyn SensorSource> {
                Box::new(ManualSensorSource::new(available).0)
            }),
        )
    }

    fn notice_texts(app: &DriverImuApp) -> Vec<String> {
        app.notices.iter().map(|n| n.text.clone()).collect()
    }

    #[test]
    fn proceeding_without_label_stays_on_selector() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&SensorKind::ALL, dir.path());
        let now = Instant::now();

        if let Screen::LabelSelection(selector) = &mut app.screen {
            selector.select_category(Category::Normal);
        }
        app.proceed_from_selector(now);

        assert!(matches!(app.screen, Screen::LabelSelection(_)));
        assert_eq!(notice_texts(&app), vec!["Please select a label."]);
    }

    #[test]
    fn full_selection_opens_active_measurement() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&SensorKind::ALL, dir.path());
        let now = Instant::now();

        if let Screen::LabelSelection(selector) = &mut app.screen {
            selector.select_category(Category::Abnormal);
            selector.select_label(0);
        }
        app.proceed_from_selector(now);

        let Screen::Measurement(screen) = &app.screen else {
            panic!("expected measurement screen");
        };
        assert!(screen.recorder.is_active());
        assert!(screen.refresh.is_running());
        assert_eq!(screen.recorder.selection().map(|s| s.label()), Some("급가속"));
    }

    #[test]
    fn missing_gyroscope_returns_to_selector() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&[SensorKind::Accelerometer], dir.path());
        app.enter_measurement(Some("normal"), Some("정상 감속"), Instant::now());

        assert!(matches!(app.screen, Screen::LabelSelection(_)));
        assert!(notice_texts(&app)
            .iter()
            .any(|t| t.contains("Gyroscope sensor is not available")));
    }

    #[test]
    fn missing_optional_sensor_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&[SensorKind::Gyroscope, SensorKind::Accelerometer], dir.path());
        app.enter_measurement(Some("normal"), Some("정상 감속"), Instant::now());

        assert!(matches!(app.screen, Screen::Measurement(_)));
        let warnings: Vec<_> = notice_texts(&app)
            .into_iter()
            .filter(|t| t.contains("no Magnetometer"))
            .collect();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn toggle_without_selection_is_refused_with_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&SensorKind::ALL, dir.path());
        let now = Instant::now();
        app.enter_measurement(None, None, now);
        app.toggle_recording(now);

        let Screen::Measurement(screen) = &app.screen else {
            panic!("expected measurement screen");
        };
        assert!(!screen.recorder.is_recording());
        assert!(notice_texts(&app).contains(&"Select a category and label first.".to_string()));
    }

    #[test]
    fn hiding_window_while_recording_saves_and_shows_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&SensorKind::ALL, dir.path());
        let now = Instant::now();
        app.enter_measurement(Some("abnormal"), Some("급우회전"), now);
        app.toggle_recording(now);

        app.set_visible(false, now);

        let Screen::Measurement(screen) = &app.screen else {
            panic!("expected measurement screen");
        };
        assert!(!screen.recorder.is_recording());
        assert!(!screen.recorder.is_active());
        assert!(!screen.refresh.is_running());
        let saved = app.saved_dialog.clone().unwrap();
        assert!(saved.starts_with(dir.path().join("Driver/이상/급우회전")));
        assert_eq!(std::fs::read_to_string(saved).unwrap().lines().count(), 1);

        app.set_visible(true, now);
        let Screen::Measurement(screen) = &app.screen else {
            panic!("expected measurement screen");
        };
        assert!(screen.recorder.is_active());
        assert!(!screen.recorder.is_recording());
    }

    #[test]
    fn back_button_closes_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(&SensorKind::ALL, dir.path());
        let now = Instant::now();
        app.enter_measurement(Some("normal"), Some("정상 우회전"), now);
        app.toggle_recording(now);
        app.back_to_selector(now);

        assert!(matches!(app.screen, Screen::LabelSelection(_)));
        assert!(app.saved_dialog.is_some());
    }
}
