use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::{egui, Frame};
use log::{info, warn};

use super::state::{Notices, Screen};
use crate::config::AppConfig;
use crate::selector::LabelSelector;
use crate::sensor::{source_from_config, SensorSource};

/// Builds a fresh sensor source each time the measurement screen opens.
pub type SourceFactory = Box<dyn Fn(&AppConfig) -> Box<dyn SensorSource>>;

/// Longest sleep between frames while idle on the selector screen.
const IDLE_REPAINT: Duration = Duration::from_millis(500);

pub struct DriverImuApp {
    pub config: AppConfig,
    pub screen: Screen,
    pub notices: Notices,
    /// Full path of the last saved recording, shown until dismissed.
    pub saved_dialog: Option<PathBuf>,
    pub(crate) source_factory: SourceFactory,
    pub(crate) visible: bool,
}

impl DriverImuApp {
    pub fn new(config: AppConfig) -> Self {
        Self::with_source_factory(config, Box::new(source_from_config))
    }

    pub fn with_source_factory(config: AppConfig, source_factory: SourceFactory) -> Self {
        let notices = Notices::new(config.display.notice_lifetime());
        info!("Application ready, waiting for label selection");
        Self {
            config,
            screen: Screen::LabelSelection(LabelSelector::new()),
            notices,
            saved_dialog: None,
            source_factory,
            visible: true,
        }
    }

    /// Adds the configured Hangul-capable font as a fallback for every family.
    pub fn install_fonts(&self, ctx: &egui::Context) {
        let Some(path) = &self.config.display.font_path else {
            return;
        };
        match std::fs::read(path) {
            Ok(bytes) => {
                let mut fonts = egui::FontDefinitions::default();
                fonts
                    .font_data
                    .insert("hangul".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
                for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                    fonts.families.entry(family).or_default().push("hangul".to_owned());
                }
                ctx.set_fonts(fonts);
                info!("Loaded font {}", path.display());
            }
            Err(e) => warn!("Failed to load font {}: {}", path.display(), e),
        }
    }

    fn next_repaint(&self, now: Instant) -> Duration {
        let refresh = match &self.screen {
            Screen::Measurement(screen) => screen.refresh.time_until_next(now),
            Screen::LabelSelection(_) => None,
        };
        [refresh, self.notices.next_expiry(now), Some(IDLE_REPAINT)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(IDLE_REPAINT)
    }
}

impl eframe::App for DriverImuApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        ctx.set_visuals(egui::Visuals::light());
        let now = Instant::now();

        self.handle_visibility(ctx, now);
        self.handle_measurement(now);
        self.notices.prune(now);

        crate::app::ui::render_status_bar(self, ctx);
        crate::app::ui::render_notice_bar(self, ctx);
        crate::app::ui::render_saved_dialog(self, ctx);
        match self.screen {
            Screen::LabelSelection(_) => crate::app::ui::render_label_panel(self, ctx),
            Screen::Measurement(_) => crate::app::ui::render_measurement_panel(self, ctx),
        }

        if self.visible {
            ctx.request_repaint_after(self.next_repaint(now));
        }
    }
}
