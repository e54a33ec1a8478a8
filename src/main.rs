mod app;
mod config;
mod logger;
mod plotter;
mod recorder;
mod refresh;
mod selector;
mod sensor;
mod types;
mod utils;

use std::path::PathBuf;

use eframe::egui;
use log::{error, info};

use app::DriverImuApp;
use config::{AppConfig, DEFAULT_CONFIG_FILE};

fn main() {
    dotenv::dotenv().ok();

    let mut args = std::env::args().skip(1).peekable();
    let init_config = args.next_if(|a| a == "--init-config").is_some();
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if init_config {
        logger::init_logger("info");
        match AppConfig::default().save_to_file(&config_path) {
            Ok(()) => info!("Wrote default configuration to {}", config_path.display()),
            Err(e) => {
                error!("Cannot write {}: {}", config_path.display(), e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = match AppConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            logger::init_logger("info");
            error!("Invalid configuration {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };
    logger::init_logger(&config.log_level);
    info!(
        "Application starting (config: {}, source: {:?}, storage: {})",
        config_path.display(),
        config.sensors.source,
        config.storage.root_dir.display()
    );

    let options = eframe::NativeOptions {
        vsync: config.window.vsync,
        renderer: eframe::Renderer::Glow,
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(config.window.resizable),
        ..Default::default()
    };

    let title = config.window.title.clone();
    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(|cc| {
            let app = DriverImuApp::new(config);
            app.install_fonts(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    ) {
        error!("GUI failed: {}", e);
        std::process::exit(1);
    }

    info!("GUI closed");
}
