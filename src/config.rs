use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::SensorKind;

pub const DEFAULT_CONFIG_FILE: &str = "driver_imu.toml";

/// Application configuration.
/// Loaded from `driver_imu.toml` when present, otherwise defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub window: WindowConfig,
    pub storage: StorageConfig,
    pub sensors: SensorConfig,
    pub mqtt: MqttConfig,
    pub display: DisplayConfig,
    pub recording: RecordingConfig,
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
}

/// Where recordings are written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// `Driver/<category>/<label>/...` is created below this directory.
    pub root_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Simulated,
    Mqtt,
}

/// Sensor sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    pub source: SourceKind,
    /// Requested sampling period in microseconds (10 000 = 100 Hz).
    pub sampling_period_us: u64,
    /// Kinds sampled and written to CSV. Must include the gyroscope.
    pub tracked: Vec<SensorKind>,
    /// Kinds the connected device provides.
    pub available: Vec<SensorKind>,
    pub channel_capacity: usize,
}

/// MQTT configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub keep_alive: u16,
}

/// Live display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub refresh_interval_ms: u64,
    pub notice_seconds: f32,
    /// Number of refresh frames kept in the live plot.
    pub plot_window_frames: usize,
    pub plot_height: f32,
    pub colors: PlotColors,
    /// Optional TTF/OTF font with Hangul glyphs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

/// Plot colors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotColors {
    pub x_axis: [u8; 3],
    pub y_axis: [u8; 3],
    pub z_axis: [u8; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimestampMode {
    /// Milliseconds since the session started.
    Elapsed,
    /// Epoch milliseconds.
    WallClock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordingConfig {
    pub timestamp_mode: TimestampMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            storage: StorageConfig::default(),
            sensors: SensorConfig::default(),
            mqtt: MqttConfig::default(),
            display: DisplayConfig::default(),
            recording: RecordingConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 640.0,
            title: "Driver IMU".to_string(),
            resizable: true,
            vsync: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data"),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Simulated,
            sampling_period_us: 10_000,
            tracked: SensorKind::ALL.to_vec(),
            available: SensorKind::ALL.to_vec(),
            channel_capacity: 5000,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "localhost".to_string(),
            port: 1883,
            client_id: "driver-imu-01".to_string(),
            topic: "driver/imu".to_string(),
            keep_alive: 5,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 100,
            notice_seconds: 2.0,
            plot_window_frames: 100,
            plot_height: 80.0,
            colors: PlotColors::default(),
            font_path: None,
        }
    }
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            x_axis: [220, 50, 47],
            y_axis: [0, 150, 0],
            z_axis: [38, 139, 210],
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            timestamp_mode: TimestampMode::Elapsed,
        }
    }
}

impl SensorConfig {
    pub fn sampling_period(&self) -> Duration {
        Duration::from_micros(self.sampling_period_us)
    }
}

impl DisplayConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn notice_lifetime(&self) -> Duration {
        Duration::from_secs_f32(self.notice_seconds.max(0.0))
    }
}

impl AppConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, fall back to defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::ValidationError("Window dimensions must be positive".to_string()));
        }

        if !self.sensors.tracked.iter().any(|k| k.is_required()) {
            return Err(ConfigError::ValidationError("Tracked sensors must include the gyroscope".to_string()));
        }

        if self.sensors.sampling_period_us == 0 {
            return Err(ConfigError::ValidationError("Sampling period must be positive".to_string()));
        }

        if self.sensors.channel_capacity == 0 {
            return Err(ConfigError::ValidationError("Sensor channel capacity must be positive".to_string()));
        }

        if self.display.refresh_interval_ms == 0 {
            return Err(ConfigError::ValidationError("Refresh interval must be positive".to_string()));
        }

        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("driver_imu.toml");

        let mut config = AppConfig::default();
        config.sensors.source = SourceKind::Mqtt;
        config.recording.timestamp_mode = TimestampMode::WallClock;
        config.save_to_file(&path).unwrap();

        assert_eq!(AppConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [sensors]
            tracked = ["gyroscope"]
            "#,
        )
        .unwrap();
        assert_eq!(config.sensors.tracked, vec![SensorKind::Gyroscope]);
        assert_eq!(config.sensors.sampling_period_us, 10_000);
        assert_eq!(config.display.refresh_interval_ms, 100);
    }

    #[test]
    fn rejects_config_without_gyroscope() {
        let mut config = AppConfig::default();
        config.sensors.tracked = vec![SensorKind::Accelerometer];
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
