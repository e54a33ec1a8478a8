use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::Local;
use log::{error, info, warn};

use crate::config::AppConfig;
use crate::plotter::LiveTrace;
use crate::recorder::{RecorderError, RecorderSettings, SamplingRecorder};
use crate::refresh::PeriodicTask;
use crate::selector::LabelSelector;
use crate::sensor::SensorSource;
use crate::types::{Activation, SavedRecording, Selection, SensorKind, Vector3};
use crate::utils::format_clock;

/// Application state split by screen.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    expires_at: Instant,
}

/// Short-lived user-facing messages.
#[derive(Debug)]
pub struct Notices {
    items: VecDeque<Notice>,
    lifetime: Duration,
}

impl Notices {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>, now: Instant) {
        let text = text.into();
        match level {
            NoticeLevel::Info => info!("Notice: {}", text),
            NoticeLevel::Warn => warn!("Notice: {}", text),
            NoticeLevel::Error => error!("Notice: {}", text),
        }
        self.items.push_back(Notice {
            level,
            text,
            expires_at: now + self.lifetime,
        });
    }

    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| n.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Earliest expiry, so the UI can repaint when a notice goes away.
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.items
            .iter()
            .map(|n| n.expires_at.saturating_duration_since(now))
            .min()
    }
}

/// What the measurement screen renders; replaced on every refresh tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayFrame {
    pub readings: Vec<(SensorKind, Vector3)>,
    pub clock: String,
}

/// The measurement screen: recorder plus its display refresh cadence.
pub struct MeasurementScreen {
    pub recorder: SamplingRecorder,
    pub refresh: PeriodicTask,
    pub frame: DisplayFrame,
    pub trace: LiveTrace,
}

impl MeasurementScreen {
    pub fn new(config: &AppConfig, source: Box<dyn SensorSource>, selection: Option<Selection>) -> Self {
        let recorder = SamplingRecorder::new(RecorderSettings::from(config), source, selection);
        let interval = config.display.refresh_interval();
        let trace = LiveTrace::new(
            recorder.tracked(),
            config.display.plot_window_frames,
            interval.as_secs_f64(),
        );
        Self {
            recorder,
            refresh: PeriodicTask::new(interval),
            frame: DisplayFrame::default(),
            trace,
        }
    }

    /// Subscribes sensors and starts the refresh cadence.
    pub fn activate(&mut self, now: Instant) -> Result<Activation, RecorderError> {
        let activation = self.recorder.activate()?;
        self.refresh.start(now);
        Ok(activation)
    }

    /// Stops the refresh cadence, unsubscribes, and closes any open session.
    pub fn deactivate(&mut self) -> Result<Option<SavedRecording>, RecorderError> {
        self.refresh.cancel();
        self.recorder.deactivate()
    }

    /// Drains sensor events; re-renders the frame when the cadence is due.
    /// Returns whether the frame changed.
    pub fn update(&mut self, now: Instant) -> Result<bool, RecorderError> {
        let pumped = self.recorder.pump();
        let ticked = self.refresh.poll(now);
        if ticked {
            self.render_frame();
        }
        pumped.map(|_| ticked)
    }

    fn render_frame(&mut self) {
        let readings: Vec<(SensorKind, Vector3)> = self
            .recorder
            .tracked()
            .iter()
            .map(|&kind| (kind, self.recorder.snapshot(kind)))
            .collect();
        for &(kind, value) in &readings {
            self.trace.push(kind, value);
        }
        self.frame = DisplayFrame {
            readings,
            clock: format_clock(&Local::now()),
        };
    }
}

pub enum Screen {
    LabelSelection(LabelSelector),
    Measurement(Box<MeasurementScreen>),
}
