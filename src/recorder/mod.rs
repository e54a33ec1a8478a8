//! Sampling recorder: latest-value snapshots per sensor kind plus an optional
//! recording session that streams them to CSV.
//!
//! All state is mutated from the thread that calls [`SamplingRecorder::pump`];
//! sensor sources only push into the channel.

pub mod session;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::Receiver;
use log::{error, info, trace, warn};

use crate::config::{AppConfig, TimestampMode};
use crate::sensor::{SensorError, SensorSource};
use crate::types::{
    normalize_kinds, Activation, SavedRecording, Selection, SensorEvent, SensorKind, ToggleOutcome,
    Vector3,
};
pub use session::RecordingSession;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("{0} sensor is not available on this device")]
    RequiredSensorUnavailable(SensorKind),
    #[error("sensor source error: {0}")]
    Sensor(#[from] SensorError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Settings the recorder needs from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    pub storage_root: PathBuf,
    pub tracked: Vec<SensorKind>,
    pub sampling_period: Duration,
    pub channel_capacity: usize,
    pub timestamp_mode: TimestampMode,
}

impl From<&AppConfig> for RecorderSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            storage_root: config.storage.root_dir.clone(),
            tracked: config.sensors.tracked.clone(),
            sampling_period: config.sensors.sampling_period(),
            channel_capacity: config.sensors.channel_capacity,
            timestamp_mode: config.recording.timestamp_mode,
        }
    }
}

pub struct SamplingRecorder {
    settings: RecorderSettings,
    source: Box<dyn SensorSource>,
    selection: Option<Selection>,
    /// Latest reading per tracked kind, same order as `settings.tracked`.
    snapshot: Vec<Vector3>,
    events: Option<Receiver<SensorEvent>>,
    session: Option<RecordingSession>,
}

impl SamplingRecorder {
    pub fn new(
        mut settings: RecorderSettings,
        source: Box<dyn SensorSource>,
        selection: Option<Selection>,
    ) -> Self {
        settings.tracked = normalize_kinds(&settings.tracked);
        let snapshot = vec![Vector3::ZERO; settings.tracked.len()];
        Self {
            settings,
            source,
            selection,
            snapshot,
            events: None,
            session: None,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn tracked(&self) -> &[SensorKind] {
        &self.settings.tracked
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn is_active(&self) -> bool {
        self.events.is_some()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.path())
    }

    pub fn session_rows(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.rows())
    }

    /// Latest reading for `kind`; zero for untracked or not-yet-seen kinds.
    pub fn snapshot(&self, kind: SensorKind) -> Vector3 {
        self.slot(kind).map_or(Vector3::ZERO, |i| self.snapshot[i])
    }

    fn slot(&self, kind: SensorKind) -> Option<usize> {
        self.settings.tracked.iter().position(|&k| k == kind)
    }

    /// Subscribes to every available tracked sensor.
    ///
    /// Fails without subscribing anything when a required sensor is missing.
    pub fn activate(&mut self) -> Result<Activation, RecorderError> {
        if self.is_active() {
            self.deactivate_source();
        }

        let mut activation = Activation::default();
        for &kind in &self.settings.tracked {
            if self.source.is_available(kind) {
                activation.subscribed.push(kind);
            } else if kind.is_required() {
                error!("{} sensor not available", kind);
                return Err(RecorderError::RequiredSensorUnavailable(kind));
            } else {
                warn!("{} sensor not available", kind);
                activation.missing_optional.push(kind);
            }
        }

        let (sender, receiver) = crossbeam_channel::bounded(self.settings.channel_capacity);
        self.source
            .subscribe(&activation.subscribed, self.settings.sampling_period, sender)?;
        self.events = Some(receiver);

        info!(
            "Activated {} source for {:?} at {:?}",
            self.source.name(),
            activation.subscribed,
            self.settings.sampling_period
        );
        Ok(activation)
    }

    /// Unsubscribes and closes any open session. Safe to call repeatedly.
    ///
    /// Events already queued are applied first, so readings delivered while
    /// recording still reach the file.
    pub fn deactivate(&mut self) -> Result<Option<SavedRecording>, RecorderError> {
        let drained = self.pump();
        self.deactivate_source();
        drained?;
        self.stop_session()
    }

    fn deactivate_source(&mut self) {
        if self.events.take().is_some() {
            self.source.unsubscribe();
            info!("Deactivated {} source", self.source.name());
        }
    }

    /// Applies every pending event. Returns how many were handled.
    ///
    /// A write failure closes the session before the error is returned.
    pub fn pump(&mut self) -> Result<usize, RecorderError> {
        let Some(events) = self.events.clone() else {
            return Ok(0);
        };
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_event(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Updates the snapshot and, while recording, appends exactly one row.
    pub fn handle_event(&mut self, event: SensorEvent) -> Result<(), RecorderError> {
        let Some(slot) = self.slot(event.kind) else {
            return Ok(());
        };
        trace!("{} event from source at {}", event.kind, event.timestamp_ms);
        self.snapshot[slot] = event.values;

        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.append(&self.snapshot, event.received) {
                error!("Write failed, closing session: {}", e);
                if let Some(session) = self.session.take() {
                    if let Err(close_err) = session.finish() {
                        warn!("Closing failed session: {}", close_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// The single start/stop control.
    pub fn toggle(&mut self, now: DateTime<Local>) -> Result<ToggleOutcome, RecorderError> {
        if self.is_recording() {
            Ok(self
                .stop_session()?
                .map_or(ToggleOutcome::Refused, ToggleOutcome::Stopped))
        } else {
            self.start_session(now)
        }
    }

    /// Opens a session named after the selection and `now`.
    ///
    /// Events queued before the call are applied as idle readings.
    pub fn start_session(&mut self, now: DateTime<Local>) -> Result<ToggleOutcome, RecorderError> {
        self.pump()?;
        if let Some(session) = &self.session {
            return Ok(ToggleOutcome::Started(session.path().to_path_buf()));
        }
        let Some(selection) = &self.selection else {
            warn!("Recording refused: no category/label selected");
            return Ok(ToggleOutcome::Refused);
        };

        let session = RecordingSession::open(
            &self.settings.storage_root,
            selection,
            &self.settings.tracked,
            now,
            self.settings.timestamp_mode,
        )?;
        let path = session.path().to_path_buf();
        self.session = Some(session);
        Ok(ToggleOutcome::Started(path))
    }

    /// Applies queued events, then flushes and closes the open session.
    pub fn stop_session(&mut self) -> Result<Option<SavedRecording>, RecorderError> {
        self.pump()?;
        match self.session.take() {
            Some(session) => session.finish().map(Some),
            None => Ok(None),
        }
    }
}

impl Drop for SamplingRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.deactivate() {
            error!("Failed to close recording on shutdown: {}", e);
        }
    }
}
