//! Sensor sources push [`SensorEvent`]s into a channel owned by the recorder.
//!
//! A source runs its own producer thread; consumers drain the channel on the
//! UI thread, so recorder state is never touched concurrently.

pub mod mqtt;
pub mod simulated;

use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use log::warn;

use crate::config::{AppConfig, SourceKind};
use crate::types::{SensorEvent, SensorKind};

pub use mqtt::MqttSensorSource;
pub use simulated::SimulatedSensorSource;

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("MQTT error: {0}")]
    Connection(String),
    #[error("failed to start sensor thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("no sensor kinds requested")]
    NoSensors,
}

/// Capability to deliver motion sensor readings.
pub trait SensorSource: Send {
    fn name(&self) -> &str;

    fn is_available(&self, kind: SensorKind) -> bool;

    /// Starts delivering events of `kinds` to `sink` at roughly `period`.
    /// A previous subscription is replaced.
    fn subscribe(
        &mut self,
        kinds: &[SensorKind],
        period: Duration,
        sink: Sender<SensorEvent>,
    ) -> Result<(), SensorError>;

    /// Stops delivery. Calling it without a subscription is a no-op.
    fn unsubscribe(&mut self);
}

/// Builds the source selected in the configuration.
pub fn source_from_config(config: &AppConfig) -> Box<dyn SensorSource> {
    match config.sensors.source {
        SourceKind::Simulated => Box::new(SimulatedSensorSource::new(&config.sensors.available)),
        SourceKind::Mqtt => Box::new(MqttSensorSource::new(config.mqtt.clone(), &config.sensors.available)),
    }
}

/// Delivery result for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Sent,
    Dropped,
    Disconnected,
}

/// Non-blocking hand-off used by every producer thread. A full channel drops
/// the event.
pub(crate) fn deliver(sink: &Sender<SensorEvent>, event: SensorEvent) -> Delivery {
    match sink.try_send(event) {
        Ok(()) => Delivery::Sent,
        Err(TrySendError::Full(event)) => {
            warn!("Sensor channel full, dropping {} event", event.kind);
            Delivery::Dropped
        }
        Err(TrySendError::Disconnected(_)) => Delivery::Disconnected,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Source driven by the test body through [`ManualHandle`].
    pub struct ManualSensorSource {
        available: Vec<SensorKind>,
        handle: ManualHandle,
    }

    #[derive(Clone, Default)]
    pub struct ManualHandle {
        inner: Arc<Mutex<ManualState>>,
    }

    #[derive(Default)]
    struct ManualState {
        sink: Option<Sender<SensorEvent>>,
        subscribed: Vec<SensorKind>,
        period: Option<Duration>,
        subscribe_calls: usize,
        unsubscribe_calls: usize,
    }

    impl ManualSensorSource {
        pub fn new(available: &[SensorKind]) -> (Self, ManualHandle) {
            let handle = ManualHandle::default();
            let source = Self { available: available.to_vec(), handle: handle.clone() };
            (source, handle)
        }
    }

    impl ManualHandle {
        /// Returns false when nothing is subscribed to `kind`.
        pub fn emit(&self, kind: SensorKind, x: f32, y: f32, z: f32) -> bool {
            let state = self.inner.lock().unwrap();
            match &state.sink {
                Some(sink) if state.subscribed.contains(&kind) => {
                    let event = SensorEvent::new(kind, crate::types::Vector3::new(x, y, z), 0);
                    deliver(sink, event) == Delivery::Sent
                }
                _ => false,
            }
        }

        pub fn is_subscribed(&self) -> bool {
            self.inner.lock().unwrap().sink.is_some()
        }

        pub fn subscribed(&self) -> Vec<SensorKind> {
            self.inner.lock().unwrap().subscribed.clone()
        }

        pub fn period(&self) -> Option<Duration> {
            self.inner.lock().unwrap().period
        }

        pub fn calls(&self) -> (usize, usize) {
            let state = self.inner.lock().unwrap();
            (state.subscribe_calls, state.unsubscribe_calls)
        }
    }

    impl SensorSource for ManualSensorSource {
        fn name(&self) -> &str {
            "manual"
        }

        fn is_available(&self, kind: SensorKind) -> bool {
            self.available.contains(&kind)
        }

        fn subscribe(
            &mut self,
            kinds: &[SensorKind],
            period: Duration,
            sink: Sender<SensorEvent>,
        ) -> Result<(), SensorError> {
            if kinds.is_empty() {
                return Err(SensorError::NoSensors);
            }
            let mut state = self.handle.inner.lock().unwrap();
            state.sink = Some(sink);
            state.subscribed = kinds.to_vec();
            state.period = Some(period);
            state.subscribe_calls += 1;
            Ok(())
        }

        fn unsubscribe(&mut self) {
            let mut state = self.handle.inner.lock().unwrap();
            state.sink = None;
            state.subscribed.clear();
            state.unsubscribe_calls += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector3;

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let event = SensorEvent::new(SensorKind::Gyroscope, Vector3::ZERO, 0);
        assert_eq!(deliver(&tx, event), Delivery::Sent);
        assert_eq!(deliver(&tx, event), Delivery::Dropped);
        drop(rx);
        assert_eq!(deliver(&tx, event), Delivery::Disconnected);
    }
}
