use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, info};
use rand::Rng;

use super::{deliver, Delivery, SensorError, SensorSource};
use crate::types::{SensorEvent, SensorKind, Vector3};

/// Stand-in for device hardware: a bounded random walk per sensor kind,
/// emitted every period on a worker thread.
pub struct SimulatedSensorSource {
    available: Vec<SensorKind>,
    worker: Option<(Arc<AtomicBool>, JoinHandle<()>)>,
}

impl SimulatedSensorSource {
    pub fn new(available: &[SensorKind]) -> Self {
        Self {
            available: available.to_vec(),
            worker: None,
        }
    }
}

/// Resting reading of a phone lying flat.
fn baseline(kind: SensorKind) -> Vector3 {
    match kind {
        SensorKind::Gyroscope => Vector3::ZERO,
        SensorKind::Accelerometer => Vector3::new(0.0, 0.0, 9.81),
        SensorKind::MagneticField => Vector3::new(22.0, -5.0, -40.0),
    }
}

fn step_size(kind: SensorKind) -> f32 {
    match kind {
        SensorKind::Gyroscope => 0.02,
        SensorKind::Accelerometer => 0.05,
        SensorKind::MagneticField => 0.3,
    }
}

/// One random-walk step, pulled back toward `center` and clamped to `limit`.
fn walk<R: Rng>(rng: &mut R, current: f32, center: f32, step: f32, limit: f32) -> f32 {
    let pulled = current + (center - current) * 0.05;
    (pulled + rng.random_range(-step..=step)).clamp(center - limit, center + limit)
}

impl SensorSource for SimulatedSensorSource {
    fn name(&self) -> &str {
        "simulated"
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
        self.unsubscribe();

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let kinds = kinds.to_vec();
        info!("Simulated sensors started for {:?} every {:?}", kinds, period);

        let handle = thread::Builder::new()
            .name("simulated-sensors".to_string())
            .spawn(move || {
                let mut rng = rand::rng();
                let mut state: Vec<(SensorKind, Vector3)> =
                    kinds.iter().map(|&k| (k, baseline(k))).collect();

                'run: while !thread_stop.load(Ordering::Relaxed) {
                    for (kind, value) in state.iter_mut() {
                        let center = baseline(*kind);
                        let step = step_size(*kind);
                        let limit = step * 50.0;
                        *value = Vector3::new(
                            walk(&mut rng, value.x, center.x, step, limit),
                            walk(&mut rng, value.y, center.y, step, limit),
                            walk(&mut rng, value.z, center.z, step, limit),
                        );
                        let event = SensorEvent::new(
                            *kind,
                            *value,
                            chrono::Utc::now().timestamp_millis(),
                        );
                        if deliver(&sink, event) == Delivery::Disconnected {
                            debug!("Simulated sensor channel closed");
                            break 'run;
                        }
                    }
                    thread::sleep(period);
                }
            })?;

        self.worker = Some((stop, handle));
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some((stop, handle)) = self.worker.take() {
            stop.store(true, Ordering::Relaxed);
            if handle.join().is_err() {
                log::error!("Simulated sensor thread panicked");
            }
            info!("Simulated sensors stopped");
        }
    }
}

impl Drop for SimulatedSensorSource {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_only_subscribed_kinds_until_unsubscribed() {
        let mut source = SimulatedSensorSource::new(&SensorKind::ALL);
        let (tx, rx) = crossbeam_channel::bounded(64);
        source
            .subscribe(&[SensorKind::Gyroscope], Duration::from_millis(1), tx)
            .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.kind, SensorKind::Gyroscope);

        source.unsubscribe();
        while rx.try_recv().is_ok() {}
        // Producer thread is joined, so nothing new can arrive.
        assert!(rx.recv_timeout(Duration::from_millis(20)).is_err());
    }

    #[test]
    fn empty_subscription_is_rejected() {
        let mut source = SimulatedSensorSource::new(&SensorKind::ALL);
        let (tx, _rx) = crossbeam_channel::bounded(1);
        assert!(matches!(
            source.subscribe(&[], Duration::from_millis(1), tx),
            Err(SensorError::NoSensors)
        ));
    }

    #[test]
    fn walk_stays_within_limit() {
        let mut rng = rand::rng();
        let mut value = 0.0;
        for _ in 0..1000 {
            value = walk(&mut rng, value, 0.0, 0.5, 1.0);
            assert!((-1.0..=1.0).contains(&value));
        }
    }
}
