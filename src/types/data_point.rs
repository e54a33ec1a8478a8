use std::time::Instant;

use super::{SensorKind, Vector3};

/// A single reading pushed by a sensor source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub kind: SensorKind,
    pub values: Vector3,
    /// Source-side timestamp in epoch milliseconds, as published by the handset.
    pub timestamp_ms: i64,
    /// When the reading reached this process. CSV rows are stamped from this,
    /// not from when the channel is drained.
    pub received: Instant,
}

impl SensorEvent {
    pub fn new(kind: SensorKind, values: Vector3, timestamp_ms: i64) -> Self {
        Self {
            kind,
            values,
            timestamp_ms,
            received: Instant::now(),
        }
    }
}

/// JSON payload published by the handset, e.g.
/// `{"sensor":"gyroscope","x":0.1,"y":0.0,"z":-0.2,"timestamp":1700000000000}`.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct DataPoint {
    pub sensor: SensorKind,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub timestamp: i64,
}

impl From<DataPoint> for SensorEvent {
    fn from(point: DataPoint) -> Self {
        SensorEvent::new(point.sensor, Vector3::new(point.x, point.y, point.z), point.timestamp)
    }
}
