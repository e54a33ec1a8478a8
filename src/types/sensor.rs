use std::fmt;

use serde::{Deserialize, Serialize};

/// Motion sensor kinds sampled by the recorder.
///
/// Declaration order is the CSV column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Gyroscope,
    Accelerometer,
    MagneticField,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Gyroscope,
        SensorKind::Accelerometer,
        SensorKind::MagneticField,
    ];

    /// Only the gyroscope is required for the measurement screen to run.
    pub fn is_required(self) -> bool {
        matches!(self, SensorKind::Gyroscope)
    }

    /// Column prefix used in the CSV header (`gyro_x`, `acc_x`, `mag_x`).
    pub fn column_prefix(self) -> &'static str {
        match self {
            SensorKind::Gyroscope => "gyro",
            SensorKind::Accelerometer => "acc",
            SensorKind::MagneticField => "mag",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Gyroscope => "rad/s",
            SensorKind::Accelerometer => "m/s²",
            SensorKind::MagneticField => "μT",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SensorKind::Gyroscope => "Gyroscope",
            SensorKind::Accelerometer => "Accelerometer",
            SensorKind::MagneticField => "Magnetometer",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One 3-axis reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Normalizes a tracked-kind list: sorted into column order, deduplicated.
pub fn normalize_kinds(kinds: &[SensorKind]) -> Vec<SensorKind> {
    let mut kinds = kinds.to_vec();
    kinds.sort();
    kinds.dedup();
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_sort_into_column_order() {
        let kinds = normalize_kinds(&[
            SensorKind::MagneticField,
            SensorKind::Gyroscope,
            SensorKind::MagneticField,
            SensorKind::Accelerometer,
        ]);
        assert_eq!(kinds, SensorKind::ALL.to_vec());
    }

    #[test]
    fn only_gyroscope_is_required() {
        let required: Vec<_> = SensorKind::ALL.iter().filter(|k| k.is_required()).collect();
        assert_eq!(required, vec![&SensorKind::Gyroscope]);
    }

    #[test]
    fn kind_names_deserialize_from_snake_case() {
        let kind: SensorKind = serde_json::from_str("\"magnetic_field\"").unwrap();
        assert_eq!(kind, SensorKind::MagneticField);
    }
}
