use std::path::PathBuf;

/// A closed recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecording {
    pub path: PathBuf,
    /// Data rows written, header excluded.
    pub rows: u64,
}

/// Result of the start/stop toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Started(PathBuf),
    Stopped(SavedRecording),
    /// Start was refused because no (category, label) pair was supplied.
    Refused,
}

/// Outcome of activating the measurement screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activation {
    /// Tracked optional sensors the device does not provide.
    pub missing_optional: Vec<super::SensorKind>,
    /// Kinds actually subscribed.
    pub subscribed: Vec<super::SensorKind>,
}
