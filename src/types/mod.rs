pub mod data_point;
pub mod results;
pub mod selection;
pub mod sensor;

pub use data_point::{DataPoint, SensorEvent};
pub use results::{Activation, SavedRecording, ToggleOutcome};
pub use selection::{Category, Selection};
pub use sensor::{normalize_kinds, SensorKind, Vector3};
