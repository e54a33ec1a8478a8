use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};
use std::collections::VecDeque;

use crate::config::DisplayConfig;
use crate::types::{SensorKind, Vector3};

/// Fixed-width y axis label so plots don't jitter as the range changes.
fn format_fixed_width_y_label(value: f64) -> String {
    let abs_value = value.abs();
    if abs_value >= 1000.0 {
        format!("{:-6.1e}", value)
    } else if abs_value >= 100.0 {
        format!("{:-6.0}", value)
    } else if abs_value >= 10.0 {
        format!("{:-6.1}", value)
    } else {
        format!("{:-6.2}", value)
    }
}

/// Rolling window of displayed frames, one trace per tracked sensor kind.
///
/// Fed once per display refresh, never from the raw event stream.
#[derive(Debug)]
pub struct LiveTrace {
    kinds: Vec<SensorKind>,
    frames: Vec<VecDeque<Vector3>>,
    max_frames: usize,
    frame_seconds: f64,
}

impl LiveTrace {
    pub fn new(kinds: &[SensorKind], max_frames: usize, frame_seconds: f64) -> Self {
        let max_frames = max_frames.max(2);
        Self {
            kinds: kinds.to_vec(),
            frames: kinds.iter().map(|_| VecDeque::with_capacity(max_frames)).collect(),
            max_frames,
            frame_seconds,
        }
    }

    pub fn push(&mut self, kind: SensorKind, value: Vector3) {
        let Some(i) = self.kinds.iter().position(|&k| k == kind) else {
            return;
        };
        let buffer = &mut self.frames[i];
        buffer.push_back(value);
        while buffer.len() > self.max_frames {
            buffer.pop_front();
        }
    }

    pub fn ui(&self, ui: &mut egui::Ui, config: &DisplayConfig) {
        let colors = [config.colors.x_axis, config.colors.y_axis, config.colors.z_axis]
            .map(|[r, g, b]| Color32::from_rgb(r, g, b));

        for (kind, buffer) in self.kinds.iter().zip(&self.frames) {
            self.plot_kind(ui, *kind, buffer, &colors, config.plot_height);
        }
    }

    fn plot_kind(
        &self,
        ui: &mut egui::Ui,
        kind: SensorKind,
        buffer: &VecDeque<Vector3>,
        colors: &[Color32; 3],
        height: f32,
    ) {
        if buffer.is_empty() {
            return;
        }

        let (y_min, y_max) = buffer
            .iter()
            .flat_map(|v| v.to_array())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), val| {
                (min.min(val as f64), max.max(val as f64))
            });
        let range = (y_max - y_min).max(0.1);
        let y_min = y_min - range * 0.05;
        let y_max = y_max + range * 0.05;
        let window = self.max_frames as f64 * self.frame_seconds;

        Plot::new(kind.column_prefix())
            .height(height)
            .legend(Legend::default())
            .y_axis_formatter(|v, _| format_fixed_width_y_label(v.value))
            .show_x(false)
            .show_y(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([0.0, y_min], [window, y_max]));

                for (axis, name) in ["x", "y", "z"].iter().enumerate() {
                    // Oldest frame on the left at t=0.
                    let points: Vec<[f64; 2]> = buffer
                        .iter()
                        .enumerate()
                        .map(|(i, v)| [i as f64 * self.frame_seconds, v.to_array()[axis] as f64])
                        .collect();
                    let title = format!("{}_{}", kind.column_prefix(), name);
                    plot_ui.line(Line::new(title, PlotPoints::from(points)).color(colors[axis]).width(1.0));
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_latest_frames() {
        let mut trace = LiveTrace::new(&[SensorKind::Gyroscope], 3, 0.1);
        for i in 0..10 {
            trace.push(SensorKind::Gyroscope, Vector3::new(i as f32, 0.0, 0.0));
        }
        assert_eq!(trace.frames[0].len(), 3);
        assert_eq!(trace.frames[0].front().unwrap().x, 7.0);
    }

    #[test]
    fn ignores_untracked_kinds() {
        let mut trace = LiveTrace::new(&[SensorKind::Gyroscope], 3, 0.1);
        trace.push(SensorKind::MagneticField, Vector3::ZERO);
        assert_eq!(trace.frames.len(), 1);
        assert!(trace.frames[0].is_empty());
    }

    #[test]
    fn y_labels_have_fixed_width() {
        for value in [0.5, -3.25, 42.0, -512.0, 12345.0] {
            assert!(format_fixed_width_y_label(value).len() >= 6, "{}", value);
        }
    }
}
