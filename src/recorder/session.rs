use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local, Utc};
use log::{info, warn};

use super::RecorderError;
use crate::config::TimestampMode;
use crate::types::{SavedRecording, Selection, SensorKind, Vector3};
use crate::utils::format_file_stamp;

/// Directory under the storage root holding every recording.
pub const RECORDINGS_DIR: &str = "Driver";

/// `<root>/Driver/<category>/<label>/<label>_<yyyyMMdd_HHmmss>.csv`
pub fn output_path(root: &Path, selection: &Selection, started_at: &DateTime<Local>) -> PathBuf {
    root.join(RECORDINGS_DIR)
        .join(selection.category().dir_name())
        .join(selection.label())
        .join(format!("{}_{}.csv", selection.label(), format_file_stamp(started_at)))
}

/// Header columns for the tracked sensor set, in column order.
pub fn header(tracked: &[SensorKind]) -> Vec<String> {
    let mut columns = vec!["timestamp".to_string()];
    for kind in tracked {
        for axis in ["x", "y", "z"] {
            columns.push(format!("{}_{}", kind.column_prefix(), axis));
        }
    }
    columns
}

/// An open CSV sink plus the clock basis for its timestamp column.
pub struct RecordingSession {
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
    started: Instant,
    /// Epoch millis captured together with `started`.
    started_epoch_ms: i64,
    timestamp_mode: TimestampMode,
    rows: u64,
}

impl RecordingSession {
    /// Creates missing directories, opens the file and writes the header.
    pub fn open(
        root: &Path,
        selection: &Selection,
        tracked: &[SensorKind],
        started_at: DateTime<Local>,
        timestamp_mode: TimestampMode,
    ) -> Result<Self, RecorderError> {
        let path = output_path(root, selection, &started_at);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| RecorderError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let file = File::create(&path).map_err(|source| RecorderError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(BufWriter::new(file));
        writer
            .write_record(header(tracked))
            .map_err(|source| RecorderError::Csv { path: path.clone(), source })?;

        info!("Recording to {}", path.display());
        Ok(Self {
            path,
            writer,
            started: Instant::now(),
            started_epoch_ms: Utc::now().timestamp_millis(),
            timestamp_mode,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Row timestamp for an event received at `received`. Events received
    /// before the session opened count as its start.
    fn timestamp(&self, received: Instant) -> i64 {
        let elapsed = received.saturating_duration_since(self.started).as_millis();
        let elapsed = i64::try_from(elapsed).unwrap_or(i64::MAX);
        match self.timestamp_mode {
            TimestampMode::Elapsed => elapsed,
            TimestampMode::WallClock => self.started_epoch_ms.saturating_add(elapsed),
        }
    }

    /// Appends one row: the timestamp of `received` followed by every triple
    /// in `snapshot`.
    pub fn append(&mut self, snapshot: &[Vector3], received: Instant) -> Result<(), RecorderError> {
        let mut record = Vec::with_capacity(1 + snapshot.len() * 3);
        record.push(self.timestamp(received).to_string());
        for values in snapshot {
            record.extend(values.to_array().iter().map(|v| v.to_string()));
        }
        self.writer
            .write_record(&record)
            .map_err(|source| RecorderError::Csv { path: self.path.clone(), source })?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes and closes the file.
    pub fn finish(self) -> Result<SavedRecording, RecorderError> {
        let Self { path, writer, rows, .. } = self;
        let buffered = writer.into_inner().map_err(|e| RecorderError::Io {
            path: path.clone(),
            source: std::io::Error::new(e.error().kind(), e.error().to_string()),
        })?;
        let file = buffered.into_inner().map_err(|e| RecorderError::Io {
            path: path.clone(),
            source: e.into_error(),
        })?;
        if let Err(e) = file.sync_all() {
            warn!("Failed to sync {}: {}", path.display(), e);
        }
        info!("Saved {} rows to {}", rows, path.display());
        Ok(SavedRecording { path, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::TimeZone;
    use std::time::Duration;

    fn open_in(root: &Path, mode: TimestampMode) -> RecordingSession {
        let selection = Selection::new(Category::Normal, "정상 좌회전").unwrap();
        RecordingSession::open(root, &selection, &[SensorKind::Gyroscope], Local::now(), mode).unwrap()
    }

    fn stamps(path: &Path) -> Vec<i64> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn header_matches_tracked_set() {
        assert_eq!(header(&[SensorKind::Gyroscope]).join(","), "timestamp,gyro_x,gyro_y,gyro_z");
        assert_eq!(
            header(&SensorKind::ALL).join(","),
            "timestamp,gyro_x,gyro_y,gyro_z,acc_x,acc_y,acc_z,mag_x,mag_y,mag_z"
        );
    }

    #[test]
    fn path_uses_category_directory_and_file_stamp() {
        let selection = Selection::new(Category::Abnormal, "급정지").unwrap();
        let at = Local.with_ymd_and_hms(2024, 11, 2, 18, 30, 0).unwrap();
        let path = output_path(Path::new("/storage"), &selection, &at);
        assert_eq!(
            path,
            Path::new("/storage/Driver/이상/급정지/급정지_20241102_183000.csv")
        );
    }

    #[test]
    fn rows_are_stamped_with_receive_time_not_write_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(dir.path(), TimestampMode::Elapsed);
        let t0 = session.started;

        for ms in [0, 30, 60, 90] {
            session.append(&[Vector3::ZERO], t0 + Duration::from_millis(ms)).unwrap();
        }
        // Received before the session opened.
        session.append(&[Vector3::ZERO], t0 - Duration::from_millis(5)).unwrap();

        let saved = session.finish().unwrap();
        assert_eq!(stamps(&saved.path), vec![0, 30, 60, 90, 0]);
    }

    #[test]
    fn wall_clock_rows_offset_from_session_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_in(dir.path(), TimestampMode::WallClock);
        let (t0, epoch) = (session.started, session.started_epoch_ms);

        session.append(&[Vector3::ZERO], t0 + Duration::from_millis(250)).unwrap();

        let saved = session.finish().unwrap();
        assert_eq!(stamps(&saved.path), vec![epoch + 250]);
    }
}
