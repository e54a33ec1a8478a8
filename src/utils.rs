use chrono::{DateTime, TimeZone};

/// Wall-clock time shown on the measurement screen, `HH:MM:SS`.
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

/// Timestamp embedded in recording file names, `yyyyMMdd_HHmmss`.
pub fn format_file_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// One axis value with two decimals and its unit, e.g. `-0.12 rad/s`.
pub fn format_reading(value: f32, unit: &str) -> String {
    format!("{:.2} {}", value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn formats_file_stamp_and_clock() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(format_file_stamp(&at), "20240307_090502");
        assert_eq!(format_clock(&at), "09:05:02");
    }

    #[test]
    fn readings_use_two_decimals() {
        assert_eq!(format_reading(-0.1234_f32, "rad/s"), "-0.12 rad/s");
        assert_eq!(format_reading(9.81, "m/s²"), "9.81 m/s²");
    }
}
