use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::time::{Duration, SystemTime};

pub const MS_PER_DAY: f64 = 86_400_000.0;

pub const NO_EXTENSION: &str = "no-extension";

pub fn day_key(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Whole days between two instants, rounded up. Negative spans yield 0.
pub fn ceil_days(start: &DateTime<Utc>, end: &DateTime<Utc>) -> u64 {
    let ms = (*end - *start).num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    (ms as f64 / MS_PER_DAY).ceil() as u64
}

/// Inclusive day span: `ceil(days between) + 1`.
pub fn inclusive_days(start: &DateTime<Utc>, end: &DateTime<Utc>) -> u64 {
    ceil_days(start, end) + 1
}

/// Lower-cased text after the last `.` of the filename, or [`NO_EXTENSION`].
pub fn file_extension(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) => filename[idx + 1..].to_lowercase(),
        None => NO_EXTENSION.to_string(),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Parse an absolute or relative point in time.
///
/// Accepts RFC 3339, `YYYY-MM-DD` (midnight UTC, or 23:59:59 when
/// `end_of_day` is set), phrases like `3 days ago`, and humantime
/// durations such as `90d` or `2weeks` which are read as "that long ago".
pub fn parse_instant(input: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Some(dt) = parse_absolute(input, end_of_day) {
        return Some(dt);
    }

    let duration = parse_natural_duration(input).or_else(|| {
        humantime::parse_duration(input.trim_start_matches('-')).ok()
    })?;
    let target = SystemTime::now().checked_sub(duration)?;
    Some(DateTime::<Utc>::from(target))
}

/// RFC 3339 or `YYYY-MM-DD` only; never relative to the current time.
pub fn parse_absolute(input: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| Utc.from_utc_datetime(&t))
}

pub fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();

    for (suffix, secs) in [
        (" days ago", 86_400u64),
        (" day ago", 86_400),
        (" weeks ago", 7 * 86_400),
        (" week ago", 7 * 86_400),
        (" months ago", 30 * 86_400),
        (" month ago", 30 * 86_400),
        (" years ago", 365 * 86_400),
        (" year ago", 365 * 86_400),
    ] {
        if let Some(n) = input.strip_suffix(suffix) {
            if let Ok(n) = n.trim().parse::<u64>() {
                return Some(Duration::from_secs(n * secs));
            }
        }
    }

    None
}
