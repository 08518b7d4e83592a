use chrono::{DateTime, NaiveDateTime, Utc};

/// `MMM d, yyyy h:mm a`, e.g. "Jan 1, 2024 10:00 AM".
const DISPLAY_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Render a stored timestamp for people. Accepts RFC 3339 and the plain
/// `YYYY-MM-DD HH:MM:SS` form SQLite produces; anything else is returned as-is.
pub fn timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| display(&dt))
        .unwrap_or_else(|| raw.to_string())
}

pub fn display(dt: &DateTime<Utc>) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(|naive| naive.and_utc())
}

/// Format a byte count for humans: 512 B, 1.5 KB, 2.0 MB.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
