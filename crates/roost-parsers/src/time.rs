//! Time formatting for report output.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Format seconds as a human-readable duration (e.g. "1d 2h 30m 5s").
pub fn format_seconds_human(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 {
        parts.push(format!("{}s", secs));
    }
    parts.join(" ")
}

/// Format seconds as a single-unit compact duration ("45s", "3.2m", "1.5h", "2.1d").
pub fn format_duration_compact(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.0}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else {
        format!("{:.1}d", seconds / 86400.0)
    }
}

/// Format an epoch timestamp relative to `now` ("just now", "3 hours ago",
/// "2 weeks ago", or the date for anything older than a month).
pub fn format_relative(epoch_seconds: i64, now: DateTime<Utc>) -> String {
    let Some(event) = Utc.timestamp_opt(epoch_seconds, 0).single() else {
        return "N/A".to_string();
    };
    let delta = now.signed_duration_since(event);
    let secs = delta.num_seconds();
    if secs < 0 {
        return event.format("%Y-%m-%d").to_string();
    }
    if secs < 60 {
        return "just now".to_string();
    }
    if secs < 3600 {
        let minutes = secs / 60;
        return format!("{} minute{} ago", minutes, plural(minutes));
    }
    if secs < 86400 {
        let hours = secs / 3600;
        return format!("{} hour{} ago", hours, plural(hours));
    }
    let days = delta.num_days();
    if days < 7 {
        return format!("{} day{} ago", days, plural(days));
    }
    if days < 30 {
        let weeks = days / 7;
        return format!("{} week{} ago", weeks, plural(weeks));
    }
    event.format("%Y-%m-%d").to_string()
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format an epoch timestamp as a local wall-clock string.
pub fn format_timestamp(epoch_seconds: i64) -> String {
    match Local.timestamp_opt(epoch_seconds, 0).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}
