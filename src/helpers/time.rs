use chrono::{DateTime, NaiveDateTime, Utc};

/// Current instant as epoch milliseconds, the unit stored in the credentials file.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse an `expiresAt` value written by the SSO login tool.
///
/// Older CLI releases write a literal `UTC` zone marker (`2024-05-01T10:00:00UTC`)
/// instead of `Z`; values without any zone are read as UTC.
pub fn parse_sso_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix("UTC") {
        Some(stripped) => format!("{}Z", stripped.trim_end()),
        None => trimmed.to_owned(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render epoch milliseconds for log lines.
pub fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}
