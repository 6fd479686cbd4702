use chrono::{DateTime, SecondsFormat, Utc};

/// ISO-8601，毫秒精度，UTC（如 `2026-10-19T08:30:00.123Z`）
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_iso() -> String {
    iso_timestamp(Utc::now())
}
