//! Display formatting for dates, sizes and durations.

use chrono::{DateTime, Utc};
use serde_json::Value;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// `2024-01-31 09:15 UTC`. Unparseable input is returned as given.
pub fn format_date(date: &str) -> String {
    match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M UTC")
            .to_string(),
        Err(_) => date.to_string(),
    }
}

/// `(empty)`, bytes, or whole k/M/G in 1024 steps.
pub fn format_bytes(amount: u64) -> String {
    match amount {
        0 => "(empty)".to_string(),
        n if n < KB => n.to_string(),
        n if n < MB => format!("{}k", n / KB),
        n if n < GB => format!("{}M", n / MB),
        n => format!("{}G", n / GB),
    }
}

/// `2024/01/31 09:15:00 (~ 5m ago)`; the suffix is dropped past 25 hours.
pub fn time_ago(since: &str, now: DateTime<Utc>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(since) else {
        return since.to_string();
    };
    let since = parsed.with_timezone(&Utc);
    let elapsed = (now - since).num_seconds().max(0);
    let mut message = since.format("%Y/%m/%d %H:%M:%S").to_string();
    if elapsed <= 60 {
        message.push_str(&format!(" (~ {}s ago)", elapsed));
    } else if elapsed <= 60 * 60 {
        message.push_str(&format!(" (~ {}m ago)", elapsed / 60));
    } else if elapsed <= 60 * 60 * 25 {
        message.push_str(&format!(" (~ {}h ago)", elapsed / 60 / 60));
    }
    message
}

/// A JSON value as it reads in `key=value` output. Null is empty.
pub fn plain_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "(empty)");
        assert_eq!(format_bytes(512), "512");
        assert_eq!(format_bytes(2048), "2k");
        assert_eq!(format_bytes(5 * MB + 1), "5M");
        assert_eq!(format_bytes(3 * GB), "3G");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2010-01-01T12:30:00.000Z"), "2010-01-01 12:30 UTC");
        assert_eq!(format_date("2010-01-01T12:30:00+02:00"), "2010-01-01 10:30 UTC");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_time_ago() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().expect("time");
        assert_eq!(
            time_ago("2024-01-01T11:55:00Z", now),
            "2024/01/01 11:55:00 (~ 5m ago)"
        );
        assert_eq!(
            time_ago("2024-01-01T09:00:00Z", now),
            "2024/01/01 09:00:00 (~ 3h ago)"
        );
        assert_eq!(time_ago("2023-12-01T09:00:00Z", now), "2023/12/01 09:00:00");
    }

    #[test]
    fn test_plain_value() {
        assert_eq!(plain_value(&json!(null)), "");
        assert_eq!(plain_value(&json!("x")), "x");
        assert_eq!(plain_value(&json!(3)), "3");
    }
}
