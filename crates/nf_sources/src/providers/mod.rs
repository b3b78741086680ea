use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use nf_core::{Error, Result};
use reqwest::Client;
use url::Url;

pub mod mediastack;
pub mod newsapi;

pub use mediastack::MediaStackSource;
pub use newsapi::NewsApiSource;

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("nf/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Validates a configured endpoint, falling back to the provider default when blank.
pub(crate) fn endpoint(configured: &str, default: &str) -> Result<Url> {
    let raw = if configured.trim().is_empty() { default } else { configured };
    Url::parse(raw).map_err(|e| Error::Config(format!("invalid provider url {raw:?}: {e}")))
}

/// Query window ending now and reaching `lookback_minutes` back.
pub(crate) fn window(lookback_minutes: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let to = Utc::now();
    (to - ChronoDuration::minutes(i64::from(lookback_minutes)), to)
}

/// Parse the timestamp formats the providers emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Empty strings from providers are treated like missing fields.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:30:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00+0200"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_window_reaches_back_from_now() {
        let (from, to) = window(60);
        assert_eq!(to - from, ChronoDuration::minutes(60));

        let (from, to) = window(u32::MAX);
        assert!(from < to);
    }

    #[test]
    fn test_negative_lookback_is_rejected() {
        let parsed: std::result::Result<crate::ProviderConfig, _> = serde_json::from_str(r#"{"lookback_minutes": -5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_endpoint_falls_back_to_default() {
        let url = endpoint("  ", "https://example.com/v1/news").unwrap();
        assert_eq!(url.as_str(), "https://example.com/v1/news");
        assert!(endpoint("not a url", "https://example.com").is_err());
    }
}
