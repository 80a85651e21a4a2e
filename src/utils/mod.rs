//! Utility functions and helpers.

pub mod http;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use url::Url;

/// Extract the host from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
        .filter(|host| !host.is_empty())
}

/// Lowercase `text`, collapse every run of characters outside `[a-z0-9]`
/// into one hyphen, and trim hyphens from both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Parse an ISO 8601 timestamp into epoch milliseconds.
///
/// A trailing `Z` or explicit offset is honoured; timestamps without an
/// offset are read as UTC. Anything unparseable yields `None`.
pub fn parse_timestamp_ms(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://example.com/path"),
            Some("example.com".to_string())
        );
        assert_eq!(
            get_domain("https://sub.example.com:8080/path"),
            Some("sub.example.com".to_string())
        );
        assert_eq!(get_domain("not a url"), None);
        assert_eq!(get_domain("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Ansel Adams"), "ansel-adams");
        assert_eq!(slugify("  --Agnes  Martin!! "), "agnes-martin");
        assert_eq!(slugify("Sol LeWitt (1928)"), "sol-lewitt-1928");
        assert_eq!(slugify("éé"), "");
        assert_eq!(slugify("Ólafur Elíasson"), "lafur-el-asson");
    }

    #[test]
    fn test_parse_timestamp_utc() {
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(
            parse_timestamp_ms("2020-05-01T12:00:00.500Z"),
            Some(1_588_334_400_500)
        );
    }

    #[test]
    fn test_parse_timestamp_offset_and_naive() {
        assert_eq!(parse_timestamp_ms("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:02"), Some(2000));
        assert_eq!(parse_timestamp_ms("1970-01-02"), Some(86_400_000));
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert_eq!(parse_timestamp_ms(""), None);
        assert_eq!(parse_timestamp_ms("yesterday"), None);
        assert_eq!(parse_timestamp_ms("2020-13-45T00:00:00Z"), None);
    }
}
