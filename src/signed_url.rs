//! Expiry of time-limited asset links (S3-style presigned URLs).

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use url::Url;

const DATE_PARAM: &str = "X-Amz-Date";
const EXPIRES_PARAM: &str = "X-Amz-Expires";

/// When a signed URL stops working, or `None` if it carries no signature
/// timing.
pub fn expires_at(raw: &str) -> Option<DateTime<Utc>> {
    let url = Url::parse(raw).ok()?;
    let mut signed = None;
    let mut lifetime = None;
    for (k, v) in url.query_pairs() {
        if k.eq_ignore_ascii_case(DATE_PARAM) {
            signed = NaiveDateTime::parse_from_str(&v, "%Y%m%dT%H%M%SZ").ok();
        } else if k.eq_ignore_ascii_case(EXPIRES_PARAM) {
            lifetime = v.parse::<i64>().ok();
        }
    }
    signed?.and_utc().checked_add_signed(Duration::try_seconds(lifetime?)?)
}

pub fn is_expired(raw: &str, now: DateTime<Utc>) -> bool {
    expires_at(raw).is_some_and(|t| t <= now)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SIGNED: &str = "https://prod-files-secure.s3.us-west-2.amazonaws.com/ws/file/sign.jpg\
        ?X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Date=20250301T100000Z&X-Amz-Expires=3600&X-Amz-Signature=abc";

    #[test]
    fn expiry_from_query() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap();
        assert_eq!(expires_at(SIGNED), Some(expected));
        assert!(!is_expired(SIGNED, Utc.with_ymd_and_hms(2025, 3, 1, 10, 59, 59).unwrap()));
        assert!(is_expired(SIGNED, expected));
    }

    #[test]
    fn unsigned_urls_never_expire() {
        assert_eq!(expires_at("https://cdn.example.com/a.png"), None);
        assert_eq!(expires_at("https://cdn.example.com/a.png?X-Amz-Expires=3600"), None);
        assert_eq!(expires_at("not a url"), None);
        assert!(!is_expired("https://cdn.example.com/a.png", Utc::now()));
    }
}
