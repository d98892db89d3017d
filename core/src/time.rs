//! Time related utils.

use chrono::SecondsFormat;
use chrono::Utc;

use crate::Error;

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current time in UTC.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`.
///
/// This is the fixed RFC 1123 rendering request timestamps are signed with.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format time into RFC 3339 without fractional seconds: `2022-03-01T08:12:34Z`.
pub fn format_rfc3339(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse time from RFC 3339: `2022-03-01T08:12:34Z`.
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::unexpected("parse time from rfc3339 failed").with_source(e))?;
    Ok(t.with_timezone(&Utc))
}
