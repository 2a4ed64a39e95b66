//! Wall-clock helpers for request timestamps.
//!
//! The remote API expects local time rendered as `YYYYMMDDHHMMSS` (14 digits,
//! no separators). That string is both sent as the `timestamp` common
//! parameter and hashed into every digest.

use chrono::{DateTime, Local, TimeZone};

/// `strftime` pattern for protocol timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Length of a well-formed protocol timestamp.
pub const TIMESTAMP_LEN: usize = 14;

/// Current local time as a protocol timestamp.
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Render any zoned date-time as a protocol timestamp.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `true` if `raw` has the `YYYYMMDDHHMMSS` shape (14 ASCII digits).
///
/// Only the shape is checked; calendar validity is the counterpart's concern.
pub fn is_timestamp_shaped(raw: &str) -> bool {
    raw.len() == TIMESTAMP_LEN && raw.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    #[test]
    fn formats_fourteen_digits() {
        let cst = FixedOffset::east_opt(8 * 3600).unwrap();
        let at = cst.with_ymd_and_hms(2019, 6, 27, 13, 37, 0).unwrap();
        assert_eq!(format_timestamp(&at), "20190627133700");
    }

    #[test]
    fn now_is_well_shaped() {
        assert!(is_timestamp_shaped(&now_timestamp()));
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert!(!is_timestamp_shaped(""));
        assert!(!is_timestamp_shaped("2019-06-27 13:37"));
        assert!(!is_timestamp_shaped("201906271337000"));
        assert!(!is_timestamp_shaped("2019062713370a"));
    }
}
