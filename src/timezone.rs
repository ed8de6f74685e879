//! Resolving canonical timezone names to UTC offsets.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset for a canonical timezone name such as
/// "Asia/Jakarta". Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the given canonical timezone, or in UTC if the timezone
/// name is unknown.
pub fn today_in(canonical_timezone: &str) -> time::Date {
    let offset = get_local_offset(canonical_timezone).unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

#[cfg(test)]
mod timezone_tests {
    use super::get_local_offset;

    #[test]
    fn resolves_canonical_name() {
        let offset = get_local_offset("Asia/Jakarta").expect("known timezone");
        assert_eq!(offset.whole_hours(), 7);
    }

    #[test]
    fn returns_none_for_unknown_name() {
        assert!(get_local_offset("Not/AZone").is_none());
    }
}
