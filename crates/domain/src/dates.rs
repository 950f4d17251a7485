//! Publish-date parsing across the encodings sources hand us
//!
//! Each strategy either produces a timestamp or declines. Strategies run in
//! order; when all decline the caller gets [`min_timestamp`], which ranks the
//! record below every dated one.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// A single parse attempt
pub type DateStrategy = fn(&str) -> Option<OffsetDateTime>;

const LOCAL_DATE_TIME: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
);
const LOCAL_DATE_TIME_SPACE: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
);
// Seconds optional, offset colon optional
const LENIENT_OFFSET_DATE_TIME: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]][offset_hour sign:mandatory][optional [:]][offset_minute]"
);
const CALENDAR_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Strategies in the order they are tried
pub const STRATEGIES: &[DateStrategy] = &[
    parse_rfc3339,
    parse_lenient_offset,
    parse_local_date_time,
    parse_calendar_date,
    parse_rfc2822,
];

/// The rank key for undated or unparseable records
pub fn min_timestamp() -> OffsetDateTime {
    Date::MIN.midnight().assume_utc()
}

/// Parse with the default strategy list
pub fn parse_published(raw: Option<&str>) -> Option<OffsetDateTime> {
    parse_with(STRATEGIES, raw)
}

/// Parse with an explicit strategy list
pub fn parse_with(strategies: &[DateStrategy], raw: Option<&str>) -> Option<OffsetDateTime> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    strategies.iter().find_map(|strategy| strategy(raw))
}

/// Rank key: parsed timestamp, or the minimum sentinel
pub fn rank_key(raw: Option<&str>) -> OffsetDateTime {
    parse_published(raw).unwrap_or_else(min_timestamp)
}

/// ISO-8601 with an explicit offset; a trailing `Z` is treated as `+00:00`
pub fn parse_rfc3339(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(&zulu_as_offset(raw), &Rfc3339).ok()
}

/// ISO-8601 with an offset but looser than RFC 3339: minute precision
/// (`2024-01-02T10:00Z`) or a compact offset (`+0000`)
pub fn parse_lenient_offset(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(&zulu_as_offset(raw), LENIENT_OFFSET_DATE_TIME).ok()
}

fn zulu_as_offset(raw: &str) -> String {
    match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => raw.to_string(),
    }
}

/// ISO-8601 date-time without an offset, taken as UTC
pub fn parse_local_date_time(raw: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(raw, LOCAL_DATE_TIME)
        .or_else(|_| PrimitiveDateTime::parse(raw, LOCAL_DATE_TIME_SPACE))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Bare calendar date, taken as UTC midnight
pub fn parse_calendar_date(raw: &str) -> Option<OffsetDateTime> {
    Date::parse(raw, CALENDAR_DATE)
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// Feed `pubDate` style (`Tue, 02 Jan 2024 10:00:00 GMT`)
pub fn parse_rfc2822(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc2822).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parses_zulu_suffix() {
        assert_eq!(
            parse_published(Some("2024-01-02T00:00:00Z")),
            Some(datetime!(2024-01-02 00:00:00 UTC))
        );
    }

    #[test]
    fn test_parses_explicit_offset() {
        assert_eq!(
            parse_published(Some("2024-01-02T02:00:00+02:00")),
            Some(datetime!(2024-01-02 00:00:00 UTC))
        );
    }

    #[test]
    fn test_parses_fractional_seconds() {
        assert_eq!(
            parse_published(Some("2024-01-02T00:00:00.500Z")),
            Some(datetime!(2024-01-02 00:00:00.5 UTC))
        );
    }

    #[test]
    fn test_parses_minute_precision_and_compact_offsets() {
        assert_eq!(
            parse_published(Some("2024-01-02T10:00Z")),
            Some(datetime!(2024-01-02 10:00:00 UTC))
        );
        assert_eq!(
            parse_published(Some("2024-01-02T10:00:00+0000")),
            Some(datetime!(2024-01-02 10:00:00 UTC))
        );
        assert_eq!(
            parse_published(Some("2024-01-02T12:30+0200")),
            Some(datetime!(2024-01-02 10:30:00 UTC))
        );
        assert_eq!(
            parse_published(Some("2024-01-02T10:00")),
            Some(datetime!(2024-01-02 10:00:00 UTC))
        );
    }

    #[test]
    fn test_parses_naive_date_time_as_utc() {
        assert_eq!(
            parse_published(Some("2024-01-02T08:30:00")),
            Some(datetime!(2024-01-02 08:30:00 UTC))
        );
    }

    #[test]
    fn test_parses_bare_date() {
        assert_eq!(
            parse_published(Some("2024-01-02")),
            Some(datetime!(2024-01-02 00:00:00 UTC))
        );
    }

    #[test]
    fn test_parses_feed_dates() {
        assert_eq!(
            parse_published(Some("Tue, 02 Jan 2024 10:00:00 GMT")),
            Some(datetime!(2024-01-02 10:00:00 UTC))
        );
        assert_eq!(
            parse_published(Some("Tue, 02 Jan 2024 10:00:00 +0100")),
            Some(datetime!(2024-01-02 09:00:00 UTC))
        );
    }

    #[test]
    fn test_unparseable_falls_back_to_sentinel() {
        assert_eq!(parse_published(Some("yesterday")), None);
        assert_eq!(parse_published(Some("   ")), None);
        assert_eq!(parse_published(None), None);
        assert_eq!(rank_key(Some("not a date")), min_timestamp());
    }

    #[test]
    fn test_sentinel_is_below_any_real_date() {
        assert!(min_timestamp() < datetime!(0001-01-01 00:00:00 UTC));
    }

    #[test]
    fn test_custom_strategy_list() {
        // Only RFC 2822 allowed: ISO input declines
        assert_eq!(parse_with(&[parse_rfc2822 as DateStrategy], Some("2024-01-02T00:00:00Z")), None);
    }
}
