use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration};

use crate::error::ValidationError;

const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse the calendar day at the start of `input`.
///
/// Only the leading `YYYY-MM-DD` is considered, so a full timestamp keeps the
/// day it was written on instead of being shifted into another time zone.
///
/// # Errors
/// Returns [`ValidationError::InvalidDate`] when no day string can be read.
pub fn parse_day(input: &str) -> Result<Date, ValidationError> {
    let trimmed = input.trim();
    let day = trimmed.split(['T', 't', ' ']).next().unwrap_or(trimmed);
    Date::parse(day, DAY_FORMAT).map_err(|source| ValidationError::InvalidDate {
        input: input.to_owned(),
        source,
    })
}

/// Format a day as `YYYY-MM-DD`, the same layout [`parse_day`] reads.
#[must_use]
pub fn format_day(day: Date) -> String {
    day.format(DAY_FORMAT).unwrap_or_default()
}

/// The day after `today`, if representable.
#[must_use]
pub const fn tomorrow(today: Date) -> Option<Date> {
    today.next_day()
}

/// Sunday and Saturday of the week containing `today`.
#[must_use]
pub fn week_bounds(today: Date) -> (Date, Date) {
    let offset = i64::from(today.weekday().number_days_from_sunday());
    let start = today.checked_sub(Duration::days(offset)).unwrap_or(Date::MIN);
    let end = start.checked_add(Duration::days(6)).unwrap_or(Date::MAX);
    (start, end)
}

/// Long English rendering used for page headers, e.g. `Sunday 9 March 2025`.
#[must_use]
pub fn long_day(day: Date) -> String {
    format!("{} {} {} {}", day.weekday(), day.day(), day.month(), day.year())
}

/// Serde adapter for optional day strings.
pub mod option_day {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::Date;

    /// Serialize `Some(day)` as `"YYYY-MM-DD"` and `None` as `null`.
    ///
    /// # Errors
    /// Propagates serializer failures.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(day) => serializer.serialize_str(&super::format_day(*day)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize `null`, `""` or a day string.
    ///
    /// # Errors
    /// Fails when a non-empty string carries no readable day.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_day(text).map(Some).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_plain_day_strings() {
        let day = parse_day("2025-03-09").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(day, date!(2025 - 03 - 09));
    }

    #[test]
    fn timestamps_are_truncated_not_shifted() {
        let late = parse_day("2025-03-09T23:59:00-10:00").unwrap_or_else(|err| panic!("{err}"));
        let early = parse_day("2025-03-09 00:00:01+14:00").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(late, date!(2025 - 03 - 09));
        assert_eq!(early, date!(2025 - 03 - 09));
    }

    #[test]
    fn rejects_non_dates() {
        let Err(err) = parse_day("next tuesday") else {
            panic!("expected parse failure");
        };
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
        assert!(parse_day("2025-02-30").is_err());
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_day(date!(2025 - 01 - 05)), "2025-01-05");
        assert_eq!(format_day(date!(0987 - 11 - 30)), "0987-11-30");
    }

    #[test]
    fn formatted_days_parse_back() {
        for day in [date!(2024 - 02 - 29), date!(2025 - 12 - 31), date!(0001 - 01 - 01)] {
            let parsed = parse_day(&format_day(day)).unwrap_or_else(|err| panic!("{err}"));
            assert_eq!(parsed, day);
        }
    }

    #[test]
    fn tomorrow_crosses_month_and_year() {
        assert_eq!(tomorrow(date!(2024 - 12 - 31)), Some(date!(2025 - 01 - 01)));
        assert_eq!(tomorrow(date!(2024 - 02 - 28)), Some(date!(2024 - 02 - 29)));
    }

    #[test]
    fn week_runs_sunday_to_saturday() {
        // 2025-03-12 is a Wednesday.
        assert_eq!(
            week_bounds(date!(2025 - 03 - 12)),
            (date!(2025 - 03 - 09), date!(2025 - 03 - 15))
        );
        // Sunday starts its own week.
        assert_eq!(
            week_bounds(date!(2025 - 03 - 09)),
            (date!(2025 - 03 - 09), date!(2025 - 03 - 15))
        );
        // Saturday ends it.
        assert_eq!(
            week_bounds(date!(2025 - 03 - 15)),
            (date!(2025 - 03 - 09), date!(2025 - 03 - 15))
        );
    }

    #[test]
    fn week_can_span_a_year_boundary() {
        // 2025-01-01 is a Wednesday.
        assert_eq!(
            week_bounds(date!(2025 - 01 - 01)),
            (date!(2024 - 12 - 29), date!(2025 - 01 - 04))
        );
    }

    #[test]
    fn long_day_reads_naturally() {
        assert_eq!(long_day(date!(2025 - 03 - 09)), "Sunday 9 March 2025");
    }
}
