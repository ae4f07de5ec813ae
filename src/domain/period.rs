//! Reporting period handling
//!
//! A period is requested as two calendar-date labels (`YYYY-MM-DD`). The
//! labels are part of the report identity and are echoed back verbatim in
//! `meta.period`; the instant range they denote is day bounds in UTC
//! (00:00:00.000 through 23:59:59.999), which keeps the same request
//! reproducible on any host regardless of server timezone.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};

use super::errors::AerError;
use super::result::Result;

/// Inclusive reporting period with its original date labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPeriod {
    start_label: String,
    end_label: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportPeriod {
    /// Builds a period from two `YYYY-MM-DD` labels
    ///
    /// # Errors
    ///
    /// Returns `AerError::InvalidRange` when either label is malformed or
    /// the start date falls after the end date.
    pub fn from_labels(start_label: &str, end_label: &str) -> Result<Self> {
        let start_label = start_label.trim();
        let end_label = end_label.trim();

        let start_date = parse_date_label(start_label).ok_or_else(|| {
            AerError::InvalidRange("Invalid date format (expected YYYY-MM-DD)".to_string())
        })?;
        let end_date = parse_date_label(end_label).ok_or_else(|| {
            AerError::InvalidRange("Invalid date format (expected YYYY-MM-DD)".to_string())
        })?;

        let start = day_start(start_date);
        let end = day_end(end_date);

        if start > end {
            return Err(AerError::InvalidRange(
                "Start date must be before end date".to_string(),
            ));
        }

        Ok(Self {
            start_label: start_label.to_string(),
            end_label: end_label.to_string(),
            start,
            end,
        })
    }

    /// The start label as originally supplied
    pub fn start_label(&self) -> &str {
        &self.start_label
    }

    /// The end label as originally supplied
    pub fn end_label(&self) -> &str {
        &self.end_label
    }

    /// First instant of the period (start day at 00:00:00.000 UTC)
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last instant of the period (end day at 23:59:59.999 UTC)
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether an instant falls inside the period (inclusive on both ends)
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Parses a strict `YYYY-MM-DD` label
///
/// Rejects unpadded fields and impossible dates (chrono validates the
/// day-of-month, leap years included).
pub fn parse_date_label(value: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    // Round-trip to reject variable-width forms like 2026-1-9.
    if date.format("%Y-%m-%d").to_string() != value {
        return None;
    }
    Some(date)
}

/// First instant of a calendar day in UTC
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_milli_opt(0, 0, 0, 0).unwrap_or_default())
}

/// Last represented instant of a calendar day in UTC
pub fn day_end(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_milli_opt(23, 59, 59, 999).unwrap_or_default())
}

/// Formats an instant for the wire: RFC 3339, millisecond precision, `Z`
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Optional-instant variant of [`format_instant`]
pub fn format_instant_opt(instant: Option<DateTime<Utc>>) -> Option<String> {
    instant.map(format_instant)
}

/// Date-only label of an instant (UTC calendar day)
pub fn date_label_of(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_period_from_labels() {
        let period = ReportPeriod::from_labels("2026-01-01", "2026-01-31").unwrap();
        assert_eq!(period.start_label(), "2026-01-01");
        assert_eq!(period.end_label(), "2026-01-31");
        assert_eq!(format_instant(period.start()), "2026-01-01T00:00:00.000Z");
        assert_eq!(format_instant(period.end()), "2026-01-31T23:59:59.999Z");
    }

    #[test]
    fn test_period_single_day() {
        let period = ReportPeriod::from_labels("2026-01-15", "2026-01-15").unwrap();
        assert!(period.start() < period.end());
    }

    #[test]
    fn test_period_inverted_fails() {
        let err = ReportPeriod::from_labels("2026-02-01", "2026-01-31").unwrap_err();
        assert!(matches!(err, AerError::InvalidRange(_)));
        assert!(err.to_string().contains("Start date must be before end date"));
    }

    #[test_case("2026-1-9"; "unpadded month and day")]
    #[test_case("2026-01-9"; "unpadded day")]
    #[test_case("2026-13-01"; "month out of range")]
    #[test_case("2026-02-30"; "day out of range")]
    #[test_case("20260101"; "no separators")]
    #[test_case("not-a-date"; "garbage")]
    #[test_case(""; "empty")]
    fn test_invalid_date_labels(label: &str) {
        assert!(parse_date_label(label).is_none());
    }

    #[test]
    fn test_leap_year_day_accepted() {
        assert!(parse_date_label("2024-02-29").is_some());
        assert!(parse_date_label("2026-02-29").is_none());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let period = ReportPeriod::from_labels("2026-01-01", "2026-01-31").unwrap();
        assert!(period.contains(period.start()));
        assert!(period.contains(period.end()));
        assert!(!period.contains(period.start() - chrono::Duration::milliseconds(1)));
        assert!(!period.contains(period.end() + chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_format_instant_millis() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 9, 9, 0, 0).unwrap();
        assert_eq!(format_instant(instant), "2026-01-09T09:00:00.000Z");
    }

    #[test]
    fn test_date_label_of() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 9, 23, 59, 59).unwrap();
        assert_eq!(date_label_of(instant), "2026-01-09");
    }

    #[test]
    fn test_labels_are_trimmed() {
        let period = ReportPeriod::from_labels(" 2026-01-01 ", "2026-01-31").unwrap();
        assert_eq!(period.start_label(), "2026-01-01");
    }
}
