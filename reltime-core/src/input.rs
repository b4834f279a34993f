//! The optional instant a relative date is rendered for.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::format::DisplayZone;

/// An optional point in time supplied by the owner of a display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateInput {
    /// A known instant
    Present(DateTime<Utc>),
    /// No date is available
    #[default]
    Absent,
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

impl DateInput {
    /// Build an input from epoch milliseconds.
    ///
    /// A zero timestamp is an unset date and maps to [`DateInput::Absent`].
    pub fn from_millis(millis: i64) -> Result<Self> {
        if millis == 0 {
            return Ok(DateInput::Absent);
        }
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(DateInput::Present)
            .ok_or_else(|| Error::InvalidDate {
                input: millis.to_string(),
                reason: "timestamp out of range".to_string(),
            })
    }

    /// Parse user-supplied text.
    ///
    /// Accepts epoch milliseconds, RFC 3339, or a wall-clock date/time which
    /// is interpreted in `zone`. Blank text, `-`, `none` and `null` mean
    /// absent.
    pub fn parse(text: &str, zone: DisplayZone) -> Result<Self> {
        let trimmed = text.trim();
        if matches!(
            trimmed.to_ascii_lowercase().as_str(),
            "" | "-" | "none" | "null"
        ) {
            return Ok(DateInput::Absent);
        }

        if let Ok(millis) = trimmed.parse::<i64>() {
            return DateInput::from_millis(millis);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(DateInput::Present(dt.with_timezone(&Utc)));
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });

        match naive {
            Some(naive) => zone
                .resolve(naive)
                .map(DateInput::Present)
                .ok_or_else(|| Error::InvalidDate {
                    input: trimmed.to_string(),
                    reason: format!("does not exist in timezone {zone}"),
                }),
            None => Err(Error::InvalidDate {
                input: trimmed.to_string(),
                reason: "expected epoch milliseconds, RFC 3339, or YYYY-MM-DD[ HH:MM[:SS]]"
                    .to_string(),
            }),
        }
    }

    /// The instant, if present.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            DateInput::Present(instant) => Some(*instant),
            DateInput::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, DateInput::Present(_))
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(instant: DateTime<Utc>) -> Self {
        DateInput::Present(instant)
    }
}

impl From<Option<DateTime<Utc>>> for DateInput {
    fn from(instant: Option<DateTime<Utc>>) -> Self {
        instant.map_or(DateInput::Absent, DateInput::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_markers() {
        for text in ["", "  ", "-", "none", "NULL"] {
            assert_eq!(DateInput::parse(text, DisplayZone::Utc).unwrap(), DateInput::Absent);
        }
    }

    #[test]
    fn test_epoch_millis() {
        let input = DateInput::parse("1700000000000", DisplayZone::Utc).unwrap();
        assert_eq!(
            input.instant().unwrap(),
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
        );

        let before_epoch = DateInput::parse("-1000", DisplayZone::Utc).unwrap();
        assert_eq!(
            before_epoch.instant().unwrap(),
            Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_zero_timestamp_is_absent() {
        assert_eq!(DateInput::from_millis(0).unwrap(), DateInput::Absent);
        assert_eq!(DateInput::parse("0", DisplayZone::Utc).unwrap(), DateInput::Absent);

        // Only the numeric zero is unset; the epoch spelled out is a real date.
        let epoch = DateInput::parse("1970-01-01T00:00:00Z", DisplayZone::Utc).unwrap();
        assert_eq!(epoch, DateInput::Present(DateTime::<Utc>::UNIX_EPOCH));
    }

    #[test]
    fn test_rfc3339_with_offset() {
        let input = DateInput::parse("2026-10-18T12:00:00+02:00", DisplayZone::Local).unwrap();
        assert_eq!(
            input.instant().unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_wall_clock_uses_zone() {
        let zone: DisplayZone = "-05:00".parse().unwrap();
        let input = DateInput::parse("2026-10-18 07:30", zone).unwrap();
        assert_eq!(
            input.instant().unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 0).unwrap()
        );

        let midnight = DateInput::parse("2026-10-18", DisplayZone::Utc).unwrap();
        assert_eq!(
            midnight.instant().unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let err = DateInput::parse("yesterday", DisplayZone::Utc).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { ref input, .. } if input == "yesterday"));
        assert!(DateInput::parse("2026-13-01", DisplayZone::Utc).is_err());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(DateInput::from(None::<DateTime<Utc>>), DateInput::Absent);
        assert!(DateInput::from(Some(Utc::now())).is_present());
    }
}
