//! Relative and absolute time formatting.

use chrono::{DateTime, Datelike, FixedOffset, Local, Months, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::locale::{Locale, Phrase};

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// Time zone used to display and interpret wall-clock times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    /// The system's local zone
    #[default]
    Local,
    /// Coordinated Universal Time
    Utc,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// Format an instant in this zone using a strftime pattern.
    pub fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        match self {
            DisplayZone::Local => instant.with_timezone(&Local).format(pattern).to_string(),
            DisplayZone::Utc => instant.format(pattern).to_string(),
            DisplayZone::Fixed(offset) => instant.with_timezone(offset).format(pattern).to_string(),
        }
    }

    /// Interpret a wall-clock time in this zone.
    ///
    /// Ambiguous times resolve to the earlier instant; times skipped by a
    /// DST transition yield `None`.
    pub fn resolve(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            DisplayZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            DisplayZone::Utc => Some(Utc.from_utc_datetime(&naive)),
            DisplayZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => Ok(DisplayZone::Local),
            "utc" | "z" => Ok(DisplayZone::Utc),
            _ => parse_offset(trimmed)
                .map(DisplayZone::Fixed)
                .ok_or_else(|| Error::Config(format!("invalid timezone: {s}"))),
        }
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayZone::Local => f.write_str("local"),
            DisplayZone::Utc => f.write_str("utc"),
            DisplayZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `+HHMM`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Units a step of the threshold ladder can measure in.
#[derive(Debug, Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

/// One rung of the threshold ladder.
///
/// `unit: None` reuses the distance measured by the previous rung.
struct Step {
    phrase: Phrase,
    max: Option<i64>,
    unit: Option<Unit>,
}

const LADDER: [Step; 11] = [
    Step { phrase: Phrase::FewSeconds, max: Some(44), unit: Some(Unit::Second) },
    Step { phrase: Phrase::Minute, max: Some(89), unit: None },
    Step { phrase: Phrase::Minutes, max: Some(44), unit: Some(Unit::Minute) },
    Step { phrase: Phrase::Hour, max: Some(89), unit: None },
    Step { phrase: Phrase::Hours, max: Some(21), unit: Some(Unit::Hour) },
    Step { phrase: Phrase::Day, max: Some(35), unit: None },
    Step { phrase: Phrase::Days, max: Some(25), unit: Some(Unit::Day) },
    Step { phrase: Phrase::Month, max: Some(45), unit: None },
    Step { phrase: Phrase::Months, max: Some(10), unit: Some(Unit::Month) },
    Step { phrase: Phrase::Year, max: Some(17), unit: None },
    Step { phrase: Phrase::Years, max: None, unit: Some(Unit::Year) },
];

/// Formats the distance between an instant and a reference time as a phrase
/// such as "5 minutes ago" or "in 2 days".
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeFormatter {
    locale: Locale,
}

impl RelativeFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Describe `instant` as seen from `reference`.
    ///
    /// An instant equal to the reference counts as past.
    pub fn format(&self, instant: DateTime<Utc>, reference: DateTime<Utc>) -> String {
        let catalog = self.locale.catalog();
        let mut distance = 0.0;

        for (i, step) in LADDER.iter().enumerate() {
            if let Some(unit) = step.unit {
                distance = distance_in(unit, instant, reference);
            }
            let rounded = distance.abs().round() as i64;
            if step.max.map_or(true, |max| rounded <= max) {
                let phrase = if rounded <= 1 && i > 0 {
                    LADDER[i - 1].phrase
                } else {
                    step.phrase
                };
                let text = catalog.phrase(phrase, rounded);
                return catalog.directed(&text, instant > reference);
            }
        }

        unreachable!("the last ladder step has no upper bound")
    }
}

/// Signed distance from `instant` to `reference` in `unit`; positive when the
/// instant lies in the past.
fn distance_in(unit: Unit, instant: DateTime<Utc>, reference: DateTime<Utc>) -> f64 {
    let ms = (reference - instant).num_milliseconds() as f64;
    match unit {
        Unit::Second => ms / MS_PER_SECOND,
        Unit::Minute => ms / MS_PER_MINUTE,
        Unit::Hour => ms / MS_PER_HOUR,
        Unit::Day => ms / MS_PER_DAY,
        Unit::Month => fractional_months(instant, reference),
        Unit::Year => fractional_months(instant, reference) / 12.0,
    }
}

/// Calendar-aware month distance from `start` to `end`.
///
/// Whole months are counted by stepping the calendar; the remainder is the
/// fraction of the following month that has elapsed.
fn fractional_months(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    if end < start {
        return -fractional_months(end, start);
    }

    let mut whole = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    while whole > 0 && add_months(start, whole) > end {
        whole -= 1;
    }

    let anchor = add_months(start, whole);
    let next = add_months(start, whole + 1);
    let span = (next - anchor).num_milliseconds() as f64;
    if span <= 0.0 {
        return whole as f64;
    }
    let elapsed = (end - anchor).num_milliseconds() as f64;
    whole as f64 + elapsed / span
}

fn add_months(ts: DateTime<Utc>, months: i32) -> DateTime<Utc> {
    ts.checked_add_months(Months::new(months.max(0) as u32))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Formats an instant as a locale-appropriate absolute date and time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteFormatter {
    locale: Locale,
    zone: DisplayZone,
}

impl AbsoluteFormatter {
    pub fn new(locale: Locale, zone: DisplayZone) -> Self {
        Self { locale, zone }
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        self.zone.format(instant, pattern_for(self.locale))
    }
}

fn pattern_for(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "%-m/%-d/%Y, %-I:%M:%S %p",
        Locale::Fr => "%d/%m/%Y %H:%M:%S",
        Locale::De => "%d.%m.%Y, %H:%M:%S",
        Locale::Es => "%-d/%-m/%Y, %H:%M:%S",
    }
}
