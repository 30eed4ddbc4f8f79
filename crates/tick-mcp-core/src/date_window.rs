//! Named date windows resolved against a reference instant in an IANA timezone.
//!
//! Boundaries are computed on local calendar dates and then converted to absolute
//! instants, so a task authored in one timezone compares correctly against a window
//! resolved in another.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use time::OffsetDateTime;

/// Errors produced while resolving a date filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFilterError {
    #[error("unknown date filter: {token} (expected today, tomorrow, overdue, next_7_days or custom)")]
    UnknownToken { token: String },
    #[error("date filter `custom` requires custom_days")]
    MissingCustomDays,
    #[error("custom_days must be positive, got {days}")]
    NonPositiveDays { days: i64 },
    #[error("unknown timezone: {name}")]
    UnknownTimezone { name: String },
    #[error("date window is out of the representable range")]
    OutOfRange,
}

/// A named date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// The reference day.
    Today,
    /// The day after the reference day.
    Tomorrow,
    /// Anything due before the reference day started.
    Overdue,
    /// The reference day and the six following days.
    Next7Days,
    /// The reference day and the following `days - 1` days.
    Custom {
        /// Window length in days, always positive.
        days: u32,
    },
}

impl DateFilter {
    /// Parse a token (`today`, `tomorrow`, `overdue`, `next_7_days`, `custom`).
    ///
    /// Tokens are case-insensitive and treat `-` and spaces as `_`.
    ///
    /// # Errors
    /// Fails for unknown tokens, and for `custom` without a positive day count.
    pub fn from_token(token: &str, custom_days: Option<i64>) -> Result<Self, DateFilterError> {
        let normalized = token.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "overdue" => Ok(Self::Overdue),
            "next_7_days" | "next7days" | "next_7days" => Ok(Self::Next7Days),
            "custom" => match custom_days {
                None => Err(DateFilterError::MissingCustomDays),
                Some(days) if days <= 0 => Err(DateFilterError::NonPositiveDays { days }),
                Some(days) => u32::try_from(days)
                    .map(|days| Self::Custom { days })
                    .map_err(|_| DateFilterError::OutOfRange),
            },
            _ => Err(DateFilterError::UnknownToken {
                token: token.to_owned(),
            }),
        }
    }

    /// Resolve into a concrete window around `reference` in `tz`.
    ///
    /// # Errors
    /// Returns [`DateFilterError::OutOfRange`] if a boundary cannot be represented.
    pub fn resolve(self, reference: OffsetDateTime, tz: Tz) -> Result<DateWindow, DateFilterError> {
        let today = local_date(reference, tz)?;
        let midnight = |offset: u64| local_midnight(today, offset, tz);
        Ok(match self {
            Self::Today => DateWindow::between(midnight(0)?, midnight(1)?),
            Self::Tomorrow => DateWindow::between(midnight(1)?, midnight(2)?),
            Self::Overdue => DateWindow::before(midnight(0)?),
            Self::Next7Days => DateWindow::between(midnight(0)?, midnight(7)?),
            Self::Custom { days } => DateWindow::between(midnight(0)?, midnight(u64::from(days))?),
        })
    }
}

/// Resolve a date-filter token in one step.
///
/// # Errors
/// See [`DateFilter::from_token`] and [`DateFilter::resolve`].
pub fn resolve(
    token: &str,
    custom_days: Option<i64>,
    reference: OffsetDateTime,
    tz: Tz,
) -> Result<DateWindow, DateFilterError> {
    DateFilter::from_token(token, custom_days)?.resolve(reference, tz)
}

/// Parse an IANA timezone name such as `Asia/Tokyo`.
///
/// # Errors
/// Returns [`DateFilterError::UnknownTimezone`] for names missing from the tz database.
pub fn parse_timezone(name: &str) -> Result<Tz, DateFilterError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DateFilterError::UnknownTimezone {
            name: name.to_owned(),
        })
}

/// Half-open instant range `[start, end)`; an absent start is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Inclusive lower bound, `None` for unbounded.
    pub start: Option<OffsetDateTime>,
    /// Exclusive upper bound.
    pub end: OffsetDateTime,
}

impl DateWindow {
    /// `[start, end)`.
    #[must_use]
    pub const fn between(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            start: Some(start),
            end,
        }
    }

    /// `(-inf, end)`.
    #[must_use]
    pub const fn before(end: OffsetDateTime) -> Self {
        Self { start: None, end }
    }

    /// Whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        instant < self.end && self.start.is_none_or(|start| instant >= start)
    }
}

/// Local midnight of `date` in `tz` as an absolute instant.
///
/// # Errors
/// Returns [`DateFilterError::OutOfRange`] when the instant cannot be represented.
pub fn start_of_day(date: time::Date, tz: Tz) -> Result<OffsetDateTime, DateFilterError> {
    let naive = NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    )
    .ok_or(DateFilterError::OutOfRange)?;
    local_midnight(naive, 0, tz)
}

fn local_date(reference: OffsetDateTime, tz: Tz) -> Result<NaiveDate, DateFilterError> {
    let utc = DateTime::<Utc>::from_timestamp(reference.unix_timestamp(), 0)
        .ok_or(DateFilterError::OutOfRange)?;
    Ok(utc.with_timezone(&tz).date_naive())
}

fn local_midnight(date: NaiveDate, offset_days: u64, tz: Tz) -> Result<OffsetDateTime, DateFilterError> {
    let day = date
        .checked_add_days(Days::new(offset_days))
        .ok_or(DateFilterError::OutOfRange)?;
    let midnight = day.and_hms_opt(0, 0, 0).ok_or(DateFilterError::OutOfRange)?;
    let local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| first_instant_after_gap(tz, midnight))
        .ok_or(DateFilterError::OutOfRange)?;
    OffsetDateTime::from_unix_timestamp(local.timestamp()).map_err(|_| DateFilterError::OutOfRange)
}

// Some zones skip midnight on DST transitions; the day then starts at the first valid instant.
fn first_instant_after_gap(tz: Tz, midnight: NaiveDateTime) -> Option<DateTime<Tz>> {
    (1..=96_i64)
        .map(|quarter| midnight + TimeDelta::minutes(15 * quarter))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
}
