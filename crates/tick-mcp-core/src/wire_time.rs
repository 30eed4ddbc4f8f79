//! Timestamp encoding used by the TickTick open API (`2025-01-01T09:00:00+0000`).

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Parse a provider timestamp, falling back to RFC 3339.
///
/// The provider emits offsets without a colon and sometimes includes milliseconds
/// (`2025-01-01T09:00:00.000+0000`); model-facing inputs tend to be RFC 3339.
///
/// # Errors
/// Returns the RFC 3339 parse error when neither format matches.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let trimmed = raw.trim();
    let wire = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory][offset_minute]"
    );
    OffsetDateTime::parse(trimmed, wire).or_else(|_| OffsetDateTime::parse(trimmed, &Rfc3339))
}

/// Format an instant the way the provider expects it, normalized to UTC.
///
/// # Errors
/// Returns an error if the instant cannot be represented in the wire format.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, time::error::Format> {
    let wire = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
    );
    value.to_offset(UtcOffset::UTC).format(wire)
}

/// Parse a bare calendar date (`YYYY-MM-DD`).
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Serde adapter for optional provider timestamps.
///
/// Blank strings and `null` both deserialize to `None`.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    /// Serialize an optional timestamp in the provider format.
    ///
    /// # Errors
    /// Propagates formatting failures as serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => {
                let formatted = super::format_timestamp(*instant).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp in either the provider format or RFC 3339.
    ///
    /// # Errors
    /// Fails when a non-blank string cannot be parsed.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_timestamp(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
