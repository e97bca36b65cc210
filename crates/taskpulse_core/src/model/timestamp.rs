//! Serde helpers for the timestamp fields stored in the collection files.
//!
//! Timestamps are written as RFC 3339. On read a bare `YYYY-MM-DD` is also
//! accepted and taken as midnight UTC, which is how due dates and meeting
//! dates were stored by earlier dashboards.

use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const CALENDAR_DATE: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(parsed);
    }
    Date::parse(trimmed, CALENDAR_DATE)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

pub fn parse_calendar_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), CALENDAR_DATE).ok()
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, time::error::Format> {
    value.format(&Rfc3339)
}

pub fn format_calendar_date(value: Date) -> Result<String, time::error::Format> {
    value.format(CALENDAR_DATE)
}

fn parse_or_error<E: serde::de::Error>(raw: &str) -> Result<OffsetDateTime, E> {
    parse_timestamp(raw)
        .ok_or_else(|| E::custom(format!("expected RFC 3339 timestamp or YYYY-MM-DD, got '{raw}'")))
}

pub mod required {
    use super::*;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = format_timestamp(*value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_or_error(&raw)
    }
}

pub mod optional {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => required::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_or_error(&raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Patch form: absent field is `None`, explicit `null` is `Some(None)`.
pub mod patch {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<OffsetDateTime>>, D::Error> {
        optional::deserialize(deserializer).map(Some)
    }
}

pub mod calendar_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = format_calendar_date(*value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Some(date) = parse_calendar_date(&raw) {
            return Ok(date);
        }
        parse_or_error(&raw).map(|timestamp| timestamp.date())
    }
}

/// Patch form for plain nullable values.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{parse_calendar_date, parse_timestamp};
    use time::macros::{date, datetime};

    #[test]
    fn parses_rfc3339_and_calendar_dates() {
        assert_eq!(
            parse_timestamp("2025-03-01T10:30:00Z"),
            Some(datetime!(2025-03-01 10:30:00 UTC))
        );
        assert_eq!(
            parse_timestamp(" 2025-03-01 "),
            Some(datetime!(2025-03-01 00:00:00 UTC))
        );
        assert_eq!(parse_calendar_date("2025-03-01"), Some(date!(2025 - 03 - 01)));
    }

    #[test]
    fn rejects_free_text() {
        assert_eq!(parse_timestamp("next tuesday"), None);
    }
}
