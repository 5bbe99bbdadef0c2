//! Calendar-day handling.
//!
//! Records are identified by the day alone. Inputs may carry a time of day
//! (`2024-01-15T23:00:00`, or RFC 3339 with an offset); the calendar day as
//! written is kept and the time is dropped, so two timestamps on the same day
//! always resolve to the same record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Deserializer};

use crate::{Error, Result};

const DATE_TIME_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
];

/// Anything that can be reduced to the calendar day it falls on.
pub trait IntoDay {
  fn into_day(self) -> NaiveDate;
}

impl IntoDay for NaiveDate {
  fn into_day(self) -> NaiveDate { self }
}

impl IntoDay for NaiveDateTime {
  fn into_day(self) -> NaiveDate { self.date() }
}

impl<Tz: TimeZone> IntoDay for DateTime<Tz> {
  fn into_day(self) -> NaiveDate { self.date_naive() }
}

/// Parse a date or timestamp string down to its calendar day.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
  let s = input.trim();

  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(date);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.into_day());
  }
  DATE_TIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .map(IntoDay::into_day)
    .ok_or_else(|| Error::InvalidDate(input.to_owned()))
}

/// Parse a wall-clock time, `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
  let s = input.trim();
  NaiveTime::parse_from_str(s, "%H:%M")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
    .map_err(|_| Error::InvalidTime(input.to_owned()))
}

/// `deserialize_with` helper accepting any form [`parse_day`] understands.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_day(&raw).map_err(serde::de::Error::custom)
}

/// Like [`deserialize`], but for optional fields. Blank strings are `None`.
pub fn deserialize_opt<'de, D>(
  deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(deserializer)? {
    Some(raw) if !raw.trim().is_empty() => {
      parse_day(&raw).map(Some).map_err(serde::de::Error::custom)
    }
    _ => Ok(None),
  }
}

/// Serde adapter for optional `HH:MM` times.
pub mod clock {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match value {
      Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
  where
    D: Deserializer<'de>,
  {
    match Option::<String>::deserialize(deserializer)? {
      Some(raw) if !raw.trim().is_empty() => super::parse_time(&raw)
        .map(Some)
        .map_err(serde::de::Error::custom),
      _ => Ok(None),
    }
  }
}
