use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Error, PartialEq)]
#[error("Invalid timestamp {0:?}, expected RFC 3339")]
pub struct TimestampError(String);

/// A UTC instant. The zero value means "never set" and serializes to nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<OffsetDateTime>);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(None);

    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn from_datetime(datetime: OffsetDateTime) -> Self {
        Self(Some(datetime.to_offset(UtcOffset::UTC)))
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    #[must_use]
    pub fn datetime(&self) -> Option<OffsetDateTime> {
        self.0
    }

    #[must_use]
    pub fn unix_nanos(&self) -> i128 {
        self.0.map_or(0, OffsetDateTime::unix_timestamp_nanos)
    }

    /// RFC 3339 rendering; empty for the zero value.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        match self.0 {
            None => String::new(),
            Some(datetime) => datetime.format(&Rfc3339).unwrap_or_default(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, TimestampError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Self::ZERO);
        }

        OffsetDateTime::parse(value, &Rfc3339)
            .map(Self::from_datetime)
            .map_err(|_| TimestampError(value.to_string()))
    }

    pub fn parse_bytes(value: &[u8]) -> Result<Self, TimestampError> {
        let text = std::str::from_utf8(value)
            .map_err(|_| TimestampError(String::from_utf8_lossy(value).into_owned()))?;
        Self::parse(text)
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(datetime: OffsetDateTime) -> Self {
        Self::from_datetime(datetime)
    }
}

impl From<Option<OffsetDateTime>> for Timestamp {
    fn from(datetime: Option<OffsetDateTime>) -> Self {
        datetime.map_or(Self::ZERO, Self::from_datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            None => serializer.serialize_none(),
            Some(_) => serializer.serialize_str(&self.to_rfc3339()),
        }
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an RFC 3339 timestamp as a string or byte string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
        Timestamp::parse(value).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Timestamp, E> {
        Timestamp::parse_bytes(value).map_err(E::custom)
    }

    fn visit_none<E: de::Error>(self) -> Result<Timestamp, E> {
        Ok(Timestamp::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Timestamp, E> {
        Ok(Timestamp::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Timestamp, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}
