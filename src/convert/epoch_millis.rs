//! Purpose: Bind `time::OffsetDateTime` fields to Unix-epoch milliseconds.
//! Exports: `serialize`/`deserialize` for `#[serde(with = "...")]`, the `option` variant,
//! and `to_millis`/`from_millis`/`parse_text` helpers.
//! Invariants: Writes integer milliseconds, rounding sub-millisecond parts half away from zero.
//! Invariants: Reads integers, integral floats, numeric strings, or `YYYY-MM-DD HH:MM:SS` (UTC).
//! Invariants: Anything else is a deserialize error, never a silent default.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use time::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const TEXT_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";
const NANOS_PER_MILLI: i128 = 1_000_000;

pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let millis = to_millis(value).ok_or_else(|| {
        serde::ser::Error::custom("date-time is outside the i64 millisecond range")
    })?;
    serializer.serialize_i64(millis)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    deserializer.deserialize_any(EpochMillisVisitor)
}

pub fn to_millis(value: &OffsetDateTime) -> Option<i64> {
    let nanos = value.unix_timestamp_nanos();
    let half = NANOS_PER_MILLI / 2;
    let rounded = if nanos >= 0 {
        (nanos + half) / NANOS_PER_MILLI
    } else {
        (nanos - half) / NANOS_PER_MILLI
    };
    i64::try_from(rounded).ok()
}

pub fn from_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI).ok()
}

/// Parse a numeric millisecond string or a `YYYY-MM-DD HH:MM:SS` timestamp (UTC).
pub fn parse_text(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    if let Ok(millis) = text.parse::<i64>() {
        return from_millis(millis);
    }
    let format = format_description::parse(TEXT_FORMAT).ok()?;
    PrimitiveDateTime::parse(text, &format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

struct EpochMillisVisitor;

impl<'de> Visitor<'de> for EpochMillisVisitor {
    type Value = OffsetDateTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unix epoch milliseconds or a `YYYY-MM-DD HH:MM:SS` string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        from_millis(v).ok_or_else(|| E::custom(format!("epoch milliseconds out of range: {v}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let millis =
            i64::try_from(v).map_err(|_| E::custom(format!("epoch milliseconds out of range: {v}")))?;
        self.visit_i64(millis)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() || v.fract() != 0.0 || v < i64::MIN as f64 || v >= i64::MAX as f64 {
            return Err(E::custom(format!("epoch milliseconds must be integral: {v}")));
        }
        self.visit_i64(v as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_text(v).ok_or_else(|| E::custom(format!("unrecognized date-time text: {v:?}")))
    }
}

pub mod option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use time::OffsetDateTime;

    #[derive(Deserialize, Serialize)]
    struct Millis(#[serde(with = "super")] OffsetDateTime);

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&Millis(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        Ok(Option::<Millis>::deserialize(deserializer)?.map(|Millis(value)| value))
    }
}
