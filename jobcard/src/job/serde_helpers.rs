//! Field encodings for the persisted job document.
//!
//! Optional values are written as `""` when unset and read back from `""`, `null` or a missing
//! field.

pub(crate) mod optional_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => timestamp.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => DateTime::parse_from_rfc3339(text)
                .map(|timestamp| Some(timestamp.with_timezone(&Utc)))
                .map_err(D::Error::custom),
        }
    }
}

/// Shop local date and time without an offset, as entered in a `datetime-local` field.
pub(crate) mod optional_wall_time {
    use chrono::{DateTime, Local, NaiveDateTime, Timelike};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const MINUTES: &str = "%Y-%m-%dT%H:%M";
    const SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
    const FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn format(value: &NaiveDateTime) -> String {
        let format = match (value.second(), value.nanosecond()) {
            (0, 0) => MINUTES,
            (_, 0) => SECONDS,
            _ => FRACTIONAL,
        };
        value.format(format).to_string()
    }

    /// Reads `YYYY-MM-DDTHH:MM`, optionally with seconds, or an RFC 3339 timestamp which is
    /// converted to local time.
    pub fn parse(text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        NaiveDateTime::parse_from_str(text, MINUTES)
            .or_else(|_| NaiveDateTime::parse_from_str(text, FRACTIONAL))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|timestamp| timestamp.with_timezone(&Local).naive_local())
            })
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&format(value)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date and time: {text}"))),
        }
    }
}

/// Values with a [`Display`](std::fmt::Display) and [`FromStr`](std::str::FromStr) text form.
pub(crate) mod optional_text {
    use std::{fmt::Display, str::FromStr};

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some).map_err(D::Error::custom),
        }
    }
}
