//! Creation timestamps as they arrive from a schemaless document store.
//!
//! A record's `createdAt` may be an ISO string, a native `{seconds, nanoseconds}`
//! timestamp object, a raw epoch value in milliseconds, or absent. Every merge
//! path normalizes through [`CreatedAt::normalize`] so views agree on order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Creation timestamp of a product record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CreatedAt {
    #[default]
    Missing,
    IsoString(String),
    NativeTimestamp { seconds: i64, nanoseconds: u32 },
    /// Milliseconds since the Unix epoch.
    RawEpoch(i64),
}

const FALLBACK_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl CreatedAt {
    /// Timestamp for a record created at `at`, stored as an ISO string.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self::IsoString(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Normalize to an instant.
    ///
    /// Missing timestamps take `now`. Strings that cannot be parsed, and values
    /// outside chrono's range, sort as the oldest possible instant.
    pub fn normalize(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Missing => now,
            Self::IsoString(raw) => parse_date(raw).unwrap_or(DateTime::<Utc>::MIN_UTC),
            Self::NativeTimestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds).unwrap_or(DateTime::<Utc>::MIN_UTC),
            Self::RawEpoch(millis) => {
                DateTime::from_timestamp_millis(*millis).unwrap_or(DateTime::<Utc>::MIN_UTC)
            }
        }
    }

    /// ISO rendering used by listing views. Strings pass through untouched.
    pub fn to_iso_string(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::IsoString(raw) => raw.clone(),
            other => other
                .normalize(now)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl Serialize for CreatedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Native {
            seconds: i64,
            nanoseconds: u32,
        }

        match self {
            Self::Missing => serializer.serialize_none(),
            Self::IsoString(raw) => serializer.serialize_str(raw),
            Self::NativeTimestamp {
                seconds,
                nanoseconds,
            } => Native {
                seconds: *seconds,
                nanoseconds: *nanoseconds,
            }
            .serialize(serializer),
            Self::RawEpoch(millis) => serializer.serialize_i64(*millis),
        }
    }
}

impl<'de> Deserialize<'de> for CreatedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(value.map(Self::from_json).unwrap_or_default())
    }
}

impl CreatedAt {
    /// Classify a raw JSON value. Unrecognised shapes count as missing.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::String(raw) => Self::IsoString(raw),
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Self::RawEpoch)
                .unwrap_or_default(),
            JsonValue::Object(map) => {
                let seconds = map
                    .get("seconds")
                    .or_else(|| map.get("_seconds"))
                    .and_then(JsonValue::as_i64);
                let nanoseconds = map
                    .get("nanoseconds")
                    .or_else(|| map.get("_nanoseconds"))
                    .and_then(JsonValue::as_u64)
                    .unwrap_or(0);
                match seconds {
                    Some(seconds) => Self::NativeTimestamp {
                        seconds,
                        nanoseconds: u32::try_from(nanoseconds).unwrap_or(0),
                    },
                    None => Self::Missing,
                }
            }
            _ => Self::Missing,
        }
    }
}
