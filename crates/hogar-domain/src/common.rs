//! Shared traits, the stored-record envelope, and timestamp encoding.

use serde::{Deserialize, Serialize};

use crate::party::Party;

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Names the household party that paid for an entry.
pub trait PaidBy {
    fn paid_by(&self) -> Party;
}

/// A domain value together with the identifier it is stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    pub value: T,
}

impl<T> Record<T> {
    pub fn new(id: impl Into<String>, value: T) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

impl<T: Amounted> Amounted for Record<T> {
    fn amount(&self) -> f64 {
        self.value.amount()
    }
}

impl<T: PaidBy> PaidBy for Record<T> {
    fn paid_by(&self) -> Party {
        self.value.paid_by()
    }
}

impl Amounted for (f64, Party) {
    fn amount(&self) -> f64 {
        self.0
    }
}

impl PaidBy for (f64, Party) {
    fn paid_by(&self) -> Party {
        self.1
    }
}

/// Fixed-width RFC 3339 timestamps (`2024-06-01T08:30:00.000Z`).
///
/// Stores order documents by comparing these strings, so every timestamp
/// must be rendered with the same width.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }

    /// Same encoding for optional timestamps (`null` when absent).
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&super::format(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|value| {
                DateTime::parse_from_rfc3339(&value)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(D::Error::custom)
            })
            .transpose()
        }
    }
}

/// Coerces a raw amount: non-finite and negative values become zero.
pub fn non_negative(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
