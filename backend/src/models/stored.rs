//! Field values of the client-written document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A document field as the client left it.
///
/// Values of the expected type are typed. Anything else, such as the `null`
/// a blank numeric input produces, is kept verbatim so that saving writes it
/// back unchanged. A field that was never there stays absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Stored<T> {
    Absent,
    Valid(T),
    Other(Value),
}

impl<T> Default for Stored<T> {
    fn default() -> Self {
        Stored::Absent
    }
}

impl<T> From<T> for Stored<T> {
    fn from(value: T) -> Self {
        Stored::Valid(value)
    }
}

impl<T> Stored<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Stored::Absent)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Stored::Valid(value) => Some(value),
            _ => None,
        }
    }
}

impl Stored<String> {
    /// Text value; anything unusable reads as empty.
    pub fn as_str(&self) -> &str {
        self.get().map_or("", String::as_str)
    }
}

impl Stored<u32> {
    /// Missing, `null` or non-numeric values count as 0. Fractions are
    /// truncated and negatives clamp to 0.
    pub fn or_zero(&self) -> u32 {
        match self {
            Stored::Valid(n) => *n,
            Stored::Other(Value::Number(n)) => n.as_f64().map_or(0, |f| f as u32),
            _ => 0,
        }
    }
}

impl Stored<u64> {
    /// Same reading as the `u32` version, for ids and counters.
    pub fn or_zero(&self) -> u64 {
        match self {
            Stored::Valid(n) => *n,
            Stored::Other(Value::Number(n)) => n.as_f64().map_or(0, |f| f as u64),
            _ => 0,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Stored<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&value) {
            Ok(typed) => Stored::Valid(typed),
            Err(_) => Stored::Other(value),
        })
    }
}

impl<T: Serialize> Serialize for Stored<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stored::Absent => serializer.serialize_none(),
            Stored::Valid(value) => value.serialize(serializer),
            Stored::Other(value) => value.serialize(serializer),
        }
    }
}
