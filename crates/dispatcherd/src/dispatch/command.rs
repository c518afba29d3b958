//! Command decoding for inbound messages.
//!
//! Each inbound message value is a small YAML (or JSON) document whose
//! top-level scalar fields form the command. The decoder flattens those
//! fields into a string map; routing decides later which keys matter.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::errors::DispatchError;
use super::router::DISPATCH_TARGET;

/// Well-known command keys.
pub mod keys {
    /// Operation requested by the command.
    pub const ACTION: &str = "action";
    /// Generic identifier, used by ship lookups.
    pub const ID: &str = "id";
    /// Ship the command acts upon.
    pub const SHIP_ID: &str = "shipId";
    /// Location symbol for marketplace lookups.
    pub const LOCATION: &str = "location";
    /// Flight plan destination symbol.
    pub const DESTINATION: &str = "destination";
    /// Flight plan identifier.
    pub const PLAN_ID: &str = "planId";
    /// Trade good symbol.
    pub const GOOD: &str = "good";
    /// Integer order size.
    pub const QUANTITY: &str = "quantity";
}

/// Decoded command: a flat map of string keys to string values.
///
/// A command lives for exactly one loop iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    fields: BTreeMap<String, String>,
}

/// Shape of one top-level value, learnt before its text is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldShape {
    Scalar,
    Null,
    Nested,
}

impl<'de> Deserialize<'de> for FieldShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ShapeVisitor)
    }
}

struct ShapeVisitor;

impl<'de> Visitor<'de> for ShapeVisitor {
    type Value = FieldShape;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a command field value")
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_i128<E: de::Error>(self, _value: i128) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_u128<E: de::Error>(self, _value: u128) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_str<E: de::Error>(self, _value: &str) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_bytes<E: de::Error>(self, _value: &[u8]) -> Result<FieldShape, E> {
        Ok(FieldShape::Scalar)
    }

    fn visit_unit<E: de::Error>(self) -> Result<FieldShape, E> {
        Ok(FieldShape::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<FieldShape, E> {
        Ok(FieldShape::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<FieldShape, D::Error> {
        FieldShape::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<FieldShape, A::Error> {
        IgnoredAny.visit_seq(seq).map(|_| FieldShape::Nested)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<FieldShape, A::Error> {
        IgnoredAny.visit_map(map).map(|_| FieldShape::Nested)
    }
}

/// Reads a document a second time, taking each scalar as its source text.
///
/// Plain scalars are requested as strings so `007`, `1e3` and `1.0` keep
/// the spelling the producer wrote.
struct SourceTextFields<'a> {
    shapes: &'a BTreeMap<String, FieldShape>,
}

impl<'de> DeserializeSeed<'de> for SourceTextFields<'_> {
    type Value = BTreeMap<String, Option<String>>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for SourceTextFields<'_> {
    type Value = BTreeMap<String, Option<String>>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a command mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut fields = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = match self.shapes.get(&key) {
                Some(FieldShape::Scalar) => Some(map.next_value::<String>()?),
                Some(FieldShape::Null) => {
                    map.next_value::<IgnoredAny>()?;
                    Some(String::new())
                }
                Some(FieldShape::Nested) | None => {
                    map.next_value::<IgnoredAny>()?;
                    None
                }
            };
            fields.insert(key, value);
        }
        Ok(fields)
    }
}

impl Command {
    /// Decodes a raw message payload.
    ///
    /// Scalars keep their source text and `null` becomes the empty string.
    /// Nested sequences and mappings are dropped.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Decode` when the payload is empty, not UTF-8,
    /// not a mapping, or not valid YAML.
    pub fn decode(payload: &[u8]) -> Result<Self, DispatchError> {
        let text = std::str::from_utf8(payload)
            .map_err(|error| DispatchError::decode_with_source("payload is not UTF-8", error))?;
        if text.trim().is_empty() {
            return Err(DispatchError::decode("empty payload"));
        }

        let shapes: BTreeMap<String, FieldShape> = serde_saphyr::from_str(text)
            .map_err(|error| DispatchError::decode(error.to_string()))?;
        let document = serde_saphyr::with_deserializer_from_str(text, |deserializer| {
            SourceTextFields { shapes: &shapes }.deserialize(deserializer)
        })
        .map_err(|error| DispatchError::decode(error.to_string()))?;

        let mut fields = BTreeMap::new();
        for (key, value) in document {
            match value {
                Some(text) => {
                    fields.insert(key, text);
                }
                None => {
                    debug!(target: DISPATCH_TARGET, key = %key, "skipping non-scalar command field");
                }
            }
        }
        Ok(Self { fields })
    }

    /// Returns the value stored under `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the value stored under `key`, or the empty string when absent.
    #[must_use]
    pub fn field(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Returns `true` when `key` is present, even with an empty value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the requested action name (empty when missing).
    #[must_use]
    pub fn action(&self) -> &str {
        self.field(keys::ACTION)
    }

    /// Number of decoded fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the command carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Command
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("{")?;
        for (index, (key, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{key}: {value:?}")?;
        }
        formatter.write_str("}")
    }
}
