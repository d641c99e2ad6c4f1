//! JSON encoding for stored documents.
//!
//! Documents are written as indented JSON using the entities' own snake_case
//! field names. Decoding matches each object key against the field names of
//! the struct being read, ignoring ASCII case and `_`/`-` separators, so
//! `IsOccupied`, `isOccupied`, `IS_OCCUPIED` and `isoccupied` all fill
//! `is_occupied`. Keys that match no field are left as they are.

use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{DeserializeOwned, Deserializer, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Encode `value` as indented JSON.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the value cannot be represented as JSON.
pub fn encode<T: Serialize>(value: &T, context: &str) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| Error::serialization(context, source))
}

/// Decode a document, matching object keys case-insensitively.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the text is not JSON or does not
/// match the shape of `T`.
pub fn decode<T: DeserializeOwned>(json: &str, context: &str) -> Result<T> {
    let raw: Value =
        serde_json::from_str(json).map_err(|source| Error::serialization(context, source))?;
    T::deserialize(CaseInsensitive(raw)).map_err(|source| Error::serialization(context, source))
}

/// Key comparison form: ASCII lowercase with separators removed.
fn fold(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Rename keys of `map` that match one of `fields` once folded.
fn match_fields(map: Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let folded = fold(&key);
            let key = fields
                .iter()
                .find(|field| fold(field) == folded)
                .map_or(key, |field| (*field).to_string());
            (key, value)
        })
        .collect()
}

/// A JSON value whose structs are read with case-insensitive keys, at any
/// depth.
struct CaseInsensitive(Value);

impl CaseInsensitive {
    fn visit_object<'de, V: Visitor<'de>>(
        map: Map<String, Value>,
        visitor: V,
    ) -> std::result::Result<V::Value, serde_json::Error> {
        let mut entries = MapDeserializer::<_, serde_json::Error>::new(
            map.into_iter()
                .map(|(key, value)| (key, CaseInsensitive(value))),
        );
        let value = visitor.visit_map(&mut entries)?;
        entries.end()?;
        Ok(value)
    }

    fn visit_array<'de, V: Visitor<'de>>(
        items: Vec<Value>,
        visitor: V,
    ) -> std::result::Result<V::Value, serde_json::Error> {
        let mut seq =
            SeqDeserializer::<_, serde_json::Error>::new(items.into_iter().map(CaseInsensitive));
        let value = visitor.visit_seq(&mut seq)?;
        seq.end()?;
        Ok(value)
    }
}

impl<'de> IntoDeserializer<'de, serde_json::Error> for CaseInsensitive {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> Deserializer<'de> for CaseInsensitive {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => Self::visit_object(map, visitor),
            Value::Array(items) => Self::visit_array(items, visitor),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(CaseInsensitive(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => Self::visit_object(match_fields(map, fields), visitor),
            other => CaseInsensitive(other).deserialize_any(visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string bytes
        byte_buf unit unit_struct seq tuple tuple_struct map identifier ignored_any
    }
}
