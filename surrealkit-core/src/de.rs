//! Strict `serde` deserialization straight from engine values.
//!
//! Each `deserialize_*` entry point accepts only the value kind that
//! naturally carries it: an integer target takes a `Long`, a float target
//! takes a `Double`, a string target takes a `String`. Anything else is a
//! [`SurrealError::ConversionError`] naming the kind that was found.

use std::fmt;

use serde::de::value::{SeqDeserializer, StringDeserializer};
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use surrealkit_native::ValueKind;

use crate::array::Array;
use crate::error::SurrealError;
use crate::iterator::{EntryIterator, ValueIterator};
use crate::object::Object;
use crate::value::{geo_json, Value};

#[derive(Debug)]
pub(crate) enum DeError {
    /// Kind mismatch or boundary failure, passed through as is.
    Surreal(SurrealError),
    /// Raised by the target type's `Deserialize` impl.
    Custom(String),
}

impl fmt::Display for DeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surreal(err) => fmt::Display::fmt(err, f),
            Self::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for DeError {}

impl de::Error for DeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

impl From<SurrealError> for DeError {
    fn from(err: SurrealError) -> Self {
        Self::Surreal(err)
    }
}

fn mismatch(kind: ValueKind, target: &str) -> DeError {
    DeError::Surreal(SurrealError::conversion(kind, target))
}

fn foreign(err: serde_json::Error) -> DeError {
    DeError::Custom(err.to_string())
}

/// Deserializer over one owned [`Value`].
pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) const fn new(value: Value) -> Self {
        Self { value }
    }
}

macro_rules! integer {
    ($($method:ident => $ty:ident, $visit:ident;)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
            match self.value {
                Value::Long(v) => match $ty::try_from(v) {
                    Ok(n) => visitor.$visit(n),
                    Err(_) => Err(mismatch(ValueKind::Long, stringify!($ty))),
                },
                other => Err(mismatch(other.kind(), stringify!($ty))),
            }
        }
    )*};
}

fn visit_array<'de, V: Visitor<'de>>(array: Array, visitor: V) -> Result<V::Value, DeError> {
    let len = array.len()?;
    let mut access = ArrayAccess {
        cursor: array.iter()?,
        consumed: 0,
        _array: array,
    };
    let out = visitor.visit_seq(&mut access)?;
    if access.consumed < len {
        return Err(de::Error::invalid_length(len, &"fewer elements in array"));
    }
    Ok(out)
}

fn visit_object<'de, V: Visitor<'de>>(object: Object, visitor: V) -> Result<V::Value, DeError> {
    let cursor = object.iter()?;
    visitor.visit_map(ObjectAccess {
        cursor,
        pending: None,
        _object: object,
    })
}

impl<'de> Deserializer<'de> for ValueDeserializer {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::None | Value::Null => visitor.visit_unit(),
            Value::Bool(v) => visitor.visit_bool(v),
            Value::Long(v) => visitor.visit_i64(v),
            Value::Double(v) => visitor.visit_f64(v),
            Value::Decimal(v) | Value::String(v) => visitor.visit_string(v),
            Value::Uuid(v) => visitor.visit_string(v.to_string()),
            Value::Duration(v) => visitor.visit_string(format!("{v:?}")),
            Value::Bytes(v) => visitor.visit_byte_buf(v),
            Value::Geometry(v) => geo_json(&v).deserialize_any(visitor).map_err(foreign),
            Value::Thing(v) => visitor.visit_string(v.render()?),
            Value::Array(v) => visit_array(v, visitor),
            Value::Object(v) => visit_object(v, visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::Bool(v) => visitor.visit_bool(v),
            other => Err(mismatch(other.kind(), "bool")),
        }
    }

    integer! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::Long(v) => visitor.visit_i64(v),
            other => Err(mismatch(other.kind(), "i64")),
        }
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::Double(v) => visitor.visit_f64(v),
            other => Err(mismatch(other.kind(), "f32")),
        }
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::Double(v) => visitor.visit_f64(v),
            other => Err(mismatch(other.kind(), "f64")),
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::String(v) => {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(mismatch(ValueKind::String, "char")),
                }
            }
            other => Err(mismatch(other.kind(), "char")),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::String(v) => visitor.visit_string(v),
            other => Err(mismatch(other.kind(), "string")),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::Bytes(v) => visitor.visit_byte_buf(v),
            other => Err(mismatch(other.kind(), "bytes")),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::None | Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::None | Value::Null => visitor.visit_unit(),
            other => Err(mismatch(other.kind(), "unit")),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        match self.value {
            Value::None | Value::Null => visitor.visit_unit(),
            other => Err(mismatch(other.kind(), name)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::Array(v) => visit_array(v, visitor),
            Value::Bytes(v) => SeqDeserializer::<_, DeError>::new(v.into_iter()).deserialize_any(visitor),
            other => Err(mismatch(other.kind(), "sequence")),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            Value::Object(v) => visit_object(v, visitor),
            Value::Geometry(v) => geo_json(&v).deserialize_map(visitor).map_err(foreign),
            other => Err(mismatch(other.kind(), "map")),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        match self.value {
            Value::Object(v) => visit_object(v, visitor),
            Value::Geometry(v) => geo_json(&v)
                .deserialize_struct(name, fields, visitor)
                .map_err(foreign),
            // std's Duration reads itself as (secs, nanos).
            Value::Duration(v) if name == "Duration" => {
                SeqDeserializer::<_, DeError>::new([v.as_secs(), u64::from(v.subsec_nanos())].into_iter())
                    .deserialize_any(visitor)
            }
            other => Err(mismatch(other.kind(), name)),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        match self.value {
            Value::String(v) => visitor.visit_enum(StringDeserializer::<DeError>::new(v)),
            Value::Object(object) => {
                if object.len()? != 1 {
                    return Err(mismatch(ValueKind::Object, name));
                }
                let (variant, value) = object
                    .iter()?
                    .next()
                    .transpose()?
                    .ok_or_else(|| mismatch(ValueKind::Object, name))?
                    .into_parts();
                visitor.visit_enum(Variant { variant, value })
            }
            other => Err(mismatch(other.kind(), name)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        visitor.visit_unit()
    }
}

struct ArrayAccess {
    cursor: ValueIterator,
    consumed: usize,
    _array: Array,
}

impl<'de> SeqAccess<'de> for ArrayAccess {
    type Error = DeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DeError> {
        match self.cursor.next() {
            None => Ok(None),
            Some(item) => {
                self.consumed += 1;
                seed.deserialize(ValueDeserializer::new(item?)).map(Some)
            }
        }
    }
}

struct ObjectAccess {
    cursor: EntryIterator,
    pending: Option<Value>,
    _object: Object,
}

impl<'de> MapAccess<'de> for ObjectAccess {
    type Error = DeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DeError> {
        match self.cursor.next() {
            None => Ok(None),
            Some(entry) => {
                let (key, value) = entry?.into_parts();
                self.pending = Some(value);
                seed.deserialize(StringDeserializer::<DeError>::new(key))
                    .map(Some)
            }
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DeError> {
        let value = self
            .pending
            .take()
            .ok_or_else(|| DeError::Custom("value requested before its key".to_string()))?;
        seed.deserialize(ValueDeserializer::new(value))
    }
}

/// `{ variant: value }`, the externally tagged enum shape.
struct Variant {
    variant: String,
    value: Value,
}

impl<'de> EnumAccess<'de> for Variant {
    type Error = DeError;
    type Variant = ValueDeserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, ValueDeserializer), DeError> {
        let variant = seed.deserialize(StringDeserializer::<DeError>::new(self.variant))?;
        Ok((variant, ValueDeserializer::new(self.value)))
    }
}

impl<'de> VariantAccess<'de> for ValueDeserializer {
    type Error = DeError;

    fn unit_variant(self) -> Result<(), DeError> {
        de::Deserialize::deserialize(self)
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, DeError> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_tuple(len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        self.deserialize_struct("", fields, visitor)
    }
}
