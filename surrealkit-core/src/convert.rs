//! Typed conversion of engine values.
//!
//! Conversions are exact: a kind that doesn't match the target, or a number
//! that doesn't fit it, is a [`SurrealError::ConversionError`]. Nothing is
//! coerced or truncated.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use surrealkit_native::Geometry;
use uuid::Uuid;

use crate::array::Array;
use crate::de::{DeError, ValueDeserializer};
use crate::error::{SurrealError, SurrealResult};
use crate::iterator::ValueCursor;
use crate::object::Object;
use crate::thing::Thing;
use crate::value::Value;

/// Conversion from an engine [`Value`].
pub trait FromValue: Sized {
    /// Converts `value`, consuming it.
    ///
    /// # Errors
    ///
    /// [`SurrealError::ConversionError`] naming the value's kind and the
    /// target type.
    fn from_value(value: Value) -> SurrealResult<Self>;
}

fn mismatch<T>(value: &Value) -> SurrealError {
    SurrealError::conversion(value.kind(), type_name::<T>())
}

impl FromValue for Value {
    fn from_value(value: Value) -> SurrealResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value.as_long().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value
            .as_long()
            .and_then(|v| Self::try_from(v).ok())
            .ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value
            .as_long()
            .and_then(|v| Self::try_from(v).ok())
            .ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value.as_double().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> SurrealResult<Self> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value.as_uuid().copied().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for Duration {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value.as_duration().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> SurrealResult<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Geometry {
    fn from_value(value: Value) -> SurrealResult<Self> {
        match value {
            Value::Geometry(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Thing {
    fn from_value(value: Value) -> SurrealResult<Self> {
        match value {
            Value::Thing(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Array {
    fn from_value(value: Value) -> SurrealResult<Self> {
        match value {
            Value::Array(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Object {
    fn from_value(value: Value) -> SurrealResult<Self> {
        match value {
            Value::Object(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

/// `NONE` and `NULL` become `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> SurrealResult<Self> {
        match value {
            Value::None | Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> SurrealResult<Self> {
        let array = match value {
            Value::Array(array) => array,
            other => return Err(mismatch::<Self>(&other)),
        };
        array.typed_iter::<T>()?.collect()
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> SurrealResult<Self> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(mismatch::<Self>(&other)),
        };
        object
            .iter()?
            .map(|entry| -> SurrealResult<(String, T)> {
                let (key, value) = entry?.into_parts();
                Ok((key, T::from_value(value)?))
            })
            .collect()
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: Value) -> SurrealResult<Self> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(mismatch::<Self>(&other)),
        };
        object
            .iter()?
            .map(|entry| -> SurrealResult<(String, T)> {
                let (key, value) = entry?.into_parts();
                Ok((key, T::from_value(value)?))
            })
            .collect()
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> SurrealResult<Self> {
        value.to_json()
    }
}

/// Deserializes into any `serde` type, as strictly as [`FromValue`].
///
/// A field is filled only from the kind that carries it: a `Long` never
/// fills an `f64`, and a decimal or record id never fills a `String`.
/// Errors raised by the target's own `Deserialize` impl, such as a missing
/// field, surface as a `ConversionError` naming the type and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwraps the converted value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> FromValue for Json<T> {
    fn from_value(value: Value) -> SurrealResult<Self> {
        let kind = value.kind();
        T::deserialize(ValueDeserializer::new(value))
            .map(Json)
            .map_err(|err| match err {
                DeError::Surreal(err) => err,
                DeError::Custom(msg) => {
                    SurrealError::conversion(kind, format!("{} ({msg})", type_name::<T>()))
                }
            })
    }
}

/// Cursor adapter converting every produced value into `T`.
pub struct TypedIterator<T, C> {
    cursor: C,
    fused: bool,
    _target: PhantomData<fn() -> T>,
}

impl<T: FromValue, C: ValueCursor> TypedIterator<T, C> {
    /// Wraps `cursor`.
    #[must_use]
    pub const fn new(cursor: C) -> Self {
        Self {
            cursor,
            fused: false,
            _target: PhantomData,
        }
    }

    /// See [`ValueCursor::has_next`].
    ///
    /// # Errors
    ///
    /// Whatever the wrapped cursor raises.
    pub fn has_next(&self) -> SurrealResult<bool> {
        self.cursor.has_next()
    }

    /// Pulls the next value and converts it.
    ///
    /// # Errors
    ///
    /// Whatever the wrapped cursor raises, or `ConversionError`.
    pub fn next_typed(&mut self) -> SurrealResult<T> {
        T::from_value(self.cursor.next_value()?)
    }

    /// Returns the wrapped cursor.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.cursor
    }
}

impl<T: FromValue, C: ValueCursor> Iterator for TypedIterator<T, C> {
    type Item = SurrealResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        let outcome = self.cursor.step()?.and_then(T::from_value);
        if outcome.is_err() {
            self.fused = true;
        }
        Some(outcome)
    }
}

impl<T: FromValue, C: ValueCursor> FusedIterator for TypedIterator<T, C> {}
