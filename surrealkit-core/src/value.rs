//! The tagged value model that flows out of every read.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use surrealkit_native::{Engine, Geometry, Point, Polygon, RawValue, ValueKind};
use uuid::Uuid;

use crate::array::Array;
use crate::convert::FromValue;
use crate::error::SurrealResult;
use crate::object::Object;
use crate::thing::Thing;

/// A value produced by the engine.
///
/// Compound kinds own a fresh engine handle, released when the value is
/// dropped.
#[derive(Debug)]
pub enum Value {
    /// Absent value.
    None,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// Decimal, as canonical text.
    Decimal(String),
    /// UTF-8 string.
    String(String),
    /// UUID.
    Uuid(Uuid),
    /// Duration.
    Duration(Duration),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Geospatial value.
    Geometry(Geometry),
    /// Record identifier.
    Thing(Thing),
    /// Array.
    Array(Array),
    /// Object.
    Object(Object),
}

impl Value {
    /// Takes ownership of a boundary value, wrapping any handle it carries.
    #[must_use]
    pub fn adopt(engine: &Arc<dyn Engine>, raw: RawValue) -> Self {
        match raw {
            RawValue::None => Self::None,
            RawValue::Null => Self::Null,
            RawValue::Bool(v) => Self::Bool(v),
            RawValue::Long(v) => Self::Long(v),
            RawValue::Double(v) => Self::Double(v),
            RawValue::Decimal(v) => Self::Decimal(v),
            RawValue::String(v) => Self::String(v),
            RawValue::Uuid(v) => Self::Uuid(v),
            RawValue::Duration(v) => Self::Duration(v),
            RawValue::Bytes(v) => Self::Bytes(v),
            RawValue::Geometry(v) => Self::Geometry(v),
            RawValue::Thing(h) => Self::Thing(Thing::adopt(Arc::clone(engine), h)),
            RawValue::Array(h) => Self::Array(Array::adopt(Arc::clone(engine), h)),
            RawValue::Object(h) => Self::Object(Object::adopt(Arc::clone(engine), h)),
        }
    }

    /// Tag of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::None => ValueKind::None,
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Long(_) => ValueKind::Long,
            Self::Double(_) => ValueKind::Double,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::String(_) => ValueKind::String,
            Self::Uuid(_) => ValueKind::Uuid,
            Self::Duration(_) => ValueKind::Duration,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Geometry(_) => ValueKind::Geometry,
            Self::Thing(_) => ValueKind::Thing,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Converts into `T` without coercion.
    ///
    /// # Errors
    ///
    /// [`SurrealError::ConversionError`](crate::SurrealError::ConversionError)
    /// when the kind doesn't match `T`.
    pub fn convert<T: FromValue>(self) -> SurrealResult<T> {
        T::from_value(self)
    }

    /// Whether this is `NONE`.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether this is `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a boolean.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Whether this is an integer.
    #[must_use]
    pub const fn is_long(&self) -> bool {
        matches!(self, Self::Long(_))
    }

    /// Whether this is a float.
    #[must_use]
    pub const fn is_double(&self) -> bool {
        matches!(self, Self::Double(_))
    }

    /// Whether this is a string.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Whether this is a record id.
    #[must_use]
    pub const fn is_thing(&self) -> bool {
        matches!(self, Self::Thing(_))
    }

    /// Whether this is an array.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Whether this is an object.
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Whether this is a geometry.
    #[must_use]
    pub const fn is_geometry(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }

    /// The boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer, if this is one. Floats are not narrowed.
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// The float, if this is one. Integers are not widened.
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Decimal text, if this is a decimal.
    #[must_use]
    pub fn as_decimal(&self) -> Option<&str> {
        match self {
            Self::Decimal(v) => Some(v),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// The UUID, if this is one.
    #[must_use]
    pub const fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(v) => Some(v),
            _ => None,
        }
    }

    /// The duration, if this is one.
    #[must_use]
    pub const fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(v) => Some(*v),
            _ => None,
        }
    }

    /// The bytes, if this is a byte value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// The geometry, if this is one.
    #[must_use]
    pub const fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            Self::Geometry(v) => Some(v),
            _ => None,
        }
    }

    /// The record id, if this is one.
    #[must_use]
    pub const fn as_thing(&self) -> Option<&Thing> {
        match self {
            Self::Thing(v) => Some(v),
            _ => None,
        }
    }

    /// The array, if this is one.
    #[must_use]
    pub const fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// The object, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Renders this value as JSON.
    ///
    /// Records and durations become strings, bytes become arrays of
    /// numbers, geometries become GeoJSON objects, and non-finite doubles
    /// become `null`. Containers are walked
    /// through the engine.
    ///
    /// # Errors
    ///
    /// Any boundary failure while walking a container.
    pub fn to_json(&self) -> SurrealResult<serde_json::Value> {
        use serde_json::Value as Json;

        Ok(match self {
            Self::None | Self::Null => Json::Null,
            Self::Bool(v) => Json::Bool(*v),
            Self::Long(v) => Json::from(*v),
            Self::Double(v) => serde_json::Number::from_f64(*v).map_or(Json::Null, Json::Number),
            Self::Decimal(v) | Self::String(v) => Json::String(v.clone()),
            Self::Uuid(v) => Json::String(v.to_string()),
            Self::Duration(v) => Json::String(format!("{v:?}")),
            Self::Bytes(v) => Json::Array(v.iter().map(|b| Json::from(*b)).collect()),
            Self::Geometry(v) => geo_json(v),
            Self::Thing(v) => Json::String(v.render()?),
            Self::Array(v) => {
                let mut items = Vec::with_capacity(v.len()?);
                for item in v.iter()? {
                    items.push(item?.to_json()?);
                }
                Json::Array(items)
            }
            Self::Object(v) => {
                let mut map = serde_json::Map::new();
                for entry in v.iter()? {
                    let (key, value) = entry?.into_parts();
                    map.insert(key, value.to_json()?);
                }
                Json::Object(map)
            }
        })
    }
}

fn json_number(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

fn position(p: &Point) -> serde_json::Value {
    serde_json::Value::Array(vec![json_number(p.x), json_number(p.y)])
}

fn ring(points: &[Point]) -> serde_json::Value {
    serde_json::Value::Array(points.iter().map(position).collect())
}

fn rings(polygon: &Polygon) -> serde_json::Value {
    serde_json::Value::Array(
        std::iter::once(&polygon.exterior)
            .chain(&polygon.interiors)
            .map(|r| ring(r))
            .collect(),
    )
}

/// GeoJSON geometry object.
pub(crate) fn geo_json(geometry: &Geometry) -> serde_json::Value {
    use serde_json::Value as Json;

    let coordinates = match geometry {
        Geometry::Point(p) => position(p),
        Geometry::Line(points) | Geometry::MultiPoint(points) => ring(points),
        Geometry::Polygon(polygon) => rings(polygon),
        Geometry::MultiLine(lines) => Json::Array(lines.iter().map(|l| ring(l)).collect()),
        Geometry::MultiPolygon(polygons) => Json::Array(polygons.iter().map(rings).collect()),
        Geometry::Collection(geometries) => {
            return serde_json::json!({
                "type": geometry.type_name(),
                "geometries": geometries.iter().map(geo_json).collect::<Vec<_>>(),
            });
        }
    };
    serde_json::json!({ "type": geometry.type_name(), "coordinates": coordinates })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NONE"),
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}f"),
            Self::Decimal(v) => write!(f, "{v}dec"),
            Self::String(v) => write!(f, "'{}'", v.replace('\\', "\\\\").replace('\'', "\\'")),
            Self::Uuid(v) => write!(f, "u'{v}'"),
            Self::Duration(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => {
                f.write_str("b\"")?;
                for byte in v {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("\"")
            }
            Self::Geometry(v) => fmt::Display::fmt(v, f),
            Self::Thing(v) => fmt::Display::fmt(v, f),
            Self::Array(v) => fmt::Display::fmt(v, f),
            Self::Object(v) => fmt::Display::fmt(v, f),
        }
    }
}
