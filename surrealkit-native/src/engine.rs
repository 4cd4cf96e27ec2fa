//! The boundary call surface between host wrappers and the native engine.
//!
//! Every host-side wrapper operation maps to exactly one [`Engine`] method,
//! passing the owning [`Handle`] and getting back a fresh handle, a plain
//! value, or an [`EngineError`]. Nothing here caches engine state: each call
//! is a round trip.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::arena::ArenaError;
use crate::geometry::Geometry;
use crate::handle::{Handle, HandleKind};

/// Tag of a value produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    /// Absent value.
    None,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Double,
    /// Arbitrary-precision decimal, carried as its canonical text.
    Decimal,
    /// UTF-8 string.
    String,
    /// UUID.
    Uuid,
    /// Duration.
    Duration,
    /// Raw bytes.
    Bytes,
    /// Geospatial value.
    Geometry,
    /// Record identifier.
    Thing,
    /// Ordered sequence of values.
    Array,
    /// String-keyed map of values.
    Object,
}

/// Key part of a record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Integer key.
    Number(i64),
    /// String key.
    String(String),
    /// UUID key.
    Uuid(uuid::Uuid),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => {
                if is_plain_ident(s) {
                    f.write_str(s)
                } else {
                    write!(f, "⟨{}⟩", s.replace('⟩', "\\⟩"))
                }
            }
            Self::Uuid(u) => write!(f, "u'{u}'"),
        }
    }
}

/// Returns `true` if `s` can be written as a record key without brackets.
pub(crate) fn is_plain_ident(s: &str) -> bool {
    !s.is_empty()
        && !s.bytes().all(|b| b.is_ascii_digit())
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A value as it crosses the boundary.
///
/// Scalars are copied out. Compound kinds and records carry a *fresh*
/// handle that the receiver owns and must release.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
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
    /// Decimal text.
    Decimal(String),
    /// UTF-8 string.
    String(String),
    /// UUID.
    Uuid(uuid::Uuid),
    /// Duration.
    Duration(Duration),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Geospatial value.
    Geometry(Geometry),
    /// Handle to a record identifier.
    Thing(Handle),
    /// Handle to an array.
    Array(Handle),
    /// Handle to an object.
    Object(Handle),
}

impl RawValue {
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

    /// The handle owned by this value, if it wraps an engine object.
    #[must_use]
    pub const fn handle(&self) -> Option<(HandleKind, Handle)> {
        match self {
            Self::Thing(h) => Some((HandleKind::Thing, *h)),
            Self::Array(h) => Some((HandleKind::Array, *h)),
            Self::Object(h) => Some((HandleKind::Object, *h)),
            _ => None,
        }
    }
}

/// One key/value pair produced by an entry cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    /// Map key.
    pub key: String,
    /// Map value.
    pub value: RawValue,
}

/// Errors raised at the boundary by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The handle was released or never issued by this engine.
    #[error("stale handle {0}")]
    Stale(Handle),
    /// The handle addresses a different kind of object.
    #[error("handle {handle} is a {found}, expected {expected}")]
    WrongKind {
        /// Handle passed in.
        handle: Handle,
        /// Kind the operation needs.
        expected: HandleKind,
        /// Kind the handle actually addresses.
        found: HandleKind,
    },
    /// A cursor operation was given a handle that is not a cursor.
    #[error("handle {handle} is a {found}, expected a cursor")]
    NotACursor {
        /// Handle passed in.
        handle: Handle,
        /// Kind the handle actually addresses.
        found: HandleKind,
    },
    /// Index outside `0..len`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: i64,
        /// Length at the time of the call.
        len: usize,
    },
    /// The cursor has no more elements.
    #[error("no more elements")]
    Exhausted,
    /// The collection behind the cursor changed during traversal.
    #[error("collection modified during iteration")]
    Invalidated,
    /// The engine cannot allocate another handle.
    #[error("handle space exhausted")]
    OutOfHandles,
    /// Any other failure reported by the engine.
    #[error("native engine error: {0}")]
    Native(String),
}

impl From<ArenaError> for EngineError {
    fn from(err: ArenaError) -> Self {
        match err {
            ArenaError::Stale(handle) => Self::Stale(handle),
            ArenaError::Full => Self::OutOfHandles,
        }
    }
}

/// Result type for boundary calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// The native engine as seen from the host.
///
/// Implementations own every object addressed by the handles they issue.
/// Handles are only meaningful to the engine that issued them.
pub trait Engine: Send + Sync {
    /// Creates a new engine instance.
    fn instance_new(&self) -> EngineResult<Handle>;

    /// Destroys the object behind `handle`.
    ///
    /// Releasing a handle twice must fail with [`EngineError::Stale`] rather
    /// than touching freed memory.
    fn release(&self, handle: Handle) -> EngineResult<()>;

    /// Number of elements in an array.
    fn array_len(&self, array: Handle) -> EngineResult<usize>;

    /// Element at `index`, which must satisfy `0 <= index < len`.
    fn array_get(&self, array: Handle, index: i64) -> EngineResult<RawValue>;

    /// Diagnostic rendering of an array.
    fn array_render(&self, array: Handle, pretty: bool) -> EngineResult<String>;

    /// Opens a value cursor over an array.
    fn array_cursor(&self, array: Handle) -> EngineResult<Handle>;

    /// Number of entries in an object.
    fn object_len(&self, object: Handle) -> EngineResult<usize>;

    /// Value stored under `key`, if any.
    fn object_get(&self, object: Handle, key: &str) -> EngineResult<Option<RawValue>>;

    /// Diagnostic rendering of an object.
    fn object_render(&self, object: Handle, pretty: bool) -> EngineResult<String>;

    /// Opens an entry cursor over an object.
    fn object_cursor(&self, object: Handle) -> EngineResult<Handle>;

    /// Whether the cursor has another element. Never advances.
    fn cursor_has_next(&self, cursor: Handle) -> EngineResult<bool>;

    /// Produces the next value of a value cursor and advances.
    fn cursor_next_value(&self, cursor: Handle) -> EngineResult<RawValue>;

    /// Produces the next entry of an entry cursor and advances.
    fn cursor_next_entry(&self, cursor: Handle) -> EngineResult<RawEntry>;

    /// Table part of a record identifier.
    fn thing_table(&self, thing: Handle) -> EngineResult<String>;

    /// Key part of a record identifier.
    fn thing_key(&self, thing: Handle) -> EngineResult<RecordKey>;

    /// Diagnostic rendering of a record identifier.
    fn thing_render(&self, thing: Handle) -> EngineResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_rendering() {
        assert_eq!(RecordKey::Number(42).to_string(), "42");
        assert_eq!(RecordKey::String("tobie".into()).to_string(), "tobie");
        assert_eq!(RecordKey::String("a b".into()).to_string(), "⟨a b⟩");
        assert_eq!(RecordKey::String("123".into()).to_string(), "⟨123⟩");
    }

    #[test]
    fn test_raw_value_handle_only_for_compound_kinds() {
        let handle = Handle::new(0, 1);
        assert_eq!(RawValue::Long(1).handle(), None);
        assert_eq!(
            RawValue::Array(handle).handle(),
            Some((HandleKind::Array, handle))
        );
        assert_eq!(RawValue::Thing(handle).kind(), ValueKind::Thing);
    }
}
