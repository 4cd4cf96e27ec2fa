use surrealkit_native::loader::LoadError;
use surrealkit_native::{EngineError, HandleKind, ValueKind};
use thiserror::Error;

/// Error outputs from `SurrealKit`
#[derive(Debug, Clone, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum SurrealError {
    /// The wrapper's handle was already released locally
    #[error("use_after_release: {operation} on released {kind}")]
    UseAfterRelease {
        /// What the wrapper held.
        kind: HandleKind,
        /// The operation attempted.
        operation: String,
    },
    /// The engine no longer knows the handle
    #[error("stale_handle: {operation} on {kind} rejected by the engine")]
    StaleHandle {
        /// What the wrapper held.
        kind: HandleKind,
        /// The operation attempted.
        operation: String,
    },
    /// Index outside `0..len`
    #[error("index_out_of_range: {operation} on {kind}: index {index} for length {len}")]
    IndexOutOfRange {
        /// What the wrapper held.
        kind: HandleKind,
        /// The operation attempted.
        operation: String,
        /// Requested index, as the host passed it.
        index: i128,
        /// Length at the time of the call.
        len: usize,
    },
    /// A value couldn't be converted to the requested type without coercion
    #[error("conversion_error: cannot convert {source_kind} into {target}")]
    ConversionError {
        /// Kind of the value that was produced.
        source_kind: ValueKind,
        /// Requested target type.
        target: String,
    },
    /// The collection changed while it was being traversed
    #[error("iterator_invalidated: {operation} on {kind}: collection modified during iteration")]
    IteratorInvalidated {
        /// The cursor kind.
        kind: HandleKind,
        /// The operation attempted.
        operation: String,
    },
    /// The cursor has no more elements
    #[error("no_such_element: {operation} on exhausted {kind}")]
    NoSuchElement {
        /// The cursor kind.
        kind: HandleKind,
        /// The operation attempted.
        operation: String,
    },
    /// Any other failure raised by the engine at the boundary
    #[error("engine_error: {operation} on {kind}: {message}")]
    Engine {
        /// What the wrapper held.
        kind: HandleKind,
        /// The operation attempted.
        operation: String,
        /// Engine-provided details.
        message: String,
    },
    /// The native library couldn't be loaded
    #[error(transparent)]
    Bootstrap(#[from] LoadError),
}

/// Result type for host-side operations.
pub type SurrealResult<T> = Result<T, SurrealError>;

impl SurrealError {
    /// Maps a boundary failure, naming the wrapper type and the operation.
    pub(crate) fn from_engine(err: EngineError, kind: HandleKind, operation: &str) -> Self {
        match err {
            EngineError::Stale(_) => Self::StaleHandle {
                kind,
                operation: operation.to_string(),
            },
            EngineError::IndexOutOfRange { index, len } => Self::IndexOutOfRange {
                kind,
                operation: operation.to_string(),
                index: i128::from(index),
                len,
            },
            EngineError::Exhausted => Self::NoSuchElement {
                kind,
                operation: operation.to_string(),
            },
            EngineError::Invalidated => Self::IteratorInvalidated {
                kind,
                operation: operation.to_string(),
            },
            other @ (EngineError::WrongKind { .. }
            | EngineError::NotACursor { .. }
            | EngineError::OutOfHandles
            | EngineError::Native(_)) => Self::Engine {
                kind,
                operation: operation.to_string(),
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn conversion(source_kind: ValueKind, target: impl Into<String>) -> Self {
        Self::ConversionError {
            source_kind,
            target: target.into(),
        }
    }
}
