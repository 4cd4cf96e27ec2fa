//! Host side of the `SurrealKit` boundary.
//!
//! Every engine-owned object is reached through a wrapper that owns exactly
//! one handle: [`Array`], [`Object`], [`Thing`], the cursors in this crate
//! and the [`Surreal`] instance itself. Wrappers release their handle on
//! drop or on an explicit `release`, whichever comes first; after that,
//! every accessor fails with [`SurrealError::UseAfterRelease`] without
//! reaching the engine.
//!
//! ```rust
//! use std::sync::Arc;
//! use surrealkit_core::{Array, MemoryEngine, NativeValue};
//!
//! let engine = Arc::new(MemoryEngine::new());
//! let handle = engine
//!     .alloc_array(vec![NativeValue::Long(1), NativeValue::Long(2)])
//!     .unwrap();
//! let array = Array::adopt(engine, handle);
//!
//! let sum: i64 = array
//!     .typed_iter::<i64>()
//!     .unwrap()
//!     .map(Result::unwrap)
//!     .sum();
//! assert_eq!(sum, 3);
//! ```

mod array;
pub use array::Array;

mod bootstrap;
pub use bootstrap::*;

mod convert;
pub use convert::{FromValue, Json, TypedIterator};

mod de;

mod error;
pub use error::{SurrealError, SurrealResult};

mod iterator;
pub use iterator::{
    EntryIterator, SynchronizedEntryIterator, SynchronizedValueIterator, ValueCursor,
    ValueIterator,
};

pub mod logger;

mod object;
pub use object::{Entry, Object};

mod surreal;
pub use surreal::Surreal;

mod thing;
pub use thing::Thing;

mod value;
pub use value::Value;

// private modules
mod native;

pub use surrealkit_native::{
    Engine, EngineStats, Geometry, Handle, HandleKind, MemoryEngine, NativeValue, Point, Polygon,
    RawEntry, RawValue, RecordKey, ValueKind,
};

uniffi::setup_scaffolding!("surrealkit_core");
