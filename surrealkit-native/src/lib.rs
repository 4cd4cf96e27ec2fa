//! Engine side of the SurrealKit boundary.
//!
//! Everything the native engine owns is addressed from the host through an
//! opaque [`Handle`]. This crate provides:
//!
//! * [`Handle`] and [`HandleArena`]: generation-checked handles, so a
//!   released or forged handle is rejected instead of dereferenced.
//! * [`Engine`]: the boundary call surface, one method per host operation.
//! * [`MemoryEngine`]: an in-process engine over shared, versioned
//!   containers.
//! * [`loader`]: platform resolution, bundle extraction and dynamic loading
//!   of the native library.
//!
//! The `ffi` module is the **only** file that contains `unsafe` code or C
//! types.

mod ffi;

mod arena;
mod engine;
mod geometry;
mod handle;
pub mod loader;
mod memory;

pub use arena::{ArenaError, HandleArena};
pub use engine::{Engine, EngineError, EngineResult, RawEntry, RawValue, RecordKey, ValueKind};
pub use geometry::{Geometry, Point, Polygon};
pub use handle::{Handle, HandleKind};
pub use memory::{EngineStats, MemoryEngine, NativeValue};
