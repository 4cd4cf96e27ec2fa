//! The handle-owning resource wrapper every engine-backed type builds on.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use surrealkit_native::{Engine, EngineResult, Handle, HandleKind};

use crate::error::{SurrealError, SurrealResult};

/// Owns exactly one engine handle.
///
/// The raw handle lives in an atomic so that `release` can zero it exactly
/// once, even when racing another `release` on the same wrapper. Every
/// accessor reads it through [`Native::handle`], which fails with
/// [`SurrealError::UseAfterRelease`] once it is zero.
///
/// A read racing a release on another thread may still reach the engine
/// with the old handle; the engine's generation check turns that into
/// [`SurrealError::StaleHandle`].
pub(crate) struct Native {
    engine: Arc<dyn Engine>,
    kind: HandleKind,
    raw: AtomicU64,
}

impl Native {
    pub(crate) fn new(engine: Arc<dyn Engine>, kind: HandleKind, handle: Handle) -> Self {
        Self {
            engine,
            kind,
            raw: AtomicU64::new(handle.to_raw()),
        }
    }

    pub(crate) const fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// The live handle, or `UseAfterRelease` naming `operation`.
    pub(crate) fn handle(&self, operation: &str) -> SurrealResult<Handle> {
        Handle::from_raw(self.raw.load(Ordering::Acquire)).ok_or_else(|| {
            SurrealError::UseAfterRelease {
                kind: self.kind,
                operation: operation.to_string(),
            }
        })
    }

    /// One boundary round trip on the held handle.
    pub(crate) fn call<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&dyn Engine, Handle) -> EngineResult<T>,
    ) -> SurrealResult<T> {
        let handle = self.handle(operation)?;
        f(self.engine.as_ref(), handle)
            .map_err(|err| SurrealError::from_engine(err, self.kind, operation))
    }

    pub(crate) fn is_released(&self) -> bool {
        self.raw.load(Ordering::Acquire) == 0
    }

    /// Releases the handle. Returns `true` only on the call that released.
    pub(crate) fn release(&self) -> bool {
        let Some(handle) = Handle::from_raw(self.raw.swap(0, Ordering::AcqRel)) else {
            return false;
        };
        if let Err(err) = self.engine.release(handle) {
            log::warn!("engine refused to release {} {handle}: {err}", self.kind);
        }
        true
    }
}

impl Drop for Native {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Handle::from_raw(self.raw.load(Ordering::Relaxed)) {
            Some(handle) => write!(f, "{}({handle:?})", self.kind),
            None => write!(f, "{}(released)", self.kind),
        }
    }
}
