use std::sync::Arc;

use surrealkit_native::{Engine, Handle, HandleKind, MemoryEngine, RawValue};

use crate::array::Array;
use crate::error::{SurrealError, SurrealResult};
use crate::native::Native;
use crate::object::Object;
use crate::value::Value;

/// An engine instance.
///
/// Closing the instance releases its handle; wrappers adopted through it
/// keep the engine alive and stay valid until released themselves.
#[derive(Debug)]
pub struct Surreal {
    native: Native,
}

impl Surreal {
    /// Allocates a new instance on `engine`.
    ///
    /// # Errors
    ///
    /// When the engine can't allocate the instance.
    pub fn new(engine: Arc<dyn Engine>) -> SurrealResult<Self> {
        let handle = engine
            .instance_new()
            .map_err(|err| SurrealError::from_engine(err, HandleKind::Instance, "new"))?;
        log::debug!("opened instance {handle}");
        Ok(Self {
            native: Native::new(engine, HandleKind::Instance, handle),
        })
    }

    /// Instance over a fresh in-process [`MemoryEngine`].
    ///
    /// # Errors
    ///
    /// See [`Surreal::new`].
    pub fn embedded() -> SurrealResult<Self> {
        Self::new(Arc::new(MemoryEngine::new()))
    }

    /// The engine behind this instance.
    #[must_use]
    pub const fn engine(&self) -> &Arc<dyn Engine> {
        self.native.engine()
    }

    /// Wraps an array handle issued by this instance's engine.
    #[must_use]
    pub fn adopt_array(&self, handle: Handle) -> Array {
        Array::adopt(Arc::clone(self.engine()), handle)
    }

    /// Wraps an object handle issued by this instance's engine.
    #[must_use]
    pub fn adopt_object(&self, handle: Handle) -> Object {
        Object::adopt(Arc::clone(self.engine()), handle)
    }

    /// Wraps a boundary value produced by this instance's engine.
    #[must_use]
    pub fn adopt_value(&self, raw: RawValue) -> Value {
        Value::adopt(self.engine(), raw)
    }

    /// Closes the instance. Later calls are no-ops returning `false`.
    pub fn close(&self) -> bool {
        let closed = self.native.release();
        if closed {
            log::debug!("closed instance");
        }
        closed
    }

    /// Whether [`Surreal::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.native.is_released()
    }
}

#[cfg(test)]
mod tests {
    use surrealkit_native::NativeValue;

    use super::*;

    #[test]
    fn test_close_is_idempotent() {
        let engine = Arc::new(MemoryEngine::new());
        let db = Surreal::new(engine.clone()).expect("instance");
        assert_eq!(engine.stats().live, 1);

        assert!(db.close());
        assert!(!db.close());
        assert!(db.is_closed());
        assert_eq!(engine.stats().live, 0);
        assert_eq!(engine.stats().rejected_releases, 0);
    }

    #[test]
    fn test_adopted_wrappers_outlive_the_instance() {
        let engine = Arc::new(MemoryEngine::new());
        let db = Surreal::new(engine.clone()).expect("instance");
        let handle = engine
            .alloc_array(vec![NativeValue::Long(5)])
            .expect("alloc");
        let array = db.adopt_array(handle);
        drop(db);

        assert_eq!(array.get(0).expect("get").as_long(), Some(5));
    }
}
