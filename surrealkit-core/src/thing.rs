use std::fmt;
use std::sync::Arc;

use surrealkit_native::{Engine, Handle, HandleKind, RecordKey};

use crate::error::SurrealResult;
use crate::native::Native;

/// A record identifier (`table:key`). Carries no record data.
#[derive(Debug)]
pub struct Thing {
    native: Native,
}

impl Thing {
    /// Takes ownership of a record identifier handle issued by `engine`.
    #[must_use]
    pub fn adopt(engine: Arc<dyn Engine>, handle: Handle) -> Self {
        Self {
            native: Native::new(engine, HandleKind::Thing, handle),
        }
    }

    /// Table part.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn table(&self) -> SurrealResult<String> {
        self.native.call("table", |engine, h| engine.thing_table(h))
    }

    /// Key part.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn key(&self) -> SurrealResult<RecordKey> {
        self.native.call("key", |engine, h| engine.thing_key(h))
    }

    /// `table:key` rendering produced by the engine.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn render(&self) -> SurrealResult<String> {
        self.native.call("to_string", |engine, h| engine.thing_render(h))
    }

    /// Releases the identifier. Later calls are no-ops returning `false`.
    pub fn release(&self) -> bool {
        self.native.release()
    }

    /// Whether [`release`](Self::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.native.is_released()
    }
}

impl fmt::Display for Thing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use surrealkit_native::MemoryEngine;

    use super::*;
    use crate::error::SurrealError;

    #[test]
    fn test_parts_and_display() {
        let engine = Arc::new(MemoryEngine::new());
        let handle = engine
            .alloc_thing("person", RecordKey::String("tobie".into()))
            .expect("alloc");
        let thing = Thing::adopt(engine, handle);

        assert_eq!(thing.table().expect("table"), "person");
        assert_eq!(thing.key().expect("key"), RecordKey::String("tobie".into()));
        assert_eq!(thing.to_string(), "person:tobie");

        assert!(!thing.is_released());
        assert!(thing.release());
        assert!(thing.is_released());
        assert!(!thing.release());
        assert!(matches!(
            thing.table(),
            Err(SurrealError::UseAfterRelease { kind: HandleKind::Thing, .. })
        ));
    }
}
