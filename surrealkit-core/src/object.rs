use std::fmt;
use std::sync::Arc;

use surrealkit_native::{Engine, Handle, HandleKind};

use crate::error::SurrealResult;
use crate::iterator::{EntryIterator, SynchronizedEntryIterator};
use crate::native::Native;
use crate::value::Value;

/// An engine-owned map from string keys to values.
#[derive(Debug)]
pub struct Object {
    native: Native,
}

impl Object {
    /// Takes ownership of an object handle issued by `engine`.
    #[must_use]
    pub fn adopt(engine: Arc<dyn Engine>, handle: Handle) -> Self {
        Self {
            native: Native::new(engine, HandleKind::Object, handle),
        }
    }

    /// Number of entries.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn len(&self) -> SurrealResult<usize> {
        self.native.call("len", |engine, h| engine.object_len(h))
    }

    /// Whether the object has no entries.
    ///
    /// # Errors
    ///
    /// See [`Object::len`].
    pub fn is_empty(&self) -> SurrealResult<bool> {
        self.len().map(|len| len == 0)
    }

    /// Value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn get(&self, key: &str) -> SurrealResult<Option<Value>> {
        let raw = self
            .native
            .call("get", |engine, h| engine.object_get(h, key))?;
        Ok(raw.map(|raw| Value::adopt(self.native.engine(), raw)))
    }

    /// Compact rendering produced by the engine.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn render(&self) -> SurrealResult<String> {
        self.native
            .call("to_string", |engine, h| engine.object_render(h, false))
    }

    /// Indented rendering produced by the engine.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn to_pretty_string(&self) -> SurrealResult<String> {
        self.native
            .call("to_pretty_string", |engine, h| engine.object_render(h, true))
    }

    /// Entry cursor for traversal from a single thread.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    #[allow(clippy::iter_not_returning_iterator)]
    pub fn iter(&self) -> SurrealResult<EntryIterator> {
        let cursor = self
            .native
            .call("iter", |engine, h| engine.object_cursor(h))?;
        Ok(EntryIterator::adopt(Arc::clone(self.native.engine()), cursor))
    }

    /// Entry cursor that may be drained from several threads at once.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn synchronized_iter(&self) -> SurrealResult<SynchronizedEntryIterator> {
        let cursor = self
            .native
            .call("synchronized_iter", |engine, h| engine.object_cursor(h))?;
        Ok(SynchronizedEntryIterator::adopt(
            Arc::clone(self.native.engine()),
            cursor,
        ))
    }

    /// Releases the engine object. Later calls are no-ops returning `false`.
    pub fn release(&self) -> bool {
        self.native.release()
    }

    /// Whether [`Object::release`] has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.native.is_released()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

/// One key/value pair read from an object.
#[derive(Debug)]
pub struct Entry {
    key: String,
    value: Value,
}

impl Entry {
    pub(crate) const fn new(key: String, value: Value) -> Self {
        Self { key, value }
    }

    /// Key of the entry.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value stored under [`key`](Self::key).
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Splits into key and value, keeping ownership of any handle.
    #[must_use]
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use surrealkit_native::{MemoryEngine, NativeValue};

    use super::*;

    fn person() -> (Arc<MemoryEngine>, Object) {
        let engine = Arc::new(MemoryEngine::new());
        let handle = engine
            .alloc_object([
                ("name", NativeValue::from("tobie")),
                ("age", NativeValue::Long(33)),
            ])
            .expect("alloc");
        (engine.clone(), Object::adopt(engine, handle))
    }

    #[test]
    fn test_get_present_and_missing_keys() {
        let (_engine, object) = person();
        assert_eq!(object.len().expect("len"), 2);
        assert_eq!(
            object.get("name").expect("get").and_then(|v| v.as_str().map(str::to_owned)),
            Some("tobie".to_string())
        );
        assert!(object.get("email").expect("get").is_none());
    }

    #[test]
    fn test_render() {
        let (_engine, object) = person();
        assert_eq!(object.to_string(), "{ age: 33, name: 'tobie' }");
    }

    #[test]
    fn test_entries_come_out_in_key_order() {
        let (_engine, object) = person();
        let keys: Vec<String> = object
            .iter()
            .expect("iter")
            .map(|entry| entry.expect("entry").into_parts().0)
            .collect();
        assert_eq!(keys, ["age", "name"]);
    }
}
