use std::fmt;
use std::sync::Arc;

use surrealkit_native::{Engine, Handle, HandleKind};

use crate::convert::{FromValue, TypedIterator};
use crate::error::{SurrealError, SurrealResult};
use crate::iterator::{SynchronizedValueIterator, ValueIterator};
use crate::native::Native;
use crate::value::Value;

/// An engine-owned, 0-indexed sequence of values.
///
/// Nothing is cached on the host: `len`, `get` and rendering are each one
/// round trip, so they observe the engine's current contents.
#[derive(Debug)]
pub struct Array {
    native: Native,
}

impl Array {
    /// Takes ownership of an array handle issued by `engine`.
    #[must_use]
    pub fn adopt(engine: Arc<dyn Engine>, handle: Handle) -> Self {
        Self {
            native: Native::new(engine, HandleKind::Array, handle),
        }
    }

    /// Number of elements.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn len(&self) -> SurrealResult<usize> {
        self.native.call("len", |engine, h| engine.array_len(h))
    }

    /// Whether the array has no elements.
    ///
    /// # Errors
    ///
    /// See [`Array::len`].
    pub fn is_empty(&self) -> SurrealResult<bool> {
        self.len().map(|len| len == 0)
    }

    /// Element at `index`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` unless `index < len()`.
    pub fn get(&self, index: usize) -> SurrealResult<Value> {
        match i64::try_from(index) {
            Ok(index) => self.at(index),
            // Past anything the engine can address; report it as passed.
            Err(_) => Err(SurrealError::IndexOutOfRange {
                kind: HandleKind::Array,
                operation: "get".to_string(),
                index: i128::try_from(index).unwrap_or(i128::MAX),
                len: self.len()?,
            }),
        }
    }

    /// Element at a signed index, as hosts with signed integers pass it.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` unless `0 <= index < len()`.
    pub fn at(&self, index: i64) -> SurrealResult<Value> {
        let raw = self
            .native
            .call("get", |engine, h| engine.array_get(h, index))?;
        Ok(Value::adopt(self.native.engine(), raw))
    }

    /// Compact rendering produced by the engine.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn render(&self) -> SurrealResult<String> {
        self.native
            .call("to_string", |engine, h| engine.array_render(h, false))
    }

    /// Indented rendering produced by the engine.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn to_pretty_string(&self) -> SurrealResult<String> {
        self.native
            .call("to_pretty_string", |engine, h| engine.array_render(h, true))
    }

    /// Cursor for traversal from a single thread.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    #[allow(clippy::iter_not_returning_iterator)]
    pub fn iter(&self) -> SurrealResult<ValueIterator> {
        let cursor = self.native.call("iter", |engine, h| engine.array_cursor(h))?;
        Ok(ValueIterator::adopt(Arc::clone(self.native.engine()), cursor))
    }

    /// Cursor that may be drained from several threads at once.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn synchronized_iter(&self) -> SurrealResult<SynchronizedValueIterator> {
        let cursor = self
            .native
            .call("synchronized_iter", |engine, h| engine.array_cursor(h))?;
        Ok(SynchronizedValueIterator::adopt(
            Arc::clone(self.native.engine()),
            cursor,
        ))
    }

    /// Cursor converting every element into `T`.
    ///
    /// # Errors
    ///
    /// `UseAfterRelease` once released, or any boundary failure.
    pub fn typed_iter<T: FromValue>(&self) -> SurrealResult<TypedIterator<T, ValueIterator>> {
        self.iter().map(TypedIterator::new)
    }

    /// Releases the engine array. Later calls are no-ops returning `false`.
    pub fn release(&self) -> bool {
        self.native.release()
    }

    /// Whether [`Array::release`] has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.native.is_released()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use surrealkit_native::{MemoryEngine, NativeValue};

    use super::*;
    use crate::error::SurrealError;

    fn array_of(values: Vec<NativeValue>) -> (Arc<MemoryEngine>, Array) {
        let engine = Arc::new(MemoryEngine::new());
        let handle = engine.alloc_array(values).expect("alloc");
        (engine.clone(), Array::adopt(engine, handle))
    }

    #[test]
    fn test_len_get_and_render() {
        let (_engine, array) = array_of(vec![NativeValue::Long(1), NativeValue::from("a")]);
        assert_eq!(array.len().expect("len"), 2);
        assert!(!array.is_empty().expect("is_empty"));
        assert_eq!(array.get(1).expect("get").as_str(), Some("a"));
        assert_eq!(array.to_string(), "[1, 'a']");
        assert_eq!(array.to_pretty_string().expect("pretty"), "[\n\t1,\n\t'a'\n]");
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let (_engine, array) = array_of(vec![NativeValue::Long(1)]);
        assert!(matches!(
            array.get(1),
            Err(SurrealError::IndexOutOfRange { index: 1, len: 1, .. })
        ));
        assert!(matches!(
            array.at(-1),
            Err(SurrealError::IndexOutOfRange { index: -1, len: 1, .. })
        ));
        let err = array.get(5).expect_err("past the end");
        assert_eq!(
            err.to_string(),
            "index_out_of_range: get on array: index 5 for length 1"
        );
    }

    #[test]
    fn test_unaddressable_index_is_reported_as_passed() {
        let (_engine, array) = array_of(vec![NativeValue::Long(1)]);
        match array.get(usize::MAX) {
            Err(SurrealError::IndexOutOfRange {
                kind,
                operation,
                index,
                len,
            }) => {
                assert_eq!(kind, HandleKind::Array);
                assert_eq!(operation, "get");
                assert_eq!(index, i128::try_from(usize::MAX).expect("fits"));
                assert_eq!(len, 1);
            }
            other => panic!("expected out of range, got {other:?}"),
        }
    }

    #[test]
    fn test_display_after_release_names_the_error() {
        let (_engine, array) = array_of(vec![]);
        array.release();
        assert_eq!(
            array.to_string(),
            "<use_after_release: to_string on released array>"
        );
    }
}
