//! Forward-only cursors over engine-owned arrays and objects.
//!
//! Every cursor follows the same two-step protocol: `has_next` asks whether
//! another element exists without advancing, `next_value` / `next_entry`
//! produces it and advances. Plain cursors are for one thread at a time and
//! are `!Sync`. The synchronized variants serialize every step behind a
//! per-cursor mutex, and `try_next` runs check and advance as one step so
//! concurrent drainers never see the same element twice.
//!
//! All cursors also implement [`Iterator`], yielding `Result`s and stopping
//! for good after the first error.
//!
//! Sharing a plain cursor across threads is rejected at compile time:
//!
//! ```compile_fail
//! fn shared<T: Sync>() {}
//! shared::<surrealkit_core::ValueIterator>();
//! ```

use std::cell::Cell;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use surrealkit_native::{Engine, Handle, HandleKind};

use crate::error::SurrealResult;
use crate::native::Native;
use crate::object::Entry;
use crate::value::Value;

/// A cursor that produces [`Value`]s.
pub trait ValueCursor {
    /// Whether another value exists. Never advances.
    ///
    /// # Errors
    ///
    /// `IteratorInvalidated` if the source changed, or any boundary failure.
    fn has_next(&self) -> SurrealResult<bool>;

    /// Produces the next value and advances.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` when exhausted, `IteratorInvalidated` if the source
    /// changed, or any boundary failure.
    fn next_value(&mut self) -> SurrealResult<Value>;

    /// Checks and advances as one step. `None` once exhausted.
    ///
    /// Synchronized cursors run this under their lock.
    fn step(&mut self) -> Option<SurrealResult<Value>> {
        match self.has_next() {
            Ok(false) => None,
            Ok(true) => Some(self.next_value()),
            Err(err) => Some(Err(err)),
        }
    }
}

/// One fused step of the lookahead protocol.
pub(crate) fn fused_step<S, T>(
    fused: &mut bool,
    state: &mut S,
    has_next: impl FnOnce(&S) -> SurrealResult<bool>,
    advance: impl FnOnce(&mut S) -> SurrealResult<T>,
) -> Option<SurrealResult<T>> {
    if *fused {
        return None;
    }
    let outcome = match has_next(state) {
        Ok(false) => return None,
        Ok(true) => advance(state),
        Err(err) => Err(err),
    };
    if outcome.is_err() {
        *fused = true;
    }
    Some(outcome)
}

fn cursor_has_next(native: &Native) -> SurrealResult<bool> {
    native.call("has_next", |engine, h| engine.cursor_has_next(h))
}

fn cursor_next_value(native: &Native) -> SurrealResult<Value> {
    let raw = native.call("next", |engine, h| engine.cursor_next_value(h))?;
    Ok(Value::adopt(native.engine(), raw))
}

fn cursor_next_entry(native: &Native) -> SurrealResult<Entry> {
    let raw = native.call("next", |engine, h| engine.cursor_next_entry(h))?;
    Ok(Entry::new(raw.key, Value::adopt(native.engine(), raw.value)))
}

fn lock(fused: &Mutex<bool>) -> MutexGuard<'_, bool> {
    fused.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Plain cursors ───────────────────────────────────────────────────────

/// Single-threaded cursor over an [`Array`](crate::Array).
#[derive(Debug)]
pub struct ValueIterator {
    native: Native,
    fused: bool,
    _not_sync: PhantomData<Cell<()>>,
}

impl ValueIterator {
    /// Takes ownership of a value cursor handle issued by `engine`.
    #[must_use]
    pub fn adopt(engine: Arc<dyn Engine>, handle: Handle) -> Self {
        Self {
            native: Native::new(engine, HandleKind::ValueCursor, handle),
            fused: false,
            _not_sync: PhantomData,
        }
    }

    /// Whether another value exists. Never advances.
    ///
    /// # Errors
    ///
    /// See [`ValueCursor::has_next`].
    pub fn has_next(&self) -> SurrealResult<bool> {
        cursor_has_next(&self.native)
    }

    /// Produces the next value and advances.
    ///
    /// # Errors
    ///
    /// See [`ValueCursor::next_value`].
    pub fn next_value(&mut self) -> SurrealResult<Value> {
        cursor_next_value(&self.native)
    }

    /// Releases the engine cursor.
    pub fn release(&self) -> bool {
        self.native.release()
    }
}

impl ValueCursor for ValueIterator {
    fn has_next(&self) -> SurrealResult<bool> {
        Self::has_next(self)
    }

    fn next_value(&mut self) -> SurrealResult<Value> {
        Self::next_value(self)
    }
}

impl Iterator for ValueIterator {
    type Item = SurrealResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        fused_step(
            &mut self.fused,
            &mut self.native,
            cursor_has_next,
            |n| cursor_next_value(n),
        )
    }
}

impl FusedIterator for ValueIterator {}

/// Single-threaded cursor over an [`Object`](crate::Object).
#[derive(Debug)]
pub struct EntryIterator {
    native: Native,
    fused: bool,
    _not_sync: PhantomData<Cell<()>>,
}

impl EntryIterator {
    /// Takes ownership of an entry cursor handle issued by `engine`.
    #[must_use]
    pub fn adopt(engine: Arc<dyn Engine>, handle: Handle) -> Self {
        Self {
            native: Native::new(engine, HandleKind::EntryCursor, handle),
            fused: false,
            _not_sync: PhantomData,
        }
    }

    /// Whether another entry exists. Never advances.
    ///
    /// # Errors
    ///
    /// `IteratorInvalidated` if the object changed, or any boundary failure.
    pub fn has_next(&self) -> SurrealResult<bool> {
        cursor_has_next(&self.native)
    }

    /// Produces the next entry and advances.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` when exhausted, `IteratorInvalidated` if the object
    /// changed, or any boundary failure.
    pub fn next_entry(&mut self) -> SurrealResult<Entry> {
        cursor_next_entry(&self.native)
    }

    /// Releases the engine cursor.
    pub fn release(&self) -> bool {
        self.native.release()
    }
}

impl Iterator for EntryIterator {
    type Item = SurrealResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        fused_step(
            &mut self.fused,
            &mut self.native,
            cursor_has_next,
            |n| cursor_next_entry(n),
        )
    }
}

impl FusedIterator for EntryIterator {}

// ── Synchronized cursors ────────────────────────────────────────────────

/// Cursor over an [`Array`](crate::Array) that several threads may drain
/// together.
#[derive(Debug)]
pub struct SynchronizedValueIterator {
    native: Native,
    fused: Mutex<bool>,
}

impl SynchronizedValueIterator {
    /// Takes ownership of a value cursor handle issued by `engine`.
    #[must_use]
    pub fn adopt(engine: Arc<dyn Engine>, handle: Handle) -> Self {
        Self {
            native: Native::new(engine, HandleKind::ValueCursor, handle),
            fused: Mutex::new(false),
        }
    }

    /// Whether another value exists, under the cursor lock.
    ///
    /// Another thread may advance before a following `next_value`; use
    /// [`try_next`](Self::try_next) to check and advance atomically.
    ///
    /// # Errors
    ///
    /// See [`ValueCursor::has_next`].
    pub fn has_next(&self) -> SurrealResult<bool> {
        let _guard = lock(&self.fused);
        cursor_has_next(&self.native)
    }

    /// Produces the next value, under the cursor lock.
    ///
    /// # Errors
    ///
    /// See [`ValueCursor::next_value`].
    pub fn next_value(&self) -> SurrealResult<Value> {
        let _guard = lock(&self.fused);
        cursor_next_value(&self.native)
    }

    /// Checks and advances in one locked step. `None` once exhausted.
    pub fn try_next(&self) -> Option<SurrealResult<Value>> {
        let mut fused = lock(&self.fused);
        let mut native = &self.native;
        fused_step(
            &mut fused,
            &mut native,
            |n| cursor_has_next(n),
            |n| cursor_next_value(n),
        )
    }

    /// Releases the engine cursor.
    pub fn release(&self) -> bool {
        let _guard = lock(&self.fused);
        self.native.release()
    }
}

impl ValueCursor for SynchronizedValueIterator {
    fn has_next(&self) -> SurrealResult<bool> {
        Self::has_next(self)
    }

    fn next_value(&mut self) -> SurrealResult<Value> {
        Self::next_value(self)
    }

    fn step(&mut self) -> Option<SurrealResult<Value>> {
        self.try_next()
    }
}

impl ValueCursor for &SynchronizedValueIterator {
    fn has_next(&self) -> SurrealResult<bool> {
        SynchronizedValueIterator::has_next(self)
    }

    fn next_value(&mut self) -> SurrealResult<Value> {
        SynchronizedValueIterator::next_value(self)
    }

    fn step(&mut self) -> Option<SurrealResult<Value>> {
        self.try_next()
    }
}

impl Iterator for &SynchronizedValueIterator {
    type Item = SurrealResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next()
    }
}

/// Cursor over an [`Object`](crate::Object) that several threads may drain
/// together.
#[derive(Debug)]
pub struct SynchronizedEntryIterator {
    native: Native,
    fused: Mutex<bool>,
}

impl SynchronizedEntryIterator {
    /// Takes ownership of an entry cursor handle issued by `engine`.
    #[must_use]
    pub fn adopt(engine: Arc<dyn Engine>, handle: Handle) -> Self {
        Self {
            native: Native::new(engine, HandleKind::EntryCursor, handle),
            fused: Mutex::new(false),
        }
    }

    /// Whether another entry exists, under the cursor lock.
    ///
    /// # Errors
    ///
    /// `IteratorInvalidated` if the object changed, or any boundary failure.
    pub fn has_next(&self) -> SurrealResult<bool> {
        let _guard = lock(&self.fused);
        cursor_has_next(&self.native)
    }

    /// Produces the next entry, under the cursor lock.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` when exhausted, `IteratorInvalidated` if the object
    /// changed, or any boundary failure.
    pub fn next_entry(&self) -> SurrealResult<Entry> {
        let _guard = lock(&self.fused);
        cursor_next_entry(&self.native)
    }

    /// Checks and advances in one locked step. `None` once exhausted.
    pub fn try_next(&self) -> Option<SurrealResult<Entry>> {
        let mut fused = lock(&self.fused);
        let mut native = &self.native;
        fused_step(
            &mut fused,
            &mut native,
            |n| cursor_has_next(n),
            |n| cursor_next_entry(n),
        )
    }

    /// Releases the engine cursor.
    pub fn release(&self) -> bool {
        let _guard = lock(&self.fused);
        self.native.release()
    }
}

impl Iterator for &SynchronizedEntryIterator {
    type Item = SurrealResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use surrealkit_native::{MemoryEngine, NativeValue};

    use super::*;
    use crate::array::Array;
    use crate::error::SurrealError;
    use crate::object::Object;

    fn numbers(n: i64) -> (Arc<MemoryEngine>, Array) {
        let engine = Arc::new(MemoryEngine::new());
        let handle = engine
            .alloc_array((0..n).map(NativeValue::Long).collect())
            .expect("alloc");
        (engine.clone(), Array::adopt(engine, handle))
    }

    #[test]
    fn test_iteration_matches_indexed_access() {
        let (_engine, array) = numbers(5);
        let iterated: Vec<i64> = array
            .iter()
            .expect("iter")
            .map(|v| v.expect("value").as_long().expect("long"))
            .collect();
        let indexed: Vec<i64> = (0..array.len().expect("len"))
            .map(|i| array.get(i).expect("get").as_long().expect("long"))
            .collect();
        assert_eq!(iterated, indexed);
        assert_eq!(iterated.len(), 5);
    }

    #[test]
    fn test_has_next_is_side_effect_free() {
        let (_engine, array) = numbers(1);
        let mut cursor = array.iter().expect("iter");
        assert!(cursor.has_next().expect("has_next"));
        assert!(cursor.has_next().expect("has_next"));
        assert_eq!(cursor.next_value().expect("next").as_long(), Some(0));
        assert!(!cursor.has_next().expect("has_next"));
        assert!(matches!(
            cursor.next_value(),
            Err(SurrealError::NoSuchElement { kind: HandleKind::ValueCursor, ref operation })
                if operation == "next"
        ));
    }

    #[test]
    fn test_mutation_invalidates_and_fuses() {
        let engine = Arc::new(MemoryEngine::new());
        let handle = engine
            .alloc_array(vec![NativeValue::Long(1), NativeValue::Long(2)])
            .expect("alloc");
        let array = Array::adopt(engine.clone(), handle);
        let mut cursor = array.iter().expect("iter");

        assert!(cursor.next().expect("first").is_ok());
        engine.push(handle, NativeValue::Long(3)).expect("push");
        assert!(matches!(
            cursor.next(),
            Some(Err(SurrealError::IteratorInvalidated { .. }))
        ));
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_entry_iterator_yields_pairs() {
        let engine = Arc::new(MemoryEngine::new());
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), NativeValue::Long(1));
        map.insert("b".to_string(), NativeValue::Bool(true));
        let handle = engine.alloc_object(map).expect("alloc");
        let object = Object::adopt(engine, handle);

        let mut cursor = object.iter().expect("iter");
        let entry = cursor.next_entry().expect("entry");
        assert_eq!(entry.key(), "a");
        assert_eq!(entry.value().as_long(), Some(1));
        assert_eq!(cursor.count(), 1);
    }

    #[test]
    fn test_cursor_release_and_use_after_release() {
        let (engine, array) = numbers(2);
        let cursor = array.iter().expect("iter");
        assert!(cursor.release());
        assert!(!cursor.release());
        assert!(matches!(
            cursor.has_next(),
            Err(SurrealError::UseAfterRelease { kind: HandleKind::ValueCursor, .. })
        ));
        assert_eq!(engine.stats().rejected_releases, 0);
    }

    #[test]
    fn test_synchronized_cursor_single_thread() {
        let (_engine, array) = numbers(3);
        let cursor = array.synchronized_iter().expect("iter");
        let values: Vec<i64> = (&cursor)
            .map(|v| v.expect("value").as_long().expect("long"))
            .collect();
        assert_eq!(values, [0, 1, 2]);
        assert!(cursor.try_next().is_none());
    }

    #[test]
    fn test_synchronized_entry_cursor() {
        let engine = Arc::new(MemoryEngine::new());
        let handle = engine
            .alloc_object([("x", NativeValue::Long(1)), ("y", NativeValue::Long(2))])
            .expect("alloc");
        let object = Object::adopt(engine, handle);
        let cursor = object.synchronized_iter().expect("iter");
        assert!(cursor.has_next().expect("has_next"));
        assert_eq!(cursor.next_entry().expect("entry").key(), "x");
        assert_eq!((&cursor).count(), 1);
    }
}
