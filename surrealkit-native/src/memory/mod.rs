//! In-process [`Engine`] implementation.
//!
//! `MemoryEngine` keeps every object it hands out in a generation-checked
//! [`HandleArena`] behind one mutex. Containers are shared, versioned cells:
//! a nested array read out of another array is the *same* container, and any
//! mutation bumps the version so open cursors over it become invalid.
//!
//! It backs the test suites on both sides of the boundary and can serve as
//! an embedded engine. Its counters act as a native-side canary for release
//! discipline.

mod render;

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use crate::arena::HandleArena;
use crate::engine::{Engine, EngineError, EngineResult, RawEntry, RawValue, RecordKey};
use crate::geometry::Geometry;
use crate::handle::{Handle, HandleKind};

/// Engine-side value, used to seed a [`MemoryEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
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
    /// Record identifier.
    Thing {
        /// Table name.
        table: String,
        /// Record key.
        key: RecordKey,
    },
    /// Ordered sequence.
    Array(Vec<NativeValue>),
    /// String-keyed map.
    Object(BTreeMap<String, NativeValue>),
}

impl From<bool> for NativeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for NativeValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for NativeValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for NativeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<uuid::Uuid> for NativeValue {
    fn from(v: uuid::Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<Duration> for NativeValue {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<Vec<u8>> for NativeValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Geometry> for NativeValue {
    fn from(v: Geometry) -> Self {
        Self::Geometry(v)
    }
}

impl From<Vec<Self>> for NativeValue {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(v)
    }
}

impl From<BTreeMap<String, Self>> for NativeValue {
    fn from(v: BTreeMap<String, Self>) -> Self {
        Self::Object(v)
    }
}

/// Shared, versioned container.
#[derive(Debug)]
struct Shared<T> {
    state: RwLock<Versioned<T>>,
}

#[derive(Debug)]
struct Versioned<T> {
    version: u64,
    items: T,
}

impl<T> Shared<T> {
    fn new(items: T) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(Versioned { version: 0, items }),
        })
    }

    fn read<R>(&self, f: impl FnOnce(&Versioned<T>) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        guard.version += 1;
        f(&mut guard.items)
    }
}

type ArrayCell = Shared<Vec<Node>>;
type ObjectCell = Shared<BTreeMap<String, Node>>;

/// Stored form of a value: compound kinds point at shared cells.
#[derive(Debug, Clone)]
enum Node {
    None,
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    Decimal(String),
    String(String),
    Uuid(uuid::Uuid),
    Duration(Duration),
    Bytes(Vec<u8>),
    Geometry(Geometry),
    Thing(Arc<Record>),
    Array(Arc<ArrayCell>),
    Object(Arc<ObjectCell>),
}

impl From<NativeValue> for Node {
    fn from(value: NativeValue) -> Self {
        match value {
            NativeValue::None => Self::None,
            NativeValue::Null => Self::Null,
            NativeValue::Bool(v) => Self::Bool(v),
            NativeValue::Long(v) => Self::Long(v),
            NativeValue::Double(v) => Self::Double(v),
            NativeValue::Decimal(v) => Self::Decimal(v),
            NativeValue::String(v) => Self::String(v),
            NativeValue::Uuid(v) => Self::Uuid(v),
            NativeValue::Duration(v) => Self::Duration(v),
            NativeValue::Bytes(v) => Self::Bytes(v),
            NativeValue::Geometry(v) => Self::Geometry(v),
            NativeValue::Thing { table, key } => Self::Thing(Arc::new(Record { table, key })),
            NativeValue::Array(items) => {
                Self::Array(Shared::new(items.into_iter().map(Self::from).collect()))
            }
            NativeValue::Object(entries) => Self::Object(Shared::new(
                entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            )),
        }
    }
}

#[derive(Debug)]
struct Record {
    table: String,
    key: RecordKey,
}

/// Everything that can sit behind a handle.
#[derive(Debug)]
enum Resident {
    Instance,
    Array(Arc<ArrayCell>),
    Object(Arc<ObjectCell>),
    Thing(Arc<Record>),
    ValueCursor(Cursor<ArrayCell, usize>),
    EntryCursor(Cursor<ObjectCell, Option<String>>),
}

impl Resident {
    const fn kind(&self) -> HandleKind {
        match self {
            Self::Instance => HandleKind::Instance,
            Self::Array(_) => HandleKind::Array,
            Self::Object(_) => HandleKind::Object,
            Self::Thing(_) => HandleKind::Thing,
            Self::ValueCursor(_) => HandleKind::ValueCursor,
            Self::EntryCursor(_) => HandleKind::EntryCursor,
        }
    }
}

/// Open cursor. Value cursors track an index, entry cursors the last key
/// produced.
#[derive(Debug)]
struct Cursor<C, P> {
    source: Arc<C>,
    position: P,
    version: u64,
}

/// First entry strictly after `last`, or the first entry at all.
fn entry_after<'a>(
    items: &'a BTreeMap<String, Node>,
    last: Option<&str>,
) -> Option<(&'a String, &'a Node)> {
    match last {
        None => items.iter().next(),
        Some(last) => items.range::<str, _>((Excluded(last), Unbounded)).next(),
    }
}

/// Snapshot of the engine's allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Handles issued so far.
    pub allocated: u64,
    /// Handles released successfully.
    pub released: u64,
    /// Release calls rejected because the handle was already gone.
    pub rejected_releases: u64,
    /// Handles currently live.
    pub live: usize,
}

/// Thread-safe in-process engine.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    arena: Mutex<HandleArena<Resident>>,
    allocated: AtomicU64,
    released: AtomicU64,
    rejected_releases: AtomicU64,
}

macro_rules! expect_kind {
    ($resident:expr, $handle:expr, $variant:ident, $kind:expr) => {
        match $resident {
            Resident::$variant(inner) => Ok(inner),
            other => Err(EngineError::WrongKind {
                handle: $handle,
                expected: $kind,
                found: other.kind(),
            }),
        }
    };
}

impl MemoryEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current allocation counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let live = self
            .arena
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        EngineStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            rejected_releases: self.rejected_releases.load(Ordering::Relaxed),
            live,
        }
    }

    /// Allocates an array and returns a handle the caller owns.
    ///
    /// # Errors
    ///
    /// Fails if the engine runs out of handles.
    pub fn alloc_array(&self, items: Vec<NativeValue>) -> EngineResult<Handle> {
        let cell = Shared::new(items.into_iter().map(Node::from).collect());
        self.insert(&mut *self.lock()?, Resident::Array(cell))
    }

    /// Allocates an object and returns a handle the caller owns.
    ///
    /// # Errors
    ///
    /// Fails if the engine runs out of handles.
    pub fn alloc_object<K, I>(&self, entries: I) -> EngineResult<Handle>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NativeValue)>,
    {
        let cell = Shared::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), Node::from(v)))
                .collect(),
        );
        self.insert(&mut *self.lock()?, Resident::Object(cell))
    }

    /// Allocates a record identifier and returns a handle the caller owns.
    ///
    /// # Errors
    ///
    /// Fails if the engine runs out of handles.
    pub fn alloc_thing(&self, table: impl Into<String>, key: RecordKey) -> EngineResult<Handle> {
        let record = Arc::new(Record {
            table: table.into(),
            key,
        });
        self.insert(&mut *self.lock()?, Resident::Thing(record))
    }

    /// Moves any value across the boundary, allocating handles for compound
    /// kinds.
    ///
    /// # Errors
    ///
    /// Fails if the engine runs out of handles.
    pub fn alloc_value(&self, value: NativeValue) -> EngineResult<RawValue> {
        self.materialize(&mut *self.lock()?, Node::from(value))
    }

    /// Appends to an array. Invalidates cursors open over it.
    ///
    /// # Errors
    ///
    /// Fails if `array` is stale or not an array.
    pub fn push(&self, array: Handle, value: NativeValue) -> EngineResult<()> {
        let cell = self.array_cell(array)?;
        cell.mutate(|items| items.push(Node::from(value)));
        Ok(())
    }

    /// Inserts into an object. Invalidates cursors open over it.
    ///
    /// # Errors
    ///
    /// Fails if `object` is stale or not an object.
    pub fn insert_entry(
        &self,
        object: Handle,
        key: impl Into<String>,
        value: NativeValue,
    ) -> EngineResult<()> {
        let cell = self.object_cell(object)?;
        cell.mutate(|entries| entries.insert(key.into(), Node::from(value)));
        Ok(())
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, HandleArena<Resident>>> {
        self.arena
            .lock()
            .map_err(|_| EngineError::Native("engine state poisoned".to_string()))
    }

    fn insert(
        &self,
        arena: &mut HandleArena<Resident>,
        resident: Resident,
    ) -> EngineResult<Handle> {
        let handle = arena.insert(resident)?;
        self.allocated.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    fn materialize(
        &self,
        arena: &mut HandleArena<Resident>,
        node: Node,
    ) -> EngineResult<RawValue> {
        Ok(match node {
            Node::None => RawValue::None,
            Node::Null => RawValue::Null,
            Node::Bool(v) => RawValue::Bool(v),
            Node::Long(v) => RawValue::Long(v),
            Node::Double(v) => RawValue::Double(v),
            Node::Decimal(v) => RawValue::Decimal(v),
            Node::String(v) => RawValue::String(v),
            Node::Uuid(v) => RawValue::Uuid(v),
            Node::Duration(v) => RawValue::Duration(v),
            Node::Bytes(v) => RawValue::Bytes(v),
            Node::Geometry(v) => RawValue::Geometry(v),
            Node::Thing(record) => RawValue::Thing(self.insert(arena, Resident::Thing(record))?),
            Node::Array(cell) => RawValue::Array(self.insert(arena, Resident::Array(cell))?),
            Node::Object(cell) => RawValue::Object(self.insert(arena, Resident::Object(cell))?),
        })
    }

    fn array_cell(&self, array: Handle) -> EngineResult<Arc<ArrayCell>> {
        let arena = self.lock()?;
        let cell = expect_kind!(arena.get(array)?, array, Array, HandleKind::Array)?;
        Ok(Arc::clone(cell))
    }

    fn object_cell(&self, object: Handle) -> EngineResult<Arc<ObjectCell>> {
        let arena = self.lock()?;
        let cell = expect_kind!(arena.get(object)?, object, Object, HandleKind::Object)?;
        Ok(Arc::clone(cell))
    }

    fn thing_record(&self, thing: Handle) -> EngineResult<Arc<Record>> {
        let arena = self.lock()?;
        let record = expect_kind!(arena.get(thing)?, thing, Thing, HandleKind::Thing)?;
        Ok(Arc::clone(record))
    }
}

impl Engine for MemoryEngine {
    fn instance_new(&self) -> EngineResult<Handle> {
        self.insert(&mut *self.lock()?, Resident::Instance)
    }

    fn release(&self, handle: Handle) -> EngineResult<()> {
        let removed = self.lock()?.remove(handle);
        match removed {
            Ok(resident) => {
                self.released.fetch_add(1, Ordering::Relaxed);
                log::trace!("released {} handle {handle}", resident.kind());
                Ok(())
            }
            Err(err) => {
                self.rejected_releases.fetch_add(1, Ordering::Relaxed);
                log::warn!("rejected release of handle {handle}: {err}");
                Err(err.into())
            }
        }
    }

    fn array_len(&self, array: Handle) -> EngineResult<usize> {
        Ok(self.array_cell(array)?.read(|state| state.items.len()))
    }

    fn array_get(&self, array: Handle, index: i64) -> EngineResult<RawValue> {
        let mut arena = self.lock()?;
        let cell = Arc::clone(expect_kind!(
            arena.get(array)?,
            array,
            Array,
            HandleKind::Array
        )?);
        let node = cell.read(|state| {
            usize::try_from(index)
                .ok()
                .and_then(|i| state.items.get(i).cloned())
                .ok_or(EngineError::IndexOutOfRange {
                    index,
                    len: state.items.len(),
                })
        })?;
        self.materialize(&mut arena, node)
    }

    fn array_render(&self, array: Handle, pretty: bool) -> EngineResult<String> {
        let cell = self.array_cell(array)?;
        Ok(render::render(&Node::Array(cell), pretty))
    }

    fn array_cursor(&self, array: Handle) -> EngineResult<Handle> {
        let mut arena = self.lock()?;
        let source = Arc::clone(expect_kind!(
            arena.get(array)?,
            array,
            Array,
            HandleKind::Array
        )?);
        let version = source.read(|state| state.version);
        self.insert(
            &mut arena,
            Resident::ValueCursor(Cursor {
                source,
                position: 0,
                version,
            }),
        )
    }

    fn object_len(&self, object: Handle) -> EngineResult<usize> {
        Ok(self.object_cell(object)?.read(|state| state.items.len()))
    }

    fn object_get(&self, object: Handle, key: &str) -> EngineResult<Option<RawValue>> {
        let mut arena = self.lock()?;
        let cell = Arc::clone(expect_kind!(
            arena.get(object)?,
            object,
            Object,
            HandleKind::Object
        )?);
        match cell.read(|state| state.items.get(key).cloned()) {
            Some(node) => self.materialize(&mut arena, node).map(Some),
            None => Ok(None),
        }
    }

    fn object_render(&self, object: Handle, pretty: bool) -> EngineResult<String> {
        let cell = self.object_cell(object)?;
        Ok(render::render(&Node::Object(cell), pretty))
    }

    fn object_cursor(&self, object: Handle) -> EngineResult<Handle> {
        let mut arena = self.lock()?;
        let source = Arc::clone(expect_kind!(
            arena.get(object)?,
            object,
            Object,
            HandleKind::Object
        )?);
        let version = source.read(|state| state.version);
        self.insert(
            &mut arena,
            Resident::EntryCursor(Cursor {
                source,
                position: None,
                version,
            }),
        )
    }

    fn cursor_has_next(&self, cursor: Handle) -> EngineResult<bool> {
        let arena = self.lock()?;
        match arena.get(cursor)? {
            Resident::ValueCursor(c) => c.source.read(|state| {
                if state.version == c.version {
                    Ok(c.position < state.items.len())
                } else {
                    Err(EngineError::Invalidated)
                }
            }),
            Resident::EntryCursor(c) => c.source.read(|state| {
                if state.version == c.version {
                    Ok(entry_after(&state.items, c.position.as_deref()).is_some())
                } else {
                    Err(EngineError::Invalidated)
                }
            }),
            other => Err(EngineError::NotACursor {
                handle: cursor,
                found: other.kind(),
            }),
        }
    }

    fn cursor_next_value(&self, cursor: Handle) -> EngineResult<RawValue> {
        let mut arena = self.lock()?;
        let c = expect_kind!(
            arena.get_mut(cursor)?,
            cursor,
            ValueCursor,
            HandleKind::ValueCursor
        )?;
        let node = c.source.read(|state| {
            if state.version != c.version {
                return Err(EngineError::Invalidated);
            }
            state
                .items
                .get(c.position)
                .cloned()
                .ok_or(EngineError::Exhausted)
        })?;
        c.position += 1;
        self.materialize(&mut arena, node)
    }

    fn cursor_next_entry(&self, cursor: Handle) -> EngineResult<RawEntry> {
        let mut arena = self.lock()?;
        let c = expect_kind!(
            arena.get_mut(cursor)?,
            cursor,
            EntryCursor,
            HandleKind::EntryCursor
        )?;
        let (key, node) = c.source.read(|state| {
            if state.version != c.version {
                return Err(EngineError::Invalidated);
            }
            entry_after(&state.items, c.position.as_deref())
                .map(|(k, v)| (k.clone(), v.clone()))
                .ok_or(EngineError::Exhausted)
        })?;
        c.position = Some(key.clone());
        let value = self.materialize(&mut arena, node)?;
        Ok(RawEntry { key, value })
    }

    fn thing_table(&self, thing: Handle) -> EngineResult<String> {
        Ok(self.thing_record(thing)?.table.clone())
    }

    fn thing_key(&self, thing: Handle) -> EngineResult<RecordKey> {
        Ok(self.thing_record(thing)?.key.clone())
    }

    fn thing_render(&self, thing: Handle) -> EngineResult<String> {
        let record = self.thing_record(thing)?;
        Ok(render::render(&Node::Thing(record), false))
    }
}

impl Drop for MemoryEngine {
    fn drop(&mut self) {
        let arena = self.arena.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !arena.is_empty() {
            let leaked = arena.drain();
            log::warn!(
                "memory engine dropped with {} live handle(s); reclaiming",
                leaked.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(engine: &MemoryEngine, n: i64) -> Handle {
        engine
            .alloc_array((0..n).map(NativeValue::Long).collect())
            .expect("alloc array")
    }

    #[test]
    fn test_array_len_and_get() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 3);
        assert_eq!(engine.array_len(array).expect("len"), 3);
        assert_eq!(engine.array_get(array, 2).expect("get"), RawValue::Long(2));
    }

    #[test]
    fn test_array_get_out_of_range() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 3);
        assert_eq!(
            engine.array_get(array, 3),
            Err(EngineError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            engine.array_get(array, -1),
            Err(EngineError::IndexOutOfRange { index: -1, len: 3 })
        );
    }

    #[test]
    fn test_double_release_is_rejected_and_counted() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 1);
        engine.release(array).expect("first release");
        assert_eq!(engine.release(array), Err(EngineError::Stale(array)));
        let stats = engine.stats();
        assert_eq!(stats.released, 1);
        assert_eq!(stats.rejected_releases, 1);
        assert_eq!(stats.live, 0);
    }

    #[test]
    fn test_wrong_kind_is_reported() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 1);
        assert_eq!(
            engine.object_len(array),
            Err(EngineError::WrongKind {
                handle: array,
                expected: HandleKind::Object,
                found: HandleKind::Array,
            })
        );
    }

    #[test]
    fn test_nested_array_shares_the_container() {
        let engine = MemoryEngine::new();
        let outer = engine
            .alloc_array(vec![NativeValue::Array(vec![NativeValue::Long(1)])])
            .expect("alloc");
        let RawValue::Array(first) = engine.array_get(outer, 0).expect("get") else {
            panic!("expected nested array");
        };
        let RawValue::Array(second) = engine.array_get(outer, 0).expect("get") else {
            panic!("expected nested array");
        };
        assert_ne!(first, second, "each read issues a fresh handle");

        engine.push(first, NativeValue::Long(2)).expect("push");
        assert_eq!(engine.array_len(second).expect("len"), 2);
    }

    #[test]
    fn test_cursor_walks_in_order_then_exhausts() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 2);
        let cursor = engine.array_cursor(array).expect("cursor");
        assert!(engine.cursor_has_next(cursor).expect("has_next"));
        assert!(engine.cursor_has_next(cursor).expect("has_next is repeatable"));
        assert_eq!(engine.cursor_next_value(cursor), Ok(RawValue::Long(0)));
        assert_eq!(engine.cursor_next_value(cursor), Ok(RawValue::Long(1)));
        assert!(!engine.cursor_has_next(cursor).expect("has_next"));
        assert_eq!(engine.cursor_next_value(cursor), Err(EngineError::Exhausted));
    }

    #[test]
    fn test_mutation_invalidates_open_cursor() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 2);
        let cursor = engine.array_cursor(array).expect("cursor");
        engine.cursor_next_value(cursor).expect("next");
        engine.push(array, NativeValue::Long(9)).expect("push");
        assert_eq!(engine.cursor_has_next(cursor), Err(EngineError::Invalidated));
        assert_eq!(engine.cursor_next_value(cursor), Err(EngineError::Invalidated));
    }

    #[test]
    fn test_entry_cursor_yields_sorted_entries() {
        let engine = MemoryEngine::new();
        let object = engine
            .alloc_object([("b", NativeValue::Long(2)), ("a", NativeValue::Long(1))])
            .expect("alloc");
        let cursor = engine.object_cursor(object).expect("cursor");
        let first = engine.cursor_next_entry(cursor).expect("next");
        assert_eq!(first.key, "a");
        assert_eq!(first.value, RawValue::Long(1));
        let second = engine.cursor_next_entry(cursor).expect("next");
        assert_eq!(second.key, "b");
        assert!(!engine.cursor_has_next(cursor).expect("has_next"));
    }

    #[test]
    fn test_entry_cursor_resumes_after_last_key() {
        let engine = MemoryEngine::new();
        let entries: Vec<(String, NativeValue)> = (0..500)
            .map(|i| (format!("k{i:03}"), NativeValue::Long(i)))
            .collect();
        let object = engine.alloc_object(entries).expect("alloc");
        let cursor = engine.object_cursor(object).expect("cursor");

        let mut keys = Vec::new();
        while engine.cursor_has_next(cursor).expect("has_next") {
            keys.push(engine.cursor_next_entry(cursor).expect("next").key);
        }
        let expected: Vec<String> = (0..500).map(|i| format!("k{i:03}")).collect();
        assert_eq!(keys, expected);
        assert_eq!(engine.cursor_next_entry(cursor), Err(EngineError::Exhausted));
    }

    #[test]
    fn test_cursor_call_on_container_names_the_cursor_contract() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 1);
        assert_eq!(
            engine.cursor_has_next(array),
            Err(EngineError::NotACursor {
                handle: array,
                found: HandleKind::Array,
            })
        );
    }

    #[test]
    fn test_value_cursor_rejects_entry_call() {
        let engine = MemoryEngine::new();
        let array = numbers(&engine, 1);
        let cursor = engine.array_cursor(array).expect("cursor");
        assert!(matches!(
            engine.cursor_next_entry(cursor),
            Err(EngineError::WrongKind {
                found: HandleKind::ValueCursor,
                ..
            })
        ));
    }

    #[test]
    fn test_thing_parts() {
        let engine = MemoryEngine::new();
        let thing = engine
            .alloc_thing("person", RecordKey::String("tobie".into()))
            .expect("alloc");
        assert_eq!(engine.thing_table(thing).expect("table"), "person");
        assert_eq!(
            engine.thing_key(thing).expect("key"),
            RecordKey::String("tobie".into())
        );
        assert_eq!(engine.thing_render(thing).expect("render"), "person:tobie");
    }
}
