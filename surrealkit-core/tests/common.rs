//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use surrealkit_core::{Array, MemoryEngine, NativeValue, Object, Surreal};

/// An in-process engine plus an instance on it.
pub fn embedded() -> (Arc<MemoryEngine>, Surreal) {
    let engine = Arc::new(MemoryEngine::new());
    let db = Surreal::new(engine.clone()).expect("instance");
    (engine, db)
}

/// Array holding `0..n`.
pub fn numbers(engine: &Arc<MemoryEngine>, db: &Surreal, n: i64) -> Array {
    let handle = engine
        .alloc_array((0..n).map(NativeValue::Long).collect())
        .expect("alloc array");
    db.adopt_array(handle)
}

/// Object mapping `key{i}` to `i` for `0..n`.
pub fn keyed(engine: &Arc<MemoryEngine>, db: &Surreal, n: i64) -> Object {
    let entries: BTreeMap<String, NativeValue> = (0..n)
        .map(|i| (format!("key{i:04}"), NativeValue::Long(i)))
        .collect();
    let handle = engine.alloc_object(entries).expect("alloc object");
    db.adopt_object(handle)
}
