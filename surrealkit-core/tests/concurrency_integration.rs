//! Concurrency integration tests for the host-side wrappers.

mod common;

use std::collections::BTreeSet;
use std::thread;

use surrealkit_core::{SurrealError, TypedIterator};

const THREADS: usize = 8;
const ELEMENTS: i64 = 2_000;

#[test]
fn test_synchronized_cursor_yields_every_element_exactly_once() {
    let (engine, db) = common::embedded();
    let array = common::numbers(&engine, &db, ELEMENTS);
    let cursor = array.synchronized_iter().expect("iter");

    let per_thread: Vec<Vec<i64>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let mut seen = Vec::new();
                    while let Some(value) = cursor.try_next() {
                        seen.push(value.expect("value").as_long().expect("long"));
                    }
                    seen
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().expect("worker"))
            .collect()
    });

    let total: usize = per_thread.iter().map(Vec::len).sum();
    let union: BTreeSet<i64> = per_thread.into_iter().flatten().collect();
    assert_eq!(total, usize::try_from(ELEMENTS).expect("fits"));
    assert_eq!(union, (0..ELEMENTS).collect());
}

#[test]
fn test_each_thread_sees_increasing_positions() {
    let (engine, db) = common::embedded();
    let array = common::numbers(&engine, &db, ELEMENTS);
    let cursor = array.synchronized_iter().expect("iter");

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                let seen: Vec<i64> = (&cursor)
                    .map(|v| v.expect("value").as_long().expect("long"))
                    .collect();
                assert!(seen.windows(2).all(|w| w[0] < w[1]));
            });
        }
    });
}

#[test]
fn test_split_check_and_advance_may_race_but_never_duplicates() {
    let (engine, db) = common::embedded();
    let array = common::numbers(&engine, &db, ELEMENTS);
    let cursor = array.synchronized_iter().expect("iter");

    let per_thread: Vec<Vec<i64>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let mut seen = Vec::new();
                    while cursor.has_next().expect("has_next") {
                        match cursor.next_value() {
                            Ok(value) => seen.push(value.as_long().expect("long")),
                            // Another thread took the last element in between.
                            Err(SurrealError::NoSuchElement { .. }) => break,
                            Err(err) => panic!("unexpected error: {err}"),
                        }
                    }
                    seen
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().expect("worker"))
            .collect()
    });

    let all: Vec<i64> = per_thread.into_iter().flatten().collect();
    let unique: BTreeSet<i64> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len());
    assert_eq!(unique, (0..ELEMENTS).collect());
}

#[test]
fn test_typed_iteration_over_shared_synchronized_cursor() {
    let (engine, db) = common::embedded();
    let array = common::numbers(&engine, &db, ELEMENTS);
    let cursor = array.synchronized_iter().expect("iter");

    let sums: Vec<i64> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let typed: TypedIterator<i64, _> = TypedIterator::new(&cursor);
                    typed.map(|v| v.expect("long")).sum::<i64>()
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().expect("worker"))
            .collect()
    });

    assert_eq!(sums.iter().sum::<i64>(), (0..ELEMENTS).sum::<i64>());
    assert!(!cursor.has_next().expect("has_next"));
}
