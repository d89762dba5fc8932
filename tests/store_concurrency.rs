//! Concurrency Integration Tests
//!
//! These tests drive a shared `TrieStore` from many threads at once and check
//! that readers only ever see fully published versions and that writers never
//! lose each other's updates.
//!
//! Run with:
//! ```bash
//! cargo test --test store_concurrency
//! ```

use cow_trie::{Trie, TrieStore};
use std::sync::atomic::{AtomicBool, Ordering};

const WRITERS: usize = 4;
const READERS: usize = 4;
const KEYS_PER_WRITER: usize = 200;

fn writer_key(writer: usize, i: usize) -> String {
    format!("w{}:{:04}", writer, i)
}

/// Within one writer, keys are put in order, so any published version holds
/// a contiguous run `0..n` of that writer's keys.
fn assert_snapshot_is_prefix_closed(snapshot: &Trie) {
    for writer in 0..WRITERS {
        let prefix = format!("w{}:", writer);
        let entries = snapshot.list_prefix(&prefix);
        for (i, (key, value)) in entries.iter().enumerate() {
            assert_eq!(key.as_slice(), writer_key(writer, i).as_bytes(), "gap in writer {} keys", writer);
            assert_eq!(value.downcast_ref::<usize>(), Some(&i));
        }
    }
}

// ============================================================================
// Readers vs Writers
// ============================================================================

#[test]
fn test_readers_never_observe_partial_versions() {
    let store = TrieStore::new();
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        for _ in 0..READERS {
            s.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let snapshot = store.snapshot();
                    assert_snapshot_is_prefix_closed(&snapshot);
                    assert_eq!(snapshot.len(), snapshot.list_prefix("").len());
                }
            });
        }

        let writers: Vec<_> = (0..WRITERS)
            .map(|writer| {
                let store = &store;
                s.spawn(move || {
                    for i in 0..KEYS_PER_WRITER {
                        store.put(writer_key(writer, i), i);
                    }
                })
            })
            .collect();
        for handle in writers {
            handle.join().unwrap();
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(store.len(), WRITERS * KEYS_PER_WRITER);
    assert_snapshot_is_prefix_closed(&store.snapshot());
}

#[test]
fn test_concurrent_writers_lose_no_updates() {
    let store = TrieStore::new();

    std::thread::scope(|s| {
        for writer in 0..WRITERS {
            let store = &store;
            s.spawn(move || {
                for i in 0..KEYS_PER_WRITER {
                    store.put(writer_key(writer, i), i);
                    store.put("shared", (writer, i));
                }
            });
        }
    });

    // Every put publishes exactly one version
    assert_eq!(store.version(), (WRITERS * KEYS_PER_WRITER * 2) as u64);

    for writer in 0..WRITERS {
        for i in 0..KEYS_PER_WRITER {
            assert_eq!(*store.get::<usize>(writer_key(writer, i)).unwrap(), i);
        }
    }

    // The last write to the shared key is some writer's final write
    let (_, last) = *store.get::<(usize, usize)>("shared").unwrap();
    assert_eq!(last, KEYS_PER_WRITER - 1);
}

#[test]
fn test_mixed_put_remove_matches_sequential_order() {
    let store = TrieStore::new();

    std::thread::scope(|s| {
        for writer in 0..WRITERS {
            let store = &store;
            s.spawn(move || {
                for i in 0..KEYS_PER_WRITER {
                    store.put(writer_key(writer, i), i);
                    if i % 2 == 1 {
                        assert!(store.remove(writer_key(writer, i)));
                    }
                }
            });
        }
    });

    for writer in 0..WRITERS {
        for i in 0..KEYS_PER_WRITER {
            let found = store.get::<usize>(writer_key(writer, i)).map(|g| *g);
            if i % 2 == 1 {
                assert_eq!(found, None);
            } else {
                assert_eq!(found, Some(i));
            }
        }
    }
}

// ============================================================================
// Guards Across Threads
// ============================================================================

#[test]
fn test_guard_survives_concurrent_overwrites() {
    let store = TrieStore::new();
    store.put("k", String::from("original"));
    let guard = store.get::<String>("k").unwrap();

    std::thread::scope(|s| {
        for writer in 0..WRITERS {
            let store = &store;
            s.spawn(move || {
                for i in 0..50 {
                    store.put("k", format!("{}-{}", writer, i));
                    store.remove("k");
                }
            });
        }
    });

    assert_eq!(guard.as_str(), "original");
    assert!(store.get::<String>("k").is_none());
}

#[test]
fn test_guard_can_move_to_another_thread() {
    let store = TrieStore::new();
    store.put("k", 7u64);
    let guard = store.get::<u64>("k").unwrap();
    store.put("k", 8u64);

    let seen = std::thread::spawn(move || *guard).join().unwrap();
    assert_eq!(seen, 7);
}

// ============================================================================
// Long Keys
// ============================================================================

#[test]
fn test_long_keys_on_small_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let store = TrieStore::new();
            let long_key = vec![b'k'; 100_000];

            store.put(&long_key, 1u64);
            let guard = store.get::<u64>(&long_key).unwrap();
            store.put(&long_key, 2u64);
            assert_eq!(*guard, 1);
            assert_eq!(*store.get::<u64>(&long_key).unwrap(), 2);

            assert!(store.remove(&long_key));
            assert!(store.is_empty());
            assert_eq!(*guard, 1);

            // Last owner of the superseded long chain
            drop(guard);
            store.put(&long_key, 3u64);
            drop(store);
        })
        .unwrap();
    handle.join().unwrap();
}
