//! Integration tests for the before/after write notifications.


use std::sync::Arc;
use std::thread;

use keyed_store::{KeyedStore, ListenerError, StoreError};
use support::{item, Item, Log};

#[test]
fn same_record_twice_notifies_twice() {
    let store = KeyedStore::<Item>::new();
    let log = Log::default();
    {
        let log = log.clone();
        let _ = store.on_after_add(move |event| {
            log.push(event.value.id.clone());
            Ok(())
        });
    }

    store.set(item("a", 1)).unwrap();
    store.set(item("a", 1)).unwrap();

    assert_eq!(store.get("a").unwrap(), Some(item("a", 1)));
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(log.entries(), vec!["a", "a"]);
}

#[test]
fn before_runs_ahead_of_write_and_after_follows_it() {
    let store = Arc::new(KeyedStore::<Item>::new());
    let log = Log::default();
    {
        let (log, inner) = (log.clone(), Arc::clone(&store));
        let _ = store.on_before_add(move |event| {
            let stored = inner.get(&event.new_value.id)?;
            log.push(format!(
                "before prev={:?} new={} stored={:?}",
                event.current.as_ref().map(|i| i.score),
                event.new_value.score,
                stored.map(|i| i.score)
            ));
            Ok(())
        });
    }
    {
        let (log, inner) = (log.clone(), Arc::clone(&store));
        let _ = store.on_after_add(move |event| {
            let stored = inner.get(&event.value.id)?;
            log.push(format!(
                "after value={} stored={:?}",
                event.value.score,
                stored.map(|i| i.score)
            ));
            Ok(())
        });
    }

    store.set(item("a", 1)).unwrap();
    store.set(item("a", 2)).unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "before prev=None new=1 stored=None",
            "after value=1 stored=Some(1)",
            "before prev=Some(1) new=2 stored=Some(1)",
            "after value=2 stored=Some(2)",
        ]
    );
}

#[test]
fn cancelled_listener_stops_receiving() {
    let store = KeyedStore::<Item>::new();
    let log = Log::default();

    let first = {
        let log = log.clone();
        store.on_after_add(move |event| {
            log.push(format!("first:{}", event.value.id));
            Ok(())
        })
    };
    let _second = {
        let log = log.clone();
        store.on_after_add(move |event| {
            log.push(format!("second:{}", event.value.id));
            Ok(())
        })
    };

    store.set(item("a", 1)).unwrap();
    first.cancel();
    first.cancel();
    store.set(item("b", 1)).unwrap();

    assert_eq!(
        log.entries(),
        vec!["first:a", "second:a", "second:b"]
    );
}

#[test]
fn veto_blocks_write_and_after_event() {
    let store = KeyedStore::<Item>::new();
    let log = Log::default();

    let _ = store.on_before_add(|event| {
        if event.new_value.id.starts_with("banned") {
            return Err(ListenerError::new("id is banned"));
        }
        Ok(())
    });
    {
        let log = log.clone();
        let _ = store.on_after_add(move |event| {
            log.push(event.value.id.clone());
            Ok(())
        });
    }

    store.set(item("ok", 1)).unwrap();
    let err = store.set(item("banned-1", 1)).unwrap_err();

    assert_eq!(
        err,
        StoreError::Rejected {
            id: "banned-1".into(),
            reason: "id is banned".into(),
        }
    );
    assert!(!store.contains("banned-1").unwrap());
    assert_eq!(log.entries(), vec!["ok"]);
}

#[test]
fn cancelling_the_veto_lets_writes_through() {
    let store = KeyedStore::<Item>::new();
    let veto = store.on_before_add(|_| Err("read only".into()));

    assert!(store.set(item("a", 1)).is_err());
    veto.cancel();
    store.set(item("a", 1)).unwrap();

    assert!(store.contains("a").unwrap());
}

#[test]
fn listener_may_write_back_into_the_store() {
    let store = Arc::new(KeyedStore::<Item>::new());
    {
        let inner = Arc::clone(&store);
        let _ = store.on_after_add(move |event| {
            if !event.value.id.ends_with("-shadow") {
                inner.set(item(&format!("{}-shadow", event.value.id), -event.value.score))?;
            }
            Ok(())
        });
    }

    store.set(item("a", 3)).unwrap();

    assert_eq!(store.ids().unwrap(), vec!["a", "a-shadow"]);
    assert_eq!(store.get("a-shadow").unwrap().unwrap().score, -3);
}

#[test]
fn visit_covers_every_id_once() {
    let store = KeyedStore::<Item>::new();
    for (id, score) in [("x", 1), ("y", 2), ("x", 3), ("z", 4)] {
        store.set(item(id, score)).unwrap();
    }

    let mut seen = Vec::new();
    store.visit(|i| seen.push((i.id.clone(), i.score))).unwrap();

    assert_eq!(
        seen,
        vec![
            ("x".to_string(), 3),
            ("y".to_string(), 2),
            ("z".to_string(), 4)
        ]
    );
}

#[test]
fn writers_on_many_threads() {
    let store = Arc::new(KeyedStore::<Item>::new());
    let log = Log::default();
    {
        let log = log.clone();
        let _ = store.on_after_add(move |event| {
            log.push(event.value.id.clone());
            Ok(())
        });
    }

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..25 {
                    store.set(item(&format!("w{}-{}", worker, n), n)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), 100);
    assert_eq!(log.entries().len(), 100);

    let mut visited = 0;
    store.visit(|_| visited += 1).unwrap();
    assert_eq!(visited, 100);
}
