use fibre_prefs::{ChangeListener, Editor, MemoryStore, PreferenceStore};

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

// Records every key it is notified about.
fn recording_listener(store: &MemoryStore) -> Arc<Mutex<Vec<String>>> {
  let seen = Arc::new(Mutex::new(Vec::new()));
  let sink = seen.clone();
  let listener: Arc<dyn ChangeListener> = Arc::new(move |key: &str| sink.lock().push(key.to_string()));
  store.register_listener(listener);
  seen
}

#[test]
fn test_uncommitted_editor_has_no_effect() {
  let store = MemoryStore::new();
  let seen = recording_listener(&store);

  {
    let mut editor = store.edit();
    editor.put_int("x", 1).put_bool("y", true);
    assert!(!store.contains("x"), "staged writes must not be visible");
  }

  assert!(store.is_empty());
  assert!(seen.lock().is_empty());
}

#[test]
fn test_put_put_remove_commit() {
  let store = MemoryStore::new();
  let seen = recording_listener(&store);

  let committed = store
    .edit()
    .put_int("x", 1)
    .put_int("y", 2)
    .remove("x")
    .commit();

  assert!(committed);
  assert_eq!(*seen.lock(), vec!["x".to_string(), "y".to_string()]);
  assert!(!store.contains("x"));
  assert_eq!(store.get_int("y", 0), 2);
}

#[test]
fn test_remove_of_absent_key_is_not_recorded() {
  let store = MemoryStore::new();
  let seen = recording_listener(&store);

  let mut editor = store.edit();
  editor.remove("ghost");
  assert!(editor.changed_keys().is_empty());
  editor.commit();

  assert!(seen.lock().is_empty());
}

#[test]
fn test_clear_notifies_every_existing_key() {
  let store = MemoryStore::new();
  store
    .edit()
    .put_int("a", 1)
    .put_string("b", Some("two"))
    .put_bool("c", true)
    .commit();
  let seen = recording_listener(&store);

  store.edit().clear().commit();

  let notified: HashSet<String> = seen.lock().iter().cloned().collect();
  let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
  assert_eq!(seen.lock().len(), 3);
  assert_eq!(notified, expected);
  assert!(store.get_all().is_empty());
}

#[test]
fn test_put_after_clear_survives() {
  let store = MemoryStore::new();
  store.edit().put_int("old", 1).commit();

  store.edit().clear().put_int("new", 2).commit();

  assert!(!store.contains("old"));
  assert_eq!(store.get_int("new", 0), 2);
}

#[test]
fn test_double_commit_notifies_once() {
  let store = MemoryStore::new();
  let seen = recording_listener(&store);

  let mut editor = store.edit();
  editor.put_int("x", 1);
  assert!(editor.commit());
  assert!(editor.commit());
  editor.apply();

  assert_eq!(*seen.lock(), vec!["x".to_string()]);
  assert_eq!(store.get_int("x", 0), 1);
}

#[test]
fn test_apply_matches_commit() {
  let store = MemoryStore::new();
  let seen = recording_listener(&store);

  store.edit().put_float("f", 0.5).apply();

  assert_eq!(store.get_float("f", 0.0), 0.5);
  assert_eq!(*seen.lock(), vec!["f".to_string()]);
}

#[test]
fn test_repeated_key_is_recorded_once_in_first_position() {
  let store = MemoryStore::new();
  let seen = recording_listener(&store);

  store
    .edit()
    .put_int("a", 1)
    .put_int("b", 1)
    .put_int("a", 2)
    .commit();

  assert_eq!(*seen.lock(), vec!["a".to_string(), "b".to_string()]);
  assert_eq!(store.get_int("a", 0), 2);
}

#[test]
fn test_listener_can_commit_from_callback() {
  let store = MemoryStore::new();
  let inner = store.clone();
  let listener: Arc<dyn ChangeListener> = Arc::new(move |key: &str| {
    if key == "trigger" {
      inner.edit().put_bool("reacted", true).commit();
    }
  });
  store.register_listener(listener);

  store.edit().put_int("trigger", 1).commit();

  assert!(store.get_bool("reacted", false));
  assert_eq!(store.get_int("trigger", 0), 1);
}

#[test]
fn test_listener_sees_committed_state() {
  let store = MemoryStore::new();
  let reader = store.clone();
  let observed = Arc::new(Mutex::new(None));
  let slot = observed.clone();
  let listener: Arc<dyn ChangeListener> = Arc::new(move |key: &str| {
    *slot.lock() = Some(reader.get_int(key, -1));
  });
  store.register_listener(listener);

  store.edit().put_int("v", 9).commit();
  assert_eq!(*observed.lock(), Some(9));
}

#[test]
fn test_concurrent_writers_on_distinct_keys_keep_all_writes() {
  let store = MemoryStore::new();
  let threads: Vec<_> = (0..8)
    .map(|t| {
      let store = store.clone();
      thread::spawn(move || {
        for i in 0..50 {
          store.edit().put_int(&format!("t{}-{}", t, i), i).apply();
        }
      })
    })
    .collect();
  for handle in threads {
    handle.join().unwrap();
  }

  assert_eq!(store.len(), 8 * 50);
  assert_eq!(store.get_int("t3-49", 0), 49);
}

#[test]
fn test_readers_never_see_a_partial_commit() {
  let store = MemoryStore::new();
  store.edit().put_int("a", 0).put_int("b", 0).commit();

  let writer = {
    let store = store.clone();
    thread::spawn(move || {
      for i in 1..=500 {
        store.edit().put_int("a", i).put_int("b", i).commit();
      }
    })
  };

  let reader = {
    let store = store.clone();
    thread::spawn(move || {
      for _ in 0..2000 {
        let all = store.get_all();
        assert_eq!(all.get("a"), all.get("b"), "torn read: {:?}", all);
      }
    })
  };

  writer.join().unwrap();
  reader.join().unwrap();
  assert_eq!(store.get_int("a", 0), 500);
}
