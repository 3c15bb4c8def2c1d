use fibre_prefs::{ChangeListener, Editor, MemoryStore, PreferenceStore};

use std::sync::Arc;

use parking_lot::Mutex;

struct TestListener {
  name: &'static str,
  log: Arc<Mutex<Vec<String>>>,
}

impl ChangeListener for TestListener {
  fn on_change(&self, key: &str) {
    self.log.lock().push(format!("{}:{}", self.name, key));
  }
}

#[test]
fn test_listeners_run_in_registration_order() {
  let store = MemoryStore::new();
  let log = Arc::new(Mutex::new(Vec::new()));

  let first: Arc<dyn ChangeListener> = Arc::new(TestListener { name: "first", log: log.clone() });
  let second: Arc<dyn ChangeListener> = Arc::new(TestListener { name: "second", log: log.clone() });
  store.register_listener(first);
  store.register_listener(second);

  store.edit().put_int("x", 1).put_int("y", 2).commit();

  assert_eq!(
    *log.lock(),
    vec!["first:x", "first:y", "second:x", "second:y"]
  );
}

#[test]
fn test_register_twice_notifies_once() {
  let store = MemoryStore::new();
  let log = Arc::new(Mutex::new(Vec::new()));
  let listener: Arc<dyn ChangeListener> = Arc::new(TestListener { name: "l", log: log.clone() });

  store.register_listener(listener.clone());
  store.register_listener(listener.clone());
  assert_eq!(store.listener_count(), 1);

  store.edit().put_bool("k", true).commit();
  assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_unregister_stops_notifications() {
  let store = MemoryStore::new();
  let log = Arc::new(Mutex::new(Vec::new()));
  let listener: Arc<dyn ChangeListener> = Arc::new(TestListener { name: "l", log: log.clone() });

  store.register_listener(listener.clone());
  store.edit().put_int("a", 1).commit();

  store.unregister_listener(&listener);
  store.unregister_listener(&listener);
  assert_eq!(store.listener_count(), 0);

  store.edit().put_int("b", 2).commit();
  assert_eq!(*log.lock(), vec!["l:a"]);
}

#[test]
fn test_empty_commit_notifies_nothing() {
  let store = MemoryStore::new();
  let log = Arc::new(Mutex::new(Vec::new()));
  let listener: Arc<dyn ChangeListener> = Arc::new(TestListener { name: "l", log: log.clone() });
  store.register_listener(listener);

  assert!(store.edit().commit());
  assert!(log.lock().is_empty());
}
