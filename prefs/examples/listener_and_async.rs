use fibre_prefs::{ChangeListener, MemoryStore, PreferenceManager, PreferenceStore};
use serde::{Deserialize, Serialize};
use std::sync::{mpsc, Arc};

#[derive(Debug, Serialize, Deserialize)]
struct Account {
  user: String,
  plan: String,
}

fn main() {
  let store = MemoryStore::new();
  let listener: Arc<dyn ChangeListener> = Arc::new(|key: &str| println!("changed: {}", key));
  store.register_listener(listener);

  let prefs = PreferenceManager::builder(store)
    .error_sink(|err| eprintln!("preference error: {}", err))
    .workers(2)
    .build()
    .expect("valid configuration");

  prefs.set_int("launch_count", prefs.get_int("launch_count", 0) + 1);

  let (tx, rx) = mpsc::channel();
  prefs.set_object_async(
    "account",
    Some(Account {
      user: "ada".to_string(),
      plan: "pro".to_string(),
    }),
    move || tx.send(()).unwrap(),
  );
  rx.recv().unwrap();

  let account = prefs.get_object::<Account>("account", None);
  println!("account: {:?}", account);

  // Reading the same key as another shape reports an error and falls back.
  let wrong = prefs.get_object::<Vec<u32>>("account", Some(vec![]));
  println!("as a list of numbers: {:?}", wrong);

  println!("{:?}", prefs.metrics());
}
