//! The in-memory [`PreferenceStore`].

use crate::listener::{ChangeListener, ListenerRegistry};
use crate::store::{Editor, PreferenceStore};
use crate::value::{PrefValue, StringSet};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

type Map<V> = HashMap<String, V, ahash::RandomState>;
type KeySet = HashSet<String, ahash::RandomState>;

/// One value-type copy of every kind's mapping.
///
/// The live store holds one of these behind an `Arc`; an editor owns its own
/// clone, so staged writes never alias the live state.
#[derive(Debug, Clone, Default)]
pub(crate) struct Mappings {
  pub(crate) bools: Map<bool>,
  pub(crate) ints: Map<i32>,
  pub(crate) longs: Map<i64>,
  pub(crate) floats: Map<f32>,
  pub(crate) strings: Map<String>,
  pub(crate) string_sets: Map<StringSet>,
}

impl Mappings {
  pub(crate) fn contains(&self, key: &str) -> bool {
    self.bools.contains_key(key)
      || self.ints.contains_key(key)
      || self.longs.contains_key(key)
      || self.floats.contains_key(key)
      || self.strings.contains_key(key)
      || self.string_sets.contains_key(key)
  }

  /// Removes `key` from every mapping. Returns `true` if any held it.
  fn remove(&mut self, key: &str) -> bool {
    // Non-short-circuiting `|` so every mapping is visited.
    self.bools.remove(key).is_some()
      | self.ints.remove(key).is_some()
      | self.longs.remove(key).is_some()
      | self.floats.remove(key).is_some()
      | self.strings.remove(key).is_some()
      | self.string_sets.remove(key).is_some()
  }

  /// Every present key, each once, in mapping enumeration order.
  fn keys(&self) -> Vec<String> {
    let mut seen = KeySet::default();
    let mut keys: Vec<String> = Vec::new();
    let all = self
      .bools
      .keys()
      .chain(self.ints.keys())
      .chain(self.longs.keys())
      .chain(self.floats.keys())
      .chain(self.strings.keys())
      .chain(self.string_sets.keys());
    for key in all {
      if seen.insert(key.clone()) {
        keys.push(key.clone());
      }
    }
    keys
  }

  pub(crate) fn to_values(&self) -> HashMap<String, PrefValue> {
    let mut out = HashMap::with_capacity(self.len());
    // Later kinds win when a key is live under more than one kind.
    out.extend(self.bools.iter().map(|(k, v)| (k.clone(), PrefValue::Bool(*v))));
    out.extend(self.ints.iter().map(|(k, v)| (k.clone(), PrefValue::Int(*v))));
    out.extend(self.longs.iter().map(|(k, v)| (k.clone(), PrefValue::Long(*v))));
    out.extend(self.floats.iter().map(|(k, v)| (k.clone(), PrefValue::Float(*v))));
    out.extend(
      self
        .strings
        .iter()
        .map(|(k, v)| (k.clone(), PrefValue::String(v.clone()))),
    );
    out.extend(
      self
        .string_sets
        .iter()
        .map(|(k, v)| (k.clone(), PrefValue::StringSet(v.clone()))),
    );
    out
  }

  pub(crate) fn insert_value(&mut self, key: String, value: PrefValue) {
    match value {
      PrefValue::Bool(v) => {
        self.bools.insert(key, v);
      }
      PrefValue::Int(v) => {
        self.ints.insert(key, v);
      }
      PrefValue::Long(v) => {
        self.longs.insert(key, v);
      }
      PrefValue::Float(v) => {
        self.floats.insert(key, v);
      }
      PrefValue::String(v) => {
        self.strings.insert(key, v);
      }
      PrefValue::StringSet(v) => {
        self.string_sets.insert(key, v);
      }
    }
  }

  fn apply(&mut self, op: &Op) {
    match op {
      Op::Put(key, value) => self.insert_value(key.clone(), value.clone()),
      Op::RemoveString(key) => {
        self.strings.remove(key);
      }
      Op::RemoveStringSet(key) => {
        self.string_sets.remove(key);
      }
      Op::Remove(key) => {
        self.remove(key);
      }
      Op::Clear => *self = Mappings::default(),
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.bools.len()
      + self.ints.len()
      + self.longs.len()
      + self.floats.len()
      + self.strings.len()
      + self.string_sets.len()
  }
}

/// One staged write, replayed onto the live state at commit.
#[derive(Debug, Clone)]
enum Op {
  Put(String, PrefValue),
  RemoveString(String),
  RemoveStringSet(String),
  Remove(String),
  Clear,
}

/// State shared by every handle to one store.
pub(crate) struct StoreInner {
  /// The published state. Swapped wholesale on commit.
  pub(crate) live: RwLock<Arc<Mappings>>,
  /// Serializes commits. Held across replace and listener dispatch; reentrant
  /// so a listener may commit from inside its callback.
  commit_lock: ReentrantMutex<()>,
  listeners: ListenerRegistry,
}

/// A thread-safe, in-memory preference store.
///
/// Cloning is cheap and every clone refers to the same data and listeners.
///
/// Readers take a reference to the current published state and never block a
/// commit for longer than an `Arc` clone, so a read observes either all or
/// none of any one commit.
#[derive(Clone)]
pub struct MemoryStore {
  pub(crate) inner: Arc<StoreInner>,
}

impl fmt::Debug for MemoryStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryStore")
      .field("len", &self.len())
      .field("listeners", &self.inner.listeners.len())
      .finish()
  }
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  /// Creates a new, empty store.
  pub fn new() -> Self {
    Self::from_mappings(Mappings::default())
  }

  pub(crate) fn from_mappings(mappings: Mappings) -> Self {
    Self {
      inner: Arc::new(StoreInner {
        live: RwLock::new(Arc::new(mappings)),
        commit_lock: ReentrantMutex::new(()),
        listeners: ListenerRegistry::new(),
      }),
    }
  }

  /// The number of stored entries across all kinds.
  ///
  /// A key that is live under two kinds counts twice.
  pub fn len(&self) -> usize {
    self.current().len()
  }

  /// Returns `true` if nothing is stored.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The number of registered change listeners.
  pub fn listener_count(&self) -> usize {
    self.inner.listeners.len()
  }

  #[inline]
  pub(crate) fn current(&self) -> Arc<Mappings> {
    self.inner.live.read().clone()
  }

  fn publish(&self, ops: &[Op], changed: Vec<String>) {
    let _commit = self.inner.commit_lock.lock();
    // Replaying onto the latest state keeps concurrent single-key writers on
    // different keys from overwriting each other.
    let mut next = (*self.current()).clone();
    for op in ops {
      next.apply(op);
    }
    *self.inner.live.write() = Arc::new(next);
    tracing::trace!(changed = changed.len(), "preference commit published");
    self.inner.listeners.dispatch(&changed);
  }
}

impl PreferenceStore for MemoryStore {
  type Editor = MemoryEditor;

  fn get_bool(&self, key: &str, default: bool) -> bool {
    self.current().bools.get(key).copied().unwrap_or(default)
  }

  fn get_int(&self, key: &str, default: i32) -> i32 {
    self.current().ints.get(key).copied().unwrap_or(default)
  }

  fn get_long(&self, key: &str, default: i64) -> i64 {
    self.current().longs.get(key).copied().unwrap_or(default)
  }

  fn get_float(&self, key: &str, default: f32) -> f32 {
    self.current().floats.get(key).copied().unwrap_or(default)
  }

  fn get_string(&self, key: &str, default: Option<&str>) -> Option<String> {
    match self.current().strings.get(key) {
      Some(value) => Some(value.clone()),
      None => default.map(str::to_owned),
    }
  }

  fn get_string_set(&self, key: &str, default: Option<StringSet>) -> Option<StringSet> {
    match self.current().string_sets.get(key) {
      Some(value) => Some(value.clone()),
      None => default,
    }
  }

  fn get_all(&self) -> HashMap<String, PrefValue> {
    self.current().to_values()
  }

  fn contains(&self, key: &str) -> bool {
    self.current().contains(key)
  }

  fn edit(&self) -> MemoryEditor {
    MemoryEditor {
      store: self.clone(),
      staged: (*self.current()).clone(),
      ops: Vec::new(),
      changed: Vec::new(),
      recorded: KeySet::default(),
    }
  }

  fn register_listener(&self, listener: Arc<dyn ChangeListener>) {
    self.inner.listeners.register(listener);
  }

  fn unregister_listener(&self, listener: &Arc<dyn ChangeListener>) {
    self.inner.listeners.unregister(listener);
  }
}

/// A transaction against a [`MemoryStore`].
///
/// Holds its own copy of the store's state taken when it was opened, which
/// decides what `remove` and `clear` record as changed. Dropping it without
/// committing discards every staged change.
pub struct MemoryEditor {
  store: MemoryStore,
  staged: Mappings,
  ops: Vec<Op>,
  changed: Vec<String>,
  recorded: KeySet,
}

impl fmt::Debug for MemoryEditor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryEditor")
      .field("changed", &self.changed)
      .finish_non_exhaustive()
  }
}

impl MemoryEditor {
  /// Keys recorded as changed so far, in recording order.
  pub fn changed_keys(&self) -> &[String] {
    &self.changed
  }

  fn stage(&mut self, op: Op) {
    self.staged.apply(&op);
    self.ops.push(op);
  }

  fn mark(&mut self, key: &str) {
    if !self.recorded.contains(key) {
      self.recorded.insert(key.to_owned());
      self.changed.push(key.to_owned());
    }
  }
}

impl Editor for MemoryEditor {
  fn put_bool(&mut self, key: &str, value: bool) -> &mut Self {
    self.stage(Op::Put(key.to_owned(), PrefValue::Bool(value)));
    self.mark(key);
    self
  }

  fn put_int(&mut self, key: &str, value: i32) -> &mut Self {
    self.stage(Op::Put(key.to_owned(), PrefValue::Int(value)));
    self.mark(key);
    self
  }

  fn put_long(&mut self, key: &str, value: i64) -> &mut Self {
    self.stage(Op::Put(key.to_owned(), PrefValue::Long(value)));
    self.mark(key);
    self
  }

  fn put_float(&mut self, key: &str, value: f32) -> &mut Self {
    self.stage(Op::Put(key.to_owned(), PrefValue::Float(value)));
    self.mark(key);
    self
  }

  fn put_string(&mut self, key: &str, value: Option<&str>) -> &mut Self {
    let op = match value {
      Some(value) => Op::Put(key.to_owned(), PrefValue::String(value.to_owned())),
      None => Op::RemoveString(key.to_owned()),
    };
    self.stage(op);
    self.mark(key);
    self
  }

  fn put_string_set(&mut self, key: &str, value: Option<StringSet>) -> &mut Self {
    let op = match value {
      Some(value) => Op::Put(key.to_owned(), PrefValue::StringSet(value)),
      None => Op::RemoveStringSet(key.to_owned()),
    };
    self.stage(op);
    self.mark(key);
    self
  }

  fn remove(&mut self, key: &str) -> &mut Self {
    if self.staged.contains(key) {
      self.stage(Op::Remove(key.to_owned()));
      self.mark(key);
    }
    self
  }

  fn clear(&mut self) -> &mut Self {
    for key in self.staged.keys() {
      self.mark(&key);
    }
    self.stage(Op::Clear);
    self
  }

  fn commit(&mut self) -> bool {
    // Take the changed keys so a second commit re-applies but stays silent.
    let changed = std::mem::take(&mut self.changed);
    self.recorded.clear();
    self.store.publish(&self.ops, changed);
    true
  }

  fn apply(&mut self) {
    self.commit();
  }
}
