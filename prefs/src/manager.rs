use crate::builder::ManagerBuilder;
use crate::cache::Slot;
use crate::codec::{Codec, JsonCodec};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::shared::ManagerShared;
use crate::store::{Editor, PreferenceStore};
use crate::value::{PrefValue, StringSet};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed, cached access to a [`PreferenceStore`].
///
/// Primitive accessors pass straight through to the store. Structured
/// objects and lists are stored as codec-encoded strings and kept decoded in
/// an in-memory cache, so repeated reads of an unchanged key never touch the
/// codec.
///
/// Nothing here returns an error. Decode, encode and shape failures are
/// reported to the configured error sink and answered with the caller's
/// default.
///
/// Cloning is cheap; every clone shares the same store, cache and executor.
/// The cache only stays coherent for writes made through the manager.
pub struct PreferenceManager<S, C = JsonCodec> {
  pub(crate) shared: Arc<ManagerShared<S, C>>,
}

impl<S, C> Clone for PreferenceManager<S, C> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<S, C> fmt::Debug for PreferenceManager<S, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PreferenceManager")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<S: PreferenceStore> PreferenceManager<S, JsonCodec> {
  /// Creates a manager over `store` with the JSON codec, no error sink and a
  /// default worker pool.
  pub fn new(store: S) -> Self {
    ManagerBuilder::new(store).assemble()
  }

  /// Starts configuring a manager over `store`.
  pub fn builder(store: S) -> ManagerBuilder<S, JsonCodec> {
    ManagerBuilder::new(store)
  }
}

impl<S: PreferenceStore, C: Codec> PreferenceManager<S, C> {
  /// The underlying store, e.g. for registering change listeners.
  pub fn store(&self) -> &S {
    &self.shared.store
  }

  pub fn codec(&self) -> &C {
    &self.shared.codec
  }

  /// Returns a snapshot of the manager's metrics.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }

  // --- Primitives ---

  pub fn get_bool(&self, key: &str, default: bool) -> bool {
    self.shared.store.get_bool(key, default)
  }

  pub fn set_bool(&self, key: &str, value: bool) {
    self.shared.store.edit().put_bool(key, value).apply();
  }

  pub fn get_int(&self, key: &str, default: i32) -> i32 {
    self.shared.store.get_int(key, default)
  }

  pub fn set_int(&self, key: &str, value: i32) {
    self.shared.store.edit().put_int(key, value).apply();
  }

  pub fn get_long(&self, key: &str, default: i64) -> i64 {
    self.shared.store.get_long(key, default)
  }

  pub fn set_long(&self, key: &str, value: i64) {
    self.shared.store.edit().put_long(key, value).apply();
  }

  pub fn get_float(&self, key: &str, default: f32) -> f32 {
    self.shared.store.get_float(key, default)
  }

  pub fn set_float(&self, key: &str, value: f32) {
    self.shared.store.edit().put_float(key, value).apply();
  }

  pub fn get_string(&self, key: &str, default: Option<&str>) -> Option<String> {
    self.shared.store.get_string(key, default)
  }

  /// Stores a string. `None` clears the key's string value.
  ///
  /// Any value decoded from the key's old text is evicted from the cache.
  pub fn set_string(&self, key: &str, value: Option<&str>) {
    self.shared.store.edit().put_string(key, value).apply();
    self.shared.cache.invalidate_all_slots(key);
  }

  pub fn get_string_set(&self, key: &str, default: Option<StringSet>) -> Option<StringSet> {
    self.shared.store.get_string_set(key, default)
  }

  pub fn set_string_set(&self, key: &str, value: Option<StringSet>) {
    self.shared.store.edit().put_string_set(key, value).apply();
  }

  // --- Structured values ---

  /// Reads a structured value.
  ///
  /// Served from the decode cache when possible. On a miss the stored text
  /// is decoded as `T` and cached. Returns `default` when the key is absent,
  /// the text fails to decode, or the cached value is not a `T`.
  pub fn get_object<T>(&self, key: &str, default: Option<T>) -> Option<Arc<T>>
  where
    T: DeserializeOwned + Send + Sync + 'static,
  {
    self
      .shared
      .read::<T>(Slot::Object, key)
      .or_else(|| default.map(Arc::new))
  }

  /// Writes a structured value, or clears it with `None`.
  ///
  /// The cache is updated before the store, so a read racing this call may
  /// already see the new value. A value that fails to encode clears the
  /// stored text.
  pub fn set_object<T>(&self, key: &str, value: Option<T>)
  where
    T: Serialize + Send + Sync + 'static,
  {
    self.shared.write(Slot::Object, key, value);
  }

  /// Reads a list of `T`. Behaves like [`get_object`](Self::get_object)
  /// against a separate list cache.
  pub fn get_list<T>(&self, key: &str, default: Option<Vec<T>>) -> Option<Arc<Vec<T>>>
  where
    T: DeserializeOwned + Send + Sync + 'static,
  {
    self
      .shared
      .read::<Vec<T>>(Slot::List, key)
      .or_else(|| default.map(Arc::new))
  }

  /// Writes a list of `T`, or clears it with `None`.
  pub fn set_list<T>(&self, key: &str, value: Option<Vec<T>>)
  where
    T: Serialize + Send + Sync + 'static,
  {
    self.shared.write(Slot::List, key, value);
  }

  // --- Whole-store operations ---

  /// Removes `key` from the store and from both decode caches.
  pub fn remove(&self, key: &str) {
    self.shared.remove(key);
  }

  /// Removes every key from the store and empties both decode caches.
  pub fn clear_data(&self) {
    self.shared.clear();
  }

  /// Every stored value. Decoded cache entries are not included; they are a
  /// view over stored strings.
  pub fn get_all(&self) -> HashMap<String, PrefValue> {
    self.shared.store.get_all()
  }

  pub fn contains(&self, key: &str) -> bool {
    self.shared.store.contains(key)
  }
}

// --- Async variants ---
// Each submits its synchronous counterpart to the executor and returns at
// once. The callback runs on the executor's thread after the operation.
impl<S, C> PreferenceManager<S, C>
where
  S: PreferenceStore + 'static,
  C: Codec,
{
  fn submit(&self, op: impl FnOnce(&Self) + Send + 'static) {
    Metrics::incr(&self.shared.metrics.async_submitted);
    let manager = self.clone();
    self.shared.executor.execute(Box::new(move || {
      op(&manager);
      Metrics::incr(&manager.shared.metrics.async_completed);
    }));
  }

  /// Runs [`get_object`](Self::get_object) in the background and passes the
  /// result to `callback`.
  pub fn get_object_async<T, F>(&self, key: &str, default: Option<T>, callback: F)
  where
    T: DeserializeOwned + Send + Sync + 'static,
    F: FnOnce(Option<Arc<T>>) + Send + 'static,
  {
    let key = key.to_owned();
    self.submit(move |manager| callback(manager.get_object(&key, default)));
  }

  /// Runs [`set_object`](Self::set_object) in the background, then calls
  /// `callback`.
  pub fn set_object_async<T, F>(&self, key: &str, value: Option<T>, callback: F)
  where
    T: Serialize + Send + Sync + 'static,
    F: FnOnce() + Send + 'static,
  {
    let key = key.to_owned();
    self.submit(move |manager| {
      manager.set_object(&key, value);
      callback();
    });
  }

  /// Runs [`get_list`](Self::get_list) in the background and passes the
  /// result to `callback`.
  pub fn get_list_async<T, F>(&self, key: &str, default: Option<Vec<T>>, callback: F)
  where
    T: DeserializeOwned + Send + Sync + 'static,
    F: FnOnce(Option<Arc<Vec<T>>>) + Send + 'static,
  {
    let key = key.to_owned();
    self.submit(move |manager| callback(manager.get_list(&key, default)));
  }

  /// Runs [`set_list`](Self::set_list) in the background, then calls
  /// `callback`.
  pub fn set_list_async<T, F>(&self, key: &str, value: Option<Vec<T>>, callback: F)
  where
    T: Serialize + Send + Sync + 'static,
    F: FnOnce() + Send + 'static,
  {
    let key = key.to_owned();
    self.submit(move |manager| {
      manager.set_list(&key, value);
      callback();
    });
  }
}
