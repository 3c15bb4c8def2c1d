//! The preference store contract.
//!
//! [`MemoryStore`](crate::memory::MemoryStore) is the reference
//! implementation. A durable store (file-backed, remote, ...) implements the
//! same two traits and can be dropped under a
//! [`PreferenceManager`](crate::PreferenceManager) unchanged.

use crate::listener::ChangeListener;
use crate::value::{PrefValue, StringSet};

use std::collections::HashMap;
use std::sync::Arc;

/// Typed key-value storage with batched edits and change notification.
///
/// All kinds share one key namespace. Reads never fail: a key that is absent
/// from the mapping of the requested kind yields the caller's default.
pub trait PreferenceStore: Send + Sync {
  /// The staging area returned by [`edit`](PreferenceStore::edit).
  type Editor: Editor;

  fn get_bool(&self, key: &str, default: bool) -> bool;
  fn get_int(&self, key: &str, default: i32) -> i32;
  fn get_long(&self, key: &str, default: i64) -> i64;
  fn get_float(&self, key: &str, default: f32) -> f32;
  fn get_string(&self, key: &str, default: Option<&str>) -> Option<String>;
  fn get_string_set(&self, key: &str, default: Option<StringSet>) -> Option<StringSet>;

  /// A merged, point-in-time copy of every stored value.
  fn get_all(&self) -> HashMap<String, PrefValue>;

  /// Returns `true` if `key` is present under any kind.
  fn contains(&self, key: &str) -> bool;

  /// Opens a new transaction over a private copy of the current state.
  ///
  /// Nothing staged on the editor is visible until it is committed.
  fn edit(&self) -> Self::Editor;

  fn register_listener(&self, listener: Arc<dyn ChangeListener>);
  fn unregister_listener(&self, listener: &Arc<dyn ChangeListener>);
}

/// A pending, all-or-nothing batch of writes against a [`PreferenceStore`].
///
/// Every staging method returns `&mut Self` so edits can be chained:
///
/// ```
/// use fibre_prefs::{Editor, MemoryStore, PreferenceStore};
///
/// let store = MemoryStore::new();
/// let committed = store.edit().put_int("x", 1).put_bool("y", true).commit();
/// assert!(committed);
/// assert_eq!(store.get_int("x", 0), 1);
/// ```
pub trait Editor: Send {
  fn put_bool(&mut self, key: &str, value: bool) -> &mut Self;
  fn put_int(&mut self, key: &str, value: i32) -> &mut Self;
  fn put_long(&mut self, key: &str, value: i64) -> &mut Self;
  fn put_float(&mut self, key: &str, value: f32) -> &mut Self;

  /// Stages a string. `None` stages removal of the string value.
  fn put_string(&mut self, key: &str, value: Option<&str>) -> &mut Self;

  /// Stages a string set. `None` stages removal of the set value.
  fn put_string_set(&mut self, key: &str, value: Option<StringSet>) -> &mut Self;

  /// Stages removal of `key` from every kind.
  fn remove(&mut self, key: &str) -> &mut Self;

  /// Stages removal of every key present when this is called.
  fn clear(&mut self) -> &mut Self;

  /// Publishes the staged state and notifies listeners.
  ///
  /// Returns `false` if the store could not persist the change. Callers of
  /// durable stores must check the result.
  fn commit(&mut self) -> bool;

  /// Same effect as [`commit`](Editor::commit), without reporting the result.
  fn apply(&mut self);
}
