use crate::shape::Tagged;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

type Map = HashMap<String, Tagged, ahash::RandomState>;

/// Which of the two decode caches an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
  Object,
  List,
}

/// The manager's cache of decoded values, keyed by preference key.
///
/// Objects and lists live in separate maps so the same key can be cached
/// once as each. Locks are held only for the map operation itself, never
/// across codec work.
///
/// Every mutation bumps `epoch` while holding the map's write lock. A reader
/// that decoded from the store fills the cache through [`fill`](Self::fill)
/// with the epoch it saw before reading, and the fill is dropped if anything
/// changed in between.
#[derive(Default)]
pub(crate) struct DecodeCache {
  objects: RwLock<Map>,
  lists: RwLock<Map>,
  epoch: AtomicU64,
}

impl fmt::Debug for DecodeCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DecodeCache")
      .field("objects", &self.len(Slot::Object))
      .field("lists", &self.len(Slot::List))
      .finish()
  }
}

impl DecodeCache {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  fn map(&self, slot: Slot) -> &RwLock<Map> {
    match slot {
      Slot::Object => &self.objects,
      Slot::List => &self.lists,
    }
  }

  pub(crate) fn get(&self, slot: Slot, key: &str) -> Option<Tagged> {
    self.map(slot).read().get(key).cloned()
  }

  /// The current mutation epoch. Read it before loading the text a fill
  /// will be decoded from.
  pub(crate) fn epoch(&self) -> u64 {
    self.epoch.load(Ordering::Acquire)
  }

  #[inline]
  fn bump(&self) {
    self.epoch.fetch_add(1, Ordering::AcqRel);
  }

  pub(crate) fn insert(&self, slot: Slot, key: &str, value: Tagged) {
    let mut guard = self.map(slot).write();
    guard.insert(key.to_owned(), value);
    self.bump();
  }

  /// Caches a freshly decoded `value` if nothing was written or evicted since
  /// `seen`.
  ///
  /// Returns the entry already present under `key`, if any. That entry came
  /// from a write at least as new as the decoded text and should be served
  /// instead.
  pub(crate) fn fill(&self, slot: Slot, key: &str, value: Tagged, seen: u64) -> Option<Tagged> {
    let mut guard = self.map(slot).write();
    if let Some(existing) = guard.get(key) {
      return Some(existing.clone());
    }
    if self.epoch.load(Ordering::Acquire) == seen {
      guard.insert(key.to_owned(), value);
    }
    None
  }

  pub(crate) fn invalidate(&self, slot: Slot, key: &str) -> bool {
    let mut guard = self.map(slot).write();
    let removed = guard.remove(key).is_some();
    self.bump();
    removed
  }

  /// Evicts `key` from both maps.
  pub(crate) fn invalidate_all_slots(&self, key: &str) {
    self.invalidate(Slot::Object, key);
    self.invalidate(Slot::List, key);
  }

  pub(crate) fn clear(&self) {
    for slot in [Slot::Object, Slot::List] {
      let mut guard = self.map(slot).write();
      guard.clear();
      self.bump();
    }
  }

  pub(crate) fn len(&self, slot: Slot) -> usize {
    self.map(slot).read().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  #[test]
  fn test_slots_are_independent() {
    let cache = DecodeCache::new();
    cache.insert(Slot::Object, "k", Tagged::new(Arc::new(1u8)));
    cache.insert(Slot::List, "k", Tagged::new(Arc::new(vec![1u8])));

    assert!(cache.invalidate(Slot::Object, "k"));
    assert!(cache.get(Slot::Object, "k").is_none());
    assert!(cache.get(Slot::List, "k").is_some());

    let seen = cache.epoch();
    assert!(cache.fill(Slot::Object, "k", Tagged::new(Arc::new(2u8)), seen).is_none());
    let kept = cache
      .fill(Slot::Object, "k", Tagged::new(Arc::new(3u8)), cache.epoch())
      .unwrap();
    assert_eq!(*kept.conform::<u8>().unwrap(), 2);

    cache.clear();
    assert_eq!(cache.len(Slot::List), 0);
    assert_eq!(cache.len(Slot::Object), 0);
  }

  #[test]
  fn test_fill_after_eviction_is_dropped() {
    let cache = DecodeCache::new();
    let seen = cache.epoch();

    cache.invalidate(Slot::Object, "k");
    assert!(cache.fill(Slot::Object, "k", Tagged::new(Arc::new(1u8)), seen).is_none());
    assert!(cache.get(Slot::Object, "k").is_none());

    let seen = cache.epoch();
    cache.clear();
    assert!(cache.fill(Slot::List, "k", Tagged::new(Arc::new(vec![1u8])), seen).is_none());
    assert_eq!(cache.len(Slot::List), 0);
  }
}
