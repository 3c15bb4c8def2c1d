use crate::memory::{Mappings, MemoryStore};
use crate::value::PrefValue;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A serializable, point-in-time copy of a [`MemoryStore`]'s data.
///
/// Created with [`MemoryStore::to_snapshot()`] and restored with
/// [`MemoryStore::from_snapshot()`]. It implements `Serialize` and
/// `Deserialize`, so any `serde` format can persist it between runs.
///
/// Entries are grouped by kind, which keeps a key that is live under two
/// kinds at once intact across a save and restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
  pub(crate) entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SnapshotEntry {
  pub(crate) key: String,
  pub(crate) value: PrefValue,
}

impl StoreSnapshot {
  /// The number of entries in the snapshot.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterates over the captured `(key, value)` pairs.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &PrefValue)> {
    self.entries.iter().map(|e| (e.key.as_str(), &e.value))
  }

  fn from_mappings(m: &Mappings) -> Self {
    let mut entries = Vec::with_capacity(m.len());
    push_sorted(&mut entries, &m.bools, PrefValue::Bool);
    push_sorted(&mut entries, &m.ints, PrefValue::Int);
    push_sorted(&mut entries, &m.longs, PrefValue::Long);
    push_sorted(&mut entries, &m.floats, PrefValue::Float);
    push_sorted(&mut entries, &m.strings, PrefValue::String);
    push_sorted(&mut entries, &m.string_sets, PrefValue::StringSet);
    Self { entries }
  }
}

fn push_sorted<V: Clone>(
  out: &mut Vec<SnapshotEntry>,
  map: &HashMap<String, V, ahash::RandomState>,
  wrap: fn(V) -> PrefValue,
) {
  let ordered: BTreeMap<&String, &V> = map.iter().collect();
  out.extend(ordered.into_iter().map(|(key, value)| SnapshotEntry {
    key: key.clone(),
    value: wrap(value.clone()),
  }));
}

impl MemoryStore {
  /// Captures the current state into a serializable snapshot.
  ///
  /// Entries are ordered by kind, then by key, so equal stores produce equal
  /// snapshots.
  pub fn to_snapshot(&self) -> StoreSnapshot {
    StoreSnapshot::from_mappings(&self.current())
  }

  /// Creates a new store pre-populated from `snapshot`.
  ///
  /// No listeners are registered and none are notified.
  pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
    let mut mappings = Mappings::default();
    for entry in snapshot.entries {
      mappings.insert_value(entry.key, entry.value);
    }
    tracing::debug!(entries = mappings.len(), "preference store restored from snapshot");
    MemoryStore::from_mappings(mappings)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Editor, PreferenceStore};

  #[test]
  fn test_snapshot_keeps_key_live_under_two_kinds() {
    let store = MemoryStore::new();
    store.edit().put_int("k", 1).put_string("k", Some("one")).commit();

    let restored = MemoryStore::from_snapshot(store.to_snapshot());
    assert_eq!(restored.get_int("k", 0), 1);
    assert_eq!(restored.get_string("k", None).as_deref(), Some("one"));
    assert_eq!(restored.to_snapshot().len(), 2);
  }

  #[test]
  fn test_snapshot_json_shape() {
    let store = MemoryStore::new();
    store.edit().put_bool("flag", true).commit();

    let json = serde_json::to_string(&store.to_snapshot()).unwrap();
    assert_eq!(json, r#"{"entries":[{"key":"flag","value":{"kind":"bool","value":true}}]}"#);
  }
}
