use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A listener that can be registered with a preference store to receive
/// notifications when keys change.
///
/// `on_change` is called synchronously from inside `commit()`/`apply()`,
/// once per changed key, after the new state has become visible to readers.
pub trait ChangeListener: Send + Sync {
  fn on_change(&self, key: &str);
}

impl<F> ChangeListener for F
where
  F: Fn(&str) + Send + Sync,
{
  fn on_change(&self, key: &str) {
    self(key)
  }
}

/// An ordered set of registered listeners.
///
/// Identity is the `Arc` allocation, so registering the same handle twice is
/// a no-op and unregistering needs the handle that was registered.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
  listeners: RwLock<Vec<Arc<dyn ChangeListener>>>,
}

impl fmt::Debug for ListenerRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ListenerRegistry")
      .field("len", &self.len())
      .finish()
  }
}

impl ListenerRegistry {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Adds `listener` unless the same handle is already registered.
  /// Returns `true` if it was added.
  pub(crate) fn register(&self, listener: Arc<dyn ChangeListener>) -> bool {
    let mut guard = self.listeners.write();
    if guard.iter().any(|l| same_listener(l, &listener)) {
      return false;
    }
    guard.push(listener);
    true
  }

  /// Removes `listener` if registered. Returns `true` if it was removed.
  pub(crate) fn unregister(&self, listener: &Arc<dyn ChangeListener>) -> bool {
    let mut guard = self.listeners.write();
    let before = guard.len();
    guard.retain(|l| !same_listener(l, listener));
    guard.len() != before
  }

  pub(crate) fn len(&self) -> usize {
    self.listeners.read().len()
  }

  /// Delivers every key to every listener: listeners in registration order,
  /// keys in the given order for each listener.
  ///
  /// Dispatch runs over a copy of the list, so a listener may register or
  /// unregister handles from inside its callback.
  pub(crate) fn dispatch(&self, keys: &[String]) {
    if keys.is_empty() {
      return;
    }
    let listeners = self.listeners.read().clone();
    for listener in listeners.iter() {
      for key in keys {
        listener.on_change(key);
      }
    }
  }
}

// Compares data pointers only; vtable pointers for the same type may differ
// across codegen units.
fn same_listener(a: &Arc<dyn ChangeListener>, b: &Arc<dyn ChangeListener>) -> bool {
  std::ptr::eq(
    Arc::as_ptr(a) as *const (),
    Arc::as_ptr(b) as *const (),
  )
}
