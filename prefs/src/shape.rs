//! Runtime shape tags for decoded values.
//!
//! The decode cache stores type-erased values. Each entry carries the
//! [`Shape`] it was decoded or written as, and a read checks the tag before
//! downcasting, so a mismatch is an ordinary `Err` rather than a panic.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Describes the static type a value was stored as.
#[derive(Clone, Copy)]
pub struct Shape {
  id: TypeId,
  name: &'static str,
}

impl Shape {
  pub fn of<T: Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  /// The Rust type name, for diagnostics only.
  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for Shape {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for Shape {}

impl fmt::Debug for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// A type-erased value together with its [`Shape`].
#[derive(Clone)]
pub(crate) struct Tagged {
  value: Arc<dyn Any + Send + Sync>,
  shape: Shape,
}

impl fmt::Debug for Tagged {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Tagged").field("shape", &self.shape).finish()
  }
}

impl Tagged {
  pub(crate) fn new<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value,
      shape: Shape::of::<T>(),
    }
  }

  /// Returns the value as `T`, or the shape it actually has.
  pub(crate) fn conform<T: Any + Send + Sync>(&self) -> Result<Arc<T>, Shape> {
    if self.shape != Shape::of::<T>() {
      return Err(self.shape);
    }
    Arc::clone(&self.value).downcast::<T>().map_err(|_| self.shape)
  }
}
