use crate::cache::{DecodeCache, Slot};
use crate::codec::Codec;
use crate::error::{ErrorSink, PrefError};
use crate::metrics::Metrics;
use crate::runtime::Executor;
use crate::shape::{Shape, Tagged};
use crate::store::{Editor, PreferenceStore};

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// The internal, thread-safe core of a manager.
pub(crate) struct ManagerShared<S, C> {
  pub(crate) store: S,
  pub(crate) codec: C,
  pub(crate) cache: DecodeCache,
  pub(crate) metrics: Metrics,
  pub(crate) error_sink: Option<ErrorSink>,
  pub(crate) executor: Arc<dyn Executor>,
}

impl<S, C> fmt::Debug for ManagerShared<S, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ManagerShared")
      .field("cache", &self.cache)
      .field("has_error_sink", &self.error_sink.is_some())
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<S: PreferenceStore, C: Codec> ManagerShared<S, C> {
  /// Logs `err` and hands it to the sink, if any.
  pub(crate) fn report(&self, err: PrefError) {
    tracing::warn!(key = err.key(), error = %err, "preference operation failed");
    if let Some(sink) = &self.error_sink {
      sink(&err);
    }
  }

  /// Reads the decoded value for `key` from `slot`.
  ///
  /// `None` means the caller's default applies: the key is absent, its text
  /// failed to decode, or the cached value has another shape. Failures have
  /// already been reported.
  pub(crate) fn read<T>(&self, slot: Slot, key: &str) -> Option<Arc<T>>
  where
    T: DeserializeOwned + Send + Sync + 'static,
  {
    if let Some(tagged) = self.cache.get(slot, key) {
      Metrics::incr(&self.metrics.hits);
      return match tagged.conform::<T>() {
        Ok(value) => Some(value),
        Err(found) => {
          Metrics::incr(&self.metrics.shape_mismatches);
          self.report(PrefError::ShapeMismatch {
            key: key.to_owned(),
            expected: Shape::of::<T>().name(),
            found: found.name(),
          });
          None
        }
      };
    }

    Metrics::incr(&self.metrics.misses);
    tracing::trace!(key, "decode cache miss");
    // Taken before the store read so a write or eviction after it voids the fill.
    let seen = self.cache.epoch();
    let text = self.store.get_string(key, None)?;

    Metrics::incr(&self.metrics.decodes);
    match self.codec.decode::<T>(&text) {
      Ok(value) => {
        let value = Arc::new(value);
        match self.cache.fill(slot, key, Tagged::new(Arc::clone(&value)), seen) {
          Some(newer) => {
            tracing::trace!(key, "decode raced with a write, serving the cached value");
            Some(newer.conform::<T>().unwrap_or(value))
          }
          None => Some(value),
        }
      }
      Err(source) => {
        Metrics::incr(&self.metrics.decode_failures);
        self.report(PrefError::Decode {
          key: key.to_owned(),
          source,
        });
        None
      }
    }
  }

  /// Caches `value` under `key` in `slot`, then stores its encoding.
  ///
  /// `None`, or a value that fails to encode, clears the stored string.
  pub(crate) fn write<T>(&self, slot: Slot, key: &str, value: Option<T>)
  where
    T: Serialize + Send + Sync + 'static,
  {
    let evicting = value.is_none();
    let text = match value {
      Some(value) => {
        let value = Arc::new(value);
        self.cache.insert(slot, key, Tagged::new(Arc::clone(&value)));

        Metrics::incr(&self.metrics.encodes);
        match self.codec.encode(&*value) {
          Ok(text) => Some(text),
          Err(source) => {
            Metrics::incr(&self.metrics.encode_failures);
            self.report(PrefError::Encode {
              key: key.to_owned(),
              source,
            });
            None
          }
        }
      }
      None => {
        self.cache.invalidate(slot, key);
        None
      }
    };

    self.store.edit().put_string(key, text.as_deref()).apply();
    if evicting {
      // Voids fills by readers that loaded the text before it was cleared.
      self.cache.invalidate(slot, key);
    }
  }

  pub(crate) fn remove(&self, key: &str) {
    self.store.edit().remove(key).apply();
    self.cache.invalidate_all_slots(key);
  }

  pub(crate) fn clear(&self) {
    self.store.edit().clear().apply();
    self.cache.clear();
  }
}
