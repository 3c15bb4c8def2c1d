use crate::codec::CodecError;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A failure inside the manager, delivered to the error sink instead of
/// being returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefError {
  /// The stored text for `key` could not be decoded into the requested shape.
  #[error("failed to decode value for key '{key}': {source}")]
  Decode {
    key: String,
    #[source]
    source: CodecError,
  },
  /// The value written to `key` could not be encoded. Nothing was stored.
  #[error("failed to encode value for key '{key}': {source}")]
  Encode {
    key: String,
    #[source]
    source: CodecError,
  },
  /// The cached value for `key` was decoded as `found`, not `expected`.
  #[error("cached value for key '{key}' is a {found}, requested {expected}")]
  ShapeMismatch {
    key: String,
    expected: &'static str,
    found: &'static str,
  },
}

impl PrefError {
  /// The key the failure happened on.
  pub fn key(&self) -> &str {
    match self {
      PrefError::Decode { key, .. }
      | PrefError::Encode { key, .. }
      | PrefError::ShapeMismatch { key, .. } => key,
    }
  }
}

/// A callback receiving every [`PrefError`], invoked synchronously on the
/// thread where the failure happened. It must not panic.
pub type ErrorSink = Arc<dyn Fn(&PrefError) + Send + Sync>;

/// Errors that can occur when building a manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The worker pool was configured with zero workers.
  ZeroWorkers,
  /// The worker pool was configured with a zero-length queue.
  ZeroQueueCapacity,
  /// `tokio_executor()` was requested outside of a Tokio runtime.
  NoTokioRuntime,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroWorkers => write!(f, "worker pool size cannot be zero"),
      BuildError::ZeroQueueCapacity => write!(f, "worker queue capacity cannot be zero"),
      BuildError::NoTokioRuntime => write!(
        f,
        "a tokio executor requires a running tokio runtime"
      ),
    }
  }
}

impl std::error::Error for BuildError {}
