use crate::cache::DecodeCache;
use crate::codec::{Codec, JsonCodec};
use crate::error::{BuildError, ErrorSink, PrefError};
use crate::manager::PreferenceManager;
use crate::metrics::Metrics;
use crate::runtime::Executor;
use crate::shared::ManagerShared;
use crate::store::PreferenceStore;
use crate::task::pool::WorkerPool;

use core::fmt;
use std::sync::Arc;

/// The default number of jobs each worker may have queued.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// A builder for creating [`PreferenceManager`] instances.
pub struct ManagerBuilder<S, C = JsonCodec> {
  store: S,
  codec: C,
  error_sink: Option<ErrorSink>,
  executor: Option<Arc<dyn Executor>>,
  workers: usize,
  queue_capacity: usize,
  #[cfg(feature = "tokio")]
  use_tokio: bool,
}

impl<S, C> fmt::Debug for ManagerBuilder<S, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ManagerBuilder")
      .field("workers", &self.workers)
      .field("queue_capacity", &self.queue_capacity)
      .field("has_error_sink", &self.error_sink.is_some())
      .field("has_executor", &self.executor.is_some())
      .finish_non_exhaustive()
  }
}

impl<S: PreferenceStore> ManagerBuilder<S, JsonCodec> {
  /// Creates a builder over `store` with default settings: the JSON codec,
  /// no error sink, and a worker pool sized to the machine.
  pub fn new(store: S) -> Self {
    Self {
      store,
      codec: JsonCodec,
      error_sink: None,
      executor: None,
      workers: num_cpus::get().clamp(1, 4),
      queue_capacity: DEFAULT_QUEUE_CAPACITY,
      #[cfg(feature = "tokio")]
      use_tokio: false,
    }
  }
}

impl<S: PreferenceStore, C: Codec> ManagerBuilder<S, C> {
  /// Replaces the codec used for objects and lists.
  pub fn codec<C2: Codec>(self, codec: C2) -> ManagerBuilder<S, C2> {
    ManagerBuilder {
      store: self.store,
      codec,
      error_sink: self.error_sink,
      executor: self.executor,
      workers: self.workers,
      queue_capacity: self.queue_capacity,
      #[cfg(feature = "tokio")]
      use_tokio: self.use_tokio,
    }
  }

  /// Sets the callback that receives decode, encode and shape failures.
  pub fn error_sink<F>(mut self, sink: F) -> Self
  where
    F: Fn(&PrefError) + Send + Sync + 'static,
  {
    self.error_sink = Some(Arc::new(sink));
    self
  }

  /// Sets the number of worker threads for async operations.
  ///
  /// Ignored when a custom executor is supplied.
  pub fn workers(mut self, workers: usize) -> Self {
    self.workers = workers;
    self
  }

  /// Sets how many jobs each worker may have queued before new jobs spill to
  /// overflow threads.
  pub fn queue_capacity(mut self, capacity: usize) -> Self {
    self.queue_capacity = capacity;
    self
  }

  /// Runs async operations on `executor` instead of a private worker pool.
  pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
    self.executor = Some(executor);
    self
  }

  /// Runs async operations on the current Tokio runtime's blocking pool.
  ///
  /// `build()` fails with [`BuildError::NoTokioRuntime`] outside a runtime.
  #[cfg(feature = "tokio")]
  pub fn tokio_executor(mut self) -> Self {
    self.use_tokio = true;
    self
  }

  /// Builds the manager.
  pub fn build(mut self) -> Result<PreferenceManager<S, C>, BuildError> {
    self.validate()?;

    #[cfg(feature = "tokio")]
    {
      if self.use_tokio && self.executor.is_none() {
        let executor =
          crate::runtime::TokioExecutor::try_current().ok_or(BuildError::NoTokioRuntime)?;
        self.executor = Some(Arc::new(executor));
      }
    }

    Ok(self.assemble())
  }

  /// Validates the builder configuration.
  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    if self.executor.is_some() {
      return Ok(());
    }
    #[cfg(feature = "tokio")]
    {
      if self.use_tokio {
        return Ok(());
      }
    }
    if self.workers == 0 {
      return Err(BuildError::ZeroWorkers);
    }
    if self.queue_capacity == 0 {
      return Err(BuildError::ZeroQueueCapacity);
    }
    Ok(())
  }

  /// Constructs the manager without validation. Zero sizes are clamped.
  pub(crate) fn assemble(self) -> PreferenceManager<S, C> {
    let executor = match self.executor {
      Some(executor) => executor,
      None => Arc::new(WorkerPool::new(self.workers, self.queue_capacity)),
    };

    PreferenceManager {
      shared: Arc::new(ManagerShared {
        store: self.store,
        codec: self.codec,
        cache: DecodeCache::new(),
        metrics: Metrics::new(),
        error_sink: self.error_sink,
        executor,
      }),
    }
  }
}
