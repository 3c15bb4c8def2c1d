/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs off the caller's thread.
///
/// The async manager operations hand their synchronous counterpart to an
/// executor as a [`Job`]. `execute` must not run the job inline and must not
/// block waiting for it.
pub trait Executor: Send + Sync + 'static {
  fn execute(&self, job: Job);
}

#[cfg(feature = "tokio")]
pub struct TokioExecutor(tokio::runtime::Handle);

#[cfg(feature = "tokio")]
impl TokioExecutor {
  /// Creates an executor that uses the current Tokio runtime context.
  /// Panics if called outside of a Tokio runtime.
  pub fn new() -> Self {
    Self(tokio::runtime::Handle::current())
  }

  /// Like [`new`](TokioExecutor::new), but returns `None` outside of a
  /// Tokio runtime.
  pub fn try_current() -> Option<Self> {
    tokio::runtime::Handle::try_current().ok().map(Self)
  }

  pub fn from_handle(handle: tokio::runtime::Handle) -> Self {
    Self(handle)
  }
}

#[cfg(feature = "tokio")]
impl Executor for TokioExecutor {
  fn execute(&self, job: Job) {
    // Codec work is CPU-bound and a durable store may block on I/O.
    self.0.spawn_blocking(job);
  }
}
