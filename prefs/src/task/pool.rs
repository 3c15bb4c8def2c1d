use crate::runtime::{Executor, Job};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use fibre::mpsc;
use fibre::TrySendError;

/// A fixed set of worker threads, each fed by its own bounded queue.
///
/// Jobs are dealt round-robin. A job that finds every queue full runs on a
/// freshly spawned overflow thread, so `execute` never blocks the caller.
pub struct WorkerPool {
  senders: Vec<mpsc::BoundedSender<Job>>,
  next: AtomicUsize,
  _handles: Vec<JoinHandle<()>>,
  overflow_spawned: AtomicUsize,
}

impl WorkerPool {
  /// Spawns `workers` threads with a queue of `queue_capacity` jobs each.
  ///
  /// Both arguments are clamped to at least one; the builder rejects zero
  /// before getting here.
  pub fn new(workers: usize, queue_capacity: usize) -> Self {
    let workers = workers.max(1);
    let mut senders = Vec::with_capacity(workers);
    let mut handles = Vec::with_capacity(workers);

    for index in 0..workers {
      let (tx, rx): (mpsc::BoundedSender<Job>, mpsc::BoundedReceiver<Job>) =
        mpsc::bounded(queue_capacity.max(1));

      let spawned = thread::Builder::new()
        .name(format!("fibre-prefs-worker-{}", index))
        .spawn(move || {
          // Ends once every sender is dropped and the queue is drained.
          while let Ok(job) = rx.recv() {
            job();
          }
        });

      match spawned {
        Ok(handle) => {
          senders.push(tx);
          handles.push(handle);
        }
        Err(err) => {
          tracing::warn!(index, error = %err, "failed to spawn preference worker");
        }
      }
    }

    tracing::debug!(workers = senders.len(), queue_capacity, "preference worker pool started");

    Self {
      senders,
      next: AtomicUsize::new(0),
      _handles: handles,
      overflow_spawned: AtomicUsize::new(0),
    }
  }

  /// The number of running worker threads.
  pub fn workers(&self) -> usize {
    self.senders.len()
  }

  /// How many jobs have run on overflow threads since the pool started.
  pub fn overflow_count(&self) -> usize {
    self.overflow_spawned.load(Ordering::Relaxed)
  }

  fn run_on_overflow_thread(&self, job: Job) {
    self.overflow_spawned.fetch_add(1, Ordering::Relaxed);
    tracing::debug!("preference worker queues full, spawning overflow thread");
    // `thread::spawn` only panics if the OS refuses a thread, in which case
    // there is nowhere left to run the job.
    thread::spawn(job);
  }
}

impl Executor for WorkerPool {
  fn execute(&self, job: Job) {
    let count = self.senders.len();
    if count == 0 {
      self.run_on_overflow_thread(job);
      return;
    }

    let start = self.next.fetch_add(1, Ordering::Relaxed);
    let mut job = job;
    for offset in 0..count {
      let sender = &self.senders[(start + offset) % count];
      match sender.try_send(job) {
        Ok(()) => return,
        Err(TrySendError::Full(rejected))
        | Err(TrySendError::Closed(rejected))
        | Err(TrySendError::Sent(rejected)) => {
          job = rejected;
        }
      }
    }
    self.run_on_overflow_thread(job);
  }
}

impl Drop for WorkerPool {
  fn drop(&mut self) {
    // Dropping the senders disconnects each queue; workers finish what is
    // queued and exit. They are not joined, since the last handle to the pool
    // may be dropped from inside a job.
    self.senders.clear();
  }
}
