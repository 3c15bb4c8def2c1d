use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the manager.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub struct Metrics {
  // --- Decode cache ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,

  // --- Codec work ---
  pub(crate) decodes: CachePadded<AtomicU64>,
  pub(crate) encodes: CachePadded<AtomicU64>,

  // --- Failures ---
  pub(crate) decode_failures: CachePadded<AtomicU64>,
  pub(crate) encode_failures: CachePadded<AtomicU64>,
  pub(crate) shape_mismatches: CachePadded<AtomicU64>,

  // --- Background work ---
  pub(crate) async_submitted: CachePadded<AtomicU64>,
  pub(crate) async_completed: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      decodes: CachePadded::new(AtomicU64::new(0)),
      encodes: CachePadded::new(AtomicU64::new(0)),
      decode_failures: CachePadded::new(AtomicU64::new(0)),
      encode_failures: CachePadded::new(AtomicU64::new(0)),
      shape_mismatches: CachePadded::new(AtomicU64::new(0)),
      async_submitted: CachePadded::new(AtomicU64::new(0)),
      async_completed: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn incr(counter: &CachePadded<AtomicU64>) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + misses;

    MetricsSnapshot {
      hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      decodes: self.decodes.load(Ordering::Relaxed),
      encodes: self.encodes.load(Ordering::Relaxed),
      decode_failures: self.decode_failures.load(Ordering::Relaxed),
      encode_failures: self.encode_failures.load(Ordering::Relaxed),
      shape_mismatches: self.shape_mismatches.load(Ordering::Relaxed),
      async_submitted: self.async_submitted.load(Ordering::Relaxed),
      async_completed: self.async_completed.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of a manager's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// Object/list reads answered from the decode cache (shape mismatches included).
  pub hits: u64,
  /// Object/list reads that went to the store.
  pub misses: u64,
  /// hits / (hits + misses).
  pub hit_ratio: f64,
  /// Codec decode calls.
  pub decodes: u64,
  /// Codec encode calls.
  pub encodes: u64,
  pub decode_failures: u64,
  pub encode_failures: u64,
  pub shape_mismatches: u64,
  /// Async operations handed to the executor.
  pub async_submitted: u64,
  /// Async operations whose callback has returned.
  pub async_completed: u64,
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("decodes", &self.decodes)
      .field("encodes", &self.encodes)
      .field("decode_failures", &self.decode_failures)
      .field("encode_failures", &self.encode_failures)
      .field("shape_mismatches", &self.shape_mismatches)
      .field("async_submitted", &self.async_submitted)
      .field("async_completed", &self.async_completed)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
