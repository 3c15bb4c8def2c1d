use fibre_prefs::{BuildError, JsonCodec, MemoryStore, PreferenceManager, PreferenceStore};

#[test]
fn test_zero_workers_is_rejected() {
  let err = PreferenceManager::builder(MemoryStore::new())
    .workers(0)
    .build()
    .unwrap_err();
  assert_eq!(err, BuildError::ZeroWorkers);
  assert_eq!(err.to_string(), "worker pool size cannot be zero");
}

#[test]
fn test_zero_queue_capacity_is_rejected() {
  let err = PreferenceManager::builder(MemoryStore::new())
    .queue_capacity(0)
    .build()
    .unwrap_err();
  assert_eq!(err, BuildError::ZeroQueueCapacity);
}

#[test]
fn test_defaults_build() {
  let prefs = PreferenceManager::builder(MemoryStore::new())
    .codec(JsonCodec)
    .build()
    .unwrap();

  prefs.set_int("x", 1);
  assert_eq!(prefs.store().get_int("x", 0), 1);

  let metrics = prefs.metrics();
  assert_eq!(metrics.hits, 0);
  assert_eq!(metrics.hit_ratio, 0.0);
}

#[test]
fn test_debug_output_mentions_builder_settings() {
  let builder = PreferenceManager::builder(MemoryStore::new()).workers(3);
  let rendered = format!("{:?}", builder);
  assert!(rendered.contains("workers: 3"), "{}", rendered);
}
