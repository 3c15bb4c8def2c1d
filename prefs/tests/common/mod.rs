#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fibre_prefs::{Codec, CodecError, JsonCodec, MemoryStore, PrefError, PreferenceManager};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// A JSON codec that counts how often it is invoked, so tests can tell cache
// hits from decodes.
#[derive(Clone, Default)]
pub struct CountingCodec {
  pub decodes: Arc<AtomicUsize>,
  pub encodes: Arc<AtomicUsize>,
}

impl CountingCodec {
  pub fn decode_count(&self) -> usize {
    self.decodes.load(Ordering::SeqCst)
  }

  pub fn encode_count(&self) -> usize {
    self.encodes.load(Ordering::SeqCst)
  }
}

impl Codec for CountingCodec {
  fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
    self.encodes.fetch_add(1, Ordering::SeqCst);
    JsonCodec.encode(value)
  }

  fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError> {
    self.decodes.fetch_add(1, Ordering::SeqCst);
    JsonCodec.decode(text)
  }
}

// Collects every error the manager reports.
#[derive(Clone, Default)]
pub struct ErrorLog {
  errors: Arc<Mutex<Vec<PrefError>>>,
}

impl ErrorLog {
  pub fn sink(&self) -> impl Fn(&PrefError) + Send + Sync + 'static {
    let errors = self.errors.clone();
    move |err: &PrefError| errors.lock().push(err.clone())
  }

  pub fn take(&self) -> Vec<PrefError> {
    std::mem::take(&mut *self.errors.lock())
  }

  pub fn len(&self) -> usize {
    self.errors.lock().len()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub name: String,
  pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
  pub accent: String,
  pub dark: bool,
}

pub fn profile() -> Profile {
  Profile {
    name: "ada".to_string(),
    age: 36,
  }
}

// Helper to build a manager with a counting codec and an error log.
pub fn build_test_manager() -> (
  PreferenceManager<MemoryStore, CountingCodec>,
  CountingCodec,
  ErrorLog,
) {
  let codec = CountingCodec::default();
  let log = ErrorLog::default();
  let manager = PreferenceManager::builder(MemoryStore::new())
    .codec(codec.clone())
    .error_sink(log.sink())
    .workers(2)
    .build()
    .unwrap();
  (manager, codec, log)
}
