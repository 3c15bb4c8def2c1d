//! Typed, cached preference storage.
//!
//! # Overview
//! - **Preference store**: a typed key-value contract ([`PreferenceStore`])
//!   with all-or-nothing batched edits ([`Editor`]) and change listeners.
//!   [`MemoryStore`] is the in-memory implementation.
//! - **Caching manager**: [`PreferenceManager`] layers typed accessors on any
//!   store, stores structured objects and lists through a pluggable
//!   [`Codec`], and keeps decoded values cached so unchanged keys are never
//!   decoded twice.
//! - **Non-blocking access**: callback-based `*_async` variants run the
//!   expensive object/list operations on an [`Executor`].
//! - **No errors across the boundary**: failures go to an optional error sink
//!   and the caller gets its default back.
//!
//! ```
//! use fibre_prefs::{MemoryStore, PreferenceManager};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Window {
//!   width: u32,
//!   height: u32,
//! }
//!
//! let prefs = PreferenceManager::new(MemoryStore::new());
//! prefs.set_bool("dark_mode", true);
//! prefs.set_object("window", Some(Window { width: 800, height: 600 }));
//!
//! assert!(prefs.get_bool("dark_mode", false));
//! let window = prefs.get_object::<Window>("window", None).unwrap();
//! assert_eq!(window.width, 800);
//! ```

// Public modules that form the API
pub mod builder;
pub mod codec;
pub mod error;
pub mod listener;
pub mod manager;
pub mod memory;
pub mod metrics;
pub mod runtime;
pub mod shape;
pub mod snapshot;
pub mod store;
pub mod value;

// Internal, crate-only modules
mod cache;
mod shared;
mod task;

// Re-export the primary user-facing types for convenience
pub use builder::ManagerBuilder;
pub use codec::{Codec, CodecError, JsonCodec};
pub use error::{BuildError, ErrorSink, PrefError};
pub use listener::ChangeListener;
pub use manager::PreferenceManager;
pub use memory::{MemoryEditor, MemoryStore};
pub use metrics::MetricsSnapshot;
pub use runtime::{Executor, Job};
pub use snapshot::StoreSnapshot;
pub use store::{Editor, PreferenceStore};
pub use task::pool::WorkerPool;
pub use value::{PrefValue, StringSet};

#[cfg(feature = "tokio")]
pub use runtime::TokioExecutor;
