use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The set type stored under string-set keys.
pub type StringSet = BTreeSet<String>;

/// A single stored preference value, tagged with its primitive kind.
///
/// Returned by `get_all()` and used as the on-wire form of a
/// [`StoreSnapshot`](crate::snapshot::StoreSnapshot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
  Bool(bool),
  Int(i32),
  Long(i64),
  Float(f32),
  String(String),
  StringSet(StringSet),
}

impl PrefValue {
  /// A short name for the kind of this value.
  pub fn kind(&self) -> &'static str {
    match self {
      PrefValue::Bool(_) => "bool",
      PrefValue::Int(_) => "int",
      PrefValue::Long(_) => "long",
      PrefValue::Float(_) => "float",
      PrefValue::String(_) => "string",
      PrefValue::StringSet(_) => "string_set",
    }
  }
}

impl fmt::Display for PrefValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PrefValue::Bool(v) => write!(f, "{}", v),
      PrefValue::Int(v) => write!(f, "{}", v),
      PrefValue::Long(v) => write!(f, "{}", v),
      PrefValue::Float(v) => write!(f, "{}", v),
      PrefValue::String(v) => write!(f, "{:?}", v),
      PrefValue::StringSet(v) => f.debug_set().entries(v.iter()).finish(),
    }
  }
}

impl From<bool> for PrefValue {
  fn from(v: bool) -> Self {
    PrefValue::Bool(v)
  }
}

impl From<i32> for PrefValue {
  fn from(v: i32) -> Self {
    PrefValue::Int(v)
  }
}

impl From<i64> for PrefValue {
  fn from(v: i64) -> Self {
    PrefValue::Long(v)
  }
}

impl From<f32> for PrefValue {
  fn from(v: f32) -> Self {
    PrefValue::Float(v)
  }
}

impl From<String> for PrefValue {
  fn from(v: String) -> Self {
    PrefValue::String(v)
  }
}

impl From<&str> for PrefValue {
  fn from(v: &str) -> Self {
    PrefValue::String(v.to_owned())
  }
}

impl From<StringSet> for PrefValue {
  fn from(v: StringSet) -> Self {
    PrefValue::StringSet(v)
  }
}
