//! Text encoding for structured values.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Why a value could not be encoded or decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
  /// The text is not valid in the codec's format.
  #[error("malformed input: {0}")]
  Malformed(String),
  /// The text is well-formed but does not describe the requested shape, or
  /// the value cannot be represented in the codec's format.
  ///
  /// Codecs may report some shape mismatches as [`Malformed`](Self::Malformed)
  /// instead: `serde_json` reads a struct from a JSON array and then fails on
  /// the leftover elements as a syntax error.
  #[error("unsupported shape: {0}")]
  Unsupported(String),
}

/// Converts structured values to and from text.
///
/// The shape of a decode is the statically requested `T`. Implementations
/// report failures as values and must not panic on bad input.
pub trait Codec: Send + Sync + 'static {
  fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError>;
  fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError>;
}

/// The default codec: JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
  fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(CodecError::from)
  }

  fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(CodecError::from)
  }
}

impl From<serde_json::Error> for CodecError {
  fn from(err: serde_json::Error) -> Self {
    use serde_json::error::Category;
    match err.classify() {
      Category::Syntax | Category::Eof => CodecError::Malformed(err.to_string()),
      Category::Data | Category::Io => CodecError::Unsupported(err.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Point {
    x: i32,
    y: i32,
  }

  #[test]
  fn test_json_codec_classifies_failures() {
    let codec = JsonCodec;

    let err = codec.decode::<Point>("{\"x\": 1,").unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)), "{:?}", err);

    let err = codec.decode::<Point>(r#"{"x":"a","y":1}"#).unwrap_err();
    assert!(matches!(err, CodecError::Unsupported(_)), "{:?}", err);

    // An over-long array for a struct trips on the trailing element.
    let err = codec.decode::<Point>("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)), "{:?}", err);
  }

  struct Unencodable;

  impl Serialize for Unencodable {
    fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
      Err(serde::ser::Error::custom("refusing to serialize"))
    }
  }

  #[test]
  fn test_json_codec_encode_failure() {
    let err = JsonCodec.encode(&Unencodable).unwrap_err();
    assert_eq!(err, CodecError::Unsupported("refusing to serialize".to_string()));
  }
}
