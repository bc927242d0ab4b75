// ABOUTME: MessagePack decoder for Rust with serde integration and DataSpec overlays.
// ABOUTME: Reconciles encoded number families with requested types and relabels array-encoded objects.

//! # msgpack_dataspec
//!
//! A MessagePack decoder that deserializes into any `serde::Deserialize`
//! type, with two additions over a plain decoder:
//!
//! - a [`NumericStrategy`] deciding whether a number encoded in one family
//!   (integer, float32, float64) may be read as another;
//! - a [`DataSpec`] overlay that lets array-encoded (tuple-style) objects be
//!   read as if they were map-encoded.
//!
//! ## Quick Start
//!
//! ```rust
//! use msgpack_dataspec::from_slice;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! // {"name": "Al", "age": 30}
//! let bytes = [0x82, 0xa4, b'n', b'a', b'm', b'e', 0xa2, b'A', b'l', 0xa3, b'a', b'g', b'e', 0x1e];
//! let person: Person = from_slice(&bytes).unwrap();
//! assert_eq!(person, Person { name: "Al".into(), age: 30 });
//! ```
//!
//! ## Array-encoded objects
//!
//! ```rust
//! use msgpack_dataspec::{from_slice_with_dataspec, DataSpec, DecoderConfig};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! // ["Al", 30]
//! let bytes = [0x92, 0xa2, b'A', b'l', 0x1e];
//! let spec = DataSpec::from_names(["name", "age"]);
//! let person: Person = from_slice_with_dataspec(&bytes, DecoderConfig::default(), &spec).unwrap();
//! assert_eq!(person.age, 30);
//! ```
//!
//! ## Numbers
//!
//! ```rust
//! use msgpack_dataspec::{from_slice, from_slice_with_config, DecoderConfig, NumericStrategy};
//!
//! let float32 = [0xca, 0x40, 0x48, 0xf5, 0xc3]; // 3.14 as float32
//! assert!(from_slice::<f64>(&float32).is_err());
//!
//! let config = DecoderConfig { numeric_strategy: NumericStrategy::Cast, ..Default::default() };
//! let widened: f64 = from_slice_with_config(&float32, config).unwrap();
//! assert!((widened - 3.14).abs() < 1e-6);
//! ```
//!
//! ## Resource Limits
//!
//! - Maximum document size: 2 GB
//! - Maximum nesting depth: 512
//! - Declared container and string lengths are checked against the
//!   remaining input before anything is allocated

pub mod cursor;
pub mod dataspec;
pub mod de;
pub mod decoder;
pub mod error;
pub mod numeric;
pub mod timestamp;
pub mod types;
pub mod value;

// Re-export commonly used items at the crate root
pub use dataspec::{DataSpec, DataSpecBuilder, DataSpecField, FieldShape};
pub use de::{from_slice, from_slice_with_config, from_slice_with_dataspec, Deserializer};
pub use decoder::{DecodedValue, Decoder, DecoderConfig};
pub use error::{CodingPath, Corruption, Error, PathSegment, Result};
pub use numeric::NumericStrategy;
pub use timestamp::Timestamp;
pub use types::{limits, marker};
pub use value::Value;

/// Decode a MessagePack document into a `Value`.
///
/// # Example
///
/// ```rust
/// use msgpack_dataspec::{decode_value, Value};
///
/// let bytes = [0x93, 0x01, 0x02, 0x03]; // [1, 2, 3]
/// let value = decode_value(&bytes).unwrap();
/// assert_eq!(value.get(2), Some(&Value::Int(3)));
/// ```
pub fn decode_value(data: &[u8]) -> Result<Value> {
    decode_value_with_config(data, DecoderConfig::default())
}

/// Decode a MessagePack document into a `Value` with custom configuration.
pub fn decode_value_with_config(data: &[u8], config: DecoderConfig) -> Result<Value> {
    let mut decoder = Decoder::with_config(data, config);
    decoder.check_document_size()?;
    let value = decode_value_recursive(&mut decoder)?;
    decoder.finish()?;
    Ok(value)
}

fn decode_value_recursive(decoder: &mut Decoder<'_>) -> Result<Value> {
    let value = match decoder.decode_value()? {
        DecodedValue::Nil => Value::Nil,
        DecodedValue::Bool(b) => Value::Bool(b),
        DecodedValue::Int(n) => Value::Int(n),
        DecodedValue::UInt(n) => Value::from(n),
        DecodedValue::F32(f) => Value::F32(f),
        DecodedValue::F64(f) => Value::F64(f),
        DecodedValue::Str(s) => Value::String(s.to_owned()),
        DecodedValue::Bin(b) => Value::Binary(b.to_vec()),
        DecodedValue::Ext(type_code, payload) => Value::from_ext(type_code, payload)?,
        DecodedValue::ArrayStart(len) => {
            let mut arr = Vec::with_capacity(len);
            for index in 0..len {
                arr.push(decode_value_recursive(decoder).map_err(|e| e.at(index))?);
            }
            decoder.end_container();
            Value::Array(arr)
        }
        DecodedValue::MapStart(len) => {
            let mut entries = Vec::with_capacity(len);
            for index in 0..len {
                let key = decode_value_recursive(decoder).map_err(|e| e.at(index))?;
                let value = decode_value_recursive(decoder).map_err(|e| match key.as_str() {
                    Some(name) => e.at(name),
                    None => e.at(index),
                })?;
                entries.push((key, value));
            }
            decoder.end_container();
            Value::Map(entries)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_value_nested() {
        // {"a": [nil, true], 1: "x"}
        let bytes = [0x82, 0xa1, b'a', 0x92, 0xc0, 0xc3, 0x01, 0xa1, b'x'];
        let value = decode_value(&bytes).unwrap();
        assert_eq!(
            value,
            Value::Map(vec![
                (Value::from("a"), Value::Array(vec![Value::Nil, Value::Bool(true)])),
                (Value::Int(1), Value::from("x")),
            ])
        );
    }

    #[test]
    fn test_decode_value_matches_serde_path() {
        // [3.5f64, bin "hi", ext(5, [1])]
        let bytes = [
            0x93, 0xcb, 0x40, 0x0c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc4, 0x02, b'h', b'i', 0xd4, 0x05, 0x01,
        ];
        let direct = decode_value(&bytes).unwrap();
        let via_serde: Value = from_slice(&bytes).unwrap();
        assert_eq!(direct, via_serde);
        assert_eq!(direct.get(0), Some(&Value::F64(3.5)));
        assert_eq!(direct.get(2), Some(&Value::Extension(5, vec![1])));
    }

    #[test]
    fn test_decode_value_timestamp() {
        let bytes = [0xd6, 0xff, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(
            decode_value(&bytes).unwrap(),
            Value::Timestamp(Timestamp::from_seconds(2))
        );
        let via_serde: Value = from_slice(&bytes).unwrap();
        assert_eq!(via_serde.as_timestamp(), Some(Timestamp::from_seconds(2)));
    }

    #[test]
    fn test_decode_value_error_path() {
        // {"k": [1, 0xc1]}
        let bytes = [0x81, 0xa1, b'k', 0x92, 0x01, 0xc1];
        let err = decode_value(&bytes).unwrap_err();
        assert_eq!(err.corruption(), Some(Corruption::InvalidMarker(0xc1)));
        assert_eq!(err.path().to_string(), "k[1]");
    }
}
