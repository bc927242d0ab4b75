// ABOUTME: MessagePack value decoder over a bounds-checked byte cursor.
// ABOUTME: Parses format headers and decodes one value family at a time; containers yield counts.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]

use crate::cursor::Cursor;
use crate::error::{Corruption, Error, Result};
use crate::numeric::{Number, NumericStrategy};
use crate::timestamp::Timestamp;
use crate::types::{limits, Marker};

/// Validate and convert bytes to a UTF-8 string.
/// Uses simdutf8 for SIMD-accelerated validation when the feature is enabled.
#[cfg(feature = "simd-utf8")]
#[inline]
fn validate_utf8(bytes: &[u8]) -> Result<&str> {
    simdutf8::basic::from_utf8(bytes).map_err(|_| Corruption::InvalidUtf8.into())
}

#[cfg(not(feature = "simd-utf8"))]
#[inline]
fn validate_utf8(bytes: &[u8]) -> Result<&str> {
    Ok(std::str::from_utf8(bytes)?)
}

/// Configuration options for the decoder.
///
/// The configuration is captured when a decode call starts and is never
/// modified while it runs.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// How to reconcile mismatched numeric families (default: Strict)
    pub numeric_strategy: NumericStrategy,
    /// Allow trailing bytes after the document (default: false)
    pub allow_trailing_bytes: bool,
    /// Maximum container nesting depth
    pub max_depth: usize,
    /// Maximum document size in bytes
    pub max_document_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            numeric_strategy: NumericStrategy::default(),
            allow_trailing_bytes: false,
            max_depth: limits::MAX_DEPTH,
            max_document_size: limits::MAX_DOCUMENT_SIZE,
        }
    }
}

/// A parsed format header: the marker plus its declared length.
///
/// For strings and binaries `len` is the byte count, for arrays the element
/// count, for maps the pair count, for extensions the payload size. Scalars
/// carry their fixed payload width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub marker: Marker,
    pub len: usize,
}

/// The type of value that was decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue<'a> {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Str(&'a str),
    Bin(&'a [u8]),
    Ext(i8, &'a [u8]),
    /// Array header; the caller decodes this many elements, then calls `end_container`.
    ArrayStart(usize),
    /// Map header; the caller decodes this many key/value pairs, then calls `end_container`.
    MapStart(usize),
}

/// A MessagePack decoder that reads from a byte slice.
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
    config: DecoderConfig,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder for the given data.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, DecoderConfig::default())
    }

    /// Create a new decoder with custom configuration.
    #[must_use]
    pub fn with_config(data: &'a [u8], config: DecoderConfig) -> Self {
        Self {
            cursor: Cursor::new(data),
            config,
            depth: 0,
        }
    }

    /// Check document size limit (called once at start of decoding).
    #[inline]
    pub fn check_document_size(&self) -> Result<()> {
        if self.cursor.len() > self.config.max_document_size {
            return Err(Corruption::DocumentTooLarge.into());
        }
        Ok(())
    }

    /// Get the current position in the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Check if we've reached the end of input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    /// Get the decoder configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[must_use]
    pub fn numeric_strategy(&self) -> NumericStrategy {
        self.config.numeric_strategy
    }

    /// Peek at the next marker without consuming it.
    #[inline]
    pub fn peek_marker(&self) -> Result<Marker> {
        Ok(Marker::from_u8(self.cursor.peek_u8()?))
    }

    /// Read a marker and its length field, leaving the payload unread.
    pub fn read_header(&mut self) -> Result<Header> {
        let marker = Marker::from_u8(self.cursor.read_u8()?);
        if let Marker::Reserved(code) = marker {
            return Err(Corruption::InvalidMarker(code).into());
        }
        let len = match marker.length_field_size() {
            Some(1) => usize::from(self.cursor.read_u8()?),
            Some(2) => usize::from(self.cursor.read_be_u16()?),
            Some(_) => self.cursor.read_be_u32()? as usize,
            None => marker.implied_len(),
        };
        Ok(Header { marker, len })
    }

    /// Decode the next value from the input.
    pub fn decode_value(&mut self) -> Result<DecodedValue<'a>> {
        let header = self.read_header()?;
        self.decode_payload(header)
    }

    /// Decode the payload that follows an already-read header.
    pub fn decode_payload(&mut self, header: Header) -> Result<DecodedValue<'a>> {
        let Header { marker, len } = header;
        let value = match marker {
            Marker::Nil => DecodedValue::Nil,
            Marker::False => DecodedValue::Bool(false),
            Marker::True => DecodedValue::Bool(true),
            Marker::PositiveFixInt(v) => DecodedValue::Int(i64::from(v)),
            Marker::NegativeFixInt(v) => DecodedValue::Int(i64::from(v)),
            Marker::UInt8 => DecodedValue::UInt(u64::from(self.cursor.read_u8()?)),
            Marker::UInt16 => DecodedValue::UInt(u64::from(self.cursor.read_be_u16()?)),
            Marker::UInt32 => DecodedValue::UInt(u64::from(self.cursor.read_be_u32()?)),
            Marker::UInt64 => DecodedValue::UInt(self.cursor.read_be_u64()?),
            Marker::Int8 => DecodedValue::Int(i64::from(self.cursor.read_i8()?)),
            Marker::Int16 => DecodedValue::Int(i64::from(self.cursor.read_be_i16()?)),
            Marker::Int32 => DecodedValue::Int(i64::from(self.cursor.read_be_i32()?)),
            Marker::Int64 => DecodedValue::Int(self.cursor.read_be_i64()?),
            Marker::Float32 => DecodedValue::F32(f32::from_bits(self.cursor.read_be_u32()?)),
            Marker::Float64 => DecodedValue::F64(f64::from_bits(self.cursor.read_be_u64()?)),
            Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32 => {
                DecodedValue::Str(validate_utf8(self.cursor.read_bytes(len)?)?)
            }
            Marker::Bin8 | Marker::Bin16 | Marker::Bin32 => DecodedValue::Bin(self.cursor.read_bytes(len)?),
            Marker::FixExt1
            | Marker::FixExt2
            | Marker::FixExt4
            | Marker::FixExt8
            | Marker::FixExt16
            | Marker::Ext8
            | Marker::Ext16
            | Marker::Ext32 => {
                let type_code = self.cursor.read_i8()?;
                DecodedValue::Ext(type_code, self.cursor.read_bytes(len)?)
            }
            Marker::FixArray(_) | Marker::Array16 | Marker::Array32 => {
                self.begin_container(len, 1)?;
                DecodedValue::ArrayStart(len)
            }
            Marker::FixMap(_) | Marker::Map16 | Marker::Map32 => {
                self.begin_container(len, 2)?;
                DecodedValue::MapStart(len)
            }
            Marker::Reserved(code) => return Err(Corruption::InvalidMarker(code).into()),
        };
        Ok(value)
    }

    /// Every element occupies at least one byte, so a declared count larger
    /// than the unread input is rejected before anything is allocated.
    fn begin_container(&mut self, count: usize, values_per_entry: usize) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(Corruption::DepthLimitExceeded.into());
        }
        self.cursor.ensure_available(count, values_per_entry)?;
        self.depth += 1;
        Ok(())
    }

    /// End the current container.
    pub fn end_container(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // =========================================================================
    // Direct decoders for the serde deserializer
    // =========================================================================

    /// Consume a nil marker if one is next.
    #[inline]
    pub(crate) fn try_consume_nil(&mut self) -> Result<bool> {
        if self.peek_marker()?.is_nil() {
            self.cursor.read_u8()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Decode any numeric family.
    pub(crate) fn decode_number(&mut self, expected: &'static str) -> Result<Number> {
        let header = self.read_header()?;
        match self.decode_payload(header)? {
            DecodedValue::Int(v) => Ok(Number::Int(v)),
            DecodedValue::UInt(v) => Ok(Number::UInt(v)),
            DecodedValue::F32(v) => Ok(Number::F32(v)),
            DecodedValue::F64(v) => Ok(Number::F64(v)),
            _ => Err(self.mismatch_after(expected, header)),
        }
    }

    pub(crate) fn decode_bool(&mut self) -> Result<bool> {
        let header = self.read_header()?;
        match header.marker {
            Marker::True => Ok(true),
            Marker::False => Ok(false),
            _ => Err(Error::mismatch("bool", header.marker.kind_name())),
        }
    }

    pub(crate) fn decode_str(&mut self, expected: &'static str) -> Result<&'a str> {
        let header = self.read_header()?;
        if !header.marker.is_str() {
            return Err(Error::mismatch(expected, header.marker.kind_name()));
        }
        validate_utf8(self.cursor.read_bytes(header.len)?)
    }

    /// Decode a binary blob. String payloads are accepted as raw bytes.
    pub(crate) fn decode_bytes(&mut self) -> Result<&'a [u8]> {
        let header = self.read_header()?;
        match header.marker {
            Marker::Bin8 | Marker::Bin16 | Marker::Bin32 => self.cursor.read_bytes(header.len),
            m if m.is_str() => self.cursor.read_bytes(header.len),
            m => Err(Error::mismatch("bytes", m.kind_name())),
        }
    }

    pub(crate) fn decode_timestamp(&mut self) -> Result<Timestamp> {
        let header = self.read_header()?;
        if !header.marker.is_ext() {
            return Err(Error::mismatch("timestamp", header.marker.kind_name()));
        }
        match self.decode_payload(header)? {
            DecodedValue::Ext(type_code, payload) => Timestamp::from_ext(type_code, payload),
            _ => Err(Error::mismatch("timestamp", header.marker.kind_name())),
        }
    }

    /// Skip one complete value, including nested containers, without allocating.
    pub fn skip_value(&mut self) -> Result<()> {
        let mut pending: usize = 1;
        while pending > 0 {
            pending -= 1;
            match self.decode_value()? {
                DecodedValue::ArrayStart(count) => {
                    self.end_container();
                    pending = pending.saturating_add(count);
                }
                DecodedValue::MapStart(count) => {
                    self.end_container();
                    pending = pending.saturating_add(count.saturating_mul(2));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Finish decoding and check for errors.
    pub fn finish(&self) -> Result<()> {
        if !self.config.allow_trailing_bytes && !self.cursor.is_empty() {
            return Err(Corruption::TrailingBytes.into());
        }
        Ok(())
    }

    fn mismatch_after(&mut self, expected: &'static str, header: Header) -> Error {
        if header.marker.is_array() || header.marker.is_map() {
            self.end_container();
        }
        Error::mismatch(expected, header.marker.kind_name())
    }
}
