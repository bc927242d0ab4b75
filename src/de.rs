// ABOUTME: Serde Deserializer implementation for MessagePack decoding.
// ABOUTME: Drives keyed, sequential and single-value views, relabeling arrays through DataSpec overlays.

use crate::dataspec::{DataSpec, DataSpecField, FieldShape};
use crate::decoder::{DecodedValue, Decoder, DecoderConfig};
use crate::error::{Error, PathSegment, Result};
use crate::numeric;
use crate::timestamp::{Timestamp, TIMESTAMP_EXT_TYPE, TIMESTAMP_NEWTYPE};
use serde::de::value::{BorrowedBytesDeserializer, BorrowedStrDeserializer, I8Deserializer, StrDeserializer};
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::{forward_to_deserialize_any, Deserialize};
use tracing::trace;

/// The DataSpec overlay pending for the next value to be decoded.
#[derive(Debug, Clone, Copy, Default)]
enum Overlay<'s> {
    #[default]
    None,
    /// The next value, if array-encoded, is an object with these positions.
    Object(&'s DataSpec),
    /// The next value, if an array, holds objects with these positions.
    Elements(&'s DataSpec),
}

impl<'s> Overlay<'s> {
    fn for_shape(shape: &'s FieldShape) -> Self {
        match shape {
            FieldShape::Scalar => Overlay::None,
            FieldShape::Object(spec) => Overlay::Object(spec),
            FieldShape::ArrayOf(spec) => Overlay::Elements(spec),
        }
    }

    fn for_field(spec: Option<&'s DataSpec>, key: &str) -> Self {
        spec.and_then(|s| s.field(key))
            .map_or(Overlay::None, |f| Overlay::for_shape(f.shape()))
    }
}

/// A serde Deserializer that reads MessagePack.
pub struct Deserializer<'de, 's> {
    decoder: Decoder<'de>,
    overlay: Overlay<'s>,
}

impl<'de, 's> Deserializer<'de, 's> {
    /// Create a new Deserializer from a byte slice.
    #[must_use]
    pub fn from_slice(data: &'de [u8]) -> Self {
        Self::from_slice_with_config(data, DecoderConfig::default())
    }

    /// Create a new Deserializer with custom configuration.
    #[must_use]
    pub fn from_slice_with_config(data: &'de [u8], config: DecoderConfig) -> Self {
        Self {
            decoder: Decoder::with_config(data, config),
            overlay: Overlay::None,
        }
    }

    /// Read the root value, when array-encoded, as an object described by `spec`.
    #[must_use]
    pub fn with_dataspec(mut self, spec: &'s DataSpec) -> Self {
        self.overlay = Overlay::Object(spec);
        self
    }

    /// Read the root value as an array whose elements are objects described by `spec`.
    #[must_use]
    pub fn with_element_dataspec(mut self, spec: &'s DataSpec) -> Self {
        self.overlay = Overlay::Elements(spec);
        self
    }

    /// Get the underlying decoder (consumes self).
    #[must_use]
    pub fn into_decoder(self) -> Decoder<'de> {
        self.decoder
    }

    /// Check trailing input after a complete value has been deserialized.
    pub fn end(&self) -> Result<()> {
        self.decoder.finish()
    }

    fn take_overlay(&mut self) -> Overlay<'s> {
        std::mem::take(&mut self.overlay)
    }

    /// Run `f` with `overlay` pending for the next value, restoring an empty
    /// overlay afterwards whether or not the value consumed it.
    fn with_overlay<T>(&mut self, overlay: Overlay<'s>, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.overlay = overlay;
        let result = f(self);
        self.overlay = Overlay::None;
        result
    }

    fn integer<T>(&mut self, expected: &'static str) -> Result<T>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        let number = self.decoder.decode_number(expected)?;
        numeric::to_integer(number, self.decoder.numeric_strategy(), expected)
    }

    /// Visit an array whose header has been consumed.
    fn visit_array<V: Visitor<'de>>(&mut self, len: usize, overlay: Overlay<'s>, keyed: bool, visitor: V) -> Result<V::Value> {
        let value = match overlay {
            Overlay::Object(spec) if keyed => {
                trace!(fields = spec.len(), elements = len, "relabeling array-encoded object");
                let mut access = RelabeledMap::new(self, spec.fields(), len);
                let value = visitor.visit_map(&mut access)?;
                access.skip_rest()?;
                value
            }
            Overlay::Elements(spec) => {
                let mut access = SeqDeserializer::new(self, len, Overlay::Object(spec));
                let value = visitor.visit_seq(&mut access)?;
                access.end()?;
                value
            }
            _ => {
                let mut access = SeqDeserializer::new(self, len, Overlay::None);
                let value = visitor.visit_seq(&mut access)?;
                access.end()?;
                value
            }
        };
        self.decoder.end_container();
        Ok(value)
    }

    /// Visit a map whose header has been consumed.
    fn visit_map<V: Visitor<'de>>(&mut self, len: usize, overlay: Overlay<'s>, visitor: V) -> Result<V::Value> {
        let spec = match overlay {
            Overlay::Object(spec) => Some(spec),
            Overlay::Elements(_) | Overlay::None => None,
        };
        let mut access = MapDeserializer::new(self, len, spec);
        let value = visitor.visit_map(&mut access)?;
        access.skip_rest()?;
        self.decoder.end_container();
        Ok(value)
    }

    /// Shared body of the keyed view (structs and maps).
    fn deserialize_keyed<V: Visitor<'de>>(&mut self, expected: &'static str, visitor: V) -> Result<V::Value> {
        let overlay = self.take_overlay();
        let marker = self.decoder.peek_marker()?;
        if !marker.is_map() && !marker.is_array() {
            return Err(Error::mismatch(expected, marker.kind_name()));
        }
        match self.decoder.decode_value()? {
            DecodedValue::MapStart(len) => self.visit_map(len, overlay, visitor),
            DecodedValue::ArrayStart(len) => self.visit_array(len, overlay, true, visitor),
            _ => Err(Error::mismatch(expected, marker.kind_name())),
        }
    }

    /// Shared body of the sequential view (sequences and tuples).
    fn deserialize_sequence<V: Visitor<'de>>(&mut self, visitor: V) -> Result<V::Value> {
        let overlay = self.take_overlay();
        let marker = self.decoder.peek_marker()?;
        if !marker.is_array() {
            return Err(Error::mismatch("array", marker.kind_name()));
        }
        match self.decoder.decode_value()? {
            DecodedValue::ArrayStart(len) => self.visit_array(len, overlay, false, visitor),
            _ => Err(Error::mismatch("array", marker.kind_name())),
        }
    }
}

/// Deserialize a value from a MessagePack byte slice.
///
/// # Errors
///
/// Returns an error if:
/// - The document exceeds size limits
/// - The data is malformed or truncated
/// - The data doesn't match the expected type `T`
/// - There are trailing bytes after the value
pub fn from_slice<'de, T: Deserialize<'de>>(data: &'de [u8]) -> Result<T> {
    from_slice_with_config(data, DecoderConfig::default())
}

/// Deserialize a value from a MessagePack byte slice with custom configuration.
///
/// # Errors
///
/// As [`from_slice`], with limits and numeric strategy taken from `config`.
pub fn from_slice_with_config<'de, T: Deserialize<'de>>(data: &'de [u8], config: DecoderConfig) -> Result<T> {
    deserialize_document(Deserializer::from_slice_with_config(data, config))
}

/// Deserialize a value, reading array-encoded objects through a DataSpec overlay.
///
/// `spec` describes the root object. Map-encoded objects are read by key as
/// usual; the overlay only relabels array-encoded ones.
///
/// # Errors
///
/// As [`from_slice_with_config`].
pub fn from_slice_with_dataspec<'de, T: Deserialize<'de>>(
    data: &'de [u8],
    config: DecoderConfig,
    spec: &DataSpec,
) -> Result<T> {
    deserialize_document(Deserializer::from_slice_with_config(data, config).with_dataspec(spec))
}

fn deserialize_document<'de, T: Deserialize<'de>>(mut de: Deserializer<'de, '_>) -> Result<T> {
    de.decoder.check_document_size()?;
    let value = T::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

macro_rules! deserialize_integer {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                let value: $ty = self.integer(stringify!($ty))?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de, 's> de::Deserializer<'de> for &mut Deserializer<'de, 's> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let overlay = self.take_overlay();
        match self.decoder.decode_value()? {
            DecodedValue::Nil => visitor.visit_unit(),
            DecodedValue::Bool(b) => visitor.visit_bool(b),
            DecodedValue::Int(n) => visitor.visit_i64(n),
            DecodedValue::UInt(n) => visitor.visit_u64(n),
            DecodedValue::F32(f) => visitor.visit_f32(f),
            DecodedValue::F64(f) => visitor.visit_f64(f),
            DecodedValue::Str(s) => visitor.visit_borrowed_str(s),
            DecodedValue::Bin(b) => visitor.visit_borrowed_bytes(b),
            DecodedValue::Ext(type_code, payload) => {
                if type_code == TIMESTAMP_EXT_TYPE {
                    Timestamp::from_ext(type_code, payload)?;
                }
                visitor.visit_newtype_struct(ExtDeserializer { type_code, payload })
            }
            DecodedValue::ArrayStart(len) => self.visit_array(len, overlay, true, visitor),
            DecodedValue::MapStart(len) => self.visit_map(len, overlay, visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.decoder.decode_bool()?)
    }

    deserialize_integer! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_u128 => u128, visit_u128;
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let number = self.decoder.decode_number("f32")?;
        visitor.visit_f32(numeric::to_f32(number, self.decoder.numeric_strategy())?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let number = self.decoder.decode_number("f64")?;
        visitor.visit_f64(numeric::to_f64(number, self.decoder.numeric_strategy())?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let s = self.decoder.decode_str("char")?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::mismatch("char", format!("string of length {}", s.len()))),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.decoder.decode_str("string")?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_bytes(self.decoder.decode_bytes()?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        // A pending overlay stays in place for the Some payload.
        if self.decoder.try_consume_nil()? {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.decoder.try_consume_nil()? {
            visitor.visit_unit()
        } else {
            Err(Error::mismatch("nil", self.decoder.peek_marker()?.kind_name()))
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, name: &'static str, visitor: V) -> Result<V::Value> {
        if name == TIMESTAMP_NEWTYPE {
            let ts = self.decoder.decode_timestamp()?;
            let parts = [ts.seconds(), i64::from(ts.nanoseconds())];
            return visitor.visit_seq(de::value::SeqDeserializer::<_, Error>::new(parts.into_iter()));
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_sequence(visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_sequence(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_sequence(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_keyed("map", visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_keyed(name, visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.overlay = Overlay::None;
        let marker = self.decoder.peek_marker()?;
        if marker.is_str() {
            // Unit variant: just a string
            visitor.visit_enum(UnitVariantDeserializer::new(self))
        } else if marker.is_map() {
            // Other variants: map with a single key
            match self.decoder.decode_value()? {
                DecodedValue::MapStart(1) => {
                    let value = visitor.visit_enum(EnumDeserializer::new(self))?;
                    self.decoder.end_container();
                    Ok(value)
                }
                _ => Err(Error::mismatch(name, "map with more or less than one entry")),
            }
        } else {
            Err(Error::mismatch(name, marker.kind_name()))
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let marker = self.decoder.peek_marker()?;
        if marker.is_integer() {
            visitor.visit_u64(self.integer("field index")?)
        } else {
            visitor.visit_borrowed_str(self.decoder.decode_str("field identifier")?)
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.overlay = Overlay::None;
        self.decoder.skip_value()?;
        visitor.visit_unit()
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Sequential view over an array.
struct SeqDeserializer<'a, 'de, 's> {
    de: &'a mut Deserializer<'de, 's>,
    remaining: usize,
    index: usize,
    /// Overlay applied to every element.
    element: Overlay<'s>,
}

impl<'a, 'de, 's> SeqDeserializer<'a, 'de, 's> {
    fn new(de: &'a mut Deserializer<'de, 's>, len: usize, element: Overlay<'s>) -> Self {
        SeqDeserializer {
            de,
            remaining: len,
            index: 0,
            element,
        }
    }

    /// Elements the visitor left unread are an error, not skipped.
    fn end(&self) -> Result<()> {
        if self.remaining == 0 {
            Ok(())
        } else {
            Err(de::Error::invalid_length(
                self.index + self.remaining,
                &"fewer elements in array",
            ))
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'_, 'de, '_> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let index = self.index;
        self.index += 1;
        self.de
            .with_overlay(self.element, |de| seed.deserialize(&mut *de))
            .map(Some)
            .map_err(|e| e.at(index))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// The key of the entry whose value is about to be decoded.
#[derive(Clone, Copy)]
enum PendingKey<'de> {
    Str(&'de str),
    Entry(usize),
}

impl From<PendingKey<'_>> for PathSegment {
    fn from(key: PendingKey<'_>) -> Self {
        match key {
            PendingKey::Str(s) => PathSegment::from(s),
            PendingKey::Entry(index) => PathSegment::Index(index),
        }
    }
}

/// Keyed view over a map-encoded object.
///
/// A DataSpec is never used for lookup here, but the shapes it registers for
/// a key still apply to that key's value.
struct MapDeserializer<'a, 'de, 's> {
    de: &'a mut Deserializer<'de, 's>,
    remaining: usize,
    index: usize,
    spec: Option<&'s DataSpec>,
    pending: Option<(PendingKey<'de>, Overlay<'s>)>,
}

impl<'a, 'de, 's> MapDeserializer<'a, 'de, 's> {
    fn new(de: &'a mut Deserializer<'de, 's>, len: usize, spec: Option<&'s DataSpec>) -> Self {
        MapDeserializer {
            de,
            remaining: len,
            index: 0,
            spec,
            pending: None,
        }
    }

    fn skip_rest(&mut self) -> Result<()> {
        if let Some((key, _)) = self.pending.take() {
            self.de.decoder.skip_value().map_err(|e| e.at(key))?;
        }
        while self.remaining > 0 {
            self.remaining -= 1;
            let entry = self.index;
            self.index += 1;
            self.de.decoder.skip_value().map_err(|e| e.at(entry))?;
            self.de.decoder.skip_value().map_err(|e| e.at(entry))?;
        }
        Ok(())
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'_, 'de, '_> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let entry = self.index;
        self.index += 1;

        if self.de.decoder.peek_marker()?.is_str() {
            let key = self.de.decoder.decode_str("map key").map_err(|e| e.at(entry))?;
            self.pending = Some((PendingKey::Str(key), Overlay::for_field(self.spec, key)));
            seed.deserialize(BorrowedStrDeserializer::<Error>::new(key))
                .map(Some)
                .map_err(|e| e.at(key))
        } else {
            self.pending = Some((PendingKey::Entry(entry), Overlay::None));
            self.de
                .with_overlay(Overlay::None, |de| seed.deserialize(&mut *de))
                .map(Some)
                .map_err(|e| e.at(entry))
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let (key, overlay) = self
            .pending
            .take()
            .ok_or_else(|| <Error as de::Error>::custom("map value requested before its key"))?;
        self.de
            .with_overlay(overlay, |de| seed.deserialize(&mut *de))
            .map_err(|e| e.at(key))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Keyed view synthesized from an array-encoded object: position `i` is
/// presented under the name of field `i` of the DataSpec.
struct RelabeledMap<'a, 'de, 's> {
    de: &'a mut Deserializer<'de, 's>,
    fields: &'s [DataSpecField],
    remaining: usize,
    position: usize,
}

impl<'a, 'de, 's> RelabeledMap<'a, 'de, 's> {
    fn new(de: &'a mut Deserializer<'de, 's>, fields: &'s [DataSpecField], len: usize) -> Self {
        RelabeledMap {
            de,
            fields,
            remaining: len,
            position: 0,
        }
    }

    /// Skip elements the visitor left unread, including positions past the last field.
    fn skip_rest(&mut self) -> Result<()> {
        while self.remaining > 0 {
            self.remaining -= 1;
            let position = self.position;
            self.position += 1;
            self.de.decoder.skip_value().map_err(|e| e.at(position))?;
        }
        Ok(())
    }
}

impl<'de> MapAccess<'de> for RelabeledMap<'_, 'de, '_> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        match self.fields.get(self.position) {
            Some(field) => seed.deserialize(StrDeserializer::<Error>::new(field.name())).map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let fields = self.fields;
        let field = fields
            .get(self.position)
            .ok_or_else(|| <Error as de::Error>::custom("relabeled value requested past the last field"))?;
        self.remaining -= 1;
        self.position += 1;
        self.de
            .with_overlay(Overlay::for_shape(field.shape()), |de| seed.deserialize(&mut *de))
            .map_err(|e| e.at(field.name()))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining.min(self.fields.len().saturating_sub(self.position)))
    }
}

/// Presents an extension value as a `(type, payload)` pair.
struct ExtDeserializer<'de> {
    type_code: i8,
    payload: &'de [u8],
}

impl<'de> de::Deserializer<'de> for ExtDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_seq(ExtAccess { ext: self, field: 0 })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct ExtAccess<'de> {
    ext: ExtDeserializer<'de>,
    field: u8,
}

impl<'de> SeqAccess<'de> for ExtAccess<'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        let field = self.field;
        self.field = self.field.saturating_add(1);
        match field {
            0 => seed.deserialize(I8Deserializer::<Error>::new(self.ext.type_code)).map(Some),
            1 => seed.deserialize(BorrowedBytesDeserializer::<Error>::new(self.ext.payload)).map(Some),
            _ => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(2usize.saturating_sub(usize::from(self.field)))
    }
}

struct UnitVariantDeserializer<'a, 'de, 's> {
    de: &'a mut Deserializer<'de, 's>,
}

impl<'a, 'de, 's> UnitVariantDeserializer<'a, 'de, 's> {
    fn new(de: &'a mut Deserializer<'de, 's>) -> Self {
        UnitVariantDeserializer { de }
    }
}

impl<'de> de::EnumAccess<'de> for UnitVariantDeserializer<'_, 'de, '_> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((variant, self))
    }
}

impl<'de> de::VariantAccess<'de> for UnitVariantDeserializer<'_, 'de, '_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, _seed: T) -> Result<T::Value> {
        Err(Error::mismatch("newtype variant", "unit variant"))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value> {
        Err(Error::mismatch("tuple variant", "unit variant"))
    }

    fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value> {
        Err(Error::mismatch("struct variant", "unit variant"))
    }
}

struct EnumDeserializer<'a, 'de, 's> {
    de: &'a mut Deserializer<'de, 's>,
}

impl<'a, 'de, 's> EnumDeserializer<'a, 'de, 's> {
    fn new(de: &'a mut Deserializer<'de, 's>) -> Self {
        EnumDeserializer { de }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer<'_, 'de, '_> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((variant, self))
    }
}

impl<'de> de::VariantAccess<'de> for EnumDeserializer<'_, 'de, '_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Err(Error::mismatch("unit variant", "map"))
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(&mut *self.de, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(&mut *self.de, "struct variant", fields, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Corruption;
    use serde::Deserialize;

    #[test]
    fn test_deserialize_primitives() {
        assert!(from_slice::<bool>(&[0xc3]).unwrap());
        assert!(!from_slice::<bool>(&[0xc2]).unwrap());
        assert_eq!(from_slice::<i32>(&[0x2a]).unwrap(), 42);
        assert_eq!(
            from_slice::<String>(&[0xa5, b'h', b'e', b'l', b'l', b'o']).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_deserialize_option() {
        assert_eq!(from_slice::<Option<i32>>(&[0xc0]).unwrap(), None);
        assert_eq!(from_slice::<Option<i32>>(&[0x2a]).unwrap(), Some(42));
    }

    #[test]
    fn test_deserialize_struct_from_map() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        // {"y": 2, "x": 1}
        let bytes = [0x82, 0xa1, b'y', 0x02, 0xa1, b'x', 0x01];
        assert_eq!(from_slice::<Point>(&bytes).unwrap(), Point { x: 1, y: 2 });
    }

    #[test]
    fn test_deserialize_struct_positionally_without_dataspec() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        assert_eq!(from_slice::<Point>(&[0x92, 0x01, 0x02]).unwrap(), Point { x: 1, y: 2 });
    }

    #[test]
    fn test_unread_array_elements_are_rejected() {
        #[derive(Debug, Deserialize)]
        struct Point {
            #[allow(dead_code)]
            x: i32,
            #[allow(dead_code)]
            y: i32,
        }

        let bytes = [0x93, 0x01, 0x02, 0x03];
        assert!(from_slice::<(u8, u8)>(&bytes).is_err());
        assert!(from_slice::<[u8; 2]>(&bytes).is_err());
        let err = from_slice::<Point>(&bytes).unwrap_err();
        assert!(matches!(err, Error::Custom { ref message, .. } if message.contains("invalid length 3")));

        // Nested: the short tuple sits at index 0
        let nested = [0x91, 0x93, 0x01, 0x02, 0x03];
        let err = from_slice::<Vec<(u8, u8)>>(&nested).unwrap_err();
        assert_eq!(err.path().to_string(), "[0]");

        assert_eq!(from_slice::<(u8, u8, u8)>(&bytes).unwrap(), (1, 2, 3));
    }

    #[test]
    fn test_missing_field_reports_path() {
        #[derive(Debug, Deserialize)]
        struct Inner {
            #[allow(dead_code)]
            id: i32,
        }
        #[derive(Debug, Deserialize)]
        struct Outer {
            #[allow(dead_code)]
            items: Vec<Inner>,
        }

        // {"items": [{"id": 1}, {}]}
        let bytes = [0x81, 0xa5, b'i', b't', b'e', b'm', b's', 0x92, 0x81, 0xa2, b'i', b'd', 0x01, 0x80];
        let err = from_slice::<Outer>(&bytes).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { ref key, .. } if key == "id"));
        assert_eq!(err.path().to_string(), "items[1]");
    }

    #[test]
    fn test_keyed_view_over_scalar_is_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Point {
            #[allow(dead_code)]
            x: i32,
        }

        let err = from_slice::<Point>(&[0x01]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref found, .. } if found == "integer"));
    }

    #[test]
    fn test_relabeled_array_with_dataspec() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Pair {
            name: String,
            count: u8,
            note: Option<String>,
        }

        let spec = DataSpec::from_names(["count", "name", "note"]);
        // [3, "ab"]
        let bytes = [0x92, 0x03, 0xa2, b'a', b'b'];
        let pair: Pair = from_slice_with_dataspec(&bytes, DecoderConfig::default(), &spec).unwrap();
        assert_eq!(
            pair,
            Pair {
                name: "ab".into(),
                count: 3,
                note: None
            }
        );
    }

    #[test]
    fn test_enum_variants() {
        #[derive(Debug, Deserialize, PartialEq)]
        enum Shape {
            Empty,
            Circle(u8),
            Rect { w: u8, h: u8 },
        }

        assert_eq!(from_slice::<Shape>(&[0xa5, b'E', b'm', b'p', b't', b'y']).unwrap(), Shape::Empty);
        let circle = [0x81, 0xa6, b'C', b'i', b'r', b'c', b'l', b'e', 0x05];
        assert_eq!(from_slice::<Shape>(&circle).unwrap(), Shape::Circle(5));
        let rect = [0x81, 0xa4, b'R', b'e', b'c', b't', 0x82, 0xa1, b'w', 0x02, 0xa1, b'h', 0x03];
        assert_eq!(from_slice::<Shape>(&rect).unwrap(), Shape::Rect { w: 2, h: 3 });
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Only {
            a: u8,
        }

        // {"z": [1, {"q": 2}], "a": 7}
        let bytes = [0x82, 0xa1, b'z', 0x92, 0x01, 0x81, 0xa1, b'q', 0x02, 0xa1, b'a', 0x07];
        assert_eq!(from_slice::<Only>(&bytes).unwrap(), Only { a: 7 });
    }

    #[test]
    fn test_corruption_carries_path() {
        // {"a": "\xc3\x28"}
        let bytes = [0x81, 0xa1, b'a', 0xa2, 0xc3, 0x28];
        let err = from_slice::<std::collections::HashMap<String, String>>(&bytes).unwrap_err();
        assert_eq!(err.corruption(), Some(Corruption::InvalidUtf8));
        assert_eq!(err.path().to_string(), "a");
    }
}
