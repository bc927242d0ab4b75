// ABOUTME: Defines MessagePack marker bytes and the Marker (format tag) classification.
// ABOUTME: Marker values map directly to the MessagePack specification byte values.

/// Marker bytes for MessagePack values.
/// These match the MessagePack specification exactly.
pub mod marker {
    // Positive fixint: 0x00-0x7f
    pub const POSITIVE_FIXINT_MAX: u8 = 0x7f;

    // Fixed-size containers and strings
    pub const FIXMAP_MIN: u8 = 0x80;
    pub const FIXMAP_MAX: u8 = 0x8f;
    pub const FIXARRAY_MIN: u8 = 0x90;
    pub const FIXARRAY_MAX: u8 = 0x9f;
    pub const FIXSTR_MIN: u8 = 0xa0;
    pub const FIXSTR_MAX: u8 = 0xbf;

    pub const NIL: u8 = 0xc0;
    /// Never assigned by the format.
    pub const NEVER_USED: u8 = 0xc1;
    pub const FALSE: u8 = 0xc2;
    pub const TRUE: u8 = 0xc3;

    pub const BIN8: u8 = 0xc4;
    pub const BIN16: u8 = 0xc5;
    pub const BIN32: u8 = 0xc6;

    pub const EXT8: u8 = 0xc7;
    pub const EXT16: u8 = 0xc8;
    pub const EXT32: u8 = 0xc9;

    pub const FLOAT32: u8 = 0xca;
    pub const FLOAT64: u8 = 0xcb;

    pub const UINT8: u8 = 0xcc;
    pub const UINT16: u8 = 0xcd;
    pub const UINT32: u8 = 0xce;
    pub const UINT64: u8 = 0xcf;

    pub const INT8: u8 = 0xd0;
    pub const INT16: u8 = 0xd1;
    pub const INT32: u8 = 0xd2;
    pub const INT64: u8 = 0xd3;

    pub const FIXEXT1: u8 = 0xd4;
    pub const FIXEXT2: u8 = 0xd5;
    pub const FIXEXT4: u8 = 0xd6;
    pub const FIXEXT8: u8 = 0xd7;
    pub const FIXEXT16: u8 = 0xd8;

    pub const STR8: u8 = 0xd9;
    pub const STR16: u8 = 0xda;
    pub const STR32: u8 = 0xdb;

    pub const ARRAY16: u8 = 0xdc;
    pub const ARRAY32: u8 = 0xdd;

    pub const MAP16: u8 = 0xde;
    pub const MAP32: u8 = 0xdf;

    // Negative fixint: 0xe0-0xff (-32 to -1)
    pub const NEGATIVE_FIXINT_MIN: u8 = 0xe0;

    #[inline]
    pub const fn is_positive_fixint(code: u8) -> bool {
        code <= POSITIVE_FIXINT_MAX
    }

    #[inline]
    pub const fn is_negative_fixint(code: u8) -> bool {
        code >= NEGATIVE_FIXINT_MIN
    }

    #[inline]
    pub const fn is_fixmap(code: u8) -> bool {
        code >= FIXMAP_MIN && code <= FIXMAP_MAX
    }

    #[inline]
    pub const fn is_fixarray(code: u8) -> bool {
        code >= FIXARRAY_MIN && code <= FIXARRAY_MAX
    }

    #[inline]
    pub const fn is_fixstr(code: u8) -> bool {
        code >= FIXSTR_MIN && code <= FIXSTR_MAX
    }
}

/// The format family of a MessagePack value, derived from its leading byte.
///
/// Fixed-range markers carry their payload (fixint value) or their size
/// (fixstr/fixarray/fixmap) inline. The remaining variants are followed by
/// a payload, or by a big-endian length field and then a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    PositiveFixInt(u8),
    NegativeFixInt(i8),
    Nil,
    False,
    True,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    FixStr(u8),
    Str8,
    Str16,
    Str32,
    Bin8,
    Bin16,
    Bin32,
    FixArray(u8),
    Array16,
    Array32,
    FixMap(u8),
    Map16,
    Map32,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Ext8,
    Ext16,
    Ext32,
    /// The unassigned byte `0xc1`.
    Reserved(u8),
}

impl Marker {
    /// Classify a leading byte.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn from_u8(code: u8) -> Self {
        if marker::is_positive_fixint(code) {
            return Marker::PositiveFixInt(code);
        }
        if marker::is_negative_fixint(code) {
            return Marker::NegativeFixInt(code as i8);
        }
        if marker::is_fixmap(code) {
            return Marker::FixMap(code & 0x0f);
        }
        if marker::is_fixarray(code) {
            return Marker::FixArray(code & 0x0f);
        }
        if marker::is_fixstr(code) {
            return Marker::FixStr(code & 0x1f);
        }
        match code {
            marker::NIL => Marker::Nil,
            marker::FALSE => Marker::False,
            marker::TRUE => Marker::True,
            marker::BIN8 => Marker::Bin8,
            marker::BIN16 => Marker::Bin16,
            marker::BIN32 => Marker::Bin32,
            marker::EXT8 => Marker::Ext8,
            marker::EXT16 => Marker::Ext16,
            marker::EXT32 => Marker::Ext32,
            marker::FLOAT32 => Marker::Float32,
            marker::FLOAT64 => Marker::Float64,
            marker::UINT8 => Marker::UInt8,
            marker::UINT16 => Marker::UInt16,
            marker::UINT32 => Marker::UInt32,
            marker::UINT64 => Marker::UInt64,
            marker::INT8 => Marker::Int8,
            marker::INT16 => Marker::Int16,
            marker::INT32 => Marker::Int32,
            marker::INT64 => Marker::Int64,
            marker::FIXEXT1 => Marker::FixExt1,
            marker::FIXEXT2 => Marker::FixExt2,
            marker::FIXEXT4 => Marker::FixExt4,
            marker::FIXEXT8 => Marker::FixExt8,
            marker::FIXEXT16 => Marker::FixExt16,
            marker::STR8 => Marker::Str8,
            marker::STR16 => Marker::Str16,
            marker::STR32 => Marker::Str32,
            marker::ARRAY16 => Marker::Array16,
            marker::ARRAY32 => Marker::Array32,
            marker::MAP16 => Marker::Map16,
            marker::MAP32 => Marker::Map32,
            _ => Marker::Reserved(code),
        }
    }

    /// Size in bytes of the big-endian length field following the marker,
    /// for variable-length families.
    #[must_use]
    pub const fn length_field_size(self) -> Option<usize> {
        match self {
            Marker::Str8 | Marker::Bin8 | Marker::Ext8 => Some(1),
            Marker::Str16 | Marker::Bin16 | Marker::Array16 | Marker::Map16 | Marker::Ext16 => {
                Some(2)
            }
            Marker::Str32 | Marker::Bin32 | Marker::Array32 | Marker::Map32 | Marker::Ext32 => {
                Some(4)
            }
            _ => None,
        }
    }

    /// Length implied by the marker alone: inline sizes for fix families,
    /// payload byte counts for fixed-width scalars and fixext.
    #[must_use]
    pub const fn implied_len(self) -> usize {
        match self {
            Marker::FixStr(n) | Marker::FixArray(n) | Marker::FixMap(n) => n as usize,
            Marker::UInt8 | Marker::Int8 | Marker::FixExt1 => 1,
            Marker::UInt16 | Marker::Int16 | Marker::FixExt2 => 2,
            Marker::UInt32 | Marker::Int32 | Marker::Float32 | Marker::FixExt4 => 4,
            Marker::UInt64 | Marker::Int64 | Marker::Float64 | Marker::FixExt8 => 8,
            Marker::FixExt16 => 16,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn is_nil(self) -> bool {
        matches!(self, Marker::Nil)
    }

    #[must_use]
    pub const fn is_str(self) -> bool {
        matches!(self, Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32)
    }

    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Marker::FixArray(_) | Marker::Array16 | Marker::Array32)
    }

    #[must_use]
    pub const fn is_map(self) -> bool {
        matches!(self, Marker::FixMap(_) | Marker::Map16 | Marker::Map32)
    }

    #[must_use]
    pub const fn is_ext(self) -> bool {
        matches!(
            self,
            Marker::FixExt1
                | Marker::FixExt2
                | Marker::FixExt4
                | Marker::FixExt8
                | Marker::FixExt16
                | Marker::Ext8
                | Marker::Ext16
                | Marker::Ext32
        )
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Marker::PositiveFixInt(_)
                | Marker::NegativeFixInt(_)
                | Marker::UInt8
                | Marker::UInt16
                | Marker::UInt32
                | Marker::UInt64
                | Marker::Int8
                | Marker::Int16
                | Marker::Int32
                | Marker::Int64
        )
    }

    /// Human-readable family name, used in type mismatch diagnostics.
    #[must_use]
    pub const fn kind_name(self) -> &'static str {
        match self {
            // Fixints decode into the signed family, so they report as "integer".
            Marker::UInt8 | Marker::UInt16 | Marker::UInt32 | Marker::UInt64 => "unsigned integer",
            Marker::PositiveFixInt(_)
            | Marker::NegativeFixInt(_)
            | Marker::Int8
            | Marker::Int16
            | Marker::Int32
            | Marker::Int64 => "integer",
            Marker::Nil => "nil",
            Marker::False | Marker::True => "bool",
            Marker::Float32 => "float32",
            Marker::Float64 => "float64",
            Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32 => "string",
            Marker::Bin8 | Marker::Bin16 | Marker::Bin32 => "binary",
            Marker::FixArray(_) | Marker::Array16 | Marker::Array32 => "array",
            Marker::FixMap(_) | Marker::Map16 | Marker::Map32 => "map",
            Marker::FixExt1
            | Marker::FixExt2
            | Marker::FixExt4
            | Marker::FixExt8
            | Marker::FixExt16
            | Marker::Ext8
            | Marker::Ext16
            | Marker::Ext32 => "extension",
            Marker::Reserved(_) => "reserved marker",
        }
    }
}

/// Default resource limits.
pub mod limits {
    /// Maximum document size in bytes (2 billion)
    pub const MAX_DOCUMENT_SIZE: usize = 2_000_000_000;

    /// Maximum container nesting depth
    pub const MAX_DEPTH: usize = 512;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixint_markers() {
        assert_eq!(Marker::from_u8(0x00), Marker::PositiveFixInt(0));
        assert_eq!(Marker::from_u8(0x7f), Marker::PositiveFixInt(127));
        assert_eq!(Marker::from_u8(0xe0), Marker::NegativeFixInt(-32));
        assert_eq!(Marker::from_u8(0xff), Marker::NegativeFixInt(-1));
    }

    #[test]
    fn test_fix_container_markers() {
        assert_eq!(Marker::from_u8(0x83), Marker::FixMap(3));
        assert_eq!(Marker::from_u8(0x9f), Marker::FixArray(15));
        assert_eq!(Marker::from_u8(0xa0), Marker::FixStr(0));
        assert_eq!(Marker::from_u8(0xbf), Marker::FixStr(31));
        assert_eq!(Marker::from_u8(0x9f).implied_len(), 15);
    }

    #[test]
    fn test_length_field_sizes() {
        assert_eq!(Marker::from_u8(marker::BIN8).length_field_size(), Some(1));
        assert_eq!(Marker::from_u8(marker::EXT8).length_field_size(), Some(1));
        assert_eq!(Marker::from_u8(marker::ARRAY16).length_field_size(), Some(2));
        assert_eq!(Marker::from_u8(marker::MAP32).length_field_size(), Some(4));
        assert_eq!(Marker::from_u8(marker::FIXEXT4).length_field_size(), None);
        assert_eq!(Marker::from_u8(marker::FIXEXT4).implied_len(), 4);
    }

    #[test]
    fn test_reserved_marker() {
        assert_eq!(Marker::from_u8(marker::NEVER_USED), Marker::Reserved(0xc1));
        assert_eq!(Marker::Reserved(0xc1).kind_name(), "reserved marker");
    }

    #[test]
    fn test_integer_kind_names_follow_decoded_family() {
        assert_eq!(Marker::from_u8(0x01).kind_name(), "integer");
        assert_eq!(Marker::from_u8(0xff).kind_name(), "integer");
        assert_eq!(Marker::from_u8(marker::INT8).kind_name(), "integer");
        assert_eq!(Marker::from_u8(marker::UINT8).kind_name(), "unsigned integer");
    }
}
