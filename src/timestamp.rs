// ABOUTME: MessagePack timestamp extension (type -1) resolution.
// ABOUTME: Decodes the 32-, 64- and 96-bit layouts into a seconds + nanoseconds instant.

use crate::error::{Corruption, Error, Result};
use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Extension type code reserved by MessagePack for timestamps.
pub const TIMESTAMP_EXT_TYPE: i8 = -1;

/// Newtype name the deserializer recognises to route a target to the
/// timestamp extension instead of a plain newtype.
pub(crate) const TIMESTAMP_NEWTYPE: &str = "$msgpack_dataspec::Timestamp";

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// An instant measured from the Unix epoch, independent of any calendar.
///
/// `seconds` is signed so far-past instants (such as [`Timestamp::DISTANT_PAST`])
/// are representable; `nanoseconds` is always below one second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    pub const UNIX_EPOCH: Self = Self::from_seconds(0);

    /// Sentinel for the earliest representable date (0001-01-01).
    pub const DISTANT_PAST: Self = Self::from_seconds(-62_135_769_600);

    /// Sentinel for the latest representable date (4001-01-01).
    pub const DISTANT_FUTURE: Self = Self::from_seconds(64_092_211_200);

    /// Returns `None` if `nanoseconds` is not below one second.
    #[must_use]
    pub const fn new(seconds: i64, nanoseconds: u32) -> Option<Self> {
        if nanoseconds >= NANOS_PER_SECOND {
            return None;
        }
        Some(Self {
            seconds,
            nanoseconds,
        })
    }

    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds: 0,
        }
    }

    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    #[must_use]
    pub const fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Resolve an extension value into a timestamp.
    ///
    /// Payload layouts (all big-endian):
    /// - 4 bytes: unsigned 32-bit seconds
    /// - 8 bytes: 30-bit nanoseconds in the high bits, 34-bit seconds in the low bits
    /// - 12 bytes: unsigned 32-bit nanoseconds, then signed 64-bit seconds
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `type_code` is not -1; `DataCorrupted(InvalidTimestamp)`
    /// for any other payload length or out-of-range nanoseconds.
    pub fn from_ext(type_code: i8, payload: &[u8]) -> Result<Self> {
        if type_code != TIMESTAMP_EXT_TYPE {
            return Err(Error::mismatch(
                "timestamp",
                format!("extension type {type_code}"),
            ));
        }

        let (seconds, nanoseconds) = match *payload {
            [a, b, c, d] => (i64::from(u32::from_be_bytes([a, b, c, d])), 0),
            [a, b, c, d, e, f, g, h] => {
                let word = u64::from_be_bytes([a, b, c, d, e, f, g, h]);
                #[allow(clippy::cast_possible_truncation)]
                let nanoseconds = (word >> 34) as u32;
                #[allow(clippy::cast_possible_wrap)]
                let seconds = (word & 0x0000_0003_ffff_ffff) as i64;
                (seconds, nanoseconds)
            }
            [a, b, c, d, ref rest @ ..] if rest.len() == 8 => {
                let mut secs = [0u8; 8];
                secs.copy_from_slice(rest);
                (i64::from_be_bytes(secs), u32::from_be_bytes([a, b, c, d]))
            }
            _ => return Err(Corruption::InvalidTimestamp.into()),
        };

        Self::new(seconds, nanoseconds).ok_or_else(|| Corruption::InvalidTimestamp.into())
    }

    /// Convert to a `SystemTime`, if the platform can represent the instant.
    #[must_use]
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let nanos = Duration::from_nanos(u64::from(self.nanoseconds));
        if self.seconds >= 0 {
            UNIX_EPOCH
                .checked_add(Duration::from_secs(self.seconds.unsigned_abs()))?
                .checked_add(nanos)
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(self.seconds.unsigned_abs()))?
                .checked_add(nanos)
        }
    }

    /// Convert from a `SystemTime`. Returns `None` if the seconds overflow i64.
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Option<Self> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::new(i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
            Err(before) => {
                let before = before.duration();
                let mut seconds = -i64::try_from(before.as_secs()).ok()?;
                let mut nanoseconds = before.subsec_nanos();
                if nanoseconds > 0 {
                    seconds = seconds.checked_sub(1)?;
                    nanoseconds = NANOS_PER_SECOND - nanoseconds;
                }
                Self::new(seconds, nanoseconds)
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.seconds, self.nanoseconds)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(TIMESTAMP_NEWTYPE, TimestampVisitor)
    }
}

/// Accepts `(seconds, nanoseconds)` pairs, or the raw `(type_code, payload)`
/// extension pair when the value was buffered by serde first.
struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a MessagePack timestamp")
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Timestamp, D::Error> {
        deserializer.deserialize_tuple(2, self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Timestamp, A::Error> {
        let first: i64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let second: SecondPart = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        match second {
            SecondPart::Nanoseconds(nanoseconds) => Timestamp::new(first, nanoseconds)
                .ok_or_else(|| de::Error::custom("timestamp nanoseconds out of range")),
            SecondPart::Payload(payload) => {
                let type_code = i8::try_from(first)
                    .map_err(|_| de::Error::custom(format!("extension type {first} out of range")))?;
                Timestamp::from_ext(type_code, &payload).map_err(de::Error::custom)
            }
        }
    }
}

/// Second element of a timestamp pair: nanoseconds, or an extension payload.
enum SecondPart {
    Nanoseconds(u32),
    Payload(Vec<u8>),
}

impl<'de> Deserialize<'de> for SecondPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(SecondPartVisitor)
    }
}

struct SecondPartVisitor;

impl<'de> Visitor<'de> for SecondPartVisitor {
    type Value = SecondPart;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "nanoseconds or an extension payload")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<SecondPart, E> {
        u32::try_from(v)
            .map(SecondPart::Nanoseconds)
            .map_err(|_| E::custom("timestamp nanoseconds out of range"))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<SecondPart, E> {
        u32::try_from(v)
            .map(SecondPart::Nanoseconds)
            .map_err(|_| E::custom("timestamp nanoseconds out of range"))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<SecondPart, E> {
        Ok(SecondPart::Payload(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<SecondPart, E> {
        Ok(SecondPart::Payload(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_32bit_layout() {
        let ts = Timestamp::from_ext(-1, &[0x00, 0x00, 0x00, 0x01]).unwrap();
        assert_eq!(ts, Timestamp::from_seconds(1));
    }

    #[test]
    fn test_64bit_layout() {
        // nanoseconds = 500, seconds = 2^33 + 7
        let word: u64 = (500u64 << 34) | (1u64 << 33) | 7;
        let ts = Timestamp::from_ext(-1, &word.to_be_bytes()).unwrap();
        assert_eq!(ts.seconds(), (1i64 << 33) + 7);
        assert_eq!(ts.nanoseconds(), 500);
    }

    #[test]
    fn test_96bit_sentinels() {
        let past = [0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xf1, 0x88, 0x6b, 0x66, 0x00];
        assert_eq!(Timestamp::from_ext(-1, &past).unwrap(), Timestamp::DISTANT_PAST);

        let future = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0e, 0xec, 0x31, 0x88, 0x00];
        assert_eq!(Timestamp::from_ext(-1, &future).unwrap(), Timestamp::DISTANT_FUTURE);
    }

    #[test]
    fn test_rejects_other_types_and_lengths() {
        assert!(matches!(
            Timestamp::from_ext(5, &[0, 0, 0, 1]),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(
            Timestamp::from_ext(-1, &[0, 0]).unwrap_err().corruption(),
            Some(Corruption::InvalidTimestamp)
        );
        // 96-bit form with nanoseconds = 1_000_000_000
        let bad = [0x3b, 0x9a, 0xca, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            Timestamp::from_ext(-1, &bad).unwrap_err().corruption(),
            Some(Corruption::InvalidTimestamp)
        );
    }

    #[test]
    fn test_system_time_conversion() {
        let ts = Timestamp::new(-2, 250_000_000).unwrap();
        let time = ts.to_system_time().unwrap();
        assert_eq!(Timestamp::from_system_time(time), Some(ts));
        assert_eq!(
            Timestamp::from_seconds(1).to_system_time(),
            Some(UNIX_EPOCH + Duration::from_secs(1))
        );
    }
}
