// ABOUTME: Numeric reconciliation between the encoded number family and the requested Rust type.
// ABOUTME: Strict rejects cross-family requests; Cast converts when the value survives.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use crate::error::{Error, Result};
use tracing::debug;

/// How to handle a number whose encoded family differs from the requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericStrategy {
    /// Fail with a type mismatch (default).
    #[default]
    Strict,
    /// Convert, accepting precision loss for float narrowing.
    Cast,
}

/// A decoded MessagePack number, still tagged with its encoded family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
}

impl Number {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Number::Int(_) => "integer",
            Number::UInt(_) => "unsigned integer",
            Number::F32(_) => "float32",
            Number::F64(_) => "float64",
        }
    }
}

/// Integer families convert to any integer type the value fits in, under
/// either strategy. Floats convert only under `Cast`, and only when finite,
/// integral and in range.
pub(crate) fn to_integer<T>(number: Number, strategy: NumericStrategy, expected: &'static str) -> Result<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    match number {
        Number::Int(v) => T::try_from(v).map_err(|_| Error::mismatch(expected, format!("integer {v}"))),
        Number::UInt(v) => T::try_from(v).map_err(|_| Error::mismatch(expected, format!("integer {v}"))),
        Number::F32(v) => float_to_integer(f64::from(v), number, strategy, expected),
        Number::F64(v) => float_to_integer(v, number, strategy, expected),
    }
}

fn float_to_integer<T>(value: f64, number: Number, strategy: NumericStrategy, expected: &'static str) -> Result<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if strategy == NumericStrategy::Strict {
        return Err(Error::mismatch(expected, number.kind_name()));
    }
    let lossy = || Error::mismatch(expected, format!("{} {value}", number.kind_name()));
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(lossy());
    }
    debug!(from = number.kind_name(), to = expected, "casting float to integer");
    // 2^63 and 2^64 are exact in f64; the open upper bounds keep the casts lossless.
    if value < 0.0 {
        if value < i64::MIN as f64 {
            return Err(lossy());
        }
        T::try_from(value as i64).map_err(|_| lossy())
    } else {
        if value >= 18_446_744_073_709_551_616.0 {
            return Err(lossy());
        }
        T::try_from(value as u64).map_err(|_| lossy())
    }
}

pub(crate) fn to_f32(number: Number, strategy: NumericStrategy) -> Result<f32> {
    match (number, strategy) {
        (Number::F32(v), _) => Ok(v),
        (_, NumericStrategy::Strict) => Err(Error::mismatch("f32", number.kind_name())),
        (Number::F64(v), NumericStrategy::Cast) => {
            debug!(from = "float64", to = "f32", "narrowing float");
            Ok(v as f32)
        }
        (Number::Int(v), NumericStrategy::Cast) => Ok(v as f32),
        (Number::UInt(v), NumericStrategy::Cast) => Ok(v as f32),
    }
}

pub(crate) fn to_f64(number: Number, strategy: NumericStrategy) -> Result<f64> {
    match (number, strategy) {
        (Number::F64(v), _) => Ok(v),
        (_, NumericStrategy::Strict) => Err(Error::mismatch("f64", number.kind_name())),
        (Number::F32(v), NumericStrategy::Cast) => {
            debug!(from = "float32", to = "f64", "widening float");
            Ok(f64::from(v))
        }
        (Number::Int(v), NumericStrategy::Cast) => Ok(v as f64),
        (Number::UInt(v), NumericStrategy::Cast) => Ok(v as f64),
    }
}
