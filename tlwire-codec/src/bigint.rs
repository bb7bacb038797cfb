//! Conversions between big-integer strings and fixed-width little-endian bytes.
//!
//! `long`, `int128` and `int256` values travel through the codec as strings:
//! a `0x`-prefixed big-endian hex string (what decoding always produces) or a
//! decimal string. Strings keep 128/256-bit values exact where no native
//! integer would.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Num;

use crate::error::{Error, Result};

/// Encode `value` into exactly `width` little-endian bytes.
///
/// Hex input keeps its least-significant `width` bytes and is zero-padded on
/// the high end. Decimal input goes through [`BigInt`]; negative numbers are
/// sign-extended in two's complement.
pub fn to_le_bytes(value: &str, width: usize) -> Result<Vec<u8>> {
    if width % 4 != 0 {
        return Err(Error::InvalidWidth { width });
    }
    let invalid = || Error::InvalidBigInt { value: value.to_owned() };
    let trimmed = value.trim();

    let (mut bytes, fill) = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        if hex.is_empty() {
            (Vec::new(), 0u8)
        } else {
            let n = BigUint::from_str_radix(hex, 16).map_err(|_| invalid())?;
            (n.to_bytes_le(), 0u8)
        }
    } else {
        let n = BigInt::from_str_radix(trimmed, 10).map_err(|_| invalid())?;
        let fill = if n.sign() == Sign::Minus { 0xff } else { 0x00 };
        (n.to_signed_bytes_le(), fill)
    };

    bytes.resize(width, fill);
    Ok(bytes)
}

/// Render little-endian wire bytes as a `0x`-prefixed big-endian hex string.
///
/// Leading zero bytes are kept, so the string length always reflects the
/// field width (`0x0000000000000001` for a `long` of 1).
pub fn from_le_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes.iter().rev() {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
