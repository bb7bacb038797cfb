//! Derive a TL constructor id via CRC-32 when no explicit `#id` is given.

/// Compute the CRC-32 constructor id of a definition string.
///
/// Whitespace runs are collapsed to a single space and the trailing `;`
/// is dropped before hashing, so `boolFalse  =  Bool;` and
/// `boolFalse = Bool` hash identically.
pub(crate) fn tl_id(definition: &str) -> u32 {
    let normalized = definition
        .trim()
        .trim_end_matches(';')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    crc32(normalized.as_bytes())
}

/// Standard CRC-32 (ISO 3309 / ITU-T V.42).
fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids() {
        assert_eq!(tl_id("boolFalse = Bool"), 0xbc799737);
        assert_eq!(tl_id("boolTrue   =  Bool;"), 0x997275b5);
    }
}
