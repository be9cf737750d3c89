//! Hexadecimal helpers for trace output and the ASCII wire encoding.

use crate::{Error, Result};

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Convert a byte slice to a lowercase hex string without separators.
///
/// Example: `&[0xde, 0xad]` -> `"dead"`
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        use std::fmt::Write;
        // write! never fails writing to a String
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

/// Encode one byte as the two upper-case characters the ASCII framing
/// puts on the wire.
pub fn byte_to_hex_pair(b: u8) -> [u8; 2] {
    [DIGITS[(b >> 4) as usize], DIGITS[(b & 0x0f) as usize]]
}

/// Value of a single hex character, either case.
pub fn hex_value(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        other => Err(Error::FrameFormat(format!(
            "invalid hex character {other:#04x}"
        ))),
    }
}

/// Decode a pair of hex characters.
pub fn hex_pair_to_byte(hi: u8, lo: u8) -> Result<u8> {
    Ok((hex_value(hi)? << 4) | hex_value(lo)?)
}
