// librfcl/src/protocol/length.rs

//! Base-128 continuation length field.
//!
//! Every byte >= 0x80 adds exactly 0x80 to the running length, whatever
//! its low bits hold; the first byte below 0x80 adds its own value and
//! ends the field. 300 is therefore `80 80 2C`.

use crate::constants::MAX_LEN_CONTINUATIONS;
use crate::{Error, Result};

const CONTINUATION: u8 = 0x80;

/// Number of bytes the length field takes for `len`.
pub fn encoded_len(len: usize) -> usize {
    len / CONTINUATION as usize + 1
}

/// Append the length field for `len` to `out`.
pub fn encode_len(len: usize, out: &mut Vec<u8>) {
    let mut remaining = len;
    while remaining >= CONTINUATION as usize {
        out.push(CONTINUATION);
        remaining -= CONTINUATION as usize;
    }
    out.push(remaining as u8);
}

/// Incremental decoder, fed one byte at a time while reading from the
/// wire.
#[derive(Debug, Default, Clone, Copy)]
pub struct LengthDecoder {
    total: usize,
    continuations: usize,
}

impl LengthDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns `Some(len)` once the field is complete.
    pub fn push(&mut self, byte: u8) -> Result<Option<usize>> {
        if byte >= CONTINUATION {
            self.continuations += 1;
            if self.continuations > MAX_LEN_CONTINUATIONS {
                return Err(Error::FrameFormat(format!(
                    "length field longer than {MAX_LEN_CONTINUATIONS} continuation bytes"
                )));
            }
            self.total += CONTINUATION as usize;
            Ok(None)
        } else {
            Ok(Some(self.total + byte as usize))
        }
    }
}

/// Decode a complete length field at the start of `data`. Returns the
/// length and the number of bytes consumed.
pub fn decode_len(data: &[u8]) -> Result<(usize, usize)> {
    let mut decoder = LengthDecoder::new();
    for (i, &b) in data.iter().enumerate() {
        if let Some(len) = decoder.push(b)? {
            return Ok((len, i + 1));
        }
    }
    Err(Error::FrameFormat("truncated length field".into()))
}
