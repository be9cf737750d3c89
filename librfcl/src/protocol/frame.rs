// librfcl/src/protocol/frame.rs

use crate::constants::{MAX_PAYLOAD_LEN, STATUS_TIME_EXTENSION};
use crate::protocol::checksum::xor;
use crate::protocol::length::{decode_len, encode_len, encoded_len};
use crate::{Error, Result};

/// One application frame, independent of the wire encoding.
///
/// Content layout: `[Seq(1)] [Code(1)] [Len(1..)] [Payload(n)]`, where
/// `Len` is the base-128 continuation field and `Code` is the command
/// on the way to the reader and the status on the way back. Encodings
/// other than ASCII append `xor(content)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub sequence: u8,
    pub code: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build a frame, rejecting payloads larger than one frame can carry.
    pub fn new(sequence: u8, code: u8, payload: &[u8]) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge {
                max: MAX_PAYLOAD_LEN,
                actual: payload.len(),
            });
        }
        Ok(Self {
            sequence,
            code,
            payload: payload.to_vec(),
        })
    }

    /// Reply status (the code byte of an inbound frame).
    pub fn status(&self) -> u8 {
        self.code
    }

    /// A keepalive from the reader: status 0xFE and nothing else.
    pub fn is_time_extension(&self) -> bool {
        self.code == STATUS_TIME_EXTENSION && self.payload.is_empty()
    }

    /// Encode seq, code, length and payload.
    pub fn content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + encoded_len(self.payload.len()) + self.payload.len() + 1);
        out.push(self.sequence);
        out.push(self.code);
        encode_len(self.payload.len(), &mut out);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Content followed by its XOR checksum.
    pub fn content_with_checksum(&self) -> Vec<u8> {
        let mut out = self.content();
        out.push(xor(&out));
        out
    }

    /// Parse a complete content block (no checksum). The length field must
    /// account for every remaining byte.
    pub fn parse_content(content: &[u8]) -> Result<Self> {
        if content.len() < 3 {
            return Err(Error::FrameFormat(format!(
                "short frame: {} bytes",
                content.len()
            )));
        }
        let (len, used) = decode_len(&content[2..])?;
        let start = 2 + used;
        let required = start + len;
        if content.len() != required {
            return Err(Error::FrameFormat(format!(
                "length field says {required} bytes, got {}",
                content.len()
            )));
        }
        Ok(Self {
            sequence: content[0],
            code: content[1],
            payload: content[start..].to_vec(),
        })
    }

    /// Verify the trailing XOR and parse what precedes it.
    pub fn parse_checked(bytes: &[u8]) -> Result<Self> {
        let Some((&actual, content)) = bytes.split_last() else {
            return Err(Error::FrameFormat("empty frame".into()));
        };
        let expected = xor(content);
        if actual != expected {
            return Err(Error::ChecksumMismatch { expected, actual });
        }
        Self::parse_content(content)
    }
}
