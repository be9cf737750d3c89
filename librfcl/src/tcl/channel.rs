// librfcl/src/tcl/channel.rs

use log::trace;

use crate::constants::TCL_CRC_LEN;
use crate::protocol::checksum::{crc_a, crc_b};
use crate::types::CardFamily;
use crate::utils::{bytes_to_hex, us_to_ms_ceil};
use crate::{Error, Result};

/// One half-duplex block exchange with an activated card.
///
/// `block` is a complete ISO14443-4 block without CRC; the reply is handed
/// back the same way. `fwt_us` bounds the wait for the card's answer.
pub trait BlockChannel {
    fn exchange_block(&mut self, block: &[u8], fwt_us: u64) -> Result<Vec<u8>>;
}

impl<C: BlockChannel + ?Sized> BlockChannel for &mut C {
    fn exchange_block(&mut self, block: &[u8], fwt_us: u64) -> Result<Vec<u8>> {
        (**self).exchange_block(block, fwt_us)
    }
}

/// Bit-exact layer-3 frame exchange. Frames go out with their CRC and the
/// reply comes back with the card's CRC still attached.
pub trait Layer3 {
    fn exchange_a(&mut self, frame: &[u8], timeout_ms: u64) -> Result<Vec<u8>>;
    fn exchange_b(&mut self, frame: &[u8], timeout_ms: u64) -> Result<Vec<u8>>;
}

impl<L: Layer3 + ?Sized> Layer3 for &mut L {
    fn exchange_a(&mut self, frame: &[u8], timeout_ms: u64) -> Result<Vec<u8>> {
        (**self).exchange_a(frame, timeout_ms)
    }

    fn exchange_b(&mut self, frame: &[u8], timeout_ms: u64) -> Result<Vec<u8>> {
        (**self).exchange_b(frame, timeout_ms)
    }
}

/// Block channel for readers without a T=CL engine: CRC handling is done
/// here and every block goes through a raw layer-3 exchange.
pub struct SoftwareChannel<L: Layer3> {
    layer3: L,
    family: CardFamily,
}

impl<L: Layer3> SoftwareChannel<L> {
    pub fn new(layer3: L, family: CardFamily) -> Self {
        Self { layer3, family }
    }

    pub fn family(&self) -> CardFamily {
        self.family
    }

    pub fn into_inner(self) -> L {
        self.layer3
    }

    fn crc(&self, data: &[u8]) -> u16 {
        match self.family {
            CardFamily::TypeA => crc_a(data),
            CardFamily::TypeB => crc_b(data),
        }
    }
}

impl<L: Layer3> BlockChannel for SoftwareChannel<L> {
    fn exchange_block(&mut self, block: &[u8], fwt_us: u64) -> Result<Vec<u8>> {
        if block.is_empty() {
            return Err(Error::InvalidLength {
                expected: 1,
                actual: 0,
            });
        }
        let mut frame = Vec::with_capacity(block.len() + TCL_CRC_LEN);
        frame.extend_from_slice(block);
        frame.extend_from_slice(&self.crc(block).to_le_bytes());

        let timeout_ms = us_to_ms_ceil(fwt_us);
        trace!("tcl >> {} ({} ms)", bytes_to_hex(&frame), timeout_ms);
        let mut reply = match self.family {
            CardFamily::TypeA => self.layer3.exchange_a(&frame, timeout_ms)?,
            CardFamily::TypeB => self.layer3.exchange_b(&frame, timeout_ms)?,
        };
        trace!("tcl << {}", bytes_to_hex(&reply));

        if reply.len() < 1 + TCL_CRC_LEN {
            return Err(Error::FrameFormat(format!(
                "card reply of {} bytes",
                reply.len()
            )));
        }
        let body_len = reply.len() - TCL_CRC_LEN;
        let actual = u16::from_le_bytes([reply[body_len], reply[body_len + 1]]);
        let expected = self.crc(&reply[..body_len]);
        if actual != expected {
            return Err(Error::CrcMismatch { expected, actual });
        }
        reply.truncate(body_len);
        Ok(reply)
    }
}
