// librfcl/src/transport/traits.rs

use crate::types::{InterfaceKind, Timeouts};
use crate::{Error, Result};

/// Upper bound on bytes discarded by the default `purge`.
const PURGE_LIMIT: usize = 4096;

/// Transport trait abstracts the raw byte pipe away from the framing and
/// dialog logic. Reads are all-or-nothing: either the whole buffer is
/// filled within the timeouts or an error is returned.
pub trait Transport {
    /// Send raw bytes to the reader
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Fill `buf` completely. The first byte may take up to
    /// `first_byte_ms`; each following byte must arrive within the
    /// configured inter-byte timeout. Returns `Error::Timeout` otherwise.
    fn receive(&mut self, buf: &mut [u8], first_byte_ms: u64) -> Result<()>;

    /// Configure the response and inter-byte timeouts
    fn set_timeouts(&mut self, timeouts: Timeouts) -> Result<()>;

    /// Currently configured timeouts
    fn timeouts(&self) -> Timeouts;

    /// Kind of physical interface behind this transport
    fn interface(&self) -> InterfaceKind;

    /// Change the line speed. Transports without a notion of baud rate
    /// accept any value.
    fn set_baudrate(&mut self, _baudrate: u32) -> Result<()> {
        Ok(())
    }

    /// Discard whatever input is pending so the next frame starts on a
    /// clean stream. The default reads single bytes until the line stays
    /// quiet for one inter-byte timeout.
    fn purge(&mut self) -> Result<()> {
        let quiet_ms = self.timeouts().inter_byte_ms;
        let mut byte = [0u8; 1];
        for _ in 0..PURGE_LIMIT {
            match self.receive(&mut byte, quiet_ms) {
                Ok(()) => continue,
                Err(Error::Timeout) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Receive one byte, waiting up to `first_byte_ms` for it.
    fn receive_byte(&mut self, first_byte_ms: u64) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.receive(&mut byte, first_byte_ms)?;
        Ok(byte[0])
    }
}
