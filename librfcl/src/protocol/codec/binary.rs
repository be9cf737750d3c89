// librfcl/src/protocol/codec/binary.rs

use log::trace;

use super::{FrameCodec, Inbound, classify, read_binary_body, resync, wait_leader};
use crate::constants::{NAK, SYN};
use crate::protocol::Frame;
use crate::transport::Transport;
use crate::types::WireProtocol;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// Fast binary encoding: `[SYN] [content] [XOR]`.
///
/// A reply starting with `NAK` instead of `SYN` carries one failure code
/// byte and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryCodec;

impl BinaryCodec {
    /// Wire image of a frame.
    pub fn encode(frame: &Frame) -> Vec<u8> {
        let body = frame.content_with_checksum();
        let mut out = Vec::with_capacity(1 + body.len());
        out.push(SYN);
        out.extend_from_slice(&body);
        out
    }

    fn read(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Frame> {
        let timeouts = transport.timeouts();

        // Two-phase read: the leader alone gets the full response timeout,
        // the fixed header behind it only the inter-byte timeout. Some
        // USB-serial drivers mishandle one long multi-byte read.
        match wait_leader(transport, timeouts.response_ms)? {
            SYN => {}
            NAK => {
                let code = transport.receive_byte(timeouts.inter_byte_ms)?;
                return Err(Error::Nak { code });
            }
            other => {
                return Err(Error::FrameFormat(format!(
                    "unexpected leader {other:#04x}"
                )));
            }
        }

        let mut header = [0u8; 3];
        transport.receive(&mut header, timeouts.inter_byte_ms)?;
        read_binary_body(transport, header, capacity)
    }
}

impl FrameCodec for BinaryCodec {
    fn protocol(&self) -> WireProtocol {
        WireProtocol::Binary
    }

    fn send_frame(&self, transport: &mut dyn Transport, frame: &Frame) -> Result<()> {
        let wire = Self::encode(frame);
        trace!("binary >> {}", bytes_to_hex(&wire));
        transport.send(&wire)
    }

    fn recv_frame(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Inbound> {
        match self.read(transport, capacity) {
            Ok(frame) => {
                trace!(
                    "binary << seq={:#04x} status={:#04x} {}",
                    frame.sequence,
                    frame.code,
                    bytes_to_hex(&frame.payload)
                );
                Ok(classify(frame))
            }
            Err(e @ (Error::NoResponse | Error::Nak { .. })) => Err(e),
            Err(e) => Err(resync(transport, e)),
        }
    }
}
