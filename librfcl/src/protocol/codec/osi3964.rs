// librfcl/src/protocol/codec/osi3964.rs

use log::trace;

use super::{FrameCodec, Inbound, check_capacity, classify, resync, wait_leader};
use crate::constants::{DLE, ETX, FRAME_OVERHEAD, NAK, STX};
use crate::protocol::Frame;
use crate::transport::Transport;
use crate::types::WireProtocol;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// OSI3964 encoding with DLE byte stuffing.
///
/// ```text
/// host:   STX            content+XOR (DLE doubled) DLE ETX
/// reader:     DLE                                          DLE
/// ```
/// Replies run the same exchange with the roles swapped.
#[derive(Debug, Default, Clone, Copy)]
pub struct Osi3964Codec;

/// Double every DLE in `body` and close it with `DLE ETX`.
pub fn stuff(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + body.len() / 8 + 2);
    for &b in body {
        out.push(b);
        if b == DLE {
            out.push(DLE);
        }
    }
    out.push(DLE);
    out.push(ETX);
    out
}

impl Osi3964Codec {
    fn expect_dle(transport: &mut dyn Transport, timeout_ms: u64) -> Result<()> {
        match wait_leader(transport, timeout_ms)? {
            DLE => Ok(()),
            NAK => Err(Error::Nak { code: NAK }),
            other => Err(resync(
                transport,
                Error::FrameFormat(format!("expected DLE, got {other:#04x}")),
            )),
        }
    }

    fn read_stuffed(transport: &mut dyn Transport, limit: usize) -> Result<Vec<u8>> {
        let inter_byte_ms = transport.timeouts().inter_byte_ms;
        let mut body = Vec::with_capacity(limit.min(crate::constants::MAX_FRAME_LEN));
        loop {
            let b = transport.receive_byte(inter_byte_ms)?;
            if b == DLE {
                match transport.receive_byte(inter_byte_ms)? {
                    DLE => body.push(DLE),
                    ETX => return Ok(body),
                    other => {
                        return Err(Error::FrameFormat(format!(
                            "DLE followed by {other:#04x}"
                        )));
                    }
                }
            } else {
                body.push(b);
            }
            if body.len() > limit {
                return Err(Error::Overflow {
                    capacity: limit,
                    needed: body.len(),
                });
            }
        }
    }

    fn read(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Frame> {
        let response_ms = transport.timeouts().response_ms;
        match wait_leader(transport, response_ms)? {
            STX => {}
            NAK => return Err(Error::Nak { code: NAK }),
            other => {
                return Err(Error::FrameFormat(format!(
                    "unexpected leader {other:#04x}"
                )));
            }
        }
        transport.send(&[DLE])?;

        let body = Self::read_stuffed(transport, capacity + FRAME_OVERHEAD)?;
        let frame = match Frame::parse_checked(&body) {
            Ok(frame) => frame,
            Err(e) => {
                let _ = transport.send(&[NAK]);
                return Err(e);
            }
        };
        transport.send(&[DLE])?;
        check_capacity(&frame, capacity)?;
        Ok(frame)
    }
}

impl FrameCodec for Osi3964Codec {
    fn protocol(&self) -> WireProtocol {
        WireProtocol::Osi3964
    }

    fn send_frame(&self, transport: &mut dyn Transport, frame: &Frame) -> Result<()> {
        let response_ms = transport.timeouts().response_ms;
        transport.send(&[STX])?;
        Self::expect_dle(transport, response_ms)?;

        let wire = stuff(&frame.content_with_checksum());
        trace!("3964 >> {}", bytes_to_hex(&wire));
        transport.send(&wire)?;
        Self::expect_dle(transport, response_ms)
    }

    fn recv_frame(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Inbound> {
        match self.read(transport, capacity) {
            Ok(frame) => Ok(classify(frame)),
            Err(e @ (Error::NoResponse | Error::Nak { .. })) => Err(e),
            Err(e) => Err(resync(transport, e)),
        }
    }
}
