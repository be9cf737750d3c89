// librfcl/src/protocol/codec/ascii.rs

use log::trace;

use super::{FrameCodec, Inbound, check_capacity, classify, resync, wait_leader};
use crate::constants::{
    ASCII_CARRIAGE_RETURN, ASCII_LEADER, ASCII_TERMINATOR, ASCII_TIME_EXTENSION, FRAME_OVERHEAD,
};
use crate::protocol::Frame;
use crate::transport::Transport;
use crate::types::WireProtocol;
use crate::utils::{byte_to_hex_pair, hex_value};
use crate::{Error, Result};

/// Human readable encoding: `$` + content as hex characters + `\n`.
///
/// There is no checksum. Every character the host sends is echoed by the
/// reader and compared before the next one goes out. In replies a `+`
/// means the reader needs more time and line breaks before the `$` are
/// skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiCodec;

impl AsciiCodec {
    /// Characters the host puts on the wire for `frame`.
    pub fn encode(frame: &Frame) -> Vec<u8> {
        let content = frame.content();
        let mut out = Vec::with_capacity(content.len() * 2 + 2);
        out.push(ASCII_LEADER);
        for b in content {
            out.extend_from_slice(&byte_to_hex_pair(b));
        }
        out.push(ASCII_TERMINATOR);
        out
    }

    fn send_echoed(transport: &mut dyn Transport, c: u8) -> Result<()> {
        let response_ms = transport.timeouts().response_ms;
        transport.send(&[c])?;
        let echoed = transport.receive_byte(response_ms)?;
        if echoed != c {
            return Err(resync(transport, Error::EchoMismatch { sent: c, echoed }));
        }
        Ok(())
    }

    fn read(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Frame> {
        let timeouts = transport.timeouts();

        // Before the leader: skip blank lines, honour keepalives.
        let mut c = wait_leader(transport, timeouts.response_ms)?;
        loop {
            match c {
                ASCII_LEADER => break,
                ASCII_TERMINATOR | ASCII_CARRIAGE_RETURN | ASCII_TIME_EXTENSION => {
                    c = wait_leader(transport, timeouts.response_ms)?;
                }
                other => {
                    return Err(Error::FrameFormat(format!(
                        "unexpected leader {other:#04x}"
                    )));
                }
            }
        }

        let limit = capacity + FRAME_OVERHEAD;
        let mut content = Vec::with_capacity(limit.min(crate::constants::MAX_FRAME_LEN));
        let mut high: Option<u8> = None;
        let mut wait_ms = timeouts.inter_byte_ms;
        loop {
            let c = transport.receive_byte(wait_ms)?;
            wait_ms = timeouts.inter_byte_ms;
            match c {
                ASCII_TERMINATOR => break,
                ASCII_CARRIAGE_RETURN => {}
                ASCII_TIME_EXTENSION => {
                    trace!("ascii << time extension");
                    wait_ms = timeouts.response_ms;
                }
                digit => {
                    let nibble = hex_value(digit)?;
                    match high.take() {
                        None => high = Some(nibble),
                        Some(h) => {
                            content.push((h << 4) | nibble);
                            if content.len() > limit {
                                return Err(Error::Overflow {
                                    capacity: limit,
                                    needed: content.len(),
                                });
                            }
                        }
                    }
                }
            }
        }
        if high.is_some() {
            return Err(Error::FrameFormat("odd number of hex characters".into()));
        }

        let frame = Frame::parse_content(&content)?;
        check_capacity(&frame, capacity)?;
        Ok(frame)
    }
}

impl FrameCodec for AsciiCodec {
    fn protocol(&self) -> WireProtocol {
        WireProtocol::Ascii
    }

    fn has_checksum(&self) -> bool {
        false
    }

    fn send_frame(&self, transport: &mut dyn Transport, frame: &Frame) -> Result<()> {
        let wire = Self::encode(frame);
        trace!("ascii >> {}", String::from_utf8_lossy(&wire).trim_end());
        for c in wire {
            Self::send_echoed(transport, c)?;
        }
        Ok(())
    }

    fn recv_frame(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Inbound> {
        match self.read(transport, capacity) {
            Ok(frame) => Ok(classify(frame)),
            Err(Error::NoResponse) => Err(Error::NoResponse),
            Err(e) => Err(resync(transport, e)),
        }
    }
}
