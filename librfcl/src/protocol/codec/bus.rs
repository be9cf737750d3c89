// librfcl/src/protocol/codec/bus.rs

use log::{debug, trace};

use super::{FrameCodec, Inbound, classify, read_binary_body, resync, wait_leader};
use crate::constants::{ACK, BUS_BROADCAST, NAK, SOH};
use crate::protocol::Frame;
use crate::transport::Transport;
use crate::types::WireProtocol;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// RS485 multidrop encoding.
///
/// Host: `[SOH] [addr]`, reader answers `ACK` (or `NAK` + code), host then
/// sends the Binary body without its `SYN`. Reader: `[SOH] [addr]` followed
/// by a Binary body.
#[derive(Debug, Clone, Copy)]
pub struct BusCodec {
    address: u8,
}

impl BusCodec {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    fn expect_ack(&self, transport: &mut dyn Transport) -> Result<()> {
        let timeouts = transport.timeouts();
        match wait_leader(transport, timeouts.response_ms)? {
            ACK => Ok(()),
            NAK => {
                let code = transport.receive_byte(timeouts.inter_byte_ms)?;
                Err(Error::Nak { code })
            }
            other => Err(resync(
                transport,
                Error::FrameFormat(format!("bus handshake answered {other:#04x}")),
            )),
        }
    }

    fn read(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Frame> {
        let timeouts = transport.timeouts();
        match wait_leader(transport, timeouts.response_ms)? {
            SOH => {}
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

        let mut head = [0u8; 4];
        transport.receive(&mut head, timeouts.inter_byte_ms)?;
        let from = head[0];
        if self.address != BUS_BROADCAST && from != self.address {
            return Err(Error::FrameFormat(format!(
                "reply from bus address {from:#04x}, expected {:#04x}",
                self.address
            )));
        }
        read_binary_body(transport, [head[1], head[2], head[3]], capacity)
    }
}

impl FrameCodec for BusCodec {
    fn protocol(&self) -> WireProtocol {
        WireProtocol::Bus
    }

    fn send_frame(&self, transport: &mut dyn Transport, frame: &Frame) -> Result<()> {
        transport.send(&[SOH, self.address])?;
        self.expect_ack(transport)?;
        let body = frame.content_with_checksum();
        trace!("bus[{:#04x}] >> {}", self.address, bytes_to_hex(&body));
        transport.send(&body)
    }

    fn recv_frame(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Inbound> {
        match self.read(transport, capacity) {
            Ok(frame) => Ok(classify(frame)),
            Err(e @ (Error::NoResponse | Error::Nak { .. })) => Err(e),
            Err(e) => {
                debug!("bus[{:#04x}] receive failed: {e}", self.address);
                Err(resync(transport, e))
            }
        }
    }
}
