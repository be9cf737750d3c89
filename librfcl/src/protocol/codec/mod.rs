// librfcl/src/protocol/codec/mod.rs

//! Wire encodings. A session picks one `FrameCodec` at connect time and
//! keeps it; the dialog engine only ever talks to the trait.

pub mod ascii;
pub mod binary;
pub mod bus;
pub mod osi3964;

pub use ascii::AsciiCodec;
pub use binary::BinaryCodec;
pub use bus::BusCodec;
pub use osi3964::Osi3964Codec;

use log::trace;

use crate::protocol::Frame;
use crate::protocol::length::LengthDecoder;
use crate::transport::Transport;
use crate::types::WireProtocol;
use crate::{Error, Result};

/// What came back from the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete, integrity-checked frame
    Frame(Frame),
    /// Keepalive: the reader needs more time, keep listening
    TimeExtension,
}

pub trait FrameCodec {
    /// Encoding implemented by this codec
    fn protocol(&self) -> WireProtocol;

    /// Whether frames carry the trailing XOR checksum
    fn has_checksum(&self) -> bool {
        true
    }

    /// Put one frame on the wire, including any handshake the encoding
    /// requires before or after the body.
    fn send_frame(&self, transport: &mut dyn Transport, frame: &Frame) -> Result<()>;

    /// Read one frame whose payload must not exceed `capacity` bytes.
    fn recv_frame(&self, transport: &mut dyn Transport, capacity: usize) -> Result<Inbound>;
}

/// Build the codec for a negotiated encoding.
pub fn codec_for(protocol: WireProtocol, bus_address: u8) -> Box<dyn FrameCodec> {
    match protocol {
        WireProtocol::Osi3964 => Box::new(Osi3964Codec),
        WireProtocol::Ascii => Box::new(AsciiCodec),
        WireProtocol::Binary => Box::new(BinaryCodec),
        WireProtocol::Bus => Box::new(BusCodec::new(bus_address)),
    }
}

/// Drain pending input after a framing violation so the next frame
/// starts clean, then hand the original error back.
pub(crate) fn resync(transport: &mut dyn Transport, err: Error) -> Error {
    trace!("resynchronising stream after: {err}");
    let _ = transport.purge();
    err
}

/// Wait for the first byte of an answer. Silence at this point means the
/// reader never answered at all.
pub(crate) fn wait_leader(transport: &mut dyn Transport, timeout_ms: u64) -> Result<u8> {
    transport.receive_byte(timeout_ms).map_err(|e| match e {
        Error::Timeout => Error::NoResponse,
        other => other,
    })
}

pub(crate) fn classify(frame: Frame) -> Inbound {
    if frame.is_time_extension() {
        Inbound::TimeExtension
    } else {
        Inbound::Frame(frame)
    }
}

/// Read the rest of a Binary-style body once `seq`, `status` and the first
/// length byte are known: continuation length bytes, payload, checksum.
pub(crate) fn read_binary_body(
    transport: &mut dyn Transport,
    header: [u8; 3],
    capacity: usize,
) -> Result<Frame> {
    let inter_byte_ms = transport.timeouts().inter_byte_ms;
    let mut raw = Vec::with_capacity(capacity.min(crate::constants::MAX_FRAME_LEN) + 8);
    raw.extend_from_slice(&header);

    let mut decoder = LengthDecoder::new();
    let mut next = header[2];
    let len = loop {
        if let Some(len) = decoder.push(next)? {
            break len;
        }
        next = transport.receive_byte(inter_byte_ms)?;
        raw.push(next);
    };
    if len > capacity {
        return Err(Error::Overflow {
            capacity,
            needed: len,
        });
    }

    let start = raw.len();
    raw.resize(start + len + 1, 0);
    transport.receive(&mut raw[start..], inter_byte_ms)?;
    Frame::parse_checked(&raw)
}

/// Reject a decoded frame whose payload exceeds the caller's capacity.
pub(crate) fn check_capacity(frame: &Frame, capacity: usize) -> Result<()> {
    if frame.payload.len() > capacity {
        return Err(Error::Overflow {
            capacity,
            needed: frame.payload.len(),
        });
    }
    Ok(())
}
