// librfcl/src/types.rs

use crate::Error;
use bitflags::bitflags;
use derive_more::Display;
use std::convert::TryFrom;

/// Wire encoding used on a reader link. Exactly one is active per session.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WireProtocol {
    #[display(fmt = "OSI3964")]
    Osi3964,
    #[display(fmt = "ASCII")]
    Ascii,
    #[display(fmt = "Binary")]
    Binary,
    #[display(fmt = "Bus")]
    Bus,
}

impl WireProtocol {
    /// Order in which encodings are probed while connecting.
    pub const NEGOTIATION_ORDER: [WireProtocol; 4] = [
        WireProtocol::Binary,
        WireProtocol::Bus,
        WireProtocol::Osi3964,
        WireProtocol::Ascii,
    ];

    pub fn mask(self) -> ProtocolMask {
        match self {
            Self::Osi3964 => ProtocolMask::OSI3964,
            Self::Ascii => ProtocolMask::ASCII,
            Self::Binary => ProtocolMask::BINARY,
            Self::Bus => ProtocolMask::BUS,
        }
    }
}

bitflags! {
    /// Encodings a caller allows the connect-time negotiation to try.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ProtocolMask: u8 {
        const OSI3964 = 0x01;
        const ASCII = 0x02;
        const BINARY = 0x04;
        const BUS = 0x08;
    }
}

impl Default for ProtocolMask {
    fn default() -> Self {
        Self::OSI3964 | Self::ASCII | Self::BINARY
    }
}

bitflags! {
    /// Capabilities a reader advertises in its firmware answer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Capabilities: u8 {
        /// The reader keeps its last answer and can repeat it on request.
        const DUAL_BUFFER = 0x01;
        /// The reader runs the ISO14443-4 block protocol itself.
        const TCL_ENGINE = 0x02;
        /// The reader can sit on a shared RS485 line.
        const RS485 = 0x04;
        /// ISO14443 type B is supported.
        const TYPE_B = 0x08;
    }
}

/// How the byte stream reaches the reader
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterfaceKind {
    #[default]
    #[display(fmt = "serial")]
    Serial,
    #[display(fmt = "usb-serial")]
    UsbSerial,
    #[display(fmt = "tcp")]
    Tcp,
}

/// RF field state / card family the reader's front end is configured for
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RfMode {
    #[default]
    Off = 0x00,
    TypeA = 0x01,
    TypeB = 0x02,
}

impl TryFrom<u8> for RfMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Off),
            0x01 => Ok(Self::TypeA),
            0x02 => Ok(Self::TypeB),
            other => Err(Error::InvalidParameter(format!("rf mode {other:#04x}"))),
        }
    }
}

/// ISO14443 card family; selects the layer-3 exchange primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFamily {
    TypeA,
    TypeB,
}

/// Card identifier (CID), clamped to the usable range
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(fmt = "CID {}", _0)]
pub struct Cid(u8);

impl Cid {
    pub fn new(cid: u8) -> Self {
        Self(cid.min(crate::constants::TCL_MAX_CID))
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

/// Node address (NAD)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(fmt = "NAD {:#04x}", _0)]
pub struct Nad(u8);

impl Nad {
    pub const fn new(nad: u8) -> Self {
        Self(nad)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

/// Response and inter-byte timeouts of a link, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeouts {
    pub response_ms: u64,
    pub inter_byte_ms: u64,
}

impl Timeouts {
    pub const fn new(response_ms: u64, inter_byte_ms: u64) -> Self {
        Self {
            response_ms,
            inter_byte_ms,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_RESPONSE_TIMEOUT_MS,
            crate::constants::DEFAULT_INTER_BYTE_TIMEOUT_MS,
        )
    }
}

/// Firmware identification cached on the session after connect.
///
/// The reader answers `GetFirmware` with its version text, a NUL, and
/// one capability byte. Older firmwares omit the NUL and the flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirmwareInfo {
    pub version: String,
    pub capabilities: Capabilities,
}

impl FirmwareInfo {
    pub fn parse(payload: &[u8]) -> Self {
        let (text, rest) = match payload.iter().position(|&b| b == 0x00) {
            Some(pos) => (&payload[..pos], &payload[pos + 1..]),
            None => (payload, &[][..]),
        };
        let version = String::from_utf8_lossy(text).trim().to_string();
        let capabilities = rest
            .first()
            .map(|&b| Capabilities::from_bits_truncate(b))
            .unwrap_or_default();
        Self {
            version,
            capabilities,
        }
    }
}
