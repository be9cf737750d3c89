// librfcl/src/error.rs

use thiserror::Error;

/// Broad error families. The dialog engine only retries `Transport`
/// errors; the T=CL engine never retries `CardProtocol` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Link level failure: timeouts, framing, checksums, NAKs.
    Transport,
    /// The card broke ISO14443-4 flow control; re-activate it.
    CardProtocol,
    /// Caller error detected before any I/O.
    Contract,
    /// The reader executed the command and reported a failure status.
    Reader,
}

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("device not found")]
    DeviceNotFound,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("operation timed out")]
    Timeout,

    #[error("no response from reader")]
    NoResponse,

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("crc mismatch: expected {expected:#06x}, got {actual:#06x}")]
    CrcMismatch { expected: u16, actual: u16 },

    #[error("frame format error: {0}")]
    FrameFormat(String),

    #[error("echo mismatch: sent {sent:#04x}, echoed {echoed:#04x}")]
    EchoMismatch { sent: u8, echoed: u8 },

    #[error("sequence mismatch: expected {expected:#04x}, got {actual:#04x}")]
    SequenceMismatch { expected: u8, actual: u8 },

    #[error("reader answered NAK (code {code:#04x})")]
    Nak { code: u8 },

    #[error("no card in the field")]
    NoCard,

    #[error("unexpected block: {0}")]
    UnexpectedBlock(String),

    #[error("chaining violation: {0}")]
    ChainingViolation(String),

    #[error("receive overflow: capacity {capacity}, needed {needed}")]
    Overflow { capacity: usize, needed: usize },

    #[error("payload too large: max {max}, got {actual}")]
    PayloadTooLarge { max: usize, actual: usize },

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("reader status {status:#04x}")]
    ReaderStatus { status: u8 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedBlock(_) | Self::ChainingViolation(_) | Self::Overflow { .. } => {
                ErrorKind::CardProtocol
            }
            Self::PayloadTooLarge { .. }
            | Self::InvalidLength { .. }
            | Self::InvalidParameter(_)
            | Self::UnsupportedOperation(_) => ErrorKind::Contract,
            Self::ReaderStatus { .. } => ErrorKind::Reader,
            _ => ErrorKind::Transport,
        }
    }

    /// Errors on the receive path which the dialog engine may recover from
    /// by asking the reader to repeat its answer.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::NoResponse
                | Self::ChecksumMismatch { .. }
                | Self::FrameFormat(_)
                | Self::EchoMismatch { .. }
                | Self::SequenceMismatch { .. }
        )
    }

    /// Explicit NAK from the reader: the whole command must be resent.
    pub fn is_nak(&self) -> bool {
        matches!(self, Self::Nak { .. })
    }

    /// Nothing came back from the other side within the allotted time.
    pub fn is_silence(&self) -> bool {
        matches!(self, Self::Timeout | Self::NoResponse)
    }

    /// Stable numeric status for the error. Zero is reserved for success,
    /// so every error maps to a negative value.
    pub fn status(&self) -> i16 {
        match self {
            Self::NoCard => -1,
            Self::CrcMismatch { .. } => -2,
            Self::NoResponse => -3,
            Self::Timeout => -4,
            Self::UnexpectedBlock(_) => -10,
            Self::ChainingViolation(_) => -11,
            Self::Overflow { .. } => -12,
            Self::ReaderStatus { status } => -0x100 - i16::from(*status),
            Self::DeviceNotFound => -1001,
            Self::Io(_) => -1002,
            #[cfg(feature = "serial")]
            Self::Serial(_) => -1002,
            Self::ChecksumMismatch { .. } => -1003,
            Self::FrameFormat(_) => -1004,
            Self::EchoMismatch { .. } => -1005,
            Self::SequenceMismatch { .. } => -1006,
            Self::Nak { .. } => -1007,
            Self::PayloadTooLarge { .. } => -1010,
            Self::InvalidLength { .. } => -1011,
            Self::InvalidParameter(_) => -1012,
            Self::UnsupportedOperation(_) => -1013,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
