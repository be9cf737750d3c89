// librfcl/src/constants.rs
//! Common protocol constants used across the crate

/// Start of heading, leads a Bus (RS485) frame
pub const SOH: u8 = 0x01;
/// Start of text, leads an OSI3964 frame
pub const STX: u8 = 0x02;
/// End of text, closes an OSI3964 frame after a DLE
pub const ETX: u8 = 0x03;
/// Bus handshake acknowledge
pub const ACK: u8 = 0x06;
/// OSI3964 escape and acknowledge byte
pub const DLE: u8 = 0x10;
/// Negative acknowledge; followed by a failure code in Binary and Bus
pub const NAK: u8 = 0x15;
/// Synchronous idle, leads a Binary frame
pub const SYN: u8 = 0x16;

/// ASCII frame leader
pub const ASCII_LEADER: u8 = b'$';
/// ASCII frame terminator
pub const ASCII_TERMINATOR: u8 = b'\n';
/// Ignored inside ASCII replies
pub const ASCII_CARRIAGE_RETURN: u8 = b'\r';
/// Inline ASCII time extension
pub const ASCII_TIME_EXTENSION: u8 = b'+';

/// Bus address every reader on the line answers to
pub const BUS_BROADCAST: u8 = 0xFF;

/// Largest payload a single frame may carry.
#[cfg(not(feature = "compact-frames"))]
pub const MAX_PAYLOAD_LEN: usize = 1024;
#[cfg(feature = "compact-frames")]
pub const MAX_PAYLOAD_LEN: usize = 256;

/// Room for sequence, code, length continuation bytes and checksum.
pub const FRAME_OVERHEAD: usize = 20;

/// Maximum frame content size (payload plus framing overhead)
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD_LEN + FRAME_OVERHEAD;

/// Upper bound for base-128 continuation bytes in a length field
pub const MAX_LEN_CONTINUATIONS: usize = MAX_FRAME_LEN / 0x80 + 1;

/// Reply status: command executed
pub const STATUS_OK: u8 = 0x00;
/// Reply status: reader keepalive, the real answer follows later
pub const STATUS_TIME_EXTENSION: u8 = 0xFE;

/// Recovery attempts the dialog engine makes before giving up
pub const DIALOG_MAX_RECOVERY: usize = 3;

/// Default response timeout (first byte of a reply)
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 1000;
/// Default inter-byte timeout
pub const DEFAULT_INTER_BYTE_TIMEOUT_MS: u64 = 100;
/// Default serial baud rate
pub const DEFAULT_BAUDRATE: u32 = 38_400;

/// T=CL: consecutive physical failures tolerated within one exchange
pub const TCL_MAX_RETRY: usize = 3;
/// T=CL: highest usable CID (15 is RFU)
pub const TCL_MAX_CID: u8 = 14;
/// T=CL: highest FSCI honoured
pub const TCL_MAX_FSCI: u8 = 8;
/// T=CL: highest FWI honoured
pub const TCL_MAX_FWI: u8 = 14;
/// T=CL: highest WTX multiplier
pub const TCL_MAX_WTXM: u8 = 59;
/// T=CL: bytes of every physical frame taken by the CRC
pub const TCL_CRC_LEN: usize = 2;
/// T=CL: receive ceiling (256 data + 2 status + 10 guard)
pub const TCL_MAX_RX: usize = 256 + 2 + 10;
/// T=CL: activation frame waiting time unit, 256 * 16 / fc in microseconds
pub const TCL_FWT_UNIT_US: u64 = 302;
