// librfcl/src/protocol/commands.rs

use crate::types::{CardFamily, Cid, Nad, RfMode};

/// Command code: firmware version and capability flags
pub const CMD_GET_FIRMWARE: u8 = 0x4F;
/// Command code: RF front-end configuration
pub const CMD_SET_RF_MODE: u8 = 0x58;
/// Command code: ask the reader to send its last answer again
pub const CMD_REPEAT: u8 = 0x7F;
/// Command code: bit-exact ISO14443-A frame exchange
pub const CMD_RAW_EXCHANGE_A: u8 = 0x94;
/// Command code: bit-exact ISO14443-B frame exchange
pub const CMD_RAW_EXCHANGE_B: u8 = 0x95;
/// Command code: message exchange through the reader's own T=CL engine
pub const CMD_TCL_EXCHANGE: u8 = 0x96;
/// Command code: DESELECT through the reader's own T=CL engine
pub const CMD_TCL_DESELECT: u8 = 0x97;

/// Reader status: the card did not answer a raw exchange in time
pub const STATUS_CARD_MUTE: u8 = 0x01;

const TCL_FLAG_CID: u8 = 0x01;
const TCL_FLAG_NAD: u8 = 0x02;

/// Commands the driver core issues itself. Vendor catalogs go through
/// `Command::Raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetFirmware,
    SetRfMode {
        mode: RfMode,
    },
    /// Layer-3 exchange; `frame` already carries its CRC, the reply will too.
    RawExchange {
        family: CardFamily,
        timeout_ms: u16,
        frame: Vec<u8>,
    },
    TclExchange {
        cid: Option<Cid>,
        nad: Option<Nad>,
        message: Vec<u8>,
    },
    TclDeselect {
        cid: Option<Cid>,
    },
    Repeat,
    Raw {
        code: u8,
        payload: Vec<u8>,
    },
}

impl Command {
    pub fn command_code(&self) -> u8 {
        match self {
            Self::GetFirmware => CMD_GET_FIRMWARE,
            Self::SetRfMode { .. } => CMD_SET_RF_MODE,
            Self::RawExchange {
                family: CardFamily::TypeA,
                ..
            } => CMD_RAW_EXCHANGE_A,
            Self::RawExchange {
                family: CardFamily::TypeB,
                ..
            } => CMD_RAW_EXCHANGE_B,
            Self::TclExchange { .. } => CMD_TCL_EXCHANGE,
            Self::TclDeselect { .. } => CMD_TCL_DESELECT,
            Self::Repeat => CMD_REPEAT,
            Self::Raw { code, .. } => *code,
        }
    }

    /// Encode the command parameters (the frame payload).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::GetFirmware | Self::Repeat => Vec::new(),
            Self::SetRfMode { mode } => vec![*mode as u8],
            Self::RawExchange {
                timeout_ms, frame, ..
            } => {
                let mut buf = Vec::with_capacity(2 + frame.len());
                buf.extend_from_slice(&timeout_ms.to_be_bytes());
                buf.extend_from_slice(frame);
                buf
            }
            Self::TclExchange { cid, nad, message } => {
                let mut flags = 0u8;
                if cid.is_some() {
                    flags |= TCL_FLAG_CID;
                }
                if nad.is_some() {
                    flags |= TCL_FLAG_NAD;
                }
                let mut buf = Vec::with_capacity(3 + message.len());
                buf.push(flags);
                buf.push(cid.map(|c| c.as_u8()).unwrap_or(0));
                buf.push(nad.map(|n| n.as_u8()).unwrap_or(0));
                buf.extend_from_slice(message);
                buf
            }
            Self::TclDeselect { cid } => match cid {
                Some(c) => vec![TCL_FLAG_CID, c.as_u8()],
                None => vec![0x00, 0x00],
            },
            Self::Raw { payload, .. } => payload.clone(),
        }
    }
}
