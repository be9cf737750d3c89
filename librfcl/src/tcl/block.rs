// librfcl/src/tcl/block.rs

//! ISO14443-4 block headers.
//!
//! ```text
//! I-Block  0 0 0 C I N 1 b   C=chaining I=CID N=NAD b=block number
//! R-Block  1 0 1 K I 0 1 b   K=NAK
//! S-Block  1 1 x x I 0 1 0   xx: 00 DESELECT, 11 WTX
//! ```

use derive_more::Display;

use crate::constants::TCL_MAX_WTXM;
use crate::types::{Cid, Nad};
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

pub const PCB_I: u8 = 0x02;
pub const PCB_R: u8 = 0xA2;
pub const PCB_S_DESELECT: u8 = 0xC2;
pub const PCB_S_WTX: u8 = 0xF2;

const TYPE_MASK: u8 = 0xC0;
const TYPE_I: u8 = 0x00;
const TYPE_R: u8 = 0x80;
const TYPE_S: u8 = 0xC0;

const BIT_BLOCK_NUMBER: u8 = 0x01;
const BIT_NAD: u8 = 0x04;
const BIT_CID: u8 = 0x08;
const BIT_CHAINING: u8 = 0x10;
const BIT_NAK: u8 = 0x10;
const S_KIND_MASK: u8 = 0x30;
const S_KIND_WTX: u8 = 0x30;
const S_KIND_DESELECT: u8 = 0x00;

/// WTXM occupies the low six bits of the WTX INF byte; the top two carry
/// a power level indication.
const WTXM_MASK: u8 = 0x3F;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SBlockKind {
    #[display(fmt = "DESELECT")]
    Deselect,
    /// Wait time extension with the raw INF byte as sent by the card
    #[display(fmt = "WTX({:#04x})", _0)]
    Wtx(u8),
}

impl SBlockKind {
    /// Multiplier of a WTX request, clamped to `1..=59`.
    pub fn wtx_multiplier(&self) -> Option<u8> {
        match self {
            Self::Wtx(inf) => Some((inf & WTXM_MASK).clamp(1, TCL_MAX_WTXM)),
            Self::Deselect => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    I {
        chaining: bool,
        block_number: bool,
        cid: Option<Cid>,
        nad: Option<Nad>,
        inf: Vec<u8>,
    },
    R {
        ack: bool,
        block_number: bool,
        cid: Option<Cid>,
    },
    S {
        kind: SBlockKind,
        cid: Option<Cid>,
    },
}

impl Block {
    pub fn cid(&self) -> Option<Cid> {
        match self {
            Self::I { cid, .. } | Self::R { cid, .. } | Self::S { cid, .. } => *cid,
        }
    }

    pub fn pcb(&self) -> u8 {
        match self {
            Self::I {
                chaining,
                block_number,
                cid,
                nad,
                ..
            } => {
                let mut pcb = PCB_I;
                if *chaining {
                    pcb |= BIT_CHAINING;
                }
                if cid.is_some() {
                    pcb |= BIT_CID;
                }
                if nad.is_some() {
                    pcb |= BIT_NAD;
                }
                if *block_number {
                    pcb |= BIT_BLOCK_NUMBER;
                }
                pcb
            }
            Self::R {
                ack,
                block_number,
                cid,
            } => {
                let mut pcb = PCB_R;
                if !*ack {
                    pcb |= BIT_NAK;
                }
                if cid.is_some() {
                    pcb |= BIT_CID;
                }
                if *block_number {
                    pcb |= BIT_BLOCK_NUMBER;
                }
                pcb
            }
            Self::S { kind, cid } => {
                let mut pcb = match kind {
                    SBlockKind::Deselect => PCB_S_DESELECT,
                    SBlockKind::Wtx(_) => PCB_S_WTX,
                };
                if cid.is_some() {
                    pcb |= BIT_CID;
                }
                pcb
            }
        }
    }

    /// Encode header and INF, without CRC.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + self.inf().len());
        out.push(self.pcb());
        let (cid, nad) = match self {
            Self::I { cid, nad, .. } => (*cid, *nad),
            Self::R { cid, .. } | Self::S { cid, .. } => (*cid, None),
        };
        if let Some(cid) = cid {
            out.push(cid.as_u8());
        }
        if let Some(nad) = nad {
            out.push(nad.as_u8());
        }
        match self {
            Self::I { inf, .. } => out.extend_from_slice(inf),
            Self::S {
                kind: SBlockKind::Wtx(inf),
                ..
            } => out.push(*inf),
            _ => {}
        }
        out
    }

    /// Parse a block received from the card (CRC already removed).
    ///
    /// Malformed headers are reported as `FrameFormat` so that the engine
    /// treats them like any other transmission error; well-formed S-Blocks
    /// of an unsupported kind are `UnexpectedBlock`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some((&pcb, rest)) = bytes.split_first() else {
            return Err(Error::FrameFormat("empty block".into()));
        };
        let mut rest = rest;
        let mut take = |what: &str| -> Result<u8> {
            let (&b, tail) = rest
                .split_first()
                .ok_or_else(|| Error::FrameFormat(format!("block too short for {what}")))?;
            rest = tail;
            Ok(b)
        };

        let block = match pcb & TYPE_MASK {
            TYPE_I => {
                if pcb & 0x22 != 0x02 {
                    return Err(Error::FrameFormat(format!("invalid I-Block PCB {pcb:#04x}")));
                }
                let cid = if pcb & BIT_CID != 0 {
                    Some(Cid::new(take("CID")? & 0x0F))
                } else {
                    None
                };
                let nad = if pcb & BIT_NAD != 0 {
                    Some(Nad::new(take("NAD")?))
                } else {
                    None
                };
                Self::I {
                    chaining: pcb & BIT_CHAINING != 0,
                    block_number: pcb & BIT_BLOCK_NUMBER != 0,
                    cid,
                    nad,
                    inf: rest.to_vec(),
                }
            }
            TYPE_R => {
                if pcb & 0x26 != 0x22 {
                    return Err(Error::FrameFormat(format!("invalid R-Block PCB {pcb:#04x}")));
                }
                let cid = if pcb & BIT_CID != 0 {
                    Some(Cid::new(take("CID")? & 0x0F))
                } else {
                    None
                };
                Self::R {
                    ack: pcb & BIT_NAK == 0,
                    block_number: pcb & BIT_BLOCK_NUMBER != 0,
                    cid,
                }
            }
            TYPE_S => {
                let cid = if pcb & BIT_CID != 0 {
                    Some(Cid::new(take("CID")? & 0x0F))
                } else {
                    None
                };
                let kind = match pcb & S_KIND_MASK {
                    S_KIND_DESELECT => SBlockKind::Deselect,
                    S_KIND_WTX => SBlockKind::Wtx(take("WTXM")?),
                    _ => {
                        return Err(Error::UnexpectedBlock(format!(
                            "S-Block {}",
                            bytes_to_hex(bytes)
                        )));
                    }
                };
                Self::S { kind, cid }
            }
            _ => {
                return Err(Error::FrameFormat(format!("invalid PCB {pcb:#04x}")));
            }
        };
        Ok(block)
    }

    pub fn block_number(&self) -> Option<bool> {
        match self {
            Self::I { block_number, .. } | Self::R { block_number, .. } => Some(*block_number),
            Self::S { .. } => None,
        }
    }

    pub fn inf(&self) -> &[u8] {
        match self {
            Self::I { inf, .. } => inf,
            _ => &[],
        }
    }
}
