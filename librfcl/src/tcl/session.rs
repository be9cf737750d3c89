// librfcl/src/tcl/session.rs

use log::debug;

use crate::constants::{TCL_CRC_LEN, TCL_FWT_UNIT_US, TCL_MAX_FSCI, TCL_MAX_FWI, TCL_MAX_RETRY, TCL_MAX_RX};
use crate::tcl::block::{Block, SBlockKind};
use crate::tcl::channel::BlockChannel;
use crate::tcl::engine::Exchange;
use crate::types::{Cid, Nad};
use crate::{Error, Result};

/// Maximum frame size (FSC) for a frame size integer, CRC included.
pub fn frame_size(fsci: u8) -> usize {
    match fsci.min(TCL_MAX_FSCI) {
        f @ 0..=4 => 16 + 8 * usize::from(f),
        f @ 5..=7 => 64 + 32 * usize::from(f - 5),
        _ => 256,
    }
}

/// Per-card T=CL state. Create one per activated card; the block number
/// carries over from one exchange to the next until `deselect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TclSession {
    cid: Option<Cid>,
    nad: Option<Nad>,
    fsci: u8,
    fwi: u8,
    block_number: bool,
}

impl Default for TclSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TclSession {
    /// Session with ISO14443-4 defaults: no CID, no NAD, FSCI 2, FWI 4.
    pub fn new() -> Self {
        Self {
            cid: None,
            nad: None,
            fsci: 2,
            fwi: 4,
            block_number: false,
        }
    }

    pub fn with_cid(mut self, cid: Cid) -> Self {
        self.cid = Some(cid);
        self
    }

    pub fn with_nad(mut self, nad: Nad) -> Self {
        self.nad = Some(nad);
        self
    }

    /// Card frame size integer from ATS/ATTRIB; clamped to 8.
    pub fn with_fsci(mut self, fsci: u8) -> Self {
        self.fsci = fsci.min(TCL_MAX_FSCI);
        self
    }

    /// Frame waiting integer from ATS/ATQB; clamped to 14.
    pub fn with_fwi(mut self, fwi: u8) -> Self {
        self.fwi = fwi.min(TCL_MAX_FWI);
        self
    }

    pub fn cid(&self) -> Option<Cid> {
        self.cid
    }

    pub fn nad(&self) -> Option<Nad> {
        self.nad
    }

    pub fn fsci(&self) -> u8 {
        self.fsci
    }

    pub fn fwi(&self) -> u8 {
        self.fwi
    }

    /// Current PCD block number
    pub fn block_number(&self) -> bool {
        self.block_number
    }

    pub(crate) fn toggle_block_number(&mut self) {
        self.block_number = !self.block_number;
    }

    pub fn frame_size(&self) -> usize {
        frame_size(self.fsci)
    }

    /// Frame size without the CRC.
    pub fn block_size(&self) -> usize {
        self.frame_size() - TCL_CRC_LEN
    }

    /// INF bytes one I-Block can carry once the optional CID and NAD bytes
    /// are accounted for.
    pub fn inf_capacity(&self) -> usize {
        self.block_size() - usize::from(self.cid.is_some()) - usize::from(self.nad.is_some())
    }

    /// Frame waiting time for the current FWI, in microseconds.
    pub fn base_fwt_us(&self) -> u64 {
        TCL_FWT_UNIT_US << self.fwi
    }

    /// Deliver `message` to the card and return its complete reply.
    pub fn exchange<C: BlockChannel + ?Sized>(
        &mut self,
        channel: &mut C,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        let mut rx = [0u8; TCL_MAX_RX];
        let len = self.exchange_into(channel, message, &mut rx)?;
        Ok(rx[..len].to_vec())
    }

    /// Like `exchange`, assembling the reply into `rx`. Returns its length.
    /// A reply longer than `rx` (or than 268 bytes) is `Error::Overflow`.
    pub fn exchange_into<C: BlockChannel + ?Sized>(
        &mut self,
        channel: &mut C,
        message: &[u8],
        rx: &mut [u8],
    ) -> Result<usize> {
        debug!(
            "tcl exchange {} bytes, cid={:?} fsc={} fwt={}us",
            message.len(),
            self.cid.map(|c| c.as_u8()),
            self.frame_size(),
            self.base_fwt_us()
        );
        Exchange::new(self, message, rx).run(self, channel)
    }

    /// Send S(DESELECT). The card answering, or not answering at all, both
    /// count as success; a corrupted answer gets the DESELECT again. Only
    /// failures of the link itself are returned. The block number starts
    /// over for the next activation in every case.
    pub fn deselect<C: BlockChannel + ?Sized>(&mut self, channel: &mut C) -> Result<()> {
        let block = Block::S {
            kind: SBlockKind::Deselect,
            cid: self.cid,
        }
        .encode();
        self.block_number = false;

        for attempt in 1..=TCL_MAX_RETRY {
            match channel.exchange_block(&block, self.base_fwt_us()) {
                Ok(_) => return Ok(()),
                Err(e) if e.is_silence() => {
                    debug!("tcl deselect: card silent");
                    return Ok(());
                }
                Err(e @ (Error::CrcMismatch { .. } | Error::FrameFormat(_))) => {
                    debug!("tcl deselect attempt {attempt}: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Forget the block number, e.g. after the card was re-activated by
    /// other means.
    pub fn reset(&mut self) {
        self.block_number = false;
    }
}
