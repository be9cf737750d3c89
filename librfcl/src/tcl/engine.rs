// librfcl/src/tcl/engine.rs

//! ISO14443-4 §7.5 block-chaining state machine.
//!
//! One `Exchange` lives for exactly one application message. Only the PCD
//! block number outlives it, stored on the caller's `TclSession`.

use log::{debug, trace, warn};

use crate::constants::{TCL_MAX_RETRY, TCL_MAX_RX};
use crate::error::ErrorKind;
use crate::tcl::block::{Block, SBlockKind};
use crate::tcl::channel::BlockChannel;
use crate::tcl::session::TclSession;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// What goes out on the next iteration when the PCD is not sending data.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    /// Next I-Block of the outbound message (or a retransmission of it)
    Data,
    /// R-Block polling for the card's next fragment
    Receipt { ack: bool },
    /// Echo of a WTX request, byte for byte
    WtxEcho(Vec<u8>),
}

pub(crate) struct Exchange<'a> {
    message: &'a [u8],
    /// Bytes of `message` acknowledged by the card
    acked: usize,
    /// Length of the I-Block INF last put on the wire
    in_flight: usize,
    /// The final I-Block has been acknowledged
    outbound_done: bool,
    rx: &'a mut [u8],
    received: usize,
    capacity: usize,
    base_fwt_us: u64,
    wtx_fwt_us: Option<u64>,
    pending: Pending,
    /// The card's last valid I-Block had its chaining bit set
    card_chaining: bool,
    failures: usize,
    first_failure: Option<Error>,
    attempts: usize,
}

impl<'a> Exchange<'a> {
    pub(crate) fn new(session: &TclSession, message: &'a [u8], rx: &'a mut [u8]) -> Self {
        let capacity = rx.len().min(TCL_MAX_RX);
        Self {
            message,
            acked: 0,
            in_flight: 0,
            outbound_done: false,
            rx,
            received: 0,
            capacity,
            base_fwt_us: session.base_fwt_us(),
            wtx_fwt_us: None,
            pending: Pending::Data,
            card_chaining: false,
            failures: 0,
            first_failure: None,
            attempts: 0,
        }
    }

    /// Drive the exchange to completion; returns the reply length in `rx`.
    pub(crate) fn run<C: BlockChannel + ?Sized>(
        mut self,
        session: &mut TclSession,
        channel: &mut C,
    ) -> Result<usize> {
        loop {
            let block = self.next_block(session);
            let fwt_us = self.wtx_fwt_us.take().unwrap_or(self.base_fwt_us);
            self.attempts += 1;
            trace!(
                "tcl attempt {} fwt={}us >> {}",
                self.attempts,
                fwt_us,
                bytes_to_hex(&block)
            );

            let reply = channel
                .exchange_block(&block, fwt_us)
                .and_then(|bytes| Block::parse(&bytes).map(|b| (b, bytes)))
                .and_then(|(b, bytes)| {
                    // a block for another card is a transmission error
                    if b.cid() != session.cid() {
                        return Err(Error::FrameFormat(format!(
                            "block addressed to {:?}, session has {:?}",
                            b.cid(),
                            session.cid()
                        )));
                    }
                    Ok((b, bytes))
                });

            let (reply, raw) = match reply {
                Ok(r) => r,
                Err(e) if e.kind() == ErrorKind::CardProtocol => return Err(e),
                Err(e) if is_physical_failure(&e) => {
                    self.physical_failure(e)?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match reply {
                Block::S {
                    kind: kind @ SBlockKind::Wtx(_),
                    ..
                } => {
                    let wtxm = u64::from(kind.wtx_multiplier().unwrap_or(1));
                    self.wtx_fwt_us = Some(self.base_fwt_us * wtxm);
                    debug!("tcl card requests {kind}, next wait {}us", self.base_fwt_us * wtxm);
                    self.pending = Pending::WtxEcho(raw);
                }
                Block::S { kind, .. } => {
                    return Err(Error::UnexpectedBlock(format!("S-Block {kind}")));
                }
                Block::R { block_number, .. } => {
                    let fresh = self.acknowledge(session, block_number);
                    if self.outbound_done {
                        return Err(Error::ChainingViolation(
                            "R-Block received with nothing left to send".into(),
                        ));
                    }
                    // Equal: continue chaining. Unequal: retransmit the last I-Block.
                    if fresh {
                        self.progress();
                    } else {
                        self.stale()?;
                    }
                    self.pending = Pending::Data;
                }
                Block::I {
                    chaining,
                    block_number,
                    inf,
                    ..
                } => {
                    let fresh = self.acknowledge(session, block_number);
                    if !self.outbound_done {
                        return Err(Error::ChainingViolation(
                            "I-Block received while the PCD still has data to send".into(),
                        ));
                    }
                    if !fresh {
                        // stale retransmission of a fragment we already hold
                        debug!("tcl stale I-Block, acknowledging again");
                        self.stale()?;
                        self.pending = Pending::Receipt { ack: true };
                        continue;
                    }
                    self.progress();
                    self.append(&inf)?;
                    self.card_chaining = chaining;
                    if !chaining {
                        debug!("tcl reply complete, {} bytes", self.received);
                        return Ok(self.received);
                    }
                    self.pending = Pending::Receipt { ack: true };
                }
            }
        }
    }

    fn next_block(&mut self, session: &TclSession) -> Vec<u8> {
        match std::mem::replace(&mut self.pending, Pending::Data) {
            Pending::WtxEcho(raw) => raw,
            Pending::Receipt { ack } => Block::R {
                ack,
                block_number: session.block_number(),
                cid: session.cid(),
            }
            .encode(),
            Pending::Data if self.outbound_done => Block::R {
                ack: true,
                block_number: session.block_number(),
                cid: session.cid(),
            }
            .encode(),
            Pending::Data => {
                let remaining = &self.message[self.acked..];
                let chunk = remaining.len().min(session.inf_capacity());
                self.in_flight = chunk;
                Block::I {
                    chaining: chunk < remaining.len(),
                    block_number: session.block_number(),
                    cid: session.cid(),
                    nad: session.nad(),
                    inf: remaining[..chunk].to_vec(),
                }
                .encode()
            }
        }
    }

    /// Compare the card's block number against ours. On a match the block
    /// in flight counts as delivered and the PCD bit toggles.
    fn acknowledge(&mut self, session: &mut TclSession, block_number: bool) -> bool {
        if block_number != session.block_number() {
            return false;
        }
        if !self.outbound_done {
            self.acked += self.in_flight;
            self.in_flight = 0;
            if self.acked >= self.message.len() {
                self.outbound_done = true;
            }
        }
        session.toggle_block_number();
        true
    }

    fn progress(&mut self) {
        self.failures = 0;
        self.first_failure = None;
    }

    /// A reply that did not move the exchange forward still counts
    /// against the consecutive-failure bound.
    fn stale(&mut self) -> Result<()> {
        self.failures += 1;
        if self.failures >= TCL_MAX_RETRY {
            warn!("tcl gave up after {} unacknowledged blocks", self.failures);
            return Err(self.first_failure.take().unwrap_or_else(|| {
                Error::UnexpectedBlock("block number never acknowledged".into())
            }));
        }
        Ok(())
    }

    fn physical_failure(&mut self, err: Error) -> Result<()> {
        if self.attempts == 1 && err.is_silence() {
            debug!("tcl no answer to first block: {err}");
            return Err(Error::NoCard);
        }
        self.failures += 1;
        debug!("tcl failure {}/{}: {err}", self.failures, TCL_MAX_RETRY);
        if self.first_failure.is_none() {
            self.first_failure = Some(err);
        }
        if self.failures >= TCL_MAX_RETRY {
            let err = self.first_failure.take().unwrap_or(Error::NoResponse);
            warn!("tcl gave up after {} failures: {err}", self.failures);
            return Err(err);
        }
        self.pending = Pending::Receipt {
            ack: self.card_chaining,
        };
        Ok(())
    }

    fn append(&mut self, inf: &[u8]) -> Result<()> {
        let needed = self.received + inf.len();
        if needed > self.capacity {
            return Err(Error::Overflow {
                capacity: self.capacity,
                needed,
            });
        }
        self.rx[self.received..needed].copy_from_slice(inf);
        self.received = needed;
        Ok(())
    }
}

/// Transmission problems the block protocol recovers from by itself.
fn is_physical_failure(err: &Error) -> bool {
    matches!(
        err,
        Error::Timeout
            | Error::NoResponse
            | Error::CrcMismatch { .. }
            | Error::FrameFormat(_)
            | Error::ChecksumMismatch { .. }
            | Error::ReaderStatus { .. }
    )
}
