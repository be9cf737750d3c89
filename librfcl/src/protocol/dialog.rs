// librfcl/src/protocol/dialog.rs

//! Dialog engine: one command frame out, one authoritative answer back.
//!
//! Recovery distinguishes two moves that must never be confused:
//!
//! * **Repeat**: the command reached the reader but its answer was lost
//!   or damaged. A zero-payload `REPEAT` frame asks a dual-buffer reader
//!   to send the stored answer again; the command is not executed twice.
//! * **Resend**: the reader refused the frame (NAK). The whole command
//!   goes out again.

use log::{debug, trace, warn};

use crate::constants::{DIALOG_MAX_RECOVERY, MAX_PAYLOAD_LEN, STATUS_OK};
use crate::protocol::codec::{FrameCodec, Inbound};
use crate::protocol::commands::CMD_REPEAT;
use crate::protocol::Frame;
use crate::transport::Transport;
use crate::types::WireProtocol;
use crate::utils::Deadline;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    SendCommand,
    RecvAnswer,
    Repeat,
    Resend,
    Done,
}

pub struct Dialog {
    transport: Box<dyn Transport>,
    codec: Box<dyn FrameCodec>,
    sequence: u8,
    dual_buffer: bool,
}

impl Dialog {
    pub fn new(transport: Box<dyn Transport>, codec: Box<dyn FrameCodec>) -> Self {
        Self {
            transport,
            codec,
            sequence: 0,
            dual_buffer: false,
        }
    }

    /// Sequence number the next command will carry.
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn set_sequence(&mut self, sequence: u8) {
        self.sequence = sequence;
    }

    /// Enable answer repetition; only valid for dual-buffer readers.
    pub fn set_dual_buffer(&mut self, enabled: bool) {
        self.dual_buffer = enabled;
    }

    pub fn dual_buffer(&self) -> bool {
        self.dual_buffer
    }

    pub fn protocol(&self) -> WireProtocol {
        self.codec.protocol()
    }

    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }

    /// Run one command and return the reader's payload. A non-zero
    /// status is reported as `Error::ReaderStatus`.
    pub fn function(&mut self, code: u8, payload: &[u8]) -> Result<Vec<u8>> {
        let reply = self.transceive(code, payload)?;
        into_payload(reply)
    }

    /// Run one command and return the raw answer frame (status + payload).
    pub fn transceive(&mut self, code: u8, payload: &[u8]) -> Result<Frame> {
        let request = Frame::new(self.sequence, code, payload)?;
        self.exchange(&request, None)
    }

    /// Send one command, then keep listening until an answer arrives or
    /// `deadline` passes. Meant for commands the reader only answers once
    /// something happens in the field.
    pub fn function_until(
        &mut self,
        code: u8,
        payload: &[u8],
        deadline: Deadline,
    ) -> Result<Vec<u8>> {
        let request = Frame::new(self.sequence, code, payload)?;
        let reply = self.exchange(&request, Some(deadline))?;
        into_payload(reply)
    }

    fn exchange(&mut self, request: &Frame, deadline: Option<Deadline>) -> Result<Frame> {
        let mut state = DialogState::SendCommand;
        let mut first_error: Option<Error> = None;
        let mut recoveries = 0usize;
        let mut sequence_resend_used = false;
        let mut reply: Option<Frame> = None;

        while state != DialogState::Done {
            trace!("dialog seq={:#04x} {:?}", request.sequence, state);
            state = match state {
                DialogState::SendCommand | DialogState::Resend | DialogState::Repeat => {
                    let sent = if state == DialogState::Repeat {
                        let repeat = Frame::new(request.sequence, CMD_REPEAT, &[])?;
                        self.codec.send_frame(self.transport.as_mut(), &repeat)
                    } else {
                        self.codec.send_frame(self.transport.as_mut(), request)
                    };
                    match sent {
                        Ok(()) => DialogState::RecvAnswer,
                        // Handshake refused: nothing reached the reader, send it again.
                        Err(e) if e.is_nak() && recoveries < DIALOG_MAX_RECOVERY => {
                            debug!("dialog seq={:#04x} handshake refused: {e}", request.sequence);
                            if first_error.is_none() {
                                first_error = Some(e);
                            }
                            recoveries += 1;
                            state
                        }
                        Err(e) => return Err(first_error.unwrap_or(e)),
                    }
                }
                DialogState::RecvAnswer => match self.receive_answer(request, deadline) {
                    Ok(frame) => {
                        reply = Some(frame);
                        DialogState::Done
                    }
                    Err(e) => {
                        let next = self.recovery_for(&e, deadline, &mut sequence_resend_used);
                        debug!("dialog seq={:#04x} failed: {e}", request.sequence);
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                        match next {
                            Some(next) if recoveries < DIALOG_MAX_RECOVERY => {
                                recoveries += 1;
                                debug!("dialog recovery {recoveries}/{DIALOG_MAX_RECOVERY}: {next:?}");
                                next
                            }
                            _ => {
                                let err = first_error.unwrap_or(Error::NoResponse);
                                if recoveries > 0 {
                                    warn!("dialog gave up after {recoveries} recoveries: {err}");
                                }
                                return Err(err);
                            }
                        }
                    }
                },
                DialogState::Done => DialogState::Done,
            };
        }

        self.sequence = self.sequence.wrapping_add(1);
        reply.ok_or(Error::NoResponse)
    }

    /// Which recovery, if any, applies to a receive-path failure.
    fn recovery_for(
        &self,
        err: &Error,
        deadline: Option<Deadline>,
        sequence_resend_used: &mut bool,
    ) -> Option<DialogState> {
        if deadline.is_some_and(|d| d.expired()) && err.is_silence() {
            return None;
        }
        match err {
            e if e.is_nak() => Some(DialogState::Resend),
            Error::SequenceMismatch { .. } => {
                if self.dual_buffer && !*sequence_resend_used {
                    *sequence_resend_used = true;
                    Some(DialogState::Resend)
                } else {
                    None
                }
            }
            e if e.is_recoverable() && self.dual_buffer => Some(DialogState::Repeat),
            _ => None,
        }
    }

    fn receive_answer(&mut self, request: &Frame, deadline: Option<Deadline>) -> Result<Frame> {
        loop {
            let inbound = match deadline {
                None => self.codec.recv_frame(self.transport.as_mut(), MAX_PAYLOAD_LEN),
                Some(deadline) => self.poll_answer(deadline),
            }?;
            match inbound {
                Inbound::TimeExtension => {
                    debug!("dialog seq={:#04x} time extension", request.sequence);
                    continue;
                }
                Inbound::Frame(frame) => {
                    if frame.sequence != request.sequence {
                        return Err(Error::SequenceMismatch {
                            expected: request.sequence,
                            actual: frame.sequence,
                        });
                    }
                    return Ok(frame);
                }
            }
        }
    }

    /// Repeated receive attempts, each bounded by the response timeout and
    /// by whatever is left of `deadline`.
    fn poll_answer(&mut self, deadline: Deadline) -> Result<Inbound> {
        let saved = self.transport.timeouts();
        let outcome = loop {
            let mut bounded = saved;
            bounded.response_ms = deadline.remaining_ms(saved.response_ms).max(1);
            if let Err(e) = self.transport.set_timeouts(bounded) {
                break Err(e);
            }
            match self.codec.recv_frame(self.transport.as_mut(), MAX_PAYLOAD_LEN) {
                Err(e) if e.is_silence() && !deadline.expired() => continue,
                Err(e) if e.is_silence() => break Err(Error::Timeout),
                other => break other,
            }
        };
        self.transport.set_timeouts(saved)?;
        outcome
    }
}

fn into_payload(reply: Frame) -> Result<Vec<u8>> {
    if reply.status() != STATUS_OK {
        return Err(Error::ReaderStatus {
            status: reply.status(),
        });
    }
    Ok(reply.payload)
}
