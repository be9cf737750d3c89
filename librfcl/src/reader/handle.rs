// librfcl/src/reader/handle.rs

use std::time::Duration;

use log::debug;

use crate::protocol::commands::{Command, STATUS_CARD_MUTE};
use crate::protocol::{Dialog, Frame};
use crate::reader::builder::LinkConfig;
use crate::reader::negotiate::negotiate;
use crate::tcl::{Layer3, SoftwareChannel, TclSession};
use crate::transport::Transport;
use crate::types::{Capabilities, CardFamily, FirmwareInfo, RfMode, Timeouts, WireProtocol};
use crate::utils::Deadline;
use crate::{Error, Result};

/// Type-state markers
pub struct Unconnected {
    transport: Box<dyn Transport>,
}

pub struct Connected {
    dialog: Dialog,
    baudrate: u32,
    firmware: FirmwareInfo,
    rf_mode: RfMode,
}

/// Reader handle that enforces the connection state at compile time.
pub struct Reader<State = Unconnected> {
    config: LinkConfig,
    state: State,
}

impl<State> Reader<State> {
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

impl Reader<Unconnected> {
    /// Create a Reader from an existing Transport instance. This is
    /// primarily intended for tests where a MockTransport is provided.
    pub fn new_with_transport(transport: Box<dyn Transport>, config: LinkConfig) -> Self {
        Self {
            config,
            state: Unconnected { transport },
        }
    }

    /// Find the baud rate and wire encoding the reader answers to, cache
    /// its firmware description and apply the configured RF mode.
    pub fn connect(self) -> Result<Reader<Connected>> {
        let negotiated = negotiate(self.state.transport, &self.config)?;
        let mut dialog = negotiated.dialog;
        dialog.set_dual_buffer(
            negotiated
                .firmware
                .capabilities
                .contains(Capabilities::DUAL_BUFFER),
        );

        let mut reader = Reader {
            config: self.config,
            state: Connected {
                dialog,
                baudrate: negotiated.baudrate,
                firmware: negotiated.firmware,
                rf_mode: RfMode::Off,
            },
        };
        if let Some(mode) = reader.config.rf_mode {
            reader.set_rf_mode(mode)?;
        }
        Ok(reader)
    }
}

impl Reader<Connected> {
    /// Run one reader command and return its payload. A non-zero reply
    /// status is `Error::ReaderStatus`.
    pub fn function(&mut self, code: u8, payload: &[u8]) -> Result<Vec<u8>> {
        self.state.dialog.function(code, payload)
    }

    /// Execute a typed command.
    pub fn execute(&mut self, cmd: &Command) -> Result<Vec<u8>> {
        self.function(cmd.command_code(), &cmd.encode())
    }

    /// Run one reader command and return the answer frame as is.
    pub fn transceive(&mut self, code: u8, payload: &[u8]) -> Result<Frame> {
        self.state.dialog.transceive(code, payload)
    }

    /// Send a command the reader only answers once something happens
    /// (e.g. a card enters the field) and wait up to `timeout` for it.
    pub fn function_until(&mut self, code: u8, payload: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        self.state
            .dialog
            .function_until(code, payload, Deadline::after(timeout))
    }

    pub fn firmware(&self) -> &FirmwareInfo {
        &self.state.firmware
    }

    pub fn capabilities(&self) -> Capabilities {
        self.state.firmware.capabilities
    }

    pub fn protocol(&self) -> WireProtocol {
        self.state.dialog.protocol()
    }

    pub fn baudrate(&self) -> u32 {
        self.state.baudrate
    }

    pub fn rf_mode(&self) -> RfMode {
        self.state.rf_mode
    }

    pub fn set_rf_mode(&mut self, mode: RfMode) -> Result<()> {
        self.execute(&Command::SetRfMode { mode })?;
        debug!("rf mode {:?}", mode);
        self.state.rf_mode = mode;
        Ok(())
    }

    pub fn set_timeouts(&mut self, timeouts: Timeouts) -> Result<()> {
        self.state.dialog.transport_mut().set_timeouts(timeouts)?;
        self.config.timeouts = timeouts;
        Ok(())
    }

    /// Exchange one application message with an activated ISO14443-4 card.
    ///
    /// Readers advertising `Capabilities::TCL_ENGINE` do the block protocol
    /// themselves; for the others it runs here on top of raw layer-3
    /// exchanges.
    pub fn tcl_exchange(
        &mut self,
        session: &mut TclSession,
        family: CardFamily,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        if self.capabilities().contains(Capabilities::TCL_ENGINE) {
            return self.execute(&Command::TclExchange {
                cid: session.cid(),
                nad: session.nad(),
                message: message.to_vec(),
            });
        }
        let mut channel = SoftwareChannel::new(&mut *self, family);
        session.exchange(&mut channel, message)
    }

    /// Release an ISO14443-4 card with S(DESELECT).
    pub fn tcl_deselect(&mut self, session: &mut TclSession, family: CardFamily) -> Result<()> {
        if self.capabilities().contains(Capabilities::TCL_ENGINE) {
            session.reset();
            return self.execute(&Command::TclDeselect { cid: session.cid() }).map(|_| ());
        }
        let mut channel = SoftwareChannel::new(&mut *self, family);
        session.deselect(&mut channel)
    }

    /// Drop the session and hand the transport back.
    pub fn disconnect(self) -> Reader<Unconnected> {
        Reader {
            config: self.config,
            state: Unconnected {
                transport: self.state.dialog.into_transport(),
            },
        }
    }

    fn raw_exchange(&mut self, family: CardFamily, frame: &[u8], timeout_ms: u64) -> Result<Vec<u8>> {
        let cmd = Command::RawExchange {
            family,
            timeout_ms: u16::try_from(timeout_ms).unwrap_or(u16::MAX),
            frame: frame.to_vec(),
        };

        // The reader holds its answer until the card replies or the card
        // timeout runs out, so the link has to wait that much longer.
        let saved = self.config.timeouts;
        let mut extended = saved;
        extended.response_ms = saved.response_ms.saturating_add(timeout_ms);
        self.state.dialog.transport_mut().set_timeouts(extended)?;
        let result = self.execute(&cmd);
        self.state.dialog.transport_mut().set_timeouts(saved)?;

        match result {
            Err(Error::ReaderStatus {
                status: STATUS_CARD_MUTE,
            }) => Err(Error::NoResponse),
            other => other,
        }
    }
}

impl Layer3 for Reader<Connected> {
    fn exchange_a(&mut self, frame: &[u8], timeout_ms: u64) -> Result<Vec<u8>> {
        self.raw_exchange(CardFamily::TypeA, frame, timeout_ms)
    }

    fn exchange_b(&mut self, frame: &[u8], timeout_ms: u64) -> Result<Vec<u8>> {
        self.raw_exchange(CardFamily::TypeB, frame, timeout_ms)
    }
}
