// librfcl/src/reader/builder.rs

use crate::constants::{BUS_BROADCAST, DEFAULT_BAUDRATE};
use crate::reader::handle::{Reader, Unconnected};
use crate::transport::{TcpTransport, Transport};
use crate::types::{InterfaceKind, ProtocolMask, RfMode, Timeouts};
use crate::{Error, Result};

/// Connection settings supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Serial device (`/dev/ttyUSB0`, `COM3`) or `host:port` for TCP
    pub device: String,
    pub baudrate: u32,
    /// Tried in order when the reader does not answer at `baudrate`
    pub fallback_baudrates: Vec<u32>,
    pub protocols: ProtocolMask,
    pub interface: InterfaceKind,
    pub timeouts: Timeouts,
    /// RS485 address used by the Bus encoding
    pub bus_address: u8,
    /// RF mode applied right after connecting
    pub rf_mode: Option<RfMode>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            baudrate: DEFAULT_BAUDRATE,
            fallback_baudrates: vec![115_200, 9_600],
            protocols: ProtocolMask::default(),
            interface: InterfaceKind::default(),
            timeouts: Timeouts::default(),
            bus_address: BUS_BROADCAST,
            rf_mode: None,
        }
    }
}

impl LinkConfig {
    /// Baud rates in the order negotiation tries them, without repeats.
    pub fn candidate_baudrates(&self) -> Vec<u32> {
        if self.interface == InterfaceKind::Tcp {
            return vec![self.baudrate];
        }
        let mut out = vec![self.baudrate];
        for &b in &self.fallback_baudrates {
            if !out.contains(&b) {
                out.push(b);
            }
        }
        out
    }
}

/// Helper to construct a Reader with optional configuration.
#[derive(Default)]
pub struct ReaderBuilder {
    transport: Option<Box<dyn Transport>>,
    config: LinkConfig,
}

impl ReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide an already-created transport instance (e.g. MockTransport)
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.config.device = device.into();
        self
    }

    pub fn baudrate(mut self, baudrate: u32) -> Self {
        self.config.baudrate = baudrate;
        self
    }

    pub fn fallback_baudrates(mut self, baudrates: &[u32]) -> Self {
        self.config.fallback_baudrates = baudrates.to_vec();
        self
    }

    pub fn protocols(mut self, protocols: ProtocolMask) -> Self {
        self.config.protocols = protocols;
        self
    }

    pub fn interface(mut self, interface: InterfaceKind) -> Self {
        self.config.interface = interface;
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Talk to one reader on a shared RS485 line; enables the Bus encoding.
    pub fn bus_address(mut self, address: u8) -> Self {
        self.config.bus_address = address;
        self.config.protocols |= ProtocolMask::BUS;
        self
    }

    pub fn rf_mode(mut self, mode: RfMode) -> Self {
        self.config.rf_mode = Some(mode);
        self
    }

    /// Consume the builder and return an unconnected Reader, opening the
    /// device named in the configuration unless a transport was supplied.
    pub fn build(self) -> Result<Reader<Unconnected>> {
        if self.config.protocols.is_empty() {
            return Err(Error::InvalidParameter("no wire protocol allowed".into()));
        }
        let transport = match self.transport {
            Some(t) => t,
            None => open_transport(&self.config)?,
        };
        Ok(Reader::new_with_transport(transport, self.config))
    }
}

fn open_transport(config: &LinkConfig) -> Result<Box<dyn Transport>> {
    if config.device.is_empty() {
        return Err(Error::DeviceNotFound);
    }
    match config.interface {
        InterfaceKind::Tcp => Ok(Box::new(TcpTransport::connect(
            config.device.as_str(),
            config.timeouts.response_ms,
        )?)),
        #[cfg(feature = "serial")]
        kind @ (InterfaceKind::Serial | InterfaceKind::UsbSerial) => Ok(Box::new(
            crate::transport::SerialTransport::open(&config.device, config.baudrate, kind)?,
        )),
        #[cfg(not(feature = "serial"))]
        InterfaceKind::Serial | InterfaceKind::UsbSerial => Err(Error::UnsupportedOperation(
            "serial support not compiled in (enable the `serial` feature)".into(),
        )),
    }
}
