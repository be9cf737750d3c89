// librfcl/src/transport/serial.rs

//! Serial port transport. USB-FTDI readers show up as virtual COM ports
//! and go through the same code path.

use std::io::{self, Read, Write};
use std::time::Duration;

use log::trace;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::transport::traits::Transport;
use crate::types::{InterfaceKind, Timeouts};
use crate::{Error, Result};

pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeouts: Timeouts,
    interface: InterfaceKind,
}

impl SerialTransport {
    /// Open `device` at `baudrate`, 8N1 without flow control.
    pub fn open(device: &str, baudrate: u32, interface: InterfaceKind) -> Result<Self> {
        let timeouts = Timeouts::default();
        let port = serialport::new(device, baudrate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(timeouts.response_ms))
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => Error::DeviceNotFound,
                _ => Error::Serial(e),
            })?;
        Ok(Self {
            port,
            timeouts,
            interface,
        })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        #[cfg(feature = "diagnostics")]
        trace!("serial >> {}", crate::utils::bytes_to_hex(data));
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], first_byte_ms: u64) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let wait = if filled == 0 {
                first_byte_ms
            } else {
                self.timeouts.inter_byte_ms
            };
            self.port.set_timeout(Duration::from_millis(wait.max(1)))?;
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::Timeout),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Err(Error::Timeout),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        #[cfg(feature = "diagnostics")]
        trace!("serial << {}", crate::utils::bytes_to_hex(buf));
        Ok(())
    }

    fn set_timeouts(&mut self, timeouts: Timeouts) -> Result<()> {
        self.timeouts = timeouts;
        Ok(())
    }

    fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    fn interface(&self) -> InterfaceKind {
        self.interface
    }

    fn set_baudrate(&mut self, baudrate: u32) -> Result<()> {
        trace!("serial baud rate -> {baudrate}");
        self.port.set_baud_rate(baudrate)?;
        Ok(())
    }

    fn purge(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}
