// librfcl/src/transport/tcp.rs

//! TCP transport for readers behind a serial-to-Ethernet bridge.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, trace};

use crate::transport::traits::Transport;
use crate::types::{InterfaceKind, Timeouts};
use crate::{Error, Result};

pub struct TcpTransport {
    stream: TcpStream,
    timeouts: Timeouts,
}

impl TcpTransport {
    /// Connect to `addr` (e.g. `"192.168.0.10:3999"`).
    pub fn connect<A: ToSocketAddrs>(addr: A, connect_timeout_ms: u64) -> Result<Self> {
        let mut last_err = None;
        for sock in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&sock, Duration::from_millis(connect_timeout_ms)) {
                Ok(stream) => {
                    debug!("tcp link to {sock} established");
                    return Self::from_stream(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        match last_err {
            Some(e) => Err(e.into()),
            None => Err(Error::DeviceNotFound),
        }
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            timeouts: Timeouts::default(),
        })
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        #[cfg(feature = "diagnostics")]
        trace!("tcp >> {}", crate::utils::bytes_to_hex(data));
        self.stream.write_all(data)?;
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
            self.stream
                .set_read_timeout(Some(Duration::from_millis(wait.max(1))))?;
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed by peer",
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if is_timeout(&e) => return Err(Error::Timeout),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        #[cfg(feature = "diagnostics")]
        trace!("tcp << {}", crate::utils::bytes_to_hex(buf));
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
        InterfaceKind::Tcp
    }

    fn purge(&mut self) -> Result<()> {
        self.stream.set_nonblocking(true)?;
        let mut scratch = [0u8; 256];
        let outcome = loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => break Ok(()),
                Ok(n) => trace!("tcp purge dropped {n} bytes"),
                Err(e) if is_timeout(&e) => break Ok(()),
                Err(e) => break Err(e.into()),
            }
        };
        self.stream.set_nonblocking(false)?;
        outcome
    }
}
