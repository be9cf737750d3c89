// librfcl/src/transport/mock.rs

use std::collections::VecDeque;

use crate::transport::traits::Transport;
use crate::types::{InterfaceKind, Timeouts};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk {
    Byte(u8),
    /// End of one burst from the reader. `purge` stops here, reads skip it.
    Pause,
    /// The reader stays silent: the next read times out.
    Silence,
}

/// Scripted byte-level transport for tests. Writes are recorded; reads
/// are served from a queue of reader bursts. With `echo` enabled every
/// written byte is looped back ahead of the script, the way a reader in
/// ASCII mode echoes characters.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Every `send` call, in order
    pub sent: Vec<Vec<u8>>,
    /// Every `receive` call as (requested length, first byte timeout)
    pub reads: Vec<(usize, u64)>,
    /// Number of `purge` calls
    pub purges: usize,
    /// Baud rates requested through `set_baudrate`
    pub baudrates: Vec<u32>,
    pub echo: bool,
    incoming: VecDeque<Chunk>,
    timeouts: Timeouts,
    interface: InterfaceKind,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that loops every written byte back to the reader side.
    pub fn with_echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn with_interface(interface: InterfaceKind) -> Self {
        Self {
            interface,
            ..Self::default()
        }
    }

    /// Queue one burst of bytes from the reader.
    pub fn push_response(&mut self, resp: Vec<u8>) {
        self.incoming.extend(resp.into_iter().map(Chunk::Byte));
        self.incoming.push_back(Chunk::Pause);
    }

    /// Queue a read that times out.
    pub fn push_silence(&mut self) {
        self.incoming.push_back(Chunk::Silence);
    }

    /// All bytes written so far, flattened.
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.sent.iter().flatten().copied().collect()
    }

    /// Bytes still waiting to be read.
    pub fn pending(&self) -> usize {
        self.incoming
            .iter()
            .filter(|c| matches!(c, Chunk::Byte(_)))
            .count()
    }

    fn next_byte(&mut self) -> Result<u8> {
        loop {
            match self.incoming.pop_front() {
                Some(Chunk::Byte(b)) => return Ok(b),
                Some(Chunk::Pause) => continue,
                Some(Chunk::Silence) | None => return Err(Error::Timeout),
            }
        }
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.sent.push(data.to_vec());
        if self.echo {
            for &b in data.iter().rev() {
                self.incoming.push_front(Chunk::Byte(b));
            }
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], first_byte_ms: u64) -> Result<()> {
        self.reads.push((buf.len(), first_byte_ms));
        for slot in buf.iter_mut() {
            *slot = self.next_byte()?;
        }
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
        self.baudrates.push(baudrate);
        Ok(())
    }

    fn purge(&mut self) -> Result<()> {
        self.purges += 1;
        while let Some(Chunk::Byte(_)) = self.incoming.front() {
            self.incoming.pop_front();
        }
        Ok(())
    }
}
