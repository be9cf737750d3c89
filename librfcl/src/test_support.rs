//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common MockTransport setup and scripted card
//! channels so tests across the crate and tests/ directory can reuse the
//! same logic.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::protocol::codec::BinaryCodec;
use crate::protocol::Frame;
use crate::reader::{Connected, Reader, ReaderBuilder};
use crate::tcl::BlockChannel;
use crate::transport::{MockTransport, Transport};
use crate::types::{Capabilities, InterfaceKind, ProtocolMask, Timeouts};
use crate::{Error, Result};

/// Shared handle to the mock behind a `SharedMock`.
pub type MockHandle = Rc<RefCell<MockTransport>>;

/// Transport wrapper that delegates into an `Rc<RefCell<MockTransport>>`
/// so a test can inspect traffic after a Dialog or Reader took ownership.
#[doc(hidden)]
pub struct SharedMock {
    inner: MockHandle,
}

impl SharedMock {
    pub fn new() -> (Self, MockHandle) {
        Self::wrap(MockTransport::new())
    }

    pub fn wrap(mock: MockTransport) -> (Self, MockHandle) {
        let inner = Rc::new(RefCell::new(mock));
        (
            Self {
                inner: inner.clone(),
            },
            inner,
        )
    }
}

impl Transport for SharedMock {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.inner.borrow_mut().send(data)
    }

    fn receive(&mut self, buf: &mut [u8], first_byte_ms: u64) -> Result<()> {
        self.inner.borrow_mut().receive(buf, first_byte_ms)
    }

    fn set_timeouts(&mut self, timeouts: Timeouts) -> Result<()> {
        self.inner.borrow_mut().set_timeouts(timeouts)
    }

    fn timeouts(&self) -> Timeouts {
        self.inner.borrow().timeouts()
    }

    fn interface(&self) -> InterfaceKind {
        self.inner.borrow().interface()
    }

    fn set_baudrate(&mut self, baudrate: u32) -> Result<()> {
        self.inner.borrow_mut().set_baudrate(baudrate)
    }

    fn purge(&mut self) -> Result<()> {
        self.inner.borrow_mut().purge()
    }
}

/// Binary wire image of a reader answer.
#[doc(hidden)]
pub fn binary_reply(sequence: u8, status: u8, payload: &[u8]) -> Result<Vec<u8>> {
    Ok(BinaryCodec::encode(&Frame::new(sequence, status, payload)?))
}

/// `GetFirmware` answer payload: version text, NUL, capability byte.
#[doc(hidden)]
pub fn firmware_payload(version: &str, capabilities: Capabilities) -> Vec<u8> {
    let mut p = version.as_bytes().to_vec();
    p.push(0x00);
    p.push(capabilities.bits());
    p
}

/// Convenience: a Reader<Connected> speaking the Binary encoding over a
/// shared mock. The firmware answer is consumed by `connect`, so the
/// next reply the test pushes must carry sequence 1.
#[doc(hidden)]
pub fn connected_mock_reader(capabilities: Capabilities) -> Result<(Reader<Connected>, MockHandle)> {
    let (transport, handle) = SharedMock::new();
    handle
        .borrow_mut()
        .push_response(binary_reply(0, 0, &firmware_payload("MOCK 1.00", capabilities))?);
    let reader = ReaderBuilder::new()
        .with_transport(Box::new(transport))
        .protocols(ProtocolMask::BINARY)
        .build()?
        .connect()?;
    Ok((reader, handle))
}

/// Scripted card for the T=CL engine. Each exchange pops one scripted
/// reply; an exhausted script answers with `NoResponse`.
#[doc(hidden)]
#[derive(Default)]
pub struct ScriptedChannel {
    replies: VecDeque<Result<Vec<u8>>>,
    /// Every block sent, with the frame waiting time it was given
    pub sent: Vec<(Vec<u8>, u64)>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_block(&mut self, block: &[u8]) {
        self.replies.push_back(Ok(block.to_vec()));
    }

    pub fn push_error(&mut self, err: Error) {
        self.replies.push_back(Err(err));
    }

    pub fn sent_blocks(&self) -> Vec<Vec<u8>> {
        self.sent.iter().map(|(b, _)| b.clone()).collect()
    }

    pub fn sent_fwts(&self) -> Vec<u64> {
        self.sent.iter().map(|(_, f)| *f).collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl BlockChannel for ScriptedChannel {
    fn exchange_block(&mut self, block: &[u8], fwt_us: u64) -> Result<Vec<u8>> {
        self.sent.push((block.to_vec(), fwt_us));
        self.replies.pop_front().unwrap_or(Err(Error::NoResponse))
    }
}
