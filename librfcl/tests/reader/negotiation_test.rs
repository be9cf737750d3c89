#[path = "../common/mod.rs"]
mod common;

use librfcl::constants::{ACK, SOH};
use librfcl::protocol::Frame;
use librfcl::test_support::{SharedMock, binary_reply};
use librfcl::transport::mock::MockTransport;
use librfcl::{
    Capabilities, Error, InterfaceKind, ProtocolMask, ReaderBuilder, RfMode, WireProtocol,
};

#[test]
fn bus_reader_found_after_binary_silence() {
    common::init_logging();
    let (transport, mock) = SharedMock::new();
    {
        let mut m = mock.borrow_mut();
        m.push_silence();
        m.push_response(vec![ACK]);
        let fw = common::fixtures::firmware_reply_payload(Capabilities::RS485);
        let reply = Frame::new(0, 0x00, &fw).unwrap();
        let mut wire = vec![SOH, 0x07];
        wire.extend(reply.content_with_checksum());
        m.push_response(wire);
    }

    let reader = ReaderBuilder::new()
        .with_transport(Box::new(transport))
        .protocols(ProtocolMask::BINARY)
        .bus_address(0x07)
        .build()
        .unwrap()
        .connect()
        .unwrap();

    assert_eq!(reader.protocol(), WireProtocol::Bus);
    assert_eq!(reader.firmware().version, "CSB4 1.60");
    assert_eq!(mock.borrow().sent[1], vec![SOH, 0x07]);
}

#[test]
fn ascii_reader_found_last() {
    let (transport, mock) = SharedMock::new();
    {
        let mut m = mock.borrow_mut();
        // Binary and OSI3964 probes: silence
        m.push_silence();
        m.push_silence();
        // ASCII probe "$004F00\n": each character echoed, then the answer
        for &c in b"$004F00\n" {
            m.push_response(vec![c]);
        }
        let fw = common::fixtures::firmware_reply_payload(Capabilities::empty());
        let mut answer = format!("$0000{:02X}", fw.len()).into_bytes();
        for b in &fw {
            answer.extend(format!("{b:02X}").into_bytes());
        }
        answer.push(b'\n');
        m.push_response(answer);
    }

    let reader = ReaderBuilder::new()
        .with_transport(Box::new(transport))
        .build()
        .unwrap()
        .connect()
        .unwrap();
    assert_eq!(reader.protocol(), WireProtocol::Ascii);
    assert_eq!(reader.firmware().version, "CSB4 1.60");
}

#[test]
fn garbled_firmware_answer_moves_on_to_next_baudrate() {
    let (transport, mock) = SharedMock::wrap(MockTransport::with_echo());
    {
        let mut m = mock.borrow_mut();
        m.push_response(b"$000002AA\n".to_vec());
        let fw = common::fixtures::firmware_reply_payload(Capabilities::empty());
        let mut answer = format!("$0000{:02X}", fw.len()).into_bytes();
        for b in &fw {
            answer.extend(format!("{b:02X}").into_bytes());
        }
        answer.push(b'\n');
        m.push_response(answer);
    }

    let reader = ReaderBuilder::new()
        .with_transport(Box::new(transport))
        .protocols(ProtocolMask::ASCII)
        .baudrate(38_400)
        .fallback_baudrates(&[115_200])
        .build()
        .unwrap()
        .connect()
        .unwrap();
    assert_eq!(reader.protocol(), WireProtocol::Ascii);
    assert_eq!(reader.baudrate(), 115_200);
    assert_eq!(mock.borrow().baudrates, vec![38_400, 115_200]);
}

#[test]
fn tcp_link_tries_one_baudrate() {
    let (transport, mock) = SharedMock::wrap(MockTransport::with_interface(InterfaceKind::Tcp));
    let res = ReaderBuilder::new()
        .with_transport(Box::new(transport))
        .interface(InterfaceKind::Tcp)
        .protocols(ProtocolMask::BINARY)
        .build()
        .unwrap()
        .connect();
    assert!(matches!(res, Err(Error::NoResponse)));
    assert_eq!(mock.borrow().baudrates.len(), 1);
}

#[test]
fn rf_mode_failure_aborts_connect() {
    let (transport, mock) = SharedMock::new();
    {
        let mut m = mock.borrow_mut();
        let fw = common::fixtures::firmware_reply_payload(Capabilities::empty());
        m.push_response(binary_reply(0, 0, &fw).unwrap());
        m.push_response(binary_reply(1, 0x02, &[]).unwrap());
    }
    let res = ReaderBuilder::new()
        .with_transport(Box::new(transport))
        .protocols(ProtocolMask::BINARY)
        .rf_mode(RfMode::TypeA)
        .build()
        .unwrap()
        .connect();
    assert!(matches!(res, Err(Error::ReaderStatus { status: 0x02 })));
}
