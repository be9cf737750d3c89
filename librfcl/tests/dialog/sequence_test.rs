#[path = "../common/mod.rs"]
mod common;

use librfcl::protocol::codec::BinaryCodec;
use librfcl::protocol::{Dialog, Frame};
use librfcl::test_support::{MockHandle, SharedMock};
use librfcl::Error;

fn binary(dual_buffer: bool) -> (Dialog, MockHandle) {
    let (transport, mock) = SharedMock::new();
    let mut dialog = Dialog::new(Box::new(transport), Box::new(BinaryCodec));
    dialog.set_dual_buffer(dual_buffer);
    (dialog, mock)
}

fn wire(seq: u8, code: u8, payload: &[u8]) -> Vec<u8> {
    BinaryCodec::encode(&Frame::new(seq, code, payload).unwrap())
}

#[test]
fn sequence_counts_successful_exchanges() {
    let (mut d, mock) = binary(false);
    {
        let mut m = mock.borrow_mut();
        for seq in 0..3u8 {
            m.push_response(wire(seq, 0x00, &[seq]));
        }
    }
    for seq in 0..3u8 {
        assert_eq!(d.function(0x10, &[]).unwrap(), vec![seq]);
    }
    assert_eq!(d.sequence(), 3);
    let sent: Vec<u8> = mock.borrow().sent.iter().map(|f| f[1]).collect();
    assert_eq!(sent, vec![0, 1, 2]);
}

#[test]
fn reader_status_still_consumes_sequence() {
    let (mut d, mock) = binary(false);
    mock.borrow_mut().push_response(wire(0, 0x09, &[]));
    assert!(matches!(
        d.function(0x10, &[]),
        Err(Error::ReaderStatus { status: 0x09 })
    ));
    assert_eq!(d.sequence(), 1);
}

#[test]
fn transceive_returns_status_untouched() {
    let (mut d, mock) = binary(false);
    mock.borrow_mut().push_response(wire(0, 0x09, &[0xAB]));
    let frame = d.transceive(0x10, &[]).unwrap();
    assert_eq!(frame.status(), 0x09);
    assert_eq!(frame.payload, vec![0xAB]);
}

#[test]
fn stale_answer_without_dual_buffer_fails() {
    let (mut d, mock) = binary(false);
    d.set_sequence(5);
    mock.borrow_mut().push_response(wire(4, 0x00, &[]));
    assert!(matches!(
        d.function(0x10, &[]),
        Err(Error::SequenceMismatch {
            expected: 5,
            actual: 4
        })
    ));
    assert_eq!(d.sequence(), 5);
    assert_eq!(mock.borrow().sent.len(), 1);
}

#[test]
fn stale_answer_with_dual_buffer_resends_once() {
    let (mut d, mock) = binary(true);
    d.set_sequence(5);
    {
        let mut m = mock.borrow_mut();
        m.push_response(wire(4, 0x00, &[]));
        m.push_response(wire(5, 0x00, &[0x01]));
    }
    assert_eq!(d.function(0x10, &[]).unwrap(), vec![0x01]);
    let m = mock.borrow();
    assert_eq!(m.sent, vec![wire(5, 0x10, &[]), wire(5, 0x10, &[])]);
}
