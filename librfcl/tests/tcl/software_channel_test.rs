#[path = "../common/mod.rs"]
mod common;

use librfcl::protocol::commands::{
    CMD_RAW_EXCHANGE_A, CMD_RAW_EXCHANGE_B, CMD_TCL_DESELECT, STATUS_CARD_MUTE,
};
use librfcl::protocol::crc_b;
use librfcl::test_support::{MockHandle, binary_reply, connected_mock_reader};
use librfcl::{Capabilities, CardFamily, Connected, Error, Reader, TclSession};

fn software_reader() -> (Reader<Connected>, MockHandle) {
    connected_mock_reader(Capabilities::empty()).unwrap()
}

/// Reader answer to a raw exchange: the card block with its CRC_A.
fn card_answer(seq: u8, block: &[u8]) -> Vec<u8> {
    binary_reply(seq, 0x00, &common::fixtures::with_crc_a(block)).unwrap()
}

#[test]
fn exchange_runs_over_raw_layer3_commands() {
    common::init_logging();
    let (mut reader, mock) = software_reader();
    let mut answer = vec![0x02];
    answer.extend_from_slice(&common::fixtures::ppse_fci());
    mock.borrow_mut().push_response(card_answer(1, &answer));

    let mut session = TclSession::new();
    let apdu = common::fixtures::select_ppse();
    let reply = reader
        .tcl_exchange(&mut session, CardFamily::TypeA, &apdu)
        .unwrap();
    assert_eq!(reply, common::fixtures::ppse_fci());

    let m = mock.borrow();
    let request = &m.sent[1];
    assert_eq!(request[2], CMD_RAW_EXCHANGE_A);
    // payload: card timeout (ms, big endian), I-Block, CRC_A
    let mut block = vec![0x02];
    block.extend_from_slice(&apdu);
    let mut expected = vec![0x00, 0x05];
    expected.extend(common::fixtures::with_crc_a(&block));
    let payload_start = 4;
    assert_eq!(&request[payload_start..request.len() - 1], expected.as_slice());
}

#[test]
fn type_b_uses_crc_b() {
    let (mut reader, mock) = software_reader();
    let mut card_block = vec![0x02, 0x90, 0x00];
    card_block.extend_from_slice(&crc_b(&[0x02, 0x90, 0x00]).to_le_bytes());
    mock.borrow_mut()
        .push_response(binary_reply(1, 0x00, &card_block).unwrap());

    let mut session = TclSession::new();
    let reply = reader
        .tcl_exchange(&mut session, CardFamily::TypeB, &[0x00, 0x84, 0x00, 0x00, 0x08])
        .unwrap();
    assert_eq!(reply, common::fixtures::sw_ok());
    assert_eq!(mock.borrow().sent[1][2], CMD_RAW_EXCHANGE_B);
}

#[test]
fn corrupted_card_answer_gets_nak_then_recovers() {
    let (mut reader, mock) = software_reader();
    {
        let mut m = mock.borrow_mut();
        let mut damaged = common::fixtures::with_crc_a(&[0x02, 0x90, 0x00]);
        damaged[1] ^= 0x01;
        m.push_response(binary_reply(1, 0x00, &damaged).unwrap());
        m.push_response(card_answer(2, &[0x02, 0x90, 0x00]));
    }

    let mut session = TclSession::new();
    let reply = reader
        .tcl_exchange(&mut session, CardFamily::TypeA, &[0x00])
        .unwrap();
    assert_eq!(reply, common::fixtures::sw_ok());

    let m = mock.borrow();
    // second raw exchange carries R(NAK) block number 0
    let nak = &m.sent[2];
    assert_eq!(&nak[4..7], &[0x00, 0x05, 0xB2]);
}

#[test]
fn mute_card_is_no_card() {
    let (mut reader, mock) = software_reader();
    mock.borrow_mut()
        .push_response(binary_reply(1, STATUS_CARD_MUTE, &[]).unwrap());
    let mut session = TclSession::new();
    assert!(matches!(
        reader.tcl_exchange(&mut session, CardFamily::TypeA, &[0x00]),
        Err(Error::NoCard)
    ));
}

#[test]
fn deselect_through_reader_engine() {
    let (mut reader, mock) = connected_mock_reader(Capabilities::TCL_ENGINE).unwrap();
    mock.borrow_mut()
        .push_response(binary_reply(1, 0x00, &[]).unwrap());
    let mut session = TclSession::new();
    reader.tcl_deselect(&mut session, CardFamily::TypeA).unwrap();
    assert_eq!(mock.borrow().sent[1][2], CMD_TCL_DESELECT);
}

#[test]
fn deselect_over_software_channel_tolerates_silence() {
    let (mut reader, mock) = software_reader();
    mock.borrow_mut()
        .push_response(binary_reply(1, STATUS_CARD_MUTE, &[]).unwrap());
    let mut session = TclSession::new();
    reader.tcl_deselect(&mut session, CardFamily::TypeA).unwrap();
    let m = mock.borrow();
    assert_eq!(m.sent.len(), 2);
    assert_eq!(m.sent[1][6], 0xC2);
}
