#[path = "../common/mod.rs"]
mod common;

use librfcl::test_support::ScriptedChannel;
use librfcl::{Error, TclSession};

#[test]
fn short_message_single_block_each_way() {
    common::init_logging();
    let mut session = TclSession::new().with_fsci(8);
    assert_eq!(session.block_size(), 254);

    let message: Vec<u8> = (1..=10).collect();
    let mut card = ScriptedChannel::new();
    let mut answer = vec![0x02];
    answer.extend_from_slice(&common::fixtures::ppse_fci());
    card.push_block(&answer);

    let reply = session.exchange(&mut card, &message).unwrap();
    assert_eq!(reply, common::fixtures::ppse_fci());

    let mut expected = vec![0x02];
    expected.extend_from_slice(&message);
    assert_eq!(card.sent_blocks(), vec![expected]);
    assert!(session.block_number());
}

#[test]
fn long_message_is_chained_in_three_blocks() {
    let mut session = TclSession::new().with_fsci(8);
    let message = vec![0x5A; 600];
    let mut card = ScriptedChannel::new();
    card.push_block(&[0xA2]);
    card.push_block(&[0xA3]);
    card.push_block(&[0x02, 0x90, 0x00]);

    assert_eq!(
        session.exchange(&mut card, &message).unwrap(),
        common::fixtures::sw_ok()
    );

    let sent = card.sent_blocks();
    let lengths: Vec<usize> = sent.iter().map(|b| b.len() - 1).collect();
    assert_eq!(lengths, vec![254, 254, 92]);
    let chained: Vec<bool> = sent.iter().map(|b| b[0] & 0x10 != 0).collect();
    assert_eq!(chained, vec![true, true, false]);
}

#[test]
fn deselect_after_success_with_answer() {
    let mut session = TclSession::new();
    let mut card = ScriptedChannel::new();
    card.push_block(&[0x02, 0x90, 0x00]);
    card.push_block(&[0xC2]);

    session.exchange(&mut card, &[0x00, 0xB0, 0x00, 0x00, 0x00]).unwrap();
    assert!(session.block_number());
    session.deselect(&mut card).unwrap();

    assert_eq!(card.sent_blocks().last().unwrap(), &vec![0xC2]);
    assert!(!session.block_number());
}

#[test]
fn deselect_after_success_without_answer() {
    let mut session = TclSession::new();
    let mut card = ScriptedChannel::new();
    card.push_block(&[0x02, 0x90, 0x00]);
    card.push_error(Error::Timeout);

    session.exchange(&mut card, &[0x00]).unwrap();
    session.deselect(&mut card).unwrap();
    assert_eq!(card.sent.len(), 2);
    assert_eq!(card.remaining(), 0);
}

#[test]
fn absent_card_is_reported_as_no_card() {
    let mut session = TclSession::new();
    let mut card = ScriptedChannel::new();
    card.push_error(Error::NoResponse);
    assert!(matches!(
        session.exchange(&mut card, &[0x00]),
        Err(Error::NoCard)
    ));
    assert_eq!(card.sent.len(), 1);
}
