#[path = "../common/mod.rs"]
mod common;

use librfcl::tcl::{Block, SBlockKind};
use librfcl::test_support::ScriptedChannel;
use librfcl::{Cid, Error, TclSession};

#[test]
fn block_number_alternates_across_exchanges() {
    let mut session = TclSession::new();
    let mut card = ScriptedChannel::new();
    for pcb in [0x02u8, 0x03, 0x02, 0x03] {
        card.push_block(&[pcb, 0x90, 0x00]);
    }
    for _ in 0..4 {
        session.exchange(&mut card, &[0x00]).unwrap();
    }
    let pcbs: Vec<u8> = card.sent_blocks().iter().map(|b| b[0]).collect();
    assert_eq!(pcbs, vec![0x02, 0x03, 0x02, 0x03]);
    assert!(!session.block_number());
}

#[test]
fn lost_i_block_is_resent_with_same_number() {
    let mut session = TclSession::new();
    let mut card = ScriptedChannel::new();
    card.push_error(Error::CrcMismatch {
        expected: 0,
        actual: 1,
    });
    // the card never saw our I-Block and asks for it with the old number
    card.push_block(&[0xA3]);
    card.push_block(&[0x02, 0x90, 0x00]);

    session.exchange(&mut card, &[0x42]).unwrap();
    assert_eq!(
        card.sent_blocks(),
        vec![vec![0x02, 0x42], vec![0xB2], vec![0x02, 0x42]]
    );
}

#[test]
fn reset_forgets_block_number() {
    let mut session = TclSession::new();
    let mut card = ScriptedChannel::new();
    card.push_block(&[0x02]);
    session.exchange(&mut card, &[]).unwrap();
    assert!(session.block_number());
    session.reset();
    assert!(!session.block_number());
}

#[test]
fn pcb_layout_with_cid() {
    let cid = Some(Cid::new(3));
    let i = Block::I {
        chaining: true,
        block_number: true,
        cid,
        nad: None,
        inf: vec![0xAA],
    };
    assert_eq!(i.encode(), vec![0x1B, 0x03, 0xAA]);

    let r = Block::R {
        ack: false,
        block_number: false,
        cid,
    };
    assert_eq!(r.encode(), vec![0xBA, 0x03]);

    let wtx = Block::S {
        kind: SBlockKind::Wtx(0x05),
        cid: None,
    };
    assert_eq!(wtx.encode(), vec![0xF2, 0x05]);
    assert_eq!(
        Block::parse(&[0xF2, 0x45]).unwrap(),
        Block::S {
            kind: SBlockKind::Wtx(0x45),
            cid: None,
        }
    );
}
