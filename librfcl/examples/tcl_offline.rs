//! Walk through a chained T=CL exchange against a scripted card, printing
//! every block that goes out. No hardware needed.
//!
//! Usage:
//!   RUST_LOG=trace cargo run -p librfcl --example tcl_offline

use librfcl::prelude::*;
use librfcl::test_support::ScriptedChannel;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // FSCI 5: 64 byte frames, 62 bytes of INF per block
    let mut session = TclSession::new().with_fsci(5);
    let message: Vec<u8> = (0..150u8).collect();

    let mut card = ScriptedChannel::new();
    card.push_block(&[0xA2]);
    card.push_block(&[0xF2, 0x02]);
    card.push_block(&[0xA3]);
    card.push_block(&[0x12, 0x6F, 0x00]);
    card.push_block(&[0x03, 0x90, 0x00]);

    let reply = session.exchange(&mut card, &message)?;
    for (block, fwt) in &card.sent {
        println!("-> {} (fwt {fwt} us)", bytes_to_hex(block));
    }
    println!("<- {}", bytes_to_hex(&reply));

    card.push_block(&[0xC2]);
    session.deselect(&mut card)?;
    println!("deselected, block number reset: {}", !session.block_number());
    Ok(())
}
