//! Probe a reader on a serial port: negotiate the link, print the firmware
//! and, if a card is already activated in the field, send it SELECT PPSE.
//!
//! Usage:
//!   RUST_LOG=debug cargo run -p librfcl --example serial_probe --features serial -- /dev/ttyUSB0

use anyhow::Context;
use librfcl::prelude::*;

const SELECT_PPSE: &[u8] = &[
    0x00, 0xA4, 0x04, 0x00, 0x0E, b'2', b'P', b'A', b'Y', b'.', b'S', b'Y', b'S', b'.', b'D',
    b'D', b'F', b'0', b'1', 0x00,
];

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let mut reader = ReaderBuilder::new()
        .device(port.clone())
        .rf_mode(RfMode::TypeA)
        .build()
        .with_context(|| format!("opening {port}"))?
        .connect()
        .context("no reader answered")?;

    println!(
        "{} on {port}: {} at {} baud, capabilities {:?}",
        reader.firmware().version,
        reader.protocol(),
        reader.baudrate(),
        reader.capabilities()
    );

    let mut session = TclSession::new();
    match reader.tcl_exchange(&mut session, CardFamily::TypeA, SELECT_PPSE) {
        Ok(reply) => println!("PPSE: {}", bytes_to_hex(&reply)),
        Err(Error::NoCard) => println!("no activated card in the field"),
        Err(e) => println!("exchange failed: {e}"),
    }
    let _ = reader.tcl_deselect(&mut session, CardFamily::TypeA);

    reader.set_rf_mode(RfMode::Off)?;
    Ok(())
}
