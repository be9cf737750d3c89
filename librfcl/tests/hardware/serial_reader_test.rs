#![cfg(feature = "serial")]

#[path = "common.rs"]
mod common;

use librfcl::{RfMode, Result};
use serial_test::serial;

// These tests require a real reader on a serial port. They are marked
// `#[ignore]` so CI does not attempt to run them. Run manually with:
//
// LIBRFCL_TEST_PORT=/dev/ttyUSB0 cargo test -p librfcl --test hardware --features serial -- --ignored
//

#[test]
#[ignore]
#[serial]
fn negotiate_and_read_firmware() -> Result<()> {
    let Some(reader) = common::open_and_connect_reader()? else {
        return Ok(());
    };
    assert!(!reader.firmware().version.is_empty());
    log::info!(
        "{} via {} at {} baud",
        reader.firmware().version,
        reader.protocol(),
        reader.baudrate()
    );
    Ok(())
}

#[test]
#[ignore]
#[serial]
fn field_on_and_off() -> Result<()> {
    let Some(mut reader) = common::open_and_connect_reader()? else {
        return Ok(());
    };
    reader.set_rf_mode(RfMode::TypeA)?;
    reader.set_rf_mode(RfMode::Off)?;
    assert_eq!(reader.rf_mode(), RfMode::Off);
    Ok(())
}
